mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_cook_cancel, cmd_cook_check, cmd_cook_complete, cmd_cook_serving, cmd_cook_start,
    cmd_cook_status, cmd_ingredient_add, cmd_ingredient_list, cmd_inventory_add,
    cmd_inventory_check, cmd_inventory_import, cmd_inventory_list, cmd_inventory_remove,
    cmd_inventory_set, cmd_measurement_convert, cmd_measurement_link, cmd_measurement_list,
    cmd_measurement_show, cmd_recipe_add, cmd_recipe_add_ingredient, cmd_recipe_add_step,
    cmd_recipe_delete, cmd_recipe_list, cmd_recipe_remove_ingredient, cmd_recipe_set_servings,
    cmd_recipe_show, cmd_user_add, cmd_user_list, cmd_user_login,
};
use crate::config::Config;
use larder_core::service::Organizer;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "A local-first recipe organizer and pantry tracker",
    long_about = "\n\n  ██╗      █████╗ ██████╗ ██████╗ ███████╗██████╗
  ██║     ██╔══██╗██╔══██╗██╔══██╗██╔════╝██╔══██╗
  ██║     ███████║██████╔╝██║  ██║█████╗  ██████╔╝
  ██║     ██╔══██║██╔══██╗██║  ██║██╔══╝  ██╔══██╗
  ███████╗██║  ██║██║  ██║██████╔╝███████╗██║  ██║
  ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝╚═╝  ╚═╝
        cook from what you have.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users and login
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage the ingredient catalog
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Manage measurement units and conversion edges
    Measurement {
        #[command(subcommand)]
        command: MeasurementCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Manage pantry inventory
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Run cooking sessions (scale, check off, deduct)
    Cook {
        #[command(subcommand)]
        command: CookCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a user
    Add {
        /// Username (unique, case-insensitive)
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log in as a user
    Login {
        /// Username
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// Add a custom ingredient to the catalog
    Add {
        /// Ingredient name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List/search the ingredient catalog
    List {
        /// Filter by case-insensitive substring
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MeasurementCommands {
    /// List all measurement units
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a unit and its outgoing conversion edges
    Show {
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Author a directed conversion edge: 1 <from> = <factor> <to>
    Link {
        /// Source unit id or name
        from: String,
        /// Target unit id or name
        to: String,
        /// Factor (1 from = factor to). The reverse edge is never inferred.
        factor: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a quantity between two units (direct edges only)
    Convert {
        /// Quantity to convert
        quantity: f64,
        /// Source unit id or name
        from: String,
        /// Target unit id or name
        to: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Create a new recipe
    Add {
        /// Recipe name
        name: String,
        /// Base serving count (scaling baseline)
        #[arg(short, long, default_value = "4")]
        servings: f64,
        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an ingredient line to a recipe
    AddIngredient {
        /// Recipe name
        recipe: String,
        /// Ingredient name (must exist in the catalog)
        ingredient: String,
        /// Quantity in the given unit
        quantity: f64,
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient from a recipe
    RemoveIngredient {
        /// Recipe name
        recipe: String,
        /// Ingredient name to remove
        ingredient: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append an instruction step to a recipe
    AddStep {
        /// Recipe name
        recipe: String,
        /// Step text
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a recipe's base serving count
    SetServings {
        /// Recipe name
        recipe: String,
        /// New serving count
        servings: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe (ingredients + steps)
    Show {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your recipes
    List {
        /// Filter by case-insensitive substring
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe (cascades to its cooking sessions)
    Delete {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// Add stock (merges into an existing lot of the same unit)
    Add {
        /// Ingredient name
        ingredient: String,
        /// Quantity in the given unit
        quantity: f64,
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a lot's quantity outright
    Set {
        /// Ingredient name
        ingredient: String,
        /// New quantity
        quantity: f64,
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a lot
    Remove {
        /// Ingredient name
        ingredient: String,
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your pantry lots
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check availability of an ingredient in a unit of choice
    Check {
        /// Ingredient name
        ingredient: String,
        /// Required quantity
        quantity: f64,
        /// Unit id or name
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bulk-import lots from a CSV file (Ingredient,Quantity,Unit)
    Import {
        /// Path to the CSV file
        file: std::path::PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CookCommands {
    /// Start (or resume) cooking a recipe
    Start {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show session progress and per-ingredient availability
    Status {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check off an ingredient or step (1-based index from `cook status`)
    Check {
        /// Recipe name
        recipe: String,
        /// Ingredient number to check off
        #[arg(short, long)]
        ingredient: Option<usize>,
        /// Step number to check off
        #[arg(short, long)]
        step: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Uncheck an ingredient or step
    Uncheck {
        /// Recipe name
        recipe: String,
        /// Ingredient number to uncheck
        #[arg(short, long)]
        ingredient: Option<usize>,
        /// Step number to uncheck
        #[arg(short, long)]
        step: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the session's serving size (rescales requirements)
    Serving {
        /// Recipe name
        recipe: String,
        /// Serving size to cook for
        size: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Complete the session: deducts inventory and counts the cook
    Complete {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel the session without touching inventory
    Cancel {
        /// Recipe name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut organizer = Organizer::open(&config.db_path)?;

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Add { name, json } => cmd_user_add(&mut organizer, &name, json),
            UserCommands::Login { name, json } => cmd_user_login(&mut organizer, &name, json),
            UserCommands::List { json } => cmd_user_list(&organizer, json),
        },
        Commands::Ingredient { command } => match command {
            IngredientCommands::Add { name, json } => {
                cmd_ingredient_add(&mut organizer, &name, json)
            }
            IngredientCommands::List { search, json } => {
                cmd_ingredient_list(&organizer, search.as_deref(), json)
            }
        },
        Commands::Measurement { command } => match command {
            MeasurementCommands::List { json } => cmd_measurement_list(&organizer, json),
            MeasurementCommands::Show { unit, json } => {
                cmd_measurement_show(&organizer, &unit, json)
            }
            MeasurementCommands::Link {
                from,
                to,
                factor,
                json,
            } => cmd_measurement_link(&mut organizer, &from, &to, factor, json),
            MeasurementCommands::Convert {
                quantity,
                from,
                to,
                json,
            } => cmd_measurement_convert(&organizer, quantity, &from, &to, json),
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Add {
                name,
                servings,
                description,
                json,
            } => cmd_recipe_add(&mut organizer, &name, &description, servings, json),
            RecipeCommands::AddIngredient {
                recipe,
                ingredient,
                quantity,
                unit,
                json,
            } => cmd_recipe_add_ingredient(&mut organizer, &recipe, &ingredient, quantity, &unit, json),
            RecipeCommands::RemoveIngredient {
                recipe,
                ingredient,
                json,
            } => cmd_recipe_remove_ingredient(&mut organizer, &recipe, &ingredient, json),
            RecipeCommands::AddStep { recipe, text, json } => {
                cmd_recipe_add_step(&mut organizer, &recipe, &text, json)
            }
            RecipeCommands::SetServings {
                recipe,
                servings,
                json,
            } => cmd_recipe_set_servings(&mut organizer, &recipe, servings, json),
            RecipeCommands::Show { recipe, json } => cmd_recipe_show(&mut organizer, &recipe, json),
            RecipeCommands::List { search, json } => {
                cmd_recipe_list(&organizer, search.as_deref(), json)
            }
            RecipeCommands::Delete { recipe, json } => {
                cmd_recipe_delete(&mut organizer, &recipe, json)
            }
        },
        Commands::Inventory { command } => match command {
            InventoryCommands::Add {
                ingredient,
                quantity,
                unit,
                json,
            } => cmd_inventory_add(&mut organizer, &ingredient, quantity, &unit, json),
            InventoryCommands::Set {
                ingredient,
                quantity,
                unit,
                json,
            } => cmd_inventory_set(&mut organizer, &ingredient, quantity, &unit, json),
            InventoryCommands::Remove {
                ingredient,
                unit,
                json,
            } => cmd_inventory_remove(&mut organizer, &ingredient, &unit, json),
            InventoryCommands::List { json } => cmd_inventory_list(&organizer, json),
            InventoryCommands::Check {
                ingredient,
                quantity,
                unit,
                json,
            } => cmd_inventory_check(&organizer, &ingredient, quantity, &unit, json),
            InventoryCommands::Import {
                file,
                dry_run,
                json,
            } => cmd_inventory_import(&mut organizer, &file, dry_run, json),
        },
        Commands::Cook { command } => match command {
            CookCommands::Start { recipe, json } => cmd_cook_start(&mut organizer, &recipe, json),
            CookCommands::Status { recipe, json } => cmd_cook_status(&organizer, &recipe, json),
            CookCommands::Check {
                recipe,
                ingredient,
                step,
                json,
            } => cmd_cook_check(&mut organizer, &recipe, ingredient, step, true, json),
            CookCommands::Uncheck {
                recipe,
                ingredient,
                step,
                json,
            } => cmd_cook_check(&mut organizer, &recipe, ingredient, step, false, json),
            CookCommands::Serving { recipe, size, json } => {
                cmd_cook_serving(&mut organizer, &recipe, size, json)
            }
            CookCommands::Complete { recipe, json } => {
                cmd_cook_complete(&mut organizer, &recipe, json)
            }
            CookCommands::Cancel { recipe, json } => {
                cmd_cook_cancel(&mut organizer, &recipe, json)
            }
        },
    }
}
