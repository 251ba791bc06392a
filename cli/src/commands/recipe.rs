use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::service::Organizer;

use super::helpers::{fmt_qty, json_error, truncate};

pub(crate) fn cmd_recipe_add(
    organizer: &mut Organizer,
    name: &str,
    description: &str,
    servings: f64,
    json: bool,
) -> Result<()> {
    let recipe = organizer.add_recipe(name, description, servings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let name = &recipe.name;
        let servings = fmt_qty(recipe.servings);
        println!("Created recipe: {name} (servings: {servings})");
        println!("Add ingredients with: larder recipe add-ingredient \"{name}\" <ingredient> <qty> <unit>");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_add_ingredient(
    organizer: &mut Organizer,
    recipe_name: &str,
    ingredient_name: &str,
    quantity: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let recipe = organizer.add_recipe_ingredient(recipe_name, ingredient_name, quantity, unit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let qty = fmt_qty(quantity);
        let unit_name = organizer.measurement(unit)?.name.clone();
        println!("Added {qty} {unit_name} of {ingredient_name} to {recipe_name}");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_remove_ingredient(
    organizer: &mut Organizer,
    recipe_name: &str,
    ingredient_name: &str,
    json: bool,
) -> Result<()> {
    if organizer.remove_recipe_ingredient(recipe_name, ingredient_name)? {
        if json {
            println!("{}", serde_json::json!({ "removed": ingredient_name }));
        } else {
            println!("Removed {ingredient_name} from {recipe_name}");
        }
    } else {
        if json {
            println!(
                "{}",
                json_error(&format!(
                    "Ingredient '{ingredient_name}' not found in recipe"
                ))
            );
        } else {
            eprintln!("Ingredient '{ingredient_name}' not found in recipe");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_add_step(
    organizer: &mut Organizer,
    recipe_name: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    organizer.add_recipe_step(recipe_name, text)?;
    if json {
        println!("{}", serde_json::json!({ "recipe": recipe_name, "step": text }));
    } else {
        println!("Added step to {recipe_name}");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_set_servings(
    organizer: &mut Organizer,
    recipe_name: &str,
    servings: f64,
    json: bool,
) -> Result<()> {
    organizer.set_recipe_servings(recipe_name, servings)?;
    if json {
        let recipe = organizer.recipe(recipe_name)?;
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let servings = fmt_qty(servings);
        println!("Updated {recipe_name} to {servings} servings");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_show(organizer: &mut Organizer, recipe_name: &str, json: bool) -> Result<()> {
    let recipe = organizer.recipe_detail(recipe_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    let name = &recipe.name;
    let servings = fmt_qty(recipe.servings);
    println!("=== {name} ===");
    if !recipe.description.is_empty() {
        println!("  {}", recipe.description);
    }
    let cooked = recipe.cook_count;
    let viewed = recipe.view_count;
    println!("  Servings: {servings}  |  Cooked {cooked}x  |  Viewed {viewed}x\n");

    println!("  INGREDIENTS:");
    if recipe.ingredients.is_empty() {
        println!("    (none yet)");
    }
    for (i, line) in recipe.ingredients.iter().enumerate() {
        let n = i + 1;
        let qty = fmt_qty(line.quantity);
        let unit = organizer
            .measurement(&line.measurement_id)
            .map_or_else(|_| line.measurement_id.clone(), |m| m.name.clone());
        let ingredient = organizer
            .ingredients(None)
            .iter()
            .find(|ing| ing.id == line.ingredient_id)
            .map_or_else(|| line.ingredient_id.clone(), |ing| ing.name.clone());
        println!("    {n}. {ingredient} — {qty} {unit}");
    }

    println!("\n  STEPS:");
    if recipe.instructions.is_empty() {
        println!("    (none yet)");
    }
    for (i, step) in recipe.instructions.iter().enumerate() {
        let n = i + 1;
        println!("    {n}. {step}");
    }

    Ok(())
}

pub(crate) fn cmd_recipe_list(
    organizer: &Organizer,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Servings")]
        servings: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Cooked")]
        cooked: i64,
    }

    let recipes = organizer.recipes(search)?;
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            name: truncate(&r.name, 30),
            servings: fmt_qty(r.servings),
            ingredients: r.ingredients.len(),
            cooked: r.cook_count,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_recipe_delete(
    organizer: &mut Organizer,
    recipe_name: &str,
    json: bool,
) -> Result<()> {
    organizer.delete_recipe(recipe_name)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": recipe_name }));
    } else {
        println!("Deleted recipe {recipe_name} (and its cooking sessions)");
    }
    Ok(())
}
