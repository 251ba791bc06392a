use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::Style,
};

use larder_core::service::Organizer;

use super::helpers::truncate;

pub(crate) fn cmd_ingredient_add(organizer: &mut Organizer, name: &str, json: bool) -> Result<()> {
    let ingredient = organizer.add_ingredient(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ingredient)?);
    } else {
        println!("Added ingredient: {}", ingredient.name);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_list(
    organizer: &Organizer,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let ingredients = organizer.ingredients(search);
    if ingredients.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No ingredients found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
        return Ok(());
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            name: truncate(&i.name, 35),
            source: if i.is_custom { "custom" } else { "built-in" }.to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
