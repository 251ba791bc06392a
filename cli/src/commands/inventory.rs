use anyhow::{Context, Result};
use std::path::Path;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::models::InventoryItem;
use larder_core::service::Organizer;

use super::helpers::{fmt_qty, truncate};

fn print_lot(organizer: &Organizer, lot: &InventoryItem, verb: &str) {
    let ingredient = organizer
        .ingredients(None)
        .iter()
        .find(|i| i.id == lot.ingredient_id)
        .map_or_else(|| lot.ingredient_id.clone(), |i| i.name.clone());
    let unit = organizer
        .measurement(&lot.measurement_id)
        .map_or_else(|_| lot.measurement_id.clone(), |m| m.name.clone());
    let qty = fmt_qty(lot.quantity);
    println!("{verb}: {ingredient} — {qty} {unit}");
}

pub(crate) fn cmd_inventory_add(
    organizer: &mut Organizer,
    ingredient: &str,
    quantity: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let lot = organizer.add_inventory(ingredient, quantity, unit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lot)?);
    } else {
        print_lot(organizer, &lot, "Stocked");
    }
    Ok(())
}

pub(crate) fn cmd_inventory_set(
    organizer: &mut Organizer,
    ingredient: &str,
    quantity: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let lot = organizer.set_inventory(ingredient, quantity, unit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lot)?);
    } else {
        print_lot(organizer, &lot, "Set");
    }
    Ok(())
}

pub(crate) fn cmd_inventory_remove(
    organizer: &mut Organizer,
    ingredient: &str,
    unit: &str,
    json: bool,
) -> Result<()> {
    if organizer.remove_inventory(ingredient, unit)? {
        if json {
            println!(
                "{}",
                serde_json::json!({ "removed": ingredient, "unit": unit })
            );
        } else {
            println!("Removed {ingredient} ({unit}) from the pantry");
        }
        Ok(())
    } else {
        if json {
            println!(
                "{}",
                super::helpers::json_error(&format!("No {ingredient} lot in {unit}"))
            );
        } else {
            eprintln!("No {ingredient} lot in {unit}");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_inventory_list(organizer: &Organizer, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct LotRow {
        #[tabled(rename = "Ingredient")]
        ingredient: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit")]
        unit: String,
    }

    let lots = organizer.inventory()?;
    if lots.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("Pantry is empty");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&lots)?);
        return Ok(());
    }

    let rows: Vec<LotRow> = lots
        .iter()
        .map(|lot| LotRow {
            ingredient: organizer
                .ingredients(None)
                .iter()
                .find(|i| i.id == lot.ingredient_id)
                .map_or_else(|| lot.ingredient_id.clone(), |i| truncate(&i.name, 35)),
            quantity: fmt_qty(lot.quantity),
            unit: organizer
                .measurement(&lot.measurement_id)
                .map_or_else(|_| lot.measurement_id.clone(), |m| m.name.clone()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_inventory_check(
    organizer: &Organizer,
    ingredient: &str,
    quantity: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let s = organizer.availability(ingredient, unit, quantity)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }
    let unit_name = organizer.measurement(unit)?.name.clone();
    let need = fmt_qty(quantity);
    let have = fmt_qty(s.available);
    if s.has_enough {
        println!("Yes: need {need} {unit_name}, have {have} {unit_name} (convertible lots)");
        Ok(())
    } else {
        println!("No: need {need} {unit_name}, have {have} {unit_name} (convertible lots)");
        process::exit(2);
    }
}

pub(crate) fn cmd_inventory_import(
    organizer: &mut Organizer,
    file: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let csv_data = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = organizer.import_pantry_csv(&csv_data, dry_run)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if dry_run {
        println!("Dry run — nothing imported. This file would:");
    } else {
        println!("Imported pantry from {}:", file.display());
    }
    let parsed = summary.rows_parsed;
    let created = summary.lots_created;
    let merged = summary.lots_merged;
    let new_ing = summary.ingredients_created;
    println!("  {parsed} rows parsed");
    println!("  {created} lots created, {merged} merged into existing lots");
    if new_ing > 0 {
        println!("  {new_ing} custom ingredients added to the catalog");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_import_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ingredient,Quantity,Unit").unwrap();
        writeln!(file, "Flour,4,cup").unwrap();

        let mut organizer = Organizer::open_in_memory().unwrap();
        cmd_inventory_import(&mut organizer, file.path(), false, true).unwrap();
        assert_eq!(organizer.inventory().unwrap().len(), 1);
    }

    #[test]
    fn test_import_missing_file_errors() {
        let mut organizer = Organizer::open_in_memory().unwrap();
        let result = cmd_inventory_import(
            &mut organizer,
            Path::new("/nonexistent/pantry.csv"),
            false,
            true,
        );
        assert!(result.is_err());
    }
}
