//! Bulk pantry import from CSV.
//!
//! Expected header: `Ingredient,Quantity,Unit` (case-insensitive, extra
//! columns ignored). Unknown ingredients are created as custom catalog
//! entries; rows land in the importing user's inventory, merging into an
//! existing lot when the `(ingredient, unit)` pair already has one.

use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::models::{AppData, Ingredient, InventoryItem, new_id, validate_quantity};

/// A single parsed pantry row.
#[derive(Debug, Clone)]
pub struct PantryRow {
    pub ingredient: String,
    pub quantity: f64,
    pub unit: String,
}

/// Summary of what a pantry import would do / did.
#[derive(Debug, Clone, Serialize)]
pub struct PantryImportSummary {
    pub rows_parsed: usize,
    pub ingredients_created: usize,
    pub ingredients_matched: usize,
    pub lots_created: usize,
    pub lots_merged: usize,
}

/// Parse a pantry CSV from any reader.
pub fn parse_pantry_csv<R: Read>(reader: R) -> Result<Vec<PantryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
    let col =
        |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };

    let idx_ingredient = col("Ingredient").context("Missing 'Ingredient' column")?;
    let idx_quantity = col("Quantity").context("Missing 'Quantity' column")?;
    let idx_unit = col("Unit").context("Missing 'Unit' column")?;

    let mut rows = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;

        let ingredient = record.get(idx_ingredient).unwrap_or("").trim().to_string();
        let quantity_raw = record.get(idx_quantity).unwrap_or("").trim();
        let unit = record.get(idx_unit).unwrap_or("").trim().to_string();

        if ingredient.is_empty() && quantity_raw.is_empty() && unit.is_empty() {
            continue; // skip blank rows
        }
        if ingredient.is_empty() || unit.is_empty() {
            bail!("Row {}: ingredient and unit are required", line_num + 2);
        }
        let quantity: f64 = quantity_raw
            .parse()
            .with_context(|| format!("Row {}: invalid quantity '{quantity_raw}'", line_num + 2))?;
        validate_quantity(quantity)
            .with_context(|| format!("Row {}: invalid quantity", line_num + 2))?;

        rows.push(PantryRow {
            ingredient,
            quantity,
            unit,
        });
    }

    Ok(rows)
}

/// Apply parsed pantry rows to the aggregate for one user.
///
/// Runs against a working copy and commits only on success, so a bad row
/// leaves the aggregate untouched. With `dry_run` nothing is committed but
/// the summary reflects what an import would do, including matches against
/// rows earlier in the same file.
pub fn import_pantry_rows(
    data: &mut AppData,
    user_id: &str,
    rows: &[PantryRow],
    dry_run: bool,
) -> Result<PantryImportSummary> {
    let mut scratch = data.clone();
    let mut ingredients_created = 0;
    let mut ingredients_matched = 0;
    let mut lots_created = 0;
    let mut lots_merged = 0;

    for (i, row) in rows.iter().enumerate() {
        let measurement_id = scratch
            .measurement_by_ref(&row.unit)
            .map(|m| m.id.clone())
            .with_context(|| format!("Row {}: unknown unit '{}'", i + 2, row.unit))?;

        let ingredient_id = if let Some(existing) = scratch.ingredient_by_name(&row.ingredient) {
            ingredients_matched += 1;
            existing.id.clone()
        } else {
            let created = Ingredient {
                id: new_id(),
                name: row.ingredient.clone(),
                is_custom: true,
            };
            let id = created.id.clone();
            scratch.ingredients.push(created);
            ingredients_created += 1;
            id
        };

        let existing_lot = scratch.inventory.iter_mut().find(|lot| {
            lot.user_id == user_id
                && lot.ingredient_id == ingredient_id
                && lot.measurement_id == measurement_id
        });
        if let Some(lot) = existing_lot {
            lot.quantity += row.quantity;
            lots_merged += 1;
        } else {
            scratch.inventory.push(InventoryItem {
                user_id: user_id.to_string(),
                ingredient_id,
                measurement_id,
                quantity: row.quantity,
            });
            lots_created += 1;
        }
    }

    if !dry_run {
        *data = scratch;
    }

    Ok(PantryImportSummary {
        rows_parsed: rows.len(),
        ingredients_created,
        ingredients_matched,
        lots_created,
        lots_merged,
    })
}
