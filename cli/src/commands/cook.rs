use anyhow::{Result, bail};

use larder_core::service::Organizer;

use super::helpers::{fmt_qty, parse_index};

pub(crate) fn cmd_cook_start(organizer: &mut Organizer, recipe: &str, json: bool) -> Result<()> {
    let session = organizer.start_cooking(recipe)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }
    let size = fmt_qty(session.serving_size);
    if session.ingredients_checked.is_empty() && session.steps_checked.is_empty() {
        println!("Cooking {recipe} for {size} servings.");
    } else {
        println!("Resumed cooking {recipe} (serving size {size}).");
    }
    println!("See progress with: larder cook status \"{recipe}\"");
    Ok(())
}

pub(crate) fn cmd_cook_status(organizer: &Organizer, recipe: &str, json: bool) -> Result<()> {
    let status = organizer.cooking_status(recipe)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let name = &status.recipe_name;
    let size = fmt_qty(status.session.serving_size);
    let factor = fmt_qty(status.scaling_factor);
    println!("=== Cooking: {name} ===");
    println!("  Serving size: {size} (scale x{factor})\n");

    println!("  INGREDIENTS:");
    for (i, ing) in status.ingredients.iter().enumerate() {
        let n = i + 1;
        let mark = if ing.checked { "x" } else { " " };
        let need = fmt_qty(ing.required);
        let have = fmt_qty(ing.available);
        let unit = &ing.unit;
        let ingredient = &ing.name;
        let stock = if ing.has_enough { "ok" } else { "SHORT" };
        println!("    [{mark}] {n}. {ingredient} — need {need} {unit}, have {have} ({stock})");
    }

    println!("\n  STEPS:");
    for (i, step) in status.steps.iter().enumerate() {
        let n = i + 1;
        let mark = if step.checked { "x" } else { " " };
        let text = &step.text;
        println!("    [{mark}] {n}. {text}");
    }

    println!("\n  Check items off with: larder cook check \"{name}\" --ingredient <n> | --step <n>");
    Ok(())
}

pub(crate) fn cmd_cook_check(
    organizer: &mut Organizer,
    recipe: &str,
    ingredient: Option<usize>,
    step: Option<usize>,
    checked: bool,
    json: bool,
) -> Result<()> {
    let session = match (ingredient, step) {
        (Some(n), None) => organizer.check_ingredient(recipe, parse_index(n)?, checked)?,
        (None, Some(n)) => organizer.check_step(recipe, parse_index(n)?, checked)?,
        _ => bail!("Pass exactly one of --ingredient <n> or --step <n>"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }
    let done_ing = session.ingredients_checked.len();
    let done_steps = session.steps_checked.len();
    let verb = if checked { "Checked" } else { "Unchecked" };
    println!("{verb}. Progress: {done_ing} ingredients, {done_steps} steps done.");
    Ok(())
}

pub(crate) fn cmd_cook_serving(
    organizer: &mut Organizer,
    recipe: &str,
    size: f64,
    json: bool,
) -> Result<()> {
    let session = organizer.set_serving_size(recipe, size)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        let size = fmt_qty(session.serving_size);
        println!("Serving size set to {size}. Requirements rescaled.");
    }
    Ok(())
}

pub(crate) fn cmd_cook_complete(organizer: &mut Organizer, recipe: &str, json: bool) -> Result<()> {
    let summary = organizer.complete_cooking(recipe)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let factor = fmt_qty(summary.scaling_factor);
    println!("Completed {recipe} (scale x{factor}). Pantry updated:");
    for deduction in &summary.deductions {
        let ingredient = organizer
            .ingredients(None)
            .iter()
            .find(|i| i.id == deduction.ingredient_id)
            .map_or_else(|| deduction.ingredient_id.clone(), |i| i.name.clone());
        if deduction.ledger.is_empty() {
            println!("  {ingredient}: nothing in stock to deduct");
            continue;
        }
        for entry in &deduction.ledger {
            let qty = fmt_qty(entry.quantity);
            let unit = organizer
                .measurement(&entry.measurement_id)
                .map_or_else(|_| entry.measurement_id.clone(), |m| m.name.clone());
            println!("  {ingredient}: -{qty} {unit}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_cook_cancel(organizer: &mut Organizer, recipe: &str, json: bool) -> Result<()> {
    organizer.cancel_cooking(recipe)?;
    if json {
        println!("{}", serde_json::json!({ "cancelled": recipe }));
    } else {
        println!("Cancelled cooking {recipe}. Pantry untouched.");
    }
    Ok(())
}
