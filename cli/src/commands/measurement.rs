use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::service::Organizer;

use super::helpers::{fmt_qty, json_error};

pub(crate) fn cmd_measurement_list(organizer: &Organizer, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct MeasurementRow {
        #[tabled(rename = "Id")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Edges")]
        edges: usize,
    }

    let measurements = organizer.measurements();
    if json {
        println!("{}", serde_json::to_string_pretty(measurements)?);
        return Ok(());
    }

    let rows: Vec<MeasurementRow> = measurements
        .iter()
        .map(|m| MeasurementRow {
            id: m.id.clone(),
            name: m.name.clone(),
            edges: m.conversions.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_measurement_show(organizer: &Organizer, unit: &str, json: bool) -> Result<()> {
    let measurement = organizer.measurement(unit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(measurement)?);
        return Ok(());
    }

    let name = &measurement.name;
    let id = &measurement.id;
    println!("=== {name} ({id}) ===");
    if measurement.conversions.is_empty() {
        println!("  No conversion edges (countable unit)");
        return Ok(());
    }
    println!("  1 {name} =");
    for edge in &measurement.conversions {
        let target = organizer
            .measurement(&edge.to_measurement_id)
            .map_or_else(|_| edge.to_measurement_id.clone(), |m| m.name.clone());
        let factor = fmt_qty(edge.factor);
        println!("    {factor} {target}");
    }
    Ok(())
}

pub(crate) fn cmd_measurement_link(
    organizer: &mut Organizer,
    from: &str,
    to: &str,
    factor: f64,
    json: bool,
) -> Result<()> {
    organizer.link_measurements(from, to, factor)?;
    let from_name = organizer.measurement(from)?.name.clone();
    let to_name = organizer.measurement(to)?.name.clone();
    if json {
        println!(
            "{}",
            serde_json::json!({ "from": from_name, "to": to_name, "factor": factor })
        );
    } else {
        let factor = fmt_qty(factor);
        println!("Linked: 1 {from_name} = {factor} {to_name}");
        println!("Note: the reverse direction is a separate edge; author it yourself if needed.");
    }
    Ok(())
}

pub(crate) fn cmd_measurement_convert(
    organizer: &Organizer,
    quantity: f64,
    from: &str,
    to: &str,
    json: bool,
) -> Result<()> {
    let from_name = organizer.measurement(from)?.name.clone();
    let to_name = organizer.measurement(to)?.name.clone();

    match organizer.convert_quantity(from, to, quantity)? {
        Some(converted) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "from": from_name,
                        "to": to_name,
                        "quantity": quantity,
                        "converted": converted,
                    })
                );
            } else {
                let q = fmt_qty(quantity);
                let c = fmt_qty(converted);
                println!("{q} {from_name} = {c} {to_name}");
            }
            Ok(())
        }
        None => {
            let message = format!("No conversion path from {from_name} to {to_name}");
            if json {
                println!("{}", json_error(&message));
            } else {
                eprintln!("{message}");
            }
            process::exit(2);
        }
    }
}
