//! Unit conversion over the measurement graph.
//!
//! Only direct edges are followed: no transitive search and no reverse-edge
//! inference, even when the inverse edge exists elsewhere in the graph.

use serde::Serialize;

use crate::models::{InventoryItem, Measurement};

/// Convert `quantity` from one unit to another.
///
/// Identity when `from_id == to_id`; otherwise a single direct-edge lookup.
/// `None` is the "no conversion path" sentinel.
#[must_use]
pub fn convert(
    from_id: &str,
    to_id: &str,
    quantity: f64,
    measurements: &[Measurement],
) -> Option<f64> {
    if from_id == to_id {
        return Some(quantity);
    }
    let from = measurements.iter().find(|m| m.id == from_id)?;
    let edge = from
        .conversions
        .iter()
        .find(|c| c.to_measurement_id == to_id)?;
    Some(quantity * edge.factor)
}

/// Total stock of an ingredient expressed in `target_unit`, summed across
/// all of its lots. Lots with no conversion path to the target unit are
/// silently excluded; callers that care see the gap as missing availability.
#[must_use]
pub fn total_in_unit(
    ingredient_id: &str,
    target_unit: &str,
    lots: &[InventoryItem],
    measurements: &[Measurement],
) -> f64 {
    lots.iter()
        .filter(|lot| lot.ingredient_id == ingredient_id)
        .filter_map(|lot| convert(&lot.measurement_id, target_unit, lot.quantity, measurements))
        .sum()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sufficiency {
    pub has_enough: bool,
    pub available: f64,
}

/// Check whether the convertible stock of an ingredient covers a required
/// quantity. The comparison is exact and inclusive: `available == required`
/// counts as enough. No epsilon at this layer.
#[must_use]
pub fn sufficiency(
    ingredient_id: &str,
    required_unit: &str,
    required_qty: f64,
    lots: &[InventoryItem],
    measurements: &[Measurement],
) -> Sufficiency {
    let available = total_in_unit(ingredient_id, required_unit, lots, measurements);
    Sufficiency {
        has_enough: available >= required_qty,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn measurements() -> Vec<Measurement> {
        seed::default_measurements()
    }

    fn lot(ingredient: &str, unit: &str, quantity: f64) -> InventoryItem {
        InventoryItem {
            user_id: "u1".to_string(),
            ingredient_id: ingredient.to_string(),
            measurement_id: unit.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_identity_conversion() {
        let ms = measurements();
        for unit in ["cup", "gram", "piece"] {
            let got = convert(unit, unit, 2.5, &ms).unwrap();
            assert!((got - 2.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_direct_edge_conversion() {
        let ms = measurements();
        let tbsp = convert("cup", "tablespoon", 1.0, &ms).unwrap();
        assert!((tbsp - 16.0).abs() < f64::EPSILON);
        let cup = convert("tablespoon", "cup", 1.0, &ms).unwrap();
        assert!((cup - 0.0625).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_path_returns_none() {
        let ms = measurements();
        // Countable units carry no conversions.
        assert!(convert("piece", "cup", 5.0, &ms).is_none());
        assert!(convert("cup", "piece", 1.0, &ms).is_none());
        // Volume and weight families are not connected.
        assert!(convert("cup", "gram", 1.0, &ms).is_none());
    }

    #[test]
    fn test_no_transitive_search() {
        // gallon → quart and quart → pint exist, but gallon → pint does not.
        let ms = measurements();
        assert!(convert("gallon", "quart", 1.0, &ms).is_some());
        assert!(convert("quart", "pint", 1.0, &ms).is_some());
        assert!(convert("gallon", "pint", 1.0, &ms).is_none());
    }

    #[test]
    fn test_no_reverse_edge_inference() {
        let ms = vec![
            Measurement {
                id: "a".into(),
                name: "A".into(),
                conversions: vec![crate::models::Conversion {
                    to_measurement_id: "b".into(),
                    factor: 2.0,
                }],
            },
            Measurement {
                id: "b".into(),
                name: "B".into(),
                conversions: vec![],
            },
        ];
        assert!(convert("a", "b", 1.0, &ms).is_some());
        assert!(convert("b", "a", 1.0, &ms).is_none());
    }

    #[test]
    fn test_unknown_unit_is_no_path() {
        let ms = measurements();
        assert!(convert("cubit", "cup", 1.0, &ms).is_none());
        assert!(convert("cup", "cubit", 1.0, &ms).is_none());
    }

    #[test]
    fn test_total_in_unit_aggregates_lots() {
        let ms = measurements();
        let lots = vec![lot("flour", "cup", 2.0), lot("flour", "milliliter", 500.0)];
        let total = total_in_unit("flour", "milliliter", &lots, &ms);
        assert!((total - (2.0 * 236.588 + 500.0)).abs() < 0.01);
    }

    #[test]
    fn test_total_in_unit_excludes_unconvertible_lots() {
        let ms = measurements();
        // The "piece" lot has no path to milliliters and is left out.
        let lots = vec![lot("egg", "piece", 6.0), lot("egg", "milliliter", 100.0)];
        let total = total_in_unit("egg", "milliliter", &lots, &ms);
        assert!((total - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_in_unit_ignores_other_ingredients() {
        let ms = measurements();
        let lots = vec![lot("flour", "cup", 2.0), lot("sugar", "cup", 5.0)];
        let total = total_in_unit("flour", "cup", &lots, &ms);
        assert!((total - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sufficiency_inclusive_boundary() {
        let ms = measurements();
        let lots = vec![lot("flour", "cup", 1.0)];
        let s = sufficiency("flour", "cup", 1.0, &lots, &ms);
        assert!(s.has_enough);
        assert!((s.available - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sufficiency_short() {
        let ms = measurements();
        let lots = vec![lot("flour", "cup", 0.5)];
        let s = sufficiency("flour", "cup", 1.0, &lots, &ms);
        assert!(!s.has_enough);
        assert!((s.available - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sufficiency_across_units() {
        let ms = measurements();
        // 500 ml ≈ 2.11 cups, enough for 2 cups.
        let lots = vec![lot("milk", "milliliter", 500.0)];
        let s = sufficiency("milk", "cup", 2.0, &lots, &ms);
        assert!(s.has_enough);
    }
}
