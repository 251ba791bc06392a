use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Sessions;

/// A directed conversion edge: `1 unit(owner) = factor unit(to_measurement_id)`.
///
/// Edges are authored independently per direction. The absence of an edge
/// means "unknown path", never zero; no symmetry or transitivity is inferred
/// from the edges that do exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub to_measurement_id: String,
    pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conversions: Vec<Conversion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient_id: String,
    pub quantity: f64,
    pub measurement_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Baseline serving count used for scaling. Always > 0.
    pub servings: f64,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub cook_count: i64,
    pub created_at: String,
}

/// One inventory lot. The same ingredient may be stocked in several units at
/// once, each as its own lot, uniquely keyed by
/// `(user_id, ingredient_id, measurement_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub user_id: String,
    pub ingredient_id: String,
    pub measurement_id: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookingSession {
    pub id: String,
    pub recipe_id: String,
    pub user_id: String,
    #[serde(default)]
    pub ingredients_checked: Vec<usize>,
    #[serde(default)]
    pub steps_checked: Vec<usize>,
    pub serving_size: f64,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// The whole persisted aggregate. The store loads and saves it as one unit;
/// `service::Organizer` is the single mutator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppData {
    pub version: i64,
    pub users: Vec<User>,
    pub recipes: Vec<Recipe>,
    pub ingredients: Vec<Ingredient>,
    pub measurements: Vec<Measurement>,
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub sessions: Sessions,
    pub current_user_id: Option<String>,
}

impl AppData {
    #[must_use]
    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn ingredient_by_name(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn measurement(&self, id: &str) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    /// Resolve a measurement by id or case-insensitive name.
    #[must_use]
    pub fn measurement_by_ref(&self, unit: &str) -> Option<&Measurement> {
        self.measurements
            .iter()
            .find(|m| m.id == unit || m.name.eq_ignore_ascii_case(unit))
    }

    #[must_use]
    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.name.eq_ignore_ascii_case(name))
    }
}

/// Generate a new entity id: millisecond timestamp prefix + random suffix.
/// Callers may rely on uniqueness only, not on the format.
#[must_use]
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{millis:x}-{}", &suffix[..8])
}

#[must_use]
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Case-insensitive substring filter over named items, preserving order.
#[must_use]
pub fn filter_by_name<'a, T, F>(query: &str, items: &'a [T], name: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| name(item).to_lowercase().contains(&needle))
        .collect()
}

// --- Boundary validation (the engines never see invalid input) ---

pub fn validate_name(label: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("{label} name must not be empty");
    }
    Ok(())
}

pub fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok(())
}

pub fn validate_servings(servings: f64) -> Result<()> {
    if !servings.is_finite() || servings <= 0.0 {
        bail!("Servings must be greater than 0");
    }
    Ok(())
}

pub fn validate_conversion_factor(factor: f64) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        bail!("Conversion factor must be greater than 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(new_id()));
        }
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        let (prefix, suffix) = id.split_once('-').unwrap();
        assert!(!prefix.is_empty());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filter_by_name_case_insensitive() {
        let items = vec![
            Ingredient {
                id: "flour".into(),
                name: "Flour".into(),
                is_custom: false,
            },
            Ingredient {
                id: "sugar".into(),
                name: "Brown Sugar".into(),
                is_custom: false,
            },
        ];
        let hits = filter_by_name("SUG", &items, |i| &i.name);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Brown Sugar");
    }

    #[test]
    fn test_filter_by_name_empty_query_matches_all() {
        let items = vec![Ingredient {
            id: "salt".into(),
            name: "Salt".into(),
            is_custom: false,
        }];
        assert_eq!(filter_by_name("", &items, |i| &i.name).len(), 1);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Recipe", "Pancakes").is_ok());
        assert!(validate_name("Recipe", "   ").is_err());
        assert!(validate_name("Recipe", "").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.5).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_servings() {
        assert!(validate_servings(4.0).is_ok());
        assert!(validate_servings(0.5).is_ok());
        assert!(validate_servings(0.0).is_err());
    }

    #[test]
    fn test_validate_conversion_factor() {
        assert!(validate_conversion_factor(16.0).is_ok());
        assert!(validate_conversion_factor(0.0).is_err());
        assert!(validate_conversion_factor(f64::INFINITY).is_err());
    }

    #[test]
    fn test_session_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Active).unwrap(),
            "\"active\""
        );
        let status: SessionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, SessionStatus::Cancelled);
    }
}
