//! Default seed data: the measurement graph, a starter ingredient catalog,
//! and a couple of recipes so a fresh store is immediately usable.
//!
//! Conversion factors are authored per direction as independent edges. Do
//! not derive one direction from the other or close the graph transitively;
//! only the edges written here exist.

use crate::models::{
    AppData, Conversion, Ingredient, Measurement, Recipe, RecipeIngredient, User, now_rfc3339,
};

/// Bumped whenever new default ingredients/measurements ship; stores with an
/// older version get the additions merged in on load.
pub const SCHEMA_VERSION: i64 = 2;

pub const SEED_USER_ID: &str = "user-chef";

fn unit(id: &str, name: &str, edges: &[(&str, f64)]) -> Measurement {
    Measurement {
        id: id.to_string(),
        name: name.to_string(),
        conversions: edges
            .iter()
            .map(|(to, factor)| Conversion {
                to_measurement_id: (*to).to_string(),
                factor: *factor,
            })
            .collect(),
    }
}

#[must_use]
#[allow(clippy::too_many_lines)]
pub fn default_measurements() -> Vec<Measurement> {
    vec![
        // Volume
        unit(
            "cup",
            "Cup",
            &[
                ("tablespoon", 16.0),
                ("teaspoon", 48.0),
                ("fluid-ounce", 8.0),
                ("pint", 0.5),
                ("milliliter", 236.588),
                ("liter", 0.236588),
            ],
        ),
        unit(
            "tablespoon",
            "Tablespoon",
            &[
                ("cup", 0.0625),
                ("teaspoon", 3.0),
                ("fluid-ounce", 0.5),
                ("milliliter", 14.7868),
            ],
        ),
        unit(
            "teaspoon",
            "Teaspoon",
            &[
                ("tablespoon", 0.333333),
                ("cup", 0.020833),
                ("milliliter", 4.92892),
            ],
        ),
        unit(
            "fluid-ounce",
            "Fluid Ounce",
            &[
                ("cup", 0.125),
                ("tablespoon", 2.0),
                ("milliliter", 29.5735),
            ],
        ),
        unit(
            "pint",
            "Pint",
            &[("cup", 2.0), ("quart", 0.5), ("milliliter", 473.176)],
        ),
        unit(
            "quart",
            "Quart",
            &[("pint", 2.0), ("gallon", 0.25), ("liter", 0.946353)],
        ),
        unit(
            "gallon",
            "Gallon",
            &[("quart", 4.0), ("liter", 3.78541)],
        ),
        unit(
            "liter",
            "Liter",
            &[
                ("milliliter", 1000.0),
                ("cup", 4.22675),
                ("quart", 1.05669),
                ("gallon", 0.264172),
            ],
        ),
        unit(
            "milliliter",
            "Milliliter",
            &[
                ("liter", 0.001),
                ("cup", 0.004227),
                ("tablespoon", 0.067628),
                ("teaspoon", 0.202884),
                ("fluid-ounce", 0.033814),
                ("pint", 0.002113),
            ],
        ),
        // Weight
        unit(
            "ounce",
            "Ounce",
            &[("pound", 0.0625), ("gram", 28.3495)],
        ),
        unit(
            "pound",
            "Pound",
            &[
                ("ounce", 16.0),
                ("gram", 453.592),
                ("kilogram", 0.453592),
            ],
        ),
        unit(
            "gram",
            "Gram",
            &[
                ("kilogram", 0.001),
                ("milligram", 1000.0),
                ("ounce", 0.035274),
                ("pound", 0.002205),
            ],
        ),
        unit(
            "kilogram",
            "Kilogram",
            &[("gram", 1000.0), ("pound", 2.20462)],
        ),
        unit("milligram", "Milligram", &[("gram", 0.001)]),
        // Countable units: no conversions on purpose.
        unit("piece", "Piece", &[]),
        unit("slice", "Slice", &[]),
        unit("clove", "Clove", &[]),
        unit("pinch", "Pinch", &[]),
        unit("dash", "Dash", &[]),
    ]
}

fn ingredient(id: &str, name: &str) -> Ingredient {
    Ingredient {
        id: id.to_string(),
        name: name.to_string(),
        is_custom: false,
    }
}

#[must_use]
pub fn default_ingredients() -> Vec<Ingredient> {
    vec![
        ingredient("flour", "Flour"),
        ingredient("sugar", "Sugar"),
        ingredient("brown-sugar", "Brown Sugar"),
        ingredient("salt", "Salt"),
        ingredient("black-pepper", "Black Pepper"),
        ingredient("butter", "Butter"),
        ingredient("egg", "Egg"),
        ingredient("milk", "Milk"),
        ingredient("olive-oil", "Olive Oil"),
        ingredient("vegetable-oil", "Vegetable Oil"),
        ingredient("garlic", "Garlic"),
        ingredient("onion", "Onion"),
        ingredient("rice", "Rice"),
        ingredient("pasta", "Pasta"),
        ingredient("tomato", "Tomato"),
        ingredient("chicken-breast", "Chicken Breast"),
        ingredient("baking-powder", "Baking Powder"),
        ingredient("vanilla-extract", "Vanilla Extract"),
    ]
}

#[must_use]
pub fn default_recipes() -> Vec<Recipe> {
    let line = |ingredient_id: &str, quantity: f64, measurement_id: &str| RecipeIngredient {
        ingredient_id: ingredient_id.to_string(),
        quantity,
        measurement_id: measurement_id.to_string(),
    };
    vec![
        Recipe {
            id: "recipe-pancakes".to_string(),
            user_id: SEED_USER_ID.to_string(),
            name: "Simple Pancakes".to_string(),
            description: "Weekend griddle pancakes from pantry staples.".to_string(),
            servings: 4.0,
            ingredients: vec![
                line("flour", 2.0, "cup"),
                line("milk", 1.5, "cup"),
                line("egg", 2.0, "piece"),
                line("butter", 2.0, "tablespoon"),
                line("sugar", 2.0, "tablespoon"),
                line("baking-powder", 2.0, "teaspoon"),
                line("salt", 0.5, "teaspoon"),
            ],
            instructions: vec![
                "Whisk the dry ingredients together.".to_string(),
                "Beat in the milk, eggs, and melted butter until smooth.".to_string(),
                "Ladle onto a hot griddle; flip when bubbles form.".to_string(),
            ],
            view_count: 0,
            cook_count: 0,
            created_at: now_rfc3339(),
        },
        Recipe {
            id: "recipe-garlic-rice".to_string(),
            user_id: SEED_USER_ID.to_string(),
            name: "Garlic Butter Rice".to_string(),
            description: "A quick savory side.".to_string(),
            servings: 2.0,
            ingredients: vec![
                line("rice", 1.0, "cup"),
                line("butter", 2.0, "tablespoon"),
                line("garlic", 2.0, "clove"),
                line("salt", 0.25, "teaspoon"),
            ],
            instructions: vec![
                "Melt the butter and soften the garlic in it.".to_string(),
                "Stir in the rice, add two cups of water, and simmer covered.".to_string(),
                "Rest five minutes, then fluff.".to_string(),
            ],
            view_count: 0,
            cook_count: 0,
            created_at: now_rfc3339(),
        },
    ]
}

#[must_use]
pub fn seed_user() -> User {
    User {
        id: SEED_USER_ID.to_string(),
        name: "chef".to_string(),
        created_at: now_rfc3339(),
    }
}

/// A complete freshly seeded aggregate, logged in as the seed user so a new
/// store works without ceremony.
#[must_use]
pub fn default_app_data() -> AppData {
    AppData {
        version: SCHEMA_VERSION,
        users: vec![seed_user()],
        recipes: default_recipes(),
        ingredients: default_ingredients(),
        measurements: default_measurements(),
        inventory: Vec::new(),
        sessions: crate::session::Sessions::default(),
        current_user_id: Some(SEED_USER_ID.to_string()),
    }
}

/// Merge default ingredients/measurements a stored aggregate is missing,
/// matching by id or case-insensitive name so user-renamed entries are not
/// duplicated. Used when loading data written by an older schema version.
pub fn merge_defaults(data: &mut AppData) {
    for m in default_measurements() {
        let exists = data
            .measurements
            .iter()
            .any(|have| have.id == m.id || have.name.eq_ignore_ascii_case(&m.name));
        if !exists {
            data.measurements.push(m);
        }
    }
    for i in default_ingredients() {
        let exists = data
            .ingredients
            .iter()
            .any(|have| have.id == i.id || have.name.eq_ignore_ascii_case(&i.name));
        if !exists {
            data.ingredients.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;

    #[test]
    fn test_countable_units_have_no_conversions() {
        let ms = default_measurements();
        for id in ["piece", "slice", "clove", "pinch", "dash"] {
            let m = ms.iter().find(|m| m.id == id).unwrap();
            assert!(m.conversions.is_empty(), "{id} should have no edges");
        }
    }

    #[test]
    fn test_volume_and_weight_families_disconnected() {
        let ms = default_measurements();
        assert!(convert("cup", "gram", 1.0, &ms).is_none());
        assert!(convert("pound", "liter", 1.0, &ms).is_none());
    }

    #[test]
    fn test_edges_point_at_known_units() {
        let ms = default_measurements();
        for m in &ms {
            for edge in &m.conversions {
                assert!(
                    ms.iter().any(|t| t.id == edge.to_measurement_id),
                    "{} points at unknown unit {}",
                    m.id,
                    edge.to_measurement_id
                );
            }
        }
    }

    #[test]
    fn test_seed_recipes_reference_seeded_entries() {
        let data = default_app_data();
        for recipe in &data.recipes {
            for line in &recipe.ingredients {
                assert!(data.ingredient(&line.ingredient_id).is_some());
                assert!(data.measurement(&line.measurement_id).is_some());
            }
        }
    }

    #[test]
    fn test_merge_defaults_backfills_missing() {
        let mut data = default_app_data();
        data.measurements.retain(|m| m.id != "gallon");
        data.ingredients.retain(|i| i.id != "rice");
        data.version = 1;

        merge_defaults(&mut data);
        assert!(data.measurement("gallon").is_some());
        assert!(data.ingredient("rice").is_some());
    }

    #[test]
    fn test_merge_defaults_respects_renames_by_id() {
        let mut data = default_app_data();
        // A user-edited unit keeps its id; the merge must not re-add it.
        let before = data.measurements.len();
        for m in &mut data.measurements {
            if m.id == "cup" {
                m.name = "US Cup".to_string();
            }
        }
        merge_defaults(&mut data);
        assert_eq!(data.measurements.len(), before);
    }

    #[test]
    fn test_merge_defaults_idempotent() {
        let mut data = default_app_data();
        merge_defaults(&mut data);
        let ms = data.measurements.len();
        let is = data.ingredients.len();
        merge_defaults(&mut data);
        assert_eq!(data.measurements.len(), ms);
        assert_eq!(data.ingredients.len(), is);
    }
}
