use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::convert::{self, Sufficiency};
use crate::csv_import::{self, PantryImportSummary};
use crate::models::{
    AppData, CookingSession, Ingredient, InventoryItem, Measurement, Recipe, RecipeIngredient,
    User, filter_by_name, new_id, now_rfc3339, validate_conversion_factor, validate_name,
    validate_quantity, validate_servings,
};
use crate::session::CompletionSummary;
use crate::store::Store;

/// The single coordinating state holder.
///
/// Owns the aggregate and the store; every command is a `&mut self` method
/// that validates at the boundary, applies an in-place delta, and persists.
/// One mutation runs at a time and readers only ever see a consistent
/// snapshot. The read-then-write deduction path is not safe under concurrent
/// writers; a multi-writer adaptation would need versioned inventory.
pub struct Organizer {
    store: Store,
    data: AppData,
}

/// Live view of a cooking session: checklist state plus per-ingredient
/// availability in the recipe's units.
#[derive(Debug, Clone, Serialize)]
pub struct CookingStatus {
    pub session: CookingSession,
    pub recipe_name: String,
    pub scaling_factor: f64,
    pub ingredients: Vec<IngredientStatus>,
    pub steps: Vec<StepStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientStatus {
    pub name: String,
    pub required: f64,
    pub unit: String,
    pub available: f64,
    pub has_enough: bool,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepStatus {
    pub text: String,
    pub checked: bool,
}

impl Organizer {
    pub fn open(path: &Path) -> Result<Self> {
        let mut store = Store::open(path)?;
        let data = store.load()?;
        Ok(Organizer { store, data })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut store = Store::open_in_memory()?;
        let data = store.load()?;
        Ok(Organizer { store, data })
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.data)
    }

    // --- Users ---

    pub fn current_user(&self) -> Result<&User> {
        let id = self
            .data
            .current_user_id
            .as_deref()
            .context("No user is logged in")?;
        self.data
            .users
            .iter()
            .find(|u| u.id == id)
            .context("Logged-in user no longer exists")
    }

    fn current_user_id(&self) -> Result<String> {
        Ok(self.current_user()?.id.clone())
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.data.users
    }

    pub fn add_user(&mut self, name: &str) -> Result<User> {
        validate_name("User", name)?;
        if self.data.user_by_name(name).is_some() {
            bail!("Username '{name}' is already taken");
        }
        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            created_at: now_rfc3339(),
        };
        self.data.users.push(user.clone());
        self.persist()?;
        Ok(user)
    }

    pub fn login(&mut self, name: &str) -> Result<User> {
        let user = self
            .data
            .user_by_name(name)
            .with_context(|| format!("User '{name}' not found"))?
            .clone();
        self.data.current_user_id = Some(user.id.clone());
        self.persist()?;
        Ok(user)
    }

    // --- Ingredients ---

    #[must_use]
    pub fn ingredients(&self, search: Option<&str>) -> Vec<&Ingredient> {
        match search {
            Some(query) => filter_by_name(query, &self.data.ingredients, |i| &i.name),
            None => self.data.ingredients.iter().collect(),
        }
    }

    pub fn add_ingredient(&mut self, name: &str) -> Result<Ingredient> {
        validate_name("Ingredient", name)?;
        if self.data.ingredient_by_name(name).is_some() {
            bail!("Ingredient '{name}' already exists");
        }
        let ingredient = Ingredient {
            id: new_id(),
            name: name.trim().to_string(),
            is_custom: true,
        };
        self.data.ingredients.push(ingredient.clone());
        self.persist()?;
        Ok(ingredient)
    }

    // --- Measurements ---

    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        &self.data.measurements
    }

    pub fn measurement(&self, unit: &str) -> Result<&Measurement> {
        self.data
            .measurement_by_ref(unit)
            .with_context(|| format!("Unknown unit '{unit}'"))
    }

    pub fn add_measurement(&mut self, name: &str) -> Result<Measurement> {
        validate_name("Measurement", name)?;
        if self.data.measurement_by_ref(name).is_some() {
            bail!("Measurement '{name}' already exists");
        }
        let measurement = Measurement {
            id: new_id(),
            name: name.trim().to_string(),
            conversions: Vec::new(),
        };
        self.data.measurements.push(measurement.clone());
        self.persist()?;
        Ok(measurement)
    }

    /// Author a single directed conversion edge: `1 from = factor to`.
    /// The reverse direction is a separate edge the user must author
    /// themselves; it is never inferred.
    pub fn link_measurements(&mut self, from: &str, to: &str, factor: f64) -> Result<()> {
        validate_conversion_factor(factor)?;
        let from_id = self.measurement(from)?.id.clone();
        let to_id = self.measurement(to)?.id.clone();
        if from_id == to_id {
            bail!("Cannot link a unit to itself");
        }
        let measurement = self
            .data
            .measurements
            .iter_mut()
            .find(|m| m.id == from_id)
            .context("Unknown unit")?;
        if let Some(edge) = measurement
            .conversions
            .iter_mut()
            .find(|c| c.to_measurement_id == to_id)
        {
            edge.factor = factor;
        } else {
            measurement.conversions.push(crate::models::Conversion {
                to_measurement_id: to_id,
                factor,
            });
        }
        self.persist()?;
        Ok(())
    }

    /// Convert a quantity between two units. `Ok(None)` means the pair has
    /// no direct conversion path.
    pub fn convert_quantity(&self, from: &str, to: &str, quantity: f64) -> Result<Option<f64>> {
        let from_id = self.measurement(from)?.id.clone();
        let to_id = self.measurement(to)?.id.clone();
        Ok(convert::convert(
            &from_id,
            &to_id,
            quantity,
            &self.data.measurements,
        ))
    }

    // --- Recipes ---

    pub fn recipes(&self, search: Option<&str>) -> Result<Vec<&Recipe>> {
        let user_id = self.current_user_id()?;
        let mine: Vec<&Recipe> = self
            .data
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        Ok(match search {
            Some(query) => {
                let needle = query.to_lowercase();
                mine.into_iter()
                    .filter(|r| r.name.to_lowercase().contains(&needle))
                    .collect()
            }
            None => mine,
        })
    }

    fn recipe_by_name(&self, name: &str) -> Result<&Recipe> {
        let user_id = self.current_user_id()?;
        self.data
            .recipes
            .iter()
            .find(|r| r.user_id == user_id && r.name.eq_ignore_ascii_case(name))
            .with_context(|| format!("Recipe '{name}' not found"))
    }

    fn recipe_mut_by_name(&mut self, name: &str) -> Result<&mut Recipe> {
        let user_id = self.current_user_id()?;
        self.data
            .recipes
            .iter_mut()
            .find(|r| r.user_id == user_id && r.name.eq_ignore_ascii_case(name))
            .with_context(|| format!("Recipe '{name}' not found"))
    }

    pub fn add_recipe(&mut self, name: &str, description: &str, servings: f64) -> Result<Recipe> {
        validate_name("Recipe", name)?;
        validate_servings(servings)?;
        let user_id = self.current_user_id()?;
        if self.recipe_by_name(name).is_ok() {
            bail!("Recipe '{name}' already exists");
        }
        let recipe = Recipe {
            id: new_id(),
            user_id,
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            servings,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            view_count: 0,
            cook_count: 0,
            created_at: now_rfc3339(),
        };
        self.data.recipes.push(recipe.clone());
        self.persist()?;
        Ok(recipe)
    }

    /// Fetch a recipe without counting a view.
    pub fn recipe(&self, name: &str) -> Result<Recipe> {
        Ok(self.recipe_by_name(name)?.clone())
    }

    /// Fetch a recipe for display, counting the view.
    pub fn recipe_detail(&mut self, name: &str) -> Result<Recipe> {
        let recipe = self.recipe_mut_by_name(name)?;
        recipe.view_count += 1;
        let detail = recipe.clone();
        self.persist()?;
        Ok(detail)
    }

    pub fn add_recipe_ingredient(
        &mut self,
        recipe_name: &str,
        ingredient_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<Recipe> {
        validate_quantity(quantity)?;
        let ingredient_id = self
            .data
            .ingredient_by_name(ingredient_name)
            .with_context(|| format!("Ingredient '{ingredient_name}' not found"))?
            .id
            .clone();
        let measurement_id = self.measurement(unit)?.id.clone();
        let recipe = self.recipe_mut_by_name(recipe_name)?;
        recipe.ingredients.push(RecipeIngredient {
            ingredient_id,
            quantity,
            measurement_id,
        });
        let updated = recipe.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Remove every line of an ingredient from a recipe. Returns false when
    /// the recipe had none.
    pub fn remove_recipe_ingredient(
        &mut self,
        recipe_name: &str,
        ingredient_name: &str,
    ) -> Result<bool> {
        let ingredient_id = self
            .data
            .ingredient_by_name(ingredient_name)
            .with_context(|| format!("Ingredient '{ingredient_name}' not found"))?
            .id
            .clone();
        let recipe = self.recipe_mut_by_name(recipe_name)?;
        let before = recipe.ingredients.len();
        recipe.ingredients.retain(|l| l.ingredient_id != ingredient_id);
        let removed = recipe.ingredients.len() < before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn add_recipe_step(&mut self, recipe_name: &str, text: &str) -> Result<()> {
        validate_name("Step", text)?;
        let recipe = self.recipe_mut_by_name(recipe_name)?;
        recipe.instructions.push(text.trim().to_string());
        self.persist()?;
        Ok(())
    }

    pub fn set_recipe_servings(&mut self, recipe_name: &str, servings: f64) -> Result<()> {
        validate_servings(servings)?;
        let recipe = self.recipe_mut_by_name(recipe_name)?;
        recipe.servings = servings;
        self.persist()?;
        Ok(())
    }

    /// Delete a recipe and cascade to its cooking sessions. Inventory is
    /// never touched by recipe deletion.
    pub fn delete_recipe(&mut self, name: &str) -> Result<()> {
        let recipe_id = self.recipe_by_name(name)?.id.clone();
        self.data.recipes.retain(|r| r.id != recipe_id);
        self.data.sessions.remove_for_recipe(&recipe_id);
        self.persist()?;
        Ok(())
    }

    // --- Inventory ---

    pub fn inventory(&self) -> Result<Vec<&InventoryItem>> {
        let user_id = self.current_user_id()?;
        Ok(self
            .data
            .inventory
            .iter()
            .filter(|lot| lot.user_id == user_id)
            .collect())
    }

    /// Add stock. Merges into the existing lot when the user already stocks
    /// this ingredient in this unit; the `(user, ingredient, unit)` triple
    /// is the lot's identity, so a second row is impossible.
    pub fn add_inventory(
        &mut self,
        ingredient_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<InventoryItem> {
        self.upsert_inventory(ingredient_name, quantity, unit, false)
    }

    /// Overwrite the lot's quantity instead of adding to it.
    pub fn set_inventory(
        &mut self,
        ingredient_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<InventoryItem> {
        self.upsert_inventory(ingredient_name, quantity, unit, true)
    }

    fn upsert_inventory(
        &mut self,
        ingredient_name: &str,
        quantity: f64,
        unit: &str,
        overwrite: bool,
    ) -> Result<InventoryItem> {
        validate_quantity(quantity)?;
        let user_id = self.current_user_id()?;
        let ingredient_id = self
            .data
            .ingredient_by_name(ingredient_name)
            .with_context(|| {
                format!("Ingredient '{ingredient_name}' not found; add it to the catalog first")
            })?
            .id
            .clone();
        let measurement_id = self.measurement(unit)?.id.clone();

        let existing = self.data.inventory.iter_mut().find(|lot| {
            lot.user_id == user_id
                && lot.ingredient_id == ingredient_id
                && lot.measurement_id == measurement_id
        });
        let lot = if let Some(lot) = existing {
            if overwrite {
                lot.quantity = quantity;
            } else {
                lot.quantity += quantity;
            }
            lot.clone()
        } else {
            let lot = InventoryItem {
                user_id,
                ingredient_id,
                measurement_id,
                quantity,
            };
            self.data.inventory.push(lot.clone());
            lot
        };
        self.persist()?;
        Ok(lot)
    }

    /// Drop a lot outright. Returns false when no such lot exists.
    pub fn remove_inventory(&mut self, ingredient_name: &str, unit: &str) -> Result<bool> {
        let user_id = self.current_user_id()?;
        let ingredient_id = self
            .data
            .ingredient_by_name(ingredient_name)
            .with_context(|| format!("Ingredient '{ingredient_name}' not found"))?
            .id
            .clone();
        let measurement_id = self.measurement(unit)?.id.clone();
        let before = self.data.inventory.len();
        self.data.inventory.retain(|lot| {
            !(lot.user_id == user_id
                && lot.ingredient_id == ingredient_id
                && lot.measurement_id == measurement_id)
        });
        let removed = self.data.inventory.len() < before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Availability of one ingredient in a unit of choice, over the current
    /// user's lots.
    pub fn availability(
        &self,
        ingredient_name: &str,
        unit: &str,
        required_qty: f64,
    ) -> Result<Sufficiency> {
        let user_id = self.current_user_id()?;
        let ingredient_id = self
            .data
            .ingredient_by_name(ingredient_name)
            .with_context(|| format!("Ingredient '{ingredient_name}' not found"))?
            .id
            .clone();
        let measurement_id = self.measurement(unit)?.id.clone();
        let lots: Vec<InventoryItem> = self
            .data
            .inventory
            .iter()
            .filter(|lot| lot.user_id == user_id)
            .cloned()
            .collect();
        Ok(convert::sufficiency(
            &ingredient_id,
            &measurement_id,
            required_qty,
            &lots,
            &self.data.measurements,
        ))
    }

    pub fn import_pantry_csv(&mut self, csv_data: &str, dry_run: bool) -> Result<PantryImportSummary> {
        let user_id = self.current_user_id()?;
        let rows = csv_import::parse_pantry_csv(csv_data.as_bytes())?;
        let summary = csv_import::import_pantry_rows(&mut self.data, &user_id, &rows, dry_run)?;
        if !dry_run {
            self.persist()?;
        }
        Ok(summary)
    }

    // --- Cooking sessions ---

    /// Start cooking a recipe, resuming the active session if one exists.
    pub fn start_cooking(&mut self, recipe_name: &str) -> Result<CookingSession> {
        let user_id = self.current_user_id()?;
        let recipe = self.recipe_by_name(recipe_name)?.clone();
        let session = self.data.sessions.start(&recipe, &user_id).clone();
        self.persist()?;
        Ok(session)
    }

    fn active_session(&self, recipe_name: &str) -> Result<CookingSession> {
        let user_id = self.current_user_id()?;
        let recipe = self.recipe_by_name(recipe_name)?;
        self.data
            .sessions
            .active(&recipe.id, &user_id)
            .with_context(|| format!("No active cooking session for '{recipe_name}'"))
            .cloned()
    }

    /// Current session state with per-ingredient availability.
    pub fn cooking_status(&self, recipe_name: &str) -> Result<CookingStatus> {
        let user_id = self.current_user_id()?;
        let recipe = self.recipe_by_name(recipe_name)?;
        let session = self.active_session(recipe_name)?;
        let scaling_factor = session.serving_size / recipe.servings;

        let lots: Vec<InventoryItem> = self
            .data
            .inventory
            .iter()
            .filter(|lot| lot.user_id == user_id)
            .cloned()
            .collect();

        let ingredients = recipe
            .ingredients
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let required = line.quantity * scaling_factor;
                let s = convert::sufficiency(
                    &line.ingredient_id,
                    &line.measurement_id,
                    required,
                    &lots,
                    &self.data.measurements,
                );
                IngredientStatus {
                    name: self
                        .data
                        .ingredient(&line.ingredient_id)
                        .map_or_else(|| line.ingredient_id.clone(), |ing| ing.name.clone()),
                    required,
                    unit: self
                        .data
                        .measurement(&line.measurement_id)
                        .map_or_else(|| line.measurement_id.clone(), |m| m.name.clone()),
                    available: s.available,
                    has_enough: s.has_enough,
                    checked: session.ingredients_checked.contains(&i),
                }
            })
            .collect();

        let steps = recipe
            .instructions
            .iter()
            .enumerate()
            .map(|(i, text)| StepStatus {
                text: text.clone(),
                checked: session.steps_checked.contains(&i),
            })
            .collect();

        Ok(CookingStatus {
            recipe_name: recipe.name.clone(),
            scaling_factor,
            session,
            ingredients,
            steps,
        })
    }

    /// Toggle an ingredient checkbox (0-based index into the recipe's
    /// ingredient list).
    pub fn check_ingredient(
        &mut self,
        recipe_name: &str,
        index: usize,
        checked: bool,
    ) -> Result<CookingSession> {
        let count = self.recipe_by_name(recipe_name)?.ingredients.len();
        if index >= count {
            bail!("Ingredient index out of range (recipe has {count} ingredients)");
        }
        let mut session = self.active_session(recipe_name)?;
        toggle(&mut session.ingredients_checked, index, checked);
        self.data.sessions.update(session.clone())?;
        self.persist()?;
        Ok(session)
    }

    /// Toggle a step checkbox (0-based index into the instruction list).
    pub fn check_step(
        &mut self,
        recipe_name: &str,
        index: usize,
        checked: bool,
    ) -> Result<CookingSession> {
        let count = self.recipe_by_name(recipe_name)?.instructions.len();
        if index >= count {
            bail!("Step index out of range (recipe has {count} steps)");
        }
        let mut session = self.active_session(recipe_name)?;
        toggle(&mut session.steps_checked, index, checked);
        self.data.sessions.update(session.clone())?;
        self.persist()?;
        Ok(session)
    }

    pub fn set_serving_size(
        &mut self,
        recipe_name: &str,
        serving_size: f64,
    ) -> Result<CookingSession> {
        validate_servings(serving_size)?;
        let mut session = self.active_session(recipe_name)?;
        session.serving_size = serving_size;
        self.data.sessions.update(session.clone())?;
        self.persist()?;
        Ok(session)
    }

    /// Complete the active session: requires every ingredient and step to be
    /// checked off, then scales, deducts inventory, marks the session
    /// completed, and bumps the recipe's cook count, all committed
    /// together.
    pub fn complete_cooking(&mut self, recipe_name: &str) -> Result<CompletionSummary> {
        let user_id = self.current_user_id()?;
        let recipe = self.recipe_by_name(recipe_name)?;
        let recipe_id = recipe.id.clone();
        let ingredient_count = recipe.ingredients.len();
        let step_count = recipe.instructions.len();

        let session = self.active_session(recipe_name)?;
        let unchecked_ingredients =
            (0..ingredient_count).any(|i| !session.ingredients_checked.contains(&i));
        let unchecked_steps = (0..step_count).any(|i| !session.steps_checked.contains(&i));
        if unchecked_ingredients || unchecked_steps {
            bail!("All ingredients and steps must be checked off before completing");
        }

        let AppData {
            recipes,
            sessions,
            inventory,
            measurements,
            ..
        } = &mut self.data;
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .context("Recipe disappeared mid-completion")?;
        let summary = sessions.complete(recipe, &user_id, inventory, measurements)?;
        self.persist()?;
        Ok(summary)
    }

    pub fn cancel_cooking(&mut self, recipe_name: &str) -> Result<()> {
        let user_id = self.current_user_id()?;
        let recipe_id = self.recipe_by_name(recipe_name)?.id.clone();
        self.data.sessions.cancel(&recipe_id, &user_id)?;
        self.persist()?;
        Ok(())
    }
}

fn toggle(checked: &mut Vec<usize>, index: usize, on: bool) {
    if on {
        if !checked.contains(&index) {
            checked.push(index);
        }
    } else {
        checked.retain(|&i| i != index);
    }
}
