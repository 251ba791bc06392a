//! Cooking session state machine.
//!
//! A session tracks one scaling/checklist run of a recipe for one user.
//! `active → completed` and `active → cancelled` are the only transitions;
//! both are terminal. At most one active session exists per
//! `(recipe_id, user_id)`: the pair is a key in an index rebuilt at
//! construction, so the guarantee is structural rather than the result of a
//! linear scan at each start.

use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::deduct::{LedgerEntry, deduct};
use crate::models::{CookingSession, InventoryItem, Measurement, Recipe, SessionStatus, new_id};

type SessionKey = (String, String);

/// All cooking sessions, persisted as a flat list but indexed by
/// `(recipe_id, user_id)` for the active ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CookingSession>", into = "Vec<CookingSession>")]
pub struct Sessions {
    records: Vec<CookingSession>,
    active: HashMap<SessionKey, usize>,
}

impl From<Vec<CookingSession>> for Sessions {
    /// Rebuild the active index from stored records. Should stored data ever
    /// carry two active sessions for one pair, the first wins (the one a
    /// resume would have found) and the rest are cancelled on the spot.
    fn from(records: Vec<CookingSession>) -> Self {
        let mut sessions = Sessions {
            records,
            active: HashMap::new(),
        };
        for i in 0..sessions.records.len() {
            if sessions.records[i].status != SessionStatus::Active {
                continue;
            }
            let key = (
                sessions.records[i].recipe_id.clone(),
                sessions.records[i].user_id.clone(),
            );
            if sessions.active.contains_key(&key) {
                sessions.records[i].status = SessionStatus::Cancelled;
            } else {
                sessions.active.insert(key, i);
            }
        }
        sessions
    }
}

impl From<Sessions> for Vec<CookingSession> {
    fn from(sessions: Sessions) -> Self {
        sessions.records
    }
}

/// Per-ingredient deduction ledger produced by completing a session.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientDeduction {
    pub ingredient_id: String,
    pub ledger: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub session_id: String,
    pub scaling_factor: f64,
    pub deductions: Vec<IngredientDeduction>,
}

impl Sessions {
    #[must_use]
    pub fn records(&self) -> &[CookingSession] {
        &self.records
    }

    #[must_use]
    pub fn active(&self, recipe_id: &str, user_id: &str) -> Option<&CookingSession> {
        let key = (recipe_id.to_string(), user_id.to_string());
        self.active.get(&key).map(|&i| &self.records[i])
    }

    /// Start cooking: resume the active session for `(recipe, user)` when one
    /// exists (progress intact), otherwise create a fresh session seeded with
    /// the recipe's base serving count and empty checklists.
    pub fn start(&mut self, recipe: &Recipe, user_id: &str) -> &CookingSession {
        let key = (recipe.id.clone(), user_id.to_string());
        if let Some(&i) = self.active.get(&key) {
            return &self.records[i];
        }
        let idx = self.records.len();
        self.records.push(CookingSession {
            id: new_id(),
            recipe_id: recipe.id.clone(),
            user_id: user_id.to_string(),
            ingredients_checked: Vec::new(),
            steps_checked: Vec::new(),
            serving_size: recipe.servings,
            status: SessionStatus::Active,
        });
        self.active.insert(key, idx);
        &self.records[idx]
    }

    /// Replace an active session record in place (last write wins). Every
    /// checklist toggle and serving-size change goes through here as a full
    /// overwrite of the record.
    pub fn update(&mut self, session: CookingSession) -> Result<()> {
        let key = (session.recipe_id.clone(), session.user_id.clone());
        let Some(&i) = self.active.get(&key) else {
            bail!("No active cooking session for this recipe");
        };
        if self.records[i].id != session.id {
            bail!("Cooking session is stale; start cooking again");
        }
        if session.status != SessionStatus::Active {
            bail!("Use complete or cancel to end a cooking session");
        }
        self.records[i] = session;
        Ok(())
    }

    /// Complete the active session for `(recipe, user)`.
    ///
    /// Effects, in order: compute the scaling factor, deduct every recipe
    /// ingredient from the inventory (each deduction operating on the output
    /// of the previous one), mark the session completed, bump the recipe's
    /// cook count. The deductions run on a working copy and all four effects
    /// commit together, so callers never observe a partial application.
    ///
    /// The caller is responsible for the checklist precondition and for
    /// verifying sufficiency beforehand; shortfalls here under-deduct
    /// silently.
    pub fn complete(
        &mut self,
        recipe: &mut Recipe,
        user_id: &str,
        inventory: &mut Vec<InventoryItem>,
        measurements: &[Measurement],
    ) -> Result<CompletionSummary> {
        let key = (recipe.id.clone(), user_id.to_string());
        let Some(&i) = self.active.get(&key) else {
            bail!("No active cooking session for this recipe");
        };

        let scaling_factor = self.records[i].serving_size / recipe.servings;
        let mut lots = inventory.clone();
        let mut deductions = Vec::with_capacity(recipe.ingredients.len());
        for ingredient in &recipe.ingredients {
            let required = ingredient.quantity * scaling_factor;
            let outcome = deduct(
                &ingredient.ingredient_id,
                &ingredient.measurement_id,
                required,
                &lots,
                measurements,
                user_id,
            );
            lots = outcome.lots;
            deductions.push(IngredientDeduction {
                ingredient_id: ingredient.ingredient_id.clone(),
                ledger: outcome.ledger,
            });
        }

        *inventory = lots;
        self.records[i].status = SessionStatus::Completed;
        self.active.remove(&key);
        recipe.cook_count += 1;

        Ok(CompletionSummary {
            session_id: self.records[i].id.clone(),
            scaling_factor,
            deductions,
        })
    }

    /// Cancel the active session for `(recipe, user)`. No inventory or
    /// cook-count side effects.
    pub fn cancel(&mut self, recipe_id: &str, user_id: &str) -> Result<()> {
        let key = (recipe_id.to_string(), user_id.to_string());
        let Some(&i) = self.active.get(&key) else {
            bail!("No active cooking session for this recipe");
        };
        self.records[i].status = SessionStatus::Cancelled;
        self.active.remove(&key);
        Ok(())
    }

    /// Cascade for recipe deletion: drop every session of the recipe and
    /// rebuild the index.
    pub fn remove_for_recipe(&mut self, recipe_id: &str) {
        self.records.retain(|s| s.recipe_id != recipe_id);
        self.active.clear();
        for (i, session) in self.records.iter().enumerate() {
            if session.status == SessionStatus::Active {
                self.active
                    .insert((session.recipe_id.clone(), session.user_id.clone()), i);
            }
        }
    }
}
