//! Persistence for the `AppData` aggregate.
//!
//! SQLite is used as a plain key-value store: one row per collection, each
//! value a JSON document. The core never touches the store directly; the
//! service loads the aggregate once, mutates it in memory, and saves after
//! every command.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::AppData;
use crate::seed;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store: {}", path.display()))?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self
            .get_raw(key)?
            .with_context(|| format!("Missing store key '{key}'"))?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Store key '{key}' holds unreadable data"))?;
        Ok(value)
    }

    /// Load the aggregate.
    ///
    /// An empty store is seeded with defaults and persisted. A store written
    /// by an older schema version gets newly introduced default ingredients
    /// and measurements merged in (matched by id or name) and is persisted
    /// before returning. An unreadable store is reported on stderr and
    /// replaced by fresh defaults, never a crash.
    pub fn load(&mut self) -> Result<AppData> {
        if self.get_raw("version")?.is_none() {
            let data = seed::default_app_data();
            self.save(&data)?;
            return Ok(data);
        }

        match self.load_existing() {
            Ok(mut data) => {
                if data.version < seed::SCHEMA_VERSION {
                    seed::merge_defaults(&mut data);
                    data.version = seed::SCHEMA_VERSION;
                    self.save(&data)?;
                }
                Ok(data)
            }
            Err(e) => {
                eprintln!("Warning: stored data is unreadable ({e:#}); starting from defaults");
                let data = seed::default_app_data();
                self.save(&data)?;
                Ok(data)
            }
        }
    }

    fn load_existing(&self) -> Result<AppData> {
        Ok(AppData {
            version: self.read("version")?,
            users: self.read("users")?,
            recipes: self.read("recipes")?,
            ingredients: self.read("ingredients")?,
            measurements: self.read("measurements")?,
            inventory: self.read("inventory")?,
            sessions: self.read("sessions")?,
            current_user_id: self.read("current_user_id")?,
        })
    }

    /// Persist the whole aggregate in one transaction.
    pub fn save(&mut self, data: &AppData) -> Result<()> {
        fn encode<T: Serialize>(value: &T) -> Result<String> {
            Ok(serde_json::to_string(value)?)
        }

        let rows = [
            ("version", encode(&data.version)?),
            ("users", encode(&data.users)?),
            ("recipes", encode(&data.recipes)?),
            ("ingredients", encode(&data.ingredients)?),
            ("measurements", encode(&data.measurements)?),
            ("inventory", encode(&data.inventory)?),
            ("sessions", encode(&data.sessions)?),
            ("current_user_id", encode(&data.current_user_id)?),
        ];

        let tx = self.conn.transaction()?;
        for (key, value) in &rows {
            tx.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InventoryItem, SessionStatus};

    #[test]
    fn test_fresh_store_is_seeded() {
        let mut store = Store::open_in_memory().unwrap();
        let data = store.load().unwrap();
        assert_eq!(data.version, seed::SCHEMA_VERSION);
        assert!(!data.measurements.is_empty());
        assert!(!data.ingredients.is_empty());
        assert_eq!(data.current_user_id.as_deref(), Some(seed::SEED_USER_ID));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = Store::open_in_memory().unwrap();
        let mut data = store.load().unwrap();
        data.inventory.push(InventoryItem {
            user_id: seed::SEED_USER_ID.to_string(),
            ingredient_id: "flour".to_string(),
            measurement_id: "cup".to_string(),
            quantity: 3.0,
        });
        let recipe = data.recipes[0].clone();
        data.sessions.start(&recipe, seed::SEED_USER_ID);
        store.save(&data).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back.inventory.len(), 1);
        assert!((back.inventory[0].quantity - 3.0).abs() < f64::EPSILON);
        let session = back.sessions.active(&recipe.id, seed::SEED_USER_ID).unwrap();
        assert_eq!(session.status, SessionStatus::Active);
    }

    #[test]
    fn test_old_version_backfills_defaults() {
        let mut store = Store::open_in_memory().unwrap();
        let mut data = store.load().unwrap();
        data.version = 1;
        data.measurements.retain(|m| m.id != "gallon");
        data.ingredients.retain(|i| i.id != "rice");
        store.save(&data).unwrap();

        let migrated = store.load().unwrap();
        assert_eq!(migrated.version, seed::SCHEMA_VERSION);
        assert!(migrated.measurement("gallon").is_some());
        assert!(migrated.ingredient("rice").is_some());

        // The migration is persisted, not just applied in memory.
        let again = store.load().unwrap();
        assert_eq!(again.version, seed::SCHEMA_VERSION);
    }

    #[test]
    fn test_migration_preserves_user_data() {
        let mut store = Store::open_in_memory().unwrap();
        let mut data = store.load().unwrap();
        data.version = 1;
        data.inventory.push(InventoryItem {
            user_id: seed::SEED_USER_ID.to_string(),
            ingredient_id: "flour".to_string(),
            measurement_id: "cup".to_string(),
            quantity: 2.0,
        });
        store.save(&data).unwrap();

        let migrated = store.load().unwrap();
        assert_eq!(migrated.inventory.len(), 1);
    }

    #[test]
    fn test_corrupt_store_falls_back_to_defaults() {
        let mut store = Store::open_in_memory().unwrap();
        store.load().unwrap();
        store
            .conn
            .execute(
                "UPDATE kv SET value = 'not json' WHERE key = 'recipes'",
                [],
            )
            .unwrap();

        let data = store.load().unwrap();
        assert_eq!(data.version, seed::SCHEMA_VERSION);
        assert_eq!(data.recipes.len(), seed::default_recipes().len());

        // The replacement aggregate is persisted and loads cleanly.
        let again = store.load().unwrap();
        assert_eq!(again.recipes.len(), data.recipes.len());
    }
}
