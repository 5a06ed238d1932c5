//! Content store for palaces and test history.
//!
//! Writes follow a copy-on-write discipline: load the whole collection,
//! change one record, replace the whole collection. A single async lock
//! serializes writers so two requests never interleave a read-modify-write.

use palace_core::{Palace, TestResult};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::error::{ApiError, Result};

pub const PALACES_KEY: &str = "mnemosine_palaces";
pub const HISTORY_KEY: &str = "mnemosine_history";

pub struct ContentStore {
    db: Database,
    write_lock: Mutex<()>,
}

impl ContentStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// All palaces, in creation order.
    pub async fn palaces(&self) -> Result<Vec<Palace>> {
        self.load(PALACES_KEY).await
    }

    pub async fn palace(&self, palace_id: &str) -> Result<Palace> {
        self.palaces()
            .await?
            .into_iter()
            .find(|p| p.id == palace_id)
            .ok_or_else(|| palace_not_found(palace_id))
    }

    /// Test results, newest first.
    pub async fn history(&self) -> Result<Vec<TestResult>> {
        self.load(HISTORY_KEY).await
    }

    pub async fn add_palace(&self, palace: Palace) -> Result<Palace> {
        self.update_palaces(|palaces| {
            palaces.push(palace.clone());
            Ok(palace)
        })
        .await
    }

    pub async fn delete_palace(&self, palace_id: &str) -> Result<()> {
        self.update_palaces(|palaces| {
            let before = palaces.len();
            palaces.retain(|p| p.id != palace_id);
            if palaces.len() == before {
                return Err(palace_not_found(palace_id));
            }
            Ok(())
        })
        .await
    }

    /// Apply `change` to one palace and write the collection back.
    ///
    /// Nothing is written when `change` fails.
    pub async fn update_palace<T, F>(&self, palace_id: &str, change: F) -> Result<T>
    where
        F: FnOnce(&mut Palace) -> Result<T>,
    {
        self.update_palaces(|palaces| {
            let palace = palaces
                .iter_mut()
                .find(|p| p.id == palace_id)
                .ok_or_else(|| palace_not_found(palace_id))?;
            change(palace)
        })
        .await
    }

    pub async fn update_palaces<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Palace>) -> Result<T>,
    {
        let _guard = self.write_lock.lock().await;
        let mut palaces: Vec<Palace> = self.load(PALACES_KEY).await?;
        let out = change(&mut palaces)?;
        self.replace(PALACES_KEY, &palaces).await?;
        Ok(out)
    }

    /// Prepend a result so the history stays newest first.
    pub async fn record_test_result(&self, result: TestResult) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut history: Vec<TestResult> = self.load(HISTORY_KEY).await?;
        history.insert(0, result);
        self.replace(HISTORY_KEY, &history).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.db.load_snapshot(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn replace<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.db.replace_snapshot(key, &raw).await?;
        tracing::debug!(key, records = records.len(), "snapshot replaced");
        Ok(())
    }
}

fn palace_not_found(palace_id: &str) -> ApiError {
    ApiError::NotFound(format!("palace {palace_id}"))
}
