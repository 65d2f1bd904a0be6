//! In-memory implementation of the persistence gateway for testing and development

use crate::core::store::{Filter, Store, StoreTx, row_id, with_id};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Tables = HashMap<String, BTreeMap<i64, Value>>;

/// In-memory store
///
/// Transactions are serialized: `begin` holds the store lock until the
/// transaction ends, and writes land in a working copy that only replaces
/// the committed tables on `commit`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows of `kind`
    pub async fn count(&self, kind: &str) -> usize {
        self.tables.lock().await.get(kind).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTx { guard, working }))
    }
}

/// Open in-memory transaction
pub struct InMemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn insert(&mut self, kind: &str, row: Value) -> Result<i64> {
        if !row.is_object() {
            return Err(anyhow!("Row for {} must be a JSON object", kind));
        }

        let table = self.working.entry(kind.to_string()).or_default();
        let id = match row_id(&row) {
            id if id > 0 => {
                if table.contains_key(&id) {
                    return Err(anyhow!("Duplicate id {} for {}", id, kind));
                }
                id
            }
            _ => table.keys().next_back().map_or(1, |last| last + 1),
        };

        table.insert(id, with_id(row, id));
        Ok(id)
    }

    async fn fetch(&mut self, kind: &str, filter: &Filter) -> Result<Vec<Value>> {
        Ok(self
            .working
            .get(kind)
            .map(|table| {
                table
                    .values()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save(&mut self, kind: &str, id: i64, row: Value) -> Result<()> {
        self.working
            .entry(kind.to_string())
            .or_default()
            .insert(id, with_id(row, id));
        Ok(())
    }

    async fn remove(&mut self, kind: &str, filter: &Filter) -> Result<u64> {
        let Some(table) = self.working.get_mut(kind) else {
            return Ok(0);
        };

        let before = table.len();
        table.retain(|_, row| !filter.matches(row));
        Ok((before - table.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
