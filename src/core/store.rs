//! Persistence gateway
//!
//! The workflows only need five primitives from a relational store:
//! find-by-filter, create, save (upsert by primary key), delete-by-filter
//! and transactions. [`StoreTx`] exposes them over JSON rows so that
//! backends stay object-safe; [`Tx`] layers typed access on top for any
//! [`Record`].
//!
//! Every multi-row mutation receives a `&mut Tx`; nothing in the crate
//! reaches for a connection on its own.

use crate::core::error::{MarketError, MarketResult, StorageError};
use crate::core::record::Record;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Conjunction of field equalities used to select rows
///
/// The reserved field `id` matches the primary key.
///
/// ```rust,ignore
/// let filter = Filter::new().eq("shop_id", 10).eq("market_open_date_id", 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on the primary key
    pub fn by_id(id: i64) -> Self {
        Self::new().eq("id", id)
    }

    /// Add an equality clause
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check a JSON row against every clause
    ///
    /// Absent fields compare equal to `null`.
    pub fn matches(&self, row: &Value) -> bool {
        self.clauses.iter().all(|(field, expected)| {
            let actual = row.get(field).unwrap_or(&Value::Null);
            json_eq(actual, expected)
        })
    }
}

/// Equality that treats `10` and `10.0` as the same number
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Factory for transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Begin a transaction; reads and writes go through it
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

/// One open transaction over JSON rows
///
/// Each row is a JSON object carrying its primary key under `"id"`.
/// Dropping a transaction without calling [`commit`](StoreTx::commit)
/// discards its writes.
#[async_trait]
pub trait StoreTx: Send {
    /// Insert a row, returning its id
    ///
    /// A missing or zero `"id"` lets the store pick the next free id.
    async fn insert(&mut self, kind: &str, row: Value) -> Result<i64>;

    /// Rows of `kind` matching `filter`, ordered by id
    async fn fetch(&mut self, kind: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Insert or replace the row with this id
    async fn save(&mut self, kind: &str, id: i64, row: Value) -> Result<()>;

    /// Delete matching rows, returning how many were removed
    async fn remove(&mut self, kind: &str, filter: &Filter) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

impl dyn Store {
    /// Begin a typed transaction
    pub async fn transaction(&self) -> MarketResult<Tx> {
        let inner = self
            .begin()
            .await
            .map_err(|e| transaction_error("begin", e))?;
        Ok(Tx { inner })
    }
}

/// Typed access to an open transaction
pub struct Tx {
    inner: Box<dyn StoreTx>,
}

impl Tx {
    /// Wrap a raw backend transaction
    pub fn new(inner: Box<dyn StoreTx>) -> Self {
        Self { inner }
    }

    /// Insert `record` and return it with its assigned id
    pub async fn create<T: Record>(&mut self, mut record: T) -> Result<T> {
        let row = to_row(&record)?;
        let id = self.inner.insert(T::KIND, row).await?;
        record.set_id(id);
        Ok(record)
    }

    pub async fn get<T: Record>(&mut self, id: i64) -> Result<Option<T>> {
        self.first(Filter::by_id(id)).await
    }

    /// First matching row by id order
    pub async fn first<T: Record>(&mut self, filter: Filter) -> Result<Option<T>> {
        Ok(self.find::<T>(filter).await?.into_iter().next())
    }

    pub async fn find<T: Record>(&mut self, filter: Filter) -> Result<Vec<T>> {
        self.inner
            .fetch(T::KIND, &filter)
            .await?
            .into_iter()
            .map(from_row::<T>)
            .collect()
    }

    pub async fn list<T: Record>(&mut self) -> Result<Vec<T>> {
        self.find(Filter::new()).await
    }

    /// Upsert by primary key
    pub async fn save<T: Record>(&mut self, record: &T) -> Result<()> {
        if record.id() <= 0 {
            return Err(anyhow!("Cannot save {} without an id", T::KIND));
        }
        let row = to_row(record)?;
        self.inner.save(T::KIND, record.id(), row).await
    }

    pub async fn delete_where<T: Record>(&mut self, filter: Filter) -> Result<u64> {
        self.inner.remove(T::KIND, &filter).await
    }

    pub async fn delete_by_id<T: Record>(&mut self, id: i64) -> Result<bool> {
        Ok(self.delete_where::<T>(Filter::by_id(id)).await? > 0)
    }

    pub async fn commit(self) -> MarketResult<()> {
        self.inner
            .commit()
            .await
            .map_err(|e| transaction_error("commit", e))
    }

    pub async fn rollback(self) -> MarketResult<()> {
        self.inner
            .rollback()
            .await
            .map_err(|e| transaction_error("rollback", e))
    }
}

fn transaction_error(step: &str, err: anyhow::Error) -> MarketError {
    StorageError::TransactionError {
        message: format!("{} failed: {:#}", step, err),
    }
    .into()
}

fn to_row<T: Record>(record: &T) -> Result<Value> {
    let row = serde_json::to_value(record)
        .map_err(|e| anyhow!("Failed to serialize {}: {}", T::KIND, e))?;
    if !row.is_object() {
        return Err(anyhow!("{} does not serialize to a JSON object", T::KIND));
    }
    Ok(row)
}

fn from_row<T: Record>(row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| anyhow!("Failed to deserialize {}: {}", T::KIND, e))
}

/// Set `"id"` on a JSON object row
pub fn with_id(mut row: Value, id: i64) -> Value {
    if let Some(obj) = row.as_object_mut() {
        obj.insert("id".into(), Value::from(id));
    } else {
        let mut obj = Map::new();
        obj.insert("id".into(), Value::from(id));
        row = Value::Object(obj);
    }
    row
}

/// Read `"id"` from a JSON object row, `0` when absent
pub fn row_id(row: &Value) -> i64 {
    row.get("id").and_then(Value::as_i64).unwrap_or(0)
}
