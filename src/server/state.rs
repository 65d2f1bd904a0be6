//! Shared application state

use crate::config::AppConfig;
use crate::core::error::MarketResult;
use crate::core::files::{FileStore, FileSweep};
use crate::core::store::{Store, Tx};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub files: Arc<dyn FileStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, files: Arc<dyn FileStore>, config: AppConfig) -> Self {
        Self {
            store,
            files,
            config: Arc::new(config),
        }
    }

    /// Begin a request-scoped transaction
    pub async fn begin(&self) -> MarketResult<Tx> {
        Ok(self.store.transaction().await?)
    }

    /// Commit `tx`, then remove the files its deletes released
    ///
    /// File removal only starts once the rows are gone for good.
    pub async fn commit_and_sweep(&self, tx: Tx, sweep: FileSweep) -> MarketResult<()> {
        tx.commit().await?;
        if !sweep.is_empty() {
            let scheduled = sweep.paths().len();
            let removed = sweep.run(self.files.as_ref()).await;
            tracing::debug!(scheduled, removed, "swept uploads");
        }
        Ok(())
    }
}
