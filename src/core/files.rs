//! Upload blob storage
//!
//! Uploaded images live in a flat namespace keyed by file name. Database
//! rows are authoritative: removing a file is always best-effort, and a
//! missing file never blocks record cleanup.

use anyhow::Result;
use async_trait::async_trait;

/// Directory-like blob store keyed by file name
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist `bytes` under a name derived from `name`; returns the stored name
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Remove a stored file
    async fn remove(&self, name: &str) -> Result<()>;

    async fn exists(&self, name: &str) -> Result<bool>;
}

/// File removals deferred until the surrounding transaction commits
///
/// Cascading deletes record the paths of every photo row they drop. The
/// handler runs the sweep after `commit`, so a rolled-back cascade never
/// loses files whose rows survived.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileSweep {
    paths: Vec<String>,
}

impl FileSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a stored file for removal
    pub fn push(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !path.is_empty() && !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Remove every scheduled file, logging failures
    ///
    /// Returns how many removals succeeded.
    pub async fn run(self, files: &dyn FileStore) -> usize {
        let mut removed = 0;
        for path in self.paths {
            match files.remove(&path).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path, "failed to delete upload: {:#}", e),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeFiles {
        present: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl FileStore for FakeFiles {
        async fn save(&self, name: &str, _bytes: &[u8]) -> Result<String> {
            self.present.lock().unwrap().insert(name.to_string());
            Ok(name.to_string())
        }

        async fn remove(&self, name: &str) -> Result<()> {
            if self.present.lock().unwrap().remove(name) {
                Ok(())
            } else {
                Err(anyhow!("no such file: {}", name))
            }
        }

        async fn exists(&self, name: &str) -> Result<bool> {
            Ok(self.present.lock().unwrap().contains(name))
        }
    }

    #[test]
    fn test_sweep_deduplicates_and_skips_empty() {
        let mut sweep = FileSweep::new();
        sweep.push("a.png");
        sweep.push("a.png");
        sweep.push("");
        assert_eq!(sweep.paths(), &["a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_sweep_tolerates_missing_files() {
        let files = FakeFiles {
            present: Mutex::new(HashSet::from(["b.png".to_string()])),
        };

        let mut sweep = FileSweep::new();
        sweep.push("a.png");
        sweep.push("b.png");

        assert_eq!(sweep.run(&files).await, 1);
        assert!(!files.exists("b.png").await.unwrap());
    }
}
