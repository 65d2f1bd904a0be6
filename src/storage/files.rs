//! Directory-backed upload storage

use crate::core::files::FileStore;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: usize = 8;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name pattern"));

/// Failure touching a file inside the upload directory
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("invalid file name '{0}'")]
    InvalidName(String),

    #[error("no free name for '{0}'")]
    NameTaken(String),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reduce an uploaded file name to a flat, safe name
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`. Names with nothing usable left get a random stem that
/// keeps the original extension.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    let stem_is_usable = cleaned
        .rsplit_once('.')
        .map_or(!cleaned.is_empty(), |(stem, _)| {
            stem.chars().any(|c| c.is_ascii_alphanumeric())
        });

    if stem_is_usable {
        return cleaned.to_string();
    }

    let random = uuid::Uuid::new_v4().simple().to_string();
    match cleaned.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{}.{}", random, ext),
        _ => random,
    }
}

/// Append a short random suffix to the stem of `name`
fn with_suffix(name: &str) -> String {
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, suffix, ext),
        _ => format!("{}-{}", name, suffix),
    }
}

/// Flat upload directory on local disk
///
/// Stored names are the sanitized upload names. A name that is already
/// taken gets a random suffix, so a save never replaces an existing file.
#[derive(Debug, Clone)]
pub struct DirFileStore {
    root: PathBuf,
}

impl DirFileStore {
    /// Use `root` as the upload directory, creating it if missing
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(dir = %root.display(), "upload directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        if name.is_empty() || name != sanitize_file_name(name) {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for DirFileStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let wanted = sanitize_file_name(name);
        let mut stored = wanted.clone();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.resolve(&stored)?;
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    stored = with_suffix(&wanted);
                    continue;
                }
                Err(source) => return Err(FileStoreError::Write { path, source }.into()),
            };

            let written = match file.write_all(bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(source) = written {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(FileStoreError::Write { path, source }.into());
            }

            tracing::debug!(file = %stored, size = bytes.len(), "stored upload");
            return Ok(stored);
        }

        Err(FileStoreError::NameTaken(wanted).into())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| FileStoreError::Remove { path, source })?;
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.resolve(name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("a.png"), "a.png");
        assert_eq!(sanitize_file_name("menu-1_large.JPG"), "menu-1_large.JPG");
    }

    #[test]
    fn test_sanitize_strips_directories_and_odd_chars() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my pic.png"), "my_pic.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }

    #[test]
    fn test_sanitize_generates_name_when_nothing_usable() {
        let name = sanitize_file_name("???.png");
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 32 + 4);

        let bare = sanitize_file_name("");
        assert_eq!(bare.len(), 32);
    }

    #[tokio::test]
    async fn test_save_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let files = DirFileStore::open(dir.path()).await.unwrap();

        let stored = files.save("b.png", b"png-bytes").await.unwrap();
        assert_eq!(stored, "b.png");
        assert!(files.exists("b.png").await.unwrap());

        files.remove("b.png").await.unwrap();
        assert!(!files.exists("b.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_never_replaces_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = DirFileStore::open(dir.path()).await.unwrap();

        let first = files.save("a.png", b"first").await.unwrap();
        let second = files.save("a.png", b"second").await.unwrap();

        assert_eq!(first, "a.png");
        assert_ne!(second, first);
        assert!(second.starts_with("a-") && second.ends_with(".png"));
        assert_eq!(tokio::fs::read(dir.path().join(&first)).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(dir.path().join(&second)).await.unwrap(), b"second");
    }

    #[test]
    fn test_suffix_keeps_extension() {
        let name = with_suffix("menu.jpg");
        assert!(name.starts_with("menu-") && name.ends_with(".jpg"));
        assert_eq!(name.len(), "menu-".len() + 8 + ".jpg".len());
        assert_eq!(sanitize_file_name(&name), name);
        assert!(with_suffix("readme").starts_with("readme-"));
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = DirFileStore::open(dir.path()).await.unwrap();

        assert!(files.remove("never-uploaded.png").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_unsanitized_names() {
        let dir = tempfile::tempdir().unwrap();
        let files = DirFileStore::open(dir.path()).await.unwrap();

        assert!(files.remove("../outside.png").await.is_err());
    }
}
