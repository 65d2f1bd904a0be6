//! Storage backends for the persistence gateway and uploaded files

pub mod files;
pub mod in_memory;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use files::{DirFileStore, FileStoreError, sanitize_file_name};
pub use in_memory::InMemoryStore;

#[cfg(feature = "mysql")]
pub use mysql::MysqlStore;
