//! # market-rs
//!
//! Backend for a market: entrepreneurs run shops, shops sell menu items,
//! and everything a shop shows publicly passes through a moderated draft.
//!
//! ## Features
//!
//! - **Draft/approval workflow**: edits land in `TempShop`, `TempMenu`,
//!   `TempSocial` and `TempShopOpenDate`; an admin approval copies them onto
//!   the live rows and publishes pending photos, menus and social links
//! - **Delete bins**: removals are staged per draft and applied on approval
//! - **Cascading deletes**: deleting an entrepreneur, shop or menu removes
//!   every dependent row and uploaded file
//! - **Photo uploads**: multipart uploads stored on disk, linked to a menu,
//!   a shop or a workshop
//! - **Pluggable storage**: in-memory by default, MySQL behind the `mysql`
//!   feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let files = DirFileStore::open(&config.upload_dir).await?;
//!
//!     ServerBuilder::new()
//!         .with_store(InMemoryStore::new())
//!         .with_file_store(files)
//!         .with_config(config)
//!         .serve("0.0.0.0:8080")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;
pub mod workflows;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        FileStore, FileSweep, Filter, IdParam, MarketError, MarketResult, Record, Store, StoreTx,
        Tx, Validated,
    };

    // === Entities ===
    pub use crate::entities::*;

    // === Workflows ===
    pub use crate::workflows::{
        ApprovalSummary, MenuEdit, PhotoTarget, SearchHit, ShopDetail, ShopDraft, SocialEdit,
        Visibility, approve, not_approve,
    };

    // === Storage ===
    pub use crate::storage::{DirFileStore, InMemoryStore};
    #[cfg(feature = "mysql")]
    pub use crate::storage::MysqlStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{delete, get, post, put},
    };
}
