//! Shared harness for the integration tests
//!
//! Each [`Harness`] owns an empty in-memory store and a temporary upload
//! directory. The factory functions build rows with chosen ids so tests
//! can state their fixtures the way the scenarios describe them.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod support;
//! use support::*;
//! ```

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::NaiveTime;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use market::core::{FileSweep, Store, Tx};
use market::entities::{
    DeleteMenu, DeletePhoto, DeleteSocial, Entrepreneur, OpenDateOperation, Photo, Shop,
    ShopCategory, ShopMenu, ShopOpenDate, SocialMedia, TempShop, TempShopOpenDate, TempShopStatus,
};
use market::server::ServerBuilder;
use market::storage::{DirFileStore, InMemoryStore};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: InMemoryStore,
    pub shared: Arc<dyn Store>,
    pub files: DirFileStore,
    pub upload_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let upload_dir = TempDir::new().unwrap();
        let files = DirFileStore::open(upload_dir.path()).await.unwrap();
        let store = InMemoryStore::new();
        Self {
            shared: Arc::new(store.clone()),
            store,
            files,
            upload_dir,
        }
    }

    /// Open a transaction on the harness store
    pub async fn tx(&self) -> Tx {
        self.shared.transaction().await.unwrap()
    }

    /// Run a sweep against the upload directory
    pub async fn sweep(&self, sweep: FileSweep) -> usize {
        sweep.run(&self.files).await
    }

    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.upload_dir.path().join(name)
    }

    pub async fn write_upload(&self, name: &str) {
        tokio::fs::write(self.upload_path(name), b"\x89PNG fake image")
            .await
            .unwrap();
    }

    pub fn upload_exists(&self, name: &str) -> bool {
        self.upload_path(name).exists()
    }

    /// HTTP server over the same store and upload directory
    pub fn server(&self) -> TestServer {
        let app = ServerBuilder::new()
            .with_shared_store(self.shared.clone())
            .with_file_store(self.files.clone())
            .build()
            .unwrap();
        TestServer::new(app)
    }
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn entrepreneur(id: i64, username: &str) -> Entrepreneur {
    Entrepreneur {
        id,
        username: username.to_string(),
        first_name: username.to_string(),
        ..Default::default()
    }
}

pub fn category(id: i64, name: &str) -> ShopCategory {
    ShopCategory {
        id,
        name: name.to_string(),
    }
}

pub fn shop(id: i64, name: &str, entrepreneur_id: i64) -> Shop {
    Shop {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        shop_category_id: 1,
        entrepreneur_id,
        open_status: true,
    }
}

pub fn draft(id: i64, shop_id: i64, status: TempShopStatus) -> TempShop {
    TempShop {
        id,
        name: format!("draft {}", id),
        description: String::new(),
        shop_category_id: None,
        shop_id: Some(shop_id),
        status,
    }
}

pub fn menu(id: i64, shop_id: i64, product_name: &str) -> ShopMenu {
    ShopMenu {
        id,
        product_name: product_name.to_string(),
        product_description: String::new(),
        price: 40.0,
        shop_id,
        is_public: true,
        temp_id: None,
    }
}

/// Menu created under a draft and not yet published
pub fn hidden_menu(id: i64, shop_id: i64, temp_id: i64) -> ShopMenu {
    ShopMenu {
        is_public: false,
        temp_id: Some(temp_id),
        ..menu(id, shop_id, "pending item")
    }
}

pub fn menu_photo(id: i64, menu_id: i64, path: &str) -> Photo {
    Photo {
        id,
        path_file: path.to_string(),
        menu_id: Some(menu_id),
        is_public: true,
        ..Default::default()
    }
}

pub fn shop_photo(id: i64, shop_id: i64, path: &str) -> Photo {
    Photo {
        id,
        path_file: path.to_string(),
        shop_id: Some(shop_id),
        is_public: true,
        ..Default::default()
    }
}

pub fn social(id: i64, shop_id: i64, platform: &str) -> SocialMedia {
    SocialMedia {
        id,
        name: format!("{} page", platform),
        platform: platform.to_string(),
        link: format!("https://{}.example/{}", platform, shop_id),
        shop_id,
        is_public: true,
        temp_id: None,
    }
}

pub fn open_date(
    id: i64,
    shop_id: i64,
    market_open_date_id: i64,
    start: NaiveTime,
    end: NaiveTime,
) -> ShopOpenDate {
    ShopOpenDate {
        id,
        start_time: start,
        end_time: end,
        shop_id,
        market_open_date_id,
    }
}

pub fn staged(
    operation: OpenDateOperation,
    temp_id: i64,
    shop_id: i64,
    market_open_date_id: i64,
    start: NaiveTime,
    end: NaiveTime,
) -> TempShopOpenDate {
    TempShopOpenDate {
        id: 0,
        start_time: start,
        end_time: end,
        shop_id,
        market_open_date_id,
        temp_id,
        operation,
    }
}

pub fn menu_bin(temp_id: i64, menu_id: i64) -> DeleteMenu {
    DeleteMenu {
        id: 0,
        temp_id,
        menu_id,
    }
}

pub fn photo_bin(temp_id: i64, photo_id: i64) -> DeletePhoto {
    DeletePhoto {
        id: 0,
        temp_id,
        photo_id,
    }
}

pub fn social_bin(temp_id: i64, social_id: i64) -> DeleteSocial {
    DeleteSocial {
        id: 0,
        temp_id,
        social_id,
    }
}
