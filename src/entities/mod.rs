//! Persisted row types

pub mod account;
pub mod draft;
pub mod macros;
pub mod market;
pub mod shop;

pub use account::{Admin, Entrepreneur};
pub use draft::{
    DeleteMenu, DeletePhoto, DeleteSocial, OpenDateOperation, TempMenu, TempShop,
    TempShopOpenDate, TempShopStatus, TempSocial,
};
pub use market::{ContactToAdmin, MarketMap, MarketOpenDate, Workshop};
pub use shop::{Photo, Publishable, Shop, ShopCategory, ShopMenu, ShopOpenDate, SocialMedia};
