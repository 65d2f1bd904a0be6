//! The live shop aggregate
//!
//! A [`Shop`] owns menus, photos, social links and open-hours rows. Rows
//! tagged with a `temp_id` were created or edited through a draft and stay
//! hidden (`is_public = false`) until that draft is approved.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::record::Record;

/// Child row that stays hidden until the draft that created it is approved
pub trait Publishable: Record {
    fn is_public(&self) -> bool;

    fn publish(&mut self);
}

macro_rules! impl_publishable {
    ($($type:ident),+ $(,)?) => {
        $(
            impl Publishable for $type {
                fn is_public(&self) -> bool {
                    self.is_public
                }

                fn publish(&mut self) {
                    self.is_public = true;
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShopCategory {
    pub id: i64,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// Publicly visible listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Shop {
    pub id: i64,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub shop_category_id: i64,
    pub entrepreneur_id: i64,
    pub open_status: bool,
}

/// Hours a shop trades on one market day
///
/// `(shop_id, market_open_date_id)` is the natural key staged changes are
/// matched on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShopOpenDate {
    pub id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shop_id: i64,
    pub market_open_date_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShopMenu {
    pub id: i64,
    #[validate(length(min = 1, message = "product_name is required"))]
    pub product_name: String,
    pub product_description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub shop_id: i64,
    pub is_public: bool,
    pub temp_id: Option<i64>,
}

/// Uploaded image attached to a shop, a menu or a workshop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Photo {
    pub id: i64,
    pub photo_category: String,
    /// Stored file name inside the upload directory
    #[validate(length(min = 1, message = "path_file is required"))]
    pub path_file: String,
    pub menu_id: Option<i64>,
    pub shop_id: Option<i64>,
    pub workshop_id: Option<i64>,
    pub workshop_name: String,
    pub is_public: bool,
    pub temp_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SocialMedia {
    pub id: i64,
    pub name: String,
    #[validate(length(min = 1, message = "platform is required"))]
    pub platform: String,
    #[validate(length(min = 1, message = "link is required"))]
    pub link: String,
    pub shop_id: i64,
    pub is_public: bool,
    pub temp_id: Option<i64>,
}

crate::impl_records! {
    ShopCategory => "shop_category",
    Shop => "shop",
    ShopOpenDate => "shop_open_date",
    ShopMenu => "shop_menu",
    Photo => "photo",
    SocialMedia => "social_media",
}

impl_publishable!(ShopMenu, Photo, SocialMedia);
