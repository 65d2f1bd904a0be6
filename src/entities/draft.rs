//! Draft tables and delete bins
//!
//! A [`TempShop`] stages edits to one live shop. Children created or edited
//! under it carry its id as `temp_id`: [`TempMenu`] and [`TempSocial`]
//! mirror pending field edits, [`TempShopOpenDate`] stages open-hours
//! operations, and the bin tables ([`DeleteMenu`], [`DeletePhoto`],
//! [`DeleteSocial`]) name live rows to drop once the draft is approved.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Review state of a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempShopStatus {
    /// Submitted and awaiting review
    #[default]
    Waiting,
    /// Published
    Approve,
    /// Rejected by an admin
    NotApprove,
}

impl TempShopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempShopStatus::Waiting => "Waiting",
            TempShopStatus::Approve => "Approve",
            TempShopStatus::NotApprove => "NotApprove",
        }
    }
}

impl fmt::Display for TempShopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft of a shop's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TempShop {
    pub id: i64,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub shop_category_id: Option<i64>,
    /// Live shop this draft updates; `None` until that shop exists
    pub shop_id: Option<i64>,
    pub status: TempShopStatus,
}

/// What a staged open-hours row does on approval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenDateOperation {
    #[default]
    Add,
    Edit,
    Delete,
}

impl fmt::Display for OpenDateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenDateOperation::Add => f.write_str("add"),
            OpenDateOperation::Edit => f.write_str("edit"),
            OpenDateOperation::Delete => f.write_str("delete"),
        }
    }
}

/// Staged change to a shop's open hours
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TempShopOpenDate {
    pub id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shop_id: i64,
    pub market_open_date_id: i64,
    pub temp_id: i64,
    pub operation: OpenDateOperation,
}

/// Pending field edits for one live menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TempMenu {
    pub id: i64,
    pub temp_id: i64,
    pub menu_id: i64,
    #[validate(length(min = 1, message = "product_name is required"))]
    pub product_name: String,
    pub product_description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

/// Pending field edits for one live social link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TempSocial {
    pub id: i64,
    pub temp_id: i64,
    pub social_id: i64,
    pub name: String,
    pub platform: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeleteMenu {
    pub id: i64,
    pub temp_id: i64,
    pub menu_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeletePhoto {
    pub id: i64,
    pub temp_id: i64,
    pub photo_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DeleteSocial {
    pub id: i64,
    pub temp_id: i64,
    pub social_id: i64,
}

crate::impl_records! {
    TempShop => "temp_shop",
    TempShopOpenDate => "temp_shop_open_date",
    TempMenu => "temp_menu",
    TempSocial => "temp_social",
    DeleteMenu => "delete_menu",
    DeletePhoto => "delete_photo",
    DeleteSocial => "delete_social",
}
