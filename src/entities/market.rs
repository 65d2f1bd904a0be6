//! Market-wide resources: market days, the block map, workshops and
//! support messages

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A day the market opens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MarketOpenDate {
    pub id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Assignment of a map block to a shop; `id` is the block id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MarketMap {
    pub id: i64,
    pub block_name: String,
    pub block_zone: String,
    pub shop_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Workshop {
    pub id: i64,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub language: String,
    pub instructor: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactToAdmin {
    pub id: i64,
    #[validate(length(min = 1, message = "problem is required"))]
    pub problem: String,
    pub from_username: String,
    pub detail: String,
}

crate::impl_records! {
    MarketOpenDate => "market_open_date",
    MarketMap => "market_map",
    Workshop => "workshop",
    ContactToAdmin => "contact_to_admin",
}
