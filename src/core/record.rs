//! Base trait for every persisted row

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A row type stored through the persistence gateway
///
/// Rows are addressed by an integer primary key and grouped by `KIND`,
/// which plays the role of the table name. Implement it with
/// [`impl_record!`](crate::impl_record) rather than by hand.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name, e.g. `"shop_menu"`
    const KIND: &'static str;

    /// Primary key, `0` until the row has been inserted
    fn id(&self) -> i64;

    /// Assign the primary key chosen by the store
    fn set_id(&mut self, id: i64);
}
