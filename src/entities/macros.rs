//! Macros for reducing boilerplate when defining persisted rows

/// Implement [`Record`](crate::core::record::Record) for a struct with an
/// `id: i64` field
///
/// # Example
/// ```rust,ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct ShopCategory {
///     #[serde(default)]
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl_record!(ShopCategory, "shop_category");
/// ```
#[macro_export]
macro_rules! impl_record {
    ($type:ident, $kind:expr) => {
        impl $crate::core::record::Record for $type {
            const KIND: &'static str = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }
    };
}

/// Implement [`Record`](crate::core::record::Record) for several types at once
///
/// # Example
/// ```rust,ignore
/// impl_records! {
///     DeleteMenu => "delete_menu",
///     DeletePhoto => "delete_photo",
/// }
/// ```
#[macro_export]
macro_rules! impl_records {
    ($($type:ident => $kind:expr),+ $(,)?) => {
        $( $crate::impl_record!($type, $kind); )+
    };
}
