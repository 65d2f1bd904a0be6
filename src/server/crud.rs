//! Generic CRUD routes for any [`Record`]
//!
//! Most resources are plain tables: list, create, read, full replace and
//! delete. [`RecordDescriptor`] wires those five handlers under one URL
//! prefix and lets a resource swap in its own list, read, create or delete
//! handler when the operation needs a view or a workflow.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, delete, get, post};
use serde_json::{Value, json};
use std::marker::PhantomData;
use validator::Validate;

use crate::core::error::{EntityError, MarketResult};
use crate::core::extractors::{IdParam, Validated};
use crate::core::record::Record;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::state::AppState;

/// GET {path}
pub async fn list_records<T: Record>(State(state): State<AppState>) -> MarketResult<Json<Vec<T>>> {
    let mut tx = state.begin().await?;
    let rows = tx.list::<T>().await?;
    tx.commit().await?;
    Ok(Json(rows))
}

/// GET {path}/{id}
pub async fn get_record<T: Record>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<T>> {
    let mut tx = state.begin().await?;
    let row = tx
        .get::<T>(id)
        .await?
        .ok_or_else(|| EntityError::not_found::<T>(id))?;
    tx.commit().await?;
    Ok(Json(row))
}

/// POST {path}
///
/// A positive `id` in the body is kept, which lets callers choose map
/// block ids; it must not be taken yet.
pub async fn create_record<T: Record + Validate>(
    State(state): State<AppState>,
    Validated(record): Validated<T>,
) -> MarketResult<(StatusCode, Json<T>)> {
    let mut tx = state.begin().await?;
    if record.id() > 0 && tx.get::<T>(record.id()).await?.is_some() {
        return Err(EntityError::AlreadyExists {
            entity_type: T::KIND.to_string(),
            id: record.id(),
        }
        .into());
    }

    let created = tx.create(record).await?;
    tx.commit().await?;
    tracing::debug!(kind = T::KIND, id = created.id(), "created row");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT {path}/{id}: full replacement, the path id wins over the body
pub async fn update_record<T: Record + Validate>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    Validated(mut record): Validated<T>,
) -> MarketResult<Json<T>> {
    let mut tx = state.begin().await?;
    if tx.get::<T>(id).await?.is_none() {
        return Err(EntityError::not_found::<T>(id).into());
    }

    record.set_id(id);
    tx.save(&record).await?;
    tx.commit().await?;
    tracing::debug!(kind = T::KIND, id, "replaced row");
    Ok(Json(record))
}

/// DELETE {path}/{id}
pub async fn delete_record<T: Record>(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    if !tx.delete_by_id::<T>(id).await? {
        return Err(EntityError::not_found::<T>(id).into());
    }
    tx.commit().await?;
    tracing::debug!(kind = T::KIND, id, "deleted row");
    Ok(Json(deleted_message(T::KIND, id)))
}

/// Body returned by every successful delete
pub fn deleted_message(kind: &str, id: i64) -> Value {
    json!({ "message": format!("{} {} deleted", kind, id) })
}

/// CRUD routes for record type `T` under one URL prefix
///
/// # Example
///
/// ```rust,ignore
/// registry.register(Box::new(
///     RecordDescriptor::<Shop>::new("/shop")
///         .with_create(post(handlers::create_shop))
///         .with_delete(delete(handlers::delete_shop)),
/// ));
/// ```
pub struct RecordDescriptor<T> {
    path: &'static str,
    list: Option<MethodRouter<AppState>>,
    get: Option<MethodRouter<AppState>>,
    create: Option<MethodRouter<AppState>>,
    delete: Option<MethodRouter<AppState>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record + Validate> RecordDescriptor<T> {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            list: None,
            get: None,
            create: None,
            delete: None,
            _record: PhantomData,
        }
    }

    /// Replace the generic `GET {path}`
    pub fn with_list(mut self, route: MethodRouter<AppState>) -> Self {
        self.list = Some(route);
        self
    }

    /// Replace the generic `GET {path}/{id}`
    pub fn with_get(mut self, route: MethodRouter<AppState>) -> Self {
        self.get = Some(route);
        self
    }

    /// Replace the generic `POST {path}`
    pub fn with_create(mut self, route: MethodRouter<AppState>) -> Self {
        self.create = Some(route);
        self
    }

    /// Replace the generic `DELETE {path}/{id}`
    pub fn with_delete(mut self, route: MethodRouter<AppState>) -> Self {
        self.delete = Some(route);
        self
    }
}

impl<T: Record + Validate> EntityDescriptor for RecordDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::KIND
    }

    fn path(&self) -> &str {
        self.path
    }

    fn build_routes(&self) -> Router<AppState> {
        let list = self
            .list
            .clone()
            .unwrap_or_else(|| get(list_records::<T>));
        let read = self.get.clone().unwrap_or_else(|| get(get_record::<T>));
        let create = self
            .create
            .clone()
            .unwrap_or_else(|| post(create_record::<T>));
        let remove = self
            .delete
            .clone()
            .unwrap_or_else(|| delete(delete_record::<T>));

        Router::new()
            .route(self.path, list.merge(create))
            .route(
                &format!("{}/{{id}}", self.path),
                read.put(update_record::<T>).merge(remove),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ShopCategory;

    #[test]
    fn test_descriptor_reports_kind_and_path() {
        let descriptor = RecordDescriptor::<ShopCategory>::new("/shopcategory");
        assert_eq!(descriptor.entity_type(), "shop_category");
        assert_eq!(descriptor.path(), "/shopcategory");
        let _router = descriptor.build_routes();
    }

    #[test]
    fn test_deleted_message() {
        assert_eq!(
            deleted_message("shop", 7),
            json!({"message": "shop 7 deleted"})
        );
    }
}
