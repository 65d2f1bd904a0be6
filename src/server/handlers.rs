//! HTTP handlers for the workflow routes
//!
//! Each handler opens one transaction, runs a workflow function against it
//! and commits. Handlers that can delete photos commit through
//! [`AppState::commit_and_sweep`] so files are removed only after the rows.
//! An early return drops the transaction, which rolls it back.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::error::{EntityError, MarketResult};
use crate::core::extractors::{IdParam, Validated};
use crate::core::files::FileSweep;
use crate::core::record::Record;
use crate::core::store::Filter;
use crate::entities::{
    DeleteMenu, DeletePhoto, DeleteSocial, Photo, Shop, ShopMenu, ShopOpenDate, SocialMedia,
    TempMenu, TempShop, TempShopOpenDate, TempSocial, Workshop,
};
use crate::server::crud::deleted_message;
use crate::server::state::AppState;
use crate::workflows::views::{
    self, MapBlockView, SearchHit, ShopDetail, Visibility, WorkshopDetail,
};
use crate::workflows::{MenuEdit, ShopDraft, SocialEdit, approval, cascade, drafts};

// =============================================================================
// Approval
// =============================================================================

/// GET /approve/{id}
pub async fn approve(
    State(state): State<AppState>,
    IdParam(temp_id): IdParam,
) -> MarketResult<Json<TempShop>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    let draft = approval::approve(&mut tx, temp_id, &mut sweep).await?;
    state.commit_and_sweep(tx, sweep).await?;
    Ok(Json(draft))
}

/// PUT /notApprove/{temp_id}
pub async fn not_approve(
    State(state): State<AppState>,
    IdParam(temp_id): IdParam,
) -> MarketResult<Json<TempShop>> {
    let mut tx = state.begin().await?;
    let draft = approval::not_approve(&mut tx, temp_id).await?;
    tx.commit().await?;
    Ok(Json(draft))
}

// =============================================================================
// Cascading deletes
// =============================================================================

/// DELETE /shop/{id}
pub async fn delete_shop(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    if !cascade::delete_shop(&mut tx, id, &mut sweep).await? {
        return Err(EntityError::not_found::<Shop>(id).into());
    }
    state.commit_and_sweep(tx, sweep).await?;
    tracing::info!(shop_id = id, "shop deleted");
    Ok(Json(deleted_message(Shop::KIND, id)))
}

/// DELETE /entrepreneur/{id}
pub async fn delete_entrepreneur(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    cascade::delete_entrepreneur(&mut tx, id, &mut sweep).await?;
    state.commit_and_sweep(tx, sweep).await?;
    tracing::info!(entrepreneur_id = id, "entrepreneur deleted");
    Ok(Json(deleted_message("entrepreneur", id)))
}

/// DELETE /menu/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    if !cascade::delete_menu(&mut tx, id, &mut sweep).await? {
        return Err(EntityError::not_found::<ShopMenu>(id).into());
    }
    state.commit_and_sweep(tx, sweep).await?;
    Ok(Json(deleted_message(ShopMenu::KIND, id)))
}

/// DELETE /photo/{id}
pub async fn delete_photo(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    if !cascade::delete_photo(&mut tx, id, &mut sweep).await? {
        return Err(EntityError::not_found::<Photo>(id).into());
    }
    state.commit_and_sweep(tx, sweep).await?;
    Ok(Json(deleted_message(Photo::KIND, id)))
}

/// DELETE /social/{id}
pub async fn delete_social(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    if !cascade::delete_social(&mut tx, id).await? {
        return Err(EntityError::not_found::<SocialMedia>(id).into());
    }
    tx.commit().await?;
    Ok(Json(deleted_message(SocialMedia::KIND, id)))
}

/// DELETE /workshop/{id}
pub async fn delete_workshop(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    if !cascade::delete_workshop(&mut tx, id, &mut sweep).await? {
        return Err(EntityError::not_found::<Workshop>(id).into());
    }
    state.commit_and_sweep(tx, sweep).await?;
    Ok(Json(deleted_message(Workshop::KIND, id)))
}

/// DELETE /tempShop/{id}
pub async fn delete_temp_shop(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    if !cascade::discard_draft(&mut tx, id).await? {
        return Err(EntityError::not_found::<TempShop>(id).into());
    }
    tx.commit().await?;
    tracing::info!(temp_id = id, "draft discarded");
    Ok(Json(deleted_message(TempShop::KIND, id)))
}

// =============================================================================
// Draft-aware creation and staging
// =============================================================================

/// POST /shop
pub async fn create_shop(
    State(state): State<AppState>,
    Validated(shop): Validated<Shop>,
) -> MarketResult<(StatusCode, Json<Value>)> {
    let mut tx = state.begin().await?;
    let (shop, draft) = drafts::create_shop_with_draft(&mut tx, shop).await?;
    tx.commit().await?;
    tracing::info!(shop_id = shop.id, temp_id = draft.id, "shop created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "shop_id": shop.id, "temp_id": draft.id })),
    ))
}

/// POST /menu
pub async fn create_menu(
    State(state): State<AppState>,
    Validated(menu): Validated<ShopMenu>,
) -> MarketResult<(StatusCode, Json<Value>)> {
    let mut tx = state.begin().await?;
    let (menu, temp_menu) = drafts::create_menu_with_draft(&mut tx, menu).await?;
    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "menu": menu, "temp_menu": temp_menu })),
    ))
}

/// POST /social
pub async fn create_social(
    State(state): State<AppState>,
    Validated(social): Validated<SocialMedia>,
) -> MarketResult<(StatusCode, Json<Value>)> {
    let mut tx = state.begin().await?;
    let (social, temp_social) = drafts::create_social_with_draft(&mut tx, social).await?;
    tx.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "social": social, "temp_social": temp_social })),
    ))
}

/// POST /tempShopOpenDate
pub async fn create_staged_open_date(
    State(state): State<AppState>,
    Validated(staged): Validated<TempShopOpenDate>,
) -> MarketResult<(StatusCode, Json<TempShopOpenDate>)> {
    let mut tx = state.begin().await?;
    let staged = drafts::stage_open_date(&mut tx, staged).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(staged)))
}

/// PUT /tempShop/shop/{shop_id}
pub async fn submit_shop_draft(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
    Validated(edits): Validated<ShopDraft>,
) -> MarketResult<Json<TempShop>> {
    let mut tx = state.begin().await?;
    let draft = drafts::submit_shop_draft(&mut tx, shop_id, edits).await?;
    tx.commit().await?;
    tracing::info!(shop_id, temp_id = draft.id, "shop draft submitted for review");
    Ok(Json(draft))
}

/// PUT /tempMenu/menu/{menu_id}
pub async fn stage_menu_edit(
    State(state): State<AppState>,
    IdParam(menu_id): IdParam,
    Validated(edits): Validated<MenuEdit>,
) -> MarketResult<Json<TempMenu>> {
    let mut tx = state.begin().await?;
    let mirror = drafts::stage_menu_edit(&mut tx, menu_id, edits).await?;
    tx.commit().await?;
    Ok(Json(mirror))
}

/// PUT /tempSocial/social/{social_id}
pub async fn stage_social_edit(
    State(state): State<AppState>,
    IdParam(social_id): IdParam,
    Validated(edits): Validated<SocialEdit>,
) -> MarketResult<Json<TempSocial>> {
    let mut tx = state.begin().await?;
    let mirror = drafts::stage_social_edit(&mut tx, social_id, edits).await?;
    tx.commit().await?;
    Ok(Json(mirror))
}

// =============================================================================
// Delete bins
// =============================================================================

/// POST /binMenu/menu/{menu_id}
pub async fn mark_menu(
    State(state): State<AppState>,
    IdParam(menu_id): IdParam,
) -> MarketResult<(StatusCode, Json<DeleteMenu>)> {
    let mut tx = state.begin().await?;
    let entry = drafts::mark_menu_for_deletion(&mut tx, menu_id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /binPhoto/photo/{photo_id}
pub async fn mark_photo(
    State(state): State<AppState>,
    IdParam(photo_id): IdParam,
) -> MarketResult<(StatusCode, Json<DeletePhoto>)> {
    let mut tx = state.begin().await?;
    let entry = drafts::mark_photo_for_deletion(&mut tx, photo_id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /binSocial/social/{social_id}
pub async fn mark_social(
    State(state): State<AppState>,
    IdParam(social_id): IdParam,
) -> MarketResult<(StatusCode, Json<DeleteSocial>)> {
    let mut tx = state.begin().await?;
    let entry = drafts::mark_social_for_deletion(&mut tx, social_id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

fn flushed(kind: &str, temp_id: i64, removed: usize) -> Json<Value> {
    Json(json!({
        "message": format!("{} bin of draft {} flushed", kind, temp_id),
        "deleted": removed,
    }))
}

/// DELETE /binMenu/temp/{temp_id}
pub async fn flush_menu_bin(
    State(state): State<AppState>,
    IdParam(temp_id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    let removed = cascade::flush_menu_bin(&mut tx, temp_id, &mut sweep).await?;
    state.commit_and_sweep(tx, sweep).await?;
    Ok(flushed("menu", temp_id, removed))
}

/// DELETE /binPhoto/temp/{temp_id}
pub async fn flush_photo_bin(
    State(state): State<AppState>,
    IdParam(temp_id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let mut sweep = FileSweep::new();
    let removed = cascade::flush_photo_bin(&mut tx, temp_id, &mut sweep).await?;
    state.commit_and_sweep(tx, sweep).await?;
    Ok(flushed("photo", temp_id, removed))
}

/// DELETE /binSocial/temp/{temp_id}
pub async fn flush_social_bin(
    State(state): State<AppState>,
    IdParam(temp_id): IdParam,
) -> MarketResult<Json<Value>> {
    let mut tx = state.begin().await?;
    let removed = cascade::flush_social_bin(&mut tx, temp_id).await?;
    tx.commit().await?;
    Ok(flushed("social", temp_id, removed))
}

// =============================================================================
// Lookups and views
// =============================================================================

/// Rows of `T` whose `field` equals the path id
async fn children<T: Record>(state: &AppState, field: &str, id: i64) -> MarketResult<Vec<T>> {
    let mut tx = state.begin().await?;
    let rows = tx.find::<T>(Filter::new().eq(field, id)).await?;
    tx.commit().await?;
    Ok(rows)
}

/// GET /menu/shop/{shop_id}
pub async fn menus_of_shop(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
) -> MarketResult<Json<Vec<ShopMenu>>> {
    Ok(Json(children(&state, "shop_id", shop_id).await?))
}

/// GET /photo/shop/{shop_id}
pub async fn photos_of_shop(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
) -> MarketResult<Json<Vec<Photo>>> {
    Ok(Json(children(&state, "shop_id", shop_id).await?))
}

/// GET /photo/menu/{menu_id}
pub async fn photos_of_menu(
    State(state): State<AppState>,
    IdParam(menu_id): IdParam,
) -> MarketResult<Json<Vec<Photo>>> {
    Ok(Json(children(&state, "menu_id", menu_id).await?))
}

/// GET /social/shop/{shop_id}
pub async fn socials_of_shop(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
) -> MarketResult<Json<Vec<SocialMedia>>> {
    Ok(Json(children(&state, "shop_id", shop_id).await?))
}

/// GET /shopOpenDate/shop/{shop_id}
pub async fn open_dates_of_shop(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
) -> MarketResult<Json<Vec<ShopOpenDate>>> {
    Ok(Json(children(&state, "shop_id", shop_id).await?))
}

/// GET /shops/category/{category_id}
pub async fn shops_in_category(
    State(state): State<AppState>,
    IdParam(category_id): IdParam,
) -> MarketResult<Json<Vec<Shop>>> {
    Ok(Json(children(&state, "shop_category_id", category_id).await?))
}

async fn detail(state: &AppState, shop_id: i64, visibility: Visibility) -> MarketResult<ShopDetail> {
    let mut tx = state.begin().await?;
    let detail = views::shop_detail(&mut tx, shop_id, visibility).await?;
    tx.commit().await?;
    Ok(detail)
}

/// GET /shop/{id}/detail
pub async fn shop_detail(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<ShopDetail>> {
    Ok(Json(detail(&state, id, Visibility::All).await?))
}

/// GET /shop/{id}/available
pub async fn shop_available(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<ShopDetail>> {
    Ok(Json(detail(&state, id, Visibility::PublicOnly).await?))
}

/// GET /workshop
pub async fn list_workshops(
    State(state): State<AppState>,
) -> MarketResult<Json<Vec<WorkshopDetail>>> {
    let mut tx = state.begin().await?;
    let workshops = views::workshop_details(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(workshops))
}

/// GET /workshop/{id}
pub async fn workshop_detail(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> MarketResult<Json<WorkshopDetail>> {
    let mut tx = state.begin().await?;
    let workshop = views::workshop_detail(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(workshop))
}

/// GET /map/detail
pub async fn map_detail(State(state): State<AppState>) -> MarketResult<Json<Vec<MapBlockView>>> {
    let mut tx = state.begin().await?;
    let blocks = views::map_detail(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(blocks))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

/// GET /search?keyword=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> MarketResult<Json<Vec<SearchHit>>> {
    let mut tx = state.begin().await?;
    let hits = views::search_shops(&mut tx, &params.keyword).await?;
    tx.commit().await?;
    Ok(Json(hits))
}
