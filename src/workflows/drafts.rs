//! Draft bookkeeping
//!
//! Entrepreneurs never edit a live shop directly. New children are created
//! hidden and tagged with the shop's draft id, edits land in mirror rows,
//! and deletions are recorded in bins. [`approval`](super::approval) later
//! applies all of it at once.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{EntityError, MarketResult, WorkflowError};
use crate::core::record::Record;
use crate::core::store::{Filter, Tx};
use crate::entities::{
    DeleteMenu, DeletePhoto, DeleteSocial, Photo, Shop, ShopCategory, ShopMenu, SocialMedia,
    TempMenu, TempShop, TempShopOpenDate, TempShopStatus, TempSocial, Workshop,
};

/// Shop fields an entrepreneur submits for review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShopDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub shop_category_id: Option<i64>,
}

/// Pending menu edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MenuEdit {
    #[validate(length(min = 1, message = "product_name is required"))]
    pub product_name: String,
    pub product_description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

/// Pending social link edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SocialEdit {
    pub name: String,
    #[validate(length(min = 1, message = "platform is required"))]
    pub platform: String,
    #[validate(length(min = 1, message = "link is required"))]
    pub link: String,
}

/// What an uploaded photo is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoTarget {
    Menu(i64),
    Shop(i64),
    Workshop(i64),
}

/// The draft that owns changes to `shop_id`
pub async fn draft_for_shop(tx: &mut Tx, shop_id: i64) -> MarketResult<TempShop> {
    tx.first::<TempShop>(Filter::new().eq("shop_id", shop_id))
        .await?
        .ok_or_else(|| EntityError::none_matching::<TempShop>("shop_id", shop_id).into())
}

/// Prefer the row's own draft tag, fall back to the shop's draft
async fn owning_draft(tx: &mut Tx, temp_id: Option<i64>, shop_id: i64) -> MarketResult<i64> {
    if let Some(temp_id) = temp_id {
        if tx.get::<TempShop>(temp_id).await?.is_some() {
            return Ok(temp_id);
        }
    }
    Ok(draft_for_shop(tx, shop_id).await?.id)
}

async fn require<T: Record>(tx: &mut Tx, id: i64) -> MarketResult<T> {
    tx.get::<T>(id)
        .await?
        .ok_or_else(|| EntityError::not_found::<T>(id).into())
}

/// Create a shop and its draft
///
/// The draft starts out `Approve` because it mirrors the shop as created.
pub async fn create_shop_with_draft(tx: &mut Tx, mut shop: Shop) -> MarketResult<(Shop, TempShop)> {
    require::<ShopCategory>(tx, shop.shop_category_id).await?;

    shop.id = 0;
    let shop = tx.create(shop).await?;
    let draft = tx
        .create(TempShop {
            id: 0,
            name: shop.name.clone(),
            description: shop.description.clone(),
            shop_category_id: Some(shop.shop_category_id),
            shop_id: Some(shop.id),
            status: TempShopStatus::Approve,
        })
        .await?;

    tracing::debug!(shop_id = shop.id, temp_id = draft.id, "created shop with draft");
    Ok((shop, draft))
}

/// Stage new shop fields and put the draft up for review
pub async fn submit_shop_draft(
    tx: &mut Tx,
    shop_id: i64,
    edits: ShopDraft,
) -> MarketResult<TempShop> {
    let mut draft = draft_for_shop(tx, shop_id).await?;
    draft.name = edits.name;
    draft.description = edits.description;
    draft.shop_category_id = edits.shop_category_id.or(draft.shop_category_id);
    draft.status = TempShopStatus::Waiting;
    tx.save(&draft).await?;

    tracing::debug!(shop_id, temp_id = draft.id, "submitted shop draft");
    Ok(draft)
}

/// Create a menu under its shop's draft, together with its mirror
pub async fn create_menu_with_draft(
    tx: &mut Tx,
    mut menu: ShopMenu,
) -> MarketResult<(ShopMenu, TempMenu)> {
    let draft = draft_for_shop(tx, menu.shop_id).await?;

    menu.id = 0;
    menu.temp_id = Some(draft.id);
    let menu = tx.create(menu).await?;
    let mirror = tx
        .create(TempMenu {
            id: 0,
            temp_id: draft.id,
            menu_id: menu.id,
            product_name: menu.product_name.clone(),
            product_description: menu.product_description.clone(),
            price: menu.price,
        })
        .await?;

    tracing::debug!(menu_id = menu.id, temp_id = draft.id, "created menu with draft");
    Ok((menu, mirror))
}

/// Record a pending edit of a live menu
pub async fn stage_menu_edit(tx: &mut Tx, menu_id: i64, edits: MenuEdit) -> MarketResult<TempMenu> {
    let menu = require::<ShopMenu>(tx, menu_id).await?;
    let temp_id = owning_draft(tx, menu.temp_id, menu.shop_id).await?;

    let existing = tx
        .first::<TempMenu>(Filter::new().eq("menu_id", menu_id))
        .await?;
    let mut mirror = existing.unwrap_or_default();
    mirror.temp_id = temp_id;
    mirror.menu_id = menu_id;
    mirror.product_name = edits.product_name;
    mirror.product_description = edits.product_description;
    mirror.price = edits.price;

    let mirror = if mirror.id > 0 {
        tx.save(&mirror).await?;
        mirror
    } else {
        tx.create(mirror).await?
    };

    tracing::debug!(menu_id, temp_id, "staged menu edit");
    Ok(mirror)
}

/// Create a social link under its shop's draft, together with its mirror
pub async fn create_social_with_draft(
    tx: &mut Tx,
    mut social: SocialMedia,
) -> MarketResult<(SocialMedia, TempSocial)> {
    let draft = draft_for_shop(tx, social.shop_id).await?;

    social.id = 0;
    social.temp_id = Some(draft.id);
    let social = tx.create(social).await?;
    let mirror = tx
        .create(TempSocial {
            id: 0,
            temp_id: draft.id,
            social_id: social.id,
            name: social.name.clone(),
            platform: social.platform.clone(),
            link: social.link.clone(),
        })
        .await?;

    tracing::debug!(social_id = social.id, temp_id = draft.id, "created social link with draft");
    Ok((social, mirror))
}

/// Record a pending edit of a live social link
pub async fn stage_social_edit(
    tx: &mut Tx,
    social_id: i64,
    edits: SocialEdit,
) -> MarketResult<TempSocial> {
    let social = require::<SocialMedia>(tx, social_id).await?;
    let temp_id = owning_draft(tx, social.temp_id, social.shop_id).await?;

    let existing = tx
        .first::<TempSocial>(Filter::new().eq("social_id", social_id))
        .await?;
    let mut mirror = existing.unwrap_or_default();
    mirror.temp_id = temp_id;
    mirror.social_id = social_id;
    mirror.name = edits.name;
    mirror.platform = edits.platform;
    mirror.link = edits.link;

    let mirror = if mirror.id > 0 {
        tx.save(&mirror).await?;
        mirror
    } else {
        tx.create(mirror).await?
    };

    tracing::debug!(social_id, temp_id, "staged social edit");
    Ok(mirror)
}

/// Put a live menu in its draft's bin; marking twice returns the same entry
pub async fn mark_menu_for_deletion(tx: &mut Tx, menu_id: i64) -> MarketResult<DeleteMenu> {
    let menu = require::<ShopMenu>(tx, menu_id).await?;
    let temp_id = owning_draft(tx, menu.temp_id, menu.shop_id).await?;

    let filter = Filter::new().eq("temp_id", temp_id).eq("menu_id", menu_id);
    if let Some(entry) = tx.first::<DeleteMenu>(filter).await? {
        return Ok(entry);
    }

    let entry = tx
        .create(DeleteMenu {
            id: 0,
            temp_id,
            menu_id,
        })
        .await?;
    tracing::debug!(menu_id, temp_id, "marked menu for deletion");
    Ok(entry)
}

/// Put a live photo in its draft's bin
///
/// Menu photos belong to the draft of the menu's shop. Workshop photos have
/// no shop and cannot be binned.
pub async fn mark_photo_for_deletion(tx: &mut Tx, photo_id: i64) -> MarketResult<DeletePhoto> {
    let photo = require::<Photo>(tx, photo_id).await?;

    let shop_id = match (photo.shop_id, photo.menu_id) {
        (Some(shop_id), _) => Some(shop_id),
        (None, Some(menu_id)) => tx.get::<ShopMenu>(menu_id).await?.map(|m| m.shop_id),
        (None, None) => None,
    };
    let shop_id = shop_id.ok_or_else(|| WorkflowError::NoDraft {
        entity_type: Photo::KIND.to_string(),
        id: photo_id,
    })?;
    let temp_id = owning_draft(tx, photo.temp_id, shop_id).await?;

    let filter = Filter::new().eq("temp_id", temp_id).eq("photo_id", photo_id);
    if let Some(entry) = tx.first::<DeletePhoto>(filter).await? {
        return Ok(entry);
    }

    let entry = tx
        .create(DeletePhoto {
            id: 0,
            temp_id,
            photo_id,
        })
        .await?;
    tracing::debug!(photo_id, temp_id, "marked photo for deletion");
    Ok(entry)
}

/// Put a live social link in its draft's bin
pub async fn mark_social_for_deletion(tx: &mut Tx, social_id: i64) -> MarketResult<DeleteSocial> {
    let social = require::<SocialMedia>(tx, social_id).await?;
    let temp_id = owning_draft(tx, social.temp_id, social.shop_id).await?;

    let filter = Filter::new()
        .eq("temp_id", temp_id)
        .eq("social_id", social_id);
    if let Some(entry) = tx.first::<DeleteSocial>(filter).await? {
        return Ok(entry);
    }

    let entry = tx
        .create(DeleteSocial {
            id: 0,
            temp_id,
            social_id,
        })
        .await?;
    tracing::debug!(social_id, temp_id, "marked social link for deletion");
    Ok(entry)
}

/// Stage an open-hours operation under an existing draft
///
/// A zero `shop_id` is filled in from the draft's shop link.
pub async fn stage_open_date(
    tx: &mut Tx,
    mut staged: TempShopOpenDate,
) -> MarketResult<TempShopOpenDate> {
    let draft = require::<TempShop>(tx, staged.temp_id).await?;
    if staged.shop_id == 0 {
        staged.shop_id = draft
            .shop_id
            .ok_or(WorkflowError::MissingShopLink { temp_id: draft.id })?;
    }

    staged.id = 0;
    let staged = tx.create(staged).await?;
    tracing::debug!(
        temp_id = staged.temp_id,
        shop_id = staged.shop_id,
        market_open_date_id = staged.market_open_date_id,
        operation = %staged.operation,
        "staged open date"
    );
    Ok(staged)
}

/// Check the upload target and build its photo row, without a file yet
///
/// Menu photos inherit the menu's draft tag and shop photos the shop's
/// draft, so hidden uploads are published on approval. Fails with 404
/// when the target does not exist.
pub async fn photo_for(
    tx: &mut Tx,
    target: PhotoTarget,
    photo_category: String,
    is_public: bool,
) -> MarketResult<Photo> {
    let mut photo = Photo {
        photo_category,
        is_public,
        ..Default::default()
    };

    match target {
        PhotoTarget::Menu(menu_id) => {
            let menu = require::<ShopMenu>(tx, menu_id).await?;
            photo.menu_id = Some(menu_id);
            photo.temp_id = menu.temp_id;
        }
        PhotoTarget::Shop(shop_id) => {
            require::<Shop>(tx, shop_id).await?;
            photo.shop_id = Some(shop_id);
            photo.temp_id = tx
                .first::<TempShop>(Filter::new().eq("shop_id", shop_id))
                .await?
                .map(|draft| draft.id);
        }
        PhotoTarget::Workshop(workshop_id) => {
            let workshop = require::<Workshop>(tx, workshop_id).await?;
            photo.workshop_id = Some(workshop_id);
            photo.workshop_name = workshop.name;
        }
    }

    Ok(photo)
}

/// Create the photo row for an upload already written to the file store
pub async fn attach_photo(
    tx: &mut Tx,
    target: PhotoTarget,
    path_file: String,
    photo_category: String,
    is_public: bool,
) -> MarketResult<Photo> {
    let mut photo = photo_for(tx, target, photo_category, is_public).await?;
    photo.path_file = path_file;
    Ok(tx.create(photo).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::Store;
    use crate::entities::OpenDateOperation;
    use crate::storage::InMemoryStore;
    use std::sync::Arc;

    async fn with_shop() -> (Tx, Shop, TempShop) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let mut tx = store.transaction().await.unwrap();
        tx.create(ShopCategory {
            id: 1,
            name: "Food".to_string(),
        })
        .await
        .unwrap();
        let (shop, draft) = create_shop_with_draft(
            &mut tx,
            Shop {
                name: "Noodles".to_string(),
                shop_category_id: 1,
                entrepreneur_id: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (tx, shop, draft)
    }

    #[tokio::test]
    async fn test_create_shop_creates_approved_draft() {
        let (_tx, shop, draft) = with_shop().await;

        assert_eq!(draft.shop_id, Some(shop.id));
        assert_eq!(draft.status, TempShopStatus::Approve);
        assert_eq!(draft.name, "Noodles");
    }

    #[tokio::test]
    async fn test_create_shop_requires_category() {
        let (mut tx, _, _) = with_shop().await;

        let err = create_shop_with_draft(
            &mut tx,
            Shop {
                name: "Nowhere".to_string(),
                shop_category_id: 9,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_submit_sets_waiting() {
        let (mut tx, shop, _) = with_shop().await;

        let draft = submit_shop_draft(
            &mut tx,
            shop.id,
            ShopDraft {
                name: "Noodle bar".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(draft.status, TempShopStatus::Waiting);
        assert_eq!(draft.shop_category_id, Some(1));
        let live = tx.get::<Shop>(shop.id).await.unwrap().unwrap();
        assert_eq!(live.name, "Noodles");
    }

    #[tokio::test]
    async fn test_menu_draft_and_edit_share_one_mirror() {
        let (mut tx, shop, draft) = with_shop().await;
        let (menu, mirror) = create_menu_with_draft(
            &mut tx,
            ShopMenu {
                product_name: "Tea".to_string(),
                price: 20.0,
                shop_id: shop.id,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(menu.temp_id, Some(draft.id));
        assert!(!menu.is_public);

        let edited = stage_menu_edit(
            &mut tx,
            menu.id,
            MenuEdit {
                product_name: "Milk tea".to_string(),
                price: 30.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.id, mirror.id);
        assert_eq!(tx.list::<TempMenu>().await.unwrap().len(), 1);
        let live = tx.get::<ShopMenu>(menu.id).await.unwrap().unwrap();
        assert_eq!(live.product_name, "Tea");
    }

    #[tokio::test]
    async fn test_menu_without_draft_is_not_found() {
        let (mut tx, _, _) = with_shop().await;

        let err = create_menu_with_draft(
            &mut tx,
            ShopMenu {
                product_name: "Tea".to_string(),
                shop_id: 99,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_marking_twice_is_idempotent() {
        let (mut tx, shop, draft) = with_shop().await;
        let (social, _) = create_social_with_draft(
            &mut tx,
            SocialMedia {
                platform: "facebook".to_string(),
                link: "fb.me/noodles".to_string(),
                shop_id: shop.id,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let first = mark_social_for_deletion(&mut tx, social.id).await.unwrap();
        let second = mark_social_for_deletion(&mut tx, social.id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.temp_id, draft.id);
        assert_eq!(tx.list::<DeleteSocial>().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_menu_photo_bins_under_shop_draft() {
        let (mut tx, shop, draft) = with_shop().await;
        let (menu, _) = create_menu_with_draft(
            &mut tx,
            ShopMenu {
                product_name: "Tea".to_string(),
                shop_id: shop.id,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let photo = attach_photo(
            &mut tx,
            PhotoTarget::Menu(menu.id),
            "tea.png".to_string(),
            String::new(),
            false,
        )
        .await
        .unwrap();
        assert_eq!(photo.temp_id, Some(draft.id));

        let entry = mark_photo_for_deletion(&mut tx, photo.id).await.unwrap();
        assert_eq!(entry.temp_id, draft.id);
    }

    #[tokio::test]
    async fn test_photo_for_missing_target_writes_nothing() {
        let (mut tx, _, _) = with_shop().await;

        let err = photo_for(&mut tx, PhotoTarget::Menu(999), String::new(), false)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
        assert!(tx.list::<Photo>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_workshop_photo_cannot_be_binned() {
        let (mut tx, _, _) = with_shop().await;
        let workshop = tx
            .create(Workshop {
                name: "Batik".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let photo = attach_photo(
            &mut tx,
            PhotoTarget::Workshop(workshop.id),
            "batik.png".to_string(),
            String::new(),
            true,
        )
        .await
        .unwrap();
        assert_eq!(photo.workshop_name, "Batik");
        assert_eq!(photo.workshop_id, Some(workshop.id));

        let err = mark_photo_for_deletion(&mut tx, photo.id).await.unwrap_err();
        assert_eq!(err.error_code(), "NO_DRAFT");
    }

    #[tokio::test]
    async fn test_stage_open_date_fills_shop_from_draft() {
        let (mut tx, shop, draft) = with_shop().await;

        let staged = stage_open_date(
            &mut tx,
            TempShopOpenDate {
                market_open_date_id: 3,
                temp_id: draft.id,
                operation: OpenDateOperation::Add,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(staged.shop_id, shop.id);

        let err = stage_open_date(
            &mut tx,
            TempShopOpenDate {
                temp_id: 404,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
    }
}
