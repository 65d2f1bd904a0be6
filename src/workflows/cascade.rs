//! Cascading deletes
//!
//! Removing a live row also removes everything that only makes sense while
//! it exists. A menu takes its photos and draft mirror with it, a workshop
//! its photos, a shop its whole aggregate, an entrepreneur every shop. All
//! functions run inside the caller's transaction and record the stored
//! file of every photo row they drop in a [`FileSweep`], which the caller
//! runs after commit.

use crate::core::error::{EntityError, MarketResult};
use crate::core::files::FileSweep;
use crate::core::store::{Filter, Tx};
use crate::entities::{
    DeleteMenu, DeletePhoto, DeleteSocial, Entrepreneur, MarketMap, Photo, Shop, ShopMenu,
    ShopOpenDate, SocialMedia, TempMenu, TempShop, TempShopOpenDate, TempSocial, Workshop,
};

/// Delete a menu with its photos, draft mirror and pending bin entries
///
/// Returns whether the menu row itself existed.
pub async fn delete_menu(tx: &mut Tx, menu_id: i64, sweep: &mut FileSweep) -> MarketResult<bool> {
    let photos: Vec<Photo> = tx.find(Filter::new().eq("menu_id", menu_id)).await?;
    for photo in &photos {
        sweep.push(photo.path_file.as_str());
        tx.delete_where::<DeletePhoto>(Filter::new().eq("photo_id", photo.id))
            .await?;
    }
    tx.delete_where::<Photo>(Filter::new().eq("menu_id", menu_id))
        .await?;

    tx.delete_where::<TempMenu>(Filter::new().eq("menu_id", menu_id))
        .await?;
    tx.delete_where::<DeleteMenu>(Filter::new().eq("menu_id", menu_id))
        .await?;

    let existed = tx.delete_by_id::<ShopMenu>(menu_id).await?;
    tracing::debug!(menu_id, photos = photos.len(), existed, "deleted menu");
    Ok(existed)
}

/// Delete one photo row and schedule its file
pub async fn delete_photo(
    tx: &mut Tx,
    photo_id: i64,
    sweep: &mut FileSweep,
) -> MarketResult<bool> {
    let Some(photo) = tx.get::<Photo>(photo_id).await? else {
        return Ok(false);
    };

    sweep.push(photo.path_file);
    tx.delete_where::<DeletePhoto>(Filter::new().eq("photo_id", photo_id))
        .await?;
    tx.delete_by_id::<Photo>(photo_id).await?;
    tracing::debug!(photo_id, "deleted photo");
    Ok(true)
}

/// Delete a social link with its draft mirror and pending bin entries
pub async fn delete_social(tx: &mut Tx, social_id: i64) -> MarketResult<bool> {
    tx.delete_where::<TempSocial>(Filter::new().eq("social_id", social_id))
        .await?;
    tx.delete_where::<DeleteSocial>(Filter::new().eq("social_id", social_id))
        .await?;

    let existed = tx.delete_by_id::<SocialMedia>(social_id).await?;
    tracing::debug!(social_id, existed, "deleted social link");
    Ok(existed)
}

/// Delete a shop and its whole aggregate
///
/// Menus go first so their photos are swept, then the shop's own photos,
/// social links, open hours, map blocks and every draft that targets the
/// shop. Returns whether the shop row itself existed.
pub async fn delete_shop(tx: &mut Tx, shop_id: i64, sweep: &mut FileSweep) -> MarketResult<bool> {
    let menus: Vec<ShopMenu> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    for menu in &menus {
        delete_menu(tx, menu.id, sweep).await?;
    }

    let photos: Vec<Photo> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    for photo in &photos {
        delete_photo(tx, photo.id, sweep).await?;
    }

    let socials: Vec<SocialMedia> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    for social in &socials {
        delete_social(tx, social.id).await?;
    }

    tx.delete_where::<ShopOpenDate>(Filter::new().eq("shop_id", shop_id))
        .await?;
    tx.delete_where::<TempShopOpenDate>(Filter::new().eq("shop_id", shop_id))
        .await?;
    tx.delete_where::<MarketMap>(Filter::new().eq("shop_id", shop_id))
        .await?;

    let drafts: Vec<TempShop> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    for draft in &drafts {
        discard_draft(tx, draft.id).await?;
    }

    let existed = tx.delete_by_id::<Shop>(shop_id).await?;
    tracing::debug!(
        shop_id,
        menus = menus.len(),
        photos = photos.len(),
        socials = socials.len(),
        drafts = drafts.len(),
        existed,
        "deleted shop"
    );
    Ok(existed)
}

/// Drop a draft together with everything staged under it
///
/// Open-hours operations, menu and social mirrors and bin entries go with
/// it. Live rows tagged with the draft stay. Returns whether the draft
/// itself existed.
pub async fn discard_draft(tx: &mut Tx, temp_id: i64) -> MarketResult<bool> {
    let by_temp = || Filter::new().eq("temp_id", temp_id);

    tx.delete_where::<TempShopOpenDate>(by_temp()).await?;
    tx.delete_where::<TempMenu>(by_temp()).await?;
    tx.delete_where::<TempSocial>(by_temp()).await?;
    tx.delete_where::<DeleteMenu>(by_temp()).await?;
    tx.delete_where::<DeletePhoto>(by_temp()).await?;
    tx.delete_where::<DeleteSocial>(by_temp()).await?;
    let existed = tx.delete_by_id::<TempShop>(temp_id).await?;
    tracing::debug!(temp_id, existed, "discarded draft");
    Ok(existed)
}

/// Delete a workshop and the photos uploaded for it
pub async fn delete_workshop(
    tx: &mut Tx,
    workshop_id: i64,
    sweep: &mut FileSweep,
) -> MarketResult<bool> {
    let photos: Vec<Photo> = tx.find(Filter::new().eq("workshop_id", workshop_id)).await?;
    for photo in &photos {
        delete_photo(tx, photo.id, sweep).await?;
    }

    let existed = tx.delete_by_id::<Workshop>(workshop_id).await?;
    tracing::debug!(workshop_id, photos = photos.len(), existed, "deleted workshop");
    Ok(existed)
}

/// Delete an entrepreneur and every shop they own
///
/// Fails with 404 when the entrepreneur does not exist; nothing is removed
/// in that case.
pub async fn delete_entrepreneur(
    tx: &mut Tx,
    entrepreneur_id: i64,
    sweep: &mut FileSweep,
) -> MarketResult<()> {
    if tx.get::<Entrepreneur>(entrepreneur_id).await?.is_none() {
        return Err(EntityError::not_found::<Entrepreneur>(entrepreneur_id).into());
    }

    let shops: Vec<Shop> = tx
        .find(Filter::new().eq("entrepreneur_id", entrepreneur_id))
        .await?;
    for shop in &shops {
        delete_shop(tx, shop.id, sweep).await?;
    }

    tx.delete_by_id::<Entrepreneur>(entrepreneur_id).await?;
    tracing::debug!(entrepreneur_id, shops = shops.len(), "deleted entrepreneur");
    Ok(())
}

/// Delete every menu staged in the menu bin of `temp_id`
///
/// Returns how many live menus were removed.
pub async fn flush_menu_bin(tx: &mut Tx, temp_id: i64, sweep: &mut FileSweep) -> MarketResult<usize> {
    let entries: Vec<DeleteMenu> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut removed = 0;
    for entry in &entries {
        if delete_menu(tx, entry.menu_id, sweep).await? {
            removed += 1;
        } else {
            tracing::warn!(temp_id, menu_id = entry.menu_id, "binned menu already gone");
        }
    }
    tx.delete_where::<DeleteMenu>(Filter::new().eq("temp_id", temp_id))
        .await?;
    Ok(removed)
}

/// Delete every photo staged in the photo bin of `temp_id`
pub async fn flush_photo_bin(
    tx: &mut Tx,
    temp_id: i64,
    sweep: &mut FileSweep,
) -> MarketResult<usize> {
    let entries: Vec<DeletePhoto> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut removed = 0;
    for entry in &entries {
        if delete_photo(tx, entry.photo_id, sweep).await? {
            removed += 1;
        } else {
            tracing::warn!(temp_id, photo_id = entry.photo_id, "binned photo already gone");
        }
    }
    tx.delete_where::<DeletePhoto>(Filter::new().eq("temp_id", temp_id))
        .await?;
    Ok(removed)
}

/// Delete every social link staged in the social bin of `temp_id`
pub async fn flush_social_bin(tx: &mut Tx, temp_id: i64) -> MarketResult<usize> {
    let entries: Vec<DeleteSocial> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut removed = 0;
    for entry in &entries {
        if delete_social(tx, entry.social_id).await? {
            removed += 1;
        } else {
            tracing::warn!(temp_id, social_id = entry.social_id, "binned social link already gone");
        }
    }
    tx.delete_where::<DeleteSocial>(Filter::new().eq("temp_id", temp_id))
        .await?;
    Ok(removed)
}
