//! Draft approval
//!
//! [`approve`] promotes a [`TempShop`] into the live shop aggregate in one
//! transaction:
//!
//! 1. mark the draft `Approve`
//! 2. copy name, description and category onto the live shop
//! 3. delete every live row named in the draft's bins
//! 4. apply pending [`TempMenu`] and [`TempSocial`] edits
//! 5. publish every child row the draft created
//! 6. replay staged open-hours operations
//! 7. drop the consumed staging rows
//!
//! A failure at any step leaves the transaction uncommitted.

use crate::core::error::{EntityError, MarketResult, WorkflowError};
use crate::core::files::FileSweep;
use crate::core::store::{Filter, Tx};
use crate::entities::{
    OpenDateOperation, Photo, Publishable, Shop, ShopMenu, ShopOpenDate, SocialMedia, TempMenu,
    TempShop, TempShopOpenDate, TempShopStatus, TempSocial,
};
use crate::workflows::cascade;

/// Counts of what one approval changed, for logging
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalSummary {
    pub menus_deleted: usize,
    pub photos_deleted: usize,
    pub socials_deleted: usize,
    pub mirrors_applied: usize,
    pub rows_published: usize,
    pub open_dates_applied: usize,
    pub open_dates_skipped: usize,
}

/// Approve draft `temp_id` and return it as stored afterwards
///
/// Any current status is accepted, so a rejected draft can still be
/// approved later.
pub async fn approve(tx: &mut Tx, temp_id: i64, sweep: &mut FileSweep) -> MarketResult<TempShop> {
    let mut draft = tx
        .get::<TempShop>(temp_id)
        .await?
        .ok_or_else(|| EntityError::not_found::<TempShop>(temp_id))?;

    let previous = draft.status;
    draft.status = TempShopStatus::Approve;
    tx.save(&draft).await?;

    copy_to_shop(tx, &draft).await?;

    let mut summary = ApprovalSummary {
        menus_deleted: cascade::flush_menu_bin(tx, temp_id, sweep).await?,
        photos_deleted: cascade::flush_photo_bin(tx, temp_id, sweep).await?,
        socials_deleted: cascade::flush_social_bin(tx, temp_id).await?,
        ..Default::default()
    };

    summary.mirrors_applied = apply_menu_mirrors(tx, temp_id).await?
        + apply_social_mirrors(tx, temp_id).await?;

    summary.rows_published = publish::<ShopMenu>(tx, temp_id).await?
        + publish::<Photo>(tx, temp_id).await?
        + publish::<SocialMedia>(tx, temp_id).await?;

    let (applied, skipped) = apply_open_dates(tx, temp_id).await?;
    summary.open_dates_applied = applied;
    summary.open_dates_skipped = skipped;

    tx.delete_where::<TempShopOpenDate>(Filter::new().eq("temp_id", temp_id))
        .await?;

    tracing::info!(
        temp_id,
        from = %previous,
        ?summary,
        "approved shop draft"
    );

    tx.get::<TempShop>(temp_id)
        .await?
        .ok_or_else(|| EntityError::not_found::<TempShop>(temp_id).into())
}

/// Reject draft `temp_id`; only a `Waiting` draft can be rejected
pub async fn not_approve(tx: &mut Tx, temp_id: i64) -> MarketResult<TempShop> {
    let mut draft = tx
        .get::<TempShop>(temp_id)
        .await?
        .ok_or_else(|| EntityError::not_found::<TempShop>(temp_id))?;

    if draft.status != TempShopStatus::Waiting {
        return Err(WorkflowError::InvalidTransition {
            temp_id,
            from: draft.status.to_string(),
            to: TempShopStatus::NotApprove.to_string(),
        }
        .into());
    }

    draft.status = TempShopStatus::NotApprove;
    tx.save(&draft).await?;
    tracing::info!(temp_id, "rejected shop draft");
    Ok(draft)
}

async fn copy_to_shop(tx: &mut Tx, draft: &TempShop) -> MarketResult<()> {
    let shop_id = draft.shop_id.ok_or(WorkflowError::MissingShopLink { temp_id: draft.id })?;
    let mut shop = tx
        .get::<Shop>(shop_id)
        .await?
        .ok_or(WorkflowError::ShopMissing {
            temp_id: draft.id,
            shop_id,
        })?;

    shop.name = draft.name.clone();
    shop.description = draft.description.clone();
    if let Some(category_id) = draft.shop_category_id {
        shop.shop_category_id = category_id;
    }
    tx.save(&shop).await?;
    tracing::debug!(temp_id = draft.id, shop_id, "copied draft fields onto shop");
    Ok(())
}

async fn apply_menu_mirrors(tx: &mut Tx, temp_id: i64) -> MarketResult<usize> {
    let mirrors: Vec<TempMenu> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut applied = 0;
    for mirror in mirrors {
        let Some(mut menu) = tx.get::<ShopMenu>(mirror.menu_id).await? else {
            tracing::warn!(temp_id, menu_id = mirror.menu_id, "menu mirror has no live menu");
            continue;
        };
        menu.product_name = mirror.product_name;
        menu.product_description = mirror.product_description;
        menu.price = mirror.price;
        tx.save(&menu).await?;
        applied += 1;
    }
    Ok(applied)
}

async fn apply_social_mirrors(tx: &mut Tx, temp_id: i64) -> MarketResult<usize> {
    let mirrors: Vec<TempSocial> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut applied = 0;
    for mirror in mirrors {
        let Some(mut social) = tx.get::<SocialMedia>(mirror.social_id).await? else {
            tracing::warn!(
                temp_id,
                social_id = mirror.social_id,
                "social mirror has no live social link"
            );
            continue;
        };
        social.name = mirror.name;
        social.platform = mirror.platform;
        social.link = mirror.link;
        tx.save(&social).await?;
        applied += 1;
    }
    Ok(applied)
}

/// Make every hidden row of `T` created under the draft public
async fn publish<T: Publishable>(tx: &mut Tx, temp_id: i64) -> MarketResult<usize> {
    let rows: Vec<T> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let mut published = 0;
    for mut row in rows.into_iter().filter(|row| !row.is_public()) {
        row.publish();
        tx.save(&row).await?;
        published += 1;
    }
    Ok(published)
}

/// Replay staged open-hours operations; returns `(applied, skipped)`
///
/// Edits and deletes match the live row on `(shop_id, market_open_date_id)`.
/// An unmatched operation is logged and skipped.
async fn apply_open_dates(tx: &mut Tx, temp_id: i64) -> MarketResult<(usize, usize)> {
    let staged: Vec<TempShopOpenDate> = tx.find(Filter::new().eq("temp_id", temp_id)).await?;
    let (mut applied, mut skipped) = (0, 0);

    for change in staged {
        let key = Filter::new()
            .eq("shop_id", change.shop_id)
            .eq("market_open_date_id", change.market_open_date_id);

        match change.operation {
            OpenDateOperation::Add => {
                tx.create(ShopOpenDate {
                    id: 0,
                    start_time: change.start_time,
                    end_time: change.end_time,
                    shop_id: change.shop_id,
                    market_open_date_id: change.market_open_date_id,
                })
                .await?;
                applied += 1;
            }
            OpenDateOperation::Edit => match tx.first::<ShopOpenDate>(key).await? {
                Some(mut live) => {
                    live.start_time = change.start_time;
                    live.end_time = change.end_time;
                    tx.save(&live).await?;
                    applied += 1;
                }
                None => {
                    tracing::warn!(
                        temp_id,
                        shop_id = change.shop_id,
                        market_open_date_id = change.market_open_date_id,
                        "no open date to edit"
                    );
                    skipped += 1;
                }
            },
            OpenDateOperation::Delete => match tx.first::<ShopOpenDate>(key).await? {
                Some(live) => {
                    tx.delete_by_id::<ShopOpenDate>(live.id).await?;
                    applied += 1;
                }
                None => {
                    tracing::warn!(
                        temp_id,
                        shop_id = change.shop_id,
                        market_open_date_id = change.market_open_date_id,
                        "no open date to delete"
                    );
                    skipped += 1;
                }
            },
        }
    }

    Ok((applied, skipped))
}
