//! Read models for shop pages, the market map and search
//!
//! Each endpoint gets its own response shape, built by a small assembler
//! from the live rows.

use chrono::NaiveTime;
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::error::{EntityError, MarketResult, ValidationError};
use crate::core::store::{Filter, Tx};
use crate::entities::{
    Entrepreneur, MarketMap, Photo, Shop, ShopCategory, ShopMenu, ShopOpenDate, SocialMedia,
    Workshop,
};

/// Which child rows a view includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Everything, including hidden draft rows
    All,
    /// Only rows with `is_public = true`
    PublicOnly,
}

impl Visibility {
    fn admits(self, is_public: bool) -> bool {
        match self {
            Visibility::All => true,
            Visibility::PublicOnly => is_public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoView {
    pub photo_id: i64,
    pub pathfile: String,
    pub is_public: bool,
}

impl From<Photo> for PhotoView {
    fn from(photo: Photo) -> Self {
        Self {
            photo_id: photo.id,
            pathfile: photo.path_file,
            is_public: photo.is_public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub id: i64,
    pub product_name: String,
    pub product_description: String,
    pub price: f64,
    pub is_public: bool,
    pub photos: Vec<PhotoView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenDateView {
    pub id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub market_open_date_id: i64,
}

impl From<ShopOpenDate> for OpenDateView {
    fn from(row: ShopOpenDate) -> Self {
        Self {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            market_open_date_id: row.market_open_date_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialView {
    pub id: i64,
    pub name: String,
    pub platform: String,
    pub link: String,
    pub is_public: bool,
}

impl From<SocialMedia> for SocialView {
    fn from(row: SocialMedia) -> Self {
        Self {
            id: row.id,
            name: row.name,
            platform: row.platform,
            link: row.link,
            is_public: row.is_public,
        }
    }
}

/// Everything a shop page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopDetail {
    pub shop_id: i64,
    pub name: String,
    pub entrepreneur_id: i64,
    /// Owner's display name, empty when the owner row is gone
    pub entrepreneur: String,
    pub category_id: i64,
    /// Category name, empty when the category row is gone
    pub category: String,
    pub open_status: bool,
    pub description: String,
    pub photos: Vec<PhotoView>,
    pub shop_open_dates: Vec<OpenDateView>,
    pub menus: Vec<MenuView>,
    pub social_media: Vec<SocialView>,
}

/// One map block with the shop occupying it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBlockView {
    pub block_id: i64,
    pub block_name: String,
    pub block_zone: String,
    pub shop_id: i64,
    pub shop_name: String,
    pub category_id: Option<i64>,
}

/// Label used for map blocks whose shop no longer exists
pub const NO_SHOP: &str = "no shop";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub shop_id: i64,
    #[serde(rename = "matchWord")]
    pub match_word: String,
}

pub async fn photo_views(
    tx: &mut Tx,
    filter: Filter,
    visibility: Visibility,
) -> MarketResult<Vec<PhotoView>> {
    let photos: Vec<Photo> = tx.find(filter).await?;
    Ok(photos
        .into_iter()
        .filter(|p| visibility.admits(p.is_public))
        .map(PhotoView::from)
        .collect())
}

/// Menus of a shop, each with its photos
pub async fn menu_views(
    tx: &mut Tx,
    shop_id: i64,
    visibility: Visibility,
) -> MarketResult<Vec<MenuView>> {
    let menus: Vec<ShopMenu> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    let mut views = Vec::new();
    for menu in menus
        .into_iter()
        .filter(|m| visibility.admits(m.is_public))
    {
        let photos = photo_views(tx, Filter::new().eq("menu_id", menu.id), visibility).await?;
        views.push(MenuView {
            id: menu.id,
            product_name: menu.product_name,
            product_description: menu.product_description,
            price: menu.price,
            is_public: menu.is_public,
            photos,
        });
    }
    Ok(views)
}

pub async fn social_views(
    tx: &mut Tx,
    shop_id: i64,
    visibility: Visibility,
) -> MarketResult<Vec<SocialView>> {
    let rows: Vec<SocialMedia> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    Ok(rows
        .into_iter()
        .filter(|s| visibility.admits(s.is_public))
        .map(SocialView::from)
        .collect())
}

pub async fn open_date_views(tx: &mut Tx, shop_id: i64) -> MarketResult<Vec<OpenDateView>> {
    let rows: Vec<ShopOpenDate> = tx.find(Filter::new().eq("shop_id", shop_id)).await?;
    Ok(rows.into_iter().map(OpenDateView::from).collect())
}

/// Assemble the full page for one shop
pub async fn shop_detail(
    tx: &mut Tx,
    shop_id: i64,
    visibility: Visibility,
) -> MarketResult<ShopDetail> {
    let shop = tx
        .get::<Shop>(shop_id)
        .await?
        .ok_or_else(|| EntityError::not_found::<Shop>(shop_id))?;

    let category = tx
        .get::<ShopCategory>(shop.shop_category_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();
    let entrepreneur = tx
        .get::<Entrepreneur>(shop.entrepreneur_id)
        .await?
        .map(|e| e.display_name())
        .unwrap_or_default();

    Ok(ShopDetail {
        shop_id: shop.id,
        name: shop.name,
        entrepreneur_id: shop.entrepreneur_id,
        entrepreneur,
        category_id: shop.shop_category_id,
        category,
        open_status: shop.open_status,
        description: shop.description,
        photos: photo_views(tx, Filter::new().eq("shop_id", shop_id), visibility).await?,
        shop_open_dates: open_date_views(tx, shop_id).await?,
        menus: menu_views(tx, shop_id, visibility).await?,
        social_media: social_views(tx, shop_id, visibility).await?,
    })
}

/// A workshop with every photo uploaded for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopDetail {
    #[serde(flatten)]
    pub workshop: Workshop,
    pub photos: Vec<PhotoView>,
}

async fn with_photos(tx: &mut Tx, workshop: Workshop) -> MarketResult<WorkshopDetail> {
    let photos = photo_views(
        tx,
        Filter::new().eq("workshop_id", workshop.id),
        Visibility::All,
    )
    .await?;
    Ok(WorkshopDetail { workshop, photos })
}

pub async fn workshop_detail(tx: &mut Tx, workshop_id: i64) -> MarketResult<WorkshopDetail> {
    let workshop = tx
        .get::<Workshop>(workshop_id)
        .await?
        .ok_or_else(|| EntityError::not_found::<Workshop>(workshop_id))?;
    with_photos(tx, workshop).await
}

/// Every workshop with its photos, ordered by id
pub async fn workshop_details(tx: &mut Tx) -> MarketResult<Vec<WorkshopDetail>> {
    let workshops: Vec<Workshop> = tx.list().await?;
    let mut details = Vec::with_capacity(workshops.len());
    for workshop in workshops {
        details.push(with_photos(tx, workshop).await?);
    }
    Ok(details)
}

/// Every map block with its shop, ordered by block id
pub async fn map_detail(tx: &mut Tx) -> MarketResult<Vec<MapBlockView>> {
    let blocks: Vec<MarketMap> = tx.list().await?;
    let mut views = Vec::with_capacity(blocks.len());
    for block in blocks {
        let shop = tx.get::<Shop>(block.shop_id).await?;
        views.push(MapBlockView {
            block_id: block.id,
            block_name: block.block_name,
            block_zone: block.block_zone,
            shop_id: block.shop_id,
            shop_name: shop
                .as_ref()
                .map_or_else(|| NO_SHOP.to_string(), |s| s.name.clone()),
            category_id: shop.map(|s| s.shop_category_id),
        });
    }
    Ok(views)
}

/// Shops matching `keyword`, by shop name first and then by menu text
///
/// Matching is case-insensitive. A shop appears once, at its first match.
pub async fn search_shops(tx: &mut Tx, keyword: &str) -> MarketResult<Vec<SearchHit>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ValidationError::MissingArgument {
            argument: "keyword".to_string(),
        }
        .into());
    }
    let needle = keyword.to_lowercase();
    let contains = |text: &str| text.to_lowercase().contains(&needle);

    let mut hits: IndexMap<i64, SearchHit> = IndexMap::new();

    let shops: Vec<Shop> = tx.list().await?;
    for shop in shops.into_iter().filter(|s| contains(s.name.as_str())) {
        hits.entry(shop.id).or_insert(SearchHit {
            shop_id: shop.id,
            match_word: shop.name,
        });
    }

    let menus: Vec<ShopMenu> = tx.list().await?;
    for menu in menus
        .into_iter()
        .filter(|m| contains(m.product_name.as_str()) || contains(m.product_description.as_str()))
    {
        hits.entry(menu.shop_id).or_insert(SearchHit {
            shop_id: menu.shop_id,
            match_word: menu.product_name,
        });
    }

    tracing::debug!(keyword, hits = hits.len(), "searched shops");
    Ok(hits.into_values().collect())
}
