//! Route table
//!
//! [`register_resources`] declares the CRUD resources and the handlers
//! that replace their generic create/delete. [`build_workflow_routes`]
//! holds every route that is not plain CRUD.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};

use crate::entities::{
    Admin, ContactToAdmin, DeleteMenu, DeletePhoto, DeleteSocial, Entrepreneur, MarketMap,
    MarketOpenDate, Photo, Shop, ShopCategory, ShopMenu, ShopOpenDate, SocialMedia, TempMenu,
    TempShop, TempShopOpenDate, TempSocial, Workshop,
};
use crate::server::crud::RecordDescriptor;
use crate::server::entity_registry::EntityRegistry;
use crate::server::handlers;
use crate::server::state::AppState;
use crate::server::upload::{self, MAX_UPLOAD_BYTES};

/// Register every CRUD resource
pub fn register_resources(registry: &mut EntityRegistry) {
    registry.register(Box::new(RecordDescriptor::<Admin>::new("/admin")));
    registry.register(Box::new(
        RecordDescriptor::<Entrepreneur>::new("/entrepreneur")
            .with_delete(delete(handlers::delete_entrepreneur)),
    ));
    registry.register(Box::new(RecordDescriptor::<ShopCategory>::new(
        "/shopcategory",
    )));
    registry.register(Box::new(
        RecordDescriptor::<Shop>::new("/shop")
            .with_create(post(handlers::create_shop))
            .with_delete(delete(handlers::delete_shop)),
    ));
    registry.register(Box::new(
        RecordDescriptor::<ShopMenu>::new("/menu")
            .with_create(post(handlers::create_menu))
            .with_delete(delete(handlers::delete_menu)),
    ));
    registry.register(Box::new(
        RecordDescriptor::<Photo>::new("/photo").with_delete(delete(handlers::delete_photo)),
    ));
    registry.register(Box::new(
        RecordDescriptor::<SocialMedia>::new("/social")
            .with_create(post(handlers::create_social))
            .with_delete(delete(handlers::delete_social)),
    ));

    registry.register(Box::new(RecordDescriptor::<MarketOpenDate>::new(
        "/marketDate",
    )));
    registry.register(Box::new(RecordDescriptor::<ShopOpenDate>::new(
        "/shopOpenDate",
    )));
    registry.register(Box::new(
        RecordDescriptor::<Workshop>::new("/workshop")
            .with_list(get(handlers::list_workshops))
            .with_get(get(handlers::workshop_detail))
            .with_delete(delete(handlers::delete_workshop)),
    ));
    registry.register(Box::new(RecordDescriptor::<ContactToAdmin>::new("/contact")));
    registry.register(Box::new(RecordDescriptor::<MarketMap>::new("/map")));

    registry.register(Box::new(
        RecordDescriptor::<TempShop>::new("/tempShop")
            .with_delete(delete(handlers::delete_temp_shop)),
    ));
    registry.register(Box::new(
        RecordDescriptor::<TempShopOpenDate>::new("/tempShopOpenDate")
            .with_create(post(handlers::create_staged_open_date)),
    ));
    registry.register(Box::new(RecordDescriptor::<TempMenu>::new("/tempMenu")));
    registry.register(Box::new(RecordDescriptor::<TempSocial>::new("/tempSocial")));

    registry.register(Box::new(RecordDescriptor::<DeleteMenu>::new("/binMenu")));
    registry.register(Box::new(RecordDescriptor::<DeletePhoto>::new("/binPhoto")));
    registry.register(Box::new(RecordDescriptor::<DeleteSocial>::new("/binSocial")));
}

/// Build the workflow, staging, upload and lookup routes
///
/// - GET /approve/{id}, PUT /notApprove/{temp_id}
/// - PUT /tempShop/shop/{shop_id}, /tempMenu/menu/{menu_id}, /tempSocial/social/{social_id}
/// - POST /binMenu/menu/{menu_id} (and photo/social), DELETE /binMenu/temp/{temp_id} (and photo/social)
/// - POST /photo/{menu,shop,workshop}/{id} multipart uploads
/// - GET shop detail views, child lookups, /map/detail and /search
pub fn build_workflow_routes() -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024);

    Router::new()
        .route("/approve/{id}", get(handlers::approve))
        .route("/notApprove/{temp_id}", put(handlers::not_approve))
        // Draft staging
        .route("/tempShop/shop/{shop_id}", put(handlers::submit_shop_draft))
        .route("/tempMenu/menu/{menu_id}", put(handlers::stage_menu_edit))
        .route(
            "/tempSocial/social/{social_id}",
            put(handlers::stage_social_edit),
        )
        // Delete bins
        .route("/binMenu/menu/{menu_id}", post(handlers::mark_menu))
        .route("/binPhoto/photo/{photo_id}", post(handlers::mark_photo))
        .route("/binSocial/social/{social_id}", post(handlers::mark_social))
        .route("/binMenu/temp/{temp_id}", delete(handlers::flush_menu_bin))
        .route("/binPhoto/temp/{temp_id}", delete(handlers::flush_photo_bin))
        .route("/binSocial/temp/{temp_id}", delete(handlers::flush_social_bin))
        // Uploads and photo lookups
        .route(
            "/photo/menu/{menu_id}",
            get(handlers::photos_of_menu)
                .post(upload::upload_menu_photo)
                .layer(upload_limit),
        )
        .route(
            "/photo/shop/{shop_id}",
            get(handlers::photos_of_shop)
                .post(upload::upload_shop_photo)
                .layer(upload_limit),
        )
        .route(
            "/photo/workshop/{workshop_id}",
            post(upload::upload_workshop_photo).layer(upload_limit),
        )
        // Views
        .route("/shop/{id}/detail", get(handlers::shop_detail))
        .route("/shop/{id}/available", get(handlers::shop_available))
        .route("/menu/shop/{shop_id}", get(handlers::menus_of_shop))
        .route("/social/shop/{shop_id}", get(handlers::socials_of_shop))
        .route(
            "/shopOpenDate/shop/{shop_id}",
            get(handlers::open_dates_of_shop),
        )
        .route(
            "/shops/category/{category_id}",
            get(handlers::shops_in_category),
        )
        .route("/map/detail", get(handlers::map_detail))
        .route("/search", get(handlers::search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_resource_is_registered() {
        let mut registry = EntityRegistry::new();
        register_resources(&mut registry);

        assert_eq!(registry.entity_types().len(), 19);
        assert_eq!(registry.path_of("shop_menu"), Some("/menu"));
        assert_eq!(registry.path_of("delete_photo"), Some("/binPhoto"));
        assert_eq!(registry.path_of("contact_to_admin"), Some("/contact"));
    }

    #[test]
    fn test_routes_do_not_conflict() {
        let mut registry = EntityRegistry::new();
        register_resources(&mut registry);

        let _app = registry.build_routes().merge(build_workflow_routes());
    }
}
