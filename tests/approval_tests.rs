//! Approval workflow against the in-memory store
//!
//! Each test seeds a shop aggregate plus a draft, runs `approve` or
//! `not_approve` in one transaction and checks the committed state.

mod support;

use market::core::{FileSweep, Filter};
use market::entities::{
    DeleteMenu, DeletePhoto, DeleteSocial, OpenDateOperation, Photo, Shop, ShopMenu, ShopOpenDate,
    SocialMedia, TempMenu, TempShop, TempShopOpenDate, TempShopStatus,
};
use market::workflows::{MenuEdit, approve, drafts, not_approve};
use support::*;

#[tokio::test]
async fn test_approve_applies_menu_bin_and_added_open_date() {
    let h = Harness::new().await;
    h.write_upload("menu42.png").await;

    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Waiting)).await.unwrap();
    tx.create(menu(42, 10, "Boat noodles")).await.unwrap();
    tx.create(menu_photo(100, 42, "menu42.png")).await.unwrap();
    tx.create(menu_bin(5, 42)).await.unwrap();
    tx.create(staged(OpenDateOperation::Add, 5, 10, 3, at(9, 0), at(17, 0)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let mut sweep = FileSweep::new();
    let approved = approve(&mut tx, 5, &mut sweep).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(h.sweep(sweep).await, 1);

    assert_eq!(approved.id, 5);
    assert_eq!(approved.status, TempShopStatus::Approve);

    let mut tx = h.tx().await;
    assert!(tx.get::<ShopMenu>(42).await.unwrap().is_none());
    let photos: Vec<Photo> = tx.find(Filter::new().eq("menu_id", 42)).await.unwrap();
    assert!(photos.is_empty());
    assert!(!h.upload_exists("menu42.png"));

    let hours: Vec<ShopOpenDate> = tx
        .find(
            Filter::new()
                .eq("shop_id", 10)
                .eq("market_open_date_id", 3),
        )
        .await
        .unwrap();
    assert_eq!(hours.len(), 1);
    assert_eq!(hours[0].start_time, at(9, 0));
    assert_eq!(hours[0].end_time, at(17, 0));

    let stored = tx.get::<TempShop>(5).await.unwrap().unwrap();
    assert_eq!(stored.status, TempShopStatus::Approve);
}

#[tokio::test]
async fn test_approve_applies_every_staged_change() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;

    tx.create(shop(10, "Old name", 1)).await.unwrap();
    let mut pending = draft(5, 10, TempShopStatus::Waiting);
    pending.name = "New name".to_string();
    pending.description = "Fresh description".to_string();
    pending.shop_category_id = Some(4);
    tx.create(pending).await.unwrap();

    // Live rows to delete through the bins
    tx.create(menu(1, 10, "Retired dish")).await.unwrap();
    tx.create(shop_photo(11, 10, "old.png")).await.unwrap();
    tx.create(social(21, 10, "line")).await.unwrap();
    tx.create(menu_bin(5, 1)).await.unwrap();
    tx.create(photo_bin(5, 11)).await.unwrap();
    tx.create(social_bin(5, 21)).await.unwrap();

    // Rows created under the draft and still hidden
    tx.create(hidden_menu(2, 10, 5)).await.unwrap();
    tx.create(Photo {
        is_public: false,
        temp_id: Some(5),
        ..shop_photo(12, 10, "new.png")
    })
    .await
    .unwrap();
    tx.create(SocialMedia {
        is_public: false,
        temp_id: Some(5),
        ..social(22, 10, "facebook")
    })
    .await
    .unwrap();

    // Open hours: add for 3, edit for 4, delete for 5
    tx.create(open_date(31, 10, 4, at(8, 0), at(12, 0))).await.unwrap();
    tx.create(open_date(32, 10, 5, at(8, 0), at(12, 0))).await.unwrap();
    tx.create(staged(OpenDateOperation::Add, 5, 10, 3, at(9, 0), at(17, 0)))
        .await
        .unwrap();
    tx.create(staged(OpenDateOperation::Edit, 5, 10, 4, at(10, 0), at(18, 0)))
        .await
        .unwrap();
    tx.create(staged(OpenDateOperation::Delete, 5, 10, 5, at(0, 0), at(0, 0)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let mut sweep = FileSweep::new();
    approve(&mut tx, 5, &mut sweep).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(sweep.paths(), ["old.png".to_string()]);

    let mut tx = h.tx().await;
    let live = tx.get::<Shop>(10).await.unwrap().unwrap();
    assert_eq!(live.name, "New name");
    assert_eq!(live.description, "Fresh description");
    assert_eq!(live.shop_category_id, 4);

    // Binned rows are gone
    assert!(tx.get::<ShopMenu>(1).await.unwrap().is_none());
    assert!(tx.get::<Photo>(11).await.unwrap().is_none());
    assert!(tx.get::<SocialMedia>(21).await.unwrap().is_none());

    // Everything left under the draft is public
    let menus: Vec<ShopMenu> = tx.find(Filter::new().eq("shop_id", 10)).await.unwrap();
    assert_eq!(menus.len(), 1);
    assert!(menus.iter().all(|m| m.is_public));
    let photos: Vec<Photo> = tx.find(Filter::new().eq("shop_id", 10)).await.unwrap();
    assert_eq!(photos.len(), 1);
    assert!(photos.iter().all(|p| p.is_public));
    let socials: Vec<SocialMedia> = tx.find(Filter::new().eq("shop_id", 10)).await.unwrap();
    assert_eq!(socials.len(), 1);
    assert!(socials.iter().all(|s| s.is_public));

    // Open hours reflect exactly the staged operations
    let mut hours: Vec<ShopOpenDate> = tx.find(Filter::new().eq("shop_id", 10)).await.unwrap();
    hours.sort_by_key(|h| h.market_open_date_id);
    let summary: Vec<_> = hours
        .iter()
        .map(|h| (h.market_open_date_id, h.start_time, h.end_time))
        .collect();
    assert_eq!(
        summary,
        vec![(3, at(9, 0), at(17, 0)), (4, at(10, 0), at(18, 0))]
    );

    // Consumed staging rows are cleaned up
    let bins: Vec<DeleteMenu> = tx.find(Filter::new().eq("temp_id", 5)).await.unwrap();
    assert!(bins.is_empty());
    let bins: Vec<DeletePhoto> = tx.find(Filter::new().eq("temp_id", 5)).await.unwrap();
    assert!(bins.is_empty());
    let bins: Vec<DeleteSocial> = tx.find(Filter::new().eq("temp_id", 5)).await.unwrap();
    assert!(bins.is_empty());
    let staged_rows: Vec<TempShopOpenDate> =
        tx.find(Filter::new().eq("temp_id", 5)).await.unwrap();
    assert!(staged_rows.is_empty());
}

#[tokio::test]
async fn test_open_date_edit_matches_by_shop_and_market_date() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Waiting)).await.unwrap();
    tx.create(open_date(1, 10, 3, at(9, 0), at(17, 0))).await.unwrap();
    tx.create(open_date(2, 10, 4, at(9, 0), at(17, 0))).await.unwrap();
    tx.create(staged(OpenDateOperation::Edit, 5, 10, 4, at(12, 0), at(20, 0)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    approve(&mut tx, 5, &mut FileSweep::new()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let untouched = tx.get::<ShopOpenDate>(1).await.unwrap().unwrap();
    assert_eq!((untouched.start_time, untouched.end_time), (at(9, 0), at(17, 0)));
    let edited = tx.get::<ShopOpenDate>(2).await.unwrap().unwrap();
    assert_eq!((edited.start_time, edited.end_time), (at(12, 0), at(20, 0)));
}

#[tokio::test]
async fn test_unmatched_open_date_operations_are_skipped() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Waiting)).await.unwrap();
    tx.create(staged(OpenDateOperation::Edit, 5, 10, 8, at(9, 0), at(10, 0)))
        .await
        .unwrap();
    tx.create(staged(OpenDateOperation::Delete, 5, 10, 9, at(9, 0), at(10, 0)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let approved = approve(&mut tx, 5, &mut FileSweep::new()).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(approved.status, TempShopStatus::Approve);

    let mut tx = h.tx().await;
    let hours: Vec<ShopOpenDate> = tx.list().await.unwrap();
    assert!(hours.is_empty());
}

#[tokio::test]
async fn test_second_approval_does_not_replay_staged_rows() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Waiting)).await.unwrap();
    tx.create(staged(OpenDateOperation::Add, 5, 10, 3, at(9, 0), at(17, 0)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    for _ in 0..2 {
        let mut tx = h.tx().await;
        approve(&mut tx, 5, &mut FileSweep::new()).await.unwrap();
        tx.commit().await.unwrap();
    }

    assert_eq!(h.store.count("shop_open_date").await, 1);
}

#[tokio::test]
async fn test_approve_applies_menu_mirror() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Approve)).await.unwrap();
    tx.create(menu(42, 10, "Boat noodles")).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let edit = MenuEdit {
        product_name: "Boat noodles (large)".to_string(),
        product_description: "Extra pork".to_string(),
        price: 60.0,
    };
    drafts::stage_menu_edit(&mut tx, 42, edit).await.unwrap();
    tx.commit().await.unwrap();

    // Staging alone leaves the live menu untouched
    let mut tx = h.tx().await;
    let live = tx.get::<ShopMenu>(42).await.unwrap().unwrap();
    assert_eq!(live.product_name, "Boat noodles");
    approve(&mut tx, 5, &mut FileSweep::new()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let live = tx.get::<ShopMenu>(42).await.unwrap().unwrap();
    assert_eq!(live.product_name, "Boat noodles (large)");
    assert_eq!(live.price, 60.0);
    let mirrors: Vec<TempMenu> = tx.find(Filter::new().eq("menu_id", 42)).await.unwrap();
    assert_eq!(mirrors.len(), 1);
}

#[tokio::test]
async fn test_failed_approval_leaves_nothing_behind() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    // Draft points at a shop that does not exist
    tx.create(draft(5, 99, TempShopStatus::Waiting)).await.unwrap();
    tx.create(menu(42, 10, "Boat noodles")).await.unwrap();
    tx.create(menu_bin(5, 42)).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let err = approve(&mut tx, 5, &mut FileSweep::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "SHOP_MISSING");
    drop(tx);

    let mut tx = h.tx().await;
    let stored = tx.get::<TempShop>(5).await.unwrap().unwrap();
    assert_eq!(stored.status, TempShopStatus::Waiting);
    assert!(tx.get::<ShopMenu>(42).await.unwrap().is_some());
    drop(tx);
    assert_eq!(h.store.count("delete_menu").await, 1);
}

#[tokio::test]
async fn test_approve_without_shop_link_fails() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(TempShop {
        shop_id: None,
        ..draft(5, 0, TempShopStatus::Waiting)
    })
    .await
    .unwrap();

    let err = approve(&mut tx, 5, &mut FileSweep::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_SHOP_LINK");
}

#[tokio::test]
async fn test_approve_unknown_draft_is_not_found() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    let err = approve(&mut tx, 404, &mut FileSweep::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_not_approve_twice_fails_cleanly() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::Waiting)).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = h.tx().await;
    let rejected = not_approve(&mut tx, 5).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(rejected.status, TempShopStatus::NotApprove);

    let mut tx = h.tx().await;
    let err = not_approve(&mut tx, 5).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    drop(tx);

    let mut tx = h.tx().await;
    let stored = tx.get::<TempShop>(5).await.unwrap().unwrap();
    assert_eq!(stored.status, TempShopStatus::NotApprove);
}

#[tokio::test]
async fn test_rejected_draft_can_still_be_approved() {
    let h = Harness::new().await;
    let mut tx = h.tx().await;
    tx.create(shop(10, "Noodle Bar", 1)).await.unwrap();
    tx.create(draft(5, 10, TempShopStatus::NotApprove)).await.unwrap();

    let approved = approve(&mut tx, 5, &mut FileSweep::new()).await.unwrap();
    assert_eq!(approved.status, TempShopStatus::Approve);

    let err = not_approve(&mut tx, 5).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
}
