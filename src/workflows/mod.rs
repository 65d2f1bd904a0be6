//! Multi-row workflows over the persistence gateway
//!
//! Every function takes the caller's `&mut Tx`; the HTTP layer owns the
//! transaction boundary and commits once per request.

pub mod approval;
pub mod cascade;
pub mod drafts;
pub mod views;

pub use approval::{ApprovalSummary, approve, not_approve};
pub use cascade::{
    delete_entrepreneur, delete_menu, delete_photo, delete_shop, delete_social, delete_workshop,
    discard_draft, flush_menu_bin, flush_photo_bin, flush_social_bin,
};
pub use drafts::{MenuEdit, PhotoTarget, ShopDraft, SocialEdit};
pub use views::{SearchHit, ShopDetail, Visibility, WorkshopDetail};
