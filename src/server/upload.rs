//! Multipart photo uploads
//!
//! The form carries the image in an `image` field and may name a
//! `photo_category`. `?public=true` publishes the photo immediately;
//! otherwise it stays hidden until its draft is approved.

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::core::error::{MarketResult, RequestError, StorageError};
use crate::core::extractors::IdParam;
use crate::entities::Photo;
use crate::server::state::AppState;
use crate::workflows::{PhotoTarget, drafts};

/// Upper bound on an uploaded image
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub public: bool,
}

/// Parsed upload form
#[derive(Debug)]
struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    photo_category: String,
}

async fn read_form(mut multipart: Multipart) -> MarketResult<UploadForm> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut photo_category = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::InvalidBody {
            message: format!("Invalid multipart request: {}", e),
        })?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| RequestError::InvalidBody {
                    message: format!("Multipart error: {}", e),
                })?;
                image = Some((file_name, bytes.to_vec()));
            }
            "photo_category" => {
                photo_category = field.text().await.map_err(|e| RequestError::InvalidBody {
                    message: format!("Multipart error: {}", e),
                })?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) = image.ok_or_else(|| RequestError::MissingField {
        field: "image".to_string(),
    })?;
    if bytes.is_empty() {
        return Err(RequestError::InvalidBody {
            message: "Empty file provided".to_string(),
        }
        .into());
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(RequestError::InvalidBody {
            message: format!("File too large. Maximum size is {} bytes", MAX_UPLOAD_BYTES),
        }
        .into());
    }

    Ok(UploadForm {
        file_name,
        bytes,
        photo_category,
    })
}

/// Check the target, store the file, then insert the row
///
/// The file store never reuses a taken name, so the file discarded after a
/// failed insert or commit is always the one this request wrote.
async fn upload(
    state: &AppState,
    target: PhotoTarget,
    params: UploadParams,
    multipart: Multipart,
) -> MarketResult<(StatusCode, Json<Photo>)> {
    let form = read_form(multipart).await?;
    let mut tx = state.begin().await?;
    let mut photo =
        drafts::photo_for(&mut tx, target, form.photo_category, params.public).await?;

    let stored = state
        .files
        .save(&form.file_name, &form.bytes)
        .await
        .map_err(|e| StorageError::FileError {
            path: form.file_name.clone(),
            message: format!("{:#}", e),
        })?;
    photo.path_file = stored.clone();

    let photo = match tx.create(photo).await {
        Ok(photo) => photo,
        Err(e) => {
            drop(tx);
            discard(state, &stored).await;
            return Err(e.into());
        }
    };
    if let Err(e) = tx.commit().await {
        discard(state, &stored).await;
        return Err(e);
    }

    tracing::info!(
        photo_id = photo.id,
        file = %stored,
        size = form.bytes.len(),
        ?target,
        "photo uploaded"
    );
    Ok((StatusCode::CREATED, Json(photo)))
}

async fn discard(state: &AppState, stored: &str) {
    if let Err(e) = state.files.remove(stored).await {
        tracing::warn!(file = %stored, "failed to discard upload: {:#}", e);
    }
}

/// POST /photo/menu/{menu_id}
pub async fn upload_menu_photo(
    State(state): State<AppState>,
    IdParam(menu_id): IdParam,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> MarketResult<(StatusCode, Json<Photo>)> {
    upload(&state, PhotoTarget::Menu(menu_id), params, multipart).await
}

/// POST /photo/shop/{shop_id}
pub async fn upload_shop_photo(
    State(state): State<AppState>,
    IdParam(shop_id): IdParam,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> MarketResult<(StatusCode, Json<Photo>)> {
    upload(&state, PhotoTarget::Shop(shop_id), params, multipart).await
}

/// POST /photo/workshop/{workshop_id}
pub async fn upload_workshop_photo(
    State(state): State<AppState>,
    IdParam(workshop_id): IdParam,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> MarketResult<(StatusCode, Json<Photo>)> {
    upload(&state, PhotoTarget::Workshop(workshop_id), params, multipart).await
}
