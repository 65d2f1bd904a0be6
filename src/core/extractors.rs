//! Axum extractors for record ids and validated bodies
//!
//! Rejections are [`MarketError`]s, so a malformed id or body produces the
//! same `{"error", "code", "details"}` payload as every other failure.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::{MarketError, RequestError, ValidationError};

/// Single integer path parameter (`/shop/{id}`, `/menu/shop/{shop_id}`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub i64);

impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.body_text(),
            })?;

        parse_id(&raw).map(IdParam)
    }
}

/// Parse a positive integer id
pub fn parse_id(raw: &str) -> Result<i64, MarketError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RequestError::InvalidEntityId {
            id: raw.to_string(),
        }
        .into()),
    }
}

/// JSON body that has passed `validator` checks
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_shop(
///     State(state): State<AppState>,
///     Validated(shop): Validated<Shop>,
/// ) -> MarketResult<impl IntoResponse> {
///     // shop is deserialized and validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = MarketError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            MarketError::Validation(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;

        value.validate()?;
        Ok(Validated(value))
    }
}
