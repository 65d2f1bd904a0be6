//! Typed error handling for the marketplace backend
//!
//! Every handler and workflow returns [`MarketResult`]. Errors carry enough
//! structure for callers to match on them, and map onto the HTTP response
//! convention used across the API: a status code plus a JSON body of the
//! form `{"error": "...", "code": "...", "details": {...}}`.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a row lookup or write failed
//! - [`WorkflowError`]: the draft/approval pipeline refused a transition
//! - [`ValidationError`]: a request body failed validation
//! - [`RequestError`]: malformed path parameters, bodies or uploads
//! - [`ConfigError`]: configuration could not be loaded
//! - [`StorageError`]: the persistence gateway or file store failed
//!
//! # Example
//!
//! ```rust,ignore
//! let shop = tx
//!     .get::<Shop>(id)
//!     .await?
//!     .ok_or_else(|| EntityError::not_found::<Shop>(id))?;
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::record::Record;

/// The main error type for the marketplace backend
#[derive(Debug)]
pub enum MarketError {
    /// Entity-related errors (CRUD operations)
    Entity(EntityError),

    /// Draft/approval workflow errors
    Workflow(WorkflowError),

    /// Configuration errors
    Config(ConfigError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::Entity(e) => write!(f, "{}", e),
            MarketError::Workflow(e) => write!(f, "{}", e),
            MarketError::Config(e) => write!(f, "{}", e),
            MarketError::Validation(e) => write!(f, "{}", e),
            MarketError::Storage(e) => write!(f, "{}", e),
            MarketError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarketError::Entity(e) => Some(e),
            MarketError::Workflow(e) => Some(e),
            MarketError::Config(e) => Some(e),
            MarketError::Validation(e) => Some(e),
            MarketError::Storage(e) => Some(e),
            MarketError::Request(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl MarketError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Entity(e) => e.status_code(),
            MarketError::Workflow(e) => e.status_code(),
            MarketError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarketError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarketError::Request(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            MarketError::Entity(e) => e.error_code(),
            MarketError::Workflow(e) => e.error_code(),
            MarketError::Config(_) => "CONFIG_ERROR",
            MarketError::Validation(_) => "VALIDATION_ERROR",
            MarketError::Storage(e) => e.error_code(),
            MarketError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            MarketError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id,
                }))
            }
            MarketError::Workflow(WorkflowError::InvalidTransition { temp_id, from, to }) => {
                Some(serde_json::json!({
                    "temp_id": temp_id,
                    "from": from,
                    "to": to,
                }))
            }
            MarketError::Workflow(WorkflowError::MissingShopLink { temp_id }) => {
                Some(serde_json::json!({ "temp_id": temp_id }))
            }
            MarketError::Workflow(WorkflowError::ShopMissing { temp_id, shop_id }) => {
                Some(serde_json::json!({
                    "temp_id": temp_id,
                    "shop_id": shop_id,
                }))
            }
            MarketError::Entity(EntityError::NoneMatching {
                entity_type,
                field,
                value,
            }) => Some(serde_json::json!({
                "entity_type": entity_type,
                field.clone(): value,
            })),
            MarketError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            MarketError::Storage(StorageError::FileError { path, .. }) => {
                Some(serde_json::json!({ "path": path }))
            }
            MarketError::Storage(e) => Some(serde_json::json!(e.to_string())),
            _ => None,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "request failed: {}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug)]
pub enum EntityError {
    /// No row of this type matched the given id
    NotFound { entity_type: String, id: i64 },

    /// No row of this type has `field = value`
    NoneMatching {
        entity_type: String,
        field: String,
        value: i64,
    },

    /// A row with this id already exists
    AlreadyExists { entity_type: String, id: i64 },
}

impl EntityError {
    /// Shorthand for a missing row of record type `T`
    pub fn not_found<T: Record>(id: i64) -> Self {
        EntityError::NotFound {
            entity_type: T::KIND.to_string(),
            id,
        }
    }

    /// Shorthand for a failed lookup of `T` by a foreign key
    pub fn none_matching<T: Record>(field: &str, value: i64) -> Self {
        EntityError::NoneMatching {
            entity_type: T::KIND.to_string(),
            field: field.to_string(),
            value,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::NoneMatching { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::NoneMatching { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::NoneMatching {
                entity_type,
                field,
                value,
            } => write!(f, "No {} with {} = {}", entity_type, field, value),
            EntityError::AlreadyExists { entity_type, id } => {
                write!(f, "{} with id '{}' already exists", entity_type, id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl From<EntityError> for MarketError {
    fn from(err: EntityError) -> Self {
        MarketError::Entity(err)
    }
}

// =============================================================================
// Workflow Errors
// =============================================================================

/// Errors raised by the draft/approval pipeline
#[derive(Debug)]
pub enum WorkflowError {
    /// The temp shop is not in a status that allows the requested change
    InvalidTransition { temp_id: i64, from: String, to: String },

    /// The temp shop has no live shop attached yet
    MissingShopLink { temp_id: i64 },

    /// The temp shop points at a shop that no longer exists
    ShopMissing { temp_id: i64, shop_id: i64 },

    /// The row is not attached to any shop, so no draft can own the change
    NoDraft { entity_type: String, id: i64 },
}

impl WorkflowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
            WorkflowError::MissingShopLink { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::ShopMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::NoDraft { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            WorkflowError::MissingShopLink { .. } => "MISSING_SHOP_LINK",
            WorkflowError::ShopMissing { .. } => "SHOP_MISSING",
            WorkflowError::NoDraft { .. } => "NO_DRAFT",
        }
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::InvalidTransition { temp_id, from, to } => write!(
                f,
                "Temp shop {} cannot move from {} to {}",
                temp_id, from, to
            ),
            WorkflowError::MissingShopLink { temp_id } => {
                write!(f, "Temp shop {} has no associated shop", temp_id)
            }
            WorkflowError::ShopMissing { temp_id, shop_id } => write!(
                f,
                "Shop {} referenced by temp shop {} not found",
                shop_id, temp_id
            ),
            WorkflowError::NoDraft { entity_type, id } => {
                write!(f, "{} {} is not attached to a shop draft", entity_type, id)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<WorkflowError> for MarketError {
    fn from(err: WorkflowError) -> Self {
        MarketError::Workflow(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => write!(
                f,
                "Invalid value '{}' for field '{}': {}",
                value, field, message
            ),
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for MarketError {
    fn from(err: ConfigError) -> Self {
        MarketError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Missing or empty query argument
    MissingArgument { argument: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
            ValidationError::MissingArgument { argument } => {
                write!(f, "Missing required argument: {}", argument)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for MarketError {
    fn from(err: ValidationError) -> Self {
        MarketError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for MarketError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        MarketError::Validation(ValidationError::FieldErrors(fields))
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Query execution error
    QueryError { message: String },

    /// Transaction error
    TransactionError { message: String },

    /// File store error
    FileError { path: String, message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::QueryError { .. } => "STORAGE_ERROR",
            StorageError::TransactionError { .. } => "TRANSACTION_ERROR",
            StorageError::FileError { .. } => "FILE_ERROR",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryError { message } => write!(f, "Storage error: {}", message),
            StorageError::TransactionError { message } => {
                write!(f, "Transaction error: {}", message)
            }
            StorageError::FileError { path, message } => {
                write!(f, "File error on '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for MarketError {
    fn from(err: StorageError) -> Self {
        MarketError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Invalid entity ID format
    InvalidEntityId { id: String },

    /// Invalid request body
    InvalidBody { message: String },

    /// A required multipart field was absent
    MissingField { field: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingField { .. } => "MISSING_FIELD",
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidEntityId { id } => write!(f, "Invalid entity ID format: '{}'", id),
            RequestError::InvalidBody { message } => write!(f, "Invalid request body: {}", message),
            RequestError::MissingField { field } => {
                write!(f, "Missing required form field: {}", field)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<RequestError> for MarketError {
    fn from(err: RequestError) -> Self {
        MarketError::Request(err)
    }
}

// =============================================================================
// Conversions from external error types
// =============================================================================

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        MarketError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for MarketError {
    fn from(err: serde_yaml::Error) -> Self {
        MarketError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for MarketError {
    fn from(err: anyhow::Error) -> Self {
        // Gateway and file store failures arrive as anyhow errors
        MarketError::Storage(StorageError::QueryError {
            message: format!("{:#}", err),
        })
    }
}

/// Result type alias for marketplace operations
pub type MarketResult<T> = Result<T, MarketError>;
