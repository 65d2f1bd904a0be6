//! Core module containing the error model, the persistence gateway and
//! the request extractors shared by every handler

pub mod error;
pub mod extractors;
pub mod files;
pub mod record;
pub mod store;

pub use error::{
    EntityError, ErrorResponse, MarketError, MarketResult, RequestError, StorageError,
    ValidationError, WorkflowError,
};
pub use extractors::{IdParam, Validated};
pub use files::{FileStore, FileSweep};
pub use record::Record;
pub use store::{Filter, Store, StoreTx, Tx};
