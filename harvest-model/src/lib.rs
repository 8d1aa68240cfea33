//! Record model for HarvestHub.
//!
//! Defines the shapes every other crate agrees on:
//! - [`CropEntry`]: the canonical `{name, qty}` crop/stock line
//! - [`RawCropEntry`] and [`normalize`]: ingestion of legacy and current
//!   stored crop lists
//! - [`Document`]: a record as the document store returns it
//! - [`PersonRecord`]: a farmer or trader rendered into canonical form
//! - [`CollectionSchema`]: per-role collection and field names
//!
//! Nothing here talks to a store; everything is pure data handling.

mod crop;
mod document;
mod record;
mod schema;

pub use crop::{
    CropEntry, RawCropEntry, coerce_qty, crop_names, entries_to_value, normalize,
    normalize_entries, parse_quantity,
};
pub use document::Document;
pub use record::PersonRecord;
pub use schema::{
    CREATED_AT_FIELD, CROP_NAMES_FIELD, CollectionSchema, DISTRICT_FIELD, LAND_SIZE_FIELD,
    LOCATION_FIELD, MOBILE_FIELD, coerce_integer, is_blank, land_size_options,
};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while rendering stored documents into records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("document belongs to collection {found}, expected {expected}")]
    CollectionMismatch { expected: String, found: String },

    #[error(transparent)]
    Types(#[from] harvest_types::Error),
}
