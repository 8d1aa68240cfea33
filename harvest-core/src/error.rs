//! Error types for the core operations.

use harvest_model::ModelError;
use harvest_store::StoreError;
use harvest_types::{MOBILE_DIGITS, Mobile, RecordId, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Malformed input rejected before any store write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("mobile number must have {MOBILE_DIGITS} digits, got {digits}")]
    InvalidMobile { digits: usize },

    #[error("required field missing: {0}")]
    MissingField(String),

    #[error("not a list index: {0:?}")]
    InvalidIndex(String),

    #[error("index {index} out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{value:?} is not an allowed value for {field}")]
    InvalidChoice { field: String, value: String },

    #[error("crop name must not be empty")]
    EmptyCropName,

    #[error("one-time code must be {expected} digits")]
    InvalidCode { expected: usize },

    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

/// Errors surfaced by core operations. None are retried internally.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("mobile already registered as {role} (record {existing_id})")]
    DuplicateRegistration { role: Role, existing_id: RecordId },

    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("{mobile} is not registered as {role}")]
    NotRegistered { role: Role, mobile: Mobile },

    #[error("one-time code rejected")]
    VerificationFailed,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("verification provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("invalid stored record: {0}")]
    InvalidRecord(#[from] ModelError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse classification for boundary layers deciding how to present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    DuplicateRegistration,
    NotFound,
    NotRegistered,
    VerificationFailed,
    StoreUnavailable,
    ProviderUnavailable,
    InvalidRecord,
    Cancelled,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::DuplicateRegistration { .. } => ErrorKind::DuplicateRegistration,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::NotRegistered { .. } => ErrorKind::NotRegistered,
            CoreError::VerificationFailed => ErrorKind::VerificationFailed,
            CoreError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            CoreError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            CoreError::InvalidRecord(_) => ErrorKind::InvalidRecord,
            CoreError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn not_found(role: Role, id: &RecordId) -> Self {
        CoreError::NotFound {
            collection: role.collection().to_string(),
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => CoreError::NotFound { collection, id },
            StoreError::Unavailable(msg) => CoreError::StoreUnavailable(msg),
            other => CoreError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<harvest_types::Error> for CoreError {
    fn from(err: harvest_types::Error) -> Self {
        let input = match err {
            harvest_types::Error::InvalidMobile { digits } => InputError::InvalidMobile { digits },
            harvest_types::Error::InvalidRecordId(id) => InputError::InvalidRecordId(id),
            harvest_types::Error::UnknownRole(name) => InputError::UnknownCollection(name),
        };
        CoreError::InvalidInput(input)
    }
}
