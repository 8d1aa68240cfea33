//! Core type definitions for HarvestHub.
//!
//! This crate defines the small, storage-agnostic types shared by every
//! other crate in the workspace:
//! - Store-assigned record identifiers
//! - Canonical 10-digit mobile numbers
//! - The farmer/trader role split
//! - Millisecond creation timestamps
//!
//! Crop lists and person records live in `harvest-model`, not here.

mod ids;
mod mobile;
mod role;
mod timestamp;

pub use ids::RecordId;
pub use mobile::{MOBILE_DIGITS, Mobile};
pub use role::Role;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid mobile number: expected {MOBILE_DIGITS} digits, got {digits}")]
    InvalidMobile { digits: usize },

    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
