//! Device position as the stored `location` field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stored value when the user refuses location access.
pub const PERMISSION_DENIED: &str = "Permission denied";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Formats coordinates as `Lat: <lat>, Lng: <lng>`.
pub fn format_coordinates(coords: &Coordinates) -> String {
    format!("Lat: {}, Lng: {}", coords.latitude, coords.longitude)
}

/// The value to store under `location`.
///
/// A denied permission is recorded as [`PERMISSION_DENIED`] rather than
/// failing; an unavailable position is returned as an error.
pub async fn location_field(provider: &dyn LocationProvider) -> Result<String, LocationError> {
    match provider.current_position().await {
        Ok(coords) => Ok(format_coordinates(&coords)),
        Err(LocationError::PermissionDenied) => Ok(PERMISSION_DENIED.to_string()),
        Err(e) => Err(e),
    }
}
