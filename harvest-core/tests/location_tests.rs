use async_trait::async_trait;
use harvest_core::{
    Coordinates, LocationError, LocationProvider, PERMISSION_DENIED, format_coordinates,
    location_field,
};

struct FixedProvider(Result<Coordinates, LocationError>);

#[async_trait]
impl LocationProvider for FixedProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.clone()
    }
}

#[test]
fn coordinates_format() {
    let coords = Coordinates {
        latitude: 18.52,
        longitude: 73.85,
    };
    assert_eq!(format_coordinates(&coords), "Lat: 18.52, Lng: 73.85");

    let negative = Coordinates {
        latitude: -33.5,
        longitude: 0.0,
    };
    assert_eq!(format_coordinates(&negative), "Lat: -33.5, Lng: 0");
}

#[tokio::test]
async fn position_becomes_location_field() {
    let provider = FixedProvider(Ok(Coordinates {
        latitude: 19.07,
        longitude: 72.87,
    }));
    assert_eq!(
        location_field(&provider).await.unwrap(),
        "Lat: 19.07, Lng: 72.87"
    );
}

#[tokio::test]
async fn denied_permission_is_recorded() {
    let provider = FixedProvider(Err(LocationError::PermissionDenied));
    assert_eq!(location_field(&provider).await.unwrap(), PERMISSION_DENIED);
    assert_eq!(PERMISSION_DENIED, "Permission denied");
}

#[tokio::test]
async fn unavailable_position_propagates() {
    let provider = FixedProvider(Err(LocationError::Unavailable("no fix".into())));
    assert_eq!(
        location_field(&provider).await.unwrap_err(),
        LocationError::Unavailable("no fix".into())
    );
}
