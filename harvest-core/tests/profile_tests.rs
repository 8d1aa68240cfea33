mod common;

use common::*;
use harvest_core::{CoreError, ErrorKind, InputError, LocationError, ProfileEditor};
use harvest_store::DocumentStore;
use harvest_types::{RecordId, Role};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[tokio::test]
async fn updates_plain_fields_and_coerces_numbers() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!(["Rice"])).await;

    let written = ProfileEditor::new(store.clone())
        .update_profile(
            &id,
            Role::Farmer,
            fields(json!({"district": "Satara", "age": "37.9", "pincode": ""})),
        )
        .await
        .unwrap();
    assert_eq!(written.len(), 3);

    let doc = store.get_record("farmers", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/district"), Some("Satara"));
    assert_eq!(doc.get("age"), Some(&json!(37)));
    assert_eq!(doc.get("pincode"), Some(&Value::Null));
    assert_eq!(doc.get_str("/name"), Some("Asha"));
}

#[tokio::test]
async fn managed_fields_are_ignored() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!(["Rice"])).await;

    let written = ProfileEditor::new(store.clone())
        .update_profile(
            &id,
            Role::Farmer,
            fields(json!({
                "mobile": "9000000000",
                "crops": [],
                "cropNames": [],
                "createdAt": 0,
                "id": "other",
                "location": "Lat: 18.52, Lng: 73.85"
            })),
        )
        .await
        .unwrap();
    assert_eq!(written, vec!["location".to_string()]);

    let doc = store.get_record("farmers", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/mobile"), Some(FARMER_MOBILE));
    assert_eq!(doc.get("cropNames"), Some(&json!(["Rice"])));
    assert_eq!(doc.get_str("/location"), Some("Lat: 18.52, Lng: 73.85"));
}

#[tokio::test]
async fn trader_stock_and_listing_are_managed() {
    let store = memory_store();
    let id = register_trader(&store, TRADER_MOBILE, "Pune", json!(["Onion"])).await;

    let written = ProfileEditor::new(store.clone())
        .update_profile(
            &id,
            Role::Trader,
            fields(json!({"stock": [], "cropsSold": [], "traderType": "Retailer"})),
        )
        .await
        .unwrap();
    assert_eq!(written, vec!["traderType".to_string()]);
}

#[tokio::test]
async fn blanking_a_required_field_fails() {
    let store = memory_store();
    let id = register_trader(&store, TRADER_MOBILE, "Pune", json!([])).await;

    let err = ProfileEditor::new(store.clone())
        .update_profile(&id, Role::Trader, fields(json!({"fullName": " "})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidInput(InputError::MissingField(ref f)) if f == "fullName"
    ));
    let doc = store.get_record("traders", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/fullName"), Some("Ravi"));
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let store = memory_store();
    let err = ProfileEditor::new(store.clone())
        .update_profile(
            &RecordId::parse("ghost").unwrap(),
            Role::Farmer,
            fields(json!({"district": "Pune"})),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn empty_patch_writes_nothing() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!([])).await;
    let written = ProfileEditor::new(store.clone())
        .update_profile(&id, Role::Farmer, fields(json!({"mobile": "9000000000"})))
        .await
        .unwrap();
    assert!(written.is_empty());
}

#[tokio::test]
async fn land_size_must_be_an_offered_option() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!([])).await;
    let editor = ProfileEditor::new(store.clone());

    let err = editor
        .update_profile(&id, Role::Farmer, fields(json!({"landSize": "lots", "district": "Satara"})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidInput(InputError::InvalidChoice { ref field, .. }) if field == "landSize"
    ));
    let doc = store.get_record("farmers", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/district"), Some("Pune"));

    editor
        .update_profile(&id, Role::Farmer, fields(json!({"landSize": "11-15 acres"})))
        .await
        .unwrap();
    let doc = store.get_record("farmers", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/landSize"), Some("11-15 acres"));
}

// ── Location ─────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_location_stores_provider_position() {
    let store = memory_store();
    let id = register_trader(&store, TRADER_MOBILE, "Pune", json!([])).await;
    let editor = ProfileEditor::new(store.clone()).with_location(FixedLocation::at(19.07, 72.87));

    let stored = editor.refresh_location(&id, Role::Trader).await.unwrap();
    assert_eq!(stored, "Lat: 19.07, Lng: 72.87");
    let doc = store.get_record("traders", &id).await.unwrap().unwrap();
    assert_eq!(doc.get_str("/location"), Some("Lat: 19.07, Lng: 72.87"));
}

#[tokio::test]
async fn refresh_location_records_denial() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!([])).await;
    let editor = ProfileEditor::new(store.clone())
        .with_location(FixedLocation::failing(LocationError::PermissionDenied));

    assert_eq!(
        editor.refresh_location(&id, Role::Farmer).await.unwrap(),
        "Permission denied"
    );
}

#[tokio::test]
async fn refresh_location_without_a_fix_fails() {
    let store = memory_store();
    let id = register_farmer(&store, FARMER_MOBILE, "Pune", json!([])).await;

    let err = ProfileEditor::new(store.clone())
        .refresh_location(&id, Role::Farmer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);

    let err = ProfileEditor::new(store.clone())
        .with_location(FixedLocation::failing(LocationError::Unavailable("no fix".into())))
        .refresh_location(&id, Role::Farmer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    let doc = store.get_record("farmers", &id).await.unwrap().unwrap();
    assert_eq!(doc.get("location"), None);
}

#[tokio::test]
async fn refresh_location_of_missing_record_is_not_found() {
    let store = memory_store();
    let err = ProfileEditor::new(store.clone())
        .with_location(FixedLocation::at(1.0, 2.0))
        .refresh_location(&RecordId::parse("ghost").unwrap(), Role::Farmer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
