//! Shared test helpers for core tests.

#![allow(dead_code)]

use async_trait::async_trait;
use harvest_core::{Coordinates, LocationError, LocationProvider, RegistrationGuard};
use harvest_model::Document;
use harvest_store::{DocumentStore, MemoryStore, StoreResult};
use harvest_types::{RecordId, Role};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::sync::Notify;

pub const FARMER_MOBILE: &str = "9876543210";
pub const TRADER_MOBILE: &str = "9123456780";

/// Unwraps a JSON object literal into a field map.
pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn farmer_form(name: &str, district: &str, crops: Value) -> Map<String, Value> {
    fields(json!({
        "name": name,
        "bankAccount": "000111222333",
        "district": district,
        "crops": crops,
    }))
}

pub fn trader_form(name: &str, district: &str, crops_sold: Value) -> Map<String, Value> {
    fields(json!({
        "fullName": name,
        "shopName": format!("{name} Traders"),
        "district": district,
        "cropsSold": crops_sold,
    }))
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Registers a farmer and returns its id.
pub async fn register_farmer(
    store: &Arc<MemoryStore>,
    mobile: &str,
    district: &str,
    crops: Value,
) -> RecordId {
    RegistrationGuard::new(store.clone())
        .register(mobile, Role::Farmer, farmer_form("Asha", district, crops))
        .await
        .unwrap()
}

/// Registers a trader and returns its id.
pub async fn register_trader(
    store: &Arc<MemoryStore>,
    mobile: &str,
    district: &str,
    crops_sold: Value,
) -> RecordId {
    RegistrationGuard::new(store.clone())
        .register(mobile, Role::Trader, trader_form("Ravi", district, crops_sold))
        .await
        .unwrap()
}

/// Distinct valid mobiles for bulk seeding.
pub fn mobile(n: u32) -> String {
    format!("98{:08}", n)
}

/// Location provider answering every request with the same result.
pub struct FixedLocation(pub Result<Coordinates, LocationError>);

impl FixedLocation {
    pub fn at(latitude: f64, longitude: f64) -> Arc<Self> {
        Arc::new(Self(Ok(Coordinates {
            latitude,
            longitude,
        })))
    }

    pub fn failing(err: LocationError) -> Arc<Self> {
        Arc::new(Self(Err(err)))
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.clone()
    }
}

/// A store whose calls never complete. `entered` is notified each time a
/// call starts waiting.
#[derive(Default)]
pub struct StalledStore {
    pub entered: Notify,
}

impl StalledStore {
    async fn stall<T>(&self) -> T {
        self.entered.notify_one();
        std::future::pending().await
    }
}

#[async_trait]
impl DocumentStore for StalledStore {
    async fn create_record(&self, _: &str, _: Map<String, Value>) -> StoreResult<RecordId> {
        self.stall().await
    }

    async fn get_record(&self, _: &str, _: &RecordId) -> StoreResult<Option<Document>> {
        self.stall().await
    }

    async fn query_equals(&self, _: &str, _: &str, _: &Value) -> StoreResult<Vec<Document>> {
        self.stall().await
    }

    async fn query_array_contains(
        &self,
        _: &str,
        _: &str,
        _: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.stall().await
    }

    async fn query_array_contains_any(
        &self,
        _: &str,
        _: &[&str],
        _: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.stall().await
    }

    async fn update_record(&self, _: &str, _: &RecordId, _: Map<String, Value>) -> StoreResult<()> {
        self.stall().await
    }
}
