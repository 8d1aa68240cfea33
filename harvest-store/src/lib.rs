//! Document-store layer for HarvestHub.
//!
//! The core never talks to a concrete backend. It is handed an
//! `Arc<dyn DocumentStore>` and only uses the operations below, which map
//! one-to-one onto what a hosted document database offers:
//!
//! - create a record and receive its store-assigned id
//! - fetch one record by id
//! - equality queries on a field, optionally bounded
//! - array-contains queries on a field, or on any of several fields
//! - partial (top-level field) updates
//!
//! [`MemoryStore`] implements the trait in process. It backs the tests and
//! the development server, and can be switched offline to exercise
//! `Unavailable` paths.

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use async_trait::async_trait;
use harvest_model::Document;
use harvest_types::RecordId;
use serde_json::{Map, Value};

/// A remote document store organised in named collections.
///
/// Query results come back in the store's native order; callers must not
/// assume any ranking.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a record and returns the id the store assigned to it.
    async fn create_record(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<RecordId>;

    /// Fetches one record, or `None` when the id is unknown.
    async fn get_record(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>>;

    /// Records whose `field` equals `value`.
    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// Bounded variant of [`DocumentStore::query_equals`].
    async fn query_equals_limited(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = self.query_equals(collection, field, value).await?;
        docs.truncate(limit);
        Ok(docs)
    }

    /// Records whose array `field` contains an element equal to `value`.
    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// Records where at least one of the array `fields` contains `value`,
    /// as a single query in native order. Each record appears once.
    async fn query_array_contains_any(
        &self,
        collection: &str,
        fields: &[&str],
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// Replaces the given top-level fields of one record.
    /// Fails with [`StoreError::NotFound`] when the id is unknown.
    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Map<String, Value>,
    ) -> StoreResult<()>;
}
