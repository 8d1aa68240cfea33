//! In-process document store.

use crate::error::{StoreError, StoreResult};
use crate::DocumentStore;
use async_trait::async_trait;
use harvest_model::Document;
use harvest_types::RecordId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A [`DocumentStore`] held entirely in memory.
///
/// Each collection keeps insertion order, which is the "native" result order
/// of every query.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a seed object of the form
    /// `{"farmers": [{"id": "...", ...fields}], "traders": [...]}`.
    ///
    /// Entries without an `id` get a generated one.
    pub fn from_seed(seed: Value) -> StoreResult<Self> {
        let Value::Object(seed) = seed else {
            return Err(StoreError::InvalidData("seed must be a JSON object".into()));
        };

        let mut collections = BTreeMap::new();
        for (collection, records) in seed {
            let Value::Array(records) = records else {
                return Err(StoreError::InvalidData(format!(
                    "seed collection {collection} must be an array"
                )));
            };
            let mut docs = Vec::with_capacity(records.len());
            for record in records {
                let Value::Object(mut data) = record else {
                    return Err(StoreError::InvalidData(format!(
                        "seed record in {collection} must be an object"
                    )));
                };
                let id = match data.remove("id") {
                    Some(Value::String(id)) => RecordId::parse(&id)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?,
                    Some(other) => {
                        return Err(StoreError::InvalidData(format!(
                            "seed id must be a string, got {other}"
                        )));
                    }
                    None => RecordId::generate(),
                };
                docs.push(Document::new(id, collection.clone(), data));
            }
            collections.insert(collection, docs);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            offline: AtomicBool::new(false),
        })
    }

    /// Simulates losing (or regaining) the backend. While offline every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Inserts a document verbatim under a caller-chosen id, bypassing
    /// any validation. Used to stage legacy record shapes.
    pub async fn insert_document(&self, collection: &str, id: RecordId, data: Map<String, Value>) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, collection, data));
    }

    /// Number of records in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.is_offline() {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    async fn filter<F>(&self, collection: &str, limit: Option<usize>, pred: F) -> Vec<Document>
    where
        F: Fn(&Document) -> bool,
    {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Vec::new();
        };
        docs.iter()
            .filter(|d| pred(*d))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_record(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<RecordId> {
        self.ensure_online()?;
        let id = RecordId::generate();
        self.insert_document(collection, id.clone(), fields).await;
        debug!("Created record {}/{}", collection, id);
        Ok(id)
    }

    async fn get_record(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id))
            .cloned())
    }

    async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.ensure_online()?;
        Ok(self
            .filter(collection, None, |d| d.get(field) == Some(value))
            .await)
    }

    async fn query_equals_limited(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        self.ensure_online()?;
        Ok(self
            .filter(collection, Some(limit), |d| d.get(field) == Some(value))
            .await)
    }

    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.ensure_online()?;
        Ok(self
            .filter(collection, None, |d| {
                matches!(d.get(field), Some(Value::Array(items)) if items.contains(value))
            })
            .await)
    }

    async fn query_array_contains_any(
        &self,
        collection: &str,
        fields: &[&str],
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.ensure_online()?;
        Ok(self
            .filter(collection, None, |d| {
                fields.iter().any(|field| {
                    matches!(d.get(field), Some(Value::Array(items)) if items.contains(value))
                })
            })
            .await)
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        partial: Map<String, Value>,
    ) -> StoreResult<()> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| &d.id == id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let fields: Vec<String> = partial.keys().cloned().collect();
        doc.data.extend(partial);
        debug!("Updated record {}/{} fields={:?}", collection, id, fields);
        Ok(())
    }
}
