//! Read-only matching of records by crop and by district.

use crate::cancel::guarded;
use crate::config::CoreConfig;
use crate::error::CoreResult;
use harvest_model::{CROP_NAMES_FIELD, CollectionSchema, DISTRICT_FIELD, Document, PersonRecord};
use harvest_store::DocumentStore;
use harvest_types::Role;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Finds records by exact crop name or by district.
///
/// Results keep the store's native order. Matching is case-sensitive and
/// "popular" carries no ranking.
pub struct MatchingEngine {
    store: Arc<dyn DocumentStore>,
    config: CoreConfig,
    cancel: CancellationToken,
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn DocumentStore>, config: CoreConfig) -> Self {
        Self::with_cancellation(store, config, CancellationToken::new())
    }

    pub fn with_cancellation(
        store: Arc<dyn DocumentStore>,
        config: CoreConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            config,
            cancel,
        }
    }

    /// Records of `role` listing a crop named exactly `crop_name`.
    ///
    /// Canonical records match through the `cropNames` index; legacy records
    /// whose listing still holds bare strings match on the listing itself.
    /// Both fields go to the store as one query, so hits keep its native
    /// order. A blank name matches nothing.
    pub async fn exact_crop_search(
        &self,
        crop_name: &str,
        role: Role,
    ) -> CoreResult<Vec<PersonRecord>> {
        if crop_name.trim().is_empty() {
            return Ok(Vec::new());
        }
        let schema = CollectionSchema::for_role(role);

        let docs = guarded(
            &self.cancel,
            self.store.query_array_contains_any(
                schema.collection,
                &[CROP_NAMES_FIELD, schema.listing_field],
                &Value::String(crop_name.to_string()),
            ),
        )
        .await?;
        debug!("Crop search {:?} in {}: {} hits", crop_name, schema.collection, docs.len());
        Ok(render(role, docs))
    }

    /// Up to `limit` records of `role` whose district equals `district`
    /// exactly, defaulting to the configured bound.
    ///
    /// A blank or whitespace-only district returns an empty list without
    /// querying the store, as does a zero limit.
    pub async fn popular_in_district(
        &self,
        district: &str,
        role: Role,
        limit: Option<usize>,
    ) -> CoreResult<Vec<PersonRecord>> {
        let limit = limit.unwrap_or(self.config.popular_limit);
        if district.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let schema = CollectionSchema::for_role(role);

        let docs = guarded(
            &self.cancel,
            self.store.query_equals_limited(
                schema.collection,
                DISTRICT_FIELD,
                &Value::String(district.to_string()),
                limit,
            ),
        )
        .await?;
        debug!("District {:?} in {}: {} records", district, schema.collection, docs.len());
        Ok(render(role, docs))
    }
}

fn render(role: Role, docs: Vec<Document>) -> Vec<PersonRecord> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match PersonRecord::from_document(role, doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable {} record {}: {}", role, id, e);
                    None
                }
            }
        })
        .collect()
}
