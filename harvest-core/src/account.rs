//! Lookup of existing registrations and edits to their profile fields.

use crate::cancel::guarded;
use crate::error::{CoreError, CoreResult, InputError};
use crate::location::{LocationProvider, location_field};
use crate::registration::check_choices;
use harvest_model::{
    CollectionSchema, LOCATION_FIELD, MOBILE_FIELD, PersonRecord, coerce_integer, is_blank,
};
use harvest_store::DocumentStore;
use harvest_types::{Mobile, RecordId, Role};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Resolves registered records by mobile or id.
#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn DocumentStore>,
    cancel: CancellationToken,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_cancellation(store, CancellationToken::new())
    }

    pub fn with_cancellation(store: Arc<dyn DocumentStore>, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// The record registered under `raw_mobile` in `role`'s collection.
    pub async fn find_by_mobile(&self, raw_mobile: &str, role: Role) -> CoreResult<PersonRecord> {
        let mobile = Mobile::canonicalize(raw_mobile)?;
        let schema = CollectionSchema::for_role(role);
        let docs = guarded(
            &self.cancel,
            self.store.query_equals_limited(
                schema.collection,
                MOBILE_FIELD,
                &Value::String(mobile.as_str().to_string()),
                1,
            ),
        )
        .await?;

        match docs.into_iter().next() {
            Some(doc) => Ok(PersonRecord::from_document(role, doc)?),
            None => {
                debug!("No {} registered for {}", role, mobile);
                Err(CoreError::NotRegistered { role, mobile })
            }
        }
    }

    /// The record with `id` in `role`'s collection.
    pub async fn get(&self, role: Role, id: &RecordId) -> CoreResult<PersonRecord> {
        let schema = CollectionSchema::for_role(role);
        let doc = guarded(&self.cancel, self.store.get_record(schema.collection, id))
            .await?
            .ok_or_else(|| CoreError::not_found(role, id))?;
        Ok(PersonRecord::from_document(role, doc)?)
    }
}

/// Applies profile edits to non-inventory fields.
pub struct ProfileEditor {
    store: Arc<dyn DocumentStore>,
    cancel: CancellationToken,
    location: Option<Arc<dyn LocationProvider>>,
}

impl ProfileEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_cancellation(store, CancellationToken::new())
    }

    pub fn with_cancellation(store: Arc<dyn DocumentStore>, cancel: CancellationToken) -> Self {
        Self {
            store,
            cancel,
            location: None,
        }
    }

    pub fn with_location(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(provider);
        self
    }

    /// Updates the given fields of an existing record.
    ///
    /// The mobile, creation time, crop lists and crop-name index are owned by
    /// registration and the inventory reconciler and are dropped from the
    /// patch. Required fields may be omitted but not blanked. Returns the
    /// names of the fields written.
    pub async fn update_profile(
        &self,
        record_id: &RecordId,
        role: Role,
        fields: Map<String, Value>,
    ) -> CoreResult<Vec<String>> {
        let schema = CollectionSchema::for_role(role);
        let patch = build_patch(schema, fields)?;

        guarded(&self.cancel, self.store.get_record(schema.collection, record_id))
            .await?
            .ok_or_else(|| CoreError::not_found(role, record_id))?;

        let written: Vec<String> = patch.keys().cloned().collect();
        if written.is_empty() {
            debug!("Profile patch for {} is empty after filtering", record_id);
            return Ok(written);
        }
        guarded(
            &self.cancel,
            self.store.update_record(schema.collection, record_id, patch),
        )
        .await?;
        info!("Updated profile of {} {}: {:?}", role, record_id, written);
        Ok(written)
    }

    /// Reads the current position and stores it as the record's `location`.
    /// Returns the stored value.
    pub async fn refresh_location(&self, record_id: &RecordId, role: Role) -> CoreResult<String> {
        let Some(provider) = &self.location else {
            return Err(CoreError::ProviderUnavailable(
                "no location provider configured".into(),
            ));
        };
        let schema = CollectionSchema::for_role(role);
        guarded(&self.cancel, self.store.get_record(schema.collection, record_id))
            .await?
            .ok_or_else(|| CoreError::not_found(role, record_id))?;

        let location = guarded(&self.cancel, async {
            location_field(provider.as_ref())
                .await
                .map_err(|e| CoreError::ProviderUnavailable(e.to_string()))
        })
        .await?;

        let mut patch = Map::new();
        patch.insert(LOCATION_FIELD.to_string(), Value::String(location.clone()));
        guarded(
            &self.cancel,
            self.store.update_record(schema.collection, record_id, patch),
        )
        .await?;
        debug!("Stored location of {} {}", role, record_id);
        Ok(location)
    }
}

fn build_patch(
    schema: &CollectionSchema,
    fields: Map<String, Value>,
) -> CoreResult<Map<String, Value>> {
    let mut patch = Map::new();
    for (field, value) in fields {
        if field == "id" || schema.is_managed_field(&field) {
            continue;
        }
        if schema.required_fields.contains(&field.as_str()) && is_blank(Some(&value)) {
            return Err(InputError::MissingField(field).into());
        }
        let value = if schema.is_numeric_field(&field) {
            coerce_integer(&value)
        } else {
            value
        };
        patch.insert(field, value);
    }
    check_choices(schema, &patch)?;
    Ok(patch)
}
