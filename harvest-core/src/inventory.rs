//! Quantity edits reconciled against the store.
//!
//! Edits apply to the caller's [`Inventory`] first and are then persisted as
//! a full replace of the role's inventory list. A failed or cancelled persist
//! leaves the local edit in place; nothing is rolled back or retried. There
//! is no version token, so the last persisted write wins.

use crate::cancel::guarded;
use crate::error::{CoreError, CoreResult, InputError};
use harvest_model::{
    CROP_NAMES_FIELD, CollectionSchema, CropEntry, crop_names, entries_to_value, normalize,
    parse_quantity,
};
use harvest_store::DocumentStore;
use harvest_types::{RecordId, Role};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A record's editable crop list, as last seen or edited locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    record_id: RecordId,
    role: Role,
    entries: Vec<CropEntry>,
}

impl Inventory {
    pub fn new(record_id: RecordId, role: Role, entries: Vec<CropEntry>) -> Self {
        Self {
            record_id,
            role,
            entries,
        }
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn entries(&self) -> &[CropEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads inventories and persists quantity and crop edits.
pub struct InventoryReconciler {
    store: Arc<dyn DocumentStore>,
    cancel: CancellationToken,
}

impl InventoryReconciler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_cancellation(store, CancellationToken::new())
    }

    pub fn with_cancellation(store: Arc<dyn DocumentStore>, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// Reads and normalizes the inventory list of one record.
    pub async fn load(&self, role: Role, record_id: &RecordId) -> CoreResult<Inventory> {
        let schema = CollectionSchema::for_role(role);
        let doc = guarded(
            &self.cancel,
            self.store.get_record(schema.collection, record_id),
        )
        .await?
        .ok_or_else(|| CoreError::not_found(role, record_id))?;

        let entries = normalize(doc.get(schema.inventory_field));
        debug!("Loaded {} inventory entries for {}", entries.len(), record_id);
        Ok(Inventory::new(doc.id, role, entries))
    }

    /// Sets the quantity at `index` from free-text input and persists the
    /// whole list.
    ///
    /// Unparsable or negative input becomes `0`. Returns the stored quantity.
    pub async fn update_quantity(
        &self,
        inventory: &mut Inventory,
        index: usize,
        raw_value: &str,
    ) -> CoreResult<u64> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let len = inventory.entries.len();
        let entry = inventory
            .entries
            .get_mut(index)
            .ok_or(InputError::IndexOutOfRange { index, len })?;
        let qty = parse_quantity(raw_value);
        entry.qty = qty;

        self.persist(inventory).await?;
        Ok(qty)
    }

    /// Appends `{name, 0}` for a trimmed, non-empty name and persists.
    pub async fn add_crop(&self, inventory: &mut Inventory, raw_name: &str) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let entry = CropEntry::new(raw_name, 0).ok_or(InputError::EmptyCropName)?;
        inventory.entries.push(entry);
        self.persist(inventory).await
    }

    async fn persist(&self, inventory: &Inventory) -> CoreResult<()> {
        let schema = CollectionSchema::for_role(inventory.role);
        let mut partial = Map::new();
        partial.insert(
            schema.inventory_field.to_string(),
            entries_to_value(&inventory.entries),
        );
        if schema.shares_crop_field() {
            partial.insert(
                CROP_NAMES_FIELD.to_string(),
                Value::from(crop_names(&inventory.entries)),
            );
        }

        let result = guarded(
            &self.cancel,
            self.store
                .update_record(schema.collection, &inventory.record_id, partial),
        )
        .await;
        if let Err(e) = &result {
            warn!(
                "Inventory of {} not persisted, local edit kept: {}",
                inventory.record_id, e
            );
        }
        result
    }
}
