//! Registration with per-role mobile uniqueness.
//!
//! A mobile number may appear at most once per collection. The same number
//! registering as both farmer and trader is allowed.
//!
//! The uniqueness check and the create are two separate store calls with no
//! transaction around them, so two concurrent registrations of one number can
//! both pass the check. Stores with unique indexes close that window on their
//! side.

use crate::cancel::guarded;
use crate::error::{CoreError, CoreResult, InputError};
use crate::location::{LocationProvider, location_field};
use harvest_model::{
    CREATED_AT_FIELD, CROP_NAMES_FIELD, CollectionSchema, LOCATION_FIELD, MOBILE_FIELD,
    coerce_integer, crop_names, entries_to_value, is_blank, normalize,
};
use harvest_store::DocumentStore;
use harvest_types::{Mobile, RecordId, Role, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a registration attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    PendingUniquenessCheck,
    Registered,
    RejectedDuplicate,
    RejectedInvalid,
}

impl RegistrationState {
    /// Terminal state reached by a finished attempt.
    ///
    /// Store failures and cancellation leave the attempt `Unregistered`:
    /// nothing was created.
    pub fn of<T>(result: &CoreResult<T>) -> Self {
        match result {
            Ok(_) => RegistrationState::Registered,
            Err(CoreError::DuplicateRegistration { .. }) => RegistrationState::RejectedDuplicate,
            Err(CoreError::InvalidInput(_)) => RegistrationState::RejectedInvalid,
            Err(_) => RegistrationState::Unregistered,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RegistrationState::Registered
                | RegistrationState::RejectedDuplicate
                | RegistrationState::RejectedInvalid
        )
    }
}

/// Creates farmer and trader records, refusing duplicate mobiles.
pub struct RegistrationGuard {
    store: Arc<dyn DocumentStore>,
    cancel: CancellationToken,
    location: Option<Arc<dyn LocationProvider>>,
}

impl RegistrationGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_cancellation(store, CancellationToken::new())
    }

    /// Binds the guard to a cancellation token. Once cancelled, every pending
    /// and future call returns [`CoreError::Cancelled`].
    pub fn with_cancellation(store: Arc<dyn DocumentStore>, cancel: CancellationToken) -> Self {
        Self {
            store,
            cancel,
            location: None,
        }
    }

    /// Stamps each new record's `location` from `provider`. A position that
    /// cannot be read leaves the submitted value in place.
    pub fn with_location(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(provider);
        self
    }

    /// Registers a new record of `role` and returns its store-assigned id.
    ///
    /// `fields` carries the form values. Role defaults fill absent or blank
    /// optional fields, numeric fields are coerced, and crop lists are
    /// normalized. Anything named `id` in `fields` is ignored.
    pub async fn register(
        &self,
        raw_mobile: &str,
        role: Role,
        fields: Map<String, Value>,
    ) -> CoreResult<RecordId> {
        debug!(%role, state = ?RegistrationState::Unregistered, "Registration started");
        let result = self.try_register(raw_mobile, role, fields).await;
        let state = RegistrationState::of(&result);
        debug!(%role, ?state, "Registration finished");
        result
    }

    async fn try_register(
        &self,
        raw_mobile: &str,
        role: Role,
        fields: Map<String, Value>,
    ) -> CoreResult<RecordId> {
        let schema = CollectionSchema::for_role(role);
        let mobile = Mobile::canonicalize(raw_mobile)?;
        let mut record = build_record(schema, &mobile, fields)?;

        debug!(%role, state = ?RegistrationState::PendingUniquenessCheck, "Checking mobile");
        let existing = guarded(
            &self.cancel,
            self.store.query_equals(
                schema.collection,
                MOBILE_FIELD,
                &Value::String(mobile.as_str().to_string()),
            ),
        )
        .await?;
        if let Some(doc) = existing.into_iter().next() {
            return Err(CoreError::DuplicateRegistration {
                role,
                existing_id: doc.id,
            });
        }

        if let Some(provider) = &self.location {
            let captured = guarded(&self.cancel, async {
                Ok::<_, CoreError>(location_field(provider.as_ref()).await)
            })
            .await?;
            match captured {
                Ok(location) => {
                    record.insert(LOCATION_FIELD.to_string(), Value::String(location));
                }
                Err(e) => warn!("Registering {} {} without a fresh location: {}", role, mobile, e),
            }
        }

        record.insert(
            CREATED_AT_FIELD.to_string(),
            Value::from(Timestamp::now().as_millis()),
        );
        let id = guarded(
            &self.cancel,
            self.store.create_record(schema.collection, record),
        )
        .await?;
        info!("Registered {} {} as {}", role, mobile, id);
        Ok(id)
    }
}

/// Validates the form and shapes it into the stored document, minus
/// `createdAt`.
fn build_record(
    schema: &CollectionSchema,
    mobile: &Mobile,
    mut fields: Map<String, Value>,
) -> CoreResult<Map<String, Value>> {
    for field in schema.required_fields {
        if is_blank(fields.get(*field)) {
            return Err(InputError::MissingField((*field).to_string()).into());
        }
    }

    fields.remove("id");
    fields.remove(CROP_NAMES_FIELD);
    fields.insert(
        MOBILE_FIELD.to_string(),
        Value::String(mobile.as_str().to_string()),
    );

    for (field, default) in schema.defaults {
        if is_blank(fields.get(*field)) {
            fields.insert((*field).to_string(), Value::String((*default).to_string()));
        }
    }
    for field in schema.numeric_fields {
        let coerced = fields.get(*field).map_or(Value::Null, coerce_integer);
        fields.insert((*field).to_string(), coerced);
    }

    check_choices(schema, &fields)?;

    let listing = normalize(fields.get(schema.listing_field));
    if !schema.shares_crop_field() {
        let inventory = normalize(fields.get(schema.inventory_field));
        fields.insert(
            schema.inventory_field.to_string(),
            entries_to_value(&inventory),
        );
    }
    fields.insert(
        CROP_NAMES_FIELD.to_string(),
        Value::from(crop_names(&listing)),
    );
    fields.insert(schema.listing_field.to_string(), entries_to_value(&listing));

    Ok(fields)
}

/// Rejects values outside a restricted field's options.
pub(crate) fn check_choices(
    schema: &CollectionSchema,
    fields: &Map<String, Value>,
) -> CoreResult<()> {
    match schema.find_invalid_choice(fields) {
        Some((field, value)) => Err(InputError::InvalidChoice {
            field: field.to_string(),
            value: value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_string),
        }
        .into()),
        None => Ok(()),
    }
}
