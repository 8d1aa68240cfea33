use harvest_types::{Mobile, RecordId, Role, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crop::{CropEntry, normalize};
use crate::document::Document;
use crate::schema::{
    CREATED_AT_FIELD, CROP_NAMES_FIELD, CollectionSchema, DISTRICT_FIELD, MOBILE_FIELD,
};
use crate::{ModelError, ModelResult};

/// A farmer or trader rendered into canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: RecordId,
    pub role: Role,
    pub mobile: Mobile,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub display_name: String,
    /// The list other users search against.
    #[serde(default)]
    pub crop_list: Vec<CropEntry>,
    /// The list whose quantities the owner edits. Same as `crop_list` for farmers.
    #[serde(default)]
    pub inventory: Vec<CropEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Every other stored field, verbatim.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl PersonRecord {
    /// Renders a stored document of the given role.
    ///
    /// Fails when the document comes from another collection or its mobile
    /// number is missing or not canonicalizable. Crop lists never fail: they
    /// go through the normalizer.
    pub fn from_document(role: Role, doc: Document) -> ModelResult<Self> {
        let schema = CollectionSchema::for_role(role);
        if doc.collection != schema.collection {
            return Err(ModelError::CollectionMismatch {
                expected: schema.collection.to_string(),
                found: doc.collection,
            });
        }

        let raw_mobile = doc
            .get_str("/mobile")
            .ok_or_else(|| ModelError::MissingField(MOBILE_FIELD.to_string()))?;
        let mobile = Mobile::canonicalize(raw_mobile)?;

        let district = doc.get_str("/district").unwrap_or_default().to_string();
        let display_name = doc
            .get_str(&format!("/{}", schema.name_field))
            .unwrap_or_default()
            .to_string();
        let created_at = doc.get_i64("/createdAt").map(Timestamp::from_millis);
        let crop_list = normalize(doc.get(schema.listing_field));
        let inventory = normalize(doc.get(schema.inventory_field));

        let Document { id, data, .. } = doc;
        let fields = data
            .into_iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    MOBILE_FIELD | DISTRICT_FIELD | CREATED_AT_FIELD | CROP_NAMES_FIELD
                ) && key != schema.listing_field
                    && key != schema.inventory_field
            })
            .collect();

        Ok(Self {
            id,
            role,
            mobile,
            district,
            display_name,
            crop_list,
            inventory,
            created_at,
            fields,
        })
    }

    /// Reads a string field kept in `fields`.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}
