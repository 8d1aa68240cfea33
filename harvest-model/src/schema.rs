use harvest_types::Role;
use serde_json::{Map, Number, Value};

/// Stored field holding the canonical mobile number.
pub const MOBILE_FIELD: &str = "mobile";
/// Stored field holding the free-text district.
pub const DISTRICT_FIELD: &str = "district";
/// Stored field holding the creation time in epoch milliseconds.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Stored field holding the formatted GPS position.
pub const LOCATION_FIELD: &str = "location";
/// Farmer field restricted to [`land_size_options`].
pub const LAND_SIZE_FIELD: &str = "landSize";
/// Stored string array mirroring the names of the listing field.
pub const CROP_NAMES_FIELD: &str = "cropNames";

/// Describes where a role's records live and how their fields are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub role: Role,
    pub collection: &'static str,
    /// Crop list other users search against (`crops` / `cropsSold`).
    pub listing_field: &'static str,
    /// Crop list whose quantities the owner edits (`crops` / `stock`).
    pub inventory_field: &'static str,
    /// Field carrying the person's display name.
    pub name_field: &'static str,
    /// Fields that must be present and non-blank at registration.
    /// `mobile` is validated separately.
    pub required_fields: &'static [&'static str],
    /// Fields stored as integers or `null`.
    pub numeric_fields: &'static [&'static str],
    /// Values applied at registration when a field is absent or blank.
    pub defaults: &'static [(&'static str, &'static str)],
}

static FARMERS: CollectionSchema = CollectionSchema {
    role: Role::Farmer,
    collection: "farmers",
    listing_field: "crops",
    inventory_field: "crops",
    name_field: "name",
    required_fields: &["name", "bankAccount"],
    numeric_fields: &["age", "pincode"],
    defaults: &[("gender", "Male"), (LAND_SIZE_FIELD, "1-5 acres")],
};

static TRADERS: CollectionSchema = CollectionSchema {
    role: Role::Trader,
    collection: "traders",
    listing_field: "cropsSold",
    inventory_field: "stock",
    name_field: "fullName",
    required_fields: &["fullName", "shopName"],
    numeric_fields: &["age", "pincode"],
    defaults: &[("gender", "Male"), ("traderType", "Wholesaler")],
};

impl CollectionSchema {
    pub fn for_role(role: Role) -> &'static CollectionSchema {
        match role {
            Role::Farmer => &FARMERS,
            Role::Trader => &TRADERS,
        }
    }

    /// Whether the listing and inventory are the same stored list.
    pub fn shares_crop_field(&self) -> bool {
        self.listing_field == self.inventory_field
    }

    /// Fields written only by registration and the inventory reconciler.
    pub fn is_managed_field(&self, field: &str) -> bool {
        field == MOBILE_FIELD
            || field == CREATED_AT_FIELD
            || field == CROP_NAMES_FIELD
            || field == self.listing_field
            || field == self.inventory_field
    }

    pub fn is_numeric_field(&self, field: &str) -> bool {
        self.numeric_fields.contains(&field)
    }

    /// The values `field` may take, when it is restricted.
    pub fn allowed_values(&self, field: &str) -> Option<Vec<String>> {
        (self.role == Role::Farmer && field == LAND_SIZE_FIELD).then(land_size_options)
    }

    /// First non-blank field whose value is outside its allowed set.
    pub fn find_invalid_choice<'a>(
        &self,
        fields: &'a Map<String, Value>,
    ) -> Option<(&'a str, &'a Value)> {
        fields
            .iter()
            .filter(|(_, value)| !is_blank(Some(value)))
            .find(|(field, value)| {
                self.allowed_values(field).is_some_and(|allowed| {
                    !value
                        .as_str()
                        .is_some_and(|v| allowed.iter().any(|a| a == v))
                })
            })
            .map(|(field, value)| (field.as_str(), value))
    }
}

/// Whether a submitted value counts as "not filled in".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Coerces a numeric form field to an integer, or `null` when blank or
/// unparsable. Fractional input truncates.
pub fn coerce_integer(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };
    parsed.map_or(Value::Null, |v| Value::Number(Number::from(v)))
}

/// Land-size choices offered to farmers: `"1-5 acres"` through `"96-100 acres"`.
pub fn land_size_options() -> Vec<String> {
    (0..20)
        .map(|i| format!("{}-{} acres", i * 5 + 1, (i + 1) * 5))
        .collect()
}
