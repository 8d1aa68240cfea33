//! Crop and stock lines, and the normalizer that canonicalizes them.
//!
//! Stored crop lists come in two shapes: early records hold bare crop names
//! (`["Rice", "Wheat"]`), later ones hold objects (`[{"name": "Wheat",
//! "qty": 5}]`, or `quantity` instead of `qty` on some trader records).
//! [`normalize`] turns either shape into a `Vec<CropEntry>`; code past the
//! ingestion boundary only ever sees the canonical type.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A canonical crop or stock line.
///
/// `name` is trimmed and never empty; `qty` is a whole, non-negative
/// quantity (quintals for farmers, units of stock for traders).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropEntry {
    pub name: String,
    #[serde(default)]
    pub qty: u64,
}

impl CropEntry {
    /// Creates an entry, trimming the name.
    /// Returns `None` when the trimmed name is empty.
    pub fn new(name: &str, qty: u64) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            qty,
        })
    }

    pub fn to_value(&self) -> Value {
        json!({ "name": self.name, "qty": self.qty })
    }
}

/// One element of a stored crop list, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCropEntry {
    /// Legacy bare crop name.
    Name(String),
    /// Object entry; `qty` holds whatever was stored under `qty` or `quantity`.
    Object { name: String, qty: Option<Value> },
}

impl RawCropEntry {
    /// Classifies a stored list element.
    ///
    /// Returns `None` for elements that carry no crop name at all (numbers,
    /// nulls, objects without a string `name`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::Name(name.clone())),
            Value::Object(map) => {
                let name = map.get("name")?.as_str()?.to_string();
                let qty = map.get("qty").or_else(|| map.get("quantity")).cloned();
                Some(Self::Object { name, qty })
            }
            _ => None,
        }
    }

    fn into_entry(self) -> Option<CropEntry> {
        match self {
            Self::Name(name) => CropEntry::new(&name, 0),
            Self::Object { name, qty } => {
                CropEntry::new(&name, qty.as_ref().map(coerce_qty).unwrap_or(0))
            }
        }
    }
}

impl From<&str> for RawCropEntry {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<CropEntry> for RawCropEntry {
    fn from(entry: CropEntry) -> Self {
        Self::Object {
            name: entry.name,
            qty: Some(Value::from(entry.qty)),
        }
    }
}

/// Normalizes a stored crop list into canonical entries.
///
/// Absent or non-array input yields an empty list. Order is preserved;
/// elements without a usable name are dropped.
pub fn normalize(raw: Option<&Value>) -> Vec<CropEntry> {
    match raw {
        Some(Value::Array(items)) => {
            normalize_entries(items.iter().filter_map(RawCropEntry::from_value))
        }
        _ => Vec::new(),
    }
}

/// Normalizes already-classified entries.
pub fn normalize_entries<I>(raw: I) -> Vec<CropEntry>
where
    I: IntoIterator<Item = RawCropEntry>,
{
    raw.into_iter().filter_map(RawCropEntry::into_entry).collect()
}

/// Coerces a stored quantity to a whole non-negative number.
///
/// Non-negative integers pass through, non-negative floats truncate, numeric
/// strings parse; negatives and everything else become 0.
pub fn coerce_qty(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite() && *f > 0.0) {
                f.trunc() as u64
            } else {
                0
            }
        }
        Value::String(s) => parse_quantity(s),
        _ => 0,
    }
}

/// Parses user-typed quantity text.
///
/// Leading/trailing whitespace is ignored. Anything that is not an integer,
/// and any negative integer, yields 0.
pub fn parse_quantity(raw: &str) -> u64 {
    raw.trim()
        .parse::<i128>()
        .ok()
        .map(|v| u64::try_from(v.max(0)).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Names of the given entries, in order.
pub fn crop_names(entries: &[CropEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

/// Serializes entries into the stored array shape.
pub fn entries_to_value(entries: &[CropEntry]) -> Value {
    Value::Array(entries.iter().map(CropEntry::to_value).collect())
}
