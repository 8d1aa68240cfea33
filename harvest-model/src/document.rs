use harvest_types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as the document store returns it.
///
/// `data` holds the stored fields verbatim; nothing has been normalized yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub collection: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: RecordId, collection: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id,
            collection: collection.into(),
            data,
        }
    }

    /// Raw value of a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Extract a string value using a JSON pointer (e.g., "/district").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract an integer value using a JSON pointer.
    pub fn get_i64(&self, pointer: &str) -> Option<i64> {
        self.pointer(pointer).and_then(|v| v.as_i64())
    }

    fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.split_once('/') {
            Some((head, tail)) => (head, Some(tail)),
            None => (rest, None),
        };
        let value = self.data.get(head)?;
        match tail {
            Some(tail) => value.pointer(&format!("/{tail}")),
            None => Some(value),
        }
    }
}
