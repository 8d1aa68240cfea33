//! The two user roles and the collections that hold them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which side of the market a person record belongs to.
///
/// Each role has its own collection, so a farmer and a trader may share a
/// mobile number without conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Trader,
}

impl Role {
    /// Both roles, farmers first.
    pub const ALL: [Role; 2] = [Role::Farmer, Role::Trader];

    /// Name of the store collection holding records of this role.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Role::Farmer => "farmers",
            Role::Trader => "traders",
        }
    }

    /// Resolves a collection name (`"farmers"` / `"traders"`) to its role.
    pub fn from_collection(collection: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|role| role.collection() == collection)
            .ok_or_else(|| Error::UnknownRole(collection.to_string()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Trader => "trader",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "trader" => Ok(Role::Trader),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}
