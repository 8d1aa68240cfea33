//! Canonical mobile numbers.
//!
//! Users type numbers with country codes, spaces and dashes. The canonical
//! form keeps digits only and must be exactly [`MOBILE_DIGITS`] long.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Number of digits in a canonical mobile number.
pub const MOBILE_DIGITS: usize = 10;

/// A mobile number in canonical 10-digit form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Mobile(String);

impl Mobile {
    /// Strips every non-digit character and validates the length.
    ///
    /// A leading `+91` dialing code is dropped when exactly ten digits
    /// follow it, so `"+91 98765-43210"` canonicalizes to `"9876543210"`.
    /// Any other digit count is rejected.
    pub fn canonicalize(raw: &str) -> Result<Self, Error> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == MOBILE_DIGITS {
            return Ok(Self(digits));
        }
        match digits.strip_prefix("91") {
            Some(local) if local.len() == MOBILE_DIGITS && raw.trim_start().starts_with('+') => {
                Ok(Self(local.to_string()))
            }
            _ => Err(Error::InvalidMobile {
                digits: digits.len(),
            }),
        }
    }

    /// Returns the ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefixes the number with a dialing code, e.g. `"+91"`.
    #[must_use]
    pub fn with_country_code(&self, country_code: &str) -> String {
        format!("{country_code}{}", self.0)
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mobile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::canonicalize(s)
    }
}

impl<'de> Deserialize<'de> for Mobile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::canonicalize(&raw).map_err(serde::de::Error::custom)
    }
}
