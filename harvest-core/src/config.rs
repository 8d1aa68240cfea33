use serde::{Deserialize, Serialize};

/// Tunables shared by the core components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Default bound for district listings when the caller gives none.
    pub popular_limit: usize,
    /// Dialing code prepended to canonical mobiles for the OTP provider.
    pub country_code: String,
    /// Length of one-time codes accepted at login.
    pub code_length: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            popular_limit: 5,
            country_code: "+91".to_string(),
            code_length: 6,
        }
    }
}
