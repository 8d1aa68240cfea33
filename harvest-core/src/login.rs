//! Login by mobile number and one-time code.
//!
//! The directory lookup happens before any code is sent, so unregistered
//! numbers never reach the verification provider.
//!
//! Each issued code is bound to the mobile and role it was requested for.
//! Confirmation only names the verification; the account it logs into is
//! the one recorded at request time.

use crate::account::AccountDirectory;
use crate::cancel::guarded;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, InputError};
use async_trait::async_trait;
use harvest_model::PersonRecord;
use harvest_types::{Mobile, Role};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle the provider returns for one code it sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationId(String);

impl VerificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors a phone verification provider can report.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("unknown verification: {0}")]
    UnknownVerification(VerificationId),
}

impl From<VerifierError> for CoreError {
    fn from(err: VerifierError) -> Self {
        match err {
            VerifierError::Unavailable(msg) => CoreError::ProviderUnavailable(msg),
            VerifierError::UnknownVerification(_) => CoreError::VerificationFailed,
        }
    }
}

/// A phone verification provider delivering one-time codes by SMS.
#[async_trait]
pub trait PhoneVerifier: Send + Sync {
    /// Sends a code to `phone_number` (international form, e.g. `+919876543210`).
    async fn send_code(&self, phone_number: &str) -> Result<VerificationId, VerifierError>;

    /// Checks `code` against the one sent under `id`. Returns the number the
    /// code was delivered to, or `None` when the code is wrong.
    async fn confirm(
        &self,
        id: &VerificationId,
        code: &str,
    ) -> Result<Option<String>, VerifierError>;
}

/// A code request awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub verification_id: VerificationId,
    pub mobile: Mobile,
    pub role: Role,
}

/// Directory lookup followed by the code exchange.
pub struct LoginFlow {
    directory: AccountDirectory,
    verifier: Arc<dyn PhoneVerifier>,
    config: CoreConfig,
    cancel: CancellationToken,
    pending: Mutex<HashMap<VerificationId, PendingVerification>>,
}

impl LoginFlow {
    pub fn new(
        directory: AccountDirectory,
        verifier: Arc<dyn PhoneVerifier>,
        config: CoreConfig,
    ) -> Self {
        Self::with_cancellation(directory, verifier, config, CancellationToken::new())
    }

    pub fn with_cancellation(
        directory: AccountDirectory,
        verifier: Arc<dyn PhoneVerifier>,
        config: CoreConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            directory,
            verifier,
            config,
            cancel,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up the registration and asks the provider to send a code.
    pub async fn request_code(&self, raw_mobile: &str, role: Role) -> CoreResult<PendingVerification> {
        let record = self.directory.find_by_mobile(raw_mobile, role).await?;
        let phone_number = record.mobile.with_country_code(&self.config.country_code);
        let verification_id =
            guarded(&self.cancel, self.verifier.send_code(&phone_number)).await?;
        debug!("Code requested for {} {}", role, record.mobile);
        let pending = PendingVerification {
            verification_id,
            mobile: record.mobile,
            role,
        };
        self.pending_codes()
            .insert(pending.verification_id.clone(), pending.clone());
        Ok(pending)
    }

    /// Checks `code` for the verification `id` and returns the freshly
    /// loaded record it was requested for.
    ///
    /// `role` must match the role the code was requested under. A code
    /// delivered to any number other than the requesting one is refused.
    pub async fn confirm(
        &self,
        id: &VerificationId,
        role: Role,
        code: &str,
    ) -> CoreResult<PersonRecord> {
        let code = code.trim();
        if code.len() != self.config.code_length || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::InvalidCode {
                expected: self.config.code_length,
            }
            .into());
        }

        let Some(pending) = self.pending_codes().get(id).cloned() else {
            debug!("No pending verification {}", id);
            return Err(CoreError::VerificationFailed);
        };
        if pending.role != role {
            warn!("Verification {} was requested as {}, not {}", id, pending.role, role);
            return Err(CoreError::VerificationFailed);
        }

        let delivered_to = guarded(&self.cancel, self.verifier.confirm(id, code))
            .await?
            .ok_or(CoreError::VerificationFailed)?;
        self.pending_codes().remove(id);
        if delivered_to != pending.mobile.with_country_code(&self.config.country_code) {
            warn!("Verification {} was delivered to another number", id);
            return Err(CoreError::VerificationFailed);
        }

        let record = self
            .directory
            .find_by_mobile(pending.mobile.as_str(), pending.role)
            .await?;
        info!("{} {} logged in", pending.role, record.id);
        Ok(record)
    }

    fn pending_codes(&self) -> MutexGuard<'_, HashMap<VerificationId, PendingVerification>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct IssuedCode {
    phone_number: String,
    code: String,
}

/// In-process [`PhoneVerifier`] issuing random numeric codes.
///
/// Codes are single use. Nothing is delivered; [`MemoryVerifier::issued_code`]
/// exposes the code instead.
pub struct MemoryVerifier {
    code_length: usize,
    next_id: AtomicU64,
    issued: Mutex<HashMap<VerificationId, IssuedCode>>,
}

impl MemoryVerifier {
    pub fn new(code_length: usize) -> Self {
        Self {
            code_length,
            next_id: AtomicU64::new(1),
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// The code sent under `id`, if still unconfirmed.
    pub fn issued_code(&self, id: &VerificationId) -> Option<String> {
        let issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        issued.get(id).map(|c| c.code.clone())
    }

    /// The number the code under `id` was sent to.
    pub fn recipient(&self, id: &VerificationId) -> Option<String> {
        let issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        issued.get(id).map(|c| c.phone_number.clone())
    }

    fn generate_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.code_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

impl Default for MemoryVerifier {
    fn default() -> Self {
        Self::new(CoreConfig::default().code_length)
    }
}

#[async_trait]
impl PhoneVerifier for MemoryVerifier {
    async fn send_code(&self, phone_number: &str) -> Result<VerificationId, VerifierError> {
        let id = VerificationId::new(format!(
            "verification-{}",
            self.next_id.fetch_add(1, Ordering::Relaxed)
        ));
        let code = self.generate_code();
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        issued.insert(
            id.clone(),
            IssuedCode {
                phone_number: phone_number.to_string(),
                code,
            },
        );
        debug!("Issued code {} to {}", id, phone_number);
        Ok(id)
    }

    async fn confirm(
        &self,
        id: &VerificationId,
        code: &str,
    ) -> Result<Option<String>, VerifierError> {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = issued.get(id) else {
            return Err(VerifierError::UnknownVerification(id.clone()));
        };
        if entry.code != code {
            return Ok(None);
        }
        Ok(issued.remove(id).map(|entry| entry.phone_number))
    }
}
