//! HarvestHub core.
//!
//! Every component is handed an `Arc<dyn DocumentStore>` and talks to no
//! other backend:
//!
//! - [`RegistrationGuard`] creates records, one per mobile per role
//! - [`InventoryReconciler`] applies quantity and crop edits and persists
//!   them as full-list replaces
//! - [`MatchingEngine`] finds records by exact crop name or by district
//! - [`AccountDirectory`], [`LoginFlow`] and [`ProfileEditor`] cover login
//!   and profile edits
//!
//! [`CoreServices`] wires them all to one store and one cancellation token.

mod account;
mod cancel;
mod config;
mod error;
mod inventory;
mod location;
mod login;
mod matching;
mod registration;

pub use account::{AccountDirectory, ProfileEditor};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, ErrorKind, InputError};
pub use inventory::{Inventory, InventoryReconciler};
pub use location::{
    Coordinates, LocationError, LocationProvider, PERMISSION_DENIED, format_coordinates,
    location_field,
};
pub use login::{
    LoginFlow, MemoryVerifier, PendingVerification, PhoneVerifier, VerificationId, VerifierError,
};
pub use matching::MatchingEngine;
pub use registration::{RegistrationGuard, RegistrationState};

use harvest_store::DocumentStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// All core components bound to one store, one verifier and one
/// cancellation token.
pub struct CoreServices {
    pub registration: RegistrationGuard,
    pub inventory: InventoryReconciler,
    pub matching: MatchingEngine,
    pub directory: AccountDirectory,
    pub profiles: ProfileEditor,
    pub login: LoginFlow,
    config: CoreConfig,
    cancel: CancellationToken,
}

impl CoreServices {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn PhoneVerifier>,
        config: CoreConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let directory = AccountDirectory::with_cancellation(store.clone(), cancel.child_token());
        Self {
            registration: RegistrationGuard::with_cancellation(store.clone(), cancel.child_token()),
            inventory: InventoryReconciler::with_cancellation(store.clone(), cancel.child_token()),
            matching: MatchingEngine::with_cancellation(
                store.clone(),
                config.clone(),
                cancel.child_token(),
            ),
            profiles: ProfileEditor::with_cancellation(store, cancel.child_token()),
            login: LoginFlow::with_cancellation(
                directory.clone(),
                verifier,
                config.clone(),
                cancel.child_token(),
            ),
            directory,
            config,
            cancel,
        }
    }

    /// Stamps registrations and profile location refreshes from `provider`.
    pub fn with_location(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.registration = self.registration.with_location(provider.clone());
        self.profiles = self.profiles.with_location(provider);
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Cancels every in-flight and future operation of every component.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
