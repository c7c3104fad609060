//! Ledger backend factory
//!
//! Selects and constructs the configured backend once, at startup. The
//! import orchestrator and verification service receive the resulting
//! trait object and never branch on backend identity.

use crate::config::{LedgerConfig, LedgerTarget};
use crate::domain::errors::MedLedgerError;
use crate::domain::result::Result;
use crate::ledger::attested::AttestedLedger;
use crate::ledger::contract::LedgerBackend;
use crate::ledger::ephemeral::EphemeralLedger;
use crate::ledger::local::LocalMirrorLedger;
use std::sync::Arc;

/// Creates the ledger backend selected by the configuration
///
/// # Errors
///
/// Returns a configuration error if the section matching the selected
/// target is missing (also caught earlier by config validation) or if the
/// attested client cannot be built.
pub fn create_ledger_backend(config: &LedgerConfig) -> Result<Arc<dyn LedgerBackend>> {
    match config.target {
        LedgerTarget::Local => {
            let local = config.local.as_ref().ok_or_else(|| {
                MedLedgerError::Configuration(
                    "ledger.local configuration is required when ledger.target = 'local'"
                        .to_string(),
                )
            })?;

            tracing::info!(path = %local.path, "Creating local mirror ledger");
            Ok(Arc::new(LocalMirrorLedger::new(&local.path)))
        }
        LedgerTarget::Attested => {
            let attested = config.attested.as_ref().ok_or_else(|| {
                MedLedgerError::Configuration(
                    "ledger.attested configuration is required when ledger.target = 'attested'"
                        .to_string(),
                )
            })?;

            tracing::info!(endpoint = %attested.endpoint, "Creating attested ledger client");
            Ok(Arc::new(AttestedLedger::new(attested.clone())?))
        }
        LedgerTarget::Ephemeral => {
            tracing::info!("Creating ephemeral in-memory ledger");
            Ok(Arc::new(EphemeralLedger::new()))
        }
    }
}
