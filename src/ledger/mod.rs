//! Ledger backends
//!
//! One contract, three variants: the local mirror (self-trusted JSON file),
//! the attested external service, and the ephemeral in-memory stand-in.
//! Selection happens once at construction via [`factory::create_ledger_backend`].

pub mod attested;
pub mod contract;
pub mod ephemeral;
pub mod factory;
pub mod local;

pub use attested::AttestedLedger;
pub use contract::{DeliveryStatus, LedgerBackend, LedgerEntry, Receipt};
pub use ephemeral::EphemeralLedger;
pub use factory::create_ledger_backend;
pub use local::LocalMirrorLedger;
