//! Payload hashing and transaction verification

pub mod hash;
pub mod verify;

pub use hash::{bytes_checksum, canonical_hash};
pub use verify::{Verification, VerificationService};
