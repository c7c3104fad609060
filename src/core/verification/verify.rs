//! Transaction verification
//!
//! Given a transaction id, recompute the hash of the locally stored
//! payload and compare it byte-for-byte against the hash embedded in the
//! ledger's record. Pure read side: nothing is written, and repeated or
//! concurrent calls for the same id are safe.

use crate::adapters::repository::traits::TransactionRepository;
use crate::core::verification::hash::canonical_hash;
use crate::domain::ids::TransactionId;
use crate::domain::result::Result;
use crate::ledger::contract::LedgerBackend;
use std::sync::Arc;

/// Outcome of verifying one transaction
///
/// "Tamper detected" and "we never heard of this id" are different facts;
/// callers must not conflate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Local payload and ledgered hash match
    Verified,
    /// The hashes differ: one side was mutated after the fact
    HashMismatch,
    /// No local payload exists for this id
    UnknownTransaction,
    /// The ledger knows the id but the entry has not reached finality
    NotFinalized,
}

impl Verification {
    /// Collapses the outcome to the boolean callers ultimately act on
    pub fn is_valid(self) -> bool {
        self == Verification::Verified
    }
}

/// Read-side verifier over the transaction repository and the ledger
pub struct VerificationService {
    transactions: Arc<dyn TransactionRepository>,
    ledger: Arc<dyn LedgerBackend>,
}

impl VerificationService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        ledger: Arc<dyn LedgerBackend>,
    ) -> Self {
        Self {
            transactions,
            ledger,
        }
    }

    /// Verifies the transaction with the given id
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (repository or ledger unreachable)
    /// surface as errors; a mismatch or unknown id is a normal outcome.
    pub async fn verify(&self, transaction_id: &TransactionId) -> Result<Verification> {
        let Some(local_payload) = self
            .transactions
            .get_payload_by_transaction_id(transaction_id)
            .await?
        else {
            tracing::debug!(transaction_id = %transaction_id, "No local payload for id");
            return Ok(Verification::UnknownTransaction);
        };

        let Some(entry) = self.ledger.retrieve(transaction_id).await? else {
            tracing::warn!(
                transaction_id = %transaction_id,
                "Local payload exists but the ledger has no such entry"
            );
            return Ok(Verification::UnknownTransaction);
        };

        let Some(ledgered_hash) = entry.content_hash.filter(|_| entry.payload.is_some()) else {
            tracing::debug!(transaction_id = %transaction_id, "Entry not yet finalized");
            return Ok(Verification::NotFinalized);
        };

        // Verification trusts only the hash stored in the ledger; the
        // local payload is rehashed from scratch
        let recomputed = canonical_hash(&local_payload);
        if recomputed == ledgered_hash {
            Ok(Verification::Verified)
        } else {
            tracing::warn!(
                transaction_id = %transaction_id,
                "Content hash mismatch - local payload does not match ledger"
            );
            Ok(Verification::HashMismatch)
        }
    }
}
