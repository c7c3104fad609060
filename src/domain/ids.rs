//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow between the import
//! orchestrator, the ledger backends and the repositories. Each type
//! rejects empty values at construction so downstream code never has
//! to re-validate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident, $label:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a string
            ///
            /// Returns `Err` if the value is empty or whitespace-only.
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(format!("{} cannot be empty", $label));
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Import job identifier, stable for the job's lifetime
    JobId,
    "Job ID"
);

identifier!(
    /// Identifier of the catalog or mapping set being populated
    TargetId,
    "Target ID"
);

identifier!(
    /// Ledger transaction identifier, assigned by the backend at insert time
    TransactionId,
    "Transaction ID"
);

impl JobId {
    /// Generates a fresh random job identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
