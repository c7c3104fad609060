//! Business logic: import orchestration and verification

pub mod import;
pub mod verification;
