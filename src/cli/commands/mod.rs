//! CLI command implementations

pub mod import;
pub mod validate;
pub mod verify;
