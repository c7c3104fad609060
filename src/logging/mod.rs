//! Logging and observability
//!
//! Structured logging with JSON-formatted output, configurable log levels,
//! and local file logging with rotation.
//!
//! # Example
//!
//! ```no_run
//! use medledger::logging::init_logging;
//! use medledger::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an import operation
#[macro_export]
macro_rules! log_import_start {
    ($target_id:expr, $filename:expr) => {
        tracing::info!(
            target_id = %$target_id,
            filename = %$filename,
            "Starting import"
        );
    };
}

/// Log the completion of an import operation
#[macro_export]
macro_rules! log_import_complete {
    ($count:expr, $duration_ms:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration_ms,
            "Import completed"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
