//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with
//! --test-threads=1 to avoid interference between tests.

use medledger::config::{load_config, LedgerTarget};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("MEDLEDGER_APPLICATION_LOG_LEVEL");
    std::env::remove_var("MEDLEDGER_IMPORT_BATCH_SIZE");
    std::env::remove_var("MEDLEDGER_LEDGER_LOCAL_PATH");
    std::env::remove_var("TEST_LEDGER_SECRET");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_LEDGER_SECRET", "s3cr3t");

    let file = write_config(
        r#"
environment = "staging"

[application]
name = "medledger"
log_level = "debug"

[ledger]
target = "attested"

[ledger.attested]
endpoint = "https://my-ledger.confidential-ledger.azure.com"
tenant_id = "00000000-0000-0000-0000-000000000000"
client_id = "11111111-1111-1111-1111-111111111111"
client_secret = "${TEST_LEDGER_SECRET}"
poll_interval_ms = 100
max_poll_attempts = 10

[import]
batch_size = 1000

[logging]
local_enabled = true
local_path = "/tmp/medledger-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.ledger.target, LedgerTarget::Attested);
    assert_eq!(config.import.batch_size, 1000);
    assert!(config.logging.local_enabled);

    let attested = config.ledger.attested.unwrap();
    assert_eq!(attested.max_poll_attempts, 10);
    assert_eq!(attested.client_secret.expose_secret().as_str(), "s3cr3t");
    // unset optionals fall back to defaults
    assert_eq!(attested.request_timeout_seconds, 30);

    cleanup_env_vars();
}

#[test]
fn test_minimal_config_gets_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
name = "medledger"

[ledger]
target = "ephemeral"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.import.batch_size, 500);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_overrides_take_precedence() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MEDLEDGER_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("MEDLEDGER_IMPORT_BATCH_SIZE", "42");
    std::env::set_var("MEDLEDGER_LEDGER_LOCAL_PATH", "/var/lib/override.json");

    let file = write_config(
        r#"
[application]
name = "medledger"
log_level = "info"

[ledger]
target = "local"

[ledger.local]
path = "/var/lib/medledger/ledger.json"

[import]
batch_size = 500
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.import.batch_size, 42);
    assert_eq!(config.ledger.local.unwrap().path, "/var/lib/override.json");

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_fails_loudly() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
name = "medledger"

[ledger]
target = "attested"

[ledger.attested]
endpoint = "https://my-ledger.confidential-ledger.azure.com"
tenant_id = "t"
client_id = "c"
client_secret = "${TEST_LEDGER_SECRET}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_LEDGER_SECRET"));
}

#[test]
fn test_target_without_section_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
name = "medledger"

[ledger]
target = "local"
"#,
    );

    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_ephemeral_rejected_in_production() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "production"

[application]
name = "medledger"

[ledger]
target = "ephemeral"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("production"));
}
