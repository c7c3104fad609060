//! CLI interface and argument parsing
//!
//! Command-line interface for MedLedger using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// MedLedger - Drug catalog import with a verifiable ledger trail
#[derive(Parser, Debug)]
#[command(name = "medledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "medledger.toml", env = "MEDLEDGER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDLEDGER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a drug catalog file into a target
    Import(commands::import::ImportArgs),

    /// Verify a recorded transaction against the ledger
    Verify(commands::verify::VerifyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
