//! CLI module for the patient gateway
//!
//! Provides command-line interface for:
//! - serve: connect, ensure the patient table, serve HTTP
//! - ensure-schema: connect, ensure the patient table, exit

mod args;
mod commands;
mod errors;
mod logging;

pub use args::{Cli, Command, DatabaseArgs, HttpArgs, LogFormat};
pub use commands::{connect, ensure_schema, run, run_command, serve};
pub use errors::{StartupError, StartupResult};
pub use logging::init_logging;
