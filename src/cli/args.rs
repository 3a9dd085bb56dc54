//! CLI argument definitions using clap
//!
//! Commands:
//! - patient-gateway serve [--host] [--port] [--max-body-bytes] <database flags>
//! - patient-gateway ensure-schema <database flags>
//!
//! Every flag falls back to an environment variable, and a `.env` file in
//! the working directory is loaded before parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DatabaseConfig, SslMode};
use crate::http_server::{HttpServerConfig, DEFAULT_MAX_BODY_BYTES};

/// Patient gateway - JSON over HTTP in front of the patient table
#[derive(Parser, Debug)]
#[command(name = "patient-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ensure the patient table exists, then serve HTTP until Ctrl-C
    Serve {
        #[command(flatten)]
        http: HttpArgs,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Ensure the patient table exists and exit
    EnsureSchema {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// HTTP listener flags
#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Host to bind to
    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl HttpArgs {
    pub fn into_config(self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host,
            port: self.port,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Database connection flags
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    #[arg(id = "db_host", long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(id = "db_port", long = "db-port", env = "DB_PORT", default_value_t = 3306)]
    pub port: u16,

    #[arg(long = "db-user", env = "DB_USER")]
    pub user: String,

    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long = "db-name", env = "DB_NAME")]
    pub database: String,

    /// DISABLED or REQUIRED
    #[arg(long = "ssl-mode", env = "SSL_MODE", default_value = "DISABLED", value_parser = parse_ssl_mode)]
    pub ssl_mode: SslMode,

    /// CA bundle for verifying the database server certificate
    #[arg(long = "ssl-ca", env = "DB_SSL_CA")]
    pub ssl_ca: Option<PathBuf>,

    /// Encrypt without verifying the server certificate (insecure)
    #[arg(long = "ssl-accept-invalid-certs", env = "DB_SSL_ACCEPT_INVALID_CERTS")]
    pub accept_invalid_certs: bool,
}

fn parse_ssl_mode(value: &str) -> Result<SslMode, String> {
    value.parse().map_err(|e: crate::config::ConfigError| e.to_string())
}

impl DatabaseArgs {
    pub fn into_config(self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.host,
            port: self.port,
            user: self.user,
            password: self.password,
            database: self.database,
            ssl_mode: self.ssl_mode,
            ssl_ca: self.ssl_ca,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
