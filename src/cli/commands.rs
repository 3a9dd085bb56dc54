//! CLI command implementations
//!
//! Startup order for `serve`: validate config, connect, ensure the patient
//! table, bind, serve. A failure at any step before serving is fatal.

use crate::config::{load_env_file, DatabaseConfig};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::store::{MySqlStore, PatientStore};

use super::args::{Cli, Command};
use super::errors::{StartupError, StartupResult};
use super::logging::init_logging;

/// Entry point: load `.env`, parse arguments, initialise logging, run.
pub fn run() -> StartupResult<()> {
    load_env_file()?;

    let cli = Cli::parse_args();
    init_logging(cli.log_format)?;
    run_command(cli.command)
}

/// Run a parsed command on a fresh multi-threaded runtime
pub fn run_command(command: Command) -> StartupResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    runtime.block_on(async move {
        match command {
            Command::Serve { http, database } => {
                serve(http.into_config(), database.into_config()).await
            }
            Command::EnsureSchema { database } => {
                ensure_schema(&database.into_config()).await.map(|_| ())
            }
        }
    })
}

/// Validate the config and open the single shared connection
pub async fn connect(config: &DatabaseConfig) -> StartupResult<MySqlStore> {
    config.validate()?;

    if config.is_insecure_tls() {
        tracing::warn!(
            host = %config.host,
            "database TLS certificate verification is disabled"
        );
    }

    let store = MySqlStore::connect(&config.connect_options())
        .await
        .map_err(StartupError::Connect)?;

    tracing::info!(
        event = "DB_CONNECTED",
        host = %config.host,
        port = config.port,
        database = %config.database,
        ssl_mode = %config.ssl_mode,
        "connected to database"
    );

    Ok(store)
}

/// Connect and create the patient table if absent
pub async fn ensure_schema(config: &DatabaseConfig) -> StartupResult<MySqlStore> {
    let store = connect(config).await?;
    store.ensure_schema().await.map_err(StartupError::Schema)?;
    Ok(store)
}

/// Connect, ensure the schema, then serve until Ctrl-C
pub async fn serve(http: HttpServerConfig, database: DatabaseConfig) -> StartupResult<()> {
    let store = ensure_schema(&database).await?;

    HttpServer::new(http, store)
        .start()
        .await
        .map_err(StartupError::Serve)
}
