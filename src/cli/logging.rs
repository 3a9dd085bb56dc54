//! Log subscriber setup
//!
//! `RUST_LOG` controls filtering (default `info`); `--log-format` picks JSON
//! lines or human-readable text.

use tracing_subscriber::EnvFilter;

use super::args::LogFormat;
use super::errors::{StartupError, StartupResult};

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber
pub fn init_logging(format: LogFormat) -> StartupResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| StartupError::Logging(e.to_string()))
}
