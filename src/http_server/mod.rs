//! # Gateway HTTP Server
//!
//! Dispatcher and HTTP plumbing for the patient gateway. A single fallback
//! handler receives every request so that unmatched routes still pass
//! through classification and come back as JSON.
//!
//! # Endpoints
//!
//! - `POST /insert` - direct INSERT or bulk rows
//! - `GET /query?sql=...` - SELECT or INSERT
//! - `OPTIONS *` - preflight

pub mod config;
pub mod dispatch;
pub mod headers;
pub mod server;

pub use config::{HttpServerConfig, DEFAULT_MAX_BODY_BYTES};
pub use dispatch::InsertResponse;
pub use server::HttpServer;
