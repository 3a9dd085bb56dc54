//! # Request Gateway
//!
//! Classifies inbound HTTP requests and enforces the statement allow-list
//! before anything reaches the store.
//!
//! # Routes
//!
//! - `POST /insert` - `{"query": "INSERT ..."}` or `{"data": [[name, birth_date], ...]}`
//! - `GET /query?sql=...` - `SELECT` or `INSERT` only
//! - `OPTIONS *` - preflight, never classified further

mod classify;
mod errors;
mod policy;

pub use classify::{classify, Classified, Route};
pub use errors::{ErrorResponse, GatewayError, GatewayResult};
pub use policy::{starts_with_keyword, StatementPolicy};
