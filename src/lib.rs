//! patient-gateway - JSON over HTTP in front of a single MySQL table
//!
//! Three layers, leaves first:
//! - [`store`] runs SQL against the one shared connection
//! - [`gateway`] classifies requests and enforces the statement allow-list
//! - [`http_server`] dispatches classified requests and renders JSON

pub mod cli;
pub mod config;
pub mod gateway;
pub mod http_server;
pub mod store;
