//! # HTTP Server
//!
//! Owns the store handle and the listener configuration, and builds the
//! router that every request goes through.

use std::io;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::dispatch::{dispatch, GatewayState};
use super::headers::with_gateway_headers;
use crate::store::PatientStore;

/// HTTP server for the patient gateway
pub struct HttpServer<S: PatientStore> {
    config: HttpServerConfig,
    store: Arc<S>,
}

impl<S: PatientStore + 'static> HttpServer<S> {
    /// Create a server that takes ownership of the store
    pub fn new(config: HttpServerConfig, store: S) -> Self {
        Self::with_shared_store(config, Arc::new(store))
    }

    /// Create a server around an already shared store
    pub fn with_shared_store(config: HttpServerConfig, store: Arc<S>) -> Self {
        Self { config, store }
    }

    /// Build the router: one fallback handler, tracing, then gateway headers outermost
    pub fn router(&self) -> Router {
        let router = Router::new()
            .fallback(dispatch::<S>)
            .with_state(GatewayState::new(
                self.store.clone(),
                self.config.max_body_bytes,
            ))
            .layer(TraceLayer::new_for_http());

        with_gateway_headers(router)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(event = "SERVER_LISTENING", addr = %local_addr, "gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
