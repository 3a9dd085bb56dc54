//! HTTP Server Configuration
//!
//! Listener address and the request body ceiling for the gateway.

/// Largest `/insert` body accepted by default (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Listener and request limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    /// Interface to bind
    pub host: String,

    pub port: u16,

    /// Bodies above this size are rejected with 413 before they are buffered
    pub max_body_bytes: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HttpServerConfig {
    /// Default listener on the given port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Replace the body ceiling
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// `host:port` as handed to the listener
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_builders() {
        let config = HttpServerConfig::with_port(8080).with_max_body_bytes(64);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.max_body_bytes, 64);
    }
}
