//! Server configuration management.
//!
//! Consolidates the hosting shell's own environment variable reads —
//! just the bind address — and defers everything about game rules and
//! timeouts to [`tablehall::config::EngineConfig`], which the engine
//! validates on its own.

use std::net::SocketAddr;

use tablehall::config::{ConfigError as EngineConfigError, EngineConfig};

/// Complete server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Engine-level configuration (blinds, turn timeout, reconnect grace).
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns an error if the engine configuration fails validation.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| std::env::var("SERVER_BIND").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_else(|| {
                "127.0.0.1:6969"
                    .parse()
                    .expect("default bind address is valid")
            });

        let engine = EngineConfig::from_env()?;

        Ok(Self { bind, engine })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Engine(#[from] EngineConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_override_takes_priority_over_env() {
        // SAFETY: tests run single-threaded within this module; no other
        // thread mutates process env concurrently with this call.
        unsafe {
            std::env::remove_var("SERVER_BIND");
        }
        let config = ServerConfig::from_env(Some("0.0.0.0:9999".parse().unwrap())).unwrap();
        assert_eq!(config.bind.port(), 9999);
    }

    #[test]
    fn default_bind_is_loopback_6969() {
        unsafe {
            std::env::remove_var("SERVER_BIND");
        }
        let config = ServerConfig::from_env(None).unwrap();
        assert_eq!(config.bind, "127.0.0.1:6969".parse().unwrap());
    }

    #[test]
    fn engine_config_error_is_propagated() {
        unsafe {
            std::env::set_var("TABLEHALL_BIG_BLIND", "1");
            std::env::set_var("TABLEHALL_SMALL_BLIND", "5");
        }
        let err = ServerConfig::from_env(None).unwrap_err();
        assert!(matches!(err, ConfigError::Engine(_)));
        unsafe {
            std::env::remove_var("TABLEHALL_BIG_BLIND");
            std::env::remove_var("TABLEHALL_SMALL_BLIND");
        }
    }
}
