//! Engine-level configuration, loaded from environment variables.
//!
//! Mirrors the teacher's `pp_server::config::ServerConfig::from_env`
//! pattern (`parse_env_or` helper, a `validate()` pass run after
//! loading, a `thiserror` error enum) but scoped to what the engine core
//! itself needs — no JWT/pepper/database fields, since those belong to
//! the hosting shell, not the game-state engine.

use std::time::Duration;

use thiserror::Error;

/// Default seat cap per lobby.
pub const DEFAULT_MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_players: usize,
    pub small_blind: u32,
    pub big_blind: u32,
    pub turn_timeout: Duration,
    pub reconnect_grace: Duration,
}

impl EngineConfig {
    /// Loads configuration from the environment, falling back to the
    /// teacher-style defaults on anything unset or unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_players: parse_env_or("TABLEHALL_MAX_PLAYERS", DEFAULT_MAX_PLAYERS),
            small_blind: parse_env_or("TABLEHALL_SMALL_BLIND", 5),
            big_blind: parse_env_or("TABLEHALL_BIG_BLIND", 10),
            turn_timeout: Duration::from_secs(parse_env_or("TABLEHALL_TURN_TIMEOUT_SECS", 30)),
            reconnect_grace: Duration::from_secs(parse_env_or("TABLEHALL_RECONNECT_GRACE_SECS", 15)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.big_blind <= self.small_blind {
            return Err(ConfigError::Invalid {
                var: "TABLEHALL_BIG_BLIND".to_string(),
                reason: format!("must be greater than small blind ({})", self.small_blind),
            });
        }
        if !(2..=23).contains(&self.max_players) {
            return Err(ConfigError::Invalid {
                var: "TABLEHALL_MAX_PLAYERS".to_string(),
                reason: "must be between 2 and 23 (max players with a 52-card deck)".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            small_blind: 5,
            big_blind: 10,
            turn_timeout: Duration::from_secs(30),
            reconnect_grace: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn big_blind_must_exceed_small_blind() {
        let mut config = EngineConfig::default();
        config.big_blind = config.small_blind;
        assert!(config.validate().is_err());
    }
}
