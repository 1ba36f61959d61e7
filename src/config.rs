//! Server configuration.
//!
//! Configuration is loaded from environment variables, each with a
//! default matching the classic deployment (port 3333, ten clients,
//! rooms idle for a week).

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3333";

/// Default maximum simultaneous clients.
pub const DEFAULT_MAX_CLIENTS: usize = 10;

/// Default room idle time before deletion: 7 days.
pub const DEFAULT_ROOM_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Default per-client outbound queue length.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Default longest accepted inbound line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Chat server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP listen address (default: "0.0.0.0:3333").
    pub bind_address: String,

    /// Roster capacity; joins beyond it are rejected.
    pub max_clients: usize,

    /// How long a room may go without a broadcast before deletion.
    pub room_ttl: Duration,

    /// Lines buffered per client before the lobby waits on it.
    pub outbound_buffer: usize,

    /// Longest line a client may send; longer ends the session.
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_clients: DEFAULT_MAX_CLIENTS,
            room_ttl: Duration::from_secs(DEFAULT_ROOM_TTL_SECONDS),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("CHAT_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let max_clients = parse_positive(vars, "CHAT_MAX_CLIENTS", DEFAULT_MAX_CLIENTS)?;
        let room_ttl_seconds =
            parse_positive(vars, "CHAT_ROOM_TTL_SECONDS", DEFAULT_ROOM_TTL_SECONDS)?;
        let outbound_buffer =
            parse_positive(vars, "CHAT_OUTBOUND_BUFFER", DEFAULT_OUTBOUND_BUFFER)?;
        let max_line_length =
            parse_positive(vars, "CHAT_MAX_LINE_LENGTH", DEFAULT_MAX_LINE_LENGTH)?;

        Ok(Config {
            bind_address,
            max_clients,
            room_ttl: Duration::from_secs(room_ttl_seconds),
            outbound_buffer,
            max_line_length,
        })
    }
}

/// Parse an optional numeric variable that must be greater than zero.
fn parse_positive<T>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = vars.get(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue(key.to_string(), raw.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new()).unwrap();

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.max_clients, 10);
        assert_eq!(config.room_ttl, Duration::from_secs(604_800));
        assert_eq!(config.outbound_buffer, DEFAULT_OUTBOUND_BUFFER);
        assert_eq!(config.max_line_length, DEFAULT_MAX_LINE_LENGTH);
    }

    #[test]
    fn test_from_vars_overrides() {
        let vars = HashMap::from([
            ("CHAT_BIND_ADDRESS".to_string(), "127.0.0.1:4000".to_string()),
            ("CHAT_MAX_CLIENTS".to_string(), "1".to_string()),
            ("CHAT_ROOM_TTL_SECONDS".to_string(), "30".to_string()),
            ("CHAT_OUTBOUND_BUFFER".to_string(), "8".to_string()),
        ]);

        let config = Config::from_vars(&vars).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:4000");
        assert_eq!(config.max_clients, 1);
        assert_eq!(config.room_ttl, Duration::from_secs(30));
        assert_eq!(config.outbound_buffer, 8);
    }

    #[test]
    fn test_from_vars_rejects_zero_capacity() {
        let vars = HashMap::from([("CHAT_MAX_CLIENTS".to_string(), "0".to_string())]);

        let err = Config::from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains("CHAT_MAX_CLIENTS"));
    }

    #[test]
    fn test_from_vars_rejects_garbage() {
        let vars = HashMap::from([("CHAT_ROOM_TTL_SECONDS".to_string(), "soon".to_string())]);

        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(key, _)) if key == "CHAT_ROOM_TTL_SECONDS"
        ));
    }
}
