//! Server configuration, loaded from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use covey_town::TownConfig;
use covey_transport::DEFAULT_HANDSHAKE_TIMEOUT;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_WS_ADDR: &str = "0.0.0.0:8082";

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything needed to start a [`CoveyServer`](crate::CoveyServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address of the REST listener.
    pub http_addr: String,
    /// Address of the realtime (WebSocket) listener.
    pub ws_addr: String,
    /// How long a realtime peer may take to send its upgrade request.
    pub handshake_timeout: Duration,
    /// Settings applied to every town.
    pub town: TownConfig,
    /// Comma-separated allowed origins, or `*`. `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            ws_addr: DEFAULT_WS_ADDR.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            town: TownConfig::default(),
            cors_allowed_origins: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `COVEY_HTTP_ADDR` | `0.0.0.0:8081` |
    /// | `COVEY_WS_ADDR` | `0.0.0.0:8082` |
    /// | `COVEY_WS_HANDSHAKE_TIMEOUT_SECS` | `10` |
    /// | `COVEY_TOWN_CAPACITY` | `50` |
    /// | `CORS_ALLOWED_ORIGINS` | unset (no CORS) |
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("COVEY_HTTP_ADDR") {
            config.http_addr = parse_addr("COVEY_HTTP_ADDR", addr)?;
        }
        if let Some(addr) = lookup("COVEY_WS_ADDR") {
            config.ws_addr = parse_addr("COVEY_WS_ADDR", addr)?;
        }
        if let Some(raw) = lookup("COVEY_WS_HANDSHAKE_TIMEOUT_SECS") {
            config.handshake_timeout = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "COVEY_WS_HANDSHAKE_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            };
        }
        if let Some(raw) = lookup("COVEY_TOWN_CAPACITY") {
            config.town.capacity = match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "COVEY_TOWN_CAPACITY",
                        value: raw,
                    });
                }
            };
        }
        config.cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(config)
    }
}

fn parse_addr(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    match trimmed.parse::<SocketAddr>() {
        Ok(_) => Ok(trimmed.to_string()),
        Err(_) => Err(ConfigError::Invalid { var, value }),
    }
}
