//! Server configuration.

use std::time::Duration;

use crate::NightfallError;

const HOST_VAR: &str = "NIGHTFALL_HOST";
const PORT_VAR: &str = "NIGHTFALL_PORT";
const IDLE_TIMEOUT_VAR: &str = "NIGHTFALL_IDLE_TIMEOUT_SECS";

/// Where to listen and how long to keep idle connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to, `host:port`.
    pub bind_addr: String,

    /// A connection that sends no request for this long is closed.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Reads `NIGHTFALL_HOST`, `NIGHTFALL_PORT` and
    /// `NIGHTFALL_IDLE_TIMEOUT_SECS`, falling back to the defaults for
    /// unset variables.
    ///
    /// # Errors
    /// [`NightfallError::Config`] if the port or timeout is not a number.
    pub fn from_env() -> Result<Self, NightfallError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NightfallError> {
        let host = lookup(HOST_VAR).unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match lookup(PORT_VAR) {
            Some(raw) => raw
                .parse()
                .map_err(|_| NightfallError::Config(format!("{PORT_VAR}={raw} is not a port")))?,
            None => 8080,
        };
        let idle_secs: u64 = match lookup(IDLE_TIMEOUT_VAR) {
            Some(raw) => raw.parse().map_err(|_| {
                NightfallError::Config(format!("{IDLE_TIMEOUT_VAR}={raw} is not a number of seconds"))
            })?,
            None => 60,
        };

        Ok(Self {
            bind_addr: format!("{host}:{port}"),
            idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}
