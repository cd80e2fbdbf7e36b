//! Environment-driven server configuration.
//!
//! Everything is read once at startup from the process environment (with
//! `.env` loaded by the binary beforehand). Missing variables fall back to
//! development defaults; malformed ones fail startup instead of being
//! silently ignored.

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Bind address.
pub const ENV_HOST: &str = "ZAPBRIDGE_HOST";
/// Bind port.
pub const ENV_PORT: &str = "ZAPBRIDGE_PORT";
/// Public base URL used to build callback/verify links.
pub const ENV_PUBLIC_URL: &str = "ZAPBRIDGE_PUBLIC_URL";
/// Comma-separated relay list.
pub const ENV_RELAYS: &str = "ZAPBRIDGE_RELAYS";
/// Bridge signing key (hex or bech32 secret). Generated when unset.
pub const ENV_SECRET_KEY: &str = "ZAPBRIDGE_SECRET_KEY";
/// Handshake bound in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "ZAPBRIDGE_CONNECT_TIMEOUT_SECS";
/// Tool call bound in seconds.
pub const ENV_CALL_TIMEOUT_SECS: &str = "ZAPBRIDGE_CALL_TIMEOUT_SECS";

/// Relays used when none are configured.
pub const DEFAULT_RELAYS: [&str; 2] = ["wss://relay.damus.io", "wss://nos.lol"];

/// Configuration error raised during startup.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// Environment variable name
        var: &'static str,
        /// Why parsing failed
        reason: String,
    },
}

/// Server configuration snapshot.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Public base URL override; derived from host/port when absent.
    pub public_url: Option<String>,
    /// Relay set shared by all wallet connections.
    pub relays: Vec<String>,
    /// Bridge signing key material, if configured.
    pub secret_key: Option<String>,
    /// Bound on the connection handshake.
    pub connect_timeout: Duration,
    /// Bound on a tool call round-trip.
    pub call_timeout: Duration,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_parse(ENV_HOST, IpAddr::from([127, 0, 0, 1]))?;
        let port = env_parse(ENV_PORT, 3000u16)?;
        let public_url = env::var(ENV_PUBLIC_URL)
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let relays = match env::var(ENV_RELAYS) {
            Ok(raw) => split_relays(&raw),
            Err(_) => DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
        };
        let secret_key = env::var(ENV_SECRET_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let connect_timeout = Duration::from_secs(env_parse(ENV_CONNECT_TIMEOUT_SECS, 20u64)?);
        let call_timeout = Duration::from_secs(env_parse(ENV_CALL_TIMEOUT_SECS, 30u64)?);

        Ok(Self {
            host,
            port,
            public_url,
            relays,
            secret_key,
            connect_timeout,
            call_timeout,
        })
    }

    /// Base URL for callback/verify links.
    pub fn base_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|err| ConfigError::Invalid {
            var,
            reason: format!("{err}"),
        }),
        Err(_) => Ok(default),
    }
}

fn split_relays(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|relay| relay.trim().to_string())
        .filter(|relay| !relay.is_empty())
        .collect()
}
