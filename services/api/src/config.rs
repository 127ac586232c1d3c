use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub openclaw_bin: PathBuf,
    pub gateway_token: SecretString,
    pub agent_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// This function will look for a `.env` file in the current directory
    /// and load the following variables:
    ///
    /// *   `BIND_ADDRESS`: (Optional) The address and port to listen on. Defaults to "0.0.0.0:18790".
    /// *   `OPENCLAW_BIN`: (Optional) Path to the OpenClaw CLI. Defaults to "/usr/bin/openclaw".
    /// *   `OPENCLAW_GATEWAY_TOKEN`: The gateway token handed to every agent process. Required.
    /// *   `OPENCLAW_TIMEOUT_SECS`: (Optional) How long one agent turn may take. Defaults to 120.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:18790".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let openclaw_bin =
            PathBuf::from(lookup("OPENCLAW_BIN").unwrap_or_else(|| "/usr/bin/openclaw".to_string()));

        // The token has no default.
        let gateway_token = lookup("OPENCLAW_GATEWAY_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar("OPENCLAW_GATEWAY_TOKEN".to_string()))?;

        let timeout_str = lookup("OPENCLAW_TIMEOUT_SECS").unwrap_or_else(|| "120".to_string());
        let agent_timeout = match timeout_str.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidValue(
                    "OPENCLAW_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                ));
            }
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            openclaw_bin,
            gateway_token,
            agent_timeout,
            log_level,
        })
    }
}
