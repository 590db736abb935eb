//! Connection settings loaded from the environment.

use std::env;
use std::str::FromStr;

use tracing::info;

use crate::AppError;
use soc_query_repository::ConnectionConfig;

/// Cluster host name.
pub const ENV_HOST: &str = "SO_HOST";
/// Cluster port.
pub const ENV_PORT: &str = "SO_PORT";
/// Basic auth username.
pub const ENV_USERNAME: &str = "SO_USERNAME";
/// Basic auth password.
pub const ENV_PASSWORD: &str = "SO_PASSWORD";
/// API key for `Authorization: ApiKey` auth.
pub const ENV_API_KEY: &str = "SO_API_KEY";
/// Use HTTPS.
pub const ENV_USE_TLS: &str = "SO_USE_TLS";
/// Verify TLS certificates.
pub const ENV_VERIFY_CERTS: &str = "SO_VERIFY_CERTS";
/// Default index pattern.
pub const ENV_DEFAULT_INDEX: &str = "SO_DEFAULT_INDEX";
/// Request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "SO_REQUEST_TIMEOUT";

/// Loads a [`ConnectionConfig`] from environment variables.
pub struct Settings;

impl Settings {
    /// Build the connection configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Environment Variables
    ///
    /// - `SO_HOST`: cluster host (default: securityonion)
    /// - `SO_PORT`: cluster port (default: 9200)
    /// - `SO_USERNAME` / `SO_PASSWORD`: basic auth, used only when both are set
    /// - `SO_API_KEY`: API key, preferred over basic auth
    /// - `SO_USE_TLS`: use HTTPS (default: true)
    /// - `SO_VERIFY_CERTS`: verify certificates (default: true)
    /// - `SO_DEFAULT_INDEX`: index pattern (default: so-*); empty to pick from aliases
    /// - `SO_REQUEST_TIMEOUT`: seconds (default: 60)
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionConfig)` - The loaded configuration
    /// * `Err(AppError)` - If a numeric or boolean variable cannot be parsed
    pub fn from_env() -> Result<ConnectionConfig, AppError> {
        dotenv::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;

        info!(
            host = %config.host,
            port = config.port,
            use_tls = config.use_tls,
            verify_certs = config.verify_certs,
            default_index = %config.default_index,
            "Loaded connection settings"
        );

        Ok(config)
    }

    /// Build the connection configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<ConnectionConfig, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConnectionConfig::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_value(ENV_PORT, &port)?;
        }
        config.username = lookup(ENV_USERNAME);
        config.password = lookup(ENV_PASSWORD);
        config.api_key = lookup(ENV_API_KEY);
        if let Some(use_tls) = lookup(ENV_USE_TLS) {
            config.use_tls = parse_bool(ENV_USE_TLS, &use_tls)?;
        }
        if let Some(verify_certs) = lookup(ENV_VERIFY_CERTS) {
            config.verify_certs = parse_bool(ENV_VERIFY_CERTS, &verify_certs)?;
        }
        if let Some(default_index) = lookup(ENV_DEFAULT_INDEX) {
            config.default_index = default_index;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = parse_value(ENV_REQUEST_TIMEOUT, &timeout)?;
        }

        Ok(config)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", key, raw, e)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::config(format!(
            "Invalid {} '{}': expected true or false",
            key, raw
        ))),
    }
}
