//! Connection configuration for the query adapter.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Default cluster host name.
pub const DEFAULT_HOST: &str = "securityonion";

/// Default cluster port.
pub const DEFAULT_PORT: u16 = 9200;

/// Default index pattern searched when the caller names none.
pub const DEFAULT_INDEX: &str = "so-*";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Settings used to build a client for every query.
///
/// The configuration is read once when the adapter is constructed and is
/// never mutated afterwards; each query builds a fresh client from it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Cluster host name or address.
    pub host: String,
    /// Cluster port.
    pub port: u16,
    /// Basic auth username. Only used together with `password`.
    pub username: Option<String>,
    /// Basic auth password. Only used together with `username`.
    pub password: Option<String>,
    /// API key sent as `Authorization: ApiKey <key>`.
    pub api_key: Option<String>,
    /// Use HTTPS instead of HTTP.
    pub use_tls: bool,
    /// Verify the server's TLS certificate.
    pub verify_certs: bool,
    /// Index pattern used when a request names no index. An empty pattern
    /// makes the adapter pick one from the cluster's alias listing.
    pub default_index: String,
    /// Seconds to wait for a response.
    pub request_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            api_key: None,
            use_tls: true,
            verify_certs: true,
            default_index: DEFAULT_INDEX.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given host and port with all other fields defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the basic auth credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Enable or disable HTTPS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Enable or disable certificate verification.
    pub fn with_verify_certs(mut self, verify_certs: bool) -> Self {
        self.verify_certs = verify_certs;
        self
    }

    /// Set the default index pattern.
    pub fn with_default_index(mut self, default_index: impl Into<String>) -> Self {
        self.default_index = default_index.into();
        self
    }

    /// Set the request timeout in seconds.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// `https` when TLS is enabled, `http` otherwise.
    pub fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// The cluster base URL, e.g. `https://securityonion:9200`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Username and password, only when both are present and non-empty.
    pub fn basic_credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// The API key, when present and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("use_tls", &self.use_tls)
            .field("verify_certs", &self.verify_certs)
            .field("default_index", &self.default_index)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
