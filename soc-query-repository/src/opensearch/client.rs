//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchBackend`
//! using the OpenSearch Rust client, and the connector that builds one
//! from a `ConnectionConfig`.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::headers::{HeaderValue, AUTHORIZATION},
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, Transport, TransportBuilder},
    indices::IndicesGetAliasParts,
    OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::SocQueryError;
use crate::interfaces::{BackendConnector, SearchBackend};
use crate::opensearch::queries::alias_names;

/// Builds an [`OpenSearchBackend`] per query.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSearchConnector;

impl OpenSearchConnector {
    pub fn new() -> Self {
        Self
    }

    /// Build the HTTP transport for the configured node.
    ///
    /// An API key takes precedence over basic credentials when both are set,
    /// since both would be sent as the `Authorization` header.
    fn build_transport(config: &ConnectionConfig) -> Result<Transport, SocQueryError> {
        let url = config.url();
        let parsed_url = Url::parse(&url)
            .map_err(|e| SocQueryError::connection(format!("Invalid cluster URL {}: {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).timeout(config.request_timeout());

        if !config.verify_certs {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        match (config.api_key(), config.basic_credentials()) {
            (Some(api_key), basic) => {
                if basic.is_some() {
                    warn!("Both API key and basic credentials configured; using the API key");
                }
                let mut value = HeaderValue::from_str(&format!("ApiKey {}", api_key))
                    .map_err(|e| SocQueryError::connection(format!("Invalid API key: {}", e)))?;
                value.set_sensitive(true);
                builder = builder.header(AUTHORIZATION, value);
            }
            (None, Some((username, password))) => {
                builder = builder.auth(Credentials::Basic(
                    username.to_string(),
                    password.to_string(),
                ));
            }
            (None, None) => {}
        }

        builder
            .build()
            .map_err(|e| SocQueryError::connection(e.to_string()))
    }
}

impl BackendConnector for OpenSearchConnector {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn SearchBackend>, SocQueryError> {
        let transport = Self::build_transport(config)?;

        info!(
            url = %config.url(),
            verify_certs = config.verify_certs,
            timeout_secs = config.request_timeout_secs,
            "Created OpenSearch client"
        );

        Ok(Box::new(OpenSearchBackend {
            client: OpenSearch::new(transport),
            url: config.url(),
        }))
    }
}

/// A single-query connection to an OpenSearch cluster.
pub struct OpenSearchBackend {
    client: OpenSearch,
    url: String,
}

impl OpenSearchBackend {
    /// Turn a response into its JSON body, or an error for non-success statuses.
    async fn read_json(response: Response) -> Result<Value, SocQueryError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Request failed");
            return Err(SocQueryError::backend(status.as_u16(), error_body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SocQueryError::parse(e.to_string()))
    }
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn list_aliases(&self) -> Result<Vec<String>, SocQueryError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Index(&["*"]))
            .send()
            .await
            .map_err(|e| SocQueryError::connection(e.to_string()))?;

        let body = Self::read_json(response).await?;
        let names = alias_names(&body)?;

        debug!(count = names.len(), "Listed aliases");
        Ok(names)
    }

    #[instrument(skip(self, body), fields(url = %self.url))]
    async fn search(&self, index: &str, body: Value, size: u32) -> Result<Value, SocQueryError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .size(i64::from(size))
            .send()
            .await
            .map_err(|e| SocQueryError::connection(e.to_string()))?;

        let body = Self::read_json(response).await?;

        info!(index = %index, "Search completed");
        Ok(body)
    }

    /// Logs the release. The transport and its pooled sockets are freed when
    /// the owning `Box` is dropped right after this call.
    fn close(&self) {
        debug!(url = %self.url, "Closing OpenSearch client");
    }
}
