//! Query adapter implementation.
//!
//! This module provides the client application code uses to run a
//! query-string search against a Security Onion cluster. Every call builds
//! its own backend connection and releases it before returning.

use std::ops::Deref;

use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::config::ConnectionConfig;
use crate::errors::SocQueryError;
use crate::index_resolver::IndexResolver;
use crate::interfaces::{BackendConnector, SearchBackend};
use crate::opensearch::{build_query_string_body, OpenSearchConnector};
use soc_query_shared::{QueryRequest, SortClause};

/// Owns a backend for the duration of one query and closes it on drop.
///
/// Dropping covers every exit path, including errors and a caller that
/// abandons the future mid-request.
struct ConnectionGuard {
    backend: Box<dyn SearchBackend>,
}

impl ConnectionGuard {
    fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

impl Deref for ConnectionGuard {
    type Target = dyn SearchBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.backend.close();
    }
}

/// Runs query-string searches against a Security Onion cluster.
///
/// The client holds no connection between calls, so it can be shared
/// freely across tasks.
///
/// # Example
///
/// ```ignore
/// use soc_query_repository::{ConnectionConfig, SocQueryClient};
/// use soc_query_shared::QueryRequest;
///
/// let config = ConnectionConfig::new("securityonion", 9200).with_api_key(key);
/// let client = SocQueryClient::new(config);
///
/// let request = QueryRequest::new("event.module:zeek AND destination.port:53").with_size(50);
/// let response = client.execute_query(&request).await?;
/// println!("{}", response["hits"]["total"]["value"]);
/// ```
pub struct SocQueryClient {
    connector: Box<dyn BackendConnector>,
    config: ConnectionConfig,
}

impl SocQueryClient {
    /// Create a client that talks to OpenSearch.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(Box::new(OpenSearchConnector::new()), config)
    }

    /// Create a client with a custom backend connector.
    pub fn with_connector(connector: Box<dyn BackendConnector>, config: ConnectionConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Run a query with positional arguments.
    pub async fn query(
        &self,
        query_string: &str,
        size: u32,
        sort: Option<Vec<SortClause>>,
    ) -> Result<Value, SocQueryError> {
        let mut request = QueryRequest::new(query_string).with_size(size);
        request.sort = sort;
        self.execute_query(&request).await
    }

    /// Execute a query and return the backend response unmodified.
    ///
    /// Steps:
    /// 1. Build a backend from the configuration
    /// 2. Resolve the index: the request's index, else the configured default,
    ///    else one picked from the alias listing
    /// 3. Wrap the text in a `query_string` clause and search with `size`
    ///
    /// Failures are logged and returned unchanged; nothing is retried. The
    /// backend is closed exactly once whichever way the call ends.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The full search response
    /// * `Err(SocQueryError)` - If the query is blank, the index cannot be
    ///   resolved, or the search fails
    #[instrument(skip(self, request), fields(size = request.size))]
    pub async fn execute_query(&self, request: &QueryRequest) -> Result<Value, SocQueryError> {
        if request.is_blank() {
            return Err(SocQueryError::invalid_query("query_string must not be empty"));
        }

        // TODO: attach `sort` (default `@timestamp` desc) once the desired ordering is agreed.
        if let Some(sort) = request.sort.as_ref().filter(|sort| !sort.is_empty()) {
            debug!(
                clauses = sort.len(),
                "Sort clauses are not applied; results use backend relevance order"
            );
        }

        let backend = match self.connector.connect(&self.config) {
            Ok(backend) => ConnectionGuard::new(backend),
            Err(e) => {
                error!(error = %e, "SOC query failed");
                return Err(e);
            }
        };

        let result = self.run(&*backend, request).await;
        if let Err(ref e) = result {
            error!(error = %e, "SOC query failed");
        }

        result
    }

    async fn run(
        &self,
        backend: &dyn SearchBackend,
        request: &QueryRequest,
    ) -> Result<Value, SocQueryError> {
        let pattern = request
            .index
            .as_deref()
            .unwrap_or(&self.config.default_index);
        let index = IndexResolver::new(backend).resolve(pattern).await?;

        let body = build_query_string_body(&request.query_string);
        debug!(index = %index, size = request.size, "Executing search");

        backend.search(&index, body, request.size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// A recorded search call.
    #[derive(Debug, Clone)]
    struct SearchCall {
        index: String,
        body: Value,
        size: u32,
    }

    /// Shared state observed by the tests.
    #[derive(Default)]
    struct MockState {
        connects: AtomicUsize,
        closes: AtomicUsize,
        list_calls: AtomicUsize,
        searches: Mutex<Vec<SearchCall>>,
    }

    /// Mock connector handing out backends that report into `MockState`.
    struct MockConnector {
        state: Arc<MockState>,
        aliases: Result<Vec<String>, SocQueryError>,
        response: Result<Value, SocQueryError>,
        connect_error: Option<SocQueryError>,
        search_hangs: bool,
    }

    impl MockConnector {
        fn new(state: Arc<MockState>) -> Self {
            Self {
                state,
                aliases: Ok(vec![]),
                response: Ok(json!({ "hits": { "total": { "value": 0 }, "hits": [] } })),
                connect_error: None,
                search_hangs: false,
            }
        }

        fn with_aliases(mut self, aliases: &[&str]) -> Self {
            self.aliases = Ok(aliases.iter().map(|a| a.to_string()).collect());
            self
        }

        fn with_alias_error(mut self, err: SocQueryError) -> Self {
            self.aliases = Err(err);
            self
        }

        fn with_response(mut self, response: Result<Value, SocQueryError>) -> Self {
            self.response = response;
            self
        }

        fn with_connect_error(mut self, err: SocQueryError) -> Self {
            self.connect_error = Some(err);
            self
        }

        fn with_hanging_search(mut self) -> Self {
            self.search_hangs = true;
            self
        }
    }

    impl BackendConnector for MockConnector {
        fn connect(
            &self,
            _config: &ConnectionConfig,
        ) -> Result<Box<dyn SearchBackend>, SocQueryError> {
            if let Some(ref err) = self.connect_error {
                return Err(err.clone());
            }
            self.state.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockBackend {
                state: self.state.clone(),
                aliases: self.aliases.clone(),
                response: self.response.clone(),
                search_hangs: self.search_hangs,
            }))
        }
    }

    struct MockBackend {
        state: Arc<MockState>,
        aliases: Result<Vec<String>, SocQueryError>,
        response: Result<Value, SocQueryError>,
        search_hangs: bool,
    }

    #[async_trait]
    impl SearchBackend for MockBackend {
        async fn list_aliases(&self) -> Result<Vec<String>, SocQueryError> {
            self.state.list_calls.fetch_add(1, Ordering::SeqCst);
            self.aliases.clone()
        }

        async fn search(
            &self,
            index: &str,
            body: Value,
            size: u32,
        ) -> Result<Value, SocQueryError> {
            self.state.searches.lock().await.push(SearchCall {
                index: index.to_string(),
                body,
                size,
            });
            if self.search_hangs {
                std::future::pending::<()>().await;
            }
            self.response.clone()
        }

        fn close(&self) {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn create_client(connector: MockConnector, config: ConnectionConfig) -> SocQueryClient {
        SocQueryClient::with_connector(Box::new(connector), config)
    }

    #[tokio::test]
    async fn test_returns_response_unmodified() {
        let state = Arc::new(MockState::default());
        let response = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [
                    {
                        "_index": "so-zeek-2024.05.01",
                        "_id": "abc",
                        "_source": { "event": { "module": "zeek" } }
                    }
                ]
            }
        });
        let connector = MockConnector::new(state.clone()).with_response(Ok(response.clone()));
        let client = create_client(connector, ConnectionConfig::default());

        let result = client
            .execute_query(&QueryRequest::new("event.module:zeek"))
            .await
            .unwrap();

        assert_eq!(result, response);
    }

    #[tokio::test]
    async fn test_default_index_used_verbatim() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone()).with_aliases(&["logs-raw"]);
        let client = create_client(connector, ConnectionConfig::default());

        client.query("alert", 20, None).await.unwrap();

        let searches = state.searches.lock().await;
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].index, "so-*");
        assert_eq!(searches[0].size, 20);
        assert_eq!(
            searches[0].body,
            json!({ "query": { "query_string": { "query": "alert" } } })
        );
        assert_eq!(state.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_index_bypasses_resolution() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone()).with_aliases(&["logs-raw"]);
        let config = ConnectionConfig::default().with_default_index("");
        let client = create_client(connector, config);

        let request = QueryRequest::new("rule.name:*").with_index("so-detection");
        client.execute_query(&request).await.unwrap();

        assert_eq!(state.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.searches.lock().await[0].index, "so-detection");
    }

    #[tokio::test]
    async fn test_empty_default_index_resolves_from_aliases() {
        let state = Arc::new(MockState::default());
        let connector =
            MockConnector::new(state.clone()).with_aliases(&["so-events", "other", "logs-raw"]);
        let config = ConnectionConfig::default().with_default_index("");
        let client = create_client(connector, config);

        client.query("*", 10, None).await.unwrap();

        assert_eq!(state.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.searches.lock().await[0].index, "so-events");
    }

    #[tokio::test]
    async fn test_alias_error_skips_search() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone())
            .with_alias_error(SocQueryError::connection("connection refused"));
        let config = ConnectionConfig::default().with_default_index("");
        let client = create_client(connector, config);

        let err = client.query("alert", 20, None).await.unwrap_err();

        assert!(matches!(err, SocQueryError::ConnectionError(_)));
        assert!(state.searches.lock().await.is_empty());
        assert_eq!(state.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_size_zero_is_forwarded() {
        let state = Arc::new(MockState::default());
        let client = create_client(MockConnector::new(state.clone()), ConnectionConfig::default());

        let result = client.query("alert", 0, None).await.unwrap();

        assert_eq!(state.searches.lock().await[0].size, 0);
        assert_eq!(result["hits"]["hits"], json!([]));
    }

    #[tokio::test]
    async fn test_sort_is_not_attached() {
        let state = Arc::new(MockState::default());
        let client = create_client(MockConnector::new(state.clone()), ConnectionConfig::default());

        client
            .query("alert", 20, Some(vec![SortClause::desc("@timestamp")]))
            .await
            .unwrap();

        let searches = state.searches.lock().await;
        assert!(searches[0].body.get("sort").is_none());
    }

    #[tokio::test]
    async fn test_closes_once_on_success() {
        let state = Arc::new(MockState::default());
        let client = create_client(MockConnector::new(state.clone()), ConnectionConfig::default());

        client.query("alert", 20, None).await.unwrap();
        client.query("alert", 20, None).await.unwrap();

        assert_eq!(state.connects.load(Ordering::SeqCst), 2);
        assert_eq!(state.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_closes_once_on_search_failure() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone()).with_response(Err(SocQueryError::backend(
            400,
            "query_shard_exception",
        )));
        let client = create_client(connector, ConnectionConfig::default());

        let err = client.query("source.ip:[", 20, None).await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(state.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closes_once_when_caller_gives_up() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone()).with_hanging_search();
        let client = create_client(connector, ConnectionConfig::default());

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            client.query("alert", 20, None),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(state.searches.lock().await.len(), 1);
        assert_eq!(state.connects.load(Ordering::SeqCst), 1);
        assert_eq!(state.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_connect() {
        let state = Arc::new(MockState::default());
        let client = create_client(MockConnector::new(state.clone()), ConnectionConfig::default());

        let err = client.query("   ", 20, None).await.unwrap_err();

        assert!(matches!(err, SocQueryError::InvalidQuery(_)));
        assert_eq!(state.connects.load(Ordering::SeqCst), 0);
        assert_eq!(state.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connect_error_is_returned() {
        let state = Arc::new(MockState::default());
        let connector = MockConnector::new(state.clone())
            .with_connect_error(SocQueryError::connection("Invalid cluster URL"));
        let client = create_client(connector, ConnectionConfig::default());

        let err = client.query("alert", 20, None).await.unwrap_err();

        assert!(matches!(err, SocQueryError::ConnectionError(_)));
        assert_eq!(state.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_queries_use_separate_connections() {
        let state = Arc::new(MockState::default());
        let client = Arc::new(create_client(
            MockConnector::new(state.clone()),
            ConnectionConfig::default(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move { client.query(&format!("event.id:{}", i), 5, None).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(state.connects.load(Ordering::SeqCst), 4);
        assert_eq!(state.closes.load(Ordering::SeqCst), 4);
        assert_eq!(state.searches.lock().await.len(), 4);
    }
}
