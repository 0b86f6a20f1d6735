//! HTTP client for the extension registry API.
//!
//! The client is stateless apart from its base URL: every call issues exactly
//! one GET, nothing is cached, and concurrent calls are independent. Non-2xx
//! responses become a [`ResponseError`] without any interpretation of the
//! status code; deciding which statuses are tolerable is left to callers.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use super::types::SearchResponse;
use super::{
    ExtensionDetails, ExtensionId, ExtensionSummary, RegistryError, RegistryResult, ResponseError,
};
use crate::core::{Emitter, Subscription};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of [`RegistryClient`].
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; only failures to get a response at all are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url`.
    async fn get(&self, url: &str) -> RegistryResult<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`.
///
/// No timeout is configured; the transport defaults apply.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default `vsxreg/<version>` user agent.
    pub fn new() -> RegistryResult<Self> {
        Self::with_user_agent(&format!("vsxreg/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Create a transport with a custom user agent.
    pub fn with_user_agent(user_agent: &str) -> RegistryResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RegistryError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> RegistryResult<HttpResponse> {
        let network = |e: reqwest::Error| RegistryError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(network)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(network)?;

        Ok(HttpResponse { status, body })
    }
}

/// Notification fired when the registry base URL changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryUrlChanged {
    /// The new base URL
    pub url: String,
}

/// Registry API client.
pub struct RegistryClient {
    /// Registry base URL; the API lives under `<base>/api`
    base_url: RwLock<String>,

    /// HTTP transport
    transport: Arc<dyn HttpTransport>,

    /// Base URL change notifications
    on_did_change: Emitter<RegistryUrlChanged>,
}

impl RegistryClient {
    /// Create a client using `reqwest`.
    pub fn new(base_url: impl Into<String>) -> RegistryResult<Self> {
        Ok(Self::with_transport(base_url, Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { base_url: RwLock::new(base_url.into()), transport, on_did_change: Emitter::new() }
    }

    /// Current base URL.
    pub fn base_url(&self) -> String {
        self.base_url.read().clone()
    }

    /// Point the client at another registry.
    ///
    /// Fires the change notification only when the URL actually changed.
    pub fn set_base_url(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let mut current = self.base_url.write();
            if *current == url {
                return;
            }
            *current = url.clone();
        }
        tracing::debug!(url = %url, "Registry URL changed");
        self.on_did_change.fire(&RegistryUrlChanged { url });
    }

    /// Listen for base URL changes.
    pub fn on_did_change(
        &self,
        listener: impl Fn(&RegistryUrlChanged) + Send + Sync + 'static,
    ) -> Subscription {
        self.on_did_change.subscribe(listener)
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.base_url.read();
        format!("{}/api/{}", base.trim_end_matches('/'), path)
    }

    /// URL `search` requests for `query`. Empty queries append nothing.
    pub fn search_url(&self, query: Option<&str>) -> String {
        let url = self.api_url("-/search");
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{url}?query={}", urlencoding::encode(query)),
            None => url,
        }
    }

    /// URL `get_extension` requests for `id`.
    pub fn extension_url(&self, id: &ExtensionId) -> String {
        self.api_url(&id.to_path())
    }

    /// Search the registry.
    ///
    /// Only the first page the server returns is surfaced.
    pub async fn search(&self, query: Option<&str>) -> RegistryResult<Vec<ExtensionSummary>> {
        let url = self.search_url(query);
        let response: SearchResponse = self.fetch_json(&url).await?;
        Ok(response.extensions)
    }

    /// Fetch the full record of one extension.
    pub async fn get_extension(&self, id: &ExtensionId) -> RegistryResult<ExtensionDetails> {
        self.fetch_json(&self.extension_url(id)).await
    }

    /// GET an arbitrary URL and return its body.
    pub async fn fetch_text(&self, url: &str) -> RegistryResult<String> {
        Ok(self.run(url).await?.body)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> RegistryResult<T> {
        let response = self.run(url).await?;
        serde_json::from_str(&response.body)
            .map_err(|e| RegistryError::Decode { url: url.to_string(), message: e.to_string() })
    }

    async fn run(&self, url: &str) -> RegistryResult<HttpResponse> {
        tracing::debug!(url = url, "GET");
        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(ResponseError { url: url.to_string(), response }.into());
        }
        Ok(response)
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("base_url", &*self.base_url.read())
            .field("on_did_change", &self.on_did_change)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that always answers with the same response.
    struct Fixed {
        response: HttpResponse,
        requests: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self { response: HttpResponse::new(status, body), requests: Mutex::default() })
        }
    }

    #[async_trait]
    impl HttpTransport for Fixed {
        async fn get(&self, url: &str) -> RegistryResult<HttpResponse> {
            self.requests.lock().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_search_url_shapes() {
        let client = RegistryClient::with_transport("https://open-vsx.org/", Fixed::new(200, ""));

        assert_eq!(client.search_url(None), "https://open-vsx.org/api/-/search");
        assert_eq!(client.search_url(Some("")), client.search_url(None));
        assert_eq!(
            client.search_url(Some("c sharp")),
            "https://open-vsx.org/api/-/search?query=c%20sharp"
        );
    }

    #[test]
    fn test_extension_url() {
        let client = RegistryClient::with_transport("https://open-vsx.org", Fixed::new(200, ""));
        let id = ExtensionId::new("Redhat", "Java");
        assert_eq!(client.extension_url(&id), "https://open-vsx.org/api/redhat/java");
    }

    #[tokio::test]
    async fn test_search_returns_server_order() {
        let body = r#"{"extensions":[
            {"namespace":"b","name":"second","version":"1.0.0"},
            {"namespace":"a","name":"first","version":"1.0.0"}
        ]}"#;
        let transport = Fixed::new(200, body);
        let client = RegistryClient::with_transport("http://registry", transport.clone());

        let result = client.search(Some("x")).await.unwrap();
        let names: Vec<_> = result.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
        assert_eq!(*transport.requests.lock(), ["http://registry/api/-/search?query=x"]);
    }

    #[tokio::test]
    async fn test_non_success_is_response_error() {
        let client = RegistryClient::with_transport("http://registry", Fixed::new(404, "gone"));

        let err = client.get_extension(&ExtensionId::new("acme", "foo")).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            RegistryError::Response(e) => {
                assert_eq!(e.url, "http://registry/api/acme/foo");
                assert_eq!(e.response.body, "gone");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_surfaces_server_errors() {
        let client = RegistryClient::with_transport("http://registry", Fixed::new(503, "busy"));
        let err = client.fetch_text("https://cdn.example.com/README.md").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let client = RegistryClient::with_transport("http://registry", Fixed::new(200, "<html>"));
        let err = client.search(None).await.unwrap_err();
        assert!(matches!(err, RegistryError::Decode { .. }));
    }

    #[test]
    fn test_set_base_url_notifies_on_change_only() {
        let client = RegistryClient::with_transport("http://a", Fixed::new(200, ""));
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        let _sub = client.on_did_change(move |e| {
            assert_eq!(e.url, "http://b");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.set_base_url("http://a");
        client.set_base_url("http://b");
        client.set_base_url("http://b");

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(client.base_url(), "http://b");
        assert_eq!(client.search_url(None), "http://b/api/-/search");
    }
}
