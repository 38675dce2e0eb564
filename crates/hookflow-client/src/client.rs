//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::api::{
    ActionsApi, AsyncExecutionsApi, EventsApi, RuleExecutionsApi, SequencesApi,
    WorkflowExecutionsApi, WorkflowRulesApi, WorkflowsApi,
};
use crate::error::{Error, ErrorEnvelope, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API root used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Hookflow API client.
///
/// Provides typed access to every resource the console manages. Cloning is
/// cheap; clones share one connection pool.
///
/// # Example
///
/// ```no_run
/// use hookflow_client::HookflowClient;
///
/// # async fn example() -> hookflow_client::Result<()> {
/// let client = HookflowClient::builder()
///     .base_url("http://localhost:8000/api")
///     .build()?;
///
/// let events = client.events().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HookflowClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests, always ending in `/`.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl std::fmt::Debug for HookflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookflowClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl HookflowClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client pointing at the default local API root.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_BASE_URL).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the events API.
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.clone())
    }

    /// Access the sequences API.
    pub fn sequences(&self) -> SequencesApi {
        SequencesApi::new(self.clone())
    }

    /// Access the workflows API.
    pub fn workflows(&self) -> WorkflowsApi {
        WorkflowsApi::new(self.clone())
    }

    /// Access the workflow rules API.
    pub fn workflow_rules(&self) -> WorkflowRulesApi {
        WorkflowRulesApi::new(self.clone())
    }

    /// Access the workflow executions API.
    pub fn workflow_executions(&self) -> WorkflowExecutionsApi {
        WorkflowExecutionsApi::new(self.clone())
    }

    /// Access the rule executions API.
    pub fn rule_executions(&self) -> RuleExecutionsApi {
        RuleExecutionsApi::new(self.clone())
    }

    /// Access the actions API.
    pub fn actions(&self) -> ActionsApi {
        ActionsApi::new(self.clone())
    }

    /// Access the async executions API.
    pub fn async_executions(&self) -> AsyncExecutionsApi {
        AsyncExecutionsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    ///
    /// The backend routes every resource with a trailing slash, so one is
    /// appended when missing.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let path = if path.is_empty() || path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };
        self.inner.base_url.join(&path).map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request where a 404 means "nothing there yet".
    pub(crate) async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>> {
        match self.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request without a body.
    pub(crate) async fn post_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "PUT");
        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(%url, "DELETE");
        let response = self
            .inner
            .http
            .delete(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(extract_error(response).await);
        }

        Ok(())
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(extract_error(response).await)
        }
    }
}

/// Extract an error from a failed response.
///
/// The body is read as text first so that a non-JSON error page still yields
/// an `Api` error carrying the status code.
async fn extract_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();

    if status == StatusCode::NOT_FOUND {
        let message = envelope
            .and_then(|e| e.message_text())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Error::NotFound(message);
    }

    match envelope {
        Some(envelope) => envelope.into_error(status.as_u16()),
        None => Error::Api {
            status: status.as_u16(),
            error: None,
            detail: None,
            rule_errors: Vec::new(),
        },
    }
}

/// Builder for creating a HookflowClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the API root (for example `http://localhost:8000/api`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the authentication token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HookflowClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Config("Invalid auth token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("hookflow-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(HookflowClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/api")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_url_building_appends_trailing_slash() {
        let client = HookflowClient::localhost().unwrap();

        let url = client.url("events").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/events/");

        let url = client.url("/events/42/test-payload").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/events/42/test-payload/");

        let url = client.url("events/import/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/events/import/");
    }
}
