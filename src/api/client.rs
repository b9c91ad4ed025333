//! The generic resource client

use crate::api::models::HealthStatus;
use crate::auth::{MemoryTokenStore, TokenStore};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Called with the configured login path after a 401 cleared the tokens
pub type UnauthorizedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Client for the CRUD resources of the API
///
/// Every request carries `Authorization: Bearer <token>` when the token store
/// holds an access token. A 401 answer clears both stored tokens and fires the
/// unauthorized hook before the error is returned.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("authenticated", &self.is_authenticated())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            config,
            transport,
            tokens,
            on_unauthorized: None,
        }
    }

    /// HTTP through `reqwest`, tokens kept in memory
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(MemoryTokenStore::new()),
        ))
    }

    pub fn on_unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.tokens.access_token()
    }

    /// Forget both tokens
    pub fn clear_auth(&self) -> Result<()> {
        self.tokens.clear()
    }

    /// Issue one request and parse the answer
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path below the API base URL, e.g. `/contact`
    /// * `query` - Query parameters, in order
    /// * `body` - JSON body, if any
    ///
    /// # Returns
    ///
    /// The parsed body; an empty body parses as JSON `null`. Non-2xx answers
    /// become [`ApiError::RequestFailed`] carrying the server's `error` string
    /// when there is one.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let mut request = HttpRequest::new(method, self.config.endpoint(path));
        request.query = query;
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer(&token);
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        log::debug!("{} {}", method, path);
        let response = self.transport.send(request, None).await?;

        if response.status == 401 {
            let err = response.into_error("Request");
            self.handle_unauthorized(path);
            return Err(err);
        }
        if !response.is_success() {
            let err = response.into_error("Request");
            log::debug!("{} {} failed: {}", method, path, err);
            return Err(err);
        }

        response.json()
    }

    fn handle_unauthorized(&self, path: &str) {
        log::warn!("Unauthorized response from {}, clearing stored tokens", path);
        if let Err(e) = self.tokens.clear() {
            log::warn!("Failed to clear stored tokens: {}", e);
        }
        if let Some(hook) = &self.on_unauthorized {
            hook(&self.config.login_path);
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Get, path, Vec::new(), None).await
    }

    pub(crate) async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.request(Method::Get, path, query, None).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        self.request(Method::Post, path, Vec::new(), body).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::Put, path, Vec::new(), Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Delete, path, Vec::new(), None).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    /// Whether the health endpoint answers at all
    pub async fn check_availability(&self) -> bool {
        match self.health().await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("API not available: {}", e);
                false
            }
        }
    }
}

pub(crate) fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Option<serde_json::Value>> {
    serde_json::to_value(body)
        .map(Some)
        .map_err(ApiError::from)
}
