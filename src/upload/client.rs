//! The upload client and its single-transfer primitive

use crate::config::{ClientConfig, ValidationRules};
use crate::error::{ApiError, Result};
use crate::transport::{
    HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, TransferProgress, Transport,
};
use crate::upload::progress::PercentTracker;
use crate::upload::types::UploadOptions;
use futures::future::{self, Either};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client for the image endpoints
///
/// Holds its own bearer token, set with [`set_auth_token`](Self::set_auth_token).
/// Unlike [`ApiClient`](crate::api::ApiClient) it does not clear anything on a
/// 401; the error is simply returned.
#[derive(Clone)]
pub struct ImageUploadClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    auth_token: Option<String>,
}

impl std::fmt::Debug for ImageUploadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploadClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("rules", &self.config.upload)
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

impl ImageUploadClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            auth_token: None,
        }
    }

    /// Validate the configuration and talk HTTP through `reqwest`
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.set_auth_token(token);
        self
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    pub fn clear_auth_token(&mut self) {
        self.auth_token = None;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.config.upload
    }

    /// Send one multipart form to `endpoint` and parse the reply
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path below the API base URL, e.g. `/images/upload`
    /// * `form` - The multipart body
    /// * `options` - Progress, success and error callbacks plus cancellation
    ///
    /// # Returns
    ///
    /// The parsed success body. Every failure is also passed to
    /// `options.on_error` before it is returned.
    pub async fn upload_with_progress<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: MultipartForm,
        options: &UploadOptions,
    ) -> Result<T> {
        let request = HttpRequest::post(self.config.endpoint(endpoint)).multipart(form);
        self.transfer(request, options).await
    }

    pub(crate) async fn transfer<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        options: &UploadOptions,
    ) -> Result<T> {
        let result = self.exchange(request, options).await;
        if let Err(e) = &result {
            options.report_error(e);
        }
        result
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        options: &UploadOptions,
    ) -> Result<T> {
        let request = self.authorize(request);
        let operation = request.path().to_string();
        log::debug!("{} {}", request.method, operation);

        let progress = options.on_progress.clone().map(|callback| {
            let tracker = PercentTracker::new();
            Arc::new(move |loaded: u64, total: Option<u64>| {
                if let Some(percent) = tracker.advance(loaded, total) {
                    callback(percent);
                }
            }) as TransferProgress
        });

        let response = match &options.cancel {
            None => self.transport.send(request, progress).await?,
            Some(token) => {
                // a cancel issued between transfers applies to this one
                if token.reset() {
                    log::info!("Upload to {} cancelled before it started", operation);
                    return Err(ApiError::cancelled(operation));
                }

                let send = self.transport.send(request, progress);
                match future::select(send, token.cancelled()).await {
                    Either::Left((result, _)) => {
                        // a cancel that lost the race still belongs to this transfer
                        if token.reset() {
                            log::debug!("Cancel for {} arrived after the response", operation);
                        }
                        result?
                    }
                    Either::Right(((), _)) => {
                        token.reset();
                        log::info!("Upload to {} cancelled", operation);
                        return Err(ApiError::cancelled(operation));
                    }
                }
            }
        };

        let value = parse_upload_response(response)?;
        let parsed = serde_json::from_value::<T>(value.clone())
            .map_err(|e| ApiError::invalid_response(e.to_string()))?;

        if let Some(callback) = &options.on_success {
            callback(&value);
        }
        Ok(parsed)
    }

    /// A plain JSON request against the image endpoints
    pub(crate) async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let request = self
            .authorize(request)
            .header("Content-Type", "application/json");
        log::debug!("{} {}", request.method, request.path());

        let response = self.transport.send(request, None).await?;
        if !response.is_success() {
            return Err(response.into_error("Request"));
        }
        response.json()
    }

    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match &self.auth_token {
            Some(token) => request.bearer(token),
            None => request,
        }
    }
}

fn parse_upload_response(response: HttpResponse) -> Result<serde_json::Value> {
    if !response.is_success() {
        let err = response.into_error("Upload");
        log::debug!("Upload rejected: {}", err);
        return Err(err);
    }

    serde_json::from_slice(&response.body).map_err(|e| ApiError::invalid_response(e.to_string()))
}
