//! Client configuration
//!
//! [`ClientConfig`] is built once and shared by the upload client and the
//! resource client. [`ValidationRules`] holds the upload allow-lists that
//! gate every item before it leaves the process.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base URL used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8082/api";

/// 10 MiB, the server's own upload limit
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Content types the server converts to CDN images
pub const DEFAULT_ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upload allow-lists, checked before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Accepted declared content types (exact match)
    #[serde(rename = "allowed-types")]
    pub allowed_types: Vec<String>,

    /// Largest accepted declared size in bytes
    #[serde(rename = "max-file-size")]
    pub max_file_size: u64,

    /// Largest number of items in one batch
    #[serde(rename = "max-batch-size")]
    pub max_batch_size: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the allow-list
    pub fn allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Add one content type to the allow-list
    pub fn allow_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        if !self.allowed_types.contains(&content_type) {
            self.allowed_types.push(content_type);
        }
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn max_batch_size(mut self, count: usize) -> Self {
        self.max_batch_size = count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.allowed_types.is_empty() {
            return Err(ApiError::invalid_parameter(
                "allowed_types",
                "At least one content type must be allowed",
            ));
        }

        if self.max_file_size == 0 {
            return Err(ApiError::invalid_parameter(
                "max_file_size",
                "Maximum file size must be greater than 0",
            ));
        }

        if self.max_batch_size == 0 {
            return Err(ApiError::invalid_parameter(
                "max_batch_size",
                "Maximum batch size must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Configuration for the DKL API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to (default: http://localhost:8082/api)
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Request timeout applied by the HTTP transport (default: 30 seconds)
    #[serde(rename = "timeout-secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Login entry point handed to the unauthorized hook (default: /login)
    #[serde(rename = "login-path")]
    pub login_path: String,

    /// CDN account used for image URL generation
    #[serde(rename = "cloud-name", skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,

    /// Upload validation rules
    #[serde(default)]
    pub upload: ValidationRules,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            cloud_name: None,
            upload: ValidationRules::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL; a trailing slash is dropped
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Leave deadlines entirely to the server
    pub fn no_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn cloud_name(mut self, name: impl Into<String>) -> Self {
        self.cloud_name = Some(name.into());
        self
    }

    pub fn upload_rules(mut self, rules: ValidationRules) -> Self {
        self.upload = rules;
        self
    }

    /// Build a configuration from the process environment
    ///
    /// Reads `DKL_API_BASE_URL` (falling back to `API_BASE_URL`),
    /// `DKL_CLOUD_NAME` and `DKL_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let base_url = lookup("DKL_API_BASE_URL")
            .or_else(|| lookup("API_BASE_URL"))
            .filter(|v| !v.trim().is_empty());
        if let Some(url) = base_url {
            config = config.api_base_url(url.trim());
        }

        if let Some(name) = lookup("DKL_CLOUD_NAME").filter(|v| !v.trim().is_empty()) {
            config.cloud_name = Some(name.trim().to_string());
        }

        if let Some(raw) = lookup("DKL_API_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ApiError::config_error(format!("DKL_API_TIMEOUT_SECS is not a number: {}", e))
            })?;
            config.timeout_secs = Some(secs);
        }

        config.validate()?;
        log::debug!("Loaded client configuration for {}", config.api_base_url);
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ApiError::from)
    }

    /// Create a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ApiError::from)
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ApiError::config_error("API base URL cannot be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ApiError::config_error(format!(
                "API base URL must be absolute (http:// or https://): {}",
                base
            )));
        }

        if self.timeout_secs == Some(0) {
            return Err(ApiError::invalid_parameter(
                "timeout_secs",
                "Timeout must be greater than 0",
            ));
        }

        self.upload.validate()
    }

    /// Full URL for an endpoint path such as `/images/upload`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}
