//! Error handling for the DKL API client
//!
//! This module defines the error type shared by the upload helpers, the
//! resource client and the token stores, plus the mapping from errors to
//! messages that can be shown to an end user.

use bytesize::ByteSize;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error types that can occur when talking to the DKL API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The item's declared content type is not in the allow-list
    #[error("Invalid file type '{content_type}'. Allowed types: {}", .allowed.join(", "))]
    InvalidType {
        content_type: String,
        allowed: Vec<String>,
    },

    /// The item's declared size exceeds the configured maximum
    #[error("File too large ({}). Maximum size is {}.", human_size(.size), human_size(.max))]
    FileTooLarge { size: u64, max: u64 },

    /// Batch cardinality outside `1..=max`
    #[error("Provide 1-{max} image files (got {count})")]
    TooManyItems { count: usize, max: usize },

    /// A success response whose body could not be parsed
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Non-2xx response; `from_server` tells the server's own message
    /// apart from a generic status line
    #[error("{message}")]
    RequestFailed {
        status: u16,
        message: String,
        from_server: bool,
    },

    /// No response was received
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The caller cancelled the transfer
    #[error("Upload was cancelled: {operation}")]
    Cancelled { operation: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid parameter
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Persisting or loading tokens failed
    #[error("Token storage error: {message}")]
    TokenStore { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Create a new invalid type error
    pub fn invalid_type(content_type: impl Into<String>, allowed: &[String]) -> Self {
        ApiError::InvalidType {
            content_type: content_type.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// Create a new file too large error
    pub fn file_too_large(size: u64, max: u64) -> Self {
        ApiError::FileTooLarge { size, max }
    }

    /// Create a new batch cardinality error
    pub fn too_many_items(count: usize, max: usize) -> Self {
        ApiError::TooManyItems { count, max }
    }

    /// Create a new invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new request failed error carrying the server's message
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            status,
            message: message.into(),
            from_server: true,
        }
    }

    /// Create a new request failed error for a response without a usable message
    ///
    /// The message reads `<operation> failed with status <status>`.
    pub fn unexpected_status(status: u16, operation: &str) -> Self {
        ApiError::RequestFailed {
            status,
            message: format!("{} failed with status {}", operation, status),
            from_server: false,
        }
    }

    /// Create a new network error
    pub fn network_error(message: impl Into<String>) -> Self {
        ApiError::NetworkError {
            message: message.into(),
        }
    }

    /// Create a new cancelled error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        ApiError::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        ApiError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a new token storage error
    pub fn token_store(message: impl Into<String>) -> Self {
        ApiError::TokenStore {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Rejected locally before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidType { .. }
                | ApiError::FileTooLarge { .. }
                | ApiError::TooManyItems { .. }
                | ApiError::InvalidParameter { .. }
        )
    }

    /// A message suitable for showing to an end user
    ///
    /// Server-supplied messages win for 400 and unknown statuses; the common
    /// statuses get a fixed wording.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RequestFailed {
                status,
                message,
                from_server,
            } => {
                let server = Some(message.as_str()).filter(|_| *from_server);
                match status {
                    400 => server.unwrap_or("Invalid input").to_string(),
                    401 => "Not authorized - please log in again".to_string(),
                    403 => "No access to this resource".to_string(),
                    404 => "Not found".to_string(),
                    429 => "Too many requests - try again later".to_string(),
                    500 => "Server error - try again later".to_string(),
                    _ => server.unwrap_or("Something went wrong").to_string(),
                }
            }
            ApiError::NetworkError { .. } => {
                "No connection to the server - check that the backend is running".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn human_size(bytes: &u64) -> ByteSize {
    ByteSize::b(*bytes)
}
