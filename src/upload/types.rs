use crate::error::{ApiError, Result};
use crate::transport::CancelToken;
use crate::types::{ImageId, UploadMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;
pub type ResponseCallback = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;
pub type ItemProgressCallback = Arc<dyn Fn(ItemProgress) + Send + Sync>;
pub type BatchProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;
pub type BatchResultCallback = Arc<dyn Fn(&BatchResult) + Send + Sync>;

/// One file selected for upload
///
/// `content_type` and `size` are what the caller declares; validation runs
/// against those, not against the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadableItem {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub data: Vec<u8>,
}

impl UploadableItem {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            data,
        }
    }

    /// Override the declared size
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Read a file, guessing its content type from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ApiError::invalid_parameter(
                "path",
                format!("File does not exist: {}", path.display()),
            ));
        }

        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(name, content_type_for_path(path), data))
    }
}

/// Content type guessed from a file extension
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// `{"success": ..., "data": ...}` wrapper used by the image endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

/// An image stored on the CDN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub public_id: ImageId,
    pub url: String,
    #[serde(default)]
    pub secure_url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub public_id: ImageId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A chat message as returned after posting an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Callbacks and extras for a single transfer
#[derive(Clone, Default)]
pub struct UploadOptions {
    pub on_progress: Option<ProgressCallback>,
    pub on_success: Option<ResponseCallback>,
    pub on_error: Option<ErrorCallback>,
    pub fields: Vec<(String, String)>,
    pub cancel: Option<CancelToken>,
}

impl std::fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("fields", &self.fields)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with a percentage in `0..=100` that never decreases
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Called with the parsed response body
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Extra text field sent alongside the file
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn report_error(&self, err: &ApiError) {
        if let Some(callback) = &self.on_error {
            callback(err);
        }
    }
}

/// Progress of one item inside a sequential batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProgress {
    pub file_index: usize,
    pub file_name: String,
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentItem {
    pub index: usize,
    pub name: String,
}

/// Where a batch stands; `current_item` is `None` between items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current_item: Option<CurrentItem>,
}

/// A per-item failure recorded by a sequential batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub file_index: usize,
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(UploadedImage),
    Failure(BatchItemError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }
}

#[derive(Clone, Default)]
pub struct BatchOptions {
    pub mode: UploadMode,
    pub on_progress: Option<ProgressCallback>,
    pub on_item_progress: Option<ItemProgressCallback>,
    pub on_batch_progress: Option<BatchProgressCallback>,
    pub on_success: Option<BatchResultCallback>,
    pub on_error: Option<ErrorCallback>,
    pub cancel: Option<CancelToken>,
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("mode", &self.mode)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_item_progress", &self.on_item_progress.is_some())
            .field("on_batch_progress", &self.on_batch_progress.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: UploadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overall batch percentage
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Raw per-item percentage (sequential mode only)
    pub fn on_item_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ItemProgress) + Send + Sync + 'static,
    {
        self.on_item_progress = Some(Arc::new(callback));
        self
    }

    pub fn on_batch_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        self.on_batch_progress = Some(Arc::new(callback));
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BatchResult) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn report_error(&self, err: &ApiError) {
        if let Some(callback) = &self.on_error {
            callback(err);
        }
    }

    pub(crate) fn report_batch(&self, progress: BatchProgress) {
        if let Some(callback) = &self.on_batch_progress {
            callback(progress);
        }
    }
}

/// Aggregated result of a batch upload
///
/// `errors` and `error_count` are only present when at least one item
/// failed, which only happens in sequential mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub success: bool,
    #[serde(rename = "data")]
    pub results: Vec<UploadedImage>,
    pub uploaded_count: usize,
    #[serde(rename = "total_files")]
    pub total_count: usize,
    pub mode: UploadMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<BatchItemError>>,
    #[serde(rename = "errors_count", skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
}

impl BatchResult {
    pub(crate) fn assemble(
        mode: UploadMode,
        total_count: usize,
        results: Vec<UploadedImage>,
        errors: Vec<BatchItemError>,
    ) -> Self {
        let error_count = (!errors.is_empty()).then_some(errors.len());
        Self {
            success: !results.is_empty(),
            uploaded_count: results.len(),
            total_count,
            mode,
            errors: (!errors.is_empty()).then_some(errors),
            error_count,
            results,
        }
    }

    /// Successes first, then failures in item order
    pub fn outcomes(&self) -> Vec<UploadOutcome> {
        let mut outcomes: Vec<UploadOutcome> = self
            .results
            .iter()
            .cloned()
            .map(UploadOutcome::Success)
            .collect();
        if let Some(errors) = &self.errors {
            let mut failures = errors.clone();
            failures.sort_by_key(|e| e.file_index);
            outcomes.extend(failures.into_iter().map(UploadOutcome::Failure));
        }
        outcomes
    }
}
