pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod images;
pub mod transport;
pub mod types;
pub mod upload;

pub use api::{ApiClient, Page, PhotoFilter};

pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};

pub use config::{ClientConfig, ValidationRules};

pub use error::{ApiError, Result};

pub use images::{
    ResponsiveImage, ResponsiveImageGenerator, ResponsiveOptions, ResponsiveSize,
    ThumbnailOptions, Transformation,
};

pub use transport::{
    CancelToken, HttpRequest, HttpResponse, Method, MultipartForm, ReqwestTransport,
    TransferProgress, Transport,
};

pub use types::{ImageId, UploadMode};

pub use upload::{
    validate_batch, validate_item, BatchItemError, BatchOptions, BatchProgress, BatchResult,
    ChatMessage, CurrentItem, DeleteImageResponse, ImageMetadata, ImageUploadClient, ItemProgress,
    UploadOptions, UploadOutcome, UploadableItem, UploadedImage,
};
