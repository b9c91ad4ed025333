//! Image uploads
//!
//! This module provides validation of selected files, single-image uploads
//! with progress reporting and cancellation, and batch uploads in parallel or
//! sequential mode.

pub mod batch;
pub mod client;
pub mod progress;
pub mod single;
pub mod types;
pub mod validation;

pub use batch::BATCH_FIELD;
pub use client::ImageUploadClient;
pub use progress::{overall_percent, percent_of};
pub use single::{CAPTION_FIELD, IMAGE_FIELD};
pub use types::{
    content_type_for_path, ApiEnvelope, BatchItemError, BatchOptions, BatchProgress, BatchResult,
    ChatMessage, CurrentItem, DeleteImageResponse, ImageMetadata, ItemProgress, UploadOptions,
    UploadOutcome, UploadableItem, UploadedImage,
};
pub use validation::{validate_batch, validate_item};
