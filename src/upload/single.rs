//! One image per request: plain uploads, chat images and image lookups

use crate::error::{ApiError, Result};
use crate::transport::{HttpRequest, Method, MultipartForm};
use crate::types::ImageId;
use crate::upload::client::ImageUploadClient;
use crate::upload::types::{
    ApiEnvelope, ChatMessage, DeleteImageResponse, ImageMetadata, UploadOptions, UploadableItem,
    UploadedImage,
};
use crate::upload::validation::validate_item;

/// Multipart part the single-image endpoints read the file from
pub const IMAGE_FIELD: &str = "image";

/// Part holding a chat image's caption
pub const CAPTION_FIELD: &str = "content";

pub(crate) fn item_form(field: &str, item: &UploadableItem) -> MultipartForm {
    MultipartForm::new().file(field, &item.name, &item.content_type, item.data.clone())
}

impl ImageUploadClient {
    /// Check an item against the configured allow-lists
    ///
    /// Pure; no request is made and no callback fires.
    pub fn validate_image(&self, item: &UploadableItem) -> Result<()> {
        validate_item(self.rules(), item)
    }

    /// Upload one image to `POST /images/upload`
    ///
    /// Validation failures are returned without touching the network or
    /// calling `options.on_error`. Extra fields from `options` are sent
    /// after the file part.
    pub async fn upload_image(
        &self,
        item: &UploadableItem,
        options: UploadOptions,
    ) -> Result<UploadedImage> {
        self.validate_image(item)?;

        let mut form = item_form(IMAGE_FIELD, item);
        for (name, value) in &options.fields {
            form = form.text(name, value);
        }

        let envelope: ApiEnvelope<UploadedImage> = self
            .upload_with_progress("/images/upload", form, &options)
            .await?;
        log::info!(
            "Uploaded {} as {}",
            item.name,
            envelope.data.public_id.as_str()
        );
        Ok(envelope.data)
    }

    /// Post an image, with an optional caption, to a chat channel
    ///
    /// The caption is trimmed and only sent when something is left.
    pub async fn send_chat_image(
        &self,
        channel_id: &str,
        item: &UploadableItem,
        caption: &str,
        options: UploadOptions,
    ) -> Result<ChatMessage> {
        let channel_id = channel_id.trim();
        if channel_id.is_empty() {
            return Err(ApiError::invalid_parameter(
                "channel_id",
                "Channel ID cannot be empty",
            ));
        }
        self.validate_image(item)?;

        let mut form = item_form(IMAGE_FIELD, item);
        let caption = caption.trim();
        if !caption.is_empty() {
            form = form.text(CAPTION_FIELD, caption);
        }
        for (name, value) in &options.fields {
            form = form.text(name, value);
        }

        let endpoint = format!("/chat/channels/{}/messages", channel_id);
        self.upload_with_progress(&endpoint, form, &options).await
    }

    /// `GET /images/{public_id}`
    pub async fn get_image_metadata(&self, public_id: &ImageId) -> Result<ImageMetadata> {
        let url = self.config().endpoint(&format!("/images/{}", public_id));
        let envelope: ApiEnvelope<ImageMetadata> = self.request(HttpRequest::get(url)).await?;
        Ok(envelope.data)
    }

    /// `DELETE /images/{public_id}`
    pub async fn delete_image(&self, public_id: &ImageId) -> Result<DeleteImageResponse> {
        let url = self.config().endpoint(&format!("/images/{}", public_id));
        let response: DeleteImageResponse =
            self.request(HttpRequest::new(Method::Delete, url)).await?;
        log::info!("Deleted image {}", public_id);
        Ok(response)
    }
}
