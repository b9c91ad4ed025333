//! Uploading several images in one logical operation
//!
//! Both modes validate the whole batch before anything is sent. In parallel
//! mode every item travels in one combined request and the server's answer is
//! taken as-is: a failure fails the whole batch and there is no per-item error
//! detail. In sequential mode items go one request at a time, in input order,
//! and a failing item is recorded and skipped.

use crate::error::Result;
use crate::transport::{HttpRequest, MultipartForm};
use crate::types::UploadMode;
use crate::upload::client::ImageUploadClient;
use crate::upload::progress::overall_percent;
use crate::upload::types::{
    BatchItemError, BatchOptions, BatchProgress, BatchResult, CurrentItem, ItemProgress,
    UploadOptions, UploadableItem, UploadedImage,
};
use crate::upload::validation::validate_batch;
use serde::Deserialize;
use std::sync::Arc;

/// Multipart part the batch endpoint reads files from
pub const BATCH_FIELD: &str = "images";

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    data: Option<Vec<UploadedImage>>,
}

impl ImageUploadClient {
    /// Upload all items in one combined request
    pub async fn upload_batch_images(
        &self,
        items: &[UploadableItem],
        options: BatchOptions,
    ) -> Result<BatchResult> {
        self.upload_batch(items, options.mode(UploadMode::Parallel))
            .await
    }

    /// Upload items one request at a time, continuing past failures
    pub async fn upload_batch_images_sequential(
        &self,
        items: &[UploadableItem],
        options: BatchOptions,
    ) -> Result<BatchResult> {
        self.upload_batch(items, options.mode(UploadMode::Sequential))
            .await
    }

    /// Upload a batch in the mode selected by `options`
    ///
    /// # Arguments
    ///
    /// * `items` - Between 1 and `max_batch_size` items
    /// * `options` - Mode, callbacks and cancellation
    ///
    /// # Returns
    ///
    /// The aggregated [`BatchResult`]. Fails without sending anything when
    /// the batch is empty, too large or holds an invalid item. In parallel
    /// mode a failed request fails the batch; sequential mode only fails on
    /// validation.
    pub async fn upload_batch(
        &self,
        items: &[UploadableItem],
        options: BatchOptions,
    ) -> Result<BatchResult> {
        validate_batch(self.rules(), items)?;
        log::info!(
            "Uploading batch of {} images in {} mode",
            items.len(),
            options.mode
        );

        let result = match options.mode {
            UploadMode::Parallel => self.upload_parallel(items, &options).await?,
            UploadMode::Sequential => self.upload_sequential(items, &options).await,
        };

        log::info!(
            "Batch finished: {}/{} uploaded",
            result.uploaded_count,
            result.total_count
        );
        if let Some(callback) = &options.on_success {
            callback(&result);
        }
        Ok(result)
    }

    async fn upload_parallel(
        &self,
        items: &[UploadableItem],
        options: &BatchOptions,
    ) -> Result<BatchResult> {
        let form = items.iter().fold(MultipartForm::new(), |form, item| {
            form.file(BATCH_FIELD, &item.name, &item.content_type, item.data.clone())
        });
        let request = HttpRequest::post(self.config().endpoint("/images/batch-upload"))
            .query("mode", UploadMode::Parallel)
            .multipart(form);

        let transfer_options = UploadOptions {
            on_progress: options.on_progress.clone(),
            on_success: None,
            on_error: options.on_error.clone(),
            fields: Vec::new(),
            cancel: options.cancel.clone(),
        };

        let response: BatchResponse = self.transfer(request, &transfer_options).await?;
        let results = response.data.unwrap_or_default();

        options.report_batch(BatchProgress {
            completed: results.len(),
            total: items.len(),
            current_item: None,
        });

        Ok(BatchResult::assemble(
            UploadMode::Parallel,
            items.len(),
            results,
            Vec::new(),
        ))
    }

    async fn upload_sequential(
        &self,
        items: &[UploadableItem],
        options: &BatchOptions,
    ) -> BatchResult {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut errors = Vec::new();

        for (index, item) in items.iter().enumerate() {
            options.report_batch(BatchProgress {
                completed: results.len(),
                total,
                current_item: Some(CurrentItem {
                    index,
                    name: item.name.clone(),
                }),
            });

            let per_item = item_options(options, index, total, item);
            match self.upload_image(item, per_item).await {
                Ok(image) => {
                    results.push(image);
                    options.report_batch(BatchProgress {
                        completed: results.len(),
                        total,
                        current_item: None,
                    });
                }
                Err(e) => {
                    log::warn!("Batch item {} ({}) failed: {}", index, item.name, e);
                    options.report_error(&e);
                    errors.push(BatchItemError {
                        file_index: index,
                        file_name: item.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        BatchResult::assemble(UploadMode::Sequential, total, results, errors)
    }
}

/// Per-item options that fan progress out to the item and overall callbacks
fn item_options(
    options: &BatchOptions,
    index: usize,
    total: usize,
    item: &UploadableItem,
) -> UploadOptions {
    let mut item_options = UploadOptions {
        cancel: options.cancel.clone(),
        ..UploadOptions::default()
    };

    if options.on_item_progress.is_none() && options.on_progress.is_none() {
        return item_options;
    }

    let on_item = options.on_item_progress.clone();
    let on_overall = options.on_progress.clone();
    let name = item.name.clone();
    item_options.on_progress = Some(Arc::new(move |percent: u8| {
        if let Some(callback) = &on_item {
            callback(ItemProgress {
                file_index: index,
                file_name: name.clone(),
                progress: percent,
            });
        }
        if let Some(callback) = &on_overall {
            callback(overall_percent(index, total, percent));
        }
    }));
    item_options
}
