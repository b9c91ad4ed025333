//! Checks run before any bytes leave the process

use crate::config::ValidationRules;
use crate::error::{ApiError, Result};
use crate::upload::types::UploadableItem;

/// Check one item's declared type and size
///
/// The type is checked first, so an item that breaks both rules reports
/// `InvalidType`.
pub fn validate_item(rules: &ValidationRules, item: &UploadableItem) -> Result<()> {
    if !rules
        .allowed_types
        .iter()
        .any(|allowed| allowed == &item.content_type)
    {
        return Err(ApiError::invalid_type(&item.content_type, &rules.allowed_types));
    }

    if item.size > rules.max_file_size {
        return Err(ApiError::file_too_large(item.size, rules.max_file_size));
    }

    Ok(())
}

/// Check batch cardinality, then every item
///
/// All-or-nothing: the first invalid item fails the whole batch.
pub fn validate_batch(rules: &ValidationRules, items: &[UploadableItem]) -> Result<()> {
    if items.is_empty() || items.len() > rules.max_batch_size {
        return Err(ApiError::too_many_items(items.len(), rules.max_batch_size));
    }

    for (index, item) in items.iter().enumerate() {
        validate_item(rules, item).map_err(|e| {
            log::debug!("Batch item {} ({}) rejected: {}", index, item.name, e);
            e
        })?;
    }

    Ok(())
}
