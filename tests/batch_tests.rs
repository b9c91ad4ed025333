//! Batch uploads in both modes

mod common;

use common::{config, image_json, jpeg, multipart, shared, uploaded, MockTransport};
use dkl_api_client::{
    ApiError, BatchOptions, CancelToken, ClientConfig, ImageUploadClient, UploadMode,
    UploadableItem, ValidationRules,
};
use serde_json::json;
use std::sync::Arc;

fn client(transport: &Arc<MockTransport>) -> ImageUploadClient {
    ImageUploadClient::new(config(), transport.clone())
}

#[tokio::test]
async fn test_empty_batch_sends_nothing() {
    let _ = env_logger::try_init();

    let transport = Arc::new(MockTransport::new());
    let err = client(&transport)
        .upload_batch(&[], BatchOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::TooManyItems { count: 0, max: 10 }));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_oversized_batch_sends_nothing() {
    let transport = Arc::new(MockTransport::new());
    let config: ClientConfig = config().upload_rules(ValidationRules::default().max_batch_size(2));
    let client = ImageUploadClient::new(config, transport.clone());

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")];
    for mode in [UploadMode::Parallel, UploadMode::Sequential] {
        let err = client
            .upload_batch(&items, BatchOptions::new().mode(mode))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TooManyItems { count: 3, max: 2 }));
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_one_invalid_item_aborts_whole_batch() {
    let transport = Arc::new(MockTransport::new());
    let items = vec![
        jpeg("a.jpg"),
        jpeg("b.jpg"),
        UploadableItem::new("c.tiff", "image/tiff", vec![1]),
    ];

    let err = client(&transport)
        .upload_batch_images_sequential(&items, BatchOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidType { .. }));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_sequential_continues_past_failure() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let transport = Arc::new(MockTransport::new());
    transport
        .respond(200, uploaded("first"))
        .respond(400, json!({ "error": "too large" }))
        .respond(200, uploaded("third"));

    let errors = shared(Vec::new());
    let successes = shared(0);
    let errors_sink = errors.clone();
    let success_sink = successes.clone();
    let options = BatchOptions::new()
        .on_error(move |e| errors_sink.lock().unwrap().push(e.to_string()))
        .on_success(move |_| *success_sink.lock().unwrap() += 1);

    let items = vec![jpeg("one.jpg"), jpeg("two.jpg"), jpeg("three.jpg")];
    let result = client(&transport)
        .upload_batch_images_sequential(&items, options)
        .await?;

    assert!(result.success);
    assert_eq!(result.mode, UploadMode::Sequential);
    assert_eq!(result.uploaded_count, 2);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.error_count, Some(1));
    assert_eq!(result.results[0].public_id.as_str(), "first");
    assert_eq!(result.results[1].public_id.as_str(), "third");

    let batch_errors = result.errors.clone().unwrap_or_default();
    assert_eq!(batch_errors.len(), 1);
    assert_eq!(batch_errors[0].file_index, 1);
    assert_eq!(batch_errors[0].file_name, "two.jpg");
    assert_eq!(batch_errors[0].error, "too large");

    let value = serde_json::to_value(&result)?;
    assert_eq!(
        value["errors"],
        json!([{ "fileIndex": 1, "fileName": "two.jpg", "error": "too large" }])
    );

    assert_eq!(*errors.lock().unwrap(), vec!["too large".to_string()]);
    assert_eq!(*successes.lock().unwrap(), 1);

    // one request per item, in input order
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    for (request, name) in requests.iter().zip(["one.jpg", "two.jpg", "three.jpg"]) {
        assert_eq!(request.url, "http://api.test/api/images/upload");
        assert_eq!(multipart(request).file_names("image"), vec![name]);
    }
    Ok(())
}

#[tokio::test]
async fn test_sequential_all_failed() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::new());
    transport.fail("connection reset").respond(500, json!({}));

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg")];
    let result = client(&transport)
        .upload_batch_images_sequential(&items, BatchOptions::new())
        .await?;

    assert!(!result.success);
    assert_eq!(result.uploaded_count, 0);
    assert_eq!(result.error_count, Some(2));
    let outcomes = result.outcomes();
    assert!(outcomes.iter().all(|o| !o.is_success()));
    Ok(())
}

#[tokio::test]
async fn test_sequential_progress() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::with_progress());
    transport
        .respond(200, uploaded("a"))
        .respond(422, json!({ "error": "bad image" }))
        .respond(200, uploaded("c"));

    let overall = shared(Vec::new());
    let per_item = shared(Vec::new());
    let batch = shared(Vec::new());
    let overall_sink = overall.clone();
    let item_sink = per_item.clone();
    let batch_sink = batch.clone();

    let options = BatchOptions::new()
        .on_progress(move |p| overall_sink.lock().unwrap().push(p))
        .on_item_progress(move |p| item_sink.lock().unwrap().push((p.file_index, p.progress)))
        .on_batch_progress(move |p| batch_sink.lock().unwrap().push(p));

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")];
    client(&transport)
        .upload_batch_images_sequential(&items, options)
        .await?;

    let overall = overall.lock().unwrap();
    assert_eq!(*overall, vec![0, 17, 33, 33, 50, 67, 67, 83, 100]);
    assert!(overall.windows(2).all(|w| w[0] <= w[1]));

    let per_item = per_item.lock().unwrap();
    assert_eq!(per_item.len(), 9);
    assert_eq!(per_item[3], (1, 0));
    assert_eq!(per_item[8], (2, 100));

    // before each item, and after each success
    let batch = batch.lock().unwrap();
    assert_eq!(batch.len(), 5);
    assert_eq!(batch[0].current_item.as_ref().map(|c| c.index), Some(0));
    assert_eq!(batch[1].completed, 1);
    assert!(batch[1].current_item.is_none());
    assert_eq!(batch[2].current_item.as_ref().map(|c| c.name.as_str()), Some("b.jpg"));
    assert_eq!(batch[3].completed, 1);
    assert_eq!(batch[3].current_item.as_ref().map(|c| c.index), Some(2));
    assert_eq!(batch[4].completed, 2);
    Ok(())
}

#[tokio::test]
async fn test_sequential_cancel_skips_one_item() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::with_progress());
    transport
        .respond(200, uploaded("a"))
        .hang()
        .respond(200, uploaded("c"));

    let token = CancelToken::new();
    let trigger = token.clone();
    let options = BatchOptions::new()
        .cancel_token(token)
        .on_item_progress(move |p| {
            if p.file_index == 1 && p.progress == 100 {
                trigger.cancel();
            }
        });

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")];
    let result = client(&transport)
        .upload_batch_images_sequential(&items, options)
        .await?;

    assert_eq!(result.uploaded_count, 2);
    let errors = result.errors.unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file_index, 1);
    assert!(errors[0].error.starts_with("Upload was cancelled"));
    Ok(())
}

#[tokio::test]
async fn test_late_cancel_does_not_leak_to_next_item() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::with_progress());
    transport
        .respond(200, uploaded("a"))
        .respond(200, uploaded("b"));

    let token = CancelToken::new();
    let trigger = token.clone();
    let options = BatchOptions::new()
        .cancel_token(token.clone())
        .on_item_progress(move |p| {
            if p.file_index == 0 && p.progress == 50 {
                trigger.cancel();
            }
        });

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg")];
    let result = client(&transport)
        .upload_batch_images_sequential(&items, options)
        .await?;

    // the response for item 0 was already there, so it wins
    assert_eq!(result.uploaded_count, 2);
    assert_eq!(result.errors, None);
    assert_eq!(transport.request_count(), 2);
    assert!(!token.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_parallel_single_request() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::with_progress());
    transport.respond(
        200,
        json!({
            "success": true,
            "data": [image_json("a"), image_json("b")],
            "uploaded_count": 2,
            "total_files": 2
        }),
    );

    let overall = shared(Vec::new());
    let batch = shared(Vec::new());
    let overall_sink = overall.clone();
    let batch_sink = batch.clone();
    let options = BatchOptions::new()
        .on_progress(move |p| overall_sink.lock().unwrap().push(p))
        .on_batch_progress(move |p| batch_sink.lock().unwrap().push(p));

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg")];
    let result = client(&transport).upload_batch_images(&items, options).await?;

    assert!(result.success);
    assert_eq!(result.mode, UploadMode::Parallel);
    assert_eq!(result.uploaded_count, 2);
    assert_eq!(result.errors, None);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://api.test/api/images/batch-upload");
    assert_eq!(requests[0].query_value("mode"), Some("parallel"));
    assert_eq!(multipart(&requests[0]).file_names("images"), vec!["a.jpg", "b.jpg"]);

    assert_eq!(*overall.lock().unwrap(), vec![0, 50, 100]);
    let batch = batch.lock().unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].completed, 2);
    assert!(batch[0].current_item.is_none());
    Ok(())
}

#[tokio::test]
async fn test_parallel_failure_fails_batch() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(400, json!({ "error": "Geen geldige afbeeldingen" }));

    let reported = shared(0);
    let completed = shared(0);
    let reported_sink = reported.clone();
    let completed_sink = completed.clone();
    let options = BatchOptions::new()
        .on_error(move |_| *reported_sink.lock().unwrap() += 1)
        .on_success(move |_| *completed_sink.lock().unwrap() += 1);

    let items = vec![jpeg("a.jpg"), jpeg("b.jpg")];
    let err = client(&transport)
        .upload_batch_images(&items, options)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Geen geldige afbeeldingen");
    assert_eq!(*reported.lock().unwrap(), 1);
    assert_eq!(*completed.lock().unwrap(), 0);
}
