//! Single-image uploads against a scripted transport

mod common;

use common::{config, jpeg, multipart, shared, uploaded, MockTransport};
use dkl_api_client::{
    ApiError, CancelToken, ImageId, ImageUploadClient, Method, UploadOptions, UploadableItem,
};
use serde_json::json;
use std::sync::Arc;

fn client(transport: &Arc<MockTransport>) -> ImageUploadClient {
    ImageUploadClient::new(config(), transport.clone())
}

#[tokio::test]
async fn test_upload_image() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let transport = Arc::new(MockTransport::new());
    transport.respond(200, uploaded("dkl_images/abc"));
    let client = client(&transport).with_auth_token("secret");

    let image = client
        .upload_image(&jpeg("photo.jpg"), UploadOptions::new())
        .await?;
    assert_eq!(image.public_id, ImageId::from("dkl_images/abc"));
    assert_eq!(image.width, 640);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, "http://api.test/api/images/upload");
    assert_eq!(requests[0].header_value("Authorization"), Some("Bearer secret"));
    assert_eq!(multipart(&requests[0]).file_names("image"), vec!["photo.jpg"]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_type_sends_nothing() {
    let _ = env_logger::try_init();

    let transport = Arc::new(MockTransport::new());
    let errors = shared(0);
    let sink = errors.clone();
    let options = UploadOptions::new().on_error(move |_| *sink.lock().unwrap() += 1);

    let item = UploadableItem::new("scan.bmp", "image/bmp", vec![1, 2, 3]);
    let result = client(&transport).upload_image(&item, options).await;

    assert!(matches!(result, Err(ApiError::InvalidType { .. })));
    assert_eq!(transport.request_count(), 0);
    // validation failures are returned, not reported
    assert_eq!(*errors.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_file_too_large_sends_nothing() {
    let transport = Arc::new(MockTransport::new());
    let item = jpeg("huge.jpg").with_declared_size(11 * 1024 * 1024);

    let result = client(&transport)
        .upload_image(&item, UploadOptions::new())
        .await;

    assert!(matches!(result, Err(ApiError::FileTooLarge { .. })));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_progress_and_success_callbacks() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::with_progress());
    transport.respond(200, uploaded("abc"));

    let progress = shared(Vec::new());
    let successes = shared(Vec::new());
    let progress_sink = progress.clone();
    let success_sink = successes.clone();
    let options = UploadOptions::new()
        .on_progress(move |p| progress_sink.lock().unwrap().push(p))
        .on_success(move |body| success_sink.lock().unwrap().push(body.clone()));

    client(&transport).upload_image(&jpeg("a.jpg"), options).await?;

    assert_eq!(*progress.lock().unwrap(), vec![0, 50, 100]);
    let successes = successes.lock().unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0]["data"]["public_id"], "abc");
    Ok(())
}

#[tokio::test]
async fn test_server_error_message() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(413, json!({ "error": "Bestand te groot" }));

    let reported = shared(Vec::new());
    let sink = reported.clone();
    let options = UploadOptions::new().on_error(move |e| sink.lock().unwrap().push(e.to_string()));

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), options)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(413));
    assert_eq!(err.to_string(), "Bestand te groot");
    assert_eq!(*reported.lock().unwrap(), vec!["Bestand te groot".to_string()]);
}

#[tokio::test]
async fn test_generic_error_message() {
    let transport = Arc::new(MockTransport::new());
    transport.respond_raw(502, "<html>Bad gateway</html>");

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), UploadOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RequestFailed { status: 502, .. }));
    assert_eq!(err.to_string(), "Upload failed with status 502");
}

#[tokio::test]
async fn test_unparseable_success_body() {
    let transport = Arc::new(MockTransport::new());
    transport.respond_raw(200, "not json");

    let reported = shared(0);
    let sink = reported.clone();
    let options = UploadOptions::new().on_error(move |_| *sink.lock().unwrap() += 1);

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), options)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse { .. }));
    assert_eq!(*reported.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_network_error() {
    let transport = Arc::new(MockTransport::new());
    transport.fail("connection refused");

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), UploadOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NetworkError { .. }));
    assert!(err.user_message().contains("No connection"));
}

#[tokio::test]
async fn test_cancel_in_flight() {
    let transport = Arc::new(MockTransport::with_progress());
    transport.hang();

    let token = CancelToken::new();
    let trigger = token.clone();
    let options = UploadOptions::new()
        .cancel_token(token.clone())
        .on_progress(move |p| {
            if p >= 50 {
                trigger.cancel();
            }
        });

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), options)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Cancelled { .. }));
    // the token is spent once acted on
    assert!(!token.is_cancelled());
}

#[tokio::test]
async fn test_cancel_before_start() {
    let transport = Arc::new(MockTransport::new());
    let token = CancelToken::new();
    token.cancel();

    let err = client(&transport)
        .upload_image(&jpeg("a.jpg"), UploadOptions::new().cancel_token(token.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Cancelled { .. }));
    assert_eq!(transport.request_count(), 0);
    assert!(!token.is_cancelled());
}

#[tokio::test]
async fn test_extra_fields_are_sent() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::new());
    transport.respond(200, uploaded("abc"));

    let options = UploadOptions::new().field("folder", "team");
    client(&transport).upload_image(&jpeg("a.jpg"), options).await?;

    let requests = transport.requests();
    assert_eq!(multipart(&requests[0]).text_value("folder"), Some("team"));
    Ok(())
}

#[tokio::test]
async fn test_send_chat_image() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::new());
    transport.respond(
        201,
        json!({
            "id": "m1",
            "channel_id": "general",
            "user_id": "u1",
            "content": "Finish line!",
            "message_type": "image",
            "file_url": "https://cdn/finish.jpg",
            "file_name": "finish.jpg",
            "file_size": 8
        }),
    );
    transport.respond(201, json!({ "id": "m2", "channel_id": "general" }));

    let client = client(&transport);
    let message = client
        .send_chat_image("general", &jpeg("finish.jpg"), "  Finish line!  ", UploadOptions::new())
        .await?;
    assert_eq!(message.id, "m1");
    assert_eq!(message.message_type, "image");

    client
        .send_chat_image("general", &jpeg("b.jpg"), "   ", UploadOptions::new())
        .await?;

    let requests = transport.requests();
    assert_eq!(requests[0].url, "http://api.test/api/chat/channels/general/messages");
    assert_eq!(multipart(&requests[0]).text_value("content"), Some("Finish line!"));
    assert_eq!(multipart(&requests[1]).text_value("content"), None);
    Ok(())
}

#[tokio::test]
async fn test_send_chat_image_requires_channel() {
    let transport = Arc::new(MockTransport::new());
    let result = client(&transport)
        .send_chat_image(" ", &jpeg("a.jpg"), "", UploadOptions::new())
        .await;

    assert!(matches!(result, Err(ApiError::InvalidParameter { .. })));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_image_metadata_and_delete() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MockTransport::new());
    transport.respond(
        200,
        json!({ "success": true, "data": { "public_id": "abc", "url": "https://cdn/abc.jpg" } }),
    );
    transport.respond(200, json!({ "success": true, "message": "Image deleted" }));
    transport.respond(404, json!({}));

    let client = client(&transport);
    let id = ImageId::from("abc");

    let metadata = client.get_image_metadata(&id).await?;
    assert_eq!(metadata.url, "https://cdn/abc.jpg");

    let deleted = client.delete_image(&id).await?;
    assert!(deleted.success);

    let err = client.get_image_metadata(&id).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 404");

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[1].method, Method::Delete);
    assert_eq!(requests[1].url, "http://api.test/api/images/abc");
    Ok(())
}
