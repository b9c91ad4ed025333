//! Shared helpers for the integration tests
//!
//! `MockTransport` answers from a script and records every request, so tests
//! can assert both on what was sent and on the fact that nothing was sent.

#![allow(dead_code)]

use async_trait::async_trait;
use dkl_api_client::transport::RequestBody;
use dkl_api_client::{
    ApiError, ClientConfig, HttpRequest, HttpResponse, Result, TransferProgress, Transport,
    UploadableItem,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://api.test/api";

pub enum Scripted {
    Respond(HttpResponse),
    NetworkError(String),
    /// Report some progress, then never answer
    Hang,
}

#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    report_progress: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report 0%, 50% and 100% of every multipart body before answering
    pub fn with_progress() -> Self {
        Self {
            report_progress: true,
            ..Self::default()
        }
    }

    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.push(Scripted::Respond(HttpResponse::with_json(status, &body)))
    }

    pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Scripted::Respond(HttpResponse::new(status, body)))
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.push(Scripted::NetworkError(message.to_string()))
    }

    pub fn hang(&self) -> &Self {
        self.push(Scripted::Hang)
    }

    fn push(&self, step: Scripted) -> &Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: HttpRequest,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse> {
        let total = match &request.body {
            RequestBody::Multipart(form) => Some(form.encoded_len()),
            _ => None,
        };
        self.requests.lock().unwrap().push(request);

        if let (true, Some(total), Some(callback)) = (self.report_progress, total, &progress) {
            callback(0, Some(total));
            callback(total / 2, Some(total));
            callback(total, Some(total));
        }

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::NetworkError(message)) => Err(ApiError::network_error(message)),
            Some(Scripted::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            None => panic!("MockTransport: no scripted response left"),
        }
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::default().api_base_url(BASE_URL)
}

pub fn jpeg(name: &str) -> UploadableItem {
    UploadableItem::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4])
}

/// The `{"success": true, "data": {...}}` body of a successful upload
pub fn uploaded(public_id: &str) -> Value {
    json!({
        "success": true,
        "data": image_json(public_id)
    })
}

pub fn image_json(public_id: &str) -> Value {
    json!({
        "public_id": public_id,
        "url": format!("http://res.cloudinary.com/demo/image/upload/{}.jpg", public_id),
        "secure_url": format!("https://res.cloudinary.com/demo/image/upload/{}.jpg", public_id),
        "width": 640,
        "height": 480,
        "format": "jpg",
        "bytes": 8
    })
}

pub fn shared<T>(value: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(value))
}

pub fn multipart(request: &HttpRequest) -> &dkl_api_client::MultipartForm {
    match &request.body {
        RequestBody::Multipart(form) => form,
        other => panic!("expected a multipart body, got {:?}", other),
    }
}
