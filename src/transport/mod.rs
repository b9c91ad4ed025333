//! HTTP plumbing shared by every client in the crate
//!
//! The clients only build [`HttpRequest`]s and interpret [`HttpResponse`]s;
//! moving bytes is the job of a [`Transport`]. [`ReqwestTransport`] is the
//! production implementation, tests substitute their own.

pub mod cancel;
pub mod http;
pub mod multipart;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use cancel::CancelToken;
pub use http::ReqwestTransport;
pub use multipart::{MultipartForm, Part, PartBody};
pub use types::{HttpRequest, HttpResponse, Method, RequestBody};

/// Byte-level progress: `(bytes_sent, total_bytes)`
///
/// `total_bytes` is `None` when the length is not known in advance.
pub type TransferProgress = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Sends one request and returns the server's answer
///
/// Any status code is a successful exchange at this level. Failing to get a
/// response at all is reported as [`ApiError::NetworkError`](crate::ApiError::NetworkError).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: HttpRequest,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse> {
        (**self).send(request, progress).await
    }
}
