//! Transfer client trait and the request/outcome types it exchanges.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use flory_transfer::Payload;

/// HTTP method of a device call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A file part for the SD upload endpoint.
#[derive(Debug)]
pub struct FileUpload {
    /// Destination path, sent as the part filename and as a `path` field.
    pub remote_path: String,
    pub payload: Payload,
}

/// Body of a device call.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Upload(FileUpload),
}

/// One outbound call with its own upper bound on duration.
#[derive(Debug)]
pub struct DeviceRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl DeviceRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: RequestBody::Empty,
            timeout,
        }
    }

    pub fn post(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Empty,
            timeout,
        }
    }

    /// Replaces the body with a JSON document.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Replaces the body with a single-file multipart upload.
    pub fn upload(mut self, remote_path: impl Into<String>, payload: Payload) -> Self {
        self.body = RequestBody::Upload(FileUpload {
            remote_path: remote_path.into(),
            payload,
        });
        self
    }
}

/// A completed call with a 2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse {
    pub status: u16,
    pub body: String,
}

/// Why a call did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferFailure {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}{}", body_suffix(.body))]
    Http { status: u16, body: String },
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" {body}")
    }
}

/// Outcome of one device call.
pub type TransferAttempt = Result<DeviceResponse, TransferFailure>;

/// Performs single, timeout-bounded calls against the device.
///
/// Implementations must not retry: retry policy belongs to the caller.
pub trait TransferClient: Send + Sync {
    fn send(
        &self,
        request: DeviceRequest,
    ) -> Pin<Box<dyn Future<Output = TransferAttempt> + Send + '_>>;
}
