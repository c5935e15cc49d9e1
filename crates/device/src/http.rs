//! `reqwest` implementation of [`TransferClient`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use flory_protocol::{PATH_FIELD, UPLOAD_FILE_FIELD};
use flory_transfer::Payload;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::client::{
    DeviceRequest, DeviceResponse, FileUpload, Method, RequestBody, TransferAttempt,
    TransferClient, TransferFailure,
};

/// Transfer client backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransferClient {
    http: reqwest::Client,
}

impl HttpTransferClient {
    /// Creates a client with the uploader's user agent.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flory-uploader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn execute(&self, request: DeviceRequest) -> TransferAttempt {
        let DeviceRequest {
            method,
            url,
            body,
            timeout,
        } = request;

        let builder = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        let builder = match body {
            // An explicit empty body keeps `Content-Length: 0` on bare POSTs.
            RequestBody::Empty if method == Method::Post => builder.body(Vec::<u8>::new()),
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Upload(upload) => builder.multipart(build_form(upload)),
        };

        debug!(?method, %url, timeout_ms = timeout.as_millis() as u64, "device request");

        // One deadline covers headers and body. Dropping the future aborts
        // the request.
        let deadline = tokio::time::Instant::now() + timeout;
        let response = match tokio::time::timeout_at(deadline, builder.send()).await {
            Err(_) => return Err(TransferFailure::Timeout(timeout)),
            Ok(Err(e)) => return Err(classify(e, timeout)),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        let body = match tokio::time::timeout_at(deadline, response.text()).await {
            Err(_) => return Err(TransferFailure::Timeout(timeout)),
            Ok(Err(e)) => return Err(classify(e, timeout)),
            Ok(Ok(text)) => text,
        };

        debug!(%url, status = status.as_u16(), bytes = body.len(), "device response");

        if status.is_success() {
            Ok(DeviceResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(TransferFailure::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl TransferClient for HttpTransferClient {
    fn send(
        &self,
        request: DeviceRequest,
    ) -> Pin<Box<dyn Future<Output = TransferAttempt> + Send + '_>> {
        Box::pin(self.execute(request))
    }
}

/// Builds the upload form.
///
/// Every part has a known length, so `reqwest` sends `Content-Length`
/// instead of chunked encoding. The `path` field goes first so it is
/// parsed before the file body.
fn build_form(upload: FileUpload) -> Form {
    let FileUpload {
        remote_path,
        payload,
    } = upload;

    let part = match payload {
        Payload::Buffered(data) => Part::bytes(data),
        Payload::File { file, len } => {
            Part::stream_with_length(reqwest::Body::wrap_stream(ReaderStream::new(file)), len)
        }
    }
    .file_name(remote_path.clone());

    Form::new()
        .text(PATH_FIELD, remote_path)
        .part(UPLOAD_FILE_FIELD, part)
}

fn classify(error: reqwest::Error, timeout: Duration) -> TransferFailure {
    if error.is_timeout() {
        TransferFailure::Timeout(timeout)
    } else {
        TransferFailure::Network(error.to_string())
    }
}
