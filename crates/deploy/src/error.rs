//! Upload run error types.

use flory_device::TransferFailure;
use flory_transfer::{CollectionError, TransferError};

/// Hard failures that abort an upload run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("collection failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("Wipe failed: {0}")]
    Wipe(TransferFailure),

    #[error("Failed to upload {path} after {attempts} attempts: {last}")]
    RetryExhausted {
        path: String,
        attempts: u32,
        last: TransferFailure,
    },

    #[error("cannot read {path}: {source}")]
    Payload {
        path: String,
        #[source]
        source: TransferError,
    },

    #[error("Stopped by user")]
    Cancelled,

    #[error("an upload is already running")]
    AlreadyRunning,
}

/// Soft failures of the device settings guard. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings read failed: {0}")]
    Read(TransferFailure),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings write failed: {0}")]
    Write(TransferFailure),
}
