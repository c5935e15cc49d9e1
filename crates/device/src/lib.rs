//! Timeout-bounded HTTP calls against the Flory device.
//!
//! [`TransferClient`] is the seam between upload sequencing and the
//! network: one call in, one [`TransferAttempt`] out, no retries and no
//! state. [`HttpTransferClient`] is the `reqwest` implementation; tests
//! substitute scripted fakes.

pub mod client;
pub mod endpoints;
pub mod http;

pub use client::{
    DeviceRequest, DeviceResponse, FileUpload, Method, RequestBody, TransferAttempt,
    TransferClient, TransferFailure,
};
pub use endpoints::{DeviceEndpoints, EndpointError};
pub use http::HttpTransferClient;
