//! Wipe-then-repopulate upload of a static site onto the Flory device.
//!
//! The device serves its web UI from the SD card and can only take one
//! request at a time, so the whole transfer is a single sequence:
//!
//! 1. **Preflight**: read settings, pause the on-device SD logger
//! 2. **Wipe**: delete the hosted web-app directory
//! 3. **Upload**: one multipart POST per file, with retry and backoff
//! 4. **Restore**: put the logger interval back
//! 5. **Restart**: reboot the device onto the new site
//!
//! Network access goes through [`flory_device::TransferClient`], so the
//! sequencing is testable with scripted fakes.

pub mod activity;
pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod progress;
pub mod types;

// Re-export primary types for convenience.
pub use activity::ActivityLog;
pub use error::{SettingsError, UploadError};
pub use guard::{DeviceSettingsGuard, Preflight};
pub use orchestrator::UploadOrchestrator;
pub use progress::{ProgressReporter, RunSnapshot};
pub use types::{RunPhase, RunReport, UploadEvent, UploadOptions};
