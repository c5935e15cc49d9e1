//! Pauses the on-device SD logger for the duration of a run.
//!
//! The firmware's logger and the upload handler both write to the SD
//! card, and interleaving the two corrupts files. The guard reads the
//! current interval, sets it to zero, and remembers the old value so it
//! can be put back whatever way the run ends.

use std::sync::Arc;
use std::time::Duration;

use flory_device::{DeviceEndpoints, DeviceRequest, TransferClient, TransferFailure};
use flory_protocol::{DeviceSettings, SettingsPatch};
use tracing::{debug, warn};

use crate::error::SettingsError;

/// What the guard found during preflight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preflight {
    /// Logging was already off; nothing to restore.
    AlreadyDisabled,
    /// Logging was paused and will be restored to `previous_ms`.
    Suppressed { previous_ms: u64 },
}

struct PendingRestore {
    client: Arc<dyn TransferClient>,
    url: String,
    timeout: Duration,
    interval_ms: u64,
}

/// Holds the logger interval to restore after a run.
///
/// Restoring needs a request to the device, so it cannot happen on drop.
/// Callers must [`restore`](Self::restore) on every exit path.
#[must_use = "call restore() so the device logger comes back on"]
pub struct DeviceSettingsGuard {
    pending: Option<PendingRestore>,
}

impl DeviceSettingsGuard {
    /// A guard with nothing to restore.
    pub fn disarmed() -> Self {
        Self { pending: None }
    }

    /// Reads device settings and disables logging if it is on.
    ///
    /// Failures are soft and the error is handed back for the caller to log.
    /// The guard stays armed when the suppress write timed out or lost its
    /// connection, since the device may have applied it anyway.
    pub async fn acquire(
        client: Arc<dyn TransferClient>,
        endpoints: &DeviceEndpoints,
        timeout: Duration,
    ) -> (Self, Result<Preflight, SettingsError>) {
        let url = endpoints.settings();

        let response = match client.send(DeviceRequest::get(&url, timeout)).await {
            Ok(r) => r,
            Err(e) => return (Self::disarmed(), Err(SettingsError::Read(e))),
        };
        let settings: DeviceSettings = match serde_json::from_str(&response.body) {
            Ok(s) => s,
            Err(e) => return (Self::disarmed(), Err(e.into())),
        };

        let previous_ms = settings.logging_interval();
        if previous_ms == 0 {
            debug!("device logging already disabled");
            return (Self::disarmed(), Ok(Preflight::AlreadyDisabled));
        }

        let written = post_interval(client.as_ref(), &url, timeout, 0).await;
        let guard = Self {
            pending: Some(PendingRestore {
                client,
                url,
                timeout,
                interval_ms: previous_ms,
            }),
        };
        match written {
            Ok(()) => {
                debug!(previous_ms, "device logging suppressed");
                (guard, Ok(Preflight::Suppressed { previous_ms }))
            }
            Err(
                e @ SettingsError::Write(TransferFailure::Timeout(_) | TransferFailure::Network(_)),
            ) => {
                debug!(previous_ms, "suppress outcome unknown; restore still owed");
                (guard, Err(e))
            }
            Err(e) => (guard.disarm(), Err(e)),
        }
    }

    fn disarm(mut self) -> Self {
        self.pending = None;
        self
    }

    /// Whether a restore request is still owed to the device.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Writes the saved interval back.
    ///
    /// Returns the restored interval, or `None` if there was nothing to do.
    pub async fn restore(mut self) -> Result<Option<u64>, SettingsError> {
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };
        post_interval(
            pending.client.as_ref(),
            &pending.url,
            pending.timeout,
            pending.interval_ms,
        )
        .await?;
        debug!(interval_ms = pending.interval_ms, "device logging restored");
        Ok(Some(pending.interval_ms))
    }
}

impl Drop for DeviceSettingsGuard {
    fn drop(&mut self) {
        if let Some(pending) = &self.pending {
            warn!(
                interval_ms = pending.interval_ms,
                "settings guard dropped without restore; device logging left disabled"
            );
        }
    }
}

async fn post_interval(
    client: &dyn TransferClient,
    url: &str,
    timeout: Duration,
    interval_ms: u64,
) -> Result<(), SettingsError> {
    let patch = serde_json::to_value(SettingsPatch::logging_interval(interval_ms))?;
    client
        .send(DeviceRequest::post(url, timeout).json(patch))
        .await
        .map(drop)
        .map_err(SettingsError::Write)
}
