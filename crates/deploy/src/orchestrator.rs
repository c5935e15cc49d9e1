//! Upload orchestrator: drives one wipe-then-repopulate run.
//!
//! Requests are strictly sequential. The device has a single-threaded
//! HTTP server and a shared SD card, so nothing here is ever issued in
//! parallel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use flory_device::{DeviceEndpoints, DeviceRequest, TransferClient, TransferFailure};
use flory_transfer::{Entry, open_payload};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::UploadError;
use crate::guard::{DeviceSettingsGuard, Preflight};
use crate::progress::{ProgressReporter, RunSnapshot};
use crate::types::{RunPhase, RunReport, UploadEvent, UploadOptions};

/// Sequences preflight, wipe, per-file upload with retry, settings
/// restore and restart against one device.
pub struct UploadOrchestrator {
    client: Arc<dyn TransferClient>,
    endpoints: DeviceEndpoints,
    options: UploadOptions,
    progress: Mutex<ProgressReporter>,
    cancel: Mutex<CancellationToken>,
    running: AtomicBool,
    /// Set once a receiver is taken; events are dropped until then.
    events_tx: Option<mpsc::UnboundedSender<UploadEvent>>,
    events_taken: bool,
}

/// Clears the running flag however `run` exits.
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl UploadOrchestrator {
    pub fn new(
        client: Arc<dyn TransferClient>,
        endpoints: DeviceEndpoints,
        mut options: UploadOptions,
    ) -> Self {
        options.max_attempts = options.max_attempts.max(1);
        Self {
            client,
            endpoints,
            progress: Mutex::new(ProgressReporter::new(options.activity_log_capacity)),
            options,
            cancel: Mutex::new(CancellationToken::new()),
            running: AtomicBool::new(false),
            events_tx: None,
            events_taken: false,
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn endpoints(&self) -> &DeviceEndpoints {
        &self.endpoints
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Only events emitted after this call are delivered.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        if self.events_taken {
            return None;
        }
        self.events_taken = true;
        let (tx, rx) = mpsc::unbounded_channel();
        self.events_tx = Some(tx);
        Some(rx)
    }

    /// Token of the current run, or of the last one if idle.
    ///
    /// Every run starts with a fresh token, so a token taken before
    /// [`run`](Self::run) is called has no effect on it.
    pub fn cancel_token(&self) -> CancellationToken {
        lock(&self.cancel).clone()
    }

    /// Requests that the current run stop at the next file boundary.
    ///
    /// A request already in flight is allowed to finish.
    pub fn cancel(&self) {
        if self.is_running() {
            info!("upload cancel requested");
        }
        lock(&self.cancel).cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let cancel_requested = lock(&self.cancel).is_cancelled();
        lock(&self.progress).snapshot(cancel_requested)
    }

    /// Uploads `entries` in order, replacing the device's web app.
    ///
    /// An empty list is a no-op and makes no device calls. Whatever the
    /// outcome, the device logger is restored if preflight paused it.
    pub async fn run(&self, entries: &[Entry]) -> Result<RunReport, UploadError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(UploadError::AlreadyRunning);
        }
        let _running = RunningFlag(&self.running);

        let cancel = CancellationToken::new();
        *lock(&self.cancel) = cancel.clone();
        lock(&self.progress).begin(entries);

        if entries.is_empty() {
            debug!("no files to upload");
            return Ok(self.report());
        }

        info!(
            files = entries.len(),
            device = %self.endpoints.base_url(),
            "upload started"
        );
        let result = self.drive(entries, &cancel).await;
        self.finish(result)
    }

    async fn drive(&self, entries: &[Entry], cancel: &CancellationToken) -> Result<(), UploadError> {
        let guard = self.preflight().await;
        let outcome = self.transfer(entries, cancel).await;
        self.restore_settings(guard).await;
        outcome?;

        if self.options.restart_after {
            self.restart().await;
        }
        Ok(())
    }

    async fn preflight(&self) -> DeviceSettingsGuard {
        if !self.options.suppress_device_logging {
            return DeviceSettingsGuard::disarmed();
        }
        self.set_phase(RunPhase::PreflightReadSettings);

        let (guard, outcome) = DeviceSettingsGuard::acquire(
            self.client.clone(),
            &self.endpoints,
            self.options.request_timeout,
        )
        .await;
        match outcome {
            Ok(Preflight::Suppressed { previous_ms }) => {
                self.log(format!("Device logging paused (was {previous_ms} ms)"));
            }
            Ok(Preflight::AlreadyDisabled) => self.log("Device logging already disabled"),
            Err(e) => {
                warn!(error = %e, "could not pause device logging");
                self.log(format!("Could not pause device logging: {e}"));
            }
        }
        guard
    }

    async fn transfer(&self, entries: &[Entry], cancel: &CancellationToken) -> Result<(), UploadError> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        if self.options.wipe_first {
            self.wipe(cancel).await?;
        }

        self.set_phase(RunPhase::Uploading);
        self.log(format!("Uploading {} files", entries.len()));

        for (index, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            self.upload_entry(entry, cancel).await?;
            if index + 1 < entries.len() {
                pause(self.options.inter_file_delay, cancel).await;
            }
        }

        self.log("All files uploaded successfully");
        Ok(())
    }

    async fn wipe(&self, cancel: &CancellationToken) -> Result<(), UploadError> {
        self.set_phase(RunPhase::Wiping);
        self.log("Wiping web app directory on device...");

        let request = DeviceRequest::post(self.endpoints.wipe(), self.options.request_timeout);
        self.client.send(request).await.map_err(UploadError::Wipe)?;

        self.log("Wipe OK");
        pause(self.options.post_wipe_settle, cancel).await;
        Ok(())
    }

    /// Uploads one file, retrying with linear backoff.
    ///
    /// The payload is reopened for every attempt. A cancel observed during
    /// backoff ends the run without another attempt.
    async fn upload_entry(&self, entry: &Entry, cancel: &CancellationToken) -> Result<(), UploadError> {
        let path = entry.relative_path.as_str();
        let max = self.options.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let payload = open_payload(&entry.content)
                .await
                .map_err(|source| UploadError::Payload {
                    path: path.to_string(),
                    source,
                })?;
            let request = DeviceRequest::post(self.endpoints.upload(), self.options.request_timeout)
                .upload(path, payload);
            let outcome = self.client.send(request).await;

            let retry_line = lock(&self.progress).record_attempt(path, attempt, max, &outcome);
            if let Some(line) = retry_line {
                self.emit(UploadEvent::Log(line));
            }

            match outcome {
                Ok(_) => {
                    debug!(path, attempt, size = entry.size, "file uploaded");
                    let (line, completed, total, bytes_sent) = {
                        let mut progress = lock(&self.progress);
                        let line = progress.record_completion(entry);
                        (line, progress.completed(), progress.total(), progress.bytes_sent())
                    };
                    self.emit(UploadEvent::Log(line));
                    self.emit(UploadEvent::Progress {
                        completed,
                        total,
                        bytes_sent,
                    });
                    return Ok(());
                }
                Err(failure) => {
                    warn!(path, attempt, max, error = %failure, "upload attempt failed");
                    if attempt >= max {
                        return Err(UploadError::RetryExhausted {
                            path: path.to_string(),
                            attempts: attempt,
                            last: failure,
                        });
                    }
                    pause(self.options.retry_base_delay * attempt, cancel).await;
                    if cancel.is_cancelled() {
                        return Err(UploadError::Cancelled);
                    }
                }
            }
        }
    }

    async fn restore_settings(&self, guard: DeviceSettingsGuard) {
        if !guard.is_armed() {
            return;
        }
        self.set_phase(RunPhase::RestoringSettings);
        match guard.restore().await {
            Ok(Some(interval_ms)) => {
                self.log(format!("Device logging restored ({interval_ms} ms)"));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not restore device logging");
                self.log(format!("Could not restore device logging: {e}"));
            }
        }
    }

    async fn restart(&self) {
        self.set_phase(RunPhase::Restarting);
        self.log("Restarting device...");

        let request = DeviceRequest::post(self.endpoints.restart(), self.options.request_timeout);
        match self.client.send(request).await {
            // The device often reboots before it answers.
            Ok(_) | Err(TransferFailure::Timeout(_) | TransferFailure::Network(_)) => {
                self.log("Restart requested");
            }
            Err(failure) => {
                warn!(error = %failure, "restart request rejected");
                self.log(format!("Restart request failed: {failure}"));
            }
        }
    }

    fn finish(&self, result: Result<(), UploadError>) -> Result<RunReport, UploadError> {
        match result {
            Ok(()) => {
                self.set_phase(RunPhase::Done);
                let report = self.report();
                info!(
                    files = report.completed,
                    bytes = report.bytes_sent,
                    attempts = report.attempts,
                    "upload finished"
                );
                self.emit(UploadEvent::Finished {
                    phase: RunPhase::Done,
                    error: None,
                });
                Ok(report)
            }
            Err(e) => {
                let message = e.to_string();
                self.set_phase(RunPhase::Aborted);
                if matches!(e, UploadError::Cancelled) {
                    info!("upload stopped by user");
                    self.log(message.clone());
                } else {
                    error!(error = %message, "upload aborted");
                    self.log(format!("Upload aborted: {message}"));
                }
                self.emit(UploadEvent::Finished {
                    phase: RunPhase::Aborted,
                    error: Some(message),
                });
                Err(e)
            }
        }
    }

    fn report(&self) -> RunReport {
        let progress = lock(&self.progress);
        RunReport {
            phase: progress.phase(),
            completed: progress.completed(),
            total: progress.total(),
            bytes_sent: progress.bytes_sent(),
            attempts: progress.attempts(),
        }
    }

    fn set_phase(&self, phase: RunPhase) {
        debug!(?phase, "upload phase");
        lock(&self.progress).set_phase(phase);
        self.emit(UploadEvent::Phase(phase));
    }

    fn log(&self, line: impl Into<String>) {
        let line = line.into();
        lock(&self.progress).log(line.clone());
        self.emit(UploadEvent::Log(line));
    }

    fn emit(&self, event: UploadEvent) {
        // Nobody listening is fine.
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event);
        }
    }
}

/// Sleeps for `delay`, waking early if the run is cancelled.
async fn pause(delay: Duration, cancel: &CancellationToken) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(delay) => {}
    }
}
