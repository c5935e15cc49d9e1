//! Data types for an upload run.

use std::time::Duration;

/// Operator-tunable parameters of an upload run.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Attempts per file before the run aborts (at least 1).
    pub max_attempts: u32,
    /// Retry `n` waits `retry_base_delay * n` before the next attempt.
    pub retry_base_delay: Duration,
    /// Pause between consecutive files.
    pub inter_file_delay: Duration,
    /// Upper bound on every device request.
    pub request_timeout: Duration,
    /// Wipe the web-app directory before uploading.
    pub wipe_first: bool,
    /// Pause after a successful wipe.
    pub post_wipe_settle: Duration,
    /// Disable the on-device SD logger for the duration of the run.
    pub suppress_device_logging: bool,
    /// Restart the device after a successful run.
    pub restart_after: bool,
    /// Lines kept in the activity log.
    pub activity_log_capacity: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(350),
            inter_file_delay: Duration::from_millis(200),
            request_timeout: Duration::from_secs(15),
            wipe_first: true,
            post_wipe_settle: Duration::from_millis(500),
            suppress_device_logging: true,
            restart_after: true,
            activity_log_capacity: 200,
        }
    }
}

/// Phase of an upload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Idle,
    PreflightReadSettings,
    Wiping,
    Uploading,
    RestoringSettings,
    Restarting,
    Done,
    Aborted,
}

impl RunPhase {
    /// Whether the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Aborted)
    }
}

/// Event emitted while a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// The run entered a new phase.
    Phase(RunPhase),
    /// A line was appended to the activity log.
    Log(String),
    /// A file finished uploading.
    Progress {
        completed: usize,
        total: usize,
        bytes_sent: u64,
    },
    /// The run reached a terminal phase.
    Finished {
        phase: RunPhase,
        error: Option<String>,
    },
}

/// Summary of a run that reached `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub phase: RunPhase,
    pub completed: usize,
    pub total: usize,
    pub bytes_sent: u64,
    /// Upload attempts issued, including failed ones.
    pub attempts: u64,
}
