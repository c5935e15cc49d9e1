//! Run progress accounting and the snapshot handed to observers.

use std::time::Duration;

use flory_device::TransferAttempt;
use flory_transfer::{Entry, SpeedCalculator, format_bytes};

use crate::activity::ActivityLog;
use crate::types::RunPhase;

/// Tracks counters and the activity log for one run.
///
/// Counters only grow during a run: `completed` and `bytes_sent` count
/// files the device acknowledged, never attempts in flight.
pub struct ProgressReporter {
    phase: RunPhase,
    completed: usize,
    total: usize,
    bytes_sent: u64,
    total_bytes: u64,
    attempts: u64,
    log: ActivityLog,
    speed: SpeedCalculator,
}

/// Point-in-time copy of a run's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub completed: usize,
    pub total: usize,
    pub bytes_sent: u64,
    pub total_bytes: u64,
    pub attempts: u64,
    pub percent: u8,
    pub bytes_per_second: f64,
    pub eta: Option<Duration>,
    pub cancel_requested: bool,
    /// Activity log, newest first.
    pub activity: Vec<String>,
}

impl ProgressReporter {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            phase: RunPhase::Idle,
            completed: 0,
            total: 0,
            bytes_sent: 0,
            total_bytes: 0,
            attempts: 0,
            log: ActivityLog::new(log_capacity),
            speed: SpeedCalculator::default(),
        }
    }

    /// Resets counters and clears the activity log for a new run over
    /// `entries`.
    pub fn begin(&mut self, entries: &[Entry]) {
        self.phase = RunPhase::Idle;
        self.log.clear();
        self.completed = 0;
        self.total = entries.len();
        self.bytes_sent = 0;
        self.total_bytes = entries.iter().map(|e| e.size).sum();
        self.attempts = 0;
        self.speed.clear();
        // Baseline sample so the first completion yields a rate.
        self.speed.record(0);
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: RunPhase) {
        self.phase = phase;
    }

    /// Appends a line to the activity log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line);
    }

    /// Records the outcome of one upload attempt.
    ///
    /// Failures append a retry line and return it. Successes are logged by
    /// [`record_completion`](Self::record_completion).
    pub fn record_attempt(
        &mut self,
        path: &str,
        attempt: u32,
        max_attempts: u32,
        outcome: &TransferAttempt,
    ) -> Option<String> {
        self.attempts += 1;
        let failure = outcome.as_ref().err()?;
        let line = format!("Retry {attempt}/{max_attempts} for {path}: {failure}");
        self.log.push(line.clone());
        Some(line)
    }

    /// Counts `entry` as delivered and returns the log line appended.
    pub fn record_completion(&mut self, entry: &Entry) -> String {
        self.completed += 1;
        self.bytes_sent += entry.size;
        self.speed.record(entry.size);
        let line = format!("✔ {} ({})", entry.relative_path, format_bytes(entry.size));
        self.log.push(line.clone());
        line
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Completed files as a rounded percentage of the total.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // Floored, so 100 only shows once every file is done.
        (self.completed.min(self.total) * 100 / self.total) as u8
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    pub fn snapshot(&self, cancel_requested: bool) -> RunSnapshot {
        let remaining = self.total_bytes.saturating_sub(self.bytes_sent);
        RunSnapshot {
            phase: self.phase,
            completed: self.completed,
            total: self.total,
            bytes_sent: self.bytes_sent,
            total_bytes: self.total_bytes,
            attempts: self.attempts,
            percent: self.percent(),
            bytes_per_second: self.speed.rate(),
            eta: if remaining == 0 {
                Some(Duration::ZERO)
            } else {
                self.speed.eta(remaining)
            },
            cancel_requested,
            activity: self.log.to_vec(),
        }
    }
}
