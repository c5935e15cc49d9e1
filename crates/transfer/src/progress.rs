use std::collections::VecDeque;
use std::time::{Duration, Instant};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count for activity lines: `512 B`, `1.5 KB`, `12.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Transfer rate over a sliding time window.
///
/// Each sample is the number of bytes delivered since the previous one.
/// The oldest sample in the window only marks where the window starts.
#[derive(Debug, Clone)]
pub struct SpeedCalculator {
    samples: VecDeque<(Instant, u64)>,
    window: Duration,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

impl SpeedCalculator {
    pub fn new(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
        }
    }

    /// Records `bytes` delivered now.
    pub fn record(&mut self, bytes: u64) {
        self.record_at(Instant::now(), bytes);
    }

    /// Records `bytes` delivered at `at`. Samples must arrive in time order.
    pub fn record_at(&mut self, at: Instant, bytes: u64) {
        self.samples.push_back((at, bytes));
        while let Some(&(oldest, _)) = self.samples.front() {
            if at.duration_since(oldest) <= self.window {
                break;
            }
            self.samples.pop_front();
        }
    }

    /// Bytes per second across the window, or 0 without two samples.
    pub fn rate(&self) -> f64 {
        let (Some(&(start, _)), Some(&(end, _))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = end.duration_since(start);
        if elapsed.is_zero() {
            return 0.0;
        }
        let delivered: u64 = self.samples.iter().skip(1).map(|&(_, b)| b).sum();
        delivered as f64 / elapsed.as_secs_f64()
    }

    /// Time left for `remaining` bytes at the current rate.
    pub fn eta(&self, remaining: u64) -> Option<Duration> {
        let rate = self.rate();
        (rate > 0.0).then(|| Duration::from_secs_f64(remaining as f64 / rate))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
