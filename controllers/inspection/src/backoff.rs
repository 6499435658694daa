//! # Error Requeue Backoff
//!
//! Fibonacci-based requeue delays for InspectionReports whose reconciliation
//! keeps failing. Delays are computed in minutes: 1m, 1m, 2m, 3m, 5m, 8m, 10m (max).
//!
//! Consecutive failures are counted per report and the count is cleared as
//! soon as a reconciliation succeeds.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Shortest requeue delay in minutes
pub const MIN_BACKOFF_MINUTES: u64 = 1;

/// Longest requeue delay in minutes
pub const MAX_BACKOFF_MINUTES: u64 = 10;

/// Fibonacci backoff for a given consecutive error count (0-indexed).
///
/// The sequence starts at `min_minutes` for counts 0 and 1 and is capped at `max_minutes`.
#[must_use]
pub fn fibonacci_backoff(error_count: u32, min_minutes: u64, max_minutes: u64) -> Duration {
    let mut prev_minutes = min_minutes;
    let mut current_minutes = min_minutes;

    for _ in 2..=error_count {
        let next_minutes = prev_minutes + current_minutes;
        prev_minutes = current_minutes;
        current_minutes = std::cmp::min(next_minutes, max_minutes);

        if current_minutes >= max_minutes {
            break;
        }
    }

    Duration::from_secs(std::cmp::min(current_minutes, max_minutes) * 60)
}

/// Per-report consecutive error counter
#[derive(Debug, Default)]
pub struct ErrorBackoff {
    errors: Mutex<HashMap<String, u32>>,
}

impl ErrorBackoff {
    /// Records a failure for `key` and returns how long to wait before retrying.
    pub fn record_failure(&self, key: &str) -> Duration {
        let count = match self.errors.lock() {
            Ok(mut errors) => {
                let count = errors.entry(key.to_string()).or_insert(0);
                let current = *count;
                *count = count.saturating_add(1);
                current
            }
            Err(_) => 0,
        };
        fibonacci_backoff(count, MIN_BACKOFF_MINUTES, MAX_BACKOFF_MINUTES)
    }

    /// Clears the failure count for `key` after a successful reconciliation.
    pub fn reset(&self, key: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.remove(key);
        }
    }
}
