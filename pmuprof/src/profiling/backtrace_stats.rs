// Rates are reported as floating point percentages
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

/// Collection quality of a backtrace log.
///
/// A non-zero failure count is informational only: failed traces are
/// truncated stacks, still usable for the call graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BacktraceStats {
    pub total: usize,
    pub failed: usize,
}

impl BacktraceStats {
    /// `failed / total`, 0 when there are no backtraces.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }

    /// One-line human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "backtrace failed for {:.2}% ({} / {})",
            self.failure_rate() * 100.0,
            self.failed,
            self.total
        )
    }
}
