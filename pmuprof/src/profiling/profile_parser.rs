//! PMU sample log parsing
//!
//! The log comes in one of two shapes, told apart by the presence of a
//! sentinel line anywhere in the file.
//!
//! **Flat log**: one weighted sample per line.
//!
//! ```text
//! 0000000000412f80 0 12
//! 00002c8000401a20 0 3
//! ```
//!
//! **Backtrace log**: frames innermost first, each trace opened by a
//! sentinel. A trace closed by the failed marker was truncated while being
//! collected.
//!
//! ```text
//! deadbeefdeadbeef
//! 0000000000412f80      ← innermost frame, also counted as a flat sample
//! 0000000000410010
//! feedfacefeedface      ← closes the trace above as failed
//! 0000000000412f90
//! ```

use log::{info, warn};
use std::path::Path;

use crate::classification::parse_rip;
use crate::domain::{Backtrace, ProfileError, Rip};
use crate::profiling::BacktraceStats;

/// Opens (and closes the previous) backtrace.
pub const TRACE_SENTINEL: &str = "deadbeefdeadbeef";

/// Closes the previous backtrace as failed and opens the next one.
pub const FAILED_SENTINEL: &str = "feedfacefeedface";

/// Upper bound on the expanded sample count of a flat log.
///
/// Every sample is materialised for the sorted merge-scan, so a corrupt
/// count must fail the parse before it reaches the allocator.
pub const MAX_FLAT_SAMPLES: usize = 1 << 26;

/// Shape of the sample log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Flat,
    Backtrace,
}

/// Everything extracted from one sample log.
#[derive(Debug, Clone)]
pub struct ParsedProfile {
    pub format: LogFormat,

    /// One entry per time-slice hit. For backtrace logs this is the
    /// innermost frame of every trace.
    pub samples: Vec<Rip>,

    /// Empty for flat logs.
    pub backtraces: Vec<Backtrace>,

    /// Present only for backtrace logs.
    pub stats: Option<BacktraceStats>,
}

/// Read and parse a sample log from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or a line is malformed
pub fn read_profile(path: &Path) -> Result<ParsedProfile, ProfileError> {
    let text = std::fs::read_to_string(path)?;
    let profile = parse_profile(&text)?;
    info!(
        "Parsed {} ({:?} log): {} samples, {} backtraces",
        path.display(),
        profile.format,
        profile.samples.len(),
        profile.backtraces.len()
    );
    Ok(profile)
}

/// Parse a sample log held in memory.
///
/// # Errors
/// Returns `MalformedInput` for the first line that does not fit the format
pub fn parse_profile(text: &str) -> Result<ParsedProfile, ProfileError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    if lines.iter().any(|(_, line)| is_sentinel(line)) {
        parse_backtrace_log(&lines)
    } else {
        parse_flat_log(&lines)
    }
}

fn is_sentinel(line: &str) -> bool {
    line == TRACE_SENTINEL || line == FAILED_SENTINEL
}

fn malformed(line: usize, content: &str, reason: impl Into<String>) -> ProfileError {
    ProfileError::MalformedInput { line, content: content.to_string(), reason: reason.into() }
}

fn parse_flat_log(lines: &[(usize, &str)]) -> Result<ParsedProfile, ProfileError> {
    let mut samples = Vec::new();

    for &(line_no, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [addr, _, count, ..] = fields.as_slice() else {
            return Err(malformed(line_no, line, "expected <address> <field> <count>"));
        };
        let rip = parse_rip(addr).map_err(|reason| malformed(line_no, line, reason))?;
        let count: usize = count
            .parse()
            .map_err(|e| malformed(line_no, line, format!("invalid sample count {count:?}: {e}")))?;

        let within_limit =
            samples.len().checked_add(count).is_some_and(|total| total <= MAX_FLAT_SAMPLES);
        if !within_limit {
            return Err(malformed(
                line_no,
                line,
                format!("sample count {count} exceeds the limit of {MAX_FLAT_SAMPLES} samples"),
            ));
        }
        samples.extend(std::iter::repeat(rip).take(count));
    }

    Ok(ParsedProfile { format: LogFormat::Flat, samples, backtraces: Vec::new(), stats: None })
}

/// Accumulates frames between sentinels.
#[derive(Default)]
struct BacktraceCollector {
    current: Vec<Rip>,
    first_frame_pending: bool,
    samples: Vec<Rip>,
    backtraces: Vec<Backtrace>,
    failed: usize,
}

impl BacktraceCollector {
    fn sentinel(&mut self, line: &str) {
        self.close(line == FAILED_SENTINEL);
        self.first_frame_pending = true;
    }

    fn frame(&mut self, rip: Rip) {
        if self.first_frame_pending {
            self.samples.push(rip);
            self.first_frame_pending = false;
        }
        self.current.push(rip);
    }

    /// Empty traces are dropped, including a trailing sentinel's.
    fn close(&mut self, failed: bool) {
        if self.current.is_empty() {
            return;
        }
        if failed {
            self.failed += 1;
        }
        let frames = std::mem::take(&mut self.current);
        self.backtraces.push(Backtrace { frames, failed });
    }

    fn finish(mut self) -> ParsedProfile {
        self.close(false);
        let stats = BacktraceStats { total: self.backtraces.len(), failed: self.failed };

        if stats.failed > 0 {
            warn!("{}", stats.summary());
        } else {
            info!("{}", stats.summary());
        }

        ParsedProfile {
            format: LogFormat::Backtrace,
            samples: self.samples,
            backtraces: self.backtraces,
            stats: Some(stats),
        }
    }
}

fn parse_backtrace_log(lines: &[(usize, &str)]) -> Result<ParsedProfile, ProfileError> {
    let mut collector = BacktraceCollector::default();

    for &(line_no, line) in lines {
        if is_sentinel(line) {
            collector.sentinel(line);
        } else {
            let rip = parse_rip(line).map_err(|reason| malformed(line_no, line, reason))?;
            collector.frame(rip);
        }
    }

    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_log_repeats_by_count() {
        let profile = parse_profile("ff00 0 3\nff01 0 1\n").unwrap();

        assert_eq!(profile.format, LogFormat::Flat);
        assert_eq!(profile.samples.len(), 4);
        assert_eq!(profile.samples[..3], [Rip::kernel(0xff00); 3]);
        assert_eq!(profile.samples[3], Rip::kernel(0xff01));
        assert!(profile.backtraces.is_empty());
        assert!(profile.stats.is_none());
    }

    #[test]
    fn test_flat_log_skips_blank_lines_and_zero_counts() {
        let profile = parse_profile("\n  ff00 0 0  \n\n00002c8000000010 x 2\n").unwrap();

        assert_eq!(profile.samples, vec![Rip::user(0x2c80_0000_0010); 2]);
    }

    #[test]
    fn test_flat_log_missing_field_is_malformed() {
        let err = parse_profile("ff00 0 1\nff01 0\n").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_flat_log_bad_count_is_malformed() {
        let err = parse_profile("ff00 0 many\n").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_flat_log_huge_count_is_malformed() {
        let err = parse_profile("ff00 0 18446744073709551615\n").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_flat_log_total_over_limit_is_malformed() {
        let log = format!("ff00 0 2\nff01 0 {}\n", MAX_FLAT_SAMPLES - 1);
        let err = parse_profile(&log).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_flat_log_bad_address_is_malformed() {
        let err = parse_profile("xyz 0 1\n").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_backtrace_log_splits_on_sentinels() {
        let log = "deadbeefdeadbeef\nff00\nff10\ndeadbeefdeadbeef\nff00\nff20\n";
        let profile = parse_profile(log).unwrap();

        assert_eq!(profile.format, LogFormat::Backtrace);
        assert_eq!(profile.backtraces.len(), 2);
        assert_eq!(profile.backtraces[0].frames, vec![Rip::kernel(0xff00), Rip::kernel(0xff10)]);
        assert_eq!(profile.backtraces[1].frames, vec![Rip::kernel(0xff00), Rip::kernel(0xff20)]);
        assert!(profile.backtraces.iter().all(|bt| !bt.failed));

        // First frame of each trace doubles as a flat sample
        assert_eq!(profile.samples, vec![Rip::kernel(0xff00), Rip::kernel(0xff00)]);

        let stats = profile.stats.unwrap();
        assert_eq!((stats.total, stats.failed), (2, 0));
        assert!(stats.failure_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_marker_closes_failed_trace() {
        let log = "deadbeefdeadbeef\nff00\nfeedfacefeedface\nff08\nff10\ndeadbeefdeadbeef\n";
        let profile = parse_profile(log).unwrap();

        assert_eq!(profile.backtraces.len(), 2);
        assert!(profile.backtraces[0].failed);
        assert!(!profile.backtraces[1].failed);

        let stats = profile.stats.unwrap();
        assert_eq!((stats.total, stats.failed), (2, 1));
        assert!((stats.failure_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trailing_sentinel_without_frames_is_discarded() {
        let log = "deadbeefdeadbeef\nff00\ndeadbeefdeadbeef\ndeadbeefdeadbeef\n";
        let profile = parse_profile(log).unwrap();

        assert_eq!(profile.backtraces.len(), 1);
        assert_eq!(profile.samples.len(), 1);
    }

    #[test]
    fn test_failed_marker_with_nothing_to_close_counts_nothing() {
        let log = "feedfacefeedface\nff00\n";
        let profile = parse_profile(log).unwrap();

        assert_eq!(profile.backtraces.len(), 1);
        assert_eq!(profile.stats.unwrap().failed, 0);
    }

    #[test]
    fn test_backtrace_log_rejects_non_address_frame() {
        let err = parse_profile("deadbeefdeadbeef\nff00 0 1\n").unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_read_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prof.txt");
        std::fs::write(&path, "ff00 0 2\n").unwrap();

        let profile = read_profile(&path).unwrap();
        assert_eq!(profile.samples.len(), 2);
    }

    #[test]
    fn test_read_profile_missing_file() {
        let err = read_profile(Path::new("/nonexistent/prof.txt")).unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}
