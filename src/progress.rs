//! Progress bookkeeping and terminal rendering for a single scan pass.
//!
//! [`ProgressTracker`] owns the per-run counters (bytes consumed, bytes at
//! the last emission, total size, start time) and decides when a progress
//! checkpoint is due. It never writes anything itself; snapshots are
//! handed to an [`EventSink`](crate::events::EventSink).
//!
//! # Emission policy
//!
//! A checkpoint is due once the consumed byte count has grown by *more
//! than* the configured interval since the previous checkpoint. One final
//! checkpoint is always taken at end of input and reports 100% when the
//! total size is known.
//!
//! # Terminal format
//!
//! ```text
//! \r[##########----------------------------------------]  20.00% | Elapsed: 4s | ETA: 16s
//! ```
//!
//! Without a known total size only a count-only line is rendered:
//!
//! ```text
//! \rScanned 120.50 MiB | Lines: 8400000 | Elapsed: 1m 3s
//! ```

use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Default checkpoint interval (10 MiB).
pub const DEFAULT_PROGRESS_INTERVAL_BYTES: u64 = 10 * 1024 * 1024;
/// Width of the rendered bar in characters, brackets excluded.
pub const PROGRESS_BAR_WIDTH: usize = 50;

const MIB: f64 = 1024.0 * 1024.0;

/// Point-in-time view of scan progress.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Input bytes consumed so far. Never decreases across a scan.
    pub bytes_consumed: u64,
    /// Total input size, when the source reported one.
    pub total_bytes: Option<u64>,
    /// Completed fraction in `[0, 1]`; `None` when the total is unknown.
    pub fraction: Option<f64>,
    /// Lines read so far.
    pub lines: u64,
    /// Wall-clock time since the scan started.
    pub elapsed: Duration,
    /// Estimated time remaining; `None` when the total is unknown.
    pub eta: Option<Duration>,
    /// `true` for the end-of-input checkpoint.
    pub is_final: bool,
}

impl ProgressEvent {
    /// Completed percentage (0..=100), when known.
    pub fn percent(&self) -> Option<f64> {
        self.fraction.map(|f| f * 100.0)
    }
}

/// Per-run progress counters and emission policy.
#[derive(Debug)]
pub struct ProgressTracker {
    total_bytes: Option<u64>,
    interval: u64,
    consumed: u64,
    last_emitted: u64,
    emissions: u64,
    start: Instant,
}

impl ProgressTracker {
    /// Starts tracking a pass over `total_bytes` (if known).
    pub fn new(total_bytes: Option<u64>, interval: u64) -> Self {
        Self::started_at(total_bytes, interval, Instant::now())
    }

    /// Starts tracking with an explicit start instant.
    pub fn started_at(total_bytes: Option<u64>, interval: u64, start: Instant) -> Self {
        Self {
            total_bytes,
            interval,
            consumed: 0,
            last_emitted: 0,
            emissions: 0,
            start,
        }
    }

    /// Records `bytes` more input and reports whether a checkpoint is due.
    #[inline]
    pub fn advance(&mut self, bytes: u64) -> bool {
        self.consumed = self.consumed.saturating_add(bytes);
        self.consumed - self.last_emitted > self.interval
    }

    /// Takes a checkpoint and resets the interval window.
    pub fn checkpoint(&mut self, lines: u64) -> ProgressEvent {
        self.snapshot(lines, false)
    }

    /// Takes the end-of-input checkpoint.
    pub fn finish(&mut self, lines: u64) -> ProgressEvent {
        self.snapshot(lines, true)
    }

    fn snapshot(&mut self, lines: u64, is_final: bool) -> ProgressEvent {
        self.last_emitted = self.consumed;
        self.emissions = self.emissions.saturating_add(1);

        let elapsed = self.start.elapsed();
        let fraction = self.total_bytes.map(|total| {
            if is_final || total == 0 {
                1.0
            } else {
                (self.consumed as f64 / total as f64).clamp(0.0, 1.0)
            }
        });
        let eta = fraction.map(|f| estimate_remaining(elapsed, f));

        ProgressEvent {
            bytes_consumed: self.consumed,
            total_bytes: self.total_bytes,
            fraction,
            lines,
            elapsed,
            eta,
            is_final,
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Number of checkpoints taken, the final one included.
    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    /// Time since the tracker started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// `elapsed * (1/fraction - 1)`, or zero when nothing is done yet.
pub fn estimate_remaining(elapsed: Duration, fraction: f64) -> Duration {
    if fraction <= 0.0 {
        return Duration::ZERO;
    }
    let secs = elapsed.as_secs_f64() * (1.0 / fraction - 1.0);
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Formats whole seconds as `Ns` below one minute, `Mm Ss` above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Appends a `[###---]` bar of `width` cells filled to `fraction`.
pub fn render_bar(fraction: f64, width: usize, out: &mut String) {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    out.push('[');
    out.extend(std::iter::repeat_n('#', filled));
    out.extend(std::iter::repeat_n('-', width - filled));
    out.push(']');
}

/// Appends the carriage-return-prefixed terminal line for `event`.
///
/// No trailing newline is written; the caller terminates the final line.
pub fn render_progress(event: &ProgressEvent, out: &mut String) {
    out.push('\r');
    match event.fraction {
        Some(fraction) => {
            render_bar(fraction, PROGRESS_BAR_WIDTH, out);
            let eta = event.eta.unwrap_or(Duration::ZERO);
            let _ = write!(
                out,
                " {:6.2}% | Elapsed: {} | ETA: {}",
                fraction * 100.0,
                format_duration(event.elapsed),
                format_duration(eta)
            );
        }
        None => {
            let _ = write!(
                out,
                "Scanned {:.2} MiB | Lines: {} | Elapsed: {}",
                event.bytes_consumed as f64 / MIB,
                event.lines,
                format_duration(event.elapsed)
            );
        }
    }
}
