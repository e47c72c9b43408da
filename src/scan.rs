//! The single-pass scan: lines in, address bits out.
//!
//! ```text
//! source -> LineReader -> parse_line -> key -> AddressSet::insert
//!                                     \-> ProgressTracker -> EventSink
//! ```
//!
//! [`LineScanner`] is the fold shared by every input path. It is fed one
//! line at a time together with the raw byte count that line consumed,
//! and is finished exactly once at end of input.
//!
//! ## Error policy
//! - Lines that are not 4-octet-representable IP literals are skipped and
//!   counted; they never raise an error.
//! - A read failure aborts the pass with [`ScanError::Read`]. No final
//!   progress event is emitted and no partial stats are returned.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use memmap2::Mmap;

use crate::address::parse_line;
use crate::address_set::AddressSet;
use crate::error::{Result, ScanError};
use crate::events::{EventSink, ScanEvent};
use crate::line_reader::{split_lines, LineReader, DEFAULT_READ_BUFFER_BYTES};
use crate::perf_stats::sat_inc_u64;
use crate::progress::{ProgressTracker, DEFAULT_PROGRESS_INTERVAL_BYTES};

/// Tuning knobs for a scan pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Consumed bytes between progress checkpoints.
    pub progress_interval_bytes: u64,
    /// Block size for buffered reads.
    pub read_buffer_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            progress_interval_bytes: DEFAULT_PROGRESS_INTERVAL_BYTES,
            read_buffer_bytes: DEFAULT_READ_BUFFER_BYTES,
        }
    }
}

/// How a file input is read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Block reads through [`LineReader`].
    #[default]
    Buffered,
    /// Map the whole file and split it in place.
    Mmap,
}

/// Counters for one completed pass.
///
/// The distinct count is not stored here; it is read from the
/// [`AddressSet`] after the pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Lines read, empty lines included.
    pub lines: u64,
    /// Lines accepted as an address.
    pub addresses: u64,
    /// Lines rejected by the parser.
    pub skipped: u64,
    /// Accepted lines whose address was already in the set.
    pub duplicates: u64,
    /// Raw input bytes consumed, terminators included.
    pub bytes_consumed: u64,
    /// Progress checkpoints emitted, the final one included.
    pub progress_emissions: u64,
    /// Wall-clock duration of the pass.
    pub elapsed: Duration,
}

impl ScanStats {
    /// Input throughput in MiB/s (0 when no time elapsed).
    pub fn throughput_mib_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.bytes_consumed as f64 / (1024.0 * 1024.0)) / secs
        } else {
            0.0
        }
    }
}

/// Per-line fold over an [`AddressSet`], with progress side effects.
pub struct LineScanner<'s, S: EventSink> {
    set: &'s mut AddressSet,
    sink: S,
    tracker: ProgressTracker,
    stats: ScanStats,
}

impl<'s, S: EventSink> LineScanner<'s, S> {
    /// Starts a pass over an input of `total_bytes` (if known).
    pub fn new(
        set: &'s mut AddressSet,
        sink: S,
        total_bytes: Option<u64>,
        config: &ScanConfig,
    ) -> Self {
        Self {
            set,
            sink,
            tracker: ProgressTracker::new(total_bytes, config.progress_interval_bytes),
            stats: ScanStats::default(),
        }
    }

    /// Processes one line (terminator stripped) that consumed `consumed`
    /// raw bytes.
    #[inline]
    pub fn observe(&mut self, line: &[u8], consumed: usize) {
        sat_inc_u64(&mut self.stats.lines);
        match parse_line(line) {
            Some(key) => {
                sat_inc_u64(&mut self.stats.addresses);
                if !self.set.insert(key) {
                    sat_inc_u64(&mut self.stats.duplicates);
                }
            }
            None => sat_inc_u64(&mut self.stats.skipped),
        }

        if self.tracker.advance(consumed as u64) {
            let event = self.tracker.checkpoint(self.stats.lines);
            self.sink.emit(&ScanEvent::Progress(&event));
        }
    }

    /// Lines observed so far.
    pub fn lines(&self) -> u64 {
        self.stats.lines
    }

    /// Emits the final checkpoint and returns the pass counters.
    pub fn finish(mut self) -> ScanStats {
        let event = self.tracker.finish(self.stats.lines);
        self.sink.emit(&ScanEvent::Progress(&event));
        self.sink.flush();

        let mut stats = self.stats;
        stats.bytes_consumed = self.tracker.consumed();
        stats.progress_emissions = self.tracker.emissions();
        stats.elapsed = self.tracker.elapsed();
        stats
    }
}

/// Scans a line-oriented reader to completion.
///
/// `total_bytes` drives percentage progress; pass `None` for sources with
/// no size (pipes, stdin) to get count-only progress.
pub fn scan_reader<R: Read, S: EventSink>(
    reader: R,
    total_bytes: Option<u64>,
    set: &mut AddressSet,
    sink: S,
    config: &ScanConfig,
) -> Result<ScanStats> {
    let mut lines = LineReader::with_capacity(config.read_buffer_bytes, reader);
    let mut scanner = LineScanner::new(set, sink, total_bytes, config);
    while let Some(line) = lines.next_line().map_err(ScanError::Read)? {
        scanner.observe(line.bytes, line.consumed);
    }
    Ok(scanner.finish())
}

/// Scans an in-memory buffer. Infallible: there is nothing left to read.
pub fn scan_bytes<S: EventSink>(
    data: &[u8],
    set: &mut AddressSet,
    sink: S,
    config: &ScanConfig,
) -> ScanStats {
    let mut scanner = LineScanner::new(set, sink, Some(data.len() as u64), config);
    for line in split_lines(data) {
        scanner.observe(line.bytes, line.consumed);
    }
    scanner.finish()
}

/// Opens `path` and scans it.
///
/// The size is taken once from the file's metadata. Non-regular files
/// (FIFOs, character devices) have no meaningful size: they get count-only
/// progress and are always read in buffered mode.
pub fn scan_path<S: EventSink>(
    path: &Path,
    mode: InputMode,
    set: &mut AddressSet,
    sink: S,
    config: &ScanConfig,
) -> Result<ScanStats> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let meta = file.metadata().map_err(|source| ScanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    let total_bytes = meta.is_file().then(|| meta.len());

    match (mode, total_bytes) {
        (InputMode::Mmap, Some(0)) => Ok(scan_bytes(&[], set, sink, config)),
        (InputMode::Mmap, Some(_)) => {
            // SAFETY: the map is read-only and dropped before returning. A
            // concurrent writer truncating the file can still fault the
            // process; that is accepted for the opt-in mmap mode.
            let map = unsafe { Mmap::map(&file) }.map_err(|source| ScanError::Map {
                path: path.to_path_buf(),
                source,
            })?;
            #[cfg(unix)]
            let _ = map.advise(memmap2::Advice::Sequential);
            Ok(scan_bytes(&map, set, sink, config))
        }
        _ => scan_reader(file, total_bytes, set, sink, config),
    }
}
