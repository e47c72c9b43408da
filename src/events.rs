//! Scan events, output sinks, and the JSONL encoder.
//!
//! The scan loop emits [`ScanEvent`] values through an [`EventSink`].
//! Sinks decide presentation:
//!
//! | Sink | Output |
//! |------|--------|
//! | [`TerminalEventSink`] | carriage-return progress bar redraws |
//! | [`JsonlEventSink`] | one JSON object per event per line |
//! | [`NullEventSink`] | nothing |
//! | [`VecEventSink`] | JSONL bytes kept in memory |
//!
//! Progress output is ancillary: a sink that fails to write drops the
//! event instead of failing the scan.

use std::fmt::{self, Write as _};
use std::io::{BufWriter, ErrorKind, Write};
use std::time::Duration;

use crate::progress::{render_progress, ProgressEvent};

// ============================================================================
// Event types
// ============================================================================

/// Structured event emitted during or after a scan.
pub enum ScanEvent<'a> {
    Progress(&'a ProgressEvent),
    Summary(SummaryEvent<'a>),
}

/// Final summary emitted once the count is known.
pub struct SummaryEvent<'a> {
    /// Input label (path, or `-` for stdin).
    pub input: &'a str,
    pub status: &'static str,
    pub unique: u64,
    pub lines: u64,
    pub addresses: u64,
    pub skipped: u64,
    pub duplicates: u64,
    pub bytes: u64,
    pub elapsed_ms: u64,
    pub throughput_mib_s: f64,
}

// ============================================================================
// Traits
// ============================================================================

/// Consumer of scan events.
///
/// The scan is single-threaded, so sinks take `&mut self` and need no
/// internal synchronization.
pub trait EventSink {
    /// Present a single event. Must not fail the scan.
    fn emit(&mut self, event: &ScanEvent<'_>);
    /// Flush buffered output. Called once after the final event.
    fn flush(&mut self);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        (**self).emit(event)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        (**self).emit(event)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

// ============================================================================
// Terminal sink
// ============================================================================

/// Redraws a single progress line with `\r`; the final redraw ends the line.
///
/// Summaries are not rendered here; the caller prints the result line.
pub struct TerminalEventSink<W: Write> {
    out: W,
    line: String,
}

impl<W: Write> TerminalEventSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line: String::with_capacity(128),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for TerminalEventSink<W> {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        let ScanEvent::Progress(progress) = event else {
            return;
        };
        self.line.clear();
        render_progress(progress, &mut self.line);
        if progress.is_final {
            self.line.push('\n');
        }
        // Redraws must reach the terminal immediately.
        let _ = self
            .out
            .write_all(self.line.as_bytes())
            .and_then(|()| self.out.flush());
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

// ============================================================================
// JSONL encoder
// ============================================================================

/// Appends the JSONL encoding of `event` (including the trailing `\n`).
///
/// Key order is fixed so lines diff cleanly between runs.
pub fn encode_jsonl(event: &ScanEvent<'_>, buf: &mut Vec<u8>) {
    // Writing into a Vec cannot fail.
    let _ = writeln!(buf, "{}", JsonLine(event));
}

/// `Display` adapter rendering one event as a JSON object.
struct JsonLine<'e, 'a>(&'e ScanEvent<'a>);

impl fmt::Display for JsonLine<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ScanEvent::Progress(p) => write!(
                f,
                "{{\"type\":\"progress\",\"bytes\":{},\"total_bytes\":{},\"percent\":{},\
                 \"lines\":{},\"elapsed_ms\":{},\"eta_ms\":{},\"final\":{}}}",
                p.bytes_consumed,
                OrNull(p.total_bytes),
                OrNull(p.percent().map(Hundredths)),
                p.lines,
                duration_ms(p.elapsed),
                OrNull(p.eta.map(duration_ms)),
                p.is_final,
            ),
            ScanEvent::Summary(s) => write!(
                f,
                "{{\"type\":\"summary\",\"input\":{},\"status\":{},\"unique\":{},\
                 \"lines\":{},\"addresses\":{},\"skipped\":{},\"duplicates\":{},\
                 \"bytes\":{},\"elapsed_ms\":{},\"throughput_mib_s\":{}}}",
                JsonStr(s.input),
                JsonStr(s.status),
                s.unique,
                s.lines,
                s.addresses,
                s.skipped,
                s.duplicates,
                s.bytes,
                s.elapsed_ms,
                Hundredths(s.throughput_mib_s),
            ),
        }
    }
}

/// Optional value, `null` when absent.
struct OrNull<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for OrNull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("null"),
        }
    }
}

/// Percentages and rates: two decimals. JSON has no NaN/Inf, so those
/// render as `0.00`.
struct Hundredths(f64);

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = if self.0.is_finite() { self.0 } else { 0.0 };
        write!(f, "{v:.2}")
    }
}

/// Quoted JSON string. Input labels are file paths, so quotes, backslashes
/// and control bytes are the only characters that need escaping.
struct JsonStr<'a>(&'a str);

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        let mut rest = self.0;
        while let Some(pos) = rest.find(|c: char| c == '"' || c == '\\' || c < ' ') {
            f.write_str(&rest[..pos])?;
            let c = rest[pos..].chars().next().unwrap_or_default();
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                _ => write!(f, "\\u{:04x}", c as u32)?,
            }
            rest = &rest[pos + c.len_utf8()..];
        }
        f.write_str(rest)?;
        f.write_char('"')
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// JSONL sink
// ============================================================================

const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

/// Writes one JSON object per event.
pub struct JsonlEventSink<W: Write> {
    writer: BufWriter<W>,
    scratch: Vec<u8>,
    broken: bool,
}

impl<W: Write> JsonlEventSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(DEFAULT_BUF_CAPACITY, writer),
            scratch: Vec::with_capacity(256),
            broken: false,
        }
    }
}

impl<W: Write> EventSink for JsonlEventSink<W> {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        if self.broken {
            return;
        }
        self.scratch.clear();
        encode_jsonl(event, &mut self.scratch);
        if let Err(e) = self.writer.write_all(&self.scratch) {
            // A closed reader (e.g. `| head`) ends event output for good.
            self.broken = e.kind() == ErrorKind::BrokenPipe;
        }
    }

    fn flush(&mut self) {
        if !self.broken {
            let _ = self.writer.flush();
        }
    }
}

// ============================================================================
// Null / in-memory sinks
// ============================================================================

/// Discards all events.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: &ScanEvent<'_>) {}
    fn flush(&mut self) {}
}

/// Collects JSONL-encoded events in memory (for tests and embedding).
#[derive(Default)]
pub struct VecEventSink {
    buf: Vec<u8>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return all accumulated JSONL bytes.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Accumulated bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl EventSink for VecEventSink {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        encode_jsonl(event, &mut self.buf);
    }

    fn flush(&mut self) {}
}

// ============================================================================
// Tests
// ============================================================================
