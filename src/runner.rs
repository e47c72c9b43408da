//! Top-level orchestration for one invocation.
//!
//! Allocates the address bitmap, runs the scan over the configured input,
//! and reports:
//!
//! - stdout: progress redraws (bar mode), then `Unique IPs: <N>`,
//! - stderr: a `key=value` stats line, plus JSONL events in jsonl mode.
//!
//! Any [`ScanError`] is returned before the result line is written, so a
//! failed run never prints a count.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::address_set::AddressSet;
use crate::cli::{Input, ProgressFormat, RunConfig};
use crate::error::{Result, ScanError};
use crate::events::{
    EventSink, JsonlEventSink, NullEventSink, ScanEvent, SummaryEvent, TerminalEventSink,
};
use crate::scan::{scan_path, scan_reader, ScanStats};

/// Outcome of a successful run.
#[derive(Clone, Copy, Debug)]
pub struct RunReport {
    /// Distinct addresses observed.
    pub unique: u64,
    pub stats: ScanStats,
    /// Time spent allocating the bitmap.
    pub init_elapsed: Duration,
}

/// Runs the scan described by `config` and writes the result.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let sink = build_event_sink(config.progress);
    let report = execute(config, sink)?;

    let stdout = io::stdout();
    write_result(&mut stdout.lock(), report.unique).map_err(ScanError::Write)?;
    eprintln!("{}", format_stats(&report));
    Ok(report)
}

/// Selects the event sink for a progress format.
pub fn build_event_sink(format: ProgressFormat) -> Box<dyn EventSink> {
    match format {
        ProgressFormat::Bar => Box::new(TerminalEventSink::new(io::stdout())),
        ProgressFormat::Jsonl => Box::new(JsonlEventSink::new(io::stderr())),
        ProgressFormat::None => Box::new(NullEventSink),
    }
}

/// Scans the configured input into a fresh bitmap and emits the summary.
pub fn execute<S: EventSink>(config: &RunConfig, mut sink: S) -> Result<RunReport> {
    let t0 = Instant::now();
    let mut set = AddressSet::new()?;
    let init_elapsed = t0.elapsed();

    let stats = match &config.input {
        Input::Path(path) => scan_path(path, config.mode, &mut set, &mut sink, &config.scan)?,
        Input::Stdin => {
            let stdin = io::stdin();
            scan_reader(stdin.lock(), None, &mut set, &mut sink, &config.scan)?
        }
    };
    let unique = set.count();

    let label = config.input.label();
    sink.emit(&ScanEvent::Summary(SummaryEvent {
        input: &label,
        status: "complete",
        unique,
        lines: stats.lines,
        addresses: stats.addresses,
        skipped: stats.skipped,
        duplicates: stats.duplicates,
        bytes: stats.bytes_consumed,
        elapsed_ms: u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
        throughput_mib_s: stats.throughput_mib_s(),
    }));
    sink.flush();

    Ok(RunReport {
        unique,
        stats,
        init_elapsed,
    })
}

/// Writes the final `Unique IPs: <N>` line.
pub fn write_result<W: Write>(out: &mut W, unique: u64) -> io::Result<()> {
    writeln!(out, "Unique IPs: {unique}")?;
    out.flush()
}

/// Machine-readable one-line run summary.
pub fn format_stats(report: &RunReport) -> String {
    let s = &report.stats;
    format!(
        "lines={} addresses={} skipped={} duplicates={} bytes={} unique={} init_ms={} elapsed_ms={} throughput_mib_s={:.2}",
        s.lines,
        s.addresses,
        s.skipped,
        s.duplicates,
        s.bytes_consumed,
        report.unique,
        report.init_elapsed.as_millis(),
        s.elapsed.as_millis(),
        s.throughput_mib_s(),
    )
}
