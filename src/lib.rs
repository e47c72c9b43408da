//! Exact distinct-IPv4 counting over large line-oriented inputs.
//!
//! ## Scope
//! This crate reads text one line at a time, keeps the lines that are IPv4
//! addresses (or IPv4-mapped IPv6), and marks each address in a bitmap that
//! covers the entire 32-bit address space. The number of distinct
//! addresses is the bitmap's population count.
//!
//! ## Key invariants
//! - Memory is fixed: one 512 MiB allocation, made once, never grown.
//! - Insertion is O(1) with no hashing or collision handling.
//! - Bit `n` is set iff address `n` appeared at least once.
//! - Malformed and non-IPv4 lines are skipped silently; only allocation,
//!   open and read failures are errors.
//!
//! ## Flow
//! `Input -> LineReader -> parse_line -> AddressSet -> count`
//! with progress checkpoints emitted to an [`EventSink`] along the way.
//!
//! ## Notable entry points
//! - [`AddressSet`]: the bitmap (`set`, `insert`, `count`).
//! - [`scan_path`] / [`scan_reader`] / [`scan_bytes`]: one pass over an input.
//! - [`parse_line`]: line-to-key parsing.
//! - [`runner::run`]: what the binary does.
//!
//! ```no_run
//! use ipcount_rs::{scan_path, AddressSet, InputMode, NullEventSink, ScanConfig};
//!
//! let mut set = AddressSet::new()?;
//! scan_path(
//!     "ips.txt".as_ref(),
//!     InputMode::Buffered,
//!     &mut set,
//!     NullEventSink,
//!     &ScanConfig::default(),
//! )?;
//! println!("Unique IPs: {}", set.count());
//! # Ok::<(), ipcount_rs::ScanError>(())
//! ```

pub mod address;
pub mod address_set;
pub mod cli;
pub mod error;
pub mod events;
pub mod line_reader;
pub mod perf_stats;
pub mod progress;
pub mod runner;
pub mod scan;
pub mod stdx;
#[cfg(test)]
pub mod test_utils;

pub use address::{ipv4_from_key, key_from_ipv4, parse_line};
pub use address_set::{AddressSet, ADDRESS_SPACE_BITS, ADDRESS_SPACE_BYTES};
pub use error::{Result, ScanError};
pub use events::{
    EventSink, JsonlEventSink, NullEventSink, ScanEvent, SummaryEvent, TerminalEventSink,
    VecEventSink,
};
pub use line_reader::{Line, LineReader};
pub use progress::{ProgressEvent, ProgressTracker};
pub use scan::{scan_bytes, scan_path, scan_reader, InputMode, LineScanner, ScanConfig, ScanStats};
