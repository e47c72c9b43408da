//! Error types for the distinct-address scan.
//!
//! Only fatal conditions are represented here. Lines that do not parse as
//! an IPv4 address are expected input and never become errors; they are
//! counted as skipped by the scan loop.
//!
//! # Design Notes
//! - I/O errors preserve their source so diagnostics stay actionable.
//! - The enum is `#[non_exhaustive]`; consumers should keep a fallback arm.
//! - There is no `From<io::Error>`: each call site names the stage that
//!   failed (`Open`, `Read`, `Write`, ...).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Fatal errors raised while setting up or running a scan.
#[derive(Debug)]
#[non_exhaustive]
pub enum ScanError {
    /// The address bitmap could not be allocated.
    Alloc { bytes: u64 },
    /// The input could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Size metadata for the input could not be read.
    Metadata { path: PathBuf, source: io::Error },
    /// Memory-mapping the input failed.
    Map { path: PathBuf, source: io::Error },
    /// A read failed part-way through the scan.
    Read(io::Error),
    /// The result could not be written.
    Write(io::Error),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for the address bitmap")
            }
            Self::Open { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            Self::Metadata { path, source } => {
                write!(f, "cannot stat {}: {source}", path.display())
            }
            Self::Map { path, source } => {
                write!(f, "cannot memory-map {}: {source}", path.display())
            }
            Self::Read(err) => write!(f, "read failed: {err}"),
            Self::Write(err) => write!(f, "write failed: {err}"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Metadata { source, .. } | Self::Map { source, .. } => {
                Some(source)
            }
            Self::Read(err) | Self::Write(err) => Some(err),
            Self::Alloc { .. } => None,
        }
    }
}

/// Result alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
