//! Command-line parsing for the `ipcount-rs` binary.
//!
//! Hand-rolled (no clap dependency) to keep the binary small and start-up
//! instant.
//!
//! # Grammar
//!
//! ```text
//! ipcount-rs [OPTIONS] <path|->
//! ipcount-rs --help | -h
//! ```
//!
//! Running without a path prints the usage to stdout and exits
//! successfully. Invalid arguments print a diagnostic and the usage to
//! stderr and exit with code 2.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use crate::scan::{InputMode, ScanConfig};

const MIB: u64 = 1024 * 1024;
const KIB: usize = 1024;

/// Largest accepted `--read-buffer-kib` (1 GiB).
pub const MAX_READ_BUFFER_KIB: usize = 1024 * 1024;
/// Largest `--progress-interval-mib` whose byte count fits in a `u64`.
pub const MAX_PROGRESS_INTERVAL_MIB: u64 = u64::MAX / MIB;

/// Where lines are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Path(PathBuf),
    Stdin,
}

impl Input {
    /// Label used in diagnostics and summary events.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Stdin => "-".to_string(),
        }
    }
}

/// Progress output selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressFormat {
    /// Redrawn bar on stdout.
    #[default]
    Bar,
    /// JSONL progress and summary events on stderr.
    Jsonl,
    /// No progress output.
    None,
}

/// Fully parsed invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub input: Input,
    pub mode: InputMode,
    pub progress: ProgressFormat,
    pub scan: ScanConfig,
}

/// Reasons parsing stopped without producing a [`RunConfig`].
#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    /// No input was named; usage is shown and the exit is successful.
    MissingInput,
    /// `--help` was requested.
    Help,
    /// The arguments are invalid.
    Invalid(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => f.write_str("missing input path"),
            Self::Help => f.write_str("help requested"),
            Self::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CliError {}

/// Parse `std::env::args_os()` into a [`RunConfig`].
///
/// Prints usage to stdout and exits with code 0 for `--help` or a missing
/// path. Invalid arguments get a diagnostic plus usage on stderr and exit
/// code 2.
pub fn parse_args() -> RunConfig {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "ipcount-rs".into());
    match parse_from(args) {
        Ok(config) => config,
        Err(CliError::MissingInput | CliError::Help) => {
            println!("{}", usage(&exe));
            std::process::exit(0);
        }
        Err(CliError::Invalid(msg)) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprintln!("{}", usage(&exe));
            std::process::exit(2);
        }
    }
}

/// Parses arguments (program name already removed).
pub fn parse_from<I>(args: I) -> Result<RunConfig, CliError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut input: Option<Input> = None;
    let mut mode = InputMode::Buffered;
    let mut progress = ProgressFormat::Bar;
    let mut scan = ScanConfig::default();

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(rest) = flag.strip_prefix("--progress=") {
                progress = parse_progress_format(rest)?;
                continue;
            }
            if let Some(rest) = flag.strip_prefix("--progress-interval-mib=") {
                let mib = parse_bounded(rest, "--progress-interval-mib", MAX_PROGRESS_INTERVAL_MIB)?;
                scan.progress_interval_bytes = mib * MIB;
                continue;
            }
            if let Some(rest) = flag.strip_prefix("--read-buffer-kib=") {
                let kib = parse_bounded(rest, "--read-buffer-kib", MAX_READ_BUFFER_KIB)?;
                scan.read_buffer_bytes = kib * KIB;
                continue;
            }
            match flag {
                "--mmap" => {
                    mode = InputMode::Mmap;
                    continue;
                }
                "--help" | "-h" => return Err(CliError::Help),
                "-" => {
                    set_input(&mut input, Input::Stdin)?;
                    continue;
                }
                _ if flag.starts_with("--") => {
                    return Err(CliError::Invalid(format!("unknown flag: {flag}")));
                }
                _ => {}
            }
        }

        set_input(&mut input, Input::Path(PathBuf::from(arg)))?;
    }

    let Some(input) = input else {
        return Err(CliError::MissingInput);
    };
    if mode == InputMode::Mmap && input == Input::Stdin {
        return Err(CliError::Invalid("--mmap cannot be used with stdin".into()));
    }

    Ok(RunConfig {
        input,
        mode,
        progress,
        scan,
    })
}

fn set_input(slot: &mut Option<Input>, input: Input) -> Result<(), CliError> {
    if slot.is_some() {
        return Err(CliError::Invalid("multiple inputs provided".into()));
    }
    *slot = Some(input);
    Ok(())
}

fn parse_progress_format(value: &str) -> Result<ProgressFormat, CliError> {
    match value {
        "bar" => Ok(ProgressFormat::Bar),
        "jsonl" => Ok(ProgressFormat::Jsonl),
        "none" => Ok(ProgressFormat::None),
        _ => Err(CliError::Invalid(format!(
            "invalid --progress value: {value} (expected bar, jsonl or none)"
        ))),
    }
}

/// Parses an integer in `1..=max`.
fn parse_bounded<T>(value: &str, flag: &str, max: T) -> Result<T, CliError>
where
    T: std::str::FromStr + PartialOrd + Default + fmt::Display,
{
    match value.parse::<T>() {
        Ok(n) if n == T::default() => Err(CliError::Invalid(format!("{flag} must be >= 1"))),
        Ok(n) if n > max => Err(CliError::Invalid(format!("{flag} must be <= {max}"))),
        Ok(n) => Ok(n),
        Err(_) => Err(CliError::Invalid(format!("invalid {flag} value: {value}"))),
    }
}

fn usage(exe: &OsStr) -> String {
    format!(
        "usage: {} [OPTIONS] <path|->

Counts distinct IPv4 addresses, one candidate per line.

OPTIONS:
    --progress=<bar|jsonl|none>   Progress output (default: bar)
    --progress-interval-mib=<N>   Progress checkpoint every N MiB (default: 10)
    --mmap                        Memory-map the input file
    --read-buffer-kib=<N>         Buffered read size in KiB (default: 256, max: 1048576)
    --help, -h                    Show this help message",
        exe.to_string_lossy()
    )
}
