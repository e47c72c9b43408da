//! Distinct IPv4 counter CLI
//!
//! Reads a line-oriented file (or stdin with `-`) and counts how many
//! distinct IPv4 addresses it contains, using a 512 MiB bitmap indexed by
//! the 32-bit address.
//!
//! # Output Format
//!
//! Progress redraws and then the result are written to stdout:
//! `Unique IPs: <N>`
//!
//! Statistics are written to stderr upon completion:
//! `lines=N addresses=N skipped=N duplicates=N bytes=N unique=N init_ms=N elapsed_ms=N throughput_mib_s=N`
//!
//! # Exit Codes
//!
//! - `0`: Success, or usage shown because no input was given
//! - `1`: Bitmap allocation, open, or read failure (no count is printed)
//! - `2`: Invalid arguments

use std::process::ExitCode;

use ipcount_rs::cli::parse_args;
use ipcount_rs::runner::run;

fn main() -> ExitCode {
    let config = parse_args();
    match run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
