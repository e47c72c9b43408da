//! Integration tests for ipcount-rs.
//!
//! Run with: `cargo test --test integration`

mod cli_end_to_end;
mod library_scan;
