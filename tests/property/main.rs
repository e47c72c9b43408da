//! Property tests for ipcount-rs.
//!
//! Run with: `cargo test --test property`

mod scan_invariance;
