//! End-to-end tests that drive the `ipcount-rs` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

const BIN: &str = env!("CARGO_BIN_EXE_ipcount-rs");

const SAMPLE: &[u8] = b"192.168.1.1\n10.0.0.1\n192.168.1.1\nnot-an-ip\n\n8.8.8.8\n";

fn input(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN).args(args).output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).unwrap()
}

#[test]
fn counts_sample_file() {
    let file = input(SAMPLE);
    let out = run(&["--progress=none", file.path().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Unique IPs: 3\n");
}

#[test]
fn bar_mode_finishes_line_before_result() {
    let file = input(SAMPLE);
    let out = run(&[file.path().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.starts_with('\r'), "{text:?}");
    assert!(text.contains("100.00%"), "{text:?}");
    assert!(text.ends_with("\nUnique IPs: 3\n"), "{text:?}");
}

#[test]
fn empty_file_counts_zero() {
    let file = input(b"");
    let out = run(&[file.path().to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("100.00%"), "{text:?}");
    assert!(text.ends_with("\nUnique IPs: 0\n"), "{text:?}");
}

#[test]
fn out_of_range_octets_are_skipped() {
    let file = input(b"999.999.999.999\n");
    let out = run(&["--progress=none", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Unique IPs: 0\n");
}

#[test]
fn mmap_agrees_with_buffered() {
    let file = input(SAMPLE);
    let path = file.path().to_str().unwrap();
    let buffered = run(&["--progress=none", path]);
    let mapped = run(&["--progress=none", "--mmap", path]);
    assert!(mapped.status.success(), "stderr: {}", stderr(&mapped));
    assert_eq!(stdout(&buffered), stdout(&mapped));
}

#[test]
fn stats_line_on_stderr() {
    let file = input(SAMPLE);
    let out = run(&["--progress=none", file.path().to_str().unwrap()]);
    let err = stderr(&out);
    let stats = err.lines().last().unwrap();
    for key in [
        "lines=6",
        "addresses=4",
        "skipped=2",
        "duplicates=1",
        "bytes=52",
        "unique=3",
        "elapsed_ms=",
        "throughput_mib_s=",
    ] {
        assert!(stats.contains(key), "missing {key}: {stats}");
    }
}

#[test]
fn jsonl_events_go_to_stderr() {
    let file = input(SAMPLE);
    let out = run(&["--progress=jsonl", file.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Unique IPs: 3\n");

    let err = stderr(&out);
    let events: Vec<&str> = err.lines().filter(|l| l.starts_with('{')).collect();
    assert_eq!(events.len(), 2, "{err}");
    assert!(events[0].starts_with("{\"type\":\"progress\""));
    assert!(events[0].contains("\"final\":true"));
    assert!(events[1].starts_with("{\"type\":\"summary\""));
    assert!(events[1].contains("\"unique\":3"));
}

#[test]
fn reads_stdin_with_dash() {
    let mut child = Command::new(BIN)
        .args(["--progress=none", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(SAMPLE).unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Unique IPs: 3\n");
}

#[test]
fn missing_file_fails_without_count() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let out = run(&[missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!stdout(&out).contains("Unique IPs"));
    assert!(stderr(&out).contains("error: cannot open"), "{}", stderr(&out));
}

#[test]
fn no_arguments_prints_usage() {
    let out = run(&[]);
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).starts_with("usage:"), "{}", stdout(&out));
    assert!(!stdout(&out).contains("Unique IPs"));
}

#[test]
fn invalid_flag_exits_with_usage_error() {
    let out = run(&["--bogus", "ips.txt"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown flag: --bogus"));
    assert!(stderr(&out).contains("usage:"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn oversized_read_buffer_is_rejected() {
    let file = input(SAMPLE);
    let out = run(&["--read-buffer-kib=18014398509481984", file.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--read-buffer-kib must be <="), "{}", stderr(&out));
    assert!(!stdout(&out).contains("Unique IPs"));
}
