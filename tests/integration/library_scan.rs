//! Library-level scans through the public API.

use std::collections::HashSet;
use std::io::Write;
use std::net::Ipv4Addr;

use ipcount_rs::{
    scan_bytes, scan_path, scan_reader, AddressSet, EventSink, InputMode, NullEventSink,
    ScanConfig, ScanEvent, ScanStats,
};

#[derive(Default)]
struct Percentages(Vec<Option<f64>>);

impl EventSink for Percentages {
    fn emit(&mut self, event: &ScanEvent<'_>) {
        if let ScanEvent::Progress(p) = event {
            self.0.push(p.percent());
        }
    }

    fn flush(&mut self) {}
}

/// Deterministic mix of addresses, duplicates and junk.
fn synthetic_input(lines: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for i in 0..lines {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        match i % 7 {
            0 => out.extend_from_slice(b"garbage line"),
            1 => out.extend_from_slice(b"10.0.0.1"),
            _ => {
                let [a, b, c, d] = ((state >> 40) as u32 & 0xFFFF).to_be_bytes();
                write!(out, "{a}.{b}.{c}.{d}").unwrap();
            }
        }
        out.extend_from_slice(if i % 3 == 0 { b"\r\n" } else { b"\n" });
    }
    out
}

fn distinct(data: &[u8]) -> u64 {
    let mut seen = HashSet::new();
    for line in data.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if let Ok(addr) = std::str::from_utf8(line).unwrap().parse::<Ipv4Addr>() {
            seen.insert(addr);
        }
    }
    seen.len() as u64
}

#[test]
fn all_entry_points_agree() {
    let data = synthetic_input(20_000);
    let expected = distinct(&data);
    let config = ScanConfig {
        progress_interval_bytes: 4096,
        read_buffer_bytes: 64,
    };

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mut results: Vec<(u64, ScanStats)> = Vec::new();

    let mut set = AddressSet::new().unwrap();
    let stats = scan_bytes(&data, &mut set, NullEventSink, &config);
    results.push((set.count(), stats));
    drop(set);

    let mut set = AddressSet::new().unwrap();
    let stats = scan_reader(&data[..], None, &mut set, NullEventSink, &config).unwrap();
    results.push((set.count(), stats));
    drop(set);

    for mode in [InputMode::Buffered, InputMode::Mmap] {
        let mut set = AddressSet::new().unwrap();
        let stats = scan_path(file.path(), mode, &mut set, NullEventSink, &config).unwrap();
        results.push((set.count(), stats));
    }

    for (count, stats) in &results {
        assert_eq!(*count, expected);
        assert_eq!(stats.lines, 20_000);
        assert_eq!(stats.bytes_consumed, data.len() as u64);
        assert_eq!(stats.addresses + stats.skipped, stats.lines);
        assert_eq!(stats.addresses - stats.duplicates, expected);
    }
}

#[test]
fn progress_is_monotonic_and_completes() {
    let data = synthetic_input(5_000);
    let config = ScanConfig {
        progress_interval_bytes: 1024,
        ..ScanConfig::default()
    };
    let mut set = AddressSet::new().unwrap();
    let mut sink = Percentages::default();
    scan_bytes(&data, &mut set, &mut sink, &config);

    let pcts: Vec<f64> = sink.0.iter().map(|p| p.unwrap()).collect();
    assert!(pcts.len() > 2);
    assert!(pcts.windows(2).all(|w| w[0] <= w[1]), "{pcts:?}");
    assert_eq!(pcts.last(), Some(&100.0));
}
