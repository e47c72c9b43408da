//! Property tests: the count is independent of how the input is delivered.

use std::collections::HashSet;
use std::io::{self, Read};

use proptest::prelude::*;

use ipcount_rs::{key_from_ipv4, scan_bytes, scan_reader, AddressSet, NullEventSink, ScanConfig};

/// Reader that hands out at most `step` bytes per call.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn line_strategy() -> impl Strategy<Value = (String, Option<u32>)> {
    prop_oneof![
        3 => any::<[u8; 4]>().prop_map(|o| {
            let addr = std::net::Ipv4Addr::from(o);
            (addr.to_string(), Some(key_from_ipv4(addr)))
        }),
        1 => "[g-z .]{0,10}".prop_map(|s| (s, None)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn chunking_and_buffer_size_do_not_change_count(
        lines in prop::collection::vec(line_strategy(), 0..64),
        step in 1usize..17,
        buffer in 1usize..33,
        crlf in any::<bool>(),
        trailing_newline in any::<bool>(),
    ) {
        let sep = if crlf { "\r\n" } else { "\n" };
        let mut text = lines.iter().map(|(l, _)| l.as_str()).collect::<Vec<_>>().join(sep);
        if trailing_newline && !lines.is_empty() {
            text.push_str(sep);
        }
        let expected: HashSet<u32> = lines.iter().filter_map(|(_, k)| *k).collect();
        let config = ScanConfig { progress_interval_bytes: 7, read_buffer_bytes: buffer };

        let mut set = AddressSet::new().unwrap();
        let from_bytes = scan_bytes(text.as_bytes(), &mut set, NullEventSink, &config);
        prop_assert_eq!(set.count(), expected.len() as u64);
        drop(set);

        let mut set = AddressSet::new().unwrap();
        let reader = Trickle { data: text.as_bytes(), step };
        let from_reader = scan_reader(reader, None, &mut set, NullEventSink, &config).unwrap();
        prop_assert_eq!(set.count(), expected.len() as u64);

        prop_assert_eq!(from_bytes.lines, from_reader.lines);
        prop_assert_eq!(from_bytes.bytes_consumed, text.len() as u64);
        prop_assert_eq!(from_reader.bytes_consumed, text.len() as u64);
    }
}
