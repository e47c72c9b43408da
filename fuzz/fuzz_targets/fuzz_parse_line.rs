#![no_main]

use libfuzzer_sys::fuzz_target;

use std::net::{IpAddr, Ipv4Addr};

use ipcount_rs::{ipv4_from_key, parse_line};

// Checks `parse_line` against the standard library parser on arbitrary bytes:
// - never panics,
// - accepts exactly the IPv4 literals and IPv4-mapped IPv6 literals,
// - an accepted key formats back to an address that parses to the same key.
fuzz_target!(|data: &[u8]| {
    let got = parse_line(data);

    let expected = std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.parse::<IpAddr>().ok())
        .and_then(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped(),
        })
        .map(u32::from);
    assert_eq!(got, expected);

    if let Some(key) = got {
        let text = ipv4_from_key(key).to_string();
        assert_eq!(text.parse::<Ipv4Addr>().map(u32::from).ok(), Some(key));
        assert_eq!(parse_line(text.as_bytes()), Some(key));
    }
});
