//! Address parsing and the 32-bit key encoding.
//!
//! A key is the big-endian (network order) integer form of a dotted quad:
//! `key = a << 24 | b << 16 | c << 8 | d`. Keys index the address bitmap
//! directly, so the mapping must be a bijection over all of `u32`.
//!
//! A line is accepted only when its *entire* content is an IP literal that
//! is representable in four octets: a plain IPv4 address, or an
//! IPv4-mapped IPv6 address (`::ffff:a.b.c.d`). No whitespace is trimmed.
//! Everything else, including genuine IPv6 addresses such as `::1`, is
//! rejected without error.

use std::net::{IpAddr, Ipv4Addr};

/// Packs an IPv4 address into its big-endian 32-bit key.
#[inline]
pub fn key_from_ipv4(addr: Ipv4Addr) -> u32 {
    u32::from_be_bytes(addr.octets())
}

/// Unpacks a 32-bit key into the IPv4 address it encodes.
#[inline]
pub fn ipv4_from_key(key: u32) -> Ipv4Addr {
    Ipv4Addr::from(key.to_be_bytes())
}

/// Narrows a parsed address to IPv4 when it has a 4-octet form.
///
/// IPv4-compatible IPv6 (`::a.b.c.d`) and loopback `::1` are *not*
/// narrowed; only the `::ffff:0:0/96` mapped range is.
#[inline]
pub fn to_ipv4(addr: IpAddr) -> Option<Ipv4Addr> {
    match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Parses one input line (terminator already stripped) into a key.
///
/// Returns `None` for empty lines, non-UTF-8 bytes, surrounding
/// whitespace, out-of-range octets, leading-zero octets and non-mapped
/// IPv6 literals.
///
/// # Examples
///
/// ```
/// use ipcount_rs::address::parse_line;
///
/// assert_eq!(parse_line(b"10.0.0.1"), Some(0x0A00_0001));
/// assert_eq!(parse_line(b"::ffff:10.0.0.1"), Some(0x0A00_0001));
/// assert_eq!(parse_line(b"::1"), None);
/// assert_eq!(parse_line(b" 10.0.0.1"), None);
/// ```
#[inline]
pub fn parse_line(line: &[u8]) -> Option<u32> {
    // Shortest accepted literal is "::" (IPv6) / "0.0.0.0" (IPv4); longest
    // is a fully expanded mapped form. Reject obvious junk before UTF-8
    // validation and the std parser.
    if line.len() < 2 || line.len() > MAX_LITERAL_LEN {
        return None;
    }
    let text = std::str::from_utf8(line).ok()?;
    let addr: IpAddr = text.parse().ok()?;
    to_ipv4(addr).map(key_from_ipv4)
}

/// Longest IP literal the std parser accepts:
/// `ffff:ffff:ffff:ffff:ffff:ffff:255.255.255.255`.
const MAX_LITERAL_LEN: usize = 45;
