//! Direct-address membership set over the whole IPv4 key space.
//!
//! [`AddressSet`] owns one bit per possible 32-bit key: 2^32 bits, 2^26
//! `u64` words, 512 MiB. Insertion is a single OR into a word, with no
//! hashing, probing or resizing, and the distinct count is a popcount sweep
//! over every word.
//!
//! ## Invariants
//! - Bit `n` is set iff key `n` has been observed at least once.
//! - Bits are never cleared; the set only grows.
//! - Storage is allocated once and is exclusively owned. The set is passed
//!   by `&mut` into the scan loop, never shared between writers.

use std::net::Ipv4Addr;

use crate::address::{ipv4_from_key, key_from_ipv4};
use crate::error::{Result, ScanError};
use crate::stdx::DynamicBitSet;

/// Number of distinct 32-bit keys.
pub const ADDRESS_SPACE_BITS: u64 = 1 << 32;
/// Number of `u64` words backing the set (2^26).
pub const ADDRESS_SPACE_WORDS: u64 = ADDRESS_SPACE_BITS / 64;
/// Size of the backing storage in bytes (512 MiB).
pub const ADDRESS_SPACE_BYTES: u64 = ADDRESS_SPACE_BITS / 8;

/// Bitmap of observed IPv4 keys.
pub struct AddressSet {
    bits: DynamicBitSet,
}

impl AddressSet {
    /// Allocates a zeroed bitmap covering every 32-bit key.
    ///
    /// Fails with [`ScanError::Alloc`] when the 512 MiB allocation cannot be
    /// satisfied (or the target cannot address it); there is no smaller
    /// fallback.
    pub fn new() -> Result<Self> {
        let alloc_err = || ScanError::Alloc {
            bytes: ADDRESS_SPACE_BYTES,
        };
        let bit_length = usize::try_from(ADDRESS_SPACE_BITS).map_err(|_| alloc_err())?;
        let bits = DynamicBitSet::try_empty(bit_length).ok_or_else(alloc_err)?;
        Ok(Self { bits })
    }

    /// Marks `key` as observed. Idempotent.
    #[inline]
    pub fn set(&mut self, key: u32) {
        self.bits.set(key as usize);
    }

    /// Marks `key` as observed and returns `true` if it was not seen before.
    #[inline]
    pub fn insert(&mut self, key: u32) -> bool {
        self.bits.test_and_set(key as usize)
    }

    /// Marks an address as observed.
    #[inline]
    pub fn set_addr(&mut self, addr: Ipv4Addr) {
        self.set(key_from_ipv4(addr));
    }

    /// Returns whether `key` has been observed.
    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        self.bits.is_set(key as usize)
    }

    /// Number of distinct keys observed so far.
    ///
    /// Sweeps all 2^26 words regardless of how many keys were inserted.
    /// Safe to call mid-scan; the result reflects the partial input.
    pub fn count(&self) -> u64 {
        self.bits.count()
    }

    /// Returns `true` when no key has been observed.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Observed addresses in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        // Indices are < 2^32 by construction, so the narrowing is lossless.
        self.bits.iter_set().map(|idx| ipv4_from_key(idx as u32))
    }

    /// Backing words, for bulk inspection.
    pub fn words(&self) -> &[u64] {
        self.bits.words()
    }
}

impl std::fmt::Debug for AddressSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSet")
            .field("words", &self.bits.word_len())
            .finish_non_exhaustive()
    }
}
