//! Heap-allocated bitset with a runtime-determined bit length.
//!
//! [`DynamicBitSet`] stores bits in `u64` words and guarantees that padding
//! bits (indices beyond the logical length) remain zero, so population counts
//! and iteration never observe "phantom" bits.
//!
//! Large bitsets are requested from the allocator already zeroed
//! ([`DynamicBitSet::try_empty`]). On platforms that back zeroed allocations
//! with lazily-mapped pages, a multi-hundred-MiB bitset costs nothing until
//! bits are actually written.

use std::alloc::{alloc_zeroed, Layout};

/// Computes the number of `u64` words needed to store `n` bits.
pub const fn words_for_bits(n: usize) -> usize {
    n.div_ceil(64)
}

/// Runtime-sized bitset backed by a `Vec<u64>`.
///
/// All indexing operations panic when `idx >= bit_length`. Use
/// [`iter_set`](Self::iter_set) to traverse set bits in ascending order.
///
/// # Examples
///
/// ```
/// use ipcount_rs::stdx::bitset::DynamicBitSet;
///
/// let mut bits = DynamicBitSet::empty(100);
/// bits.set(1);
/// bits.set(50);
/// bits.set(99);
/// assert_eq!(bits.iter_set().collect::<Vec<_>>(), vec![1, 50, 99]);
/// assert_eq!(bits.count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicBitSet {
    words: Vec<u64>,
    bit_length: usize,
}

impl DynamicBitSet {
    /// Creates an empty bitset with capacity for `bit_length` bits.
    ///
    /// Aborts the process if the allocation fails; use
    /// [`try_empty`](Self::try_empty) when failure must be reported.
    pub fn empty(bit_length: usize) -> Self {
        let words = vec![0u64; words_for_bits(bit_length)];
        Self { words, bit_length }
    }

    /// Creates an empty bitset, returning `None` when the backing words
    /// cannot be allocated.
    ///
    /// Storage comes straight from the zeroing allocator so no page is
    /// touched up front.
    pub fn try_empty(bit_length: usize) -> Option<Self> {
        let word_len = words_for_bits(bit_length);
        if word_len == 0 {
            return Some(Self::empty(bit_length));
        }

        let layout = Layout::array::<u64>(word_len).ok()?;
        // SAFETY: `layout` has a non-zero size because `word_len > 0`.
        let raw = unsafe { alloc_zeroed(layout) };
        if raw.is_null() {
            return None;
        }
        // SAFETY: `raw` was returned by the global allocator for exactly
        // `Layout::array::<u64>(word_len)`, is non-null and suitably aligned,
        // and the all-zero bit pattern is a valid `u64`, so all `word_len`
        // elements are initialized.
        let words = unsafe { Vec::from_raw_parts(raw.cast::<u64>(), word_len, word_len) };
        Some(Self { words, bit_length })
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    /// Returns the number of backing words.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    fn last_word_mask(&self) -> u64 {
        let remaining_bits = self.bit_length % 64;
        if remaining_bits == 0 {
            u64::MAX
        } else {
            (1u64 << remaining_bits) - 1
        }
    }

    /// Returns a slice of the backing `u64` words.
    ///
    /// Padding bits beyond `bit_length` are guaranteed to be zero.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Counts set bits by summing per-word popcounts.
    ///
    /// Cost is proportional to `word_len`, not to the number of set bits.
    pub fn count(&self) -> u64 {
        let Some((&last, body)) = self.words.split_last() else {
            return 0;
        };
        let body_total: u64 = body.iter().map(|w| u64::from(w.count_ones())).sum();
        body_total + u64::from((last & self.last_word_mask()).count_ones())
    }

    /// Returns `true` when no bits are set.
    pub fn is_empty(&self) -> bool {
        let Some((&last, body)) = self.words.split_last() else {
            return true;
        };
        body.iter().all(|&w| w == 0) && (last & self.last_word_mask()) == 0
    }

    /// Returns whether `idx` is set.
    ///
    /// Panics if `idx >= bit_length`.
    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        assert!(idx < self.bit_length, "bit index out of bounds");
        (self.words[idx / 64] & (1u64 << (idx % 64))) != 0
    }

    /// Sets the bit at `idx`. Setting an already-set bit has no effect.
    ///
    /// Panics if `idx >= bit_length`.
    #[inline]
    pub fn set(&mut self, idx: usize) {
        assert!(idx < self.bit_length, "bit index out of bounds");
        self.words[idx / 64] |= 1u64 << (idx % 64);
    }

    /// Sets the bit at `idx` and reports whether it was previously clear.
    ///
    /// Panics if `idx >= bit_length`.
    #[inline]
    pub fn test_and_set(&mut self, idx: usize) -> bool {
        assert!(idx < self.bit_length, "bit index out of bounds");
        let word = &mut self.words[idx / 64];
        let mask = 1u64 << (idx % 64);
        let was_clear = (*word & mask) == 0;
        *word |= mask;
        was_clear
    }

    /// Returns an iterator over set bit indices in ascending order.
    #[inline]
    pub fn iter_set(&self) -> DynamicBitSetIterator<'_> {
        DynamicBitSetIterator::new(self)
    }
}

/// Iterator over set bit indices in ascending order, produced by
/// [`DynamicBitSet::iter_set`].
pub struct DynamicBitSetIterator<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
    last_word_idx: usize,
    last_word_mask: u64,
}

impl<'a> DynamicBitSetIterator<'a> {
    fn new(bit_set: &'a DynamicBitSet) -> Self {
        let words = bit_set.words.as_slice();
        let last_word_idx = words.len().saturating_sub(1);
        let last_word_mask = if words.is_empty() {
            0
        } else {
            bit_set.last_word_mask()
        };
        let mut current_word = words.first().copied().unwrap_or(0);
        if last_word_idx == 0 {
            current_word &= last_word_mask;
        }
        Self {
            words,
            word_idx: 0,
            current_word,
            last_word_idx,
            last_word_mask,
        }
    }
}

impl Iterator for DynamicBitSetIterator<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                let idx = self.word_idx * 64 + bit_idx;
                self.current_word &= self.current_word.wrapping_sub(1);
                return Some(idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
            if self.word_idx == self.last_word_idx {
                self.current_word &= self.last_word_mask;
            }
        }
    }
}
