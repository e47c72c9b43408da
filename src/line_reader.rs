//! Buffered line splitter over any [`Read`] source.
//!
//! Reads fixed-size blocks into one reusable buffer and finds terminators
//! with `memchr`. A partial line at the end of a block is carried to the
//! front of the buffer before the next read, so lines never straddle two
//! buffers and no per-line allocation happens. A line longer than the
//! buffer grows it.
//!
//! ## Line rules
//! - Lines end at `\n`; one trailing `\r` is stripped (CRLF input).
//! - A final line without a terminator is still yielded.
//! - Empty input yields no lines; `"\n"` yields one empty line.

use std::io::{self, ErrorKind, Read};

use memchr::memchr;

/// Default read block size (256 KiB).
pub const DEFAULT_READ_BUFFER_BYTES: usize = 256 * 1024;

/// One line borrowed from the reader's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line content with the terminator removed.
    pub bytes: &'a [u8],
    /// Raw bytes consumed from the source, terminator included.
    pub consumed: usize,
}

/// Splits a byte stream into lines.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// First byte not yet handed out.
    start: usize,
    /// End of valid data in `buf`.
    end: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    /// Creates a reader with the default block size.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_READ_BUFFER_BYTES, inner)
    }

    /// Creates a reader that reads `capacity` bytes at a time (minimum 1).
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(1)],
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// Returns the next line, or `None` at end of input.
    ///
    /// Read errors other than `Interrupted` are returned as-is; the reader
    /// should not be polled again afterwards.
    pub fn next_line(&mut self) -> io::Result<Option<Line<'_>>> {
        let (lo, hi, consumed) = loop {
            if let Some(pos) = memchr(b'\n', &self.buf[self.start..self.end]) {
                let lo = self.start;
                let nl = lo + pos;
                self.start = nl + 1;
                break (lo, nl, nl + 1 - lo);
            }

            if self.eof {
                if self.start == self.end {
                    return Ok(None);
                }
                let lo = self.start;
                let hi = self.end;
                self.start = self.end;
                break (lo, hi, hi - lo);
            }

            self.fill()?;
        };

        let hi = if hi > lo && self.buf[hi - 1] == b'\r' {
            hi - 1
        } else {
            hi
        };
        Ok(Some(Line {
            bytes: &self.buf[lo..hi],
            consumed,
        }))
    }

    /// Compacts the pending tail to the front and reads one more block.
    fn fill(&mut self) -> io::Result<()> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == self.buf.len() {
            let grown = self.buf.len().saturating_mul(2);
            self.buf.resize(grown, 0);
        }

        loop {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Current buffer capacity in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Consumes the reader, returning the wrapped source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Iterates lines of an in-memory buffer with the same rules as
/// [`LineReader`].
pub fn split_lines(data: &[u8]) -> impl Iterator<Item = Line<'_>> {
    let mut rest = data;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (raw, consumed) = match memchr(b'\n', rest) {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        rest = &rest[consumed..];
        let bytes = raw.strip_suffix(b"\r").unwrap_or(raw);
        Some(Line { bytes, consumed })
    })
}
