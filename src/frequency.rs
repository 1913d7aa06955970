//! Per-byte occurrence counts and their fixed-size header encoding.

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};

/// Number of distinct symbols, one per byte value.
pub const SYMBOLS: usize = 256;

/// Width in bytes of one big-endian header counter.
pub const COUNT_WIDTH: usize = 4;

/// Size of the serialized frequency header.
pub const HEADER_LEN: usize = SYMBOLS * COUNT_WIDTH;

/// Occurrence count of every byte value in one input.
///
/// Counters are `u32` because that is what the header stores; counting a
/// byte past `u32::MAX` fails with [`Error::FrequencyOverflow`].
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; SYMBOLS],
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut counter = Counter::default();
        counter.feed(data)?;
        Ok(counter.finish())
    }

    /// Counts every byte of `source` until end of input.
    pub fn from_reader<R: Read>(mut source: R) -> Result<Self> {
        let mut counter = Counter::default();
        let mut buf = [0u8; 8 * 1024];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            counter.feed(&buf[..n])?;
        }
        Ok(counter.finish())
    }

    pub fn from_counts(counts: [u32; SYMBOLS]) -> Self {
        Self { counts }
    }

    pub fn count(&self, symbol: u8) -> u32 {
        self.counts[symbol as usize]
    }

    pub fn counts(&self) -> &[u32; SYMBOLS] {
        &self.counts
    }

    /// Sum of all counters, i.e. the length of the original input.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Number of byte values that occur at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Symbols with a nonzero count, ascending, with their counts.
    pub fn present(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..=u8::MAX)
            .map(|s| (s, self.counts[s as usize]))
            .filter(|&(_, c)| c > 0)
    }

    pub fn write_header<W: Write>(&self, sink: &mut W) -> Result<()> {
        let mut header = [0u8; HEADER_LEN];
        for (chunk, count) in header.chunks_exact_mut(COUNT_WIDTH).zip(self.counts.iter()) {
            chunk.copy_from_slice(&count.to_be_bytes());
        }
        sink.write_all(&header)?;
        Ok(())
    }

    /// Reads exactly [`HEADER_LEN`] bytes and nothing more.
    pub fn read_header<R: Read>(source: &mut R) -> Result<Self> {
        let mut header = [0u8; HEADER_LEN];
        let mut found = 0;
        while found < HEADER_LEN {
            match source.read(&mut header[found..]) {
                Ok(0) => return Err(Error::TruncatedHeader { found }),
                Ok(n) => found += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let mut counts = [0u32; SYMBOLS];
        for (count, chunk) in counts.iter_mut().zip(header.chunks_exact(COUNT_WIDTH)) {
            *count = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self { counts })
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: [0; SYMBOLS],
        }
    }
}

impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.present()).finish()
    }
}

// Counts in u64 so a single overflow check at the end suffices.
struct Counter {
    counts: [u64; SYMBOLS],
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            counts: [0; SYMBOLS],
        }
    }
}

impl Counter {
    fn feed(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            let count = &mut self.counts[byte as usize];
            *count += 1;
            if *count > u64::from(u32::MAX) {
                return Err(Error::FrequencyOverflow { symbol: byte });
            }
        }
        Ok(())
    }

    fn finish(self) -> FrequencyTable {
        let mut counts = [0u32; SYMBOLS];
        for (out, &count) in counts.iter_mut().zip(self.counts.iter()) {
            // feed() rejects anything above u32::MAX
            *out = count as u32;
        }
        FrequencyTable { counts }
    }
}
