//! MSB-first bit packing over byte sinks and sources.

use bitvec::prelude::*;
use std::io::{self, ErrorKind, Read, Write};

/// Packs bits into bytes, most significant bit first, and hands every full
/// byte to the sink.
#[derive(Debug)]
pub struct BitWriter<W> {
    sink: W,
    buffer: u8,
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buffer: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.buffer |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.sink.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.filled = 0;
        }
        Ok(())
    }

    pub fn write_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> io::Result<()> {
        for bit in bits.iter().by_vals() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flushes a trailing partial byte, if any, and returns the sink. The
    /// unused low bits of that byte carry no meaning.
    pub fn finish(mut self) -> io::Result<W> {
        if self.filled > 0 {
            self.sink.write_all(&[self.buffer])?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Yields the bits of a byte source one at a time, most significant first.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    buffer: u8,
    remaining: u8,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: 0,
            remaining: 0,
            bits_read: 0,
        }
    }

    /// Next bit, or `None` once the source is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.remaining == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.buffer = byte;
                    self.remaining = 8;
                }
                None => return Ok(None),
            }
        }
        self.remaining -= 1;
        self.bits_read += 1;
        Ok(Some(((self.buffer >> self.remaining) & 1) == 1))
    }

    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
