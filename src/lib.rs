//! Static Huffman compression of byte streams.
//!
//! A compressed stream is a fixed 1024-byte header holding the occurrence
//! count of every byte value (256 big-endian `u32`s in symbol order), followed
//! by the Huffman codes of the original bytes packed most significant bit
//! first. The decoder rebuilds the same tree from the counts alone and stops
//! after the total count of symbols, so trailing pad bits are never read.
//!
//! ```
//! let packed = huffarc::encode(b"abracadabra")?;
//! assert_eq!(huffarc::decode(&packed)?, b"abracadabra");
//! # Ok::<(), huffarc::Error>(())
//! ```

use std::io::{Read, Seek, SeekFrom, Write};

pub mod bits;
pub mod code;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod heap;
pub mod tree;

pub use bits::{BitReader, BitWriter};
pub use code::{Code, CodeBook, CodeBookEntry, CodeTable};
pub use codec::{Decoder, Encoder, Stats};
pub use error::{Error, Result};
pub use frequency::{FrequencyTable, HEADER_LEN};
pub use tree::{HuffmanTree, Node, NodeId};

/// Compresses `input` into a new buffer.
pub fn encode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + input.len() / 2);
    encode_to(input, &mut out)?;
    Ok(out)
}

/// Compresses `input` into `sink`.
pub fn encode_to<W: Write>(input: &[u8], sink: W) -> Result<Stats> {
    Encoder::from_bytes(input)?.encode_into(input, sink)
}

/// Compresses a seekable source in two passes: one to count, then a rewind
/// to where it started and one to emit codes.
pub fn encode_stream<R: Read + Seek, W: Write>(mut source: R, sink: W) -> Result<Stats> {
    let start = source.stream_position()?;
    let freq = FrequencyTable::from_reader(&mut source)?;
    source.seek(SeekFrom::Start(start))?;
    Encoder::new(freq)?.encode_into(source, sink)
}

/// Decompresses `input` into a new buffer.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode_stream(input, &mut out)?;
    Ok(out)
}

/// Decompresses `source` into `sink`.
pub fn decode_stream<R: Read, W: Write>(mut source: R, sink: W) -> Result<Stats> {
    let decoder = Decoder::read_header(&mut source)?;
    let mut reader = BitReader::new(source);
    decoder.decode_into(&mut reader, sink)
}
