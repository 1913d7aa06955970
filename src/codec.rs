use std::io::{ErrorKind, Read, Write};
use tracing::debug;

use crate::bits::{BitReader, BitWriter};
use crate::code::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, HEADER_LEN};
use crate::tree::{HuffmanTree, NodeId};

const CHUNK: usize = 8 * 1024;

/// What one encode or decode processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Bytes of original data.
    pub symbols: u64,
    pub distinct_symbols: usize,
    /// Payload length in bits, excluding the header and trailing padding.
    pub payload_bits: u64,
}

impl Stats {
    /// Size of the compressed form: header plus padded payload.
    pub fn compressed_len(&self) -> u64 {
        HEADER_LEN as u64 + self.payload_bits.div_ceil(8)
    }
}

#[derive(Debug, Clone)]
pub struct Encoder {
    freq: FrequencyTable,
    tree: HuffmanTree,
    codes: CodeTable,
}

impl Encoder {
    pub fn new(freq: FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::build(&freq)?;
        let codes = CodeTable::from_tree(&tree);
        Ok(Self { freq, tree, codes })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(FrequencyTable::from_bytes(data)?)
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freq
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    /// Pushes the code of every byte of `data` through `writer`.
    pub fn encode_symbols<W: Write>(&self, data: &[u8], writer: &mut BitWriter<W>) -> Result<()> {
        for &symbol in data {
            let code = self.codes.get(symbol).ok_or(Error::MissingCode { symbol })?;
            writer.write_bits(code)?;
        }
        Ok(())
    }

    /// Writes the header followed by the packed codes of `source`.
    ///
    /// `source` must yield the same bytes the frequency table was counted
    /// from. A byte with no code fails with [`Error::MissingCode`], a length
    /// that differs from the counted total with [`Error::SourceChanged`].
    pub fn encode_into<R: Read, W: Write>(&self, mut source: R, mut sink: W) -> Result<Stats> {
        self.freq.write_header(&mut sink)?;

        let mut writer = BitWriter::new(sink);
        let mut symbols = 0u64;
        let mut buf = [0u8; CHUNK];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.encode_symbols(&buf[..n], &mut writer)?;
            symbols += n as u64;
        }

        let counted = self.freq.total();
        if symbols != counted {
            return Err(Error::SourceChanged {
                counted,
                read: symbols,
            });
        }

        let stats = Stats {
            symbols,
            distinct_symbols: self.codes.len(),
            payload_bits: writer.bits_written(),
        };
        writer.finish()?;

        debug!(
            symbols = stats.symbols,
            payload_bits = stats.payload_bits,
            "encoded"
        );
        Ok(stats)
    }
}

#[derive(Debug, Clone)]
pub struct Decoder {
    tree: HuffmanTree,
}

impl Decoder {
    pub fn new(freq: &FrequencyTable) -> Result<Self> {
        Ok(Self {
            tree: HuffmanTree::build(freq)?,
        })
    }

    /// Reads the frequency header from `source` and rebuilds the tree.
    pub fn read_header<R: Read>(source: &mut R) -> Result<Self> {
        Self::new(&FrequencyTable::read_header(source)?)
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    /// Number of symbols the payload holds.
    pub fn total_weight(&self) -> u64 {
        self.tree.total_weight()
    }

    /// Walks from the root to a leaf, one bit per branch. Returns `None` if
    /// the source runs out first. A root that is itself a leaf still
    /// consumes one bit.
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Option<u8>> {
        let Some(root) = self.tree.root() else {
            return Ok(None);
        };

        let node = self.tree.node(root);
        if let Some(symbol) = node.symbol() {
            return Ok(reader.read_bit()?.map(|_| symbol));
        }

        let mut id: NodeId = root;
        loop {
            let node = self.tree.node(id);
            match (node.symbol(), node.left(), node.right()) {
                (Some(symbol), _, _) => return Ok(Some(symbol)),
                (None, Some(left), Some(right)) => match reader.read_bit()? {
                    Some(true) => id = right,
                    Some(false) => id = left,
                    None => return Ok(None),
                },
                _ => unreachable!("internal node {} lacks a child", id.index()),
            }
        }
    }

    /// Decodes exactly [`total_weight`](Self::total_weight) symbols into
    /// `sink`. Bits after the last symbol are never read.
    pub fn decode_into<R: Read, W: Write>(
        &self,
        reader: &mut BitReader<R>,
        mut sink: W,
    ) -> Result<Stats> {
        let expected = self.total_weight();
        let mut decoded = 0u64;
        let mut buf = Vec::with_capacity(CHUNK);

        while decoded < expected {
            let Some(symbol) = self.decode_symbol(reader)? else {
                return Err(Error::TruncatedPayload { expected, decoded });
            };
            buf.push(symbol);
            decoded += 1;
            if buf.len() == CHUNK {
                sink.write_all(&buf)?;
                buf.clear();
            }
        }
        sink.write_all(&buf)?;
        sink.flush()?;

        let stats = Stats {
            symbols: decoded,
            // n leaves make 2n - 1 nodes
            distinct_symbols: self.tree.len().div_ceil(2),
            payload_bits: reader.bits_read(),
        };
        debug!(
            symbols = stats.symbols,
            payload_bits = stats.payload_bits,
            "decoded"
        );
        Ok(stats)
    }
}
