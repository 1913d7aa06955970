use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::frequency::{FrequencyTable, SYMBOLS};
use crate::tree::HuffmanTree;

/// A single code: the branch bits from the root to a leaf, `0` for left.
pub type Code = BitBox<u8, Msb0>;

/// Symbol to code mapping derived from a [`HuffmanTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Walks the tree depth-first, left before right, recording the path to
    /// every leaf. A tree that is a single leaf gets the one-bit code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; SYMBOLS];
        let Some(root) = tree.root() else {
            return Self { codes };
        };

        if let Some(symbol) = tree.node(root).symbol() {
            codes[symbol as usize] = Some(bitbox![u8, Msb0; 0]);
            return Self { codes };
        }

        let mut stack = vec![(root, BitVec::<u8, Msb0>::new())];
        while let Some((id, path)) = stack.pop() {
            let node = tree.node(id);
            if let Some(symbol) = node.symbol() {
                trace!(symbol, bits = path.len(), "derived code");
                codes[symbol as usize] = Some(path.into_boxed_bitslice());
                continue;
            }
            // right first so the left subtree is walked first
            if let Some(right) = node.right() {
                let mut p = path.clone();
                p.push(true);
                stack.push((right, p));
            }
            if let Some(left) = node.left() {
                let mut p = path;
                p.push(false);
                stack.push((left, p));
            }
        }

        Self { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes[symbol as usize].as_deref()
    }

    /// Codes in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        (0..=u8::MAX).filter_map(move |s| self.get(s).map(|code| (s, code)))
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    /// Payload length in bits when encoding an input with counts `freq`.
    pub fn encoded_bits(&self, freq: &FrequencyTable) -> u64 {
        freq.present()
            .map(|(s, count)| u64::from(count) * self.get(s).map_or(0, |c| c.len() as u64))
            .sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<_> = self.iter().map(|(_, c)| c).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(*a))
        })
    }
}

/// One entry of a [`CodeBook`]: a code packed MSB-first into whole bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBookEntry {
    pub symbol: u8,
    pub bits: usize,
    pub packed: Vec<u8>,
}

/// Portable form of a [`CodeTable`] for writing out with any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBook {
    pub entries: Vec<CodeBookEntry>,
}

impl From<&CodeTable> for CodeBook {
    fn from(table: &CodeTable) -> Self {
        let entries = table
            .iter()
            .map(|(symbol, code)| {
                let mut packed = BitVec::<u8, Msb0>::from_bitslice(code);
                packed.set_uninitialized(false);
                CodeBookEntry {
                    symbol,
                    bits: code.len(),
                    packed: packed.into_vec(),
                }
            })
            .collect();
        Self { entries }
    }
}

impl TryFrom<CodeBook> for CodeTable {
    type Error = Error;

    /// Rejects entries with an empty code, a bit count the packed bytes
    /// cannot hold, or a symbol listed twice.
    fn try_from(book: CodeBook) -> Result<Self> {
        let mut codes = vec![None; SYMBOLS];
        for CodeBookEntry {
            symbol,
            bits,
            packed,
        } in book.entries
        {
            let slot = &mut codes[symbol as usize];
            if bits == 0 || bits > packed.len() * 8 || slot.is_some() {
                return Err(Error::InvalidCodeBook { symbol });
            }
            let mut code = BitVec::<u8, Msb0>::from_vec(packed);
            code.truncate(bits);
            *slot = Some(code.into_boxed_bitslice());
        }
        Ok(Self { codes })
    }
}
