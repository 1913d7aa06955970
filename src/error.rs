use std::io;

use crate::frequency::HEADER_LEN;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort an encode or decode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source could not be read or the sink could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input ended before the frequency header was complete.
    #[error("truncated header: expected {} bytes, found {found}", HEADER_LEN)]
    TruncatedHeader { found: usize },

    /// The payload ran out of bits before every symbol was decoded.
    #[error("truncated payload: decoded {decoded} of {expected} symbols")]
    TruncatedPayload { expected: u64, decoded: u64 },

    /// `extract_min` was called on an empty heap. Never caused by input data.
    #[error("heap underflow: extract_min on an empty heap")]
    HeapUnderflow,

    /// A byte value occurs more often than a header counter can hold.
    #[error("byte {symbol:#04x} occurs more than {} times", u32::MAX)]
    FrequencyOverflow { symbol: u8 },

    /// A byte seen while encoding has no code in the table.
    #[error("byte {symbol:#04x} has no code; input changed between passes?")]
    MissingCode { symbol: u8 },

    /// The coding pass read a different number of bytes than were counted.
    #[error("source changed between passes: counted {counted} bytes, read {read}")]
    SourceChanged { counted: u64, read: u64 },

    /// A stored code book entry cannot be a code.
    #[error("invalid code for byte {symbol:#04x} in code book")]
    InvalidCodeBook { symbol: u8 },
}
