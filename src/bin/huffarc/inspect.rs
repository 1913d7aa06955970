use anyhow::Context;
use bitvec::prelude::*;
use clap::ValueEnum;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use huffarc::{CodeBook, Encoder, FrequencyTable, HEADER_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Msgpack,
}

/// Prints the header of a compressed file: one row per stored symbol with
/// its count and code, then the payload size the counts imply. With
/// `Format::Msgpack` the code book is written to stdout instead.
pub fn run(file: &Path, format: Format) -> anyhow::Result<()> {
    let handle = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let file_len = handle.metadata()?.len();
    let freq = FrequencyTable::read_header(&mut BufReader::new(handle))
        .with_context(|| format!("reading header of {}", file.display()))?;

    match format {
        Format::Text => print!("{}", describe(&freq, file_len)?),
        Format::Msgpack => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&code_book(&freq)?)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn code_book(freq: &FrequencyTable) -> anyhow::Result<Vec<u8>> {
    let encoder = Encoder::new(freq.clone())?;
    Ok(rmp_serde::to_vec(&CodeBook::from(encoder.codes()))?)
}

fn describe(freq: &FrequencyTable, file_len: u64) -> anyhow::Result<String> {
    let encoder = Encoder::new(freq.clone())?;
    let codes = encoder.codes();

    let mut out = String::new();
    writeln!(out, "{:>6} {:>10}  code", "symbol", "count")?;
    for (symbol, code) in codes.iter() {
        writeln!(
            out,
            "{:>6} {:>10}  {}",
            printable(symbol),
            freq.count(symbol),
            bit_string(code)
        )?;
    }

    let bits = codes.encoded_bits(freq);
    writeln!(out, "symbols: {} ({} distinct)", freq.total(), codes.len())?;
    writeln!(
        out,
        "payload: {} bits, {} bytes expected, {} bytes present",
        bits,
        bits.div_ceil(8),
        file_len.saturating_sub(HEADER_LEN as u64)
    )?;
    Ok(out)
}

fn printable(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        format!("{symbol:#04x}")
    }
}

fn bit_string(code: &BitSlice<u8, Msb0>) -> String {
    code.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect()
}
