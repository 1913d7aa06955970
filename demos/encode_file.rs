use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

fn main() {
    let fp = env::args().nth(1).expect("Please provide path to input file as first argument.");

    // encode scope - save to file
    {
        let input = File::open(&fp).expect("First argument was not a valid filepath.");
        let output = File::create("encoded.huff").unwrap();
        let stats = huffarc::encode_stream(BufReader::new(input), BufWriter::new(output)).unwrap();

        println!(
            "{} bytes -> {} bytes ({} distinct symbols)",
            stats.symbols,
            stats.compressed_len(),
            stats.distinct_symbols
        );
    }

    // decode scope - read from file
    {
        let input = File::open("encoded.huff").unwrap();
        let output = File::create("decoded.txt").unwrap();
        huffarc::decode_stream(BufReader::new(input), BufWriter::new(output)).unwrap();
    }

    assert_eq!(fs::read(&fp).unwrap(), fs::read("decoded.txt").unwrap());
}
