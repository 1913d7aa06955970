use huffarc::Encoder;

fn main() {
    let s = String::from("Hello my name is Sam!");
    let encoder = Encoder::from_bytes(s.as_bytes()).unwrap();

    for (symbol, code) in encoder.codes().iter() {
        println!("{:?} -> {}", symbol as char, code);
    }

    let packed = huffarc::encode(s.as_bytes()).unwrap();
    let dec = String::from_utf8(huffarc::decode(&packed).unwrap());

    println!("{:?}", dec);
}
