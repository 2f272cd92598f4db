use hpack_codec::{Binary, Decoder, Encoder};

/// One encoder/decoder pair carried across two requests, the way an HTTP/2
/// connection drives the codec: the second block shrinks because the first
/// one populated both dynamic tables.
fn main() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let request: Vec<(Vec<u8>, Vec<u8>, bool)> = vec![
        (b":method".to_vec(), b"GET".to_vec(), false),
        (b":scheme".to_vec(), b"https".to_vec(), false),
        (b":path".to_vec(), b"/".to_vec(), false),
        (b":authority".to_vec(), b"www.example.com".to_vec(), false),
        (b"user-agent".to_vec(), b"demo/0.1".to_vec(), false),
        (b"authorization".to_vec(), b"Bearer d00d".to_vec(), true),
    ];

    for round in 1..=2 {
        let block = encoder.encode(&request).unwrap();
        println!("request {} encoded to {} octets", round, block.len());

        let mut buf = Binary::from(block);
        decoder
            .decode_with_cb(&mut buf, |name, value, sensitive| {
                println!(
                    "  {}: {}{}",
                    String::from_utf8_lossy(name),
                    String::from_utf8_lossy(value),
                    if sensitive { "  (sensitive)" } else { "" }
                );
            })
            .unwrap();
        assert!(!decoder.end_header_block());
    }
}
