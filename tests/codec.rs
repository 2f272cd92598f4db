use hpack_codec::{Binary, BinaryMut, Decoder, Encoder};

fn hex_to_vec(hex: &str) -> Vec<u8> {
    hex::decode(hex.replace(' ', "")).unwrap()
}

fn triples(headers: &[(&str, &str)]) -> Vec<(Vec<u8>, Vec<u8>, bool)> {
    headers
        .iter()
        .map(|(name, value)| (name.as_bytes().to_vec(), value.as_bytes().to_vec(), false))
        .collect()
}

macro_rules! decoded_block {
    ($decoder:expr, $hex:expr, [$(($name:expr, $value:expr)),+ $(,)?]) => {{
        let mut buf = Binary::from(hex_to_vec($hex));
        let headers = $decoder.decode(&mut buf).unwrap();
        assert!(!$decoder.end_header_block());
        let expect: Vec<(Vec<u8>, Vec<u8>)> =
            vec![$(($name.to_vec(), $value.to_vec()),)+];
        assert_eq!(headers, expect);
    }};
}

/// https://httpwg.org/specs/rfc7541.html#request.examples, C.3
#[test]
fn rfc7541_c3_requests_without_huffman() {
    let mut decoder = Decoder::new();

    // C.3.1
    decoded_block!(
        decoder,
        "8286 8441 0f77 7777 2e65 7861 6d70 6c65 2e63 6f6d",
        [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
        ]
    );

    // C.3.2
    decoded_block!(
        decoder,
        "8286 84be 5808 6e6f 2d63 6163 6865",
        [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
            (b"cache-control", b"no-cache"),
        ]
    );

    // C.3.3
    decoded_block!(
        decoder,
        "8287 85bf 400a 6375 7374 6f6d 2d6b 6579 0c63 7573 746f 6d2d 7661 6c75 65",
        [
            (b":method", b"GET"),
            (b":scheme", b"https"),
            (b":path", b"/index.html"),
            (b":authority", b"www.example.com"),
            (b"custom-key", b"custom-value"),
        ]
    );
}

/// https://httpwg.org/specs/rfc7541.html#request.examples.with.huffman.coding, C.4
#[test]
fn rfc7541_c4_requests_with_huffman() {
    let mut decoder = Decoder::new();

    decoded_block!(
        decoder,
        "8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff",
        [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
        ]
    );

    decoded_block!(
        decoder,
        "8286 84be 5886 a8eb 1064 9cbf",
        [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
            (b"cache-control", b"no-cache"),
        ]
    );

    decoded_block!(
        decoder,
        "8287 85bf 4088 25a8 49e9 5ba9 7d7f 8925 a849 e95b b8e8 b4bf",
        [
            (b":method", b"GET"),
            (b":scheme", b"https"),
            (b":path", b"/index.html"),
            (b":authority", b"www.example.com"),
            (b"custom-key", b"custom-value"),
        ]
    );
}

/// The encoder reproduces the C.4 request blocks octet for octet.
#[test]
fn rfc7541_c4_encoding_matches() {
    let mut encoder = Encoder::new();

    let block = encoder
        .encode(&triples(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
        ]))
        .unwrap();
    assert_eq!(hex::encode(&block), "828684418cf1e3c2e5f23a6ba0ab90f4ff");

    let block = encoder
        .encode(&triples(&[
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
            ("cache-control", "no-cache"),
        ]))
        .unwrap();
    assert_eq!(hex::encode(&block), "828684be5886a8eb10649cbf");

    let block = encoder
        .encode(&triples(&[
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/index.html"),
            (":authority", "www.example.com"),
            ("custom-key", "custom-value"),
        ]))
        .unwrap();
    assert_eq!(
        hex::encode(&block),
        "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf"
    );
}

#[test]
fn roundtrip_at_several_table_sizes() {
    let headers = vec![
        (b":method".to_vec(), b"POST".to_vec(), false),
        (b":path".to_vec(), b"/api/v1/jobs".to_vec(), false),
        (b"content-type".to_vec(), b"application/json".to_vec(), false),
        (b"x-request-id".to_vec(), b"d1b79902-4f0e".to_vec(), false),
        (b"authorization".to_vec(), b"Bearer d00d".to_vec(), true),
        (b"x-request-id".to_vec(), b"d1b79902-4f0e".to_vec(), false),
    ];

    for max_table_size in [0, 128, 4096] {
        let mut encoder = Encoder::with_capacity(max_table_size);
        let mut decoder = Decoder::with_limits(1 << 20, max_table_size);
        for _ in 0..3 {
            let mut block = BinaryMut::new();
            encoder.encode_into(&headers, &mut block).unwrap();
            let mut buf = block.freeze();
            let mut seen = Vec::new();
            decoder
                .decode_with_cb(&mut buf, |name, value, sensitive| {
                    seen.push((name.to_vec(), value.to_vec(), sensitive))
                })
                .unwrap();
            assert!(!decoder.end_header_block());
            assert_eq!(seen, headers, "max_table_size = {}", max_table_size);
        }
    }
}

#[test]
fn size_update_travels_in_band() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let mut block: Vec<u8> = Vec::new();
    encoder
        .encode_header(&mut block, b"x-session", b"f00f", false)
        .unwrap();
    let mut buf = Binary::from(block);
    decoder.decode(&mut buf).unwrap();
    assert!(!decoder.end_header_block());

    // shrink to zero and back, then keep talking
    let mut block: Vec<u8> = Vec::new();
    encoder.set_max_header_table_size(&mut block, 0).unwrap();
    encoder.set_max_header_table_size(&mut block, 4096).unwrap();
    encoder
        .encode_header(&mut block, b"x-session", b"f00f", false)
        .unwrap();
    let mut buf = Binary::from(block);
    let headers = decoder.decode(&mut buf).unwrap();
    assert!(!decoder.end_header_block());
    assert_eq!(headers, vec![(b"x-session".to_vec(), b"f00f".to_vec())]);
    assert_eq!(decoder.max_header_table_size(), 4096);

    // the shrink emptied both tables, so the repeat found a fresh entry
    let mut block: Vec<u8> = Vec::new();
    encoder
        .encode_header(&mut block, b"x-session", b"f00f", false)
        .unwrap();
    assert_eq!(block, vec![0xBE]);
}

#[test]
fn oversized_block_reports_truncation() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::with_limits(16, 4096);
    let mut block: Vec<u8> = Vec::new();
    encoder
        .encode_header(&mut block, b"x-large", &vec![b'a'; 64], false)
        .unwrap();
    let mut buf = Binary::from(block);
    let headers = decoder.decode(&mut buf).unwrap();
    assert!(headers.is_empty());
    assert!(decoder.end_header_block());
}

#[test]
fn split_block_decodes_across_calls() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();
    let mut block: Vec<u8> = Vec::new();
    encoder
        .encode_header(&mut block, b"x-span-id", b"ab54a98ceb1f0ad2", false)
        .unwrap();

    // feed the block one octet at a time, re-buffering whatever a call
    // leaves unconsumed
    let mut seen = Vec::new();
    let mut pending: Vec<u8> = Vec::new();
    for &b in block.iter() {
        pending.push(b);
        let mut buf = Binary::from(pending.clone());
        decoder
            .decode_with_cb(&mut buf, |name, value, _| {
                seen.push((name.to_vec(), value.to_vec()))
            })
            .unwrap();
        pending = buf.to_vec();
    }
    assert!(pending.is_empty());
    assert!(!decoder.end_header_block());
    assert_eq!(
        seen,
        vec![(b"x-span-id".to_vec(), b"ab54a98ceb1f0ad2".to_vec())]
    );
}
