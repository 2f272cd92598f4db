use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{binary::BufMut, HpackResult, HuffmanDecoderError};

/// Encodes octet strings with the static HPACK Huffman code, as defined in
/// RFC 7541, Appendix B.
pub struct HuffmanEncoder;

impl HuffmanEncoder {
    pub fn new() -> HuffmanEncoder {
        HuffmanEncoder {}
    }

    /// Emits the code for every octet MSB-first, padding the trailing
    /// partial octet with the high-order bits of EOS (all ones). Returns
    /// the number of octets written.
    pub fn encode<B: BufMut>(&self, src: &[u8], buf: &mut B) -> usize {
        let mut current: u64 = 0;
        let mut bits: u32 = 0;
        let mut size = 0;
        for &b in src {
            let (code, code_len) = HUFFMAN_CODE_ARRAY[b as usize];
            current = (current << code_len) | code as u64;
            bits += code_len as u32;
            while bits >= 8 {
                bits -= 8;
                buf.put_u8((current >> bits) as u8);
                size += 1;
            }
        }
        if bits > 0 {
            current <<= 8 - bits;
            current |= (1 << (8 - bits)) - 1;
            buf.put_u8(current as u8);
            size += 1;
        }
        size
    }

    /// The encoded length in octets, without materializing the output.
    pub fn encoded_length(&self, src: &[u8]) -> usize {
        let mut bits: u64 = 0;
        for &b in src {
            bits += HUFFMAN_CODE_ARRAY[b as usize].1 as u64;
        }
        ((bits + 7) / 8) as usize
    }
}

pub struct HuffmanDecoder;

impl HuffmanDecoder {
    pub fn new() -> HuffmanDecoder {
        HuffmanDecoder {}
    }

    /// Treats the whole of `buf` as one Huffman-coded octet string and
    /// decodes it into a fresh `Vec`, enforcing the EOS and padding rules.
    pub fn decode(&mut self, buf: &[u8]) -> HpackResult<Vec<u8>> {
        let mut decoded: Vec<u8> = Vec::new();
        // bits of the code being matched, newest in the low end
        let mut pending: u32 = 0;
        let mut pending_len: u8 = 0;
        let mut ones_only = true;

        for &octet in buf {
            for shift in (0..8).rev() {
                let bit = (octet >> shift) & 1;
                pending = (pending << 1) | bit as u32;
                pending_len += 1;
                ones_only &= bit == 1;

                if pending_len == EOS_LEN && pending == EOS_VALUE {
                    return Err(HuffmanDecoderError::EOSInString.into());
                }

                if let Some(symbol) = HUFFMAN_CODE_MAP.get(&(pending, pending_len)) {
                    decoded.push(*symbol);
                    pending = 0;
                    pending_len = 0;
                    ones_only = true;
                }
            }
        }

        // whatever code is left open is the padding: strictly shorter than
        // an octet, and a prefix of EOS, which means every bit is a one
        if pending_len > 7 {
            return Err(HuffmanDecoderError::PaddingTooLarge.into());
        }
        if !ones_only {
            return Err(HuffmanDecoderError::InvalidPadding.into());
        }

        Ok(decoded)
    }
}

const EOS_VALUE: u32 = 0x3fffffff;
const EOS_LEN: u8 = 30;

/// (code, bit length) for the 257 symbols, the last one being EOS.
static HUFFMAN_CODE_ARRAY: &'static [(u32, u8)] = &[
    (0x1ff8, 13),
    (0x7fffd8, 23),
    (0xfffffe2, 28),
    (0xfffffe3, 28),
    (0xfffffe4, 28),
    (0xfffffe5, 28),
    (0xfffffe6, 28),
    (0xfffffe7, 28),
    (0xfffffe8, 28),
    (0xffffea, 24),
    (0x3ffffffc, 30),
    (0xfffffe9, 28),
    (0xfffffea, 28),
    (0x3ffffffd, 30),
    (0xfffffeb, 28),
    (0xfffffec, 28),
    (0xfffffed, 28),
    (0xfffffee, 28),
    (0xfffffef, 28),
    (0xffffff0, 28),
    (0xffffff1, 28),
    (0xffffff2, 28),
    (0x3ffffffe, 30),
    (0xffffff3, 28),
    (0xffffff4, 28),
    (0xffffff5, 28),
    (0xffffff6, 28),
    (0xffffff7, 28),
    (0xffffff8, 28),
    (0xffffff9, 28),
    (0xffffffa, 28),
    (0xffffffb, 28),
    (0x14, 6),
    (0x3f8, 10),
    (0x3f9, 10),
    (0xffa, 12),
    (0x1ff9, 13),
    (0x15, 6),
    (0xf8, 8),
    (0x7fa, 11),
    (0x3fa, 10),
    (0x3fb, 10),
    (0xf9, 8),
    (0x7fb, 11),
    (0xfa, 8),
    (0x16, 6),
    (0x17, 6),
    (0x18, 6),
    (0x0, 5), //b'0'
    (0x1, 5),
    (0x2, 5),
    (0x19, 6),
    (0x1a, 6),
    (0x1b, 6),
    (0x1c, 6),
    (0x1d, 6),
    (0x1e, 6),
    (0x1f, 6),
    (0x5c, 7),
    (0xfb, 8),
    (0x7ffc, 15),
    (0x20, 6),
    (0xffb, 12),
    (0x3fc, 10),
    (0x1ffa, 13),
    (0x21, 6), //b'A'
    (0x5d, 7), //b'B'
    (0x5e, 7), //b'C'
    (0x5f, 7), //b'D'
    (0x60, 7), //b'E'
    (0x61, 7),
    (0x62, 7),
    (0x63, 7),
    (0x64, 7),
    (0x65, 7),
    (0x66, 7),
    (0x67, 7),
    (0x68, 7), //b'M'
    (0x69, 7),
    (0x6a, 7),
    (0x6b, 7),
    (0x6c, 7),
    (0x6d, 7),
    (0x6e, 7),
    (0x6f, 7),
    (0x70, 7),
    (0x71, 7),
    (0x72, 7),
    (0xfc, 8),
    (0x73, 7),
    (0xfd, 8), //b'Z'
    (0x1ffb, 13),
    (0x7fff0, 19),
    (0x1ffc, 13),
    (0x3ffc, 14),
    (0x22, 6),
    (0x7ffd, 15),
    (0x3, 5),  //'a'
    (0x23, 6),
    (0x4, 5),
    (0x24, 6),
    (0x5, 5),
    (0x25, 6),
    (0x26, 6),
    (0x27, 6),
    (0x6, 5),
    (0x74, 7), //b'j',
    (0x75, 7),
    (0x28, 6),
    (0x29, 6),
    (0x2a, 6),
    (0x7, 5),
    (0x2b, 6),
    (0x76, 7),
    (0x2c, 6),
    (0x8, 5),
    (0x9, 5),
    (0x2d, 6),
    (0x77, 7),
    (0x78, 7),
    (0x79, 7),
    (0x7a, 7),
    (0x7b, 7), //b'z'
    (0x7ffe, 15),
    (0x7fc, 11),
    (0x3ffd, 14),
    (0x1ffd, 13),
    (0xffffffc, 28),
    (0xfffe6, 20),
    (0x3fffd2, 22),
    (0xfffe7, 20),
    (0xfffe8, 20),
    (0x3fffd3, 22),
    (0x3fffd4, 22),
    (0x3fffd5, 22),
    (0x7fffd9, 23),
    (0x3fffd6, 22),
    (0x7fffda, 23),
    (0x7fffdb, 23),
    (0x7fffdc, 23),
    (0x7fffdd, 23),
    (0x7fffde, 23),
    (0xffffeb, 24),
    (0x7fffdf, 23),
    (0xffffec, 24),
    (0xffffed, 24),
    (0x3fffd7, 22),
    (0x7fffe0, 23),
    (0xffffee, 24),
    (0x7fffe1, 23),
    (0x7fffe2, 23),
    (0x7fffe3, 23),
    (0x7fffe4, 23),
    (0x1fffdc, 21),
    (0x3fffd8, 22),
    (0x7fffe5, 23),
    (0x3fffd9, 22),
    (0x7fffe6, 23),
    (0x7fffe7, 23),
    (0xffffef, 24),
    (0x3fffda, 22),
    (0x1fffdd, 21),
    (0xfffe9, 20),
    (0x3fffdb, 22),
    (0x3fffdc, 22),
    (0x7fffe8, 23),
    (0x7fffe9, 23),
    (0x1fffde, 21),
    (0x7fffea, 23),
    (0x3fffdd, 22),
    (0x3fffde, 22),
    (0xfffff0, 24),
    (0x1fffdf, 21),
    (0x3fffdf, 22),
    (0x7fffeb, 23),
    (0x7fffec, 23),
    (0x1fffe0, 21),
    (0x1fffe1, 21),
    (0x3fffe0, 22),
    (0x1fffe2, 21),
    (0x7fffed, 23),
    (0x3fffe1, 22),
    (0x7fffee, 23),
    (0x7fffef, 23),
    (0xfffea, 20),
    (0x3fffe2, 22),
    (0x3fffe3, 22),
    (0x3fffe4, 22),
    (0x7ffff0, 23),
    (0x3fffe5, 22),
    (0x3fffe6, 22),
    (0x7ffff1, 23),
    (0x3ffffe0, 26),
    (0x3ffffe1, 26),
    (0xfffeb, 20),
    (0x7fff1, 19),
    (0x3fffe7, 22),
    (0x7ffff2, 23),
    (0x3fffe8, 22),
    (0x1ffffec, 25),
    (0x3ffffe2, 26),
    (0x3ffffe3, 26),
    (0x3ffffe4, 26),
    (0x7ffffde, 27),
    (0x7ffffdf, 27),
    (0x3ffffe5, 26),
    (0xfffff1, 24),
    (0x1ffffed, 25),
    (0x7fff2, 19),
    (0x1fffe3, 21),
    (0x3ffffe6, 26),
    (0x7ffffe0, 27),
    (0x7ffffe1, 27),
    (0x3ffffe7, 26),
    (0x7ffffe2, 27),
    (0xfffff2, 24),
    (0x1fffe4, 21),
    (0x1fffe5, 21),
    (0x3ffffe8, 26),
    (0x3ffffe9, 26),
    (0xffffffd, 28),
    (0x7ffffe3, 27),
    (0x7ffffe4, 27),
    (0x7ffffe5, 27),
    (0xfffec, 20),
    (0xfffff3, 24),
    (0xfffed, 20),
    (0x1fffe6, 21),
    (0x3fffe9, 22),
    (0x1fffe7, 21),
    (0x1fffe8, 21),
    (0x7ffff3, 23),
    (0x3fffea, 22),
    (0x3fffeb, 22),
    (0x1ffffee, 25),
    (0x1ffffef, 25),
    (0xfffff4, 24),
    (0xfffff5, 24),
    (0x3ffffea, 26),
    (0x7ffff4, 23),
    (0x3ffffeb, 26),
    (0x7ffffe6, 27),
    (0x3ffffec, 26),
    (0x3ffffed, 26),
    (0x7ffffe7, 27),
    (0x7ffffe8, 27),
    (0x7ffffe9, 27),
    (0x7ffffea, 27),
    (0x7ffffeb, 27),
    (0xffffffe, 28),
    (0x7ffffec, 27),
    (0x7ffffed, 27),
    (0x7ffffee, 27),
    (0x7ffffef, 27),
    (0x7fffff0, 27),
    (0x3ffffee, 26),
    (0x3fffffff, 30),
];

lazy_static! {
    static ref HUFFMAN_CODE_MAP: HashMap<(u32, u8), u8> = {
        let mut m = HashMap::<(u32, u8), u8>::new();
        for (symbol, &(code, code_len)) in HUFFMAN_CODE_ARRAY.iter().enumerate() {
            // EOS is never decodable, it only supplies padding bits
            if symbol > 255 {
                continue;
            }
            m.insert((code, code_len), symbol as u8);
        }
        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(src: &[u8]) {
        let encoder = HuffmanEncoder::new();
        let mut encoded: Vec<u8> = Vec::new();
        let size = encoder.encode(src, &mut encoded);
        assert_eq!(size, encoded.len());
        assert_eq!(encoder.encoded_length(src), encoded.len());
        assert_eq!(HuffmanDecoder::new().decode(&encoded).unwrap(), src);
    }

    #[test]
    fn roundtrip_alphanumeric() {
        roundtrip(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789");
    }

    #[test]
    fn roundtrip_every_symbol() {
        let all: Vec<u8> = (0..=255u8).collect();
        roundtrip(&all);
    }

    #[test]
    fn roundtrip_empty() {
        roundtrip(b"");
    }

    #[test]
    fn encode_known_vector() {
        // RFC 7541 C.4.1: "www.example.com"
        let mut encoded: Vec<u8> = Vec::new();
        HuffmanEncoder::new().encode(b"www.example.com", &mut encoded);
        assert_eq!(
            encoded,
            vec![0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90, 0xf4, 0xff]
        );
    }

    #[test]
    fn decode_rejects_embedded_eos() {
        // 'a' (00011) followed by the 30-bit EOS code and zero padding
        let bits: u64 = (0x3 << 35) | ((EOS_VALUE as u64) << 5);
        let encoded = bits.to_be_bytes()[3..].to_vec();
        assert!(HuffmanDecoder::new().decode(&encoded).is_err());
    }

    #[test]
    fn decode_rejects_padding_longer_than_7_bits() {
        // 'a' then a full octet of ones: 00011 followed by 11 x '1'
        let encoded = vec![0x1F, 0xFF];
        assert!(HuffmanDecoder::new().decode(&encoded).is_err());
    }

    #[test]
    fn decode_rejects_zero_padding() {
        // '0' is 00000, leaving three 0 bits of padding
        let encoded = vec![0x00];
        assert!(HuffmanDecoder::new().decode(&encoded).is_err());
    }
}
