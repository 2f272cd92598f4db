//! Exposes the struct `Encoder` that serializes header fields into an
//! HPACK-encoded header block, maintaining the dynamic table the peer's
//! decoder mirrors.
//!
//! # Example
//!
//! ```rust
//! use hpack_codec::Encoder;
//!
//! let mut encoder = Encoder::new();
//! let mut buf: Vec<u8> = Vec::new();
//!
//! encoder.encode_header(&mut buf, b":method", b"GET", false).unwrap();
//! assert_eq!(buf, vec![0x82]);
//! ```

use crate::{
    binary::BufMut,
    field::{HeaderField, IndexType},
    header_index::HeaderIndex,
    huffman::HuffmanEncoder,
    integer::encode_int,
    static_table::{self, STATIC_TABLE_LEN},
    HpackResult, DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
};

pub struct Encoder {
    pub(crate) index: HeaderIndex,
    use_indexing: bool,
    force_huffman_on: bool,
    force_huffman_off: bool,
}

impl Encoder {
    pub fn new() -> Encoder {
        Encoder::with_capacity(DEFAULT_SETTINGS_HEADER_TABLE_SIZE)
    }

    pub fn with_capacity(max_table_size: usize) -> Encoder {
        Encoder::with_options(max_table_size, true, false, false)
    }

    pub(crate) fn with_options(
        max_table_size: usize,
        use_indexing: bool,
        force_huffman_on: bool,
        force_huffman_off: bool,
    ) -> Encoder {
        Encoder {
            index: HeaderIndex::with_capacity(max_table_size),
            use_indexing,
            force_huffman_on,
            force_huffman_off,
        }
    }

    pub fn max_header_table_size(&self) -> usize {
        self.index.capacity()
    }

    /// Changes the dynamic table capacity, evicting as needed, and writes
    /// the size-update directive the peer's decoder requires. Returns the
    /// number of octets written.
    pub fn set_max_header_table_size<B: BufMut>(
        &mut self,
        buf: &mut B,
        max_table_size: usize,
    ) -> HpackResult<usize> {
        if self.index.capacity() == max_table_size {
            return Ok(0);
        }
        log::trace!("encoder table capacity changed to {}", max_table_size);
        self.index.set_capacity(max_table_size);
        Ok(encode_int(buf, 0x20, 5, max_table_size))
    }

    /// Writes the representation of one header field, choosing the shortest
    /// form the compression state allows. Returns the octets written.
    pub fn encode_header<B: BufMut>(
        &mut self,
        buf: &mut B,
        name: &[u8],
        value: &[u8],
        sensitive: bool,
    ) -> HpackResult<usize> {
        if sensitive {
            // must never be indexed, not here and not by any intermediary
            let name_index = self.name_index(name);
            return self.encode_literal(buf, name, value, IndexType::Never, name_index);
        }

        if self.index.capacity() == 0 {
            // the peer only holds the static table
            return match static_table::index_by_name_value(name, value) {
                Some(index) => Ok(encode_int(buf, 0x80, 7, index)),
                None => {
                    let name_index = static_table::index_by_name(name);
                    self.encode_literal(buf, name, value, IndexType::None, name_index)
                }
            };
        }

        let entry_size = HeaderField::size_of(name, value);
        if entry_size > self.index.capacity() {
            // the entry can never be stored, keep the table untouched
            let name_index = self.name_index(name);
            return self.encode_literal(buf, name, value, IndexType::None, name_index);
        }

        if let Some(index) = self.index.find_field(name, value) {
            return Ok(encode_int(buf, 0x80, 7, index + STATIC_TABLE_LEN));
        }
        if let Some(index) = static_table::index_by_name_value(name, value) {
            return Ok(encode_int(buf, 0x80, 7, index));
        }

        let name_index = self.name_index(name);
        if self.use_indexing {
            self.index.ensure_free(entry_size);
            let size = self.encode_literal(buf, name, value, IndexType::Incremental, name_index)?;
            self.index
                .add(HeaderField::new(name.to_vec(), value.to_vec()));
            Ok(size)
        } else {
            self.encode_literal(buf, name, value, IndexType::None, name_index)
        }
    }

    /// Encodes every header of the list into `buf`, returning the octets
    /// written.
    pub fn encode_into<'b, I, B>(&mut self, headers: I, buf: &mut B) -> HpackResult<usize>
    where
        I: IntoIterator<Item = &'b (Vec<u8>, Vec<u8>, bool)>,
        B: BufMut,
    {
        let mut size = 0;
        for (name, value, sensitive) in headers {
            size += self.encode_header(buf, name, value, *sensitive)?;
        }
        Ok(size)
    }

    pub fn encode<'b, I>(&mut self, headers: I) -> HpackResult<Vec<u8>>
    where
        I: IntoIterator<Item = &'b (Vec<u8>, Vec<u8>, bool)>,
    {
        let mut encoded: Vec<u8> = Vec::new();
        self.encode_into(headers, &mut encoded)?;
        Ok(encoded)
    }

    /// The combined index for `name`: the static table wins, then the most
    /// recent dynamic entry.
    fn name_index(&self, name: &[u8]) -> Option<usize> {
        match static_table::index_by_name(name) {
            Some(index) => Some(index),
            None => self.index.find_name(name).map(|index| index + STATIC_TABLE_LEN),
        }
    }

    fn encode_literal<B: BufMut>(
        &mut self,
        buf: &mut B,
        name: &[u8],
        value: &[u8],
        index_type: IndexType,
        name_index: Option<usize>,
    ) -> HpackResult<usize> {
        let (mask, prefix) = match index_type {
            IndexType::Incremental => (0x40, 6),
            IndexType::None => (0x00, 4),
            IndexType::Never => (0x10, 4),
        };
        let mut size = encode_int(buf, mask, prefix, name_index.unwrap_or(0));
        if name_index.is_none() {
            size += self.encode_string(buf, name);
        }
        size += self.encode_string(buf, value);
        Ok(size)
    }

    /// Huffman when it is strictly shorter, raw octets otherwise.
    fn encode_string<B: BufMut>(&self, buf: &mut B, src: &[u8]) -> usize {
        let encoder = HuffmanEncoder::new();
        let huffman_len = encoder.encoded_length(src);
        if (huffman_len < src.len() && !self.force_huffman_off) || self.force_huffman_on {
            let size = encode_int(buf, 0x80, 7, huffman_len);
            size + encoder.encode(src, buf)
        } else {
            let size = encode_int(buf, 0x00, 7, src.len());
            size + buf.put_slice(src)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_one(encoder: &mut Encoder, name: &[u8], value: &[u8]) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::new();
        let size = encoder.encode_header(&mut buf, name, value, false).unwrap();
        assert_eq!(size, buf.len());
        buf
    }

    #[test]
    fn static_full_match_is_indexed() {
        let mut encoder = Encoder::new();
        assert_eq!(encode_one(&mut encoder, b":method", b"GET"), vec![0x82]);
        assert_eq!(encode_one(&mut encoder, b":method", b"POST"), vec![0x83]);
        assert_eq!(encoder.index.length(), 0);
    }

    #[test]
    fn incremental_literal_enters_table_and_is_reused() {
        let mut encoder = Encoder::new();
        let first = encode_one(&mut encoder, b":authority", b"www.example.com");
        // literal with incremental indexing, name index 1
        assert_eq!(first[0], 0x41);
        assert_eq!(encoder.index.length(), 1);
        // the second occurrence resolves to dynamic index 62
        assert_eq!(
            encode_one(&mut encoder, b":authority", b"www.example.com"),
            vec![0xBE]
        );
    }

    #[test]
    fn sensitive_is_never_indexed() {
        let mut encoder = Encoder::new();
        let mut buf: Vec<u8> = Vec::new();
        encoder
            .encode_header(&mut buf, b"password", b"secret", true)
            .unwrap();
        assert_eq!(buf[0] & 0xF0, 0x10);
        assert_eq!(encoder.index.length(), 0);
        // a repeat stays un-indexed as well
        let mut buf: Vec<u8> = Vec::new();
        encoder
            .encode_header(&mut buf, b"password", b"secret", true)
            .unwrap();
        assert_eq!(buf[0] & 0xF0, 0x10);
    }

    #[test]
    fn zero_capacity_uses_only_static_table() {
        let mut encoder = Encoder::with_capacity(0);
        assert_eq!(encode_one(&mut encoder, b":method", b"GET"), vec![0x82]);
        let block = encode_one(&mut encoder, b"x-custom", b"v");
        // literal without indexing, literal name
        assert_eq!(block[0], 0x00);
        assert_eq!(encoder.index.length(), 0);
    }

    #[test]
    fn oversized_entry_is_not_stored() {
        let mut encoder = Encoder::with_capacity(64);
        let value = vec![b'a'; 128];
        let block = encode_one(&mut encoder, b"x-big", &value);
        // literal without indexing
        assert_eq!(block[0] & 0xF0, 0x00);
        assert_eq!(encoder.index.length(), 0);
    }

    #[test]
    fn size_update_directive_is_emitted() {
        let mut encoder = Encoder::new();
        let mut buf: Vec<u8> = Vec::new();
        encoder.set_max_header_table_size(&mut buf, 0).unwrap();
        assert_eq!(buf, vec![0x20]);
        let mut buf: Vec<u8> = Vec::new();
        encoder.set_max_header_table_size(&mut buf, 4096).unwrap();
        assert_eq!(buf, vec![0x3F, 0xE1, 0x1F]);
        // unchanged capacity writes nothing
        let mut buf: Vec<u8> = Vec::new();
        assert_eq!(encoder.set_max_header_table_size(&mut buf, 4096).unwrap(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn huffman_only_when_shorter() {
        let mut encoder = Encoder::new();
        // "ab" costs 11 huffman bits -> 2 octets, no gain over raw
        let block = encode_one(&mut encoder, b"zz-k", b"ab");
        let value_offset = block.len() - 3;
        assert_eq!(block[value_offset], 0x02);
        assert_eq!(&block[value_offset + 1..], b"ab");
    }

    #[test]
    fn forced_huffman_off_writes_raw() {
        let mut encoder = Encoder::with_options(4096, true, false, true);
        let block = encode_one(&mut encoder, b":authority", b"www.example.com");
        assert_eq!(block, {
            let mut expect = vec![0x41, 0x0F];
            expect.extend_from_slice(b"www.example.com");
            expect
        });
    }

    #[test]
    fn disabled_indexing_leaves_table_empty() {
        let mut encoder = Encoder::with_options(4096, false, false, false);
        let block = encode_one(&mut encoder, b"x-custom", b"value");
        assert_eq!(block[0] & 0xF0, 0x00);
        assert_eq!(encoder.index.length(), 0);
        // the repeat re-encodes the literal instead of an index
        let again = encode_one(&mut encoder, b"x-custom", b"value");
        assert_eq!(block, again);
    }
}
