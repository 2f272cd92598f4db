//! Exposes the struct `Decoder` that allows for HPACK-encoded header blocks to
//! be decoded into a header list.
//!
//! The decoder only follows HPACK rules, without performing any additional
//! (semantic) checks on the header name/value pairs, i.e. it considers the
//! headers as opaque octets.
//!
//! Decoding is resumable: the state machine parks between octets whenever the
//! input runs dry, and a later `decode` call continues where the previous one
//! stopped. An unfinished integer rewinds the buffer to its first
//! continuation octet; an unfinished literal payload stays unconsumed until
//! enough octets are buffered.
//!
//! # Example
//!
//! A simple example of using the decoder that demonstrates its API:
//!
//! ```rust
//! use hpack_codec::{Binary, Decoder};
//! let mut decoder = Decoder::new();
//!
//! let mut buf = Binary::from(vec![0x82, 0x84]);
//! let header_list = decoder.decode(&mut buf).unwrap();
//!
//! assert_eq!(header_list, [
//!     (b":method".to_vec(), b"GET".to_vec()),
//!     (b":path".to_vec(), b"/".to_vec()),
//! ]);
//! ```
//!
//! A more complex example where the callback API is used, providing the client
//! a borrowed representation of each header:
//!
//! ```rust
//! use hpack_codec::{Binary, Decoder};
//! let mut decoder = Decoder::new();
//!
//! let mut count = 0;
//! let mut buf = Binary::from(vec![0x82, 0x84]);
//! decoder.decode_with_cb(&mut buf, |name, value, sensitive| {
//!     count += 1;
//!     assert!(!sensitive);
//!     match count {
//!         1 => {
//!             assert_eq!(name, &b":method"[..]);
//!             assert_eq!(value, &b"GET"[..]);
//!         },
//!         2 => {
//!             assert_eq!(name, &b":path"[..]);
//!             assert_eq!(value, &b"/"[..]);
//!         },
//!         _ => panic!("Did not expect more than two headers!"),
//!     };
//! }).unwrap();
//! ```

use std::mem;

use crate::{
    binary::{Buf, MarkBuf},
    dynamic_table::DynamicTable,
    field::{HeaderField, IndexType, HEADER_ENTRY_OVERHEAD},
    huffman::HuffmanDecoder,
    integer::decode_ule128,
    static_table::{self, STATIC_TABLE_LEN},
    DecoderError, HpackResult, DEFAULT_MAX_HEADER_BLOCK_SIZE,
    DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
};

/// The phases of the byte-driven state machine. The machine can stop on any
/// of them and resume on the next `decode` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadHeaderRepresentation,
    ReadMaxDynamicTableSize,
    ReadIndexedHeader,
    ReadIndexedHeaderName,
    ReadLiteralHeaderNameLengthPrefix,
    ReadLiteralHeaderNameLength,
    ReadLiteralHeaderName,
    SkipLiteralHeaderName,
    ReadLiteralHeaderValueLengthPrefix,
    ReadLiteralHeaderValueLength,
    ReadLiteralHeaderValue,
    SkipLiteralHeaderValue,
}

/// Decodes headers encoded using HPACK, mirroring the peer encoder's dynamic
/// table and enforcing the receiver-side size limits.
pub struct Decoder {
    dynamic_table: DynamicTable,
    /// 单个头块解码出的名字与值的字节数上限
    max_header_block_size: usize,
    /// The hard ceiling the host granted for the dynamic table.
    max_dynamic_table_size: usize,
    /// What the peer currently believes the table capacity is.
    encoder_max_dynamic_table_size: usize,
    /// The peer must lead the next block with a size update.
    size_update_required: bool,

    state: State,
    index_type: IndexType,
    // 前缀已满时的基数, 等待续接字节
    index: usize,
    huffman_encoded: bool,
    name: Vec<u8>,
    name_length: usize,
    value_length: usize,
    skip_length: usize,
    header_size: usize,
    is_over_size: bool,
}

impl Decoder {
    pub fn new() -> Decoder {
        Decoder::with_limits(
            DEFAULT_MAX_HEADER_BLOCK_SIZE,
            DEFAULT_SETTINGS_HEADER_TABLE_SIZE,
        )
    }

    pub fn with_limits(max_header_block_size: usize, max_table_size: usize) -> Decoder {
        Decoder {
            dynamic_table: DynamicTable::with_capacity(max_table_size),
            max_header_block_size,
            max_dynamic_table_size: max_table_size,
            encoder_max_dynamic_table_size: max_table_size,
            size_update_required: false,
            state: State::ReadHeaderRepresentation,
            index_type: IndexType::None,
            index: 0,
            huffman_encoded: false,
            name: Vec::new(),
            name_length: 0,
            value_length: 0,
            skip_length: 0,
            header_size: 0,
            is_over_size: false,
        }
    }

    pub fn max_header_table_size(&self) -> usize {
        self.dynamic_table.capacity()
    }

    /// The host grants a new receiver cap. Shrinking below what the peer
    /// believes forces the peer to acknowledge with a size update at the
    /// start of its next header block.
    pub fn set_max_header_table_size(&mut self, max_table_size: usize) {
        self.max_dynamic_table_size = max_table_size;
        if max_table_size < self.encoder_max_dynamic_table_size {
            self.size_update_required = true;
            self.dynamic_table.set_capacity(max_table_size);
        }
    }

    /// Ends the current header block. Returns `true` when headers were
    /// dropped because the block outgrew `max_header_block_size`. The
    /// dynamic table carries over; the per-block state does not.
    pub fn end_header_block(&mut self) -> bool {
        let truncated = self.is_over_size;
        self.header_size = 0;
        self.is_over_size = false;
        self.state = State::ReadHeaderRepresentation;
        self.index_type = IndexType::None;
        truncated
    }

    /// Decodes the headers found in the given buffer `buf`, collecting them
    /// into an owned header list.
    pub fn decode<B: Buf + MarkBuf>(&mut self, buf: &mut B) -> HpackResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut header_list = Vec::new();
        self.decode_with_cb(buf, |name, value, _| {
            header_list.push((name.to_vec(), value.to_vec()))
        })?;
        Ok(header_list)
    }

    /// Decodes as many octets as the buffer holds, invoking `cb` with the
    /// name, the value and the sensitive flag of every completed header.
    /// Returning with unread octets left in `buf` means the machine parked
    /// mid-field and expects those octets again on the next call.
    pub fn decode_with_cb<B, F>(&mut self, buf: &mut B, mut cb: F) -> HpackResult<()>
    where
        B: Buf + MarkBuf,
        F: FnMut(&[u8], &[u8], bool),
    {
        while buf.has_remaining() {
            match self.state {
                State::ReadHeaderRepresentation => {
                    let b = match buf.get_next() {
                        Some(b) => b,
                        None => break,
                    };
                    if self.size_update_required && b & 0xE0 != 0x20 {
                        return Err(DecoderError::MaxSizeUpdateRequired.into());
                    }
                    if b & 0x80 == 0x80 {
                        // Indexed Header Field
                        let index = (b & 0x7F) as usize;
                        if index == 0 {
                            return Err(DecoderError::InvalidIndex.into());
                        } else if index == 0x7F {
                            self.index = index;
                            self.state = State::ReadIndexedHeader;
                        } else {
                            self.index_header(index, &mut cb)?;
                        }
                    } else if b & 0x40 == 0x40 {
                        // Literal Header Field with Incremental Indexing
                        self.index_type = IndexType::Incremental;
                        self.start_literal((b & 0x3F) as usize, 0x3F)?;
                    } else if b & 0x20 == 0x20 {
                        // Dynamic Table Size Update
                        let index = (b & 0x1F) as usize;
                        if index == 0x1F {
                            self.index = index;
                            self.state = State::ReadMaxDynamicTableSize;
                        } else {
                            self.set_dynamic_table_size(index)?;
                        }
                    } else {
                        // Literal Header Field without Indexing / Never Indexed
                        self.index_type = if b & 0x10 == 0x10 {
                            IndexType::Never
                        } else {
                            IndexType::None
                        };
                        self.start_literal((b & 0x0F) as usize, 0x0F)?;
                    }
                }
                State::ReadMaxDynamicTableSize => match decode_ule128(buf)? {
                    None => break,
                    Some(cont) => {
                        if cont > i32::MAX as u32 - self.index as u32 {
                            return Err(DecoderError::IntegerOverflow.into());
                        }
                        self.set_dynamic_table_size(self.index + cont as usize)?;
                        self.state = State::ReadHeaderRepresentation;
                    }
                },
                State::ReadIndexedHeader => match decode_ule128(buf)? {
                    None => break,
                    Some(cont) => {
                        if cont > i32::MAX as u32 - self.index as u32 {
                            return Err(DecoderError::IntegerOverflow.into());
                        }
                        self.index_header(self.index + cont as usize, &mut cb)?;
                        self.state = State::ReadHeaderRepresentation;
                    }
                },
                State::ReadIndexedHeaderName => match decode_ule128(buf)? {
                    None => break,
                    Some(cont) => {
                        if cont > i32::MAX as u32 - self.index as u32 {
                            return Err(DecoderError::IntegerOverflow.into());
                        }
                        self.read_name(self.index + cont as usize)?;
                        self.state = State::ReadLiteralHeaderValueLengthPrefix;
                    }
                },
                State::ReadLiteralHeaderNameLengthPrefix => {
                    let b = match buf.get_next() {
                        Some(b) => b,
                        None => break,
                    };
                    self.huffman_encoded = b & 0x80 == 0x80;
                    let length = (b & 0x7F) as usize;
                    if length == 0x7F {
                        self.index = length;
                        self.state = State::ReadLiteralHeaderNameLength;
                    } else {
                        if length == 0 {
                            return Err(DecoderError::EmptyHeaderName.into());
                        }
                        self.name_length = length;
                        self.check_name_length();
                    }
                }
                State::ReadLiteralHeaderNameLength => match decode_ule128(buf)? {
                    None => break,
                    Some(cont) => {
                        if cont > i32::MAX as u32 - self.index as u32 {
                            return Err(DecoderError::IntegerOverflow.into());
                        }
                        self.name_length = self.index + cont as usize;
                        self.check_name_length();
                    }
                },
                State::ReadLiteralHeaderName => {
                    // wait until the whole name is buffered
                    if buf.remaining() < self.name_length {
                        break;
                    }
                    self.name = self.read_string_literal(buf, self.name_length)?;
                    self.state = State::ReadLiteralHeaderValueLengthPrefix;
                }
                State::SkipLiteralHeaderName => {
                    let skip = self.skip_length.min(buf.remaining());
                    buf.advance(skip);
                    self.skip_length -= skip;
                    if self.skip_length == 0 {
                        self.state = State::ReadLiteralHeaderValueLengthPrefix;
                    }
                }
                State::ReadLiteralHeaderValueLengthPrefix => {
                    let b = match buf.get_next() {
                        Some(b) => b,
                        None => break,
                    };
                    self.huffman_encoded = b & 0x80 == 0x80;
                    let length = (b & 0x7F) as usize;
                    if length == 0x7F {
                        self.index = length;
                        self.state = State::ReadLiteralHeaderValueLength;
                    } else {
                        self.value_length = length;
                        self.finish_value_length(&mut cb)?;
                    }
                }
                State::ReadLiteralHeaderValueLength => match decode_ule128(buf)? {
                    None => break,
                    Some(cont) => {
                        if cont > i32::MAX as u32 - self.index as u32 {
                            return Err(DecoderError::IntegerOverflow.into());
                        }
                        self.value_length = self.index + cont as usize;
                        self.finish_value_length(&mut cb)?;
                    }
                },
                State::ReadLiteralHeaderValue => {
                    // wait until the whole value is buffered
                    if buf.remaining() < self.value_length {
                        break;
                    }
                    let value = self.read_string_literal(buf, self.value_length)?;
                    let name = mem::take(&mut self.name);
                    self.insert_header(&mut cb, name, value)?;
                    self.state = State::ReadHeaderRepresentation;
                }
                State::SkipLiteralHeaderValue => {
                    let skip = self.skip_length.min(buf.remaining());
                    buf.advance(skip);
                    self.skip_length -= skip;
                    if self.skip_length == 0 {
                        self.state = State::ReadHeaderRepresentation;
                    }
                }
            }
        }
        Ok(())
    }

    /// Routes a literal directive by the name index held in its prefix.
    fn start_literal(&mut self, index: usize, max_prefix: usize) -> HpackResult<()> {
        if index == 0 {
            self.state = State::ReadLiteralHeaderNameLengthPrefix;
        } else if index == max_prefix {
            self.index = index;
            self.state = State::ReadIndexedHeaderName;
        } else {
            self.read_name(index)?;
            self.state = State::ReadLiteralHeaderValueLengthPrefix;
        }
        Ok(())
    }

    /// Decides whether the literal name is worth materializing once its
    /// length is known.
    fn check_name_length(&mut self) {
        if self.exceeds_max_header_size(self.name_length) {
            if self.index_type != IndexType::Incremental {
                // the name is unused, skip the octets
                self.name = Vec::new();
                self.skip_length = self.name_length;
                self.state = State::SkipLiteralHeaderName;
                return;
            }
            if self.name_length + HEADER_ENTRY_OVERHEAD > self.dynamic_table.capacity() {
                // the entry cannot reach the table either, resynchronize
                self.dynamic_table.clear();
                self.name = Vec::new();
                self.skip_length = self.name_length;
                self.state = State::SkipLiteralHeaderName;
                return;
            }
        }
        self.state = State::ReadLiteralHeaderName;
    }

    /// With the value length known, either finish the zero-length field,
    /// read the payload, or skip it when the header was dropped and the
    /// table has no use for it.
    fn finish_value_length<F>(&mut self, cb: &mut F) -> HpackResult<()>
    where
        F: FnMut(&[u8], &[u8], bool),
    {
        let new_size = self.name_length + self.value_length;
        if self.exceeds_max_header_size(new_size) {
            let fits_table = self.index_type == IndexType::Incremental
                && new_size + HEADER_ENTRY_OVERHEAD <= self.dynamic_table.capacity();
            if !fits_table {
                if self.index_type == IndexType::Incremental {
                    self.dynamic_table.clear();
                }
                self.name = Vec::new();
                self.skip_length = self.value_length;
                self.state = State::SkipLiteralHeaderValue;
                return Ok(());
            }
            // dropped from the block, but the entry still has to reach the
            // table, so the payload is read anyway
        }
        if self.value_length == 0 {
            let name = mem::take(&mut self.name);
            self.insert_header(cb, name, Vec::new())?;
            self.state = State::ReadHeaderRepresentation;
        } else {
            self.state = State::ReadLiteralHeaderValue;
        }
        Ok(())
    }

    fn read_string_literal<B: Buf + MarkBuf>(
        &mut self,
        buf: &mut B,
        length: usize,
    ) -> HpackResult<Vec<u8>> {
        let mut raw = vec![0u8; length];
        buf.copy_to_slice(&mut raw);
        if self.huffman_encoded {
            HuffmanDecoder::new().decode(&raw)
        } else {
            Ok(raw)
        }
    }

    /// Resolves a name through the combined index space.
    fn read_name(&mut self, index: usize) -> HpackResult<()> {
        if index <= STATIC_TABLE_LEN {
            let (name, _) = static_table::get_entry(index)?;
            self.name = name.to_vec();
            self.name_length = name.len();
        } else if index - STATIC_TABLE_LEN <= self.dynamic_table.length() {
            let field = self.dynamic_table.get_entry(index - STATIC_TABLE_LEN)?;
            self.name = field.name.clone();
            self.name_length = self.name.len();
        } else {
            return Err(DecoderError::InvalidIndex.into());
        }
        Ok(())
    }

    /// Emits the field at the combined `index`. Indexed headers are never
    /// sensitive.
    fn index_header<F>(&mut self, index: usize, cb: &mut F) -> HpackResult<()>
    where
        F: FnMut(&[u8], &[u8], bool),
    {
        if index <= STATIC_TABLE_LEN {
            let (name, value) = static_table::get_entry(index)?;
            self.add_header(cb, name, value, false);
        } else if index - STATIC_TABLE_LEN <= self.dynamic_table.length() {
            let field = self.dynamic_table.get_entry(index - STATIC_TABLE_LEN)?;
            let new_size = self.header_size + field.name.len() + field.value.len();
            if !self.is_over_size && new_size <= self.max_header_block_size {
                cb(&field.name, &field.value, false);
                self.header_size = new_size;
            } else {
                // truncation reported by end_header_block
                self.is_over_size = true;
            }
        } else {
            return Err(DecoderError::InvalidIndex.into());
        }
        Ok(())
    }

    /// Delivers a completed literal and applies its dynamic table side
    /// effect, which happens even when the block limit drops the header.
    fn insert_header<F>(&mut self, cb: &mut F, name: Vec<u8>, value: Vec<u8>) -> HpackResult<()>
    where
        F: FnMut(&[u8], &[u8], bool),
    {
        if name.is_empty() {
            return Err(DecoderError::EmptyHeaderName.into());
        }
        let sensitive = self.index_type == IndexType::Never;
        self.add_header(cb, &name, &value, sensitive);
        if self.index_type == IndexType::Incremental {
            self.dynamic_table.add(HeaderField::new(name, value));
        }
        Ok(())
    }

    fn add_header<F>(&mut self, cb: &mut F, name: &[u8], value: &[u8], sensitive: bool)
    where
        F: FnMut(&[u8], &[u8], bool),
    {
        let new_size = self.header_size + name.len() + value.len();
        if !self.is_over_size && new_size <= self.max_header_block_size {
            cb(name, value, sensitive);
            self.header_size = new_size;
        } else {
            // truncation reported by end_header_block
            self.is_over_size = true;
        }
    }

    /// Tracks the cumulative decoded octets of the block. Once over, the
    /// whole remainder of the block is dropped.
    fn exceeds_max_header_size(&mut self, size: usize) -> bool {
        if !self.is_over_size && size + self.header_size <= self.max_header_block_size {
            return false;
        }
        self.is_over_size = true;
        true
    }

    fn set_dynamic_table_size(&mut self, size: usize) -> HpackResult<()> {
        if size > self.max_dynamic_table_size {
            return Err(DecoderError::InvalidMaxDynamicSize.into());
        }
        log::trace!("decoder table capacity changed to {}", size);
        self.encoder_max_dynamic_table_size = size;
        self.size_update_required = false;
        self.dynamic_table.set_capacity(size);
        Ok(())
    }

    pub(crate) fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic_table
    }
}
