//! An implementation of the HPACK header compression format (RFC 7541) for
//! HTTP/2, as a pure codec: an `Encoder` turns header lists into header
//! block octets, a `Decoder` turns header block octets back into header
//! lists, and both maintain the shared compression state the wire contract
//! demands. Transport, framing and header semantics belong to the caller.

mod binary;
mod decoder;
mod dynamic_table;
mod encoder;
mod error;
mod field;
mod header_index;
mod huffman;
mod integer;
pub mod static_table;

pub use binary::{Binary, BinaryMut, Buf, BufMut, MarkBuf};
pub use decoder::Decoder;
pub use dynamic_table::DynamicTable;
pub use encoder::Encoder;
pub use error::{DecoderError, HpackError, HpackResult, HuffmanDecoderError};
pub use field::{HeaderField, HEADER_ENTRY_OVERHEAD};
pub use huffman::{HuffmanDecoder, HuffmanEncoder};

/// 默认的header动态表大小
pub const DEFAULT_SETTINGS_HEADER_TABLE_SIZE: usize = 4_096;

/// 默认的单个头块解码上限
pub const DEFAULT_MAX_HEADER_BLOCK_SIZE: usize = 8_192;
