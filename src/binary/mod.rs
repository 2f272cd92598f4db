
mod binary;
mod binary_mut;
mod buf;
mod buf_mut;

pub use binary::Binary;
pub use binary_mut::BinaryMut;
pub use buf::{Buf, MarkBuf};
pub use buf_mut::BufMut;
