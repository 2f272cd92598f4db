use std::fmt::Debug;

use super::{Binary, Buf, BufMut, MarkBuf};

/// 可读可写的二进制缓冲, 写入在尾部追加, 读取由游标推进
#[derive(Clone)]
pub struct BinaryMut {
    data: Vec<u8>,
    cursor: usize,
    mark: usize,
}

impl BinaryMut {
    pub fn new() -> BinaryMut {
        BinaryMut::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> BinaryMut {
        BinaryMut {
            data: Vec::with_capacity(capacity),
            cursor: 0,
            mark: 0,
        }
    }

    /// Remaining unread length.
    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出所有已写入的数据, 读取游标归零
    pub fn freeze(self) -> Binary {
        Binary::from(self.data)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data[self.cursor..].to_vec()
    }
}

impl Buf for BinaryMut {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        assert!(n <= self.len(), "advance out of bounds");
        self.cursor += n;
    }
}

impl MarkBuf for BinaryMut {
    #[inline]
    fn mark_commit(&mut self) {
        self.mark = self.cursor;
    }

    #[inline]
    fn mark_rewind(&mut self) {
        self.cursor = self.mark;
    }
}

impl BufMut for BinaryMut {
    #[inline]
    fn put_slice(&mut self, src: &[u8]) -> usize {
        self.data.extend_from_slice(src);
        src.len()
    }
}

impl From<Vec<u8>> for BinaryMut {
    fn from(data: Vec<u8>) -> BinaryMut {
        BinaryMut {
            data,
            cursor: 0,
            mark: 0,
        }
    }
}

impl Debug for BinaryMut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryMut")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut buf = BinaryMut::new();
        buf.put_u8(0x82);
        buf.put_slice(b"hi");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.get_next(), Some(0x82));
        let mut dst = [0u8; 2];
        buf.copy_to_slice(&mut dst);
        assert_eq!(&dst, b"hi");
        assert!(!buf.has_remaining());
    }
}
