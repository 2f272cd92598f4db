use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use super::{Buf, MarkBuf};

/// 二进制的封装, 共享引用对象, 仅支持读操作
///
/// Cloning is cheap: clones share the backing storage and carry their own
/// cursor and mark.
pub struct Binary {
    data: Arc<Vec<u8>>,
    // 游标值, 可以得出当前指向的位置
    cursor: usize,
    // 标记值, 游标可以回退到此处
    mark: usize,
}

impl Binary {
    pub fn new() -> Binary {
        Binary::from(Vec::new())
    }

    /// Remaining unread length.
    ///
    /// # Examples
    ///
    /// ```
    /// use hpack_codec::Binary;
    ///
    /// let b = Binary::from(&b"hello"[..]);
    /// assert_eq!(b.len(), 5);
    /// ```
    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.data[self.cursor..]
    }
}

impl Clone for Binary {
    fn clone(&self) -> Binary {
        Binary {
            data: self.data.clone(),
            cursor: self.cursor,
            mark: self.mark,
        }
    }
}

impl Buf for Binary {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        self.as_slice()
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        assert!(n <= self.len(), "advance out of bounds");
        self.cursor += n;
    }
}

impl MarkBuf for Binary {
    #[inline]
    fn mark_commit(&mut self) {
        self.mark = self.cursor;
    }

    #[inline]
    fn mark_rewind(&mut self) {
        self.cursor = self.mark;
    }
}

impl From<Vec<u8>> for Binary {
    fn from(val: Vec<u8>) -> Binary {
        Binary {
            data: Arc::new(val),
            cursor: 0,
            mark: 0,
        }
    }
}

impl From<&[u8]> for Binary {
    fn from(val: &[u8]) -> Binary {
        Binary::from(val.to_vec())
    }
}

impl Deref for Binary {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Debug for Binary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binary")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_rewind_restores_cursor() {
        let mut b = Binary::from(&b"abcd"[..]);
        assert_eq!(b.get_next(), Some(b'a'));
        b.mark_commit();
        assert_eq!(b.get_next(), Some(b'b'));
        assert_eq!(b.get_next(), Some(b'c'));
        b.mark_rewind();
        assert_eq!(b.get_next(), Some(b'b'));
        assert_eq!(b.remaining(), 2);
    }
}
