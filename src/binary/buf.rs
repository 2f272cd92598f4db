pub trait Buf {
    /// 获取剩余数量
    fn remaining(&self) -> usize;

    /// 获取当前数据的切片引用
    fn chunk(&self) -> &[u8];

    /// 消耗掉多少字节的数据, 做指针偏移
    fn advance(&mut self, n: usize);

    /// 是否还有数据
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// 获取当前的值, 但不做任何偏移
    fn peek(&self) -> Option<u8> {
        if self.has_remaining() {
            Some(self.chunk()[0])
        } else {
            None
        }
    }

    /// 获取当前的值并将偏移值+1
    fn get_next(&mut self) -> Option<u8> {
        match self.peek() {
            Some(val) => {
                self.advance(1);
                Some(val)
            }
            None => None,
        }
    }

    /// 拷贝数据 `self` into `dst`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hpack_codec::Buf;
    ///
    /// let mut buf = &b"hello world"[..];
    /// let mut dst = [0; 5];
    ///
    /// buf.copy_to_slice(&mut dst);
    /// assert_eq!(&b"hello"[..], &dst);
    /// assert_eq!(6, buf.remaining());
    /// ```
    ///
    /// # Panics
    ///
    /// This function panics if `self.remaining() < dst.len()`
    fn copy_to_slice(&mut self, dst: &mut [u8]) -> usize {
        assert!(self.remaining() >= dst.len());
        dst.copy_from_slice(&self.chunk()[..dst.len()]);
        self.advance(dst.len());
        dst.len()
    }
}

/// A readable buffer that can remember one position and later return to it.
/// The decoder parks on the mark when an integer cannot be finished with the
/// bytes currently available.
pub trait MarkBuf: Buf {
    /// 把当前游标提交为标记值
    fn mark_commit(&mut self);

    /// 把游标回退到上一次提交的标记值
    fn mark_rewind(&mut self);
}

impl Buf for &[u8] {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        self
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        *self = &self[n..];
    }
}
