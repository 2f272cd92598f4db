use super::Buf;

pub trait BufMut {
    /// 写入一段数据, 返回写入的长度
    fn put_slice(&mut self, src: &[u8]) -> usize;

    fn put_u8(&mut self, n: u8) {
        self.put_slice(&[n]);
    }

    /// 将`src`的剩余数据全部写入
    ///
    /// # Examples
    ///
    /// ```
    /// use hpack_codec::{Binary, Buf, BufMut};
    ///
    /// let mut src = Binary::from(&b"codec"[..]);
    /// let mut dst: Vec<u8> = vec![];
    /// dst.put(&mut src);
    /// assert_eq!(dst, b"codec");
    /// assert!(!src.has_remaining());
    /// ```
    fn put<T: Buf>(&mut self, src: &mut T) -> usize {
        let len = self.put_slice(src.chunk());
        src.advance(len);
        len
    }
}

impl BufMut for Vec<u8> {
    #[inline]
    fn put_slice(&mut self, src: &[u8]) -> usize {
        self.extend_from_slice(src);
        src.len()
    }
}
