use super::SequenceView;
use crate::type_tag::TypeTag;
use crate::StreamError;
use alloc::vec::Vec;

/// Smallest allocation made by a [GrowableCharView].
const BLOCK: usize = 64;

/// An append-only text buffer for variable-length tokens.
///
/// The buffer always ends with a NUL byte that is not part of the token. Storage grows
/// geometrically, rounded up to a power of two.
///
/// ```
/// use binstream_core::{BufferStream, GrowableCharView, StreamExt};
///
/// let mut stream = BufferStream::new();
/// stream.write_str("key").unwrap();
///
/// let mut buf = Vec::new();
/// let mut view = GrowableCharView::new(&mut buf);
/// stream.read_array(&mut view).unwrap();
/// assert_eq!(view.as_bytes(), b"key");
/// assert_eq!(buf, b"key\0");
/// ```
pub struct GrowableCharView<'a> {
    buf: &'a mut Vec<u8>,
    len: usize,
    pos: usize,
}

impl<'a> GrowableCharView<'a> {
    /// Append to the token already held by `buf`, if any.
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        if buf.last() == Some(&0) {
            buf.pop();
        }
        let len = buf.len();
        buf.push(0);
        Self { buf, len, pos: 0 }
    }

    /// The token, without the trailing NUL.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Length of the token in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn grow(&mut self, n: usize) -> Result<(), StreamError> {
        let needed = self
            .len
            .checked_add(n)
            .and_then(|n| n.checked_add(1))
            .ok_or(StreamError::InvalidArgument("token too long"))?;
        if needed > self.buf.capacity() {
            let target = needed
                .checked_next_power_of_two()
                .ok_or(StreamError::InvalidArgument("token too long"))?
                .max(BLOCK);
            self.buf.reserve_exact(target - self.buf.len());
        }
        self.buf.truncate(self.len);
        self.buf.resize(self.len + n, 0);
        self.buf.push(0);
        Ok(())
    }
}

impl SequenceView for GrowableCharView<'_> {
    type Item = u8;

    fn element_tag(&self) -> TypeTag {
        TypeTag::CHAR
    }

    fn count(&self) -> Option<usize> {
        None
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn extract(&mut self, n: usize) -> Result<&[u8], StreamError> {
        let start = self.pos;
        match start.checked_add(n) {
            Some(end) if end <= self.len => {
                self.pos = end;
                Ok(&self.buf[start..end])
            }
            _ => Err(StreamError::NoMoreData),
        }
    }

    fn insert(&mut self, n: usize) -> Result<&mut [u8], StreamError> {
        self.grow(n)?;
        let start = self.len;
        self.len += n;
        Ok(&mut self.buf[start..start + n])
    }
}
