use super::SequenceView;
use crate::traits::Element;
use crate::type_tag::TypeTag;
use crate::StreamError;
use alloc::vec::Vec;

/// A view over a `Vec`.
///
/// Extraction starts at the front. Insertion overwrites the existing elements from the front and
/// appends once they run out, so reading an array of the declared count leaves exactly that many.
pub struct VecView<'a, T> {
    items: &'a mut Vec<T>,
    pos: usize,
    count: Option<usize>,
    tag: TypeTag,
}

impl<'a, T: Element + Default> VecView<'a, T> {
    /// Create a view that declares the current length of `items`.
    pub fn new(items: &'a mut Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            items,
            pos: 0,
            tag: T::TAG,
        }
    }

    /// Forget the declared count. Use this to read an array of any length.
    pub fn with_unknown_count(mut self) -> Self {
        self.count = None;
        self
    }

    /// Report `tag` instead of the element type's own tag, e.g. [TypeTag::BINARY] for raw bytes.
    pub fn with_tag(mut self, tag: TypeTag) -> Self {
        self.tag = tag;
        self
    }
}

impl<T: Element + Default> SequenceView for VecView<'_, T> {
    type Item = T;

    fn element_tag(&self) -> TypeTag {
        self.tag
    }

    fn count(&self) -> Option<usize> {
        self.count
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn extract(&mut self, n: usize) -> Result<&[T], StreamError> {
        let start = self.pos;
        let end = start.checked_add(n).ok_or(StreamError::NoMoreData)?;
        if end > self.items.len() {
            return Err(StreamError::NoMoreData);
        }
        self.pos = end;
        Ok(&self.items[start..end])
    }

    fn insert(&mut self, n: usize) -> Result<&mut [T], StreamError> {
        let start = self.pos;
        let end = start
            .checked_add(n)
            .ok_or(StreamError::InvalidArgument("array too long"))?;
        if end > self.items.len() {
            self.items.resize_with(end, T::default);
        }
        self.pos = end;
        Ok(&mut self.items[start..end])
    }
}
