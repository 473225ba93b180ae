use super::SequenceView;
use crate::traits::Element;
use crate::type_tag::TypeTag;
use crate::StreamError;

enum Slots<'a, T> {
    Shared(&'a [T]),
    Exclusive(&'a mut [T]),
}

impl<T> Slots<'_, T> {
    fn len(&self) -> usize {
        match self {
            Slots::Shared(s) => s.len(),
            Slots::Exclusive(s) => s.len(),
        }
    }
}

/// A view over a fixed-length slice.
///
/// Views created with [FixedArrayView::new] can only be written from, views created with
/// [FixedArrayView::new_mut] can also be read into. Going past the end of the slice returns
/// [StreamError::NoMoreData].
pub struct FixedArrayView<'a, T> {
    slots: Slots<'a, T>,
    pos: usize,
    count: Option<usize>,
    tag: TypeTag,
}

impl<'a, T: Element> FixedArrayView<'a, T> {
    /// Create a read-only view, for writing `items` to a stream.
    pub fn new(items: &'a [T]) -> Self {
        Self {
            count: Some(items.len()),
            slots: Slots::Shared(items),
            pos: 0,
            tag: T::TAG,
        }
    }

    /// Create a view that can also be filled by a stream.
    pub fn new_mut(items: &'a mut [T]) -> Self {
        Self {
            count: Some(items.len()),
            slots: Slots::Exclusive(items),
            pos: 0,
            tag: T::TAG,
        }
    }

    /// Forget the declared count. Writing streams the slice in separator mode, reading accepts any
    /// array that fits.
    pub fn with_unknown_count(mut self) -> Self {
        self.count = None;
        self
    }

    /// Describe the elements with `tag` instead of `T::TAG`, e.g. to stream bytes as text.
    pub fn with_tag(mut self, tag: TypeTag) -> Self {
        self.tag = tag;
        self
    }

    /// How many elements have been extracted or inserted so far.
    pub fn processed(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, n: usize) -> Result<usize, StreamError> {
        let start = self.pos;
        match start.checked_add(n) {
            Some(end) if end <= self.slots.len() => {
                self.pos = end;
                Ok(start)
            }
            _ => Err(StreamError::NoMoreData),
        }
    }
}

impl<T: Element> SequenceView for FixedArrayView<'_, T> {
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
        let start = self.advance(n)?;
        Ok(match &self.slots {
            Slots::Shared(s) => &s[start..start + n],
            Slots::Exclusive(s) => &s[start..start + n],
        })
    }

    fn insert(&mut self, n: usize) -> Result<&mut [T], StreamError> {
        if let Slots::Shared(_) = self.slots {
            return Err(StreamError::NotSupported);
        }
        let start = self.advance(n)?;
        match &mut self.slots {
            Slots::Exclusive(s) => Ok(&mut s[start..start + n]),
            Slots::Shared(_) => Err(StreamError::NotSupported),
        }
    }
}
