//! Adapters that let a stream pull elements out of, or push elements into, a collection without
//! knowing the collection's concrete type.
//!
//! A view makes one pass over its collection: `extract` and `insert` are called with offsets that
//! only move forward, and once every element has been produced or consumed the view is exhausted.
//! Views borrow the collection, they never own it.

mod deref;
mod fixed;
mod growable;
mod vec;

pub use self::deref::DereferencingView;
pub use self::fixed::FixedArrayView;
pub use self::growable::GrowableCharView;
pub use self::vec::VecView;

use crate::traits::Element;
use crate::type_tag::TypeTag;
use crate::StreamError;

/// One pass over a sequence of [Element]s, used by the array protocol.
pub trait SequenceView {
    /// The element type.
    type Item: Element;

    /// The tag that describes each element in the array header.
    fn element_tag(&self) -> TypeTag {
        <Self::Item as Element>::TAG
    }

    /// The declared number of elements, `None` if unknown.
    ///
    /// When writing, an unknown count streams the array in separator mode. When reading, a known
    /// count must match the count declared by the stream.
    fn count(&self) -> Option<usize>;

    /// Whether the elements are laid out next to each other, so that `extract(n)` and `insert(n)`
    /// can hand out more than one element at a time.
    fn is_continuous(&self) -> bool;

    /// Whether the stream has to write per-element separators for this view.
    fn needs_separators(&self) -> bool {
        self.count().is_none()
    }

    /// The next `n` elements. Non-continuous views only support `n == 1`.
    ///
    /// Returns [StreamError::NoMoreData] once the view is exhausted.
    fn extract(&mut self, n: usize) -> Result<&[Self::Item], StreamError>;

    /// Storage for the next `n` elements, to be overwritten by the reader.
    ///
    /// Growable views fill new storage with `Default::default()` first.
    fn insert(&mut self, n: usize) -> Result<&mut [Self::Item], StreamError>;
}

impl<V: SequenceView + ?Sized> SequenceView for &'_ mut V {
    type Item = V::Item;

    fn element_tag(&self) -> TypeTag {
        (**self).element_tag()
    }

    fn count(&self) -> Option<usize> {
        (**self).count()
    }

    fn is_continuous(&self) -> bool {
        (**self).is_continuous()
    }

    fn needs_separators(&self) -> bool {
        (**self).needs_separators()
    }

    fn extract(&mut self, n: usize) -> Result<&[Self::Item], StreamError> {
        (**self).extract(n)
    }

    fn insert(&mut self, n: usize) -> Result<&mut [Self::Item], StreamError> {
        (**self).insert(n)
    }
}
