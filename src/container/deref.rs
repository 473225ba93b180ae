use super::SequenceView;
use crate::traits::Element;
use crate::StreamError;
use alloc::vec::Vec;
use core::ops::DerefMut;

/// A view over a collection of handles (e.g. `Vec<Box<T>>`) that streams the values they point to.
///
/// The handles are contiguous but the values are not, so elements are always transferred one at
/// a time. Inserting allocates a new default value and pushes its handle.
pub struct DereferencingView<'a, D> {
    handles: &'a mut Vec<D>,
    pos: usize,
    count: Option<usize>,
}

impl<'a, D> DereferencingView<'a, D>
where
    D: DerefMut + From<<D as core::ops::Deref>::Target>,
    D::Target: Element + Default + Sized,
{
    /// Create a view that declares the current number of handles.
    pub fn new(handles: &'a mut Vec<D>) -> Self {
        Self {
            count: Some(handles.len()),
            handles,
            pos: 0,
        }
    }

    /// Forget the declared count. Use this to read an array of any length.
    pub fn with_unknown_count(mut self) -> Self {
        self.count = None;
        self
    }
}

impl<D> SequenceView for DereferencingView<'_, D>
where
    D: DerefMut + From<<D as core::ops::Deref>::Target>,
    D::Target: Element + Default + Sized,
{
    type Item = D::Target;

    fn count(&self) -> Option<usize> {
        self.count
    }

    fn is_continuous(&self) -> bool {
        false
    }

    fn extract(&mut self, n: usize) -> Result<&[D::Target], StreamError> {
        if n != 1 {
            return Err(StreamError::InvalidArgument("non-continuous views extract one element at a time"));
        }
        let handle = self.handles.get(self.pos).ok_or(StreamError::NoMoreData)?;
        self.pos += 1;
        Ok(core::slice::from_ref(&**handle))
    }

    fn insert(&mut self, n: usize) -> Result<&mut [D::Target], StreamError> {
        if n != 1 {
            return Err(StreamError::InvalidArgument("non-continuous views insert one element at a time"));
        }
        let value: D::Target = Default::default();
        self.handles.push(D::from(value));
        let handle = self.handles.last_mut().ok_or(StreamError::NoMoreData)?;
        Ok(core::slice::from_mut(&mut **handle))
    }
}
