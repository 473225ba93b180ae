use super::stream::read_exact;
use super::{Attributes, Direction, Element, Stream};
use crate::container::{FixedArrayView, GrowableCharView, SequenceView, VecView};
use crate::type_tag::{TagFlags, TypeTag};
use crate::StreamError;
use alloc::string::String;
use alloc::vec::Vec;

/// Most elements requested from a view at once while reading an array of known count.
const CHUNK: usize = 4096;

/// Typed helpers available on every [Stream].
///
/// The array algorithms live here: they drive a [SequenceView] and call back into the stream's
/// array hooks, so a concrete stream only has to decide how headers and separators look.
pub trait StreamExt: Stream {
    /// Write all of `data`. Fails with [StreamError::NoMoreData] if the medium fills up.
    fn write_all_raw(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let mut data = data;
        self.write_raw(&mut data)
    }

    /// Fill all of `buf`, repeating the read while the stream asks for a retry.
    fn read_exact_raw(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        read_exact(self, buf)
    }

    /// Write a single value.
    fn write<T: Element + ?Sized>(&mut self, value: &T) -> Result<(), StreamError> {
        value.write_to(self)
    }

    /// Read a single value.
    fn read<T: Element + Default>(&mut self) -> Result<T, StreamError> {
        let mut value = T::default();
        value.read_from(self)?;
        Ok(value)
    }

    /// Write the elements of `view` as an array and return how many were written.
    ///
    /// When the view knows its count and its storage is contiguous and primitive, the elements are
    /// written with a single raw write. Otherwise they go one by one, and if the count is unknown
    /// each one is preceded by a separator and the array is terminated by an end separator.
    fn write_array<V>(&mut self, view: &mut V) -> Result<usize, StreamError>
    where
        V: SequenceView + ?Sized,
    {
        let tag = view.element_tag();
        let separators = view.needs_separators();
        let count = if separators { None } else { view.count() };
        self.write_array_open(tag.array_begin(), count)?;

        let written = match count {
            Some(n) if view.is_continuous() && is_dumpable(self, tag, Direction::Out) => {
                let items = view.extract(n)?;
                <V::Item as Element>::write_slice(items, self)?;
                n
            }
            _ => {
                let mut written = 0;
                loop {
                    if count == Some(written) {
                        break;
                    }
                    let item = match view.extract(1) {
                        Ok(items) => &items[0],
                        Err(StreamError::NoMoreData) if count.is_none() => break,
                        Err(e) => return Err(e),
                    };
                    let mut element = tag.array_element(written);
                    if separators {
                        element = element.with(TagFlags::NEEDS_SEPARATORS);
                        self.write_array_separator(element, false)?;
                    }
                    item.write_element(self, element.flags())?;
                    written += 1;
                }
                if separators {
                    self.write_array_separator(tag.array_end().with(TagFlags::NEEDS_SEPARATORS), true)?;
                }
                written
            }
        };

        self.write_array_close(tag.array_end())?;
        log::trace!("wrote array of {} elements ({:?})", written, tag.kind());
        Ok(written)
    }

    /// Read an array into `view` and return how many elements were read.
    ///
    /// A view that declares a count only accepts an array of exactly that count. The byte size of
    /// the array is checked against the stream's [Limit](crate::config::Limit) and, when the stream
    /// knows it, against the input still available before any storage is requested from the view.
    /// Storage is then requested in bounded chunks, so it only grows as fast as input arrives.
    fn read_array<V>(&mut self, view: &mut V) -> Result<usize, StreamError>
    where
        V: SequenceView + ?Sized,
    {
        let tag = view.element_tag();
        let declared = self.read_array_open(tag.array_begin())?;
        if let (Some(expected), Some(found)) = (view.count(), declared) {
            if expected != found {
                return Err(StreamError::InvalidArgument("array length mismatch"));
            }
        }

        let limit = self.config().limit;
        let width = tag.size().max(1) as u64;
        let read = match declared {
            Some(n) => {
                let bytes = (n as u64).saturating_mul(width);
                limit.check(bytes)?;
                let dumpable = is_dumpable(self, tag, Direction::In);
                if dumpable {
                    if let Ok(available) = self.get_size(Direction::In) {
                        if bytes > available {
                            log::debug!("array of {} elements exceeds the {} bytes left", n, available);
                            return Err(StreamError::NoMoreData);
                        }
                    }
                }

                let mut read = 0;
                while read < n {
                    if dumpable && view.is_continuous() {
                        let chunk = (n - read).min(CHUNK);
                        let items = view.insert(chunk)?;
                        <V::Item as Element>::read_slice(items, self)?;
                        read += chunk;
                    } else {
                        let items = view.insert(1)?;
                        items[0].read_element(self, tag.array_element(read).flags())?;
                        read += 1;
                    }
                }
                n
            }
            None => {
                let mut read = 0;
                loop {
                    let element = tag.array_element(read).with(TagFlags::NEEDS_SEPARATORS);
                    if !self.read_array_separator(element)? {
                        break;
                    }
                    limit.check((read as u64 + 1).saturating_mul(width))?;
                    let items = view.insert(1)?;
                    items[0].read_element(self, element.flags())?;
                    read += 1;
                }
                read
            }
        };

        self.read_array_close(tag.array_end())?;
        log::trace!("read array of {} elements ({:?})", read, tag.kind());
        Ok(read)
    }

    /// Write `value` as an array of text bytes.
    fn write_str(&mut self, value: &str) -> Result<(), StreamError> {
        let mut view = FixedArrayView::new(value.as_bytes()).with_tag(TypeTag::CHAR);
        self.write_array(&mut view).map(|_| ())
    }

    /// Read a string written by [StreamExt::write_str].
    fn read_string(&mut self) -> Result<String, StreamError> {
        let mut buf = Vec::new();
        let mut view = GrowableCharView::new(&mut buf);
        self.read_array(&mut view)?;
        core::str::from_utf8(view.as_bytes())
            .map(String::from)
            .map_err(|_| StreamError::Format("invalid utf-8 in string"))
    }

    /// Write `items` as an array with a known count.
    fn write_items<T: Element>(&mut self, items: &[T]) -> Result<(), StreamError> {
        self.write_array(&mut FixedArrayView::new(items)).map(|_| ())
    }

    /// Read an array of any length into a new `Vec`.
    fn read_vec<T: Element + Default>(&mut self) -> Result<Vec<T>, StreamError> {
        let mut items = Vec::new();
        self.read_array(&mut VecView::new(&mut items).with_unknown_count())?;
        Ok(items)
    }
}

impl<S: Stream + ?Sized> StreamExt for S {}

/// Whether elements of `tag` can be transferred as one block of raw bytes on this stream.
fn is_dumpable<S: Stream + ?Sized>(stream: &S, tag: TypeTag, direction: Direction) -> bool {
    tag.is_primitive() && !stream.attributes(direction).contains(Attributes::FORMATTING)
}
