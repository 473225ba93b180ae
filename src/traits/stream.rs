use crate::config::Config;
use crate::type_tag::{TagFlags, TypeTag};
use crate::StreamError;
use bitflags::bitflags;
use core::convert::TryFrom;

/// Count value written in an array header when the number of elements is not known in advance.
pub const UNKNOWN_COUNT: u64 = u64::MAX;

/// Which half of a stream a query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The read half.
    In,
    /// The write half.
    Out,
}

bitflags! {
    /// Capabilities a stream advertises through [Stream::attributes].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attributes: u8 {
        /// Primitives are reformatted (e.g. as text) instead of dumped byte-for-byte.
        const FORMATTING = 0b0000_0001;
        /// Packets must be closed with `flush` and confirmed with `acknowledge`.
        const HANDSHAKING = 0b0000_0010;
        /// Only one direction is usable.
        const SIMPLEX = 0b0000_0100;
        /// Already written data can be reverted or patched.
        const REVERTABLE = 0b0000_1000;
        /// The stream can read up to a delimiter.
        const READ_UNTIL = 0b0001_0000;
    }
}

/// A medium that typed values, structs and arrays can be written to and read from.
///
/// Implementors only have to provide [Stream::write_raw] and [Stream::read_raw]. Every other
/// method has a binary default that is built on top of those two, which formatting or packet
/// oriented streams can override.
///
/// # Raw transfer contract
///
/// `write_raw` and `read_raw` take the caller's slice by mutable reference and advance it past the
/// bytes they transferred, so on return it holds exactly the bytes *not yet* transferred:
///
/// - `Ok(())`: everything was transferred, the slice is empty.
/// - `Err(StreamError::NoMoreData)`: the medium is exhausted, the slice holds what is outstanding.
/// - `Err(StreamError::Retry)`: read side only. A partial chunk was transferred and the call must be
///   repeated with the remaining slice.
/// - any other error is terminal for the current operation.
///
/// Streams are single-threaded and not reentrant. After an error, call [Stream::reset] before using
/// the stream again.
pub trait Stream {
    /// Write raw bytes to the medium. See the trait documentation for the contract.
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError>;

    /// Read raw bytes from the medium. See the trait documentation for the contract.
    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError>;

    /// The capabilities of the given half of this stream.
    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::empty()
    }

    /// The options primitives are encoded with.
    fn config(&self) -> Config {
        Config::new()
    }

    /// Whether the underlying medium is usable.
    fn is_open(&self) -> bool {
        true
    }

    /// Write one primitive. `bytes` holds the value encoded in [Stream::config]'s byte order.
    ///
    /// Tags without a size are not written by the default implementation.
    fn write_primitive(&mut self, tag: TypeTag, bytes: &[u8]) -> Result<(), StreamError> {
        if tag.is_no_size() {
            return Ok(());
        }
        let mut data = bytes;
        self.write_raw(&mut data)
    }

    /// Read one primitive into `bytes`, looping over [StreamError::Retry].
    ///
    /// Tags without a size are a no-op for the default implementation.
    fn read_primitive(&mut self, tag: TypeTag, bytes: &mut [u8]) -> Result<(), StreamError> {
        if tag.is_no_size() {
            return Ok(());
        }
        read_exact(self, bytes)
    }

    /// Open an array of elements described by `tag`, declaring `count` elements or, with `None`,
    /// switching to separator mode.
    ///
    /// The default writes the count as a `u64`, [UNKNOWN_COUNT] standing for `None`.
    fn write_array_open(&mut self, _tag: TypeTag, count: Option<usize>) -> Result<(), StreamError> {
        let count = count.map_or(UNKNOWN_COUNT, |n| n as u64);
        let mut buf = [0u8; 8];
        self.config().endian.write_u64(&mut buf, count);
        self.write_primitive(TypeTag::U64.with(TagFlags::ARRAY_BEGIN), &buf)
    }

    /// Close an array. Nothing is written by default.
    fn write_array_close(&mut self, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// Read the header written by [Stream::write_array_open].
    fn read_array_open(&mut self, _tag: TypeTag) -> Result<Option<usize>, StreamError> {
        let mut buf = [0u8; 8];
        self.read_primitive(TypeTag::U64.with(TagFlags::ARRAY_BEGIN), &mut buf)?;
        match self.config().endian.read_u64(&buf) {
            UNKNOWN_COUNT => Ok(None),
            n => usize::try_from(n)
                .map(Some)
                .map_err(|_| StreamError::InvalidArgument("array count does not fit in usize")),
        }
    }

    /// Read the end of an array. Nothing is read by default.
    fn read_array_close(&mut self, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// In separator mode, announce that another element follows (`end == false`) or that the array
    /// is finished (`end == true`). The default writes a single byte, `1` or `0`.
    fn write_array_separator(&mut self, _tag: TypeTag, end: bool) -> Result<(), StreamError> {
        let marker = [if end { 0 } else { 1 }];
        let mut data = &marker[..];
        self.write_raw(&mut data)
    }

    /// In separator mode, check whether another element follows.
    fn read_array_separator(&mut self, _tag: TypeTag) -> Result<bool, StreamError> {
        let mut marker = [0u8; 1];
        read_exact(self, &mut marker)?;
        match marker[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(StreamError::Format("invalid array separator")),
        }
    }

    /// Open a struct. `name` is `None` for nameless (inlined) structs. Binary streams write nothing.
    fn write_struct_open(&mut self, _name: Option<&str>, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// Close a struct.
    fn write_struct_close(&mut self, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// Read the opening of a struct.
    fn read_struct_open(&mut self, _name: Option<&str>, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// Read the closing of a struct.
    fn read_struct_close(&mut self, _tag: TypeTag) -> Result<(), StreamError> {
        Ok(())
    }

    /// Finalize and transmit buffered output, closing the current packet on handshaking mediums.
    fn flush(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    /// Confirm that the current input packet has been consumed completely.
    ///
    /// Fails with `StreamError::Io` if unread data remains, unless `eat` is set, in which case the
    /// remainder is discarded.
    fn acknowledge(&mut self, _eat: bool) -> Result<(), StreamError> {
        Ok(())
    }

    /// Drop all buffered state. This is the only way back to a usable state after an error.
    fn reset(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    /// Move the position of the given half to the absolute offset `pos`.
    fn seek(&mut self, _direction: Direction, _pos: u64) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }

    /// The number of bytes available to read (`In`) or written so far (`Out`).
    fn get_size(&self, _direction: Direction) -> Result<u64, StreamError> {
        Err(StreamError::NotSupported)
    }

    /// Truncate or zero-extend the written data to `size` bytes.
    fn set_size(&mut self, _size: u64) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }

    /// Replace already written bytes starting at `pos`, e.g. to patch a placeholder length field.
    fn overwrite_raw(&mut self, _pos: u64, _data: &[u8]) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }
}

/// Read until `buf` is full, repeating the call while the stream asks for a retry.
pub(crate) fn read_exact<S: Stream + ?Sized>(stream: &mut S, buf: &mut [u8]) -> Result<(), StreamError> {
    let mut remaining = buf;
    loop {
        match stream.read_raw(&mut remaining) {
            Err(StreamError::Retry) => continue,
            result => return result,
        }
    }
}

/// Copies as much of `src` as fits to the front of `dst` and advances `dst` past it.
///
/// Returns the number of bytes copied.
pub fn fill_from(dst: &mut &mut [u8], src: &[u8]) -> usize {
    let n = dst.len().min(src.len());
    let taken = core::mem::take(dst);
    let (head, tail) = taken.split_at_mut(n);
    head.copy_from_slice(&src[..n]);
    *dst = tail;
    n
}

macro_rules! forward_stream {
    () => {
        fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
            (**self).write_raw(data)
        }
        fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
            (**self).read_raw(buf)
        }
        fn attributes(&self, direction: Direction) -> Attributes {
            (**self).attributes(direction)
        }
        fn config(&self) -> Config {
            (**self).config()
        }
        fn is_open(&self) -> bool {
            (**self).is_open()
        }
        fn write_primitive(&mut self, tag: TypeTag, bytes: &[u8]) -> Result<(), StreamError> {
            (**self).write_primitive(tag, bytes)
        }
        fn read_primitive(&mut self, tag: TypeTag, bytes: &mut [u8]) -> Result<(), StreamError> {
            (**self).read_primitive(tag, bytes)
        }
        fn write_array_open(&mut self, tag: TypeTag, count: Option<usize>) -> Result<(), StreamError> {
            (**self).write_array_open(tag, count)
        }
        fn write_array_close(&mut self, tag: TypeTag) -> Result<(), StreamError> {
            (**self).write_array_close(tag)
        }
        fn read_array_open(&mut self, tag: TypeTag) -> Result<Option<usize>, StreamError> {
            (**self).read_array_open(tag)
        }
        fn read_array_close(&mut self, tag: TypeTag) -> Result<(), StreamError> {
            (**self).read_array_close(tag)
        }
        fn write_array_separator(&mut self, tag: TypeTag, end: bool) -> Result<(), StreamError> {
            (**self).write_array_separator(tag, end)
        }
        fn read_array_separator(&mut self, tag: TypeTag) -> Result<bool, StreamError> {
            (**self).read_array_separator(tag)
        }
        fn write_struct_open(&mut self, name: Option<&str>, tag: TypeTag) -> Result<(), StreamError> {
            (**self).write_struct_open(name, tag)
        }
        fn write_struct_close(&mut self, tag: TypeTag) -> Result<(), StreamError> {
            (**self).write_struct_close(tag)
        }
        fn read_struct_open(&mut self, name: Option<&str>, tag: TypeTag) -> Result<(), StreamError> {
            (**self).read_struct_open(name, tag)
        }
        fn read_struct_close(&mut self, tag: TypeTag) -> Result<(), StreamError> {
            (**self).read_struct_close(tag)
        }
        fn flush(&mut self) -> Result<(), StreamError> {
            (**self).flush()
        }
        fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
            (**self).acknowledge(eat)
        }
        fn reset(&mut self) -> Result<(), StreamError> {
            (**self).reset()
        }
        fn seek(&mut self, direction: Direction, pos: u64) -> Result<(), StreamError> {
            (**self).seek(direction, pos)
        }
        fn get_size(&self, direction: Direction) -> Result<u64, StreamError> {
            (**self).get_size(direction)
        }
        fn set_size(&mut self, size: u64) -> Result<(), StreamError> {
            (**self).set_size(size)
        }
        fn overwrite_raw(&mut self, pos: u64, data: &[u8]) -> Result<(), StreamError> {
            (**self).overwrite_raw(pos, data)
        }
    };
}

impl<S: Stream + ?Sized> Stream for &'_ mut S {
    forward_stream!();
}

impl<S: Stream + ?Sized> Stream for alloc::boxed::Box<S> {
    forward_stream!();
}
