use super::{Stream, StreamExt};
use crate::type_tag::{TagFlags, TypeTag};
use crate::StreamError;
use alloc::vec;
use core::mem::size_of;

/// A value that knows how to write itself to, and read itself from, a [Stream].
///
/// This is implemented for the primitive types. A compound type implements it by bracketing its
/// fields with the struct protocol:
///
/// ```
/// use binstream_core::{Element, Stream, StreamError, StreamExt, TypeTag};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Element for Point {
///     const TAG: TypeTag = TypeTag::compound();
///
///     fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
///         stream.write_struct_open(Some("Point"), Self::TAG)?;
///         stream.write(&self.x)?;
///         stream.write(&self.y)?;
///         stream.write_struct_close(Self::TAG)
///     }
///
///     fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
///         stream.read_struct_open(Some("Point"), Self::TAG)?;
///         self.x = stream.read()?;
///         self.y = stream.read()?;
///         stream.read_struct_close(Self::TAG)
///     }
/// }
/// ```
pub trait Element {
    /// Describes the value. Primitives carry their byte width, compound types use
    /// [TypeTag::compound].
    const TAG: TypeTag;

    /// Write the value to `stream`.
    fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError>;

    /// Replace the value with one read from `stream`.
    fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError>;

    /// Write the value as one element of an array. `position` carries its
    /// [TagFlags::ARRAY_ELEMENT] and [TagFlags::FIRST_ELEMENT] flags, primitives pass them to the
    /// stream along with their tag.
    fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, _position: TagFlags) -> Result<(), StreamError> {
        self.write_to(stream)
    }

    /// Read the value as one element of an array, see [Element::write_element].
    fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, _position: TagFlags) -> Result<(), StreamError> {
        self.read_from(stream)
    }

    /// Write a contiguous run of values. Primitives override this to issue a single raw write.
    fn write_slice<S: Stream + ?Sized>(items: &[Self], stream: &mut S) -> Result<(), StreamError>
    where
        Self: Sized,
    {
        for item in items {
            item.write_to(stream)?;
        }
        Ok(())
    }

    /// Read a contiguous run of values. Primitives override this to issue a single raw read.
    fn read_slice<S: Stream + ?Sized>(items: &mut [Self], stream: &mut S) -> Result<(), StreamError>
    where
        Self: Sized,
    {
        for item in items {
            item.read_from(stream)?;
        }
        Ok(())
    }
}

macro_rules! impl_element_number {
    ($($ty:ty = $tag:ident, $write:ident / $read:ident;)*) => {
        $(
            impl Element for $ty {
                const TAG: TypeTag = TypeTag::$tag;

                fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
                    self.write_element(stream, TagFlags::empty())
                }

                fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
                    self.read_element(stream, TagFlags::empty())
                }

                fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
                    let mut buf = [0u8; size_of::<$ty>()];
                    stream.config().endian.$write(&mut buf, *self);
                    stream.write_primitive(Self::TAG.with(position), &buf)
                }

                fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
                    let mut buf = [0u8; size_of::<$ty>()];
                    stream.read_primitive(Self::TAG.with(position), &mut buf)?;
                    *self = stream.config().endian.$read(&buf);
                    Ok(())
                }

                fn write_slice<S: Stream + ?Sized>(items: &[Self], stream: &mut S) -> Result<(), StreamError> {
                    let endian = stream.config().endian;
                    let mut buf = vec![0u8; items.len() * size_of::<$ty>()];
                    for (chunk, item) in buf.chunks_exact_mut(size_of::<$ty>()).zip(items) {
                        endian.$write(chunk, *item);
                    }
                    stream.write_all_raw(&buf)
                }

                fn read_slice<S: Stream + ?Sized>(items: &mut [Self], stream: &mut S) -> Result<(), StreamError> {
                    let endian = stream.config().endian;
                    let mut buf = vec![0u8; items.len() * size_of::<$ty>()];
                    stream.read_exact_raw(&mut buf)?;
                    for (chunk, item) in buf.chunks_exact(size_of::<$ty>()).zip(items) {
                        *item = endian.$read(chunk);
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_element_number! {
    u16 = U16, write_u16 / read_u16;
    u32 = U32, write_u32 / read_u32;
    u64 = U64, write_u64 / read_u64;
    i16 = I16, write_i16 / read_i16;
    i32 = I32, write_i32 / read_i32;
    i64 = I64, write_i64 / read_i64;
    f32 = F32, write_f32 / read_f32;
    f64 = F64, write_f64 / read_f64;
}

impl Element for u8 {
    const TAG: TypeTag = TypeTag::U8;

    fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
        self.write_element(stream, TagFlags::empty())
    }

    fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
        self.read_element(stream, TagFlags::empty())
    }

    fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        stream.write_primitive(Self::TAG.with(position), &[*self])
    }

    fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        let mut buf = [0u8; 1];
        stream.read_primitive(Self::TAG.with(position), &mut buf)?;
        *self = buf[0];
        Ok(())
    }

    fn write_slice<S: Stream + ?Sized>(items: &[Self], stream: &mut S) -> Result<(), StreamError> {
        stream.write_all_raw(items)
    }

    fn read_slice<S: Stream + ?Sized>(items: &mut [Self], stream: &mut S) -> Result<(), StreamError> {
        stream.read_exact_raw(items)
    }
}

impl Element for i8 {
    const TAG: TypeTag = TypeTag::I8;

    fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
        self.write_element(stream, TagFlags::empty())
    }

    fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
        self.read_element(stream, TagFlags::empty())
    }

    fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        stream.write_primitive(Self::TAG.with(position), &[*self as u8])
    }

    fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        let mut buf = [0u8; 1];
        stream.read_primitive(Self::TAG.with(position), &mut buf)?;
        *self = buf[0] as i8;
        Ok(())
    }
}

impl Element for bool {
    const TAG: TypeTag = TypeTag::BOOL;

    fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
        self.write_element(stream, TagFlags::empty())
    }

    fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
        self.read_element(stream, TagFlags::empty())
    }

    fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        stream.write_primitive(Self::TAG.with(position), &[*self as u8])
    }

    fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        let mut buf = [0u8; 1];
        stream.read_primitive(Self::TAG.with(position), &mut buf)?;
        *self = match buf[0] {
            0 => false,
            1 => true,
            _ => return Err(StreamError::Format("invalid bool value")),
        };
        Ok(())
    }
}

impl Element for char {
    const TAG: TypeTag = TypeTag::CHAR32;

    fn write_to<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(), StreamError> {
        self.write_element(stream, TagFlags::empty())
    }

    fn read_from<S: Stream + ?Sized>(&mut self, stream: &mut S) -> Result<(), StreamError> {
        self.read_element(stream, TagFlags::empty())
    }

    fn write_element<S: Stream + ?Sized>(&self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        let mut buf = [0u8; 4];
        stream.config().endian.write_u32(&mut buf, *self as u32);
        stream.write_primitive(Self::TAG.with(position), &buf)
    }

    fn read_element<S: Stream + ?Sized>(&mut self, stream: &mut S, position: TagFlags) -> Result<(), StreamError> {
        let mut buf = [0u8; 4];
        stream.read_primitive(Self::TAG.with(position), &mut buf)?;
        *self = core::char::from_u32(stream.config().endian.read_u32(&buf))
            .ok_or(StreamError::Format("invalid char value"))?;
        Ok(())
    }
}
