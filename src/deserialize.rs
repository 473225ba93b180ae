//! Serde deserializer that reads through the stream contract.

use crate::container::{GrowableCharView, VecView};
use crate::traits::{Stream, StreamExt};
use crate::type_tag::{TagFlags, TypeTag};
use crate::StreamError;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str;
use serde::de::*;

/// Deserialize a given object from the given [Stream].
///
/// The stream must hold data written by [serialize](crate::serialize) with the same
/// [Config](crate::Config). Values are always owned, nothing is borrowed from the stream.
///
/// ```
/// # extern crate serde_derive;
/// # use serde_derive::Deserialize;
/// use binstream_core::{deserialize, SliceReader};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// pub struct SomeStruct {
///     a: u8,
///     b: u16,
/// }
/// let buffer: [u8; 3] = [
///     3,    // a
///     6, 0, // b
/// ];
/// let val: SomeStruct = deserialize(&mut SliceReader::new(&buffer)).unwrap();
/// assert_eq!(val, SomeStruct { a: 3, b: 6 });
/// ```
pub fn deserialize<T, S>(stream: &mut S) -> Result<T, DeserializeError>
where
    T: DeserializeOwned,
    S: Stream + ?Sized,
{
    let mut deserializer = Deserializer { stream };
    T::deserialize(&mut deserializer)
}

/// Errors that can occur while deserializing
#[derive(Debug, PartialEq)]
pub enum DeserializeError {
    /// Failed to read from the provided [Stream]. The inner error is given.
    Stream(StreamError),

    /// Invalid bool value. Only `0` and `1` are valid values.
    InvalidBoolValue(u8),

    /// The value is not a valid unicode scalar value.
    InvalidCharEncoding(u32),

    /// UTF8 error while trying to deserialize a `String`
    Utf8(str::Utf8Error),

    /// Invalid value for the `Option` part of `Option<T>`. Only `0` and `1` are accepted values.
    InvalidOptionValue(u8),

    /// The type stopped reading before the end of a sequence or map.
    TrailingElements,

    /// The stream format is not self-describing.
    DeserializeAnyNotSupported,

    /// A custom error raised by a `Deserialize` implementation.
    Custom(String),
}

impl From<StreamError> for DeserializeError {
    fn from(err: StreamError) -> Self {
        DeserializeError::Stream(err)
    }
}

impl From<str::Utf8Error> for DeserializeError {
    fn from(err: str::Utf8Error) -> Self {
        DeserializeError::Utf8(err)
    }
}

impl core::fmt::Display for DeserializeError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            DeserializeError::Stream(e) => write!(fmt, "Read error: {}", e),
            DeserializeError::InvalidBoolValue(v) => {
                write!(fmt, "Unknown bool value, got {}, expected 0 or 1", v)
            }
            DeserializeError::InvalidCharEncoding(v) => {
                write!(fmt, "Invalid character value {:#x}", v)
            }
            DeserializeError::Utf8(e) => write!(
                fmt,
                "Could not deserialize the value as a valid UTF8 string: {}",
                e
            ),
            DeserializeError::InvalidOptionValue(e) => {
                write!(fmt, "Invalid Option value, got {}, expected 0 or 1", e)
            }
            DeserializeError::TrailingElements => write!(fmt, "Sequence has unread elements"),
            DeserializeError::DeserializeAnyNotSupported => {
                write!(fmt, "Deserialize any not supported")
            }
            DeserializeError::Custom(msg) => write!(fmt, "{}", msg),
        }
    }
}

impl StdError for DeserializeError {}

impl serde::de::Error for DeserializeError {
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        DeserializeError::Custom(cause.to_string())
    }
}

/// A deserializer that can be used to deserialize any `serde::Deserialize` type from a given
/// [Stream].
pub struct Deserializer<'s, S: ?Sized> {
    stream: &'s mut S,
}

const COMPOUND: TypeTag = TypeTag::compound();

impl<'s, S: Stream + ?Sized> Deserializer<'s, S> {
    /// Deserialize from `stream`.
    pub fn new(stream: &'s mut S) -> Self {
        Self { stream }
    }

    fn read_byte(&mut self) -> Result<u8, DeserializeError> {
        Ok(self.stream.read::<u8>()?)
    }

    fn read_text(&mut self) -> Result<String, DeserializeError> {
        let mut buf = Vec::new();
        let mut view = GrowableCharView::new(&mut buf);
        self.stream.read_array(&mut view)?;
        Ok(String::from(str::from_utf8(view.as_bytes())?))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, DeserializeError> {
        let mut bytes = Vec::new();
        let mut view = VecView::new(&mut bytes)
            .with_unknown_count()
            .with_tag(TypeTag::BINARY);
        self.stream.read_array(&mut view)?;
        Ok(bytes)
    }

    fn struct_open(&mut self, name: Option<&str>) -> Result<(), DeserializeError> {
        Ok(self
            .stream
            .read_struct_open(name, COMPOUND.with(TagFlags::STRUCT_BEGIN))?)
    }

    fn struct_close(&mut self) -> Result<(), DeserializeError> {
        Ok(self
            .stream
            .read_struct_close(COMPOUND.with(TagFlags::STRUCT_END))?)
    }

    /// Read the fields of a struct or tuple bracketed by the struct protocol.
    fn fields<'de, V: Visitor<'de>>(
        &mut self,
        name: Option<&str>,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, DeserializeError> {
        self.struct_open(name)?;
        let value = visitor.visit_seq(Fields { de: self, len })?;
        self.struct_close()?;
        Ok(value)
    }

    fn array_open(&mut self) -> Result<Elements<'_, 's, S>, DeserializeError> {
        let remaining = self.stream.read_array_open(COMPOUND.array_begin())?;
        Ok(Elements {
            de: self,
            remaining,
            index: 0,
            done: false,
        })
    }
}

macro_rules! impl_deserialize_primitive {
    ($($name:ident = $visit:ident($ty:ty);)*) => {
        $(
            #[inline]
            fn $name<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit(self.stream.read::<$ty>()?)
            }
        )*
    };
}

impl<'de, 'a, 's, S: Stream + ?Sized> serde::Deserializer<'de> for &'a mut Deserializer<'s, S> {
    type Error = DeserializeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(DeserializeError::DeserializeAnyNotSupported)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.read_byte()? {
            1 => visitor.visit_bool(true),
            0 => visitor.visit_bool(false),
            value => Err(DeserializeError::InvalidBoolValue(value)),
        }
    }

    impl_deserialize_primitive! {
        deserialize_i8 = visit_i8(i8);
        deserialize_i16 = visit_i16(i16);
        deserialize_i32 = visit_i32(i32);
        deserialize_i64 = visit_i64(i64);
        deserialize_u8 = visit_u8(u8);
        deserialize_u16 = visit_u16(u16);
        deserialize_u32 = visit_u32(u32);
        deserialize_u64 = visit_u64(u64);
        deserialize_f32 = visit_f32(f32);
        deserialize_f64 = visit_f64(f64);
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let value = self.stream.read::<u32>()?;
        let c = core::char::from_u32(value).ok_or(DeserializeError::InvalidCharEncoding(value))?;
        visitor.visit_char(c)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.read_text()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_string(self.read_text()?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_byte_buf(self.read_bytes()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_byte_buf(self.read_bytes()?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.read_byte()? {
            0 => visitor.visit_none(),
            1 => visitor.visit_some(self),
            value => Err(DeserializeError::InvalidOptionValue(value)),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let mut elements = self.array_open()?;
        let value = visitor.visit_seq(&mut elements)?;
        elements.close()?;
        Ok(value)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.fields(None, len, visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.fields(Some(name), len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let mut elements = self.array_open()?;
        let value = visitor.visit_map(&mut elements)?;
        elements.close()?;
        Ok(value)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.fields(Some(name), fields.len(), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_enum(Variant {
            de: self,
            variants,
            name: None,
        })
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u32(self.stream.read::<u32>()?)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(DeserializeError::DeserializeAnyNotSupported)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Fields of a struct or tuple, their count is fixed by the type.
struct Fields<'a, 's, S: ?Sized> {
    de: &'a mut Deserializer<'s, S>,
    len: usize,
}

impl<'de, 'a, 's, S: Stream + ?Sized> SeqAccess<'de> for Fields<'a, 's, S> {
    type Error = DeserializeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        if self.len == 0 {
            return Ok(None);
        }
        self.len -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len)
    }
}

/// Elements of an array: either a declared count or separator-terminated.
struct Elements<'a, 's, S: ?Sized> {
    de: &'a mut Deserializer<'s, S>,
    remaining: Option<usize>,
    index: usize,
    done: bool,
}

impl<'a, 's, S: Stream + ?Sized> Elements<'a, 's, S> {
    fn next(&mut self) -> Result<bool, DeserializeError> {
        if self.done {
            return Ok(false);
        }
        let more = match &mut self.remaining {
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
            None => {
                let tag = COMPOUND
                    .array_element(self.index)
                    .with(TagFlags::NEEDS_SEPARATORS);
                self.de.stream.read_array_separator(tag)?
            }
        };
        if more {
            self.index += 1;
        } else {
            self.done = true;
        }
        Ok(more)
    }

    fn close(self) -> Result<(), DeserializeError> {
        if !self.done && self.remaining != Some(0) {
            return Err(DeserializeError::TrailingElements);
        }
        self.de.stream.read_array_close(COMPOUND.array_end())?;
        log::trace!("deserialized {} elements", self.index);
        Ok(())
    }
}

impl<'de, 'a, 'b, 's, S: Stream + ?Sized> SeqAccess<'de> for &'b mut Elements<'a, 's, S> {
    type Error = DeserializeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        if !self.next()? {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

impl<'de, 'a, 'b, 's, S: Stream + ?Sized> MapAccess<'de> for &'b mut Elements<'a, 's, S> {
    type Error = DeserializeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        if !self.next()? {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

/// An enum value: the variant index followed by its payload.
struct Variant<'a, 's, S: ?Sized> {
    de: &'a mut Deserializer<'s, S>,
    variants: &'static [&'static str],
    name: Option<&'static str>,
}

impl<'de, 'a, 's, S: Stream + ?Sized> EnumAccess<'de> for Variant<'a, 's, S> {
    type Error = DeserializeError;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(
        mut self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let idx = self.de.stream.read::<u32>()?;
        self.name = self.variants.get(idx as usize).copied();
        let value: Result<_, DeserializeError> = seed.deserialize(idx.into_deserializer());
        Ok((value?, self))
    }
}

impl<'de, 'a, 's, S: Stream + ?Sized> VariantAccess<'de> for Variant<'a, 's, S> {
    type Error = DeserializeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        self.de.fields(self.name, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.de.fields(self.name, fields.len(), visitor)
    }
}
