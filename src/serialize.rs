//! Serde serializer that writes through the stream contract.

use crate::config::Config;
use crate::container::FixedArrayView;
use crate::size_checker::SizeChecker;
use crate::traits::{Stream, StreamExt};
use crate::type_tag::{TagFlags, TypeTag};
use crate::StreamError;
use alloc::string::{String, ToString};
use serde::ser::*;

/// Serialize a given `T` type into a given [Stream].
///
/// `T` can be any value that derives `serde::Serialize`. Structs and tuples are bracketed with the
/// stream's struct protocol, sequences and maps use its array protocol. A sequence that does not
/// know its length up front is written in separator mode.
///
/// ```
/// # extern crate serde_derive;
/// # use serde_derive::Serialize;
/// use binstream_core::{serialize, BufferStream};
///
/// #[derive(Serialize)]
/// pub struct SomeStruct {
///     a: u8,
///     b: u16,
/// }
///
/// let mut stream = BufferStream::new();
/// serialize(&SomeStruct { a: 3, b: 6 }, &mut stream).unwrap();
/// assert_eq!(stream.written_buffer(), &[3, 6, 0]);
/// ```
pub fn serialize<T, S>(value: &T, stream: &mut S) -> Result<(), SerializeError>
where
    T: Serialize + ?Sized,
    S: Stream + ?Sized,
{
    let mut serializer = Serializer { stream };
    value.serialize(&mut serializer)
}

/// Return the number of bytes that serializing `value` with `config` would produce, without
/// producing them.
pub fn serialized_size<T: Serialize + ?Sized>(value: &T, config: Config) -> Result<u64, SerializeError> {
    let mut checker = SizeChecker::new(config);
    serialize(value, &mut checker)?;
    Ok(checker.total())
}

/// Any error that can be thrown while serializing a type
#[derive(Debug, PartialEq)]
pub enum SerializeError {
    /// Generic write error. See the inner [StreamError] for more info
    Stream(StreamError),

    /// A custom error raised by a `Serialize` implementation.
    Custom(String),
}

impl From<StreamError> for SerializeError {
    fn from(err: StreamError) -> Self {
        SerializeError::Stream(err)
    }
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            SerializeError::Stream(e) => write!(fmt, "Write error: {}", e),
            SerializeError::Custom(msg) => write!(fmt, "{}", msg),
        }
    }
}

impl StdError for SerializeError {}

impl serde::ser::Error for SerializeError {
    fn custom<T: core::fmt::Display>(cause: T) -> Self {
        SerializeError::Custom(cause.to_string())
    }
}

/// A serializer that can serialize any value that implements `serde::Serialize` into a given
/// [Stream].
pub struct Serializer<'s, S: ?Sized> {
    stream: &'s mut S,
}

impl<'s, S: Stream + ?Sized> Serializer<'s, S> {
    /// Serialize into `stream`.
    pub fn new(stream: &'s mut S) -> Self {
        Self { stream }
    }

    fn write_variant(&mut self, variant_index: u32) -> Result<(), SerializeError> {
        self.stream.write(&variant_index).map_err(SerializeError::Stream)
    }
}

macro_rules! impl_serialize_primitive {
    ($($name:ident($ty:ty);)*) => {
        $(
            fn $name(self, v: $ty) -> Result<Self::Ok, Self::Error> {
                self.stream.write(&v).map_err(SerializeError::Stream)
            }
        )*
    };
}

impl<'a, 's, S: Stream + ?Sized> serde::Serializer for &'a mut Serializer<'s, S> {
    type Ok = ();
    type Error = SerializeError;
    type SerializeSeq = Compound<'a, 's, S>;
    type SerializeTuple = Compound<'a, 's, S>;
    type SerializeTupleStruct = Compound<'a, 's, S>;
    type SerializeTupleVariant = Compound<'a, 's, S>;
    type SerializeMap = Compound<'a, 's, S>;
    type SerializeStruct = Compound<'a, 's, S>;
    type SerializeStructVariant = Compound<'a, 's, S>;

    impl_serialize_primitive! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_char(char);
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.stream.write_str(v).map_err(SerializeError::Stream)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        let mut view = FixedArrayView::new(v).with_tag(TypeTag::BINARY);
        self.stream.write_array(&mut view)?;
        Ok(())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.stream.write(&0u8).map_err(SerializeError::Stream)
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.stream.write(&1u8)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.write_variant(variant_index)
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.write_variant(variant_index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Compound::array(self, len)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Compound::structure(self, None)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Compound::structure(self, Some(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.write_variant(variant_index)?;
        Compound::structure(self, Some(variant))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Compound::array(self, len)
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Compound::structure(self, Some(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.write_variant(variant_index)?;
        Compound::structure(self, Some(variant))
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

enum Bracket {
    Struct,
    /// `declared` is `None` in separator mode.
    Array { declared: Option<usize>, index: usize },
}

/// Internal struct needed for serialization: an open struct or array.
pub struct Compound<'a, 's, S: ?Sized> {
    ser: &'a mut Serializer<'s, S>,
    bracket: Bracket,
}

impl<'a, 's, S: Stream + ?Sized> Compound<'a, 's, S> {
    const TAG: TypeTag = TypeTag::compound();

    fn structure(ser: &'a mut Serializer<'s, S>, name: Option<&str>) -> Result<Self, SerializeError> {
        ser.stream.write_struct_open(name, Self::TAG.with(TagFlags::STRUCT_BEGIN))?;
        Ok(Compound {
            ser,
            bracket: Bracket::Struct,
        })
    }

    fn array(ser: &'a mut Serializer<'s, S>, len: Option<usize>) -> Result<Self, SerializeError> {
        ser.stream.write_array_open(Self::TAG.array_begin(), len)?;
        Ok(Compound {
            ser,
            bracket: Bracket::Array {
                declared: len,
                index: 0,
            },
        })
    }

    /// Announce the next array element in separator mode, refuse elements past the declared count.
    fn begin_element(&mut self) -> Result<(), SerializeError> {
        match self.bracket {
            Bracket::Array { declared: None, index } => {
                let tag = Self::TAG.array_element(index).with(TagFlags::NEEDS_SEPARATORS);
                self.ser.stream.write_array_separator(tag, false)?;
            }
            Bracket::Array { declared: Some(n), index } if index == n => {
                return Err(StreamError::InvalidArgument("array length mismatch").into());
            }
            _ => {}
        }
        Ok(())
    }

    fn end_element(&mut self) {
        if let Bracket::Array { index, .. } = &mut self.bracket {
            *index += 1;
        }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        self.begin_element()?;
        value.serialize(&mut *self.ser)?;
        self.end_element();
        Ok(())
    }

    fn finish(self) -> Result<(), SerializeError> {
        let stream = &mut *self.ser.stream;
        match self.bracket {
            Bracket::Struct => stream.write_struct_close(Self::TAG.with(TagFlags::STRUCT_END))?,
            Bracket::Array { declared, index } => {
                match declared {
                    None => {
                        let tag = Self::TAG.array_end().with(TagFlags::NEEDS_SEPARATORS);
                        stream.write_array_separator(tag, true)?;
                    }
                    Some(n) if n != index => {
                        return Err(StreamError::InvalidArgument("array length mismatch").into());
                    }
                    Some(_) => {}
                }
                stream.write_array_close(Self::TAG.array_end())?;
            }
        }
        Ok(())
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeSeq for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        self.element(value)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeTuple for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        self.element(value)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeTupleStruct for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        self.element(value)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeTupleVariant for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        self.element(value)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeMap for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_key<K: ?Sized>(&mut self, key: &K) -> Result<(), Self::Error>
    where
        K: serde::ser::Serialize,
    {
        self.begin_element()?;
        key.serialize(&mut *self.ser)
    }

    #[inline]
    fn serialize_value<V: ?Sized>(&mut self, value: &V) -> Result<(), Self::Error>
    where
        V: serde::ser::Serialize,
    {
        value.serialize(&mut *self.ser)?;
        self.end_element();
        Ok(())
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeStruct for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    #[inline]
    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: serde::ser::Serialize,
    {
        self.element(value)
    }

    #[inline]
    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl<'a, 's, S: Stream + ?Sized> SerializeStructVariant for Compound<'a, 's, S> {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.element(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}
