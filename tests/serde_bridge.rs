#[macro_use]
extern crate serde_derive;

use binstream_core::*;
use serde::ser::{SerializeSeq, Serializer};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct TestStruct {
    a: u8,
    b: u16,
    c: u32,
    d: u64,

    opt: Option<u8>,
    buff: [u8; 3],
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct Meters(u32);

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub enum Shape {
    Empty,
    Circle(f32),
    Rect(u16, u16),
    Named { id: u32, label: String },
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct Everything {
    flag: bool,
    signed: i64,
    small: i8,
    letter: char,
    name: String,
    values: Vec<u16>,
    pair: (i16, f64),
    shapes: Vec<Shape>,
    table: BTreeMap<String, u32>,
    distance: Meters,
    nothing: Option<String>,
    unit: (),
}

/// Serializes as a sequence without announcing its length.
struct Unsized<'a>(&'a [u16]);

impl serde::Serialize for Unsized<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for item in self.0 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// Announces `self.0` elements but serializes the items of `self.1`.
struct Miscounted(usize, &'static [u8]);

impl serde::Serialize for Miscounted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0))?;
        for item in self.1 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

fn round_trip<T>(value: &T) -> T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let mut stream = BufferStream::new();
    serialize(value, &mut stream).unwrap();
    assert_eq!(
        serialized_size(value, Config::new()).unwrap(),
        stream.written_buffer().len() as u64
    );
    let result = deserialize(&mut stream).unwrap();
    stream.acknowledge(false).unwrap();
    result
}

fn everything() -> Everything {
    let mut table = BTreeMap::new();
    table.insert("one".to_string(), 1);
    table.insert("two".to_string(), 2);
    Everything {
        flag: true,
        signed: -1234567890123,
        small: -3,
        letter: 'é',
        name: "tesT".to_string(),
        values: vec![1, 2, 3],
        pair: (-7, 0.5),
        shapes: vec![
            Shape::Empty,
            Shape::Circle(1.5),
            Shape::Rect(3, 4),
            Shape::Named {
                id: 9,
                label: "box".to_string(),
            },
        ],
        table,
        distance: Meters(42),
        nothing: None,
        unit: (),
    }
}

#[test]
fn simple_struct() {
    let s = TestStruct {
        a: 1,
        b: 2,
        c: 3,
        d: 4,
        opt: Some(6),
        buff: [7, 8, 9],
    };

    let mut stream = BufferStream::new();
    serialize(&s, &mut stream).unwrap();

    // type         size
    // u8           1
    // u16          2
    // u32          4
    // u64          8
    // Option<u8>   1 + 1
    // [u8; 3]      3 (fixed array so no length)
    assert_eq!(
        stream.written_buffer(),
        &[1, 2, 0, 3, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 1, 6, 7, 8, 9]
    );

    let deserialized: TestStruct = deserialize(&mut stream).unwrap();
    assert_eq!(s, deserialized);
}

#[test]
fn big_endian() {
    let s = (1u16, 2u32, "tesT");
    let mut stream = BufferStream::with_config(Config::new().with_big_endian());
    serialize(&s, &mut stream).unwrap();

    // type         size
    // u16          2
    // u32          4
    // &str         8 + 4
    assert_eq!(
        stream.written_buffer(),
        &[0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 4, b't', b'e', b's', b'T']
    );
    let deserialized: (u16, u32, String) = deserialize(&mut stream).unwrap();
    assert_eq!(deserialized, (1, 2, "tesT".to_string()));
}

#[test]
fn enum_variants() {
    let mut stream = BufferStream::new();
    serialize(&Shape::Rect(3, 4), &mut stream).unwrap();
    assert_eq!(stream.written_buffer(), &[2, 0, 0, 0, 3, 0, 4, 0]);

    for shape in everything().shapes {
        assert_eq!(round_trip(&shape), shape);
    }
}

#[test]
fn everything_round_trips() {
    let value = everything();
    assert_eq!(round_trip(&value), value);
}

#[test]
fn unsized_sequences_use_separators() {
    let mut stream = BufferStream::new();
    serialize(&Unsized(&[5, 6]), &mut stream).unwrap();
    assert_eq!(
        stream.written_buffer(),
        &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 1, 5, 0, 1, 6, 0, 0]
    );

    let values: Vec<u16> = deserialize(&mut stream).unwrap();
    assert_eq!(values, vec![5, 6]);
}

#[test]
fn through_filters() {
    let value = everything();
    let mut stream = SixBitStream::new(Base64Stream::new(BufferStream::new()));
    serialize(&value, &mut stream).unwrap();
    stream.flush().unwrap();

    let encoded = stream.into_inner().into_inner().into_inner();
    let mut stream = SixBitStream::new(Base64Stream::new(BufferStream::from_bytes(encoded)));
    let deserialized: Everything = deserialize(&mut stream).unwrap();
    assert_eq!(deserialized, value);
    stream.acknowledge(false).unwrap();
}

#[test]
fn into_fixed_slice() {
    let mut buffer = [0u8; 32];
    let mut writer = SliceWriter::new(&mut buffer);
    serialize(&Meters(7), &mut writer).unwrap();
    assert_eq!(writer.written_len(), 4);

    let mut small = [0u8; 2];
    let mut writer = SliceWriter::new(&mut small);
    assert_eq!(
        serialize(&Meters(7), &mut writer),
        Err(SerializeError::Stream(StreamError::NoMoreData))
    );

    let value: Meters = deserialize(&mut SliceReader::new(&buffer[..4])).unwrap();
    assert_eq!(value, Meters(7));
}

#[test]
fn size_limit() {
    let value = everything();
    let size = serialized_size(&value, Config::new()).unwrap();
    assert_eq!(
        serialized_size(&value, Config::new().with_limit(size)).unwrap(),
        size
    );
    assert_eq!(
        serialized_size(&value, Config::new().with_limit(size - 1)),
        Err(SerializeError::Stream(StreamError::InvalidArgument(
            "size limit reached"
        )))
    );
}

#[test]
fn invalid_values() {
    let err = deserialize::<bool, _>(&mut SliceReader::new(&[2])).unwrap_err();
    assert_eq!(err, DeserializeError::InvalidBoolValue(2));

    let err = deserialize::<Option<u8>, _>(&mut SliceReader::new(&[3, 0])).unwrap_err();
    assert_eq!(err, DeserializeError::InvalidOptionValue(3));

    let err = deserialize::<char, _>(&mut SliceReader::new(&[0x00, 0xd8, 0, 0])).unwrap_err();
    assert_eq!(err, DeserializeError::InvalidCharEncoding(0xd800));

    let mut bytes = vec![2, 0, 0, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(&[0xc3, 0x28]);
    let err = deserialize::<String, _>(&mut SliceReader::new(&bytes)).unwrap_err();
    assert!(matches!(err, DeserializeError::Utf8(_)));

    let err = deserialize::<u32, _>(&mut SliceReader::new(&[1, 2])).unwrap_err();
    assert_eq!(err, DeserializeError::Stream(StreamError::NoMoreData));
}

#[test]
fn not_self_describing() {
    let err = deserialize::<serde::de::IgnoredAny, _>(&mut SliceReader::new(&[0])).unwrap_err();
    assert_eq!(err, DeserializeError::DeserializeAnyNotSupported);
}

#[test]
fn sequences_match_their_declared_length() {
    let mismatch = Err(SerializeError::Stream(StreamError::InvalidArgument(
        "array length mismatch",
    )));
    assert_eq!(serialize(&Miscounted(3, &[1, 2]), &mut BufferStream::new()), mismatch);
    assert_eq!(serialize(&Miscounted(1, &[1, 2]), &mut BufferStream::new()), mismatch);

    let mut stream = BufferStream::new();
    serialize(&Miscounted(2, &[1, 2]), &mut stream).unwrap();
    assert_eq!(stream.written_buffer(), &[2, 0, 0, 0, 0, 0, 0, 0, 1, 2]);
}
