use binstream_core::*;

#[test]
fn buffer_stream_primitives() {
    let mut stream = BufferStream::new();
    stream.write(&true).unwrap();
    stream.write(&-2i8).unwrap();
    stream.write(&0x1234u16).unwrap();
    stream.write(&-1.5f64).unwrap();
    stream.write(&'ü').unwrap();
    assert_eq!(stream.get_size(Direction::Out).unwrap(), 1 + 1 + 2 + 8 + 4);

    assert!(stream.read::<bool>().unwrap());
    assert_eq!(stream.read::<i8>().unwrap(), -2);
    assert_eq!(stream.read::<u16>().unwrap(), 0x1234);
    assert_eq!(stream.get_size(Direction::In).unwrap(), 12);
    assert_eq!(stream.read::<f64>().unwrap(), -1.5);
    assert_eq!(stream.read::<char>().unwrap(), 'ü');
    assert_eq!(stream.read::<u8>(), Err(StreamError::NoMoreData));
}

#[test]
fn invalid_primitives() {
    let mut stream = BufferStream::from_bytes(vec![2]);
    assert_eq!(
        stream.read::<bool>(),
        Err(StreamError::Format("invalid bool value"))
    );

    let mut stream = BufferStream::from_bytes(0xd800u32.to_le_bytes().to_vec());
    assert_eq!(
        stream.read::<char>(),
        Err(StreamError::Format("invalid char value"))
    );
}

#[test]
fn short_read_leaves_outstanding_bytes() {
    let mut stream = BufferStream::from_bytes(vec![1, 2, 3]);
    let mut buf = [0u8; 5];
    let mut rest: &mut [u8] = &mut buf;
    assert_eq!(stream.read_raw(&mut rest), Err(StreamError::NoMoreData));
    assert_eq!(rest.len(), 2);
    assert_eq!(buf, [1, 2, 3, 0, 0]);
}

#[test]
fn buffer_stream_acknowledge() {
    let mut stream = BufferStream::new();
    stream.write_all_raw(&[1, 2, 3]).unwrap();
    stream.read::<u8>().unwrap();

    let err = stream.acknowledge(false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(stream.unread(), &[2, 3]);

    stream.acknowledge(true).unwrap();
    assert!(stream.unread().is_empty());
    stream.acknowledge(false).unwrap();
}

#[test]
fn buffer_stream_seek_and_size() {
    let mut stream = BufferStream::new();
    stream.write_all_raw(&[1, 2, 3, 4]).unwrap();

    stream.seek(Direction::In, 2).unwrap();
    assert_eq!(stream.read::<u8>().unwrap(), 3);
    stream.seek(Direction::In, 0).unwrap();
    assert_eq!(stream.read::<u8>().unwrap(), 1);

    stream.seek(Direction::Out, 3).unwrap();
    assert_eq!(stream.written_buffer(), &[1, 2, 3]);
    assert_eq!(
        stream.seek(Direction::In, 10),
        Err(StreamError::InvalidArgument("seek out of range"))
    );

    stream.set_size(5).unwrap();
    assert_eq!(stream.written_buffer(), &[1, 2, 3, 0, 0]);
    stream.set_size(1).unwrap();
    assert_eq!(stream.written_buffer(), &[1]);
    assert!(stream.unread().is_empty());

    stream.reset().unwrap();
    assert!(stream.written_buffer().is_empty());
}

#[test]
fn buffer_stream_overwrite() {
    let mut stream = BufferStream::new();
    stream.write(&0u32).unwrap();
    stream.write_str("abc").unwrap();
    stream.overwrite_raw(0, &[9, 9]).unwrap();
    assert_eq!(&stream.written_buffer()[..4], &[9, 9, 0, 0]);

    assert_eq!(
        stream.overwrite_raw(14, &[1, 2]),
        Err(StreamError::InvalidArgument("overwrite out of range"))
    );
}

#[test]
fn buffer_stream_write_limit() {
    let mut stream = BufferStream::with_config(Config::new().with_limit(4));
    stream.write(&1u32).unwrap();
    assert_eq!(
        stream.write(&1u8),
        Err(StreamError::InvalidArgument("size limit reached"))
    );
    assert_eq!(stream.written_buffer().len(), 4);
}

#[test]
fn slice_writer() {
    let mut buffer = [0u8; 6];
    let mut writer = SliceWriter::new(&mut buffer);
    writer.write(&0x0102_0304u32).unwrap();
    assert_eq!(writer.written_len(), 4);

    let data = [5u8, 6, 7];
    let mut rest: &[u8] = &data;
    assert_eq!(writer.write_raw(&mut rest), Err(StreamError::NoMoreData));
    assert_eq!(rest, &[7]);
    assert_eq!(writer.written_buffer(), &[4, 3, 2, 1, 5, 6]);

    writer.overwrite_raw(0, &[0xaa]).unwrap();
    assert!(writer.overwrite_raw(5, &[0, 0]).is_err());
    assert_eq!(writer.get_size(Direction::Out), Ok(6));
    assert_eq!(writer.read::<u8>(), Err(StreamError::NotSupported));

    writer.reset().unwrap();
    assert_eq!(writer.written_len(), 0);
    assert_eq!(buffer[0], 0xaa);
}

#[test]
fn slice_reader() {
    let data = [3u8, 0, 7, 8];
    let mut reader = SliceReader::with_config(&data, Config::new().with_big_endian());
    assert_eq!(reader.read::<u16>().unwrap(), 0x0300);
    assert_eq!(reader.get_size(Direction::In), Ok(2));
    assert!(reader.attributes(Direction::In).contains(Attributes::SIMPLEX));

    assert_eq!(reader.acknowledge(false).unwrap_err().kind(), ErrorKind::Io);
    assert_eq!(reader.remaining(), &[7, 8]);
    reader.acknowledge(true).unwrap();
    assert!(reader.remaining().is_empty());
    assert_eq!(reader.write(&1u8), Err(StreamError::NotSupported));
}

#[test]
fn size_checker_counts_without_storing() {
    let mut checker = SizeChecker::new(Config::new());
    checker.write(&1u64).unwrap();
    checker.write_str("four").unwrap();
    assert_eq!(checker.total(), 8 + 8 + 4);
    assert_eq!(checker.get_size(Direction::Out), Ok(20));

    checker.reset().unwrap();
    assert_eq!(checker.total(), 0);

    let mut bounded = SizeChecker::new(Config::new().with_limit(8));
    bounded.write(&1u64).unwrap();
    assert!(bounded.write(&1u8).is_err());
}

#[test]
fn optional_capabilities_default_to_not_supported() {
    struct Minimal;

    impl Stream for Minimal {
        fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
            *data = &[];
            Ok(())
        }

        fn read_raw(&mut self, _buf: &mut &mut [u8]) -> Result<(), StreamError> {
            Err(StreamError::NoMoreData)
        }
    }

    let mut stream = Minimal;
    assert!(stream.is_open());
    assert!(stream.attributes(Direction::In).is_empty());
    assert_eq!(stream.config(), Config::new());
    assert_eq!(stream.seek(Direction::In, 0), Err(StreamError::NotSupported));
    assert_eq!(stream.get_size(Direction::Out), Err(StreamError::NotSupported));
    assert_eq!(stream.set_size(0), Err(StreamError::NotSupported));
    assert_eq!(stream.overwrite_raw(0, &[1]), Err(StreamError::NotSupported));
    stream.flush().unwrap();
    stream.acknowledge(false).unwrap();

    let boxed: &mut dyn Stream = &mut stream;
    boxed.write_items(&[1u32, 2]).unwrap();
}

#[test]
fn type_tags() {
    assert_eq!(TypeTag::U32.size(), 4);
    assert_eq!(TypeTag::U32.kind(), Kind::UInt);
    assert!(TypeTag::F64.is_primitive());
    assert_eq!(TypeTag::new(Kind::Compound, 4).size(), 0);
    assert!(TypeTag::compound().is_no_size());
    assert!(TypeTag::separator().is_no_size());

    let first = TypeTag::U8.array_element(0);
    assert!(first.flags().contains(TagFlags::ARRAY_ELEMENT | TagFlags::FIRST_ELEMENT));
    assert!(!TypeTag::U8.array_element(1).flags().contains(TagFlags::FIRST_ELEMENT));

    let begin = first.array_begin();
    assert!(begin.is_marker());
    assert_eq!(begin.flags(), TagFlags::ARRAY_BEGIN);
    assert_eq!(begin.plain(), TypeTag::U8);
}

#[test]
fn error_display() {
    assert_eq!(
        StreamError::Format("invalid bool value").to_string(),
        "Format error: invalid bool value"
    );
    assert_eq!(StreamError::Retry.kind(), ErrorKind::Retry);
}
