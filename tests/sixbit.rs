mod common;

use binstream_core::*;
use common::ChunkedStream;
use proptest::prelude::*;

fn encode(data: &[u8]) -> Vec<u8> {
    let mut stream = SixBitStream::new(BufferStream::new());
    stream.write_all_raw(data).unwrap();
    stream.flush().unwrap();
    stream.into_inner().into_inner()
}

fn reader(encoded: &[u8]) -> SixBitStream<BufferStream> {
    SixBitStream::new(BufferStream::from_bytes(encoded.to_vec()))
}

fn decode(encoded: &[u8], len: usize) -> Result<Vec<u8>, StreamError> {
    let mut stream = reader(encoded);
    let mut out = vec![0u8; len];
    stream.read_exact_raw(&mut out)?;
    stream.acknowledge(false)?;
    Ok(out)
}

#[test]
fn empty_packet() {
    assert_eq!(encode(&[]), b"....");
    assert_eq!(decode(b"....", 0).unwrap(), Vec::<u8>::new());
}

#[test]
fn full_groups_and_terminal() {
    assert_eq!(encode(&[0, 0, 0]), b";;;;....");
    assert_eq!(encode(&[0xff, 0xff, 0xff]), b"zzzz....");
    assert_eq!(encode(&[1, 2, 3]), b"<Ck;....");
}

#[test]
fn leftover_bytes_go_to_the_terminal_group() {
    assert_eq!(encode(&[1]), b".<;.");
    assert_eq!(encode(&[1, 2]), b".<C;");
    assert_eq!(encode(&[1, 2, 3, 1]), b"<Ck;.<;.");

    assert_eq!(decode(b".<;.", 1).unwrap(), vec![1]);
    assert_eq!(decode(b".<C;", 2).unwrap(), vec![1, 2]);
    assert_eq!(decode(b"<Ck;.<;.", 4).unwrap(), vec![1, 2, 3, 1]);
}

#[test]
fn symbols_are_printable() {
    let data: Vec<u8> = (0..=255).collect();
    let encoded = encode(&data);
    assert_eq!(encoded.len(), (256 / 3) * 4 + 4);
    assert!(encoded.iter().all(|&c| c == b'.' || (b';'..=b'z').contains(&c)));
    assert_eq!(decode(&encoded, data.len()).unwrap(), data);
}

#[test]
fn reading_past_the_packet() {
    let mut stream = reader(b"<Ck;....");
    let mut out = [0u8; 4];
    assert_eq!(stream.read_exact_raw(&mut out), Err(StreamError::NoMoreData));
}

#[test]
fn corrupted_terminal_groups() {
    for group in [&b".<.."[..], b".<.<", b"..<<", b".zz."].iter() {
        let mut stream = reader(group);
        let mut out = [0u8; 2];
        let err = stream.read_exact_raw(&mut out).unwrap_err();
        assert_eq!(
            err,
            StreamError::Format("corrupted six-bit terminal group"),
            "{:?}",
            std::str::from_utf8(group)
        );
    }
}

#[test]
fn invalid_and_truncated_input() {
    let err = decode(b"!!!!....", 3).unwrap_err();
    assert_eq!(err, StreamError::Format("invalid six-bit symbol"));

    let err = decode(b";;;", 1).unwrap_err();
    assert_eq!(err, StreamError::Format("truncated six-bit group"));
}

#[test]
fn acknowledge_checks_the_terminal_group() {
    assert_eq!(decode(b"<Ck;....", 3).unwrap(), vec![1, 2, 3]);

    let err = decode(b"<Ck;", 3).unwrap_err();
    assert_eq!(err, StreamError::Format("missing six-bit terminal group"));

    let err = decode(b"<Ck;.<;.", 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn acknowledge_waits_for_the_terminal_group() {
    let mut stream = SixBitStream::new(ChunkedStream::new(b"<Ck;....".to_vec(), 1));
    let mut out = [0u8; 3];
    stream.read_exact_raw(&mut out).unwrap();
    assert_eq!(out, [1, 2, 3]);

    let retries = stream.get_ref().retries;
    stream.acknowledge(false).unwrap();
    assert!(stream.get_ref().retries > retries);
}

#[test]
fn acknowledge_with_unread_bytes() {
    let mut stream = reader(b"<Ck;....");
    let mut out = [0u8; 2];
    stream.read_exact_raw(&mut out).unwrap();

    assert_eq!(stream.acknowledge(false).unwrap_err().kind(), ErrorKind::Io);
    stream.acknowledge(true).unwrap();
    assert!(stream.get_ref().unread().is_empty());
}

#[test]
fn reset_drops_pending_bytes() {
    let mut stream = SixBitStream::new(BufferStream::new());
    stream.write_all_raw(&[9, 9]).unwrap();
    stream.reset().unwrap();
    stream.flush().unwrap();
    assert_eq!(stream.get_ref().written_buffer(), b"....");
}

#[test]
fn stacked_on_base64() {
    let mut stream = SixBitStream::new(Base64Stream::new(BufferStream::new()));
    stream.write(&-5i64).unwrap();
    stream.write_items(&[1.5f32, -2.25]).unwrap();
    stream.flush().unwrap();

    let encoded = stream.into_inner().into_inner().into_inner();
    assert!(encoded.iter().all(|c| c.is_ascii_alphanumeric() || b"+/=".contains(c)));

    let mut stream = SixBitStream::new(Base64Stream::new(BufferStream::from_bytes(encoded)));
    assert_eq!(stream.read::<i64>().unwrap(), -5);
    assert_eq!(stream.read_vec::<f32>().unwrap(), vec![1.5, -2.25]);
    stream.acknowledge(false).unwrap();
}

proptest! {
    #[test]
    fn chunked_writes_match_bulk_write(data in proptest::collection::vec(any::<u8>(), 0..200), chunk in 1usize..8) {
        let mut stream = SixBitStream::new(BufferStream::new());
        for part in data.chunks(chunk) {
            stream.write_all_raw(part).unwrap();
        }
        stream.flush().unwrap();
        prop_assert_eq!(stream.get_ref().written_buffer(), &encode(&data)[..]);
    }

    #[test]
    fn round_trips_in_any_chunking(data in proptest::collection::vec(any::<u8>(), 0..200), chunk in 1usize..8) {
        let encoded = encode(&data);
        prop_assert_eq!(encoded.len() % 4, 0);

        let mut stream = SixBitStream::new(ChunkedStream::new(encoded, chunk));
        let mut out = vec![0u8; data.len()];
        stream.read_exact_raw(&mut out).unwrap();
        prop_assert_eq!(out, data);
        prop_assert!(stream.acknowledge(false).is_ok());
    }
}
