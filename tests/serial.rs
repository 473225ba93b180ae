#![cfg(feature = "embedded-hal-traits")]

use binstream_core::*;
use embedded_hal::serial;
use std::collections::VecDeque;

/// `None` entries in `rx` make the next read report `WouldBlock`.
#[derive(Default)]
struct MockPort {
    rx: VecDeque<Option<u8>>,
    tx: Vec<u8>,
    flushed: bool,
}

impl serial::Read<u8> for MockPort {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, ()> {
        match self.rx.pop_front() {
            Some(Some(byte)) => Ok(byte),
            Some(None) => Err(nb::Error::WouldBlock),
            None => Err(nb::Error::Other(())),
        }
    }
}

impl serial::Write<u8> for MockPort {
    type Error = ();

    fn write(&mut self, word: u8) -> nb::Result<(), ()> {
        self.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), ()> {
        self.flushed = true;
        Ok(())
    }
}

#[test]
fn writes_every_byte() {
    let mut stream = SerialStream::new(MockPort::default());
    stream.write(&0x0102u16).unwrap();
    stream.write_str("ok").unwrap();
    stream.flush().unwrap();

    let port = stream.into_inner();
    assert_eq!(port.tx, vec![2, 1, 2, 0, 0, 0, 0, 0, 0, 0, b'o', b'k']);
    assert!(port.flushed);
}

#[test]
fn reads_retry_while_the_port_blocks() {
    let rx = vec![Some(1), None, Some(2), Some(3), None, None, Some(4)];
    let port = MockPort {
        rx: rx.into_iter().collect(),
        ..MockPort::default()
    };
    let mut stream = SerialStream::new(port);
    assert_eq!(stream.read::<u32>().unwrap(), 0x0403_0201);
}

#[test]
fn port_errors_are_io_errors() {
    let mut stream = SerialStream::with_config(MockPort::default(), Config::new().with_big_endian());
    assert_eq!(
        stream.read::<u8>(),
        Err(StreamError::Io("serial read failed"))
    );
}
