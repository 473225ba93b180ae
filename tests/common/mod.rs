#![allow(dead_code)]

use binstream_core::{Attributes, BufferStream, Config, Direction, Stream, StreamError};

/// A [BufferStream] that hands out at most `chunk` bytes per read and asks for a retry when more
/// were requested, like a non-blocking medium.
pub struct ChunkedStream {
    pub inner: BufferStream,
    chunk: usize,
    pub retries: usize,
}

impl ChunkedStream {
    pub fn new(bytes: Vec<u8>, chunk: usize) -> Self {
        assert!(chunk > 0);
        Self {
            inner: BufferStream::from_bytes(bytes),
            chunk,
            retries: 0,
        }
    }
}

impl Stream for ChunkedStream {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        self.inner.write_raw(data)
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        if buf.len() <= self.chunk {
            return self.inner.read_raw(buf);
        }
        let (consumed, result) = {
            let mut part: &mut [u8] = &mut buf[..self.chunk];
            let result = self.inner.read_raw(&mut part);
            (self.chunk - part.len(), result)
        };
        let taken = std::mem::take(buf);
        *buf = &mut taken[consumed..];
        match result {
            Ok(()) => {
                self.retries += 1;
                Err(StreamError::Retry)
            }
            Err(e) => Err(e),
        }
    }

    fn attributes(&self, direction: Direction) -> Attributes {
        self.inner.attributes(direction)
    }

    fn config(&self) -> Config {
        self.inner.config()
    }

    fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
        self.inner.acknowledge(eat)
    }
}
