//! In-memory mediums.

use crate::config::Config;
use crate::traits::{fill_from, Attributes, Direction, Stream};
use crate::StreamError;
use alloc::vec::Vec;
use core::convert::TryFrom;

/// A growable in-memory stream. Bytes written are appended, bytes read are taken from a separate
/// read position.
///
/// The stream is handshaking: [Stream::acknowledge] fails while unread bytes remain, unless told to
/// discard them. It is also revertable, so a placeholder can be written and patched later:
///
/// ```
/// use binstream_core::{BufferStream, Direction, Stream, StreamExt};
///
/// let mut stream = BufferStream::new();
/// stream.write(&0u32).unwrap();
/// stream.write_str("payload").unwrap();
/// let len = stream.get_size(Direction::Out).unwrap() as u32 - 4;
/// stream.overwrite_raw(0, &len.to_le_bytes()).unwrap();
///
/// assert_eq!(stream.read::<u32>().unwrap(), 15);
/// assert_eq!(stream.read_string().unwrap(), "payload");
/// stream.acknowledge(false).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferStream {
    buffer: Vec<u8>,
    read_pos: usize,
    config: Config,
}

impl BufferStream {
    /// Create an empty stream with the default [Config].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with the given options.
    pub fn with_config(config: Config) -> Self {
        Self {
            buffer: Vec::new(),
            read_pos: 0,
            config,
        }
    }

    /// Create a stream that reads `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            read_pos: 0,
            config: Config::new(),
        }
    }

    /// Everything written so far, including bytes that have already been read.
    pub fn written_buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The bytes that have not been read yet.
    pub fn unread(&self) -> &[u8] {
        &self.buffer[self.read_pos..]
    }

    /// Take the backing buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl Stream for BufferStream {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        self.config
            .limit
            .check(self.buffer.len() as u64 + data.len() as u64)?;
        self.buffer.extend_from_slice(data);
        *data = &[];
        Ok(())
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        let n = fill_from(buf, &self.buffer[self.read_pos..]);
        self.read_pos += n;
        if buf.is_empty() {
            Ok(())
        } else {
            Err(StreamError::NoMoreData)
        }
    }

    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::HANDSHAKING | Attributes::REVERTABLE
    }

    fn config(&self) -> Config {
        self.config
    }

    fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
        let left = self.buffer.len() - self.read_pos;
        if left > 0 {
            if !eat {
                return Err(StreamError::DATA_LEFT);
            }
            log::debug!("discarding {} unread bytes", left);
        }
        self.read_pos = self.buffer.len();
        Ok(())
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        self.buffer.clear();
        self.read_pos = 0;
        Ok(())
    }

    fn seek(&mut self, direction: Direction, pos: u64) -> Result<(), StreamError> {
        let pos = usize::try_from(pos).map_err(|_| StreamError::InvalidArgument("seek out of range"))?;
        if pos > self.buffer.len() {
            return Err(StreamError::InvalidArgument("seek out of range"));
        }
        match direction {
            Direction::In => self.read_pos = pos,
            Direction::Out => {
                self.buffer.truncate(pos);
                self.read_pos = self.read_pos.min(pos);
            }
        }
        Ok(())
    }

    fn get_size(&self, direction: Direction) -> Result<u64, StreamError> {
        Ok(match direction {
            Direction::In => (self.buffer.len() - self.read_pos) as u64,
            Direction::Out => self.buffer.len() as u64,
        })
    }

    fn set_size(&mut self, size: u64) -> Result<(), StreamError> {
        self.config.limit.check(size)?;
        let size = usize::try_from(size).map_err(|_| StreamError::InvalidArgument("size out of range"))?;
        self.buffer.resize(size, 0);
        self.read_pos = self.read_pos.min(size);
        Ok(())
    }

    fn overwrite_raw(&mut self, pos: u64, data: &[u8]) -> Result<(), StreamError> {
        let start = usize::try_from(pos).map_err(|_| StreamError::InvalidArgument("overwrite out of range"))?;
        let target = start
            .checked_add(data.len())
            .and_then(|end| self.buffer.get_mut(start..end))
            .ok_or(StreamError::InvalidArgument("overwrite out of range"))?;
        target.copy_from_slice(data);
        Ok(())
    }
}

/// A write-only stream over a fixed `&mut [u8]`.
pub struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    index: usize,
    config: Config,
}

impl<'a> SliceWriter<'a> {
    /// Create a new writer with a backing buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            index: 0,
            config: Config::new(),
        }
    }

    /// Create a new writer with a backing buffer and the given options.
    pub fn with_config(buffer: &'a mut [u8], config: Config) -> Self {
        Self {
            buffer,
            index: 0,
            config,
        }
    }

    /// The bytes count written to the backing buffer.
    pub fn written_len(&self) -> usize {
        self.index
    }

    /// A slice of the buffer that is in this writer. This is equivalent to getting a slice of the
    /// original buffer with the range `..writer.written_len()`.
    /// ```
    /// # use binstream_core::{SliceWriter, StreamExt};
    /// let mut buffer = [0u8; 8];
    /// let mut writer = SliceWriter::new(&mut buffer);
    /// writer.write(&7u16).unwrap();
    /// assert_eq!(writer.written_buffer(), &[7, 0]);
    /// ```
    pub fn written_buffer(&self) -> &[u8] {
        &self.buffer[..self.index]
    }
}

impl Stream for SliceWriter<'_> {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        let free = &mut self.buffer[self.index..];
        let n = free.len().min(data.len());
        free[..n].copy_from_slice(&data[..n]);
        self.index += n;
        let remaining: &[u8] = *data;
        *data = &remaining[n..];
        if data.is_empty() {
            Ok(())
        } else {
            Err(StreamError::NoMoreData)
        }
    }

    fn read_raw(&mut self, _buf: &mut &mut [u8]) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }

    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::SIMPLEX | Attributes::REVERTABLE
    }

    fn config(&self) -> Config {
        self.config
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        self.index = 0;
        Ok(())
    }

    fn get_size(&self, direction: Direction) -> Result<u64, StreamError> {
        match direction {
            Direction::Out => Ok(self.index as u64),
            Direction::In => Err(StreamError::NotSupported),
        }
    }

    fn overwrite_raw(&mut self, pos: u64, data: &[u8]) -> Result<(), StreamError> {
        let start = usize::try_from(pos).map_err(|_| StreamError::InvalidArgument("overwrite out of range"))?;
        match start.checked_add(data.len()) {
            Some(end) if end <= self.index => {
                self.buffer[start..end].copy_from_slice(data);
                Ok(())
            }
            _ => Err(StreamError::InvalidArgument("overwrite out of range")),
        }
    }
}

/// A read-only stream over a borrowed byte slice.
pub struct SliceReader<'a> {
    data: &'a [u8],
    config: Config,
}

impl<'a> SliceReader<'a> {
    /// Read from `data` with the default options.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            config: Config::new(),
        }
    }

    /// Read from `data` with the given options.
    pub fn with_config(data: &'a [u8], config: Config) -> Self {
        Self { data, config }
    }

    /// The bytes that have not been read yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
}

impl Stream for SliceReader<'_> {
    fn write_raw(&mut self, _data: &mut &[u8]) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        let n = fill_from(buf, self.data);
        self.data = &self.data[n..];
        if buf.is_empty() {
            Ok(())
        } else {
            Err(StreamError::NoMoreData)
        }
    }

    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::SIMPLEX | Attributes::HANDSHAKING
    }

    fn config(&self) -> Config {
        self.config
    }

    fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
        if !self.data.is_empty() {
            if !eat {
                return Err(StreamError::DATA_LEFT);
            }
            log::debug!("discarding {} unread bytes", self.data.len());
        }
        self.data = &[];
        Ok(())
    }

    fn get_size(&self, direction: Direction) -> Result<u64, StreamError> {
        match direction {
            Direction::In => Ok(self.data.len() as u64),
            Direction::Out => Err(StreamError::NotSupported),
        }
    }
}
