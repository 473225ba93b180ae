use crate::config::Config;
use crate::traits::{Attributes, Direction, Stream};
use crate::StreamError;

/// A write-only stream that discards its input and only counts how many bytes it was given.
///
/// Writing a value to it computes the value's encoded size without producing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeChecker {
    config: Config,
    total: u64,
}

impl SizeChecker {
    /// Count bytes as they would be produced with `config`.
    pub fn new(config: Config) -> Self {
        Self { config, total: 0 }
    }

    /// The number of bytes written so far.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Stream for SizeChecker {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        let total = self.total + data.len() as u64;
        self.config.limit.check(total)?;
        self.total = total;
        *data = &[];
        Ok(())
    }

    fn read_raw(&mut self, _buf: &mut &mut [u8]) -> Result<(), StreamError> {
        Err(StreamError::NotSupported)
    }

    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::SIMPLEX
    }

    fn config(&self) -> Config {
        self.config
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        self.total = 0;
        Ok(())
    }

    fn get_size(&self, direction: Direction) -> Result<u64, StreamError> {
        match direction {
            Direction::Out => Ok(self.total),
            Direction::In => Err(StreamError::NotSupported),
        }
    }
}
