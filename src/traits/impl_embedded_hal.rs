use super::{fill_from, Attributes, Direction, Stream};
use crate::config::Config;
use crate::StreamError;
use embedded_hal::serial;

/// A stream over an `embedded-hal` serial port.
///
/// Writes block until every byte is accepted. Reads take what the port has and return
/// [StreamError::Retry] when it would block, so the caller decides how to wait.
pub struct SerialStream<T> {
    port: T,
    config: Config,
}

impl<T> SerialStream<T> {
    /// Wrap `port`.
    pub fn new(port: T) -> Self {
        Self {
            port,
            config: Config::new(),
        }
    }

    /// Wrap `port`, encoding primitives with `config`.
    pub fn with_config(port: T, config: Config) -> Self {
        Self { port, config }
    }

    /// Unwrap the serial port.
    pub fn into_inner(self) -> T {
        self.port
    }
}

// note: errors of the port are only logged, they are reported as StreamError::Io

impl<T> Stream for SerialStream<T>
where
    T: serial::Read<u8> + serial::Write<u8>,
    <T as serial::Read<u8>>::Error: core::fmt::Debug,
    <T as serial::Write<u8>>::Error: core::fmt::Debug,
{
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        let mut input: &[u8] = *data;
        while let Some((&byte, rest)) = input.split_first() {
            nb::block!(serial::Write::write(&mut self.port, byte)).map_err(|e| {
                log::debug!("serial write failed: {:?}", e);
                StreamError::Io("serial write failed")
            })?;
            input = rest;
            *data = rest;
        }
        Ok(())
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        while !buf.is_empty() {
            match serial::Read::read(&mut self.port) {
                Ok(byte) => {
                    fill_from(buf, &[byte]);
                }
                Err(nb::Error::WouldBlock) => return Err(StreamError::Retry),
                Err(nb::Error::Other(e)) => {
                    log::debug!("serial read failed: {:?}", e);
                    return Err(StreamError::Io("serial read failed"));
                }
            }
        }
        Ok(())
    }

    fn attributes(&self, _direction: Direction) -> Attributes {
        Attributes::empty()
    }

    fn config(&self) -> Config {
        self.config
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        nb::block!(serial::Write::flush(&mut self.port)).map_err(|e| {
            log::debug!("serial flush failed: {:?}", e);
            StreamError::Io("serial flush failed")
        })
    }
}
