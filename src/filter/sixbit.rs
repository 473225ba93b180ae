use crate::config::Config;
use crate::traits::{fill_from, Attributes, Direction, Stream, StreamExt};
use crate::StreamError;

/// Added to each 6-bit value, so symbols land in `;` ..= `z`.
const BIAS: u8 = 59;
/// Marks a terminal group and fills its unused positions.
const TERM: u8 = b'.';

fn encode_symbol(v: u32) -> u8 {
    BIAS + (v & 0x3f) as u8
}

fn decode_symbol(c: u8) -> Result<u32, StreamError> {
    match c.checked_sub(BIAS) {
        Some(v) if v < 64 => Ok(v as u32),
        _ => {
            log::warn!("invalid six-bit symbol {:#04x}", c);
            Err(StreamError::Format("invalid six-bit symbol"))
        }
    }
}

/// Write side: bytes accumulated towards the next full group.
#[derive(Debug, Clone, Copy, Default)]
struct WriteState {
    wval: u32,
    /// Bit position of the next byte in `wval`: 0, 8 or 16.
    wshft: u32,
}

impl WriteState {
    /// Fold `byte` in, returning a group once three bytes have accumulated.
    fn push(&mut self, byte: u8) -> Option<[u8; 4]> {
        self.wval |= (byte as u32) << self.wshft;
        self.wshft += 8;
        if self.wshft < 24 {
            return None;
        }
        let v = self.wval;
        *self = WriteState::default();
        Some([
            encode_symbol(v),
            encode_symbol(v >> 6),
            encode_symbol(v >> 12),
            encode_symbol(v >> 18),
        ])
    }

    /// The terminal group carrying the 0, 1 or 2 bytes still pending.
    fn terminal(&self) -> [u8; 4] {
        let v = self.wval;
        match self.wshft {
            0 => [TERM; 4],
            8 => [TERM, encode_symbol(v), encode_symbol(v >> 6), TERM],
            _ => [TERM, encode_symbol(v), encode_symbol(v >> 6), encode_symbol(v >> 12)],
        }
    }
}

/// Read side: the decoded group being handed out and the raw group being collected.
#[derive(Debug, Clone, Copy, Default)]
struct ReadState {
    rval: u32,
    /// Decoded bytes of `rval` not handed out yet.
    rrem: usize,
    group: [u8; 4],
    /// Symbols of `group` received so far.
    glen: usize,
    /// The terminal group has been consumed.
    ended: bool,
}

impl ReadState {
    fn pop(&mut self) -> u8 {
        let byte = self.rval as u8;
        self.rval >>= 8;
        self.rrem -= 1;
        byte
    }

    /// Collect the next 4 symbols from `inner`.
    fn fetch<S: Stream + ?Sized>(&mut self, inner: &mut S) -> Result<(), StreamError> {
        let mut dst = &mut self.group[self.glen..];
        let requested = dst.len();
        let result = inner.read_raw(&mut dst);
        self.glen += requested - dst.len();
        match result {
            Err(StreamError::NoMoreData) if self.glen > 0 => {
                log::warn!("six-bit input ends inside a group");
                Err(StreamError::Format("truncated six-bit group"))
            }
            result => result,
        }
    }

    fn decode(&mut self) -> Result<(), StreamError> {
        let group = self.group;
        self.glen = 0;

        if group[0] != TERM {
            let mut v = 0;
            for (i, &c) in group.iter().enumerate() {
                v |= decode_symbol(c)? << (6 * i);
            }
            self.rval = v;
            self.rrem = 3;
            return Ok(());
        }

        let tail = &group[1..];
        let meaningful = tail.iter().take_while(|&&c| c != TERM).count();
        if tail[meaningful..].iter().any(|&c| c != TERM) {
            return Err(corrupted());
        }
        let nbytes = match meaningful {
            0 => 0,
            2 => 1,
            3 => 2,
            _ => return Err(corrupted()),
        };
        let mut v = 0;
        for (i, &c) in tail[..meaningful].iter().enumerate() {
            v |= decode_symbol(c)? << (6 * i);
        }
        if v >> (8 * nbytes) != 0 {
            return Err(corrupted());
        }
        log::trace!("six-bit terminal group with {} bytes", nbytes);
        self.rval = v;
        self.rrem = nbytes;
        self.ended = true;
        Ok(())
    }
}

fn corrupted() -> StreamError {
    log::warn!("corrupted six-bit terminal group");
    StreamError::Format("corrupted six-bit terminal group")
}

/// A filter that packs every 3 bytes written to it into 4 printable symbols and unpacks them on
/// the way back.
///
/// Symbols are `;` plus a 6-bit value. [Stream::flush] closes the packet with a terminal group: a
/// `.` followed by the 0, 1 or 2 leftover bytes as 0, 2 or 3 symbols, padded with `.`.
///
/// ```
/// use binstream_core::{BufferStream, SixBitStream, Stream, StreamExt};
///
/// let mut encoder = SixBitStream::new(BufferStream::new());
/// encoder.flush().unwrap();
/// assert_eq!(encoder.get_ref().written_buffer(), b"....");
/// ```
pub struct SixBitStream<S> {
    inner: S,
    w: WriteState,
    r: ReadState,
}

impl<S: Stream> SixBitStream<S> {
    /// Wrap `inner`. Pass `&mut stream` to keep ownership of the inner stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            w: WriteState::default(),
            r: ReadState::default(),
        }
    }

    /// The inner stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// The inner stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the inner stream, dropping any accumulated state.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for SixBitStream<S> {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        let mut input: &[u8] = *data;
        while let Some((&byte, rest)) = input.split_first() {
            input = rest;
            *data = rest;
            if let Some(group) = self.w.push(byte) {
                self.inner.write_all_raw(&group)?;
            }
        }
        Ok(())
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        loop {
            if buf.is_empty() {
                return Ok(());
            }
            if self.r.rrem > 0 {
                let byte = self.r.pop();
                fill_from(buf, &[byte]);
                continue;
            }
            if self.r.ended {
                return Err(StreamError::NoMoreData);
            }
            self.r.fetch(&mut self.inner)?;
            self.r.decode()?;
        }
    }

    fn attributes(&self, direction: Direction) -> Attributes {
        self.inner.attributes(direction) | Attributes::HANDSHAKING
    }

    fn config(&self) -> Config {
        self.inner.config()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        let group = self.w.terminal();
        self.w = WriteState::default();
        self.inner.write_all_raw(&group)?;
        log::debug!("six-bit packet flushed");
        self.inner.flush()
    }

    fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
        if eat {
            if self.r.rrem > 0 || !self.r.ended {
                log::debug!("discarding unread six-bit input");
            }
        } else {
            if self.r.rrem > 0 {
                return Err(StreamError::DATA_LEFT);
            }
            if !self.r.ended {
                // Everything was read, so the next group has to be an empty terminal group.
                loop {
                    match self.r.fetch(&mut self.inner) {
                        Ok(()) => break,
                        Err(StreamError::Retry) => continue,
                        Err(StreamError::NoMoreData) => {
                            return Err(StreamError::Format("missing six-bit terminal group"))
                        }
                        Err(e) => return Err(e),
                    }
                }
                self.r.decode()?;
                if self.r.rrem > 0 || !self.r.ended {
                    return Err(StreamError::DATA_LEFT);
                }
            }
        }
        self.r = ReadState::default();
        self.inner.acknowledge(eat)
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        self.w = WriteState::default();
        self.r = ReadState::default();
        self.inner.reset()
    }
}
