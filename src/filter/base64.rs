use crate::config::Config;
use crate::traits::{fill_from, Attributes, Direction, Stream, StreamExt};
use crate::StreamError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

/// Size of the encoded output buffer and of the encoded input buffer.
const LINE: usize = 64;

fn decode_symbol(c: u8) -> Result<u32, StreamError> {
    let v = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return Err(StreamError::Format("invalid base64 character")),
    };
    Ok(v as u32)
}

/// Encode 1 to 3 bytes into a 4 character group, padding with `=`.
fn encode_group(src: &[u8]) -> [u8; 4] {
    let b0 = src[0] as u32;
    let b1 = src.get(1).copied().unwrap_or(0) as u32;
    let b2 = src.get(2).copied().unwrap_or(0) as u32;
    let v = (b0 << 16) | (b1 << 8) | b2;

    let mut out = [PAD; 4];
    for (i, c) in out.iter_mut().enumerate().take(src.len() + 1) {
        *c = ALPHABET[((v >> (18 - 6 * i)) & 0x3f) as usize];
    }
    out
}

#[derive(Clone, Copy)]
struct WriteState {
    wbuf: [u8; LINE],
    wpos: usize,
    wtar: [u8; 3],
    /// Input bytes still needed to complete the current group, counts down from 3.
    nreq: usize,
}

impl WriteState {
    const fn new() -> Self {
        Self {
            wbuf: [0; LINE],
            wpos: 0,
            wtar: [0; 3],
            nreq: 3,
        }
    }

    fn pending(&self) -> usize {
        3 - self.nreq
    }

    fn push_group<S: Stream + ?Sized>(&mut self, group: [u8; 4], inner: &mut S) -> Result<(), StreamError> {
        // a failed drain leaves the block full
        if self.wpos == LINE {
            self.drain(inner)?;
        }
        self.wbuf[self.wpos..self.wpos + 4].copy_from_slice(&group);
        self.wpos += 4;
        if self.wpos == LINE {
            self.drain(inner)?;
        }
        Ok(())
    }

    fn drain<S: Stream + ?Sized>(&mut self, inner: &mut S) -> Result<(), StreamError> {
        if self.wpos > 0 {
            inner.write_all_raw(&self.wbuf[..self.wpos])?;
            self.wpos = 0;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct ReadState {
    rbuf: [u8; LINE],
    rpos: usize,
    rlen: usize,
    rtar: [u8; 3],
    /// Bytes of `rtar` that are valid.
    ndec: usize,
    /// Bytes of `rtar` already handed out.
    nout: usize,
    /// A padded group was decoded, the packet holds no more data.
    ended: bool,
}

impl ReadState {
    const fn new() -> Self {
        Self {
            rbuf: [0; LINE],
            rpos: 0,
            rlen: 0,
            rtar: [0; 3],
            ndec: 0,
            nout: 0,
            ended: false,
        }
    }

    /// Decoded bytes that have not been handed out yet.
    fn rrem(&self) -> usize {
        self.ndec - self.nout
    }

    fn buffered(&self) -> usize {
        self.rlen - self.rpos
    }

    /// Make sure at least one whole group is buffered, fetching enough characters for `want`
    /// decoded bytes.
    fn prefetch<S: Stream + ?Sized>(&mut self, want: usize, inner: &mut S) -> Result<(), StreamError> {
        if self.rpos > 0 {
            self.rbuf.copy_within(self.rpos..self.rlen, 0);
            self.rlen -= self.rpos;
            self.rpos = 0;
        }

        let groups = (want + 2) / 3;
        let target = (groups * 4).max(4).min(LINE);
        let mut dst = &mut self.rbuf[self.rlen..target];
        let requested = dst.len();
        let result = inner.read_raw(&mut dst);
        self.rlen += requested - dst.len();

        match result {
            Ok(()) => Ok(()),
            Err(StreamError::Retry) if self.rlen < 4 => Err(StreamError::Retry),
            Err(StreamError::Retry) => Ok(()),
            Err(StreamError::NoMoreData) if self.rlen == 0 => Err(StreamError::NoMoreData),
            Err(StreamError::NoMoreData) if self.rlen < 4 => {
                log::warn!("base64 input ends inside a group");
                Err(StreamError::Format("truncated base64 group"))
            }
            Err(StreamError::NoMoreData) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Decode the next buffered group into `rtar`, detecting `=` padding.
    fn decode_prefetch(&mut self) -> Result<(), StreamError> {
        let group = &self.rbuf[self.rpos..self.rpos + 4];
        let end = Self::decode_end(group)?;

        let mut v = 0u32;
        for &c in &group[..end + 1] {
            v = (v << 6) | decode_symbol(c)?;
        }
        v <<= 6 * (3 - end) as u32;

        self.rtar = [(v >> 16) as u8, (v >> 8) as u8, v as u8];
        self.ndec = end;
        self.nout = 0;
        self.rpos += 4;
        if end < 3 {
            log::trace!("base64 terminal group with {} bytes", end);
            self.ended = true;
        }
        Ok(())
    }

    /// The number of bytes a group decodes to: 3 without padding, 2 for one `=`, 1 for two.
    fn decode_end(group: &[u8]) -> Result<usize, StreamError> {
        match (group[0], group[1], group[2], group[3]) {
            (PAD, _, _, _) | (_, PAD, _, _) => Err(StreamError::Format("misplaced base64 padding")),
            (_, _, PAD, PAD) => Ok(1),
            (_, _, PAD, _) => Err(StreamError::Format("misplaced base64 padding")),
            (_, _, _, PAD) => Ok(2),
            _ => Ok(3),
        }
    }
}

/// A filter that base64-encodes everything written to it and decodes everything read from it.
///
/// Output is buffered in 64 character blocks, [Stream::flush] writes the final padded group and
/// flushes the inner stream. On the read side, [Stream::acknowledge] fails while decoded or
/// buffered input remains, unless told to discard it.
///
/// ```
/// use binstream_core::{Base64Stream, BufferStream, Stream, StreamExt};
///
/// let mut encoder = Base64Stream::new(BufferStream::new());
/// encoder.write_all_raw(&[0, 1, 2, 3]).unwrap();
/// encoder.flush().unwrap();
/// assert_eq!(encoder.get_ref().written_buffer(), b"AAECAw==");
/// ```
pub struct Base64Stream<S> {
    inner: S,
    w: WriteState,
    r: ReadState,
}

impl<S: Stream> Base64Stream<S> {
    /// Wrap `inner`. Pass `&mut stream` to keep ownership of the inner stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            w: WriteState::new(),
            r: ReadState::new(),
        }
    }

    /// The inner stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// The inner stream. Writing to it directly interleaves with buffered output.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the inner stream, dropping any buffered state.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for Base64Stream<S> {
    fn write_raw(&mut self, data: &mut &[u8]) -> Result<(), StreamError> {
        let mut input: &[u8] = *data;
        while let Some((&byte, rest)) = input.split_first() {
            input = rest;
            *data = rest;
            let w = &mut self.w;
            w.wtar[w.pending()] = byte;
            w.nreq -= 1;
            if w.nreq == 0 {
                w.nreq = 3;
                let group = encode_group(&w.wtar);
                w.push_group(group, &mut self.inner)?;
            }
        }
        Ok(())
    }

    fn read_raw(&mut self, buf: &mut &mut [u8]) -> Result<(), StreamError> {
        loop {
            if buf.is_empty() {
                return Ok(());
            }
            let r = &mut self.r;
            if r.rrem() > 0 {
                r.nout += fill_from(buf, &r.rtar[r.nout..r.ndec]);
                continue;
            }
            if r.ended {
                return Err(StreamError::NoMoreData);
            }
            if r.buffered() < 4 {
                r.prefetch(buf.len(), &mut self.inner)?;
            }
            r.decode_prefetch()?;
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
        let pending = self.w.pending();
        if pending > 0 {
            let group = encode_group(&self.w.wtar[..pending]);
            self.w.push_group(group, &mut self.inner)?;
        }
        self.w.drain(&mut self.inner)?;
        log::debug!("base64 packet flushed with {} trailing bytes", pending);
        self.w = WriteState::new();
        self.inner.flush()
    }

    fn acknowledge(&mut self, eat: bool) -> Result<(), StreamError> {
        let left = self.r.rrem() + self.r.buffered();
        if left > 0 {
            if !eat {
                return Err(StreamError::DATA_LEFT);
            }
            log::debug!("discarding {} buffered base64 bytes", left);
        }
        self.r = ReadState::new();
        self.inner.acknowledge(eat)
    }

    fn reset(&mut self) -> Result<(), StreamError> {
        self.w = WriteState::new();
        self.r = ReadState::new();
        self.inner.reset()
    }
}
