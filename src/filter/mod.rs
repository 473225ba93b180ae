//! Streams that wrap another stream and transcode the bytes passing through it.
//!
//! Filters own their codec state and nothing else. The inner stream can be owned, borrowed as
//! `&mut S`, or boxed as `Box<dyn Stream>`, and filters nest in pipeline order:
//!
//! ```
//! use binstream_core::{Base64Stream, BufferStream, SixBitStream, Stream, StreamExt};
//!
//! let mut medium = BufferStream::new();
//! {
//!     let mut pipeline = SixBitStream::new(Base64Stream::new(&mut medium));
//!     pipeline.write_str("hello").unwrap();
//!     pipeline.flush().unwrap();
//! }
//!
//! let mut pipeline = SixBitStream::new(Base64Stream::new(&mut medium));
//! assert_eq!(pipeline.read_string().unwrap(), "hello");
//! pipeline.acknowledge(false).unwrap();
//! ```

mod base64;
mod sixbit;

pub use self::base64::Base64Stream;
pub use self::sixbit::SixBitStream;
