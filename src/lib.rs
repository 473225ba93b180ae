#![warn(missing_docs)]
#![no_std]

//! Typed binary streams
//!
//! This crate serializes values through a [Stream]: a medium-agnostic sink and source of bytes
//! that is told the type of every value passing through it. Each value is described by a
//! [TypeTag], and arrays and structs are bracketed by open, separator and close hooks, so a stream
//! can decide how a value looks on the wire while the algorithms that walk containers stay shared.
//!
//! The raw layer is non-blocking friendly: [Stream::read_raw] may return
//! [StreamError::Retry] after a partial read, and the typed helpers in [StreamExt] repeat the read
//! until the value is complete.
//!
//! Containers are adapted to the array protocol through [SequenceView]. Filters like
//! [Base64Stream] and [SixBitStream] wrap another stream and re-encode everything passing through.
//!
//! ```
//! use binstream_core::{BufferStream, FixedArrayView, StreamExt};
//!
//! let mut stream = BufferStream::new();
//! stream.write_items(&[1u16, 2, 3]).unwrap();
//!
//! let mut out = [0u16; 3];
//! stream.read_array(&mut FixedArrayView::new_mut(&mut out)).unwrap();
//! assert_eq!(out, [1, 2, 3]);
//! ```

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod container;
pub mod deserialize;
pub mod filter;
pub mod serialize;
pub mod traits;
pub mod type_tag;

mod buffer;
mod error;
mod size_checker;

pub use self::buffer::{BufferStream, SliceReader, SliceWriter};
pub use self::config::{Config, Endian, Limit};
pub use self::container::{DereferencingView, FixedArrayView, GrowableCharView, SequenceView, VecView};
pub use self::deserialize::{deserialize, DeserializeError};
pub use self::error::{ErrorKind, StreamError};
pub use self::filter::{Base64Stream, SixBitStream};
pub use self::serialize::{serialize, serialized_size, SerializeError};
pub use self::size_checker::SizeChecker;
pub use self::traits::{Attributes, Direction, Element, Stream, StreamExt, UNKNOWN_COUNT};
pub use self::type_tag::{Kind, TagFlags, TypeTag};

#[cfg(feature = "embedded-hal-traits")]
pub use self::traits::SerialStream;
