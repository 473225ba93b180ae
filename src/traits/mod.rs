//! The stream contract and the typed helpers built on it.

mod element;
mod ext;
mod stream;

#[cfg(feature = "embedded-hal-traits")]
mod impl_embedded_hal;

pub use self::element::Element;
pub use self::ext::StreamExt;
pub use self::stream::{fill_from, Attributes, Direction, Stream, UNKNOWN_COUNT};

#[cfg(feature = "embedded-hal-traits")]
pub use self::impl_embedded_hal::SerialStream;

pub(crate) use self::stream::read_exact;
