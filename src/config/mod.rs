//! Options shared by every stream in a pipeline.
//!
//! ```
//! use binstream_core::Config;
//!
//! let config = Config::new().with_big_endian().with_limit(4096);
//! assert_eq!(config.limit.limit(), Some(4096));
//! ```

mod limit;

pub use self::limit::Limit;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};

/// Byte order of multi-byte primitives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first. The default.
    Little,
    /// Most significant byte first, a.k.a. network order.
    Big,
    /// Whatever the target uses.
    Native,
}

impl Default for Endian {
    fn default() -> Self {
        Endian::Little
    }
}

macro_rules! impl_endian_codec {
    ($($write:ident / $read:ident : $ty:ty),* $(,)?) => {
        impl Endian {
            $(
                #[inline]
                pub(crate) fn $write(self, buf: &mut [u8], v: $ty) {
                    match self {
                        Endian::Little => LittleEndian::$write(buf, v),
                        Endian::Big => BigEndian::$write(buf, v),
                        Endian::Native => NativeEndian::$write(buf, v),
                    }
                }

                #[inline]
                pub(crate) fn $read(self, buf: &[u8]) -> $ty {
                    match self {
                        Endian::Little => LittleEndian::$read(buf),
                        Endian::Big => BigEndian::$read(buf),
                        Endian::Native => NativeEndian::$read(buf),
                    }
                }
            )*
        }
    };
}

impl_endian_codec! {
    write_u16 / read_u16 : u16,
    write_u32 / read_u32 : u32,
    write_u64 / read_u64 : u64,
    write_i16 / read_i16 : i16,
    write_i32 / read_i32 : i32,
    write_i64 / read_i64 : i64,
    write_f32 / read_f32 : f32,
    write_f64 / read_f64 : f64,
}

/// Stream options. Build one with [Config::new] and the `with_*` methods.
///
/// The default is little-endian with no size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Byte order of encoded primitives.
    pub endian: Endian,
    /// Cap on the number of bytes a stream produces or a read materializes.
    pub limit: Limit,
}

impl Config {
    /// Get a default configuration object.
    pub const fn new() -> Config {
        Config {
            endian: Endian::Little,
            limit: Limit::Infinite,
        }
    }

    /// Sets the byte limit to be unlimited.
    pub const fn with_no_limit(mut self) -> Config {
        self.limit = Limit::Infinite;
        self
    }

    /// Sets the byte limit to `limit`.
    pub const fn with_limit(mut self, limit: u64) -> Config {
        self.limit = Limit::Bounded(limit);
        self
    }

    /// Sets the endianness to little-endian
    pub const fn with_little_endian(mut self) -> Config {
        self.endian = Endian::Little;
        self
    }

    /// Sets the endianness to big-endian
    pub const fn with_big_endian(mut self) -> Config {
        self.endian = Endian::Big;
        self
    }

    /// Sets the endianness to the machine-native endianness
    pub const fn with_native_endian(mut self) -> Config {
        self.endian = Endian::Native;
        self
    }
}
