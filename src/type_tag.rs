//! Type tags describe a single value as it crosses the stream boundary.

use bitflags::bitflags;

/// The kind of a primitive value, or of a marker that has no payload of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value at all.
    Void,
    /// Opaque bytes.
    Binary,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// IEEE-754 floating point.
    Float,
    /// Boolean, stored as a single byte.
    Bool,
    /// Character or text unit.
    Char,
    /// A textual key, e.g. a struct member name in formatting streams.
    Key,
    /// Point in time.
    Time,
    /// Error code.
    ErrCode,
    /// A struct or other compound value. Never carries a size.
    Compound,
    /// A marker separating array elements. Never carries a size.
    Separator,
}

impl Kind {
    /// Kinds that describe structure rather than data do not have a byte width.
    pub const fn is_no_size(self) -> bool {
        matches!(self, Kind::Void | Kind::Compound | Kind::Separator)
    }
}

bitflags! {
    /// Position flags attached to a [TypeTag].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagFlags: u8 {
        /// The tag opens an array.
        const ARRAY_BEGIN = 0b0000_0001;
        /// The tag closes an array.
        const ARRAY_END = 0b0000_0010;
        /// The tag opens a struct.
        const STRUCT_BEGIN = 0b0000_0100;
        /// The tag closes a struct.
        const STRUCT_END = 0b0000_1000;
        /// The value is an element of an array.
        const ARRAY_ELEMENT = 0b0001_0000;
        /// The value is the first element of an array.
        const FIRST_ELEMENT = 0b0010_0000;
        /// The surrounding array is streamed in separator mode.
        const NEEDS_SEPARATORS = 0b0100_0000;
    }
}

/// Describes a value's kind, its byte width and where it sits in the structure being streamed.
///
/// Tags are plain values; every method returns a modified copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    kind: Kind,
    size: u8,
    flags: TagFlags,
}

impl TypeTag {
    /// Tag for a fixed-size primitive. A no-size `kind` drops the given width.
    pub const fn new(kind: Kind, size: u8) -> Self {
        let size = if kind.is_no_size() { 0 } else { size };
        Self {
            kind,
            size,
            flags: TagFlags::empty(),
        }
    }

    /// Tag for a compound (struct) value.
    pub const fn compound() -> Self {
        Self::new(Kind::Compound, 0)
    }

    /// Tag for an array separator.
    pub const fn separator() -> Self {
        Self::new(Kind::Separator, 0)
    }

    /// `Void`.
    pub const VOID: TypeTag = TypeTag::new(Kind::Void, 0);
    /// `bool`.
    pub const BOOL: TypeTag = TypeTag::new(Kind::Bool, 1);
    /// `u8`.
    pub const U8: TypeTag = TypeTag::new(Kind::UInt, 1);
    /// `u16`.
    pub const U16: TypeTag = TypeTag::new(Kind::UInt, 2);
    /// `u32`.
    pub const U32: TypeTag = TypeTag::new(Kind::UInt, 4);
    /// `u64`.
    pub const U64: TypeTag = TypeTag::new(Kind::UInt, 8);
    /// `i8`.
    pub const I8: TypeTag = TypeTag::new(Kind::Int, 1);
    /// `i16`.
    pub const I16: TypeTag = TypeTag::new(Kind::Int, 2);
    /// `i32`.
    pub const I32: TypeTag = TypeTag::new(Kind::Int, 4);
    /// `i64`.
    pub const I64: TypeTag = TypeTag::new(Kind::Int, 8);
    /// `f32`.
    pub const F32: TypeTag = TypeTag::new(Kind::Float, 4);
    /// `f64`.
    pub const F64: TypeTag = TypeTag::new(Kind::Float, 8);
    /// A single text byte.
    pub const CHAR: TypeTag = TypeTag::new(Kind::Char, 1);
    /// A Unicode scalar value, stored as its 4-byte code point.
    pub const CHAR32: TypeTag = TypeTag::new(Kind::Char, 4);
    /// A single opaque byte.
    pub const BINARY: TypeTag = TypeTag::new(Kind::Binary, 1);

    /// The kind of the tagged value.
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Byte width of the value. Always 0 for no-size kinds.
    pub const fn size(&self) -> usize {
        self.size as usize
    }

    /// Position flags.
    pub const fn flags(&self) -> TagFlags {
        self.flags
    }

    /// `true` when the tag describes structure and carries no bytes of its own.
    pub const fn is_no_size(&self) -> bool {
        self.kind.is_no_size()
    }

    /// `true` for fixed-size primitives that can be dumped byte-for-byte.
    pub const fn is_primitive(&self) -> bool {
        !self.kind.is_no_size()
    }

    /// `true` when this tag opens or closes an array or struct.
    pub fn is_marker(&self) -> bool {
        self.flags.intersects(
            TagFlags::ARRAY_BEGIN
                | TagFlags::ARRAY_END
                | TagFlags::STRUCT_BEGIN
                | TagFlags::STRUCT_END,
        )
    }

    /// Copy of the tag with `flags` added.
    pub const fn with(self, flags: TagFlags) -> Self {
        Self {
            kind: self.kind,
            size: self.size,
            flags: self.flags.union(flags),
        }
    }

    /// Copy of the tag with every flag cleared.
    pub const fn plain(self) -> Self {
        Self {
            kind: self.kind,
            size: self.size,
            flags: TagFlags::empty(),
        }
    }

    /// The tag of an array of this element, marking its beginning.
    pub const fn array_begin(self) -> Self {
        self.plain().with(TagFlags::ARRAY_BEGIN)
    }

    /// The tag of an array of this element, marking its end.
    pub const fn array_end(self) -> Self {
        self.plain().with(TagFlags::ARRAY_END)
    }

    /// The tag of the `index`-th element of an array.
    pub const fn array_element(self, index: usize) -> Self {
        let tag = self.plain().with(TagFlags::ARRAY_ELEMENT);
        if index == 0 {
            tag.with(TagFlags::FIRST_ELEMENT)
        } else {
            tag
        }
    }
}
