//! On-disk element encodings.

use std::fmt;

/// Byte order of a multi-byte element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host.
    pub const NATIVE: Endianness = if cfg!(target_endian = "little") {
        Endianness::Little
    } else {
        Endianness::Big
    };
}

/// Numeric class of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// IEEE 754 floating point.
    Float,
    /// Two's complement signed integer.
    Integer,
    /// Unsigned integer.
    Unsigned,
}

impl TypeClass {
    fn kind_char(self) -> char {
        match self {
            TypeClass::Float => 'f',
            TypeClass::Integer => 'i',
            TypeClass::Unsigned => 'u',
        }
    }
}

/// Describes how elements are encoded on disk.
///
/// A tag is a (class, width, byte order) triple. It is paired with an
/// in-memory [`Element`](crate::Element) type at every read and write, and
/// the pair must agree in class and width; byte order may differ and is
/// converted.
///
/// The default tag is [`TypeTag::NATIVE_DOUBLE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    class: TypeClass,
    size: usize,
    endianness: Endianness,
}

impl TypeTag {
    pub const NATIVE_DOUBLE: TypeTag = TypeTag::native(TypeClass::Float, 8);
    pub const NATIVE_FLOAT: TypeTag = TypeTag::native(TypeClass::Float, 4);
    pub const NATIVE_INT8: TypeTag = TypeTag::native(TypeClass::Integer, 1);
    pub const NATIVE_INT16: TypeTag = TypeTag::native(TypeClass::Integer, 2);
    pub const NATIVE_INT32: TypeTag = TypeTag::native(TypeClass::Integer, 4);
    pub const NATIVE_INT64: TypeTag = TypeTag::native(TypeClass::Integer, 8);
    pub const NATIVE_UINT8: TypeTag = TypeTag::native(TypeClass::Unsigned, 1);
    pub const NATIVE_UINT16: TypeTag = TypeTag::native(TypeClass::Unsigned, 2);
    pub const NATIVE_UINT32: TypeTag = TypeTag::native(TypeClass::Unsigned, 4);
    pub const NATIVE_UINT64: TypeTag = TypeTag::native(TypeClass::Unsigned, 8);

    pub const IEEE_F32LE: TypeTag = TypeTag::raw(TypeClass::Float, 4, Endianness::Little);
    pub const IEEE_F32BE: TypeTag = TypeTag::raw(TypeClass::Float, 4, Endianness::Big);
    pub const IEEE_F64LE: TypeTag = TypeTag::raw(TypeClass::Float, 8, Endianness::Little);
    pub const IEEE_F64BE: TypeTag = TypeTag::raw(TypeClass::Float, 8, Endianness::Big);
    pub const STD_I16LE: TypeTag = TypeTag::raw(TypeClass::Integer, 2, Endianness::Little);
    pub const STD_I16BE: TypeTag = TypeTag::raw(TypeClass::Integer, 2, Endianness::Big);
    pub const STD_I32LE: TypeTag = TypeTag::raw(TypeClass::Integer, 4, Endianness::Little);
    pub const STD_I32BE: TypeTag = TypeTag::raw(TypeClass::Integer, 4, Endianness::Big);
    pub const STD_I64LE: TypeTag = TypeTag::raw(TypeClass::Integer, 8, Endianness::Little);
    pub const STD_I64BE: TypeTag = TypeTag::raw(TypeClass::Integer, 8, Endianness::Big);
    pub const STD_U16LE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 2, Endianness::Little);
    pub const STD_U16BE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 2, Endianness::Big);
    pub const STD_U32LE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 4, Endianness::Little);
    pub const STD_U32BE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 4, Endianness::Big);
    pub const STD_U64LE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 8, Endianness::Little);
    pub const STD_U64BE: TypeTag = TypeTag::raw(TypeClass::Unsigned, 8, Endianness::Big);

    const fn raw(class: TypeClass, size: usize, endianness: Endianness) -> TypeTag {
        TypeTag {
            class,
            size,
            endianness,
        }
    }

    const fn native(class: TypeClass, size: usize) -> TypeTag {
        TypeTag::raw(class, size, Endianness::NATIVE)
    }

    /// Returns a tag, or `None` if `size` is not a width supported for
    /// `class` (1, 2, 4 or 8 bytes for integers; 4 or 8 for floats).
    pub fn new(class: TypeClass, size: usize, endianness: Endianness) -> Option<TypeTag> {
        let supported = match class {
            TypeClass::Float => matches!(size, 4 | 8),
            TypeClass::Integer | TypeClass::Unsigned => matches!(size, 1 | 2 | 4 | 8),
        };
        if supported {
            // Single-byte elements have no byte order; normalize so that
            // equality doesn't depend on it.
            let endianness = if size == 1 {
                Endianness::NATIVE
            } else {
                endianness
            };
            Some(TypeTag::raw(class, size, endianness))
        } else {
            None
        }
    }

    pub fn class(&self) -> TypeClass {
        self.class
    }

    /// Width of one element in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Returns the same tag with the host byte order.
    pub fn to_native(self) -> TypeTag {
        TypeTag::raw(self.class, self.size, Endianness::NATIVE)
    }

    /// Returns `true` if values encoded with `self` and `other` have the same
    /// class and width, i.e. differ at most in byte order.
    pub fn is_compatible(&self, other: &TypeTag) -> bool {
        self.class == other.class && self.size == other.size
    }

    /// The `.npy` type descriptor, e.g. `<f8` or `|u1`.
    pub fn descriptor(&self) -> String {
        let order = if self.size == 1 {
            '|'
        } else {
            match self.endianness {
                Endianness::Little => '<',
                Endianness::Big => '>',
            }
        };
        format!("{}{}{}", order, self.class.kind_char(), self.size)
    }

    /// Parses a `.npy` type descriptor.
    ///
    /// Accepts an optional byte order prefix (`<`, `>`, `|` or `=`) followed
    /// by a kind (`f`, `i`, `u`) and a width in bytes, plus the one-character
    /// aliases `b` (`i1`) and `B` (`u1`). Returns `None` for anything else.
    pub fn from_descriptor(desc: &str) -> Option<TypeTag> {
        match desc {
            "b" => return Some(TypeTag::NATIVE_INT8),
            "B" => return Some(TypeTag::NATIVE_UINT8),
            _ => {}
        }
        let (endianness, rest) = match desc.as_bytes().first()? {
            b'<' => (Some(Endianness::Little), &desc[1..]),
            b'>' => (Some(Endianness::Big), &desc[1..]),
            b'|' | b'=' => (None, &desc[1..]),
            _ => (None, desc),
        };
        let mut chars = rest.chars();
        let class = match chars.next()? {
            'f' => TypeClass::Float,
            'i' => TypeClass::Integer,
            'u' => TypeClass::Unsigned,
            _ => return None,
        };
        let size: usize = chars.as_str().parse().ok()?;
        match endianness {
            Some(endianness) => TypeTag::new(class, size, endianness),
            // '|' is only valid for single-byte types; '=' and a bare kind
            // mean host byte order.
            None if desc.starts_with('|') && size != 1 => None,
            None => TypeTag::new(class, size, Endianness::NATIVE),
        }
    }
}

impl Default for TypeTag {
    fn default() -> TypeTag {
        TypeTag::NATIVE_DOUBLE
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}
