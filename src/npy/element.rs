//! In-memory element types and their pairing with on-disk tags.

use super::type_tag::{Endianness, TypeTag};
use crate::error::{Error, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io;

mod private {
    pub trait Sealed {}
}

/// A fixed-width numeric type that can be stored in a dataset or attribute.
///
/// This trait is sealed; it is implemented for `i8`, `i16`, `i32`, `i64`,
/// `u8`, `u16`, `u32`, `u64`, `f32` and `f64`.
pub trait Element: Copy + Default + fmt::Debug + fmt::Display + private::Sealed + 'static {
    /// The tag describing this type in host byte order.
    const NATIVE: TypeTag;

    /// Fills `out` from `reader`, decoding with the given byte order.
    #[doc(hidden)]
    fn read_into<R: io::Read>(reader: R, endianness: Endianness, out: &mut [Self])
        -> io::Result<()>;

    /// Writes `values` to `writer`, encoding with the given byte order.
    #[doc(hidden)]
    fn write_all<W: io::Write>(writer: W, endianness: Endianness, values: &[Self])
        -> io::Result<()>;
}

/// Returns `Ok(_)` iff `tag` encodes values of type `T` (same class and
/// width; byte order is free).
pub(crate) fn check_tag<T: Element>(tag: TypeTag) -> Result<()> {
    if T::NATIVE.is_compatible(&tag) {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: tag,
            found: T::NATIVE,
        })
    }
}

macro_rules! impl_element_one_byte {
    ($elem:ty, $tag:expr, $read_into:ident, $write:ident) => {
        impl private::Sealed for $elem {}

        impl Element for $elem {
            const NATIVE: TypeTag = $tag;

            fn read_into<R: io::Read>(
                mut reader: R,
                _endianness: Endianness,
                out: &mut [Self],
            ) -> io::Result<()> {
                reader.$read_into(out)
            }

            fn write_all<W: io::Write>(
                mut writer: W,
                _endianness: Endianness,
                values: &[Self],
            ) -> io::Result<()> {
                for &value in values {
                    writer.$write(value)?;
                }
                Ok(())
            }
        }
    };
}

macro_rules! impl_element_multi_byte {
    ($elem:ty, $tag:expr, $read_into:ident, $write:ident) => {
        impl private::Sealed for $elem {}

        impl Element for $elem {
            const NATIVE: TypeTag = $tag;

            fn read_into<R: io::Read>(
                mut reader: R,
                endianness: Endianness,
                out: &mut [Self],
            ) -> io::Result<()> {
                match endianness {
                    Endianness::Little => reader.$read_into::<LittleEndian>(out),
                    Endianness::Big => reader.$read_into::<BigEndian>(out),
                }
            }

            fn write_all<W: io::Write>(
                mut writer: W,
                endianness: Endianness,
                values: &[Self],
            ) -> io::Result<()> {
                match endianness {
                    Endianness::Little => {
                        for &value in values {
                            writer.$write::<LittleEndian>(value)?;
                        }
                    }
                    Endianness::Big => {
                        for &value in values {
                            writer.$write::<BigEndian>(value)?;
                        }
                    }
                }
                Ok(())
            }
        }
    };
}

impl_element_one_byte!(i8, TypeTag::NATIVE_INT8, read_i8_into, write_i8);
impl_element_one_byte!(u8, TypeTag::NATIVE_UINT8, read_exact, write_u8);

impl_element_multi_byte!(i16, TypeTag::NATIVE_INT16, read_i16_into, write_i16);
impl_element_multi_byte!(i32, TypeTag::NATIVE_INT32, read_i32_into, write_i32);
impl_element_multi_byte!(i64, TypeTag::NATIVE_INT64, read_i64_into, write_i64);

impl_element_multi_byte!(u16, TypeTag::NATIVE_UINT16, read_u16_into, write_u16);
impl_element_multi_byte!(u32, TypeTag::NATIVE_UINT32, read_u32_into, write_u32);
impl_element_multi_byte!(u64, TypeTag::NATIVE_UINT64, read_u64_into, write_u64);

impl_element_multi_byte!(f32, TypeTag::NATIVE_FLOAT, read_f32_into, write_f32);
impl_element_multi_byte!(f64, TypeTag::NATIVE_DOUBLE, read_f64_into, write_f64);
