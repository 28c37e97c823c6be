//! Encoding of typed payloads as `.npy` members.

pub mod element;
pub mod header;
pub mod type_tag;

use self::element::{check_tag, Element};
use self::header::Header;
use self::type_tag::TypeTag;
use crate::error::{Error, Result};
use ndarray::prelude::*;
use ndarray::{Data, ShapeBuilder};
use std::cmp::Ordering;

/// Parses the header of an encoded member and returns it together with the
/// bytes that follow it.
pub(crate) fn split_header(bytes: &[u8]) -> Result<(Header, &[u8])> {
    let mut rest = bytes;
    let header = Header::from_reader(&mut rest)?;
    Ok((header, rest))
}

fn overflow(shape: &[usize]) -> Error {
    Error::InvalidArgument(format!("shape {:?} overflows", shape))
}

/// Returns the number of elements iff a payload of `data_len` bytes holds
/// exactly the elements described by `header`.
fn check_data_len(header: &Header, data_len: usize) -> Result<usize> {
    let needed = header.data_len().ok_or_else(|| overflow(&header.shape))?;
    match data_len.cmp(&needed) {
        Ordering::Equal => Ok(needed / header.type_tag.size()),
        Ordering::Greater => Err(Error::ExtraBytes(data_len - needed)),
        Ordering::Less => Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into())),
    }
}

/// Encodes `values` (in standard or Fortran order) under `tag`.
pub(crate) fn encode<T: Element>(
    values: &[T],
    shape: &[usize],
    fortran_order: bool,
    tag: TypeTag,
) -> Result<Vec<u8>> {
    check_tag::<T>(tag)?;
    let header = Header {
        type_tag: tag,
        fortran_order,
        shape: shape.to_vec(),
    };
    if header.data_len().is_none() {
        return Err(overflow(shape));
    }
    if header.num_elements() != Some(values.len()) {
        return Err(Error::InvalidArgument(format!(
            "{} values do not fill shape {:?}",
            values.len(),
            shape
        )));
    }
    let mut out = header.to_bytes()?;
    out.reserve(values.len() * tag.size());
    T::write_all(&mut out, tag.endianness(), values)?;
    Ok(out)
}

/// Encodes a zero-filled array. Zero has the same bytes in every supported
/// encoding.
pub(crate) fn encode_zeroed(shape: &[usize], tag: TypeTag) -> Result<Vec<u8>> {
    let header = Header {
        type_tag: tag,
        fortran_order: false,
        shape: shape.to_vec(),
    };
    let data_len = header.data_len().ok_or_else(|| overflow(shape))?;
    let mut out = header.to_bytes()?;
    out.resize(out.len() + data_len, 0);
    Ok(out)
}

/// Encodes an array of any layout under `tag`.
pub(crate) fn encode_array<A, S, D>(array: &ArrayBase<S, D>, tag: TypeTag) -> Result<Vec<u8>>
where
    A: Element,
    S: Data<Elem = A>,
    D: Dimension,
{
    if let Some(values) = array.as_slice() {
        encode(values, array.shape(), false, tag)
    } else if array.t().is_standard_layout() {
        let values = array.as_slice_memory_order().unwrap_or_default();
        encode(values, array.shape(), true, tag)
    } else {
        let values: Vec<A> = array.iter().copied().collect();
        encode(&values, array.shape(), false, tag)
    }
}

/// Decodes an encoded member as a flat `Vec` in stored order.
///
/// `T` must agree with `tag`, and the stored type must agree with `tag`;
/// byte order is converted. Nothing is allocated for the values until the
/// header and payload length have been validated.
pub(crate) fn decode<T: Element>(bytes: &[u8], tag: TypeTag) -> Result<(Header, Vec<T>)> {
    check_tag::<T>(tag)?;
    let (header, data) = split_header(bytes)?;
    if !header.type_tag.is_compatible(&tag) {
        return Err(Error::TypeMismatch {
            expected: tag,
            found: header.type_tag,
        });
    }
    let len = check_data_len(&header, data.len())?;
    let mut out = vec![T::default(); len];
    T::read_into(data, header.type_tag.endianness(), &mut out)?;
    Ok((header, out))
}

/// Decodes an encoded member as an n-dimensional array.
pub(crate) fn decode_array<T, D>(bytes: &[u8], tag: TypeTag) -> Result<Array<T, D>>
where
    T: Element,
    D: Dimension,
{
    let (header, values) = decode::<T>(bytes, tag)?;
    let shape = header.shape.set_f(header.fortran_order);
    Ok(ArrayD::from_shape_vec(shape, values)?.into_dimensionality()?)
}
