//! Moving 1-D sequences and scalar attributes in and out of a store.
//!
//! Sequences are stored as column datasets of shape `(N, 1)`. Each operation
//! opens or creates exactly one dataset or attribute and releases it before
//! returning, whether it succeeds or fails.
//!
//! Every operation has a short form that encodes elements with their native
//! tag (for `f64` that is [`TypeTag::NATIVE_DOUBLE`]) and an `_as` form that
//! takes an explicit [`TypeTag`]. The element type and the tag must agree in
//! class and width; this is checked before the store is touched.

use crate::error::{Error, Result};
use crate::npy::element::{check_tag, Element};
use crate::store::Group;
use crate::TypeTag;
use tracing::debug;

/// Number of columns of a dataset written from a sequence.
const COLUMNS: usize = 1;

/// Reads the dataset at `path` as a flat sequence.
///
/// # Example
///
/// ```
/// use npz_store::{bridge, File};
///
/// let file = File::in_memory();
/// bridge::write_array(&[0.5, 1.5, 2.5], &file, "samples", "/samples")?;
/// let samples: Vec<f64> = bridge::read_array(&file, "/samples")?;
/// assert_eq!(samples, [0.5, 1.5, 2.5]);
/// # Ok::<_, npz_store::Error>(())
/// ```
pub fn read_array<T: Element>(loc: &Group, path: &str) -> Result<Vec<T>> {
    read_array_as(loc, path, T::NATIVE)
}

/// Reads the dataset at `path` as a flat sequence, with the element encoding
/// described by `tag`.
///
/// The result has exactly as many elements as the dataset's shape describes.
pub fn read_array_as<T: Element>(loc: &Group, path: &str, tag: TypeTag) -> Result<Vec<T>> {
    check_tag::<T>(tag)?;
    let dataset = loc.dataset(path)?;
    dataset.read_raw(tag)
}

/// Writes `values` to a new `(len, 1)` dataset at `path`.
///
/// `name` labels the dataset in diagnostics.
pub fn write_array<T: Element>(values: &[T], loc: &Group, name: &str, path: &str) -> Result<()> {
    write_array_as(values, loc, name, path, T::NATIVE)
}

/// Writes `values` to a new `(len, 1)` dataset at `path`, encoded as `tag`.
///
/// Fails with [`Error::AlreadyExists`] if anything exists at `path`, leaving
/// it untouched, and with [`Error::InvalidArgument`] if `values` is empty.
pub fn write_array_as<T: Element>(
    values: &[T],
    loc: &Group,
    name: &str,
    path: &str,
    tag: TypeTag,
) -> Result<()> {
    check_tag::<T>(tag)?;
    if values.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "empty sequence {:?} cannot be written to {:?}",
            name, path
        )));
    }
    debug!(
        "Creating Dataset: {} at {} ({} x {})",
        name,
        path,
        values.len(),
        COLUMNS
    );
    let dataset = loc.create_dataset(path, tag, &[values.len(), COLUMNS])?;
    dataset.write_raw(values, tag)
}

/// Attaches a new scalar attribute `name` holding `value` to `group`.
pub fn write_scalar_attribute<T: Element>(name: &str, value: &T, group: &Group) -> Result<()> {
    write_scalar_attribute_as(name, value, group, T::NATIVE)
}

/// Attaches a new scalar attribute `name` holding `value`, encoded as `tag`,
/// to `group`.
///
/// Fails with [`Error::AlreadyExists`] if the group already has an attribute
/// called `name`.
pub fn write_scalar_attribute_as<T: Element>(
    name: &str,
    value: &T,
    group: &Group,
    tag: TypeTag,
) -> Result<()> {
    check_tag::<T>(tag)?;
    debug!("Creating Attribute: {} = {}", name, value);
    let attr = group.create_attr(name, tag)?;
    attr.write_scalar(value, tag)
}

/// Reads the scalar attribute `name` of `group`.
pub fn read_scalar_attribute<T: Element>(name: &str, group: &Group) -> Result<T> {
    read_scalar_attribute_as(name, group, T::NATIVE)
}

/// Reads the scalar attribute `name` of `group`, with the element encoding
/// described by `tag`.
pub fn read_scalar_attribute_as<T: Element>(name: &str, group: &Group, tag: TypeTag) -> Result<T> {
    check_tag::<T>(tag)?;
    let value = group.attr(name)?.read_scalar(tag)?;
    debug!("Reading Attribute: {} = {}", name, value);
    Ok(value)
}
