use super::archive::Archive;
use super::path;
use crate::error::{Error, Result};
use crate::npy::element::{check_tag, Element};
use crate::npy::header::Header;
use crate::npy;
use crate::TypeTag;
use ndarray::prelude::*;
use ndarray::Data;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A handle to a dataset.
///
/// The handle remembers the shape and encoding the dataset had when it was
/// opened. It is released when dropped.
pub struct Dataset {
    archive: Rc<RefCell<Archive>>,
    key: String,
    header: Header,
    size: usize,
}

impl Dataset {
    pub(super) fn new(
        archive: Rc<RefCell<Archive>>,
        key: String,
        header: Header,
    ) -> Result<Dataset> {
        let size = header.num_elements().ok_or_else(|| {
            Error::InvalidArgument(format!("shape {:?} overflows", header.shape))
        })?;
        Ok(Dataset {
            archive,
            key,
            header,
            size,
        })
    }

    /// The absolute path of the dataset.
    pub fn name(&self) -> String {
        path::display(&self.key)
    }

    pub fn shape(&self) -> &[usize] {
        &self.header.shape
    }

    pub fn ndim(&self) -> usize {
        self.header.shape.len()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The on-disk element encoding.
    pub fn type_tag(&self) -> TypeTag {
        self.header.type_tag
    }

    /// Checks that `T`, `tag` and the stored encoding agree.
    fn check<T: Element>(&self, tag: TypeTag) -> Result<()> {
        check_tag::<T>(tag)?;
        if tag.is_compatible(&self.header.type_tag) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: tag,
                found: self.header.type_tag,
            })
        }
    }

    fn with_bytes<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&[u8]) -> Result<R>,
    {
        let archive = self.archive.borrow();
        let bytes = archive
            .member(&self.key)
            .ok_or_else(|| Error::NotFound(self.name()))?;
        f(bytes)
    }

    /// Reads all elements in stored order.
    pub fn read_raw<T: Element>(&self, tag: TypeTag) -> Result<Vec<T>> {
        self.check::<T>(tag)?;
        self.with_bytes(|bytes| Ok(npy::decode::<T>(bytes, tag)?.1))
    }

    /// Reads the dataset as an array of dimensionality `D`.
    pub fn read<T: Element, D: Dimension>(&self, tag: TypeTag) -> Result<Array<T, D>> {
        self.check::<T>(tag)?;
        self.with_bytes(|bytes| npy::decode_array(bytes, tag))
    }

    /// Reads the dataset as an array of dynamic dimensionality.
    pub fn read_dyn<T: Element>(&self, tag: TypeTag) -> Result<ArrayD<T>> {
        self.read(tag)
    }

    /// Overwrites all elements. `values` must hold exactly
    /// [`size`](Dataset::size) elements in standard (row-major) order.
    ///
    /// `tag` describes `values`; the stored encoding is kept.
    pub fn write_raw<T: Element>(&self, values: &[T], tag: TypeTag) -> Result<()> {
        self.check::<T>(tag)?;
        if values.len() != self.size() {
            return Err(Error::InvalidArgument(format!(
                "{} values written to {} with {} elements",
                values.len(),
                self.name(),
                self.size()
            )));
        }
        let bytes = npy::encode(values, &self.header.shape, false, self.header.type_tag)?;
        self.archive.borrow_mut().replace_member(&self.key, bytes)
    }

    /// Overwrites all elements from an array with the dataset's shape.
    pub fn write<A, S, D>(&self, array: &ArrayBase<S, D>, tag: TypeTag) -> Result<()>
    where
        A: Element,
        S: Data<Elem = A>,
        D: Dimension,
    {
        self.check::<A>(tag)?;
        if array.shape() != self.shape() {
            return Err(Error::InvalidArgument(format!(
                "array of shape {:?} written to {} with shape {:?}",
                array.shape(),
                self.name(),
                self.shape()
            )));
        }
        let bytes = npy::encode_array(array, self.header.type_tag)?;
        self.archive.borrow_mut().replace_member(&self.key, bytes)
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.name())
            .field("shape", &self.header.shape)
            .field("type_tag", &self.header.type_tag)
            .finish()
    }
}
