use super::archive::Archive;
use super::path;
use crate::error::{Error, Result};
use crate::npy::element::{check_tag, Element};
use crate::npy;
use crate::TypeTag;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A handle to a scalar attribute on a group. Released when dropped.
pub struct Attribute {
    archive: Rc<RefCell<Archive>>,
    key: String,
    name: String,
    type_tag: TypeTag,
}

impl Attribute {
    pub(super) fn new(
        archive: Rc<RefCell<Archive>>,
        key: String,
        name: String,
        type_tag: TypeTag,
    ) -> Attribute {
        Attribute {
            archive,
            key,
            name,
            type_tag,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The on-disk element encoding.
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    fn check<T: Element>(&self, tag: TypeTag) -> Result<()> {
        check_tag::<T>(tag)?;
        if tag.is_compatible(&self.type_tag) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                expected: tag,
                found: self.type_tag,
            })
        }
    }

    /// Reads the single stored value.
    pub fn read_scalar<T: Element>(&self, tag: TypeTag) -> Result<T> {
        self.check::<T>(tag)?;
        let archive = self.archive.borrow();
        let bytes = archive
            .member(&self.key)
            .ok_or_else(|| Error::NotFound(path::display(&self.key)))?;
        let (_, values) = npy::decode::<T>(bytes, tag)?;
        match values.as_slice() {
            [value] => Ok(*value),
            _ => Err(Error::InvalidArgument(format!(
                "attribute {} holds {} values, not one",
                self.name,
                values.len()
            ))),
        }
    }

    /// Overwrites the stored value. `tag` describes `value`; the stored
    /// encoding is kept.
    pub fn write_scalar<T: Element>(&self, value: &T, tag: TypeTag) -> Result<()> {
        self.check::<T>(tag)?;
        let bytes = npy::encode(&[*value], &[1], false, self.type_tag)?;
        self.archive.borrow_mut().replace_member(&self.key, bytes)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .finish()
    }
}
