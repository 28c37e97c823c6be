use super::archive::Archive;
use super::attribute::Attribute;
use super::dataset::Dataset;
use super::path;
use crate::error::{Error, Result};
use crate::npy::{self, split_header};
use crate::TypeTag;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A group within a store: the root, or a named sub-group.
///
/// Paths passed to a group are relative to it unless they start with `/`.
/// Cloning a `Group` clones the handle, not the group.
#[derive(Clone)]
pub struct Group {
    archive: Rc<RefCell<Archive>>,
    key: String,
}

impl Group {
    pub(super) fn root(archive: Rc<RefCell<Archive>>) -> Group {
        Group {
            archive,
            key: String::new(),
        }
    }

    pub(super) fn archive(&self) -> &Rc<RefCell<Archive>> {
        &self.archive
    }

    /// The absolute path of the group, `/` for the root.
    pub fn name(&self) -> String {
        path::display(&self.key)
    }

    /// Returns `true` if a group, dataset or attribute exists at `path`.
    /// Malformed paths don't exist.
    pub fn link_exists(&self, path: &str) -> bool {
        match path::resolve(&self.key, path) {
            Ok(key) => self.archive.borrow().exists(&key),
            Err(_) => false,
        }
    }

    /// Creates a group at `path`, including missing intermediate groups.
    pub fn create_group(&self, path: &str) -> Result<Group> {
        let key = path::resolve(&self.key, path)?;
        self.archive.borrow_mut().create_group(&key)?;
        Ok(self.with_key(key))
    }

    /// Opens the existing group at `path`.
    pub fn group(&self, path: &str) -> Result<Group> {
        let key = path::resolve(&self.key, path)?;
        if self.archive.borrow().is_group(&key) {
            Ok(self.with_key(key))
        } else {
            Err(Error::NotFound(path::display(&key)))
        }
    }

    /// Names of the groups and datasets directly in this group, sorted.
    pub fn member_names(&self) -> Vec<String> {
        self.archive.borrow().children(&self.key)
    }

    /// Names of the attributes attached to this group, sorted.
    pub fn attr_names(&self) -> Vec<String> {
        self.archive.borrow().attr_names(&self.key)
    }

    /// Creates a zero-filled dataset at `path` with the given element
    /// encoding and shape. Missing intermediate groups are created.
    pub fn create_dataset(&self, path: &str, tag: TypeTag, shape: &[usize]) -> Result<Dataset> {
        let key = path::resolve(&self.key, path)?;
        let bytes = npy::encode_zeroed(shape, tag)?;
        let (header, _) = split_header(&bytes)?;
        self.archive.borrow_mut().insert_member(&key, bytes)?;
        Dataset::new(self.archive.clone(), key, header)
    }

    /// Opens the existing dataset at `path`.
    pub fn dataset(&self, path: &str) -> Result<Dataset> {
        let key = path::resolve(&self.key, path)?;
        let archive = self.archive.borrow();
        let bytes = archive
            .member(&key)
            .ok_or_else(|| Error::NotFound(path::display(&key)))?;
        let (header, _) = split_header(bytes)?;
        Dataset::new(self.archive.clone(), key, header)
    }

    /// Creates a scalar attribute `name` (shape `(1,)`, zero-valued) on this
    /// group.
    pub fn create_attr(&self, name: &str, tag: TypeTag) -> Result<Attribute> {
        let key = path::attr_key(&self.key, name)?;
        let bytes = npy::encode_zeroed(&[1], tag)?;
        self.archive.borrow_mut().insert_member(&key, bytes)?;
        Ok(Attribute::new(self.archive.clone(), key, name.to_owned(), tag))
    }

    /// Opens the existing attribute `name` on this group.
    pub fn attr(&self, name: &str) -> Result<Attribute> {
        let key = path::attr_key(&self.key, name)?;
        let archive = self.archive.borrow();
        let bytes = archive
            .member(&key)
            .ok_or_else(|| Error::NotFound(path::display(&key)))?;
        let (header, _) = split_header(bytes)?;
        Ok(Attribute::new(
            self.archive.clone(),
            key,
            name.to_owned(),
            header.type_tag,
        ))
    }

    fn with_key(&self, key: String) -> Group {
        Group {
            archive: self.archive.clone(),
            key,
        }
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Group").field("name", &self.name()).finish()
    }
}
