//! Hierarchical stores backed by `.npz` archives.
//!
//! A store is a zip archive of `.npy` members. Member names are
//! `/`-delimited paths, so the archive forms a tree of groups. Datasets are
//! stored as `<path>.npy`, and an attribute `name` on a group is stored as
//! `<group>/@name.npy`. Groups are recorded as directory entries and are also
//! implied by the members below them. The archive loads with `numpy.load`.
//!
//! The whole archive is held in memory while the store is open and written
//! back by [`File::flush`] or [`File::close`].

mod archive;
mod attribute;
mod dataset;
mod group;
pub(crate) mod path;

pub use self::archive::Compression;
pub use self::attribute::Attribute;
pub use self::dataset::Dataset;
pub use self::group::Group;

use self::archive::Archive;
use crate::error::Result;
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io::{self, Read, Seek, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// An open store.
///
/// `File` dereferences to its root [`Group`]. Handles derived from it share
/// the same in-memory archive and may outlive the `File` value; the archive
/// is saved one last time (best effort) when the final handle is dropped.
///
/// # Example
///
/// ```no_run
/// use npz_store::File;
///
/// let file = File::create("run.npz")?;
/// let detector = file.create_group("detector")?;
/// let dataset = detector.create_dataset("gain", Default::default(), &[4, 1])?;
/// dataset.write_raw(&[1.0f64, 1.1, 0.9, 1.0], Default::default())?;
/// file.close()?;
/// # Ok::<_, npz_store::Error>(())
/// ```
pub struct File {
    root: Group,
}

impl File {
    fn from_archive(archive: Archive) -> File {
        File {
            root: Group::root(Rc::new(RefCell::new(archive))),
        }
    }

    /// Creates an empty read-write store at `path`, truncating any existing
    /// file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<File> {
        let mut archive = Archive::empty(Some(path.as_ref().to_owned()), true);
        archive.mark_modified();
        archive.flush()?;
        Ok(File::from_archive(archive))
    }

    /// Opens an existing store read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<File> {
        let reader = io::BufReader::new(fs::File::open(path.as_ref())?);
        let archive = Archive::load(reader, Some(path.as_ref().to_owned()), false)?;
        Ok(File::from_archive(archive))
    }

    /// Opens the store at `path` read-write, creating it if it doesn't exist.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<File> {
        let path = path.as_ref();
        match fs::File::open(path) {
            Ok(file) => {
                let archive = Archive::load(io::BufReader::new(file), Some(path.to_owned()), true)?;
                Ok(File::from_archive(archive))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => File::create(path),
            Err(err) => Err(err.into()),
        }
    }

    /// Creates an empty read-write store with no backing file.
    pub fn in_memory() -> File {
        File::from_archive(Archive::empty(None, true))
    }

    /// Loads a store read-only from any zip archive.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<File> {
        Ok(File::from_archive(Archive::load(reader, None, false)?))
    }

    /// Writes the whole store to `writer` as a zip archive and returns the
    /// writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        self.root.archive().borrow().save(writer)
    }

    /// Saves unsaved changes to the backing file, if any.
    pub fn flush(&self) -> Result<()> {
        self.root.archive().borrow_mut().flush()
    }

    /// Flushes the store and releases this handle.
    ///
    /// Dropping a `File` also flushes, but any error is only logged, so call
    /// `close` to handle errors.
    pub fn close(self) -> Result<()> {
        self.flush()
    }

    /// Sets the compression used by subsequent saves.
    ///
    /// Fails with [`Error::ReadOnly`](crate::Error::ReadOnly) on a store
    /// opened read-only.
    pub fn set_compression(&self, compression: Compression) -> Result<()> {
        let mut archive = self.root.archive().borrow_mut();
        archive.ensure_writable()?;
        if archive.compression != compression {
            archive.compression = compression;
            archive.mark_modified();
        }
        Ok(())
    }

    pub fn compression(&self) -> Compression {
        self.root.archive().borrow().compression
    }

    pub fn is_read_only(&self) -> bool {
        !self.root.archive().borrow().writable
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.root.archive().borrow().path.clone()
    }
}

impl Deref for File {
    type Target = Group;

    fn deref(&self) -> &Group {
        &self.root
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
