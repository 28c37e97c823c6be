//! In-memory image of a store and its zip serialization.

use super::path;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Suffix of every array member in the archive.
const NPY_SUFFIX: &str = ".npy";

/// Upper bound on the buffer reserved up front for one member. The size
/// declared in the zip directory is not trusted beyond this.
const CAPACITY_HINT_LIMIT: u64 = 1 << 20;

/// How members are compressed when a store is saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// No compression, as written by `numpy.savez`.
    Stored,
    /// Deflate, as written by `numpy.savez_compressed`.
    #[cfg(feature = "compressed")]
    Deflated,
}

impl Default for Compression {
    fn default() -> Compression {
        Compression::Stored
    }
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            #[cfg(feature = "compressed")]
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

pub(crate) struct Archive {
    /// File the archive is saved to on flush.
    pub(crate) path: Option<PathBuf>,
    pub(crate) writable: bool,
    pub(crate) compression: Compression,
    /// Keys of all groups except the root.
    groups: BTreeSet<String>,
    /// Encoded datasets and attributes by key.
    members: BTreeMap<String, Vec<u8>>,
    modified: bool,
}

impl Archive {
    pub(crate) fn empty(path: Option<PathBuf>, writable: bool) -> Archive {
        Archive {
            path,
            writable,
            compression: Compression::default(),
            groups: BTreeSet::new(),
            members: BTreeMap::new(),
            modified: false,
        }
    }

    /// Reads every member of the zip archive in `reader`.
    pub(crate) fn load<R: Read + Seek>(
        reader: R,
        path: Option<PathBuf>,
        writable: bool,
    ) -> Result<Archive> {
        let mut zip = ZipArchive::new(reader)?;
        let mut archive = Archive::empty(path, writable);
        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            let name = file.name().to_owned();
            if file.is_dir() {
                let key = name.trim_end_matches('/');
                if !key.is_empty() {
                    if !path::check_member_key(key) || path::is_attr_key(key) {
                        return Err(Error::UnsupportedEntry(name));
                    }
                    archive.add_group(key);
                }
                continue;
            }
            let key = match name.strip_suffix(NPY_SUFFIX) {
                Some(key) if path::check_member_key(key) => key.to_owned(),
                _ => return Err(Error::UnsupportedEntry(name)),
            };
            let declared = file.size();
            let mut bytes = Vec::with_capacity(declared.min(CAPACITY_HINT_LIMIT) as usize);
            file.read_to_end(&mut bytes)?;
            if bytes.len() as u64 != declared {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{} holds {} bytes but declares {}",
                        name,
                        bytes.len(),
                        declared
                    ),
                )));
            }
            let (parent, _) = path::split_last(&key);
            if !parent.is_empty() {
                archive.add_group(parent);
            }
            archive.members.insert(key, bytes);
        }
        if let Some(key) = archive
            .members
            .keys()
            .find(|key| archive.groups.contains(*key))
        {
            return Err(Error::UnsupportedEntry(format!("{}{}", key, NPY_SUFFIX)));
        }
        debug!(
            groups = archive.groups.len(),
            members = archive.members.len(),
            "loaded store"
        );
        Ok(archive)
    }

    /// Writes the archive as a zip file, returning the writer.
    pub(crate) fn save<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(self.compression.method());
        for group in &self.groups {
            zip.add_directory(format!("{}/", group), options)?;
        }
        for (key, bytes) in &self.members {
            zip.start_file(format!("{}{}", key, NPY_SUFFIX), options)?;
            zip.write_all(bytes)?;
        }
        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(writer)
    }

    /// Saves to the backing file if there are unsaved changes. A read-only
    /// archive is never saved.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if !self.modified || !self.writable {
            return Ok(());
        }
        if let Some(path) = &self.path {
            let file = fs::File::create(path)?;
            self.save(io::BufWriter::new(file))?;
            debug!(path = %path.display(), members = self.members.len(), "saved store");
        }
        self.modified = false;
        Ok(())
    }

    pub(crate) fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.writable {
            Ok(())
        } else {
            Err(Error::ReadOnly)
        }
    }

    fn add_group(&mut self, key: &str) {
        for ancestor in path::ancestors(key) {
            self.groups.insert(ancestor.to_owned());
        }
        self.groups.insert(key.to_owned());
    }

    pub(crate) fn is_group(&self, key: &str) -> bool {
        key.is_empty() || self.groups.contains(key)
    }

    pub(crate) fn exists(&self, key: &str) -> bool {
        self.is_group(key) || self.members.contains_key(key)
    }

    pub(crate) fn member(&self, key: &str) -> Option<&[u8]> {
        self.members.get(key).map(Vec::as_slice)
    }

    /// Creates the group `key` and any missing ancestors.
    pub(crate) fn create_group(&mut self, key: &str) -> Result<()> {
        self.ensure_writable()?;
        if self.exists(key) {
            return Err(Error::AlreadyExists(path::display(key)));
        }
        self.create_ancestors(key)?;
        self.groups.insert(key.to_owned());
        self.modified = true;
        Ok(())
    }

    fn create_ancestors(&mut self, key: &str) -> Result<()> {
        let (parent, _) = path::split_last(key);
        if let Some(blocker) = path::ancestors(key)
            .chain(Some(parent))
            .find(|ancestor| self.members.contains_key(*ancestor))
        {
            return Err(Error::InvalidArgument(format!(
                "{} is a dataset, not a group",
                path::display(blocker)
            )));
        }
        if !parent.is_empty() {
            self.add_group(parent);
        }
        Ok(())
    }

    /// Adds a new dataset or attribute. Fails if anything exists at `key`.
    pub(crate) fn insert_member(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.ensure_writable()?;
        if key.is_empty() || self.exists(key) {
            return Err(Error::AlreadyExists(path::display(key)));
        }
        self.create_ancestors(key)?;
        self.members.insert(key.to_owned(), bytes);
        self.modified = true;
        Ok(())
    }

    /// Replaces the contents of an existing dataset or attribute.
    pub(crate) fn replace_member(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.ensure_writable()?;
        match self.members.get_mut(key) {
            Some(slot) => {
                *slot = bytes;
                self.modified = true;
                Ok(())
            }
            None => Err(Error::NotFound(path::display(key))),
        }
    }

    /// Names of the groups and datasets directly below `group`.
    pub(crate) fn children(&self, group: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .iter()
            .map(String::as_str)
            .chain(self.members.keys().map(String::as_str))
            .filter(|key| !path::is_attr_key(key))
            .filter_map(|key| match path::split_last(key) {
                (parent, name) if parent == group => Some(name.to_owned()),
                _ => None,
            })
            .collect();
        names.sort();
        names
    }

    /// Names of the attributes attached to `group`, without the marker.
    pub(crate) fn attr_names(&self, group: &str) -> Vec<String> {
        self.members
            .keys()
            .filter_map(|key| match path::split_last(key) {
                (parent, name) if parent == group => name.strip_prefix(path::ATTR_MARKER),
                _ => None,
            })
            .map(str::to_owned)
            .collect()
    }
}

impl Drop for Archive {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "failed to save store on drop");
        }
    }
}
