//! This crate reads and writes one-dimensional numeric sequences and scalar
//! attributes in hierarchical stores saved as [`.npz`] archives.
//!
//! [`.npz`]: https://numpy.org/doc/stable/reference/generated/numpy.savez.html
//!
//! A store ([`File`]) is a tree of [`Group`]s holding [`Dataset`]s (typed
//! n-dimensional arrays) and scalar [`Attribute`]s. Each dataset and
//! attribute is a [`.npy`] member of the archive, so stores written here load
//! with `numpy.load`.
//!
//! [`.npy`]: https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html
//!
//! See the [`bridge`] module for the sequence and attribute operations:
//!
//! ```
//! use npz_store::{bridge, File, TypeTag};
//!
//! let file = File::in_memory();
//! bridge::write_array(&[1.0, 2.0, 3.0], &file, "energy", "/run/energy")?;
//! let run = file.group("run")?;
//! bridge::write_scalar_attribute_as("channel", &7i32, &run, TypeTag::STD_I32BE)?;
//!
//! assert_eq!(file.dataset("/run/energy")?.shape(), &[3, 1]);
//! assert_eq!(bridge::read_scalar_attribute::<i32>("channel", &run)?, 7);
//! # Ok::<_, npz_store::Error>(())
//! ```
//!
//! # Element types
//!
//! Values are stored with an explicit [`TypeTag`] (numeric class, width and
//! byte order); the default is [`TypeTag::NATIVE_DOUBLE`]. The in-memory type
//! must implement [`Element`], which is implemented for the fixed-size
//! integers and floating point numbers. Every read and write checks that the
//! element type, the tag and the stored encoding agree in class and width,
//! and fails with [`Error::TypeMismatch`] otherwise. Byte order is converted.
//!
//! # Diagnostics
//!
//! Operations emit [`tracing`] events at `debug` level. Nothing is logged
//! unless the application installs a subscriber.
//!
//! # Cargo features
//!
//! * `compressed` (default): enables [`Compression::Deflated`].

mod error;
mod npy;
mod store;

pub mod bridge;
pub mod util;

pub use crate::error::{Error, Result};
pub use crate::npy::element::Element;
pub use crate::npy::header::{FormatHeaderError, ParseHeaderError};
pub use crate::npy::type_tag::{Endianness, TypeClass, TypeTag};
pub use crate::store::{Attribute, Compression, Dataset, File, Group};
