use crate::npy::header::{FormatHeaderError, ParseHeaderError, ReadHeaderError};
use crate::TypeTag;
use ndarray::ShapeError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use zip::result::ZipError;

/// An error reading from or writing to a store.
#[derive(Debug)]
pub enum Error {
    /// No dataset, group or attribute exists at the path.
    NotFound(String),
    /// A dataset, group or attribute already exists at the path.
    AlreadyExists(String),
    /// Degenerate input, such as an empty sequence or a malformed path.
    InvalidArgument(String),
    /// The in-memory element type, the requested tag and the stored type
    /// disagree in class or width.
    TypeMismatch { expected: TypeTag, found: TypeTag },
    /// A write was attempted on a store opened read-only.
    ReadOnly,
    /// The archive contains a member that is neither a directory nor a
    /// `.npy` file.
    UnsupportedEntry(String),
    /// The stored data is longer than its header says.
    ExtraBytes(usize),
    ParseHeader(ParseHeaderError),
    FormatHeader(FormatHeaderError),
    Shape(ShapeError),
    Io(io::Error),
    Zip(ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ParseHeader(err) => Some(err),
            Error::FormatHeader(err) => Some(err),
            Error::Shape(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Zip(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "not found: {}", path),
            Error::AlreadyExists(path) => write!(f, "already exists: {}", path),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Error::ReadOnly => write!(f, "store is opened read-only"),
            Error::UnsupportedEntry(name) => write!(f, "unsupported archive member: {}", name),
            Error::ExtraBytes(num) => write!(f, "data has {} unexpected extra bytes", num),
            Error::ParseHeader(err) => write!(f, "error parsing array header: {}", err),
            Error::FormatHeader(err) => write!(f, "error formatting array header: {}", err),
            Error::Shape(err) => write!(f, "data did not match shape in header: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Zip(err) => write!(f, "zip file error: {}", err),
        }
    }
}

impl From<ParseHeaderError> for Error {
    fn from(err: ParseHeaderError) -> Error {
        Error::ParseHeader(err)
    }
}

impl From<ReadHeaderError> for Error {
    fn from(err: ReadHeaderError) -> Error {
        match err {
            ReadHeaderError::Io(err) => Error::Io(err),
            ReadHeaderError::Parse(err) => Error::ParseHeader(err),
        }
    }
}

impl From<FormatHeaderError> for Error {
    fn from(err: FormatHeaderError) -> Error {
        Error::FormatHeader(err)
    }
}

impl From<ShapeError> for Error {
    fn from(err: ShapeError) -> Error {
        Error::Shape(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ZipError> for Error {
    fn from(err: ZipError) -> Error {
        Error::Zip(err)
    }
}
