use super::type_tag::TypeTag;
use byteorder::{ByteOrder, LittleEndian};
use num_traits::ToPrimitive;
use py_literal::{
    FormatError as PyValueFormatError, ParseError as PyValueParseError, Value as PyValue,
};
use std::error::Error;
use std::fmt;
use std::io;

/// Magic string to indicate npy format.
const MAGIC_STRING: &[u8] = b"\x93NUMPY";

/// Header lengths are padded so that the data starts on this boundary.
const HEADER_ALIGN: usize = 64;

/// An error parsing the header of a stored array.
#[derive(Debug)]
pub enum ParseHeaderError {
    MagicString,
    Version {
        major: u8,
        minor: u8,
    },
    /// Non-ASCII in the array format string of a format 1.0 or 2.0 header.
    NonAscii,
    /// The array format string of a format 3.0 header is not UTF-8.
    Utf8Parse(std::str::Utf8Error),
    UnknownKey(PyValue),
    MissingKey(&'static str),
    IllegalValue {
        key: &'static str,
        value: PyValue,
    },
    /// The `descr` is not a numeric type supported by this crate.
    UnsupportedDescriptor(PyValue),
    DictParse(PyValueParseError),
    MetaNotDict(PyValue),
    MissingNewline,
}

impl Error for ParseHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseHeaderError::Utf8Parse(err) => Some(err),
            ParseHeaderError::DictParse(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ParseHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParseHeaderError::*;
        match self {
            MagicString => write!(f, "start does not match magic string"),
            Version { major, minor } => write!(f, "unknown version number: {}.{}", major, minor),
            NonAscii => write!(f, "non-ascii in array format string"),
            Utf8Parse(err) => write!(f, "error parsing array format string as UTF-8: {}", err),
            UnknownKey(key) => write!(f, "unknown key: {}", key),
            MissingKey(key) => write!(f, "missing key: {}", key),
            IllegalValue { key, value } => write!(f, "illegal value for key {}: {}", key, value),
            UnsupportedDescriptor(desc) => write!(f, "unsupported type descriptor: {}", desc),
            DictParse(err) => write!(f, "error parsing metadata dict: {}", err),
            MetaNotDict(value) => write!(f, "metadata is not a dict: {}", value),
            MissingNewline => write!(f, "newline missing at end of header"),
        }
    }
}

impl From<std::str::Utf8Error> for ParseHeaderError {
    fn from(err: std::str::Utf8Error) -> ParseHeaderError {
        ParseHeaderError::Utf8Parse(err)
    }
}

impl From<PyValueParseError> for ParseHeaderError {
    fn from(err: PyValueParseError) -> ParseHeaderError {
        ParseHeaderError::DictParse(err)
    }
}

/// An error formatting the header of an array.
#[derive(Debug)]
pub enum FormatHeaderError {
    PyValue(PyValueFormatError),
    /// The formatted header does not fit in a format 2.0 length field.
    TooLong(usize),
}

impl Error for FormatHeaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FormatHeaderError::PyValue(err) => Some(err),
            FormatHeaderError::TooLong(_) => None,
        }
    }
}

impl fmt::Display for FormatHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatHeaderError::PyValue(err) => write!(f, "error formatting Python value: {}", err),
            FormatHeaderError::TooLong(len) => write!(f, "header of {} bytes is too long", len),
        }
    }
}

impl From<PyValueFormatError> for FormatHeaderError {
    fn from(err: PyValueFormatError) -> FormatHeaderError {
        FormatHeaderError::PyValue(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Version {
    V1,
    V2,
    V3,
}

impl Version {
    fn from_bytes(major: u8, minor: u8) -> Result<Version, ParseHeaderError> {
        match (major, minor) {
            (1, 0) => Ok(Version::V1),
            (2, 0) => Ok(Version::V2),
            (3, 0) => Ok(Version::V3),
            (major, minor) => Err(ParseHeaderError::Version { major, minor }),
        }
    }

    fn major(self) -> u8 {
        match self {
            Version::V1 => 1,
            Version::V2 => 2,
            Version::V3 => 3,
        }
    }

    /// Width of the `HEADER_LEN` field.
    fn len_field_bytes(self) -> usize {
        match self {
            Version::V1 => 2,
            Version::V2 | Version::V3 => 4,
        }
    }

    /// Bytes preceding the array format string.
    fn prefix_len(self) -> usize {
        MAGIC_STRING.len() + 2 + self.len_field_bytes()
    }
}

/// Metadata preceding the raw values of a stored array.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub type_tag: TypeTag,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_py_value())
    }
}

impl Header {
    /// Number of elements described by `shape`, or `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len))
    }

    /// Length in bytes of the values following the header, or `None` on
    /// overflow.
    pub fn data_len(&self) -> Option<usize> {
        self.num_elements()?.checked_mul(self.type_tag.size())
    }

    fn from_py_value(value: PyValue) -> Result<Header, ParseHeaderError> {
        let dict = match value {
            PyValue::Dict(dict) => dict,
            other => return Err(ParseHeaderError::MetaNotDict(other)),
        };
        let mut type_tag = None;
        let mut fortran_order = None;
        let mut shape = None;
        for (key, value) in dict {
            let key = match key {
                PyValue::String(k) => k,
                other => return Err(ParseHeaderError::UnknownKey(other)),
            };
            match key.as_str() {
                "descr" => {
                    let tag = match &value {
                        PyValue::String(desc) => TypeTag::from_descriptor(desc),
                        _ => None,
                    };
                    type_tag = Some(tag.ok_or(ParseHeaderError::UnsupportedDescriptor(value))?);
                }
                "fortran_order" => match value {
                    PyValue::Boolean(b) => fortran_order = Some(b),
                    value => {
                        return Err(ParseHeaderError::IllegalValue {
                            key: "fortran_order",
                            value,
                        })
                    }
                },
                "shape" => {
                    let parsed: Option<Vec<usize>> = value.as_tuple().and_then(|elems| {
                        elems
                            .iter()
                            .map(|elem| elem.as_integer()?.to_usize())
                            .collect()
                    });
                    match parsed {
                        Some(s) => shape = Some(s),
                        None => {
                            return Err(ParseHeaderError::IllegalValue {
                                key: "shape",
                                value,
                            })
                        }
                    }
                }
                _ => return Err(ParseHeaderError::UnknownKey(PyValue::String(key))),
            }
        }
        let header = Header {
            type_tag: type_tag.ok_or(ParseHeaderError::MissingKey("descr"))?,
            fortran_order: fortran_order.ok_or(ParseHeaderError::MissingKey("fortran_order"))?,
            shape: shape.ok_or(ParseHeaderError::MissingKey("shape"))?,
        };
        if header.data_len().is_none() {
            return Err(ParseHeaderError::IllegalValue {
                key: "shape",
                value: header.shape_py_value(),
            });
        }
        Ok(header)
    }

    /// Reads the header, leaving `reader` positioned at the first value.
    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Header, ReadHeaderError> {
        let mut magic = [0; 6];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC_STRING {
            return Err(ParseHeaderError::MagicString.into());
        }

        let mut version = [0; 2];
        reader.read_exact(&mut version)?;
        let version = Version::from_bytes(version[0], version[1])?;

        let mut len_field = [0; 4];
        reader.read_exact(&mut len_field[..version.len_field_bytes()])?;
        let header_len = match version {
            Version::V1 => LittleEndian::read_u16(&len_field) as usize,
            Version::V2 | Version::V3 => LittleEndian::read_u32(&len_field) as usize,
        };

        let mut buf = vec![0; header_len];
        reader.read_exact(&mut buf)?;
        let dict_bytes = match buf.split_last() {
            Some((&b'\n', rest)) => rest,
            _ => return Err(ParseHeaderError::MissingNewline.into()),
        };
        let dict_str = match version {
            Version::V1 | Version::V2 if !dict_bytes.is_ascii() => {
                return Err(ParseHeaderError::NonAscii.into())
            }
            _ => std::str::from_utf8(dict_bytes).map_err(ParseHeaderError::from)?,
        };
        let dict: PyValue = dict_str.parse().map_err(ParseHeaderError::from)?;
        Ok(Header::from_py_value(dict)?)
    }

    fn to_py_value(&self) -> PyValue {
        PyValue::Dict(vec![
            (
                PyValue::String("descr".into()),
                PyValue::String(self.type_tag.descriptor()),
            ),
            (
                PyValue::String("fortran_order".into()),
                PyValue::Boolean(self.fortran_order),
            ),
            (PyValue::String("shape".into()), self.shape_py_value()),
        ])
    }

    fn shape_py_value(&self) -> PyValue {
        PyValue::Tuple(
            self.shape
                .iter()
                .map(|&len| PyValue::Integer(len.into()))
                .collect(),
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatHeaderError> {
        let mut dict = Vec::new();
        self.to_py_value().write_ascii(&mut dict)?;

        // One byte for the trailing newline.
        let unpadded = dict.len() + 1;
        let version = if Version::V1.prefix_len() + unpadded <= u16::MAX as usize {
            Version::V1
        } else if Version::V2.prefix_len() + unpadded <= u32::MAX as usize {
            Version::V2
        } else {
            return Err(FormatHeaderError::TooLong(unpadded));
        };
        let prefix_len = version.prefix_len();
        let padding = (HEADER_ALIGN - (prefix_len + unpadded) % HEADER_ALIGN) % HEADER_ALIGN;
        dict.resize(dict.len() + padding, b' ');
        dict.push(b'\n');

        let mut out = Vec::with_capacity(prefix_len + dict.len());
        out.extend_from_slice(MAGIC_STRING);
        out.push(version.major());
        out.push(0);
        let mut len_field = [0; 4];
        match version {
            Version::V1 => LittleEndian::write_u16(&mut len_field, dict.len() as u16),
            Version::V2 | Version::V3 => LittleEndian::write_u32(&mut len_field, dict.len() as u32),
        }
        out.extend_from_slice(&len_field[..version.len_field_bytes()]);
        out.extend_from_slice(&dict);
        debug_assert_eq!(out.len() % HEADER_ALIGN, 0);
        Ok(out)
    }
}

/// An error reading the header of a stored array.
#[derive(Debug)]
pub enum ReadHeaderError {
    Io(io::Error),
    Parse(ParseHeaderError),
}

impl From<io::Error> for ReadHeaderError {
    fn from(err: io::Error) -> ReadHeaderError {
        ReadHeaderError::Io(err)
    }
}

impl From<ParseHeaderError> for ReadHeaderError {
    fn from(err: ParseHeaderError) -> ReadHeaderError {
        ReadHeaderError::Parse(err)
    }
}
