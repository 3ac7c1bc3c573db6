use std::{fmt, io};

/// Errors raised while sniffing, validating or decoding a font file.
///
/// Parsers fail fast: the first error aborts the current table or face load
/// and bubbles up to the caller. There is no partial-success state for a
/// font load.
#[derive(Debug)]
pub enum ParseError {
    /// No parser recognized the file's magic bytes
    UnknownFileFormat,

    /// The format was recognized but a structural check on its container
    /// failed
    InvalidFileFormat {
        format: &'static str,
    },

    /// A table is internally inconsistent
    InvalidTable {
        table: &'static str,
    },

    /// An offset inside a table points outside its enclosing structure
    InvalidOffset {
        table: &'static str,
    },

    /// A table or record is smaller than its declared or minimum size
    TooShort {
        table: &'static str,
    },

    /// A field holds a value the format does not permit
    InvalidData {
        table: &'static str,
    },

    /// A glyph index is not below the face's glyph count
    InvalidGlyphId {
        glyph_id: u32,
        num_glyphs: u32,
    },

    /// A seek, skip or read would leave the stream's bounds
    InvalidStreamOperation {
        op: &'static str,
    },

    /// A caller-supplied index or parameter is out of range
    InvalidArgument {
        what: &'static str,
    },

    UnexpectedEof,

    /// The feature is intentionally not supported by this build
    Unimplemented {
        feature: &'static str,
    },

    IoError(io::Error),
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFileFormat => write!(f, "unknown font file format"),
            Self::InvalidFileFormat { format } => write!(f, "invalid {} file", format),
            Self::InvalidTable { table } => write!(f, "invalid `{}` table", table),
            Self::InvalidOffset { table } => write!(f, "out of bounds offset in `{}`", table),
            Self::TooShort { table } => write!(f, "`{}` table too short", table),
            Self::InvalidData { table } => write!(f, "invalid data in `{}`", table),
            Self::InvalidGlyphId {
                glyph_id,
                num_glyphs,
            } => write!(
                f,
                "glyph id {} out of range (face has {} glyphs)",
                glyph_id, num_glyphs
            ),
            Self::InvalidStreamOperation { op } => {
                write!(f, "stream operation `{}` out of bounds", op)
            }
            Self::InvalidArgument { what } => write!(f, "invalid argument: {}", what),
            Self::UnexpectedEof => write!(f, "unexpected eof"),
            Self::Unimplemented { feature } => write!(f, "{} is not supported", feature),
            Self::IoError(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for ParseError {}

pub type FontResult<T> = Result<T, ParseError>;
