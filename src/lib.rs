//! Parsers for several classic font container formats: PFR (Portable Font
//! Resource), Type 1 (PFA/PFB), Type 42 and TrueType.
//!
//! The crate is organized around a small byte [`stream`] engine with
//! bounds-checked frames, a table-driven field reader, and per-format
//! structural parsers on top. Faces expose char-code lookup, forward
//! iteration over their character maps, kerning and glyph loading; no
//! rasterization or hinting happens here.

pub use crate::error::{FontResult, ParseError};

pub mod error;
pub mod geometry;
pub mod pfr;
pub mod psnames;
pub mod stream;
pub mod truetype;
pub mod type1;
pub mod type42;

pub(crate) mod lex;

/// A loaded font file, dispatched by its magic bytes.
#[derive(Debug)]
pub enum FontFile<'a> {
    Pfr(pfr::PfrFace<'a>),
    Type1(type1::Type1Face),
    Type42(type42::Type42Face),
    TrueType(truetype::TrueTypeFace),
}

impl<'a> FontFile<'a> {
    /// Sniffs the format and loads the first face of the file.
    pub fn load(data: &'a [u8]) -> FontResult<Self> {
        if data.starts_with(b"PFR0") {
            return Ok(Self::Pfr(pfr::PfrFace::load(
                stream::Stream::from_bytes(data),
                0,
            )?));
        }

        if data.starts_with(&0x00010000u32.to_be_bytes()) || data.starts_with(b"true") {
            return Ok(Self::TrueType(truetype::TrueTypeFace::parse(
                data.to_vec(),
            )?));
        }

        if data.starts_with(b"ttcf") {
            return Err(ParseError::Unimplemented {
                feature: "TrueType collections",
            });
        }

        if data.first() == Some(&0x80) {
            return Ok(Self::Type1(type1::Type1Face::parse(data)?));
        }

        if data.starts_with(b"%!") {
            // a Type 42 program is Type 1-shaped on the outside; the sfnts
            // array is what tells them apart
            if data.windows(6).any(|w| w == b"/sfnts") {
                return Ok(Self::Type42(type42::Type42Face::parse(data)?));
            }
            return Ok(Self::Type1(type1::Type1Face::parse(data)?));
        }

        Err(ParseError::UnknownFileFormat)
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Pfr(..) => "PFR",
            Self::Type1(..) => "Type 1",
            Self::Type42(..) => "Type 42",
            Self::TrueType(..) => "TrueType",
        }
    }

    pub fn num_glyphs(&self) -> u32 {
        match self {
            Self::Pfr(face) => face.num_glyphs(),
            Self::Type1(face) => face.num_glyphs(),
            Self::Type42(face) => face.num_glyphs(),
            Self::TrueType(face) => face.num_glyphs(),
        }
    }

    /// Glyph index for a char code; 0 when unmapped.
    pub fn char_index(&self, char_code: u32) -> u32 {
        match self {
            Self::Pfr(face) => face.char_index(char_code),
            Self::Type1(face) => face.char_index(char_code),
            Self::Type42(face) => face.char_index(char_code),
            Self::TrueType(face) => face.char_index(char_code),
        }
    }

    /// Smallest mapped char code strictly greater than `char_code`, with
    /// its glyph index; `(0, 0)` when the map is exhausted.
    pub fn char_next(&self, char_code: u32) -> (u32, u32) {
        match self {
            Self::Pfr(face) => face.char_next(char_code),
            Self::TrueType(face) => face.char_next(char_code),
            // encoding-vector faces cover at most 256 codes
            Self::Type1(..) | Self::Type42(..) => {
                let mut code = char_code + 1;
                while code < 256 {
                    let gindex = self.char_index(code);
                    if gindex != 0 {
                        return (code, gindex);
                    }
                    code += 1;
                }
                (0, 0)
            }
        }
    }
}
