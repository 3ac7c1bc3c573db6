//! Type 42 font support: a Type 1-style PostScript wrapper around an
//! embedded TrueType binary.
//!
//! The wrapper contributes only a re-encoding layer: the `sfnts` array holds
//! the raw sfnt bytes and `CharStrings` maps glyph names to glyph indices
//! inside them. Outline work is delegated to the TrueType sub-face.

use std::collections::HashMap;

use crate::{
    error::{FontResult, ParseError},
    geometry::Matrix,
    lex::LexBase,
    psnames::GlyphNames,
    truetype::TrueTypeFace,
    type1::{
        dict::{load_field, DictField, DictSetter, TokenReader},
        parse_encoding_vector, Encoding,
    },
};

#[derive(Default)]
struct Builder {
    font_name: String,
    font_type: i32,
    font_matrix: Option<Matrix>,
    encoding: Option<Encoding>,
    sfnt_data: Vec<u8>,
    /// glyph name -> glyph index in the embedded font, plus the reverse
    char_strings: HashMap<String, u32>,
    glyph_names: Vec<(String, u32)>,
}

#[rustfmt::skip]
const BUILDER_FIELDS: &[DictField<Builder>] = &[
    DictField::new("FontName", DictSetter::Name(|b: &mut Builder, v| b.font_name = v)),
    DictField::new("FontType", DictSetter::Integer(|b: &mut Builder, v| b.font_type = v)),
    DictField::new("FontMatrix", DictSetter::NumberArray(|b: &mut Builder, v| {
        if let [a, c, d, e, f, g] = v[..] {
            b.font_matrix = Some(Matrix::new(a, c, d, e, f, g));
        }
    })),
    DictField::new("Encoding", DictSetter::Callback(|b: &mut Builder, reader| {
        b.encoding = Some(parse_encoding_vector(reader)?);
        Ok(())
    })),
    DictField::new("sfnts", DictSetter::Callback(parse_sfnts)),
    DictField::new("CharStrings", DictSetter::Callback(parse_char_strings)),
];

/// `/sfnts [ <hex> <hex> ... ] def`: the embedded TrueType binary as a
/// sequence of strings, concatenated verbatim. Generators break strings at
/// table boundaries, so the sfnt offsets survive concatenation.
fn parse_sfnts(builder: &mut Builder, reader: &mut TokenReader) -> FontResult<()> {
    reader.skip_whitespace();
    reader.expect_byte(b'[')?;

    loop {
        reader.skip_whitespace();

        match reader.peek_byte() {
            Some(b']') => {
                reader.next_byte();
                break;
            }
            Some(b'<') => {
                reader.next_byte();

                let mut high: Option<u8> = None;
                loop {
                    let b = reader.next_byte_err()?;
                    let digit = match b {
                        b'>' => break,
                        b'0'..=b'9' => b - b'0',
                        b'a'..=b'f' => b - b'a' + 10,
                        b'A'..=b'F' => b - b'A' + 10,
                        _ if TokenReader::is_whitespace(b) => continue,
                        _ => return Err(ParseError::InvalidData { table: "sfnts" }),
                    };

                    match high.take() {
                        Some(h) => builder.sfnt_data.push(h << 4 | digit),
                        None => high = Some(digit),
                    }
                }
            }
            _ => return Err(ParseError::InvalidData { table: "sfnts" }),
        }
    }

    Ok(())
}

/// `/CharStrings <n> dict dup begin` then `/<name> <gid> def` entries up to
/// `end`.
fn parse_char_strings(builder: &mut Builder, reader: &mut TokenReader) -> FontResult<()> {
    reader.parse_integer()?; // count hint

    loop {
        reader.skip_whitespace();

        match reader.peek_byte() {
            Some(b'/') => {
                let name = reader.lex_name()?;
                let glyph_id = reader.parse_integer()?.max(0) as u32;

                builder.char_strings.insert(name.clone(), glyph_id);
                builder.glyph_names.push((name, glyph_id));
            }
            Some(b) if TokenReader::is_regular(b) => {
                if reader.lex_identifier() == "end" {
                    break;
                }
            }
            Some(..) => {
                reader.next_byte();
            }
            None => return Err(ParseError::UnexpectedEof),
        }
    }

    Ok(())
}

#[derive(Debug)]
pub struct Type42Face {
    pub font_name: String,
    pub font_matrix: Matrix,
    pub encoding: Encoding,
    char_strings: HashMap<String, u32>,
    glyph_names: Vec<(String, u32)>,
    /// The embedded TrueType font the wrapper re-encodes
    pub sfnt: TrueTypeFace,
}

impl Type42Face {
    pub fn parse(data: &[u8]) -> FontResult<Self> {
        let mut builder = Builder::default();
        let mut reader = TokenReader::new(data);

        while !reader.at_end() {
            if reader.peek_byte() == Some(b'/') {
                let name = reader.lex_name()?;
                load_field(&mut reader, BUILDER_FIELDS, &name, &mut builder)?;
            } else {
                reader.skip_token();
            }
        }

        if builder.font_type != 42 {
            return Err(ParseError::InvalidFileFormat { format: "Type 42" });
        }
        if builder.sfnt_data.is_empty() {
            return Err(ParseError::InvalidFileFormat { format: "Type 42" });
        }

        let sfnt = TrueTypeFace::parse(builder.sfnt_data)?;

        Ok(Self {
            font_name: builder.font_name,
            // Type 42 wraps an em-sized design, so the identity matrix is
            // the conventional default
            font_matrix: builder.font_matrix.unwrap_or_else(Matrix::identity),
            encoding: builder.encoding.unwrap_or_else(Encoding::standard),
            char_strings: builder.char_strings,
            glyph_names: builder.glyph_names,
            sfnt,
        })
    }

    pub fn num_glyphs(&self) -> u32 {
        self.sfnt.num_glyphs()
    }

    /// Char code -> glyph index through the wrapper's encoding and
    /// CharStrings, not the embedded cmap.
    pub fn char_index(&self, char_code: u32) -> u32 {
        self.encoding
            .get(char_code)
            .and_then(|name| self.char_strings.get(name).copied())
            .unwrap_or(0)
    }

    /// Raw `glyf` record for a glyph, straight from the sub-face.
    pub fn glyph_data(&self, glyph_id: u32) -> FontResult<&[u8]> {
        self.sfnt.glyph_data(glyph_id)
    }
}

impl GlyphNames for Type42Face {
    fn glyph_name(&self, glyph_id: u32) -> Option<&str> {
        self.glyph_names
            .iter()
            .find(|(_, id)| *id == glyph_id)
            .map(|(name, _)| name.as_str())
    }

    fn glyph_index(&self, name: &str) -> Option<u32> {
        self.char_strings.get(name).copied()
    }

    fn num_glyphs(&self) -> u32 {
        self.sfnt.num_glyphs()
    }
}
