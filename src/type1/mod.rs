//! Type 1 font program support: PFA/PFB framing, the cleartext dictionary,
//! the eexec-encrypted private section, and glyph loading through the
//! charstring decoder.

use std::collections::HashMap;

use crate::{
    error::{FontResult, ParseError},
    geometry::Matrix,
    lex::LexBase,
    psnames::{self, GlyphNames, NOTDEF},
    type1::{
        afm::AfmKerning,
        charstring::{CharstringDecoder, CharstringSource, DecodedGlyph},
        dict::{load_field, DictField, DictSetter, TokenReader},
    },
};

pub mod afm;
pub mod charstring;
pub mod decrypt;
pub mod dict;

/// Number of random bytes at the start of the eexec-encrypted section
const EEXEC_RANDOM_BYTES: usize = 4;

#[derive(Debug, Default)]
pub struct FontInfo {
    pub version: Option<String>,
    pub notice: Option<String>,
    pub full_name: Option<String>,
    pub family_name: Option<String>,
    pub weight: Option<String>,
    pub italic_angle: f32,
    pub is_fixed_pitch: bool,
    pub underline_position: f32,
    pub underline_thickness: f32,
}

#[derive(Debug)]
pub struct Private {
    /// Random bytes prefixed to each encrypted charstring
    pub len_iv: i32,
    pub blue_values: Vec<i32>,
    pub other_blues: Vec<i32>,
    pub family_blues: Vec<i32>,
    pub family_other_blues: Vec<i32>,
    pub blue_scale: f32,
    pub blue_shift: i32,
    pub blue_fuzz: i32,
    pub std_hw: Vec<f32>,
    pub std_vw: Vec<f32>,
    pub stem_snap_h: Vec<f32>,
    pub stem_snap_v: Vec<f32>,
    pub force_bold: bool,
    pub language_group: i32,
    pub password: i32,
    /// Charstring subroutines, decrypted with their `lenIV` prefix removed
    pub subrs: Vec<Vec<u8>>,
}

impl Default for Private {
    fn default() -> Self {
        Self {
            len_iv: 4,
            blue_values: Vec::new(),
            other_blues: Vec::new(),
            family_blues: Vec::new(),
            family_other_blues: Vec::new(),
            blue_scale: 0.039625,
            blue_shift: 7,
            blue_fuzz: 1,
            std_hw: Vec::new(),
            std_vw: Vec::new(),
            stem_snap_h: Vec::new(),
            stem_snap_v: Vec::new(),
            force_bold: false,
            language_group: 0,
            password: 0,
            subrs: Vec::new(),
        }
    }
}

/// Decrypted charstrings in order of appearance, addressable by glyph name
/// or by position (the glyph index).
#[derive(Debug, Default)]
pub struct CharStrings {
    names: Vec<String>,
    data: Vec<Vec<u8>>,
    by_name: HashMap<String, usize>,
}

impl CharStrings {
    fn insert(&mut self, name: String, charstring: Vec<u8>) {
        if let Some(&index) = self.by_name.get(&name) {
            self.data[index] = charstring;
            return;
        }

        self.by_name.insert(name.clone(), self.data.len());
        self.names.push(name);
        self.data.push(charstring);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, glyph_id: u32) -> Option<&[u8]> {
        self.data.get(glyph_id as usize).map(Vec::as_slice)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&[u8]> {
        self.by_name.get(name).map(|&index| &self.data[index][..])
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|&index| index as u32)
    }

    pub fn name_of(&self, glyph_id: u32) -> Option<&str> {
        self.names.get(glyph_id as usize).map(String::as_str)
    }
}

/// A built-in or custom 256-entry encoding vector.
#[derive(Debug)]
pub struct Encoding {
    codepoint_map: Vec<Option<String>>,
}

impl Encoding {
    pub fn standard() -> Self {
        Self {
            codepoint_map: psnames::STANDARD_ENCODING
                .iter()
                .map(|name| name.map(str::to_owned))
                .collect(),
        }
    }

    fn empty() -> Self {
        Self {
            codepoint_map: vec![None; 256],
        }
    }

    pub(crate) fn put(&mut self, code: u32, name: String) {
        if let Some(slot) = self.codepoint_map.get_mut(code as usize) {
            *slot = Some(name);
        }
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.codepoint_map
            .get(code as usize)
            .and_then(|name| name.as_deref())
    }
}

#[derive(Debug)]
pub struct Type1Face {
    pub font_name: String,
    pub font_matrix: Matrix,
    pub font_bbox: [f32; 4],
    pub paint_type: i32,
    pub font_type: i32,
    pub stroke_width: f32,
    pub unique_id: Option<i32>,
    pub font_info: FontInfo,
    pub encoding: Encoding,
    pub private: Private,
    pub char_strings: CharStrings,
    kerning: Option<AfmKerning>,
}

impl Default for Type1Face {
    fn default() -> Self {
        Self {
            font_name: String::new(),
            font_matrix: Matrix::default_font_matrix(),
            font_bbox: [0.0; 4],
            paint_type: 0,
            font_type: 1,
            stroke_width: 0.0,
            unique_id: None,
            font_info: FontInfo::default(),
            encoding: Encoding::standard(),
            private: Private::default(),
            char_strings: CharStrings::default(),
            kerning: None,
        }
    }
}

/// The flat keyword table driving the cleartext and private dictionaries.
/// Keys of nested dictionaries (FontInfo, Private) are distinct, so one
/// table serves the whole program.
#[rustfmt::skip]
const FACE_FIELDS: &[DictField<Type1Face>] = &[
    DictField::new("FontName", DictSetter::Name(|f: &mut Type1Face, v| f.font_name = v)),
    DictField::new("PaintType", DictSetter::Integer(|f: &mut Type1Face, v| f.paint_type = v)),
    DictField::new("FontType", DictSetter::Integer(|f: &mut Type1Face, v| f.font_type = v)),
    DictField::new("StrokeWidth", DictSetter::Number(|f: &mut Type1Face, v| f.stroke_width = v)),
    DictField::new("UniqueID", DictSetter::Integer(|f: &mut Type1Face, v| f.unique_id = Some(v))),
    DictField::new("FontBBox", DictSetter::BBox(|f: &mut Type1Face, v| f.font_bbox = v)),
    DictField::new("FontMatrix", DictSetter::NumberArray(|f: &mut Type1Face, v| {
        if let [a, b, c, d, e, g] = v[..] {
            f.font_matrix = Matrix::new(a, b, c, d, e, g);
        }
    })),
    DictField::new("Encoding", DictSetter::Callback(parse_encoding)),

    // FontInfo
    DictField::new("version", DictSetter::String(|f: &mut Type1Face, v| f.font_info.version = Some(v))),
    DictField::new("Notice", DictSetter::String(|f: &mut Type1Face, v| f.font_info.notice = Some(v))),
    DictField::new("FullName", DictSetter::String(|f: &mut Type1Face, v| f.font_info.full_name = Some(v))),
    DictField::new("FamilyName", DictSetter::String(|f: &mut Type1Face, v| f.font_info.family_name = Some(v))),
    DictField::new("Weight", DictSetter::String(|f: &mut Type1Face, v| f.font_info.weight = Some(v))),
    DictField::new("ItalicAngle", DictSetter::Number(|f: &mut Type1Face, v| f.font_info.italic_angle = v)),
    DictField::new("isFixedPitch", DictSetter::Bool(|f: &mut Type1Face, v| f.font_info.is_fixed_pitch = v)),
    DictField::new("UnderlinePosition", DictSetter::Number(|f: &mut Type1Face, v| f.font_info.underline_position = v)),
    DictField::new("UnderlineThickness", DictSetter::Number(|f: &mut Type1Face, v| f.font_info.underline_thickness = v)),

    // Private
    DictField::new("lenIV", DictSetter::Integer(|f: &mut Type1Face, v| f.private.len_iv = v)),
    DictField::new("BlueValues", DictSetter::IntegerArray(|f: &mut Type1Face, v| f.private.blue_values = v)),
    DictField::new("OtherBlues", DictSetter::IntegerArray(|f: &mut Type1Face, v| f.private.other_blues = v)),
    DictField::new("FamilyBlues", DictSetter::IntegerArray(|f: &mut Type1Face, v| f.private.family_blues = v)),
    DictField::new("FamilyOtherBlues", DictSetter::IntegerArray(|f: &mut Type1Face, v| f.private.family_other_blues = v)),
    DictField::new("BlueScale", DictSetter::Number(|f: &mut Type1Face, v| f.private.blue_scale = v)),
    DictField::new("BlueShift", DictSetter::Integer(|f: &mut Type1Face, v| f.private.blue_shift = v)),
    DictField::new("BlueFuzz", DictSetter::Integer(|f: &mut Type1Face, v| f.private.blue_fuzz = v)),
    DictField::new("StdHW", DictSetter::NumberArray(|f: &mut Type1Face, v| f.private.std_hw = v)),
    DictField::new("StdVW", DictSetter::NumberArray(|f: &mut Type1Face, v| f.private.std_vw = v)),
    DictField::new("StemSnapH", DictSetter::NumberArray(|f: &mut Type1Face, v| f.private.stem_snap_h = v)),
    DictField::new("StemSnapV", DictSetter::NumberArray(|f: &mut Type1Face, v| f.private.stem_snap_v = v)),
    DictField::new("ForceBold", DictSetter::Bool(|f: &mut Type1Face, v| f.private.force_bold = v)),
    DictField::new("LanguageGroup", DictSetter::Integer(|f: &mut Type1Face, v| f.private.language_group = v)),
    DictField::new("password", DictSetter::Integer(|f: &mut Type1Face, v| f.private.password = v)),
    DictField::new("Subrs", DictSetter::Callback(parse_subrs)),
    DictField::new("CharStrings", DictSetter::Callback(parse_charstrings)),
];

/// `/Encoding StandardEncoding def` or an explicit vector built from
/// `dup <code> /<name> put` entries.
fn parse_encoding(face: &mut Type1Face, reader: &mut TokenReader) -> FontResult<()> {
    face.encoding = parse_encoding_vector(reader)?;
    Ok(())
}

/// Shared by the Type 1 and Type 42 loaders, whose encodings use the same
/// grammar.
pub(crate) fn parse_encoding_vector(reader: &mut TokenReader) -> FontResult<Encoding> {
    reader.skip_whitespace();

    if reader.next_matches(b"StandardEncoding") {
        reader.lex_identifier();
        return Ok(Encoding::standard());
    }

    let mut encoding = Encoding::empty();

    loop {
        reader.skip_whitespace();

        match reader.peek_byte() {
            Some(b'/') => {
                // a name token inside the initializer procedure
                reader.lex_name()?;
            }
            Some(b) if TokenReader::is_regular(b) => match reader.lex_identifier().as_str() {
                "dup" => {
                    let code = reader.parse_integer()?;
                    reader.skip_whitespace();
                    let name = reader.lex_name()?;
                    reader.skip_whitespace();
                    reader.lex_identifier(); // put

                    encoding.put(code as u32, name);
                }
                "def" => break,
                "" => return Err(ParseError::UnexpectedEof),
                _ => {}
            },
            Some(..) => {
                reader.next_byte();
            }
            None => return Err(ParseError::UnexpectedEof),
        }
    }

    Ok(encoding)
}

/// Reads one `<len> RD <binary> ..` charstring, decrypts it and strips the
/// `lenIV` prefix.
fn read_binary_charstring(reader: &mut TokenReader, len_iv: i32) -> FontResult<Vec<u8>> {
    let length = reader.parse_integer()? as usize;

    reader.skip_whitespace();
    reader.lex_identifier(); // RD / -| / arbitrary alias
    reader.next_byte_err()?; // the single space separating token and data

    let cipher = reader.take_bytes(length)?;
    let mut plain = decrypt::decrypt(cipher, decrypt::CHARSTRING_KEY);

    let skip = (len_iv.max(0) as usize).min(plain.len());
    plain.drain(..skip);

    Ok(plain)
}

/// `/Subrs <count> array` followed by `dup <index> <len> RD <binary> NP`
/// entries.
fn parse_subrs(face: &mut Type1Face, reader: &mut TokenReader) -> FontResult<()> {
    let count = reader.parse_integer()?.max(0) as usize;

    face.private.subrs = vec![Vec::new(); count];

    let mut loaded = 0;
    while loaded < count {
        reader.skip_whitespace();

        if reader.peek_byte().is_none() {
            return Err(ParseError::UnexpectedEof);
        }

        if reader.peek_byte() == Some(b'/') {
            reader.lex_name()?;
            continue;
        }

        if !TokenReader::is_regular(reader.peek_byte().unwrap_or(b' ')) {
            reader.next_byte();
            continue;
        }

        if reader.lex_identifier() == "dup" {
            let index = reader.parse_integer()? as usize;
            let charstring = read_binary_charstring(reader, face.private.len_iv)?;

            if index >= count {
                return Err(ParseError::InvalidData { table: "Subrs" });
            }

            face.private.subrs[index] = charstring;
            loaded += 1;
        }
    }

    Ok(())
}

/// `/CharStrings <count> dict dup begin` followed by
/// `/<name> <len> RD <binary> ND` entries up to `end`.
fn parse_charstrings(face: &mut Type1Face, reader: &mut TokenReader) -> FontResult<()> {
    reader.parse_integer()?; // count hint, not trusted

    loop {
        reader.skip_whitespace();

        match reader.peek_byte() {
            Some(b'/') => {
                let name = reader.lex_name()?;
                let charstring = read_binary_charstring(reader, face.private.len_iv)?;

                face.char_strings.insert(name, charstring);
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

/// Splits a PFB container into its concatenated ascii and binary sections.
///
/// Each segment starts with 0x80 and a type byte (1 ascii, 2 binary, 3 end
/// of file), followed by a little-endian 32-bit length.
fn split_pfb(data: &[u8]) -> FontResult<(Vec<u8>, Vec<u8>)> {
    let mut ascii = Vec::new();
    let mut binary = Vec::new();
    let mut i = 0;

    loop {
        if i + 2 > data.len() || data[i] != 0x80 {
            return Err(ParseError::InvalidFileFormat { format: "PFB" });
        }

        let segment_type = data[i + 1];
        if segment_type == 3 {
            break;
        }

        if i + 6 > data.len() {
            return Err(ParseError::InvalidFileFormat { format: "PFB" });
        }

        let length =
            u32::from_le_bytes([data[i + 2], data[i + 3], data[i + 4], data[i + 5]]) as usize;
        i += 6;

        let segment = data
            .get(i..i + length)
            .ok_or(ParseError::InvalidFileFormat { format: "PFB" })?;
        i += length;

        match segment_type {
            1 => ascii.extend_from_slice(segment),
            2 => binary.extend_from_slice(segment),
            _ => return Err(ParseError::InvalidFileFormat { format: "PFB" }),
        }
    }

    Ok((ascii, binary))
}

/// Splits PFA text at the `eexec` keyword and un-hexes the encrypted
/// section when it is hex-encoded.
fn split_pfa(data: &[u8]) -> FontResult<(Vec<u8>, Vec<u8>)> {
    let eexec = data
        .windows(5)
        .position(|w| w == b"eexec")
        .ok_or(ParseError::InvalidFileFormat { format: "Type 1" })?;

    let cleartext = data[..eexec].to_vec();

    let mut rest = &data[eexec + 5..];
    while let Some((&b, tail)) = rest.split_first() {
        if matches!(b, b'\r' | b'\n' | b' ' | b'\t') {
            rest = tail;
        } else {
            break;
        }
    }

    // a hex-encoded section starts with four hex digits; raw binary is
    // vanishingly unlikely to
    let is_hex = rest.len() >= 4 && rest[..4].iter().all(u8::is_ascii_hexdigit);

    let binary = if is_hex {
        let mut bytes = Vec::with_capacity(rest.len() / 2);
        let mut high: Option<u8> = None;

        for &b in rest {
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => continue,
            };

            match high.take() {
                Some(h) => bytes.push(h << 4 | digit),
                None => high = Some(digit),
            }
        }

        bytes
    } else {
        rest.to_vec()
    };

    Ok((cleartext, binary))
}

impl Type1Face {
    /// Parses a PFA or PFB font program.
    pub fn parse(data: &[u8]) -> FontResult<Self> {
        let (cleartext, cipher) = if data.first() == Some(&0x80) {
            let (ascii, binary) = split_pfb(data)?;

            // the ascii section still carries the `eexec` keyword; the
            // binary section is already separated out
            let eexec = ascii
                .windows(5)
                .position(|w| w == b"eexec")
                .ok_or(ParseError::InvalidFileFormat { format: "Type 1" })?;

            (ascii[..eexec].to_vec(), binary)
        } else if data.starts_with(b"%!") {
            split_pfa(data)?
        } else {
            return Err(ParseError::UnknownFileFormat);
        };

        let mut face = Type1Face::default();

        face.parse_dict(&cleartext)?;

        let private = decrypt::decrypt(&cipher, decrypt::EEXEC_KEY);
        if private.len() < EEXEC_RANDOM_BYTES {
            return Err(ParseError::InvalidFileFormat { format: "Type 1" });
        }
        face.parse_dict(&private[EEXEC_RANDOM_BYTES..])?;

        if face.char_strings.is_empty() {
            return Err(ParseError::InvalidFileFormat { format: "Type 1" });
        }

        Ok(face)
    }

    fn parse_dict(&mut self, text: &[u8]) -> FontResult<()> {
        let mut reader = TokenReader::new(text);

        while !reader.at_end() {
            if reader.peek_byte() == Some(b'/') {
                let name = reader.lex_name()?;
                load_field(&mut reader, FACE_FIELDS, &name, self)?;
            } else {
                reader.skip_token();
            }
        }

        Ok(())
    }

    pub fn num_glyphs(&self) -> u32 {
        self.char_strings.len() as u32
    }

    /// Glyph index for a char code through the encoding vector; 0 when the
    /// code or its glyph name is absent.
    pub fn char_index(&self, char_code: u32) -> u32 {
        self.encoding
            .get(char_code)
            .and_then(|name| self.char_strings.index_of(name))
            .unwrap_or(0)
    }

    /// Decodes the charstring of `glyph_id` into an outline in character
    /// space (no font matrix applied).
    pub fn load_glyph(&self, glyph_id: u32) -> FontResult<DecodedGlyph> {
        let charstring = self
            .char_strings
            .get(glyph_id)
            .ok_or(ParseError::InvalidGlyphId {
                glyph_id,
                num_glyphs: self.num_glyphs(),
            })?;

        CharstringDecoder::new(&self.private.subrs, Some(self)).decode(charstring)
    }

    /// Like [`load_glyph`](Self::load_glyph), then mapped through the font
    /// matrix into text space.
    pub fn load_glyph_scaled(&self, glyph_id: u32, transform: Matrix) -> FontResult<DecodedGlyph> {
        let mut glyph = self.load_glyph(glyph_id)?;

        let combined = self.font_matrix * transform;
        glyph.outline.apply_transform(combined);
        // the advance is a vector, so the translation part does not apply
        glyph.advance = combined * glyph.advance - combined * crate::geometry::Point::origin();

        Ok(glyph)
    }

    /// Attaches kerning metrics from an AFM file.
    pub fn attach_metrics(&mut self, afm: &[u8]) -> FontResult<()> {
        let kerning = afm::read_afm(afm, &*self)?;
        self.kerning = Some(kerning);
        Ok(())
    }

    pub fn get_kerning(&self, glyph1: u32, glyph2: u32) -> (i32, i32) {
        match &self.kerning {
            Some(kerning) => kerning.get_kerning(glyph1, glyph2),
            None => (0, 0),
        }
    }

    pub fn kerning(&self) -> Option<&AfmKerning> {
        self.kerning.as_ref()
    }
}

impl GlyphNames for Type1Face {
    fn glyph_name(&self, glyph_id: u32) -> Option<&str> {
        self.char_strings.name_of(glyph_id)
    }

    fn glyph_index(&self, name: &str) -> Option<u32> {
        self.char_strings.index_of(name)
    }

    fn num_glyphs(&self) -> u32 {
        self.char_strings.len() as u32
    }
}

impl CharstringSource for Type1Face {
    fn charstring_for_standard_code(&self, code: u8) -> Option<&[u8]> {
        let name = psnames::standard_code_to_name(u32::from(code))?;

        self.char_strings
            .get_by_name(name)
            .or_else(|| self.char_strings.get_by_name(NOTDEF))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Point;

    // .notdef: 0 250 hsbw endchar
    fn notdef_charstring() -> Vec<u8> {
        vec![139, 247, 142, 13, 14]
    }

    // A: 20 600 hsbw, 0 0 rmoveto, 100 hlineto, -50 80 rlineto,
    //    closepath endchar
    fn a_charstring() -> Vec<u8> {
        vec![
            159, // 20
            248, 236, // 600
            13, // hsbw
            139, 139, 21, // 0 0 rmoveto
            239, 6, // 100 hlineto
            89, 219, 5, // -50 80 rlineto
            9, 14, // closepath endchar
        ]
    }

    // B: 0 400 hsbw, 0 subr# callsubr, endchar; the subr draws a line
    fn b_charstring() -> Vec<u8> {
        vec![
            139, // 0
            248, 36, // 400
            13,  // hsbw
            139, 10, // 0 callsubr
            14, // endchar
        ]
    }

    // subr 0: 0 0 rmoveto 30 hlineto return
    fn subr0() -> Vec<u8> {
        vec![139, 139, 21, 169, 6, 11]
    }

    fn encrypted_charstring(plain: &[u8]) -> Vec<u8> {
        // lenIV of 4: four throwaway bytes ahead of the real program
        let mut padded = vec![b'x', b'x', b'x', b'x'];
        padded.extend_from_slice(plain);
        decrypt::encrypt(&padded, decrypt::CHARSTRING_KEY)
    }

    fn build_private_section() -> Vec<u8> {
        let mut text: Vec<u8> = Vec::new();

        text.extend_from_slice(b"xxxx dup /Private 8 dict dup begin\n");
        text.extend_from_slice(b"/lenIV 4 def\n/password 5839 def\n");
        text.extend_from_slice(b"/BlueValues [-20 0 450 470] def\n");

        text.extend_from_slice(b"/Subrs 1 array\n");
        let subr = encrypted_charstring(&subr0());
        text.extend_from_slice(format!("dup 0 {} RD ", subr.len()).as_bytes());
        text.extend_from_slice(&subr);
        text.extend_from_slice(b" NP\n");

        text.extend_from_slice(b"/CharStrings 3 dict dup begin\n");
        for (name, cs) in [
            (".notdef", notdef_charstring()),
            ("A", a_charstring()),
            ("B", b_charstring()),
        ] {
            let enc = encrypted_charstring(&cs);
            text.extend_from_slice(format!("/{} {} RD ", name, enc.len()).as_bytes());
            text.extend_from_slice(&enc);
            text.extend_from_slice(b" ND\n");
        }
        text.extend_from_slice(b"end\nend\n");

        text
    }

    fn build_pfa() -> Vec<u8> {
        let mut font: Vec<u8> = Vec::new();

        font.extend_from_slice(b"%!PS-AdobeFont-1.0: Sample 001.001\n");
        font.extend_from_slice(b"/FontName /Sample def\n");
        font.extend_from_slice(b"/PaintType 0 def\n/FontType 1 def\n");
        font.extend_from_slice(b"/FontMatrix [0.001 0 0 0.001 0 0] readonly def\n");
        font.extend_from_slice(b"/FontBBox {0 -200 1000 800} readonly def\n");
        font.extend_from_slice(b"/FontInfo 9 dict dup begin\n");
        font.extend_from_slice(b"/FullName (Sample Regular) readonly def\n");
        font.extend_from_slice(b"/ItalicAngle 0 def\n/isFixedPitch false def\n");
        font.extend_from_slice(b"end readonly def\n");
        font.extend_from_slice(b"/Encoding 256 array\n");
        font.extend_from_slice(b"0 1 255 {1 index exch /.notdef put} for\n");
        font.extend_from_slice(b"dup 65 /A put\ndup 66 /B put\nreadonly def\n");
        font.extend_from_slice(b"currentfile eexec\n");
        font.extend_from_slice(&decrypt::encrypt(&build_private_section(), decrypt::EEXEC_KEY));

        font
    }

    fn build_pfb() -> Vec<u8> {
        let pfa = build_pfa();
        let eexec = pfa.windows(5).position(|w| w == b"eexec").unwrap() + 6;

        let mut pfb = Vec::new();

        pfb.extend_from_slice(&[0x80, 1]);
        pfb.extend_from_slice(&(eexec as u32).to_le_bytes());
        pfb.extend_from_slice(&pfa[..eexec]);

        pfb.extend_from_slice(&[0x80, 2]);
        pfb.extend_from_slice(&((pfa.len() - eexec) as u32).to_le_bytes());
        pfb.extend_from_slice(&pfa[eexec..]);

        pfb.extend_from_slice(&[0x80, 3]);

        pfb
    }

    #[test]
    fn parses_cleartext_dictionary() {
        let face = Type1Face::parse(&build_pfa()).unwrap();

        assert_eq!(face.font_name, "Sample");
        assert_eq!(face.font_bbox, [0.0, -200.0, 1000.0, 800.0]);
        assert_eq!(face.font_info.full_name.as_deref(), Some("Sample Regular"));
        assert_eq!(face.private.password, 5839);
        assert_eq!(face.private.blue_values, vec![-20, 0, 450, 470]);
    }

    #[test]
    fn custom_encoding_maps_codes_to_names() {
        let face = Type1Face::parse(&build_pfa()).unwrap();

        assert_eq!(face.encoding.get(65), Some("A"));
        assert_eq!(face.encoding.get(66), Some("B"));
        assert_eq!(face.encoding.get(67), None);

        assert_eq!(face.char_index(65), 1);
        assert_eq!(face.char_index(66), 2);
        assert_eq!(face.char_index(67), 0);
    }

    #[test]
    fn decodes_charstring_outlines() {
        let face = Type1Face::parse(&build_pfa()).unwrap();

        let glyph = face.load_glyph(1).unwrap();
        assert_eq!(glyph.advance, Point::new(600.0, 0.0));
        assert_eq!(glyph.outline.contours.len(), 1);
        assert_eq!(glyph.outline.contours[0].start, Point::new(20.0, 0.0));

        // B draws through the subroutine
        let glyph = face.load_glyph(2).unwrap();
        assert_eq!(glyph.advance, Point::new(400.0, 0.0));
        assert_eq!(
            glyph.outline.contours[0].segments[0].end(),
            Point::new(30.0, 0.0)
        );
    }

    #[test]
    fn pfb_and_pfa_agree() {
        let from_pfa = Type1Face::parse(&build_pfa()).unwrap();
        let from_pfb = Type1Face::parse(&build_pfb()).unwrap();

        assert_eq!(from_pfa.font_name, from_pfb.font_name);
        assert_eq!(from_pfa.num_glyphs(), from_pfb.num_glyphs());
        assert_eq!(
            from_pfa.char_strings.get_by_name("A"),
            from_pfb.char_strings.get_by_name("A")
        );
    }

    #[test]
    fn afm_kerning_attaches() {
        let mut face = Type1Face::parse(&build_pfa()).unwrap();

        face.attach_metrics(b"KPX A B -120\n").unwrap();

        assert_eq!(face.get_kerning(1, 2), (-120, 0));
        assert_eq!(face.get_kerning(2, 1), (0, 0));
    }

    #[test]
    fn scaled_glyph_maps_through_font_matrix() {
        let face = Type1Face::parse(&build_pfa()).unwrap();

        let glyph = face
            .load_glyph_scaled(1, Matrix::new(12.0, 0.0, 0.0, 12.0, 0.0, 0.0))
            .unwrap();

        // 600 units * 0.001 * 12pt
        assert!((glyph.advance.x - 7.2).abs() < 1e-4);
    }

    #[test]
    fn garbage_input_is_unknown_format() {
        assert!(matches!(
            Type1Face::parse(b"\x00\x01\x02\x03"),
            Err(ParseError::UnknownFileFormat)
        ));
    }
}
