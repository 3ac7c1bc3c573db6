//! Declarative field loading for PostScript font dictionaries.
//!
//! The textual analogue of the binary field reader: each [`DictField`] names
//! a dictionary key, the type of its value, and a setter. One generic
//! [`load_field`] routine matches a key the tokenizer just produced and
//! parses the correspondingly-typed value, so the font and Private dict
//! loaders are tables instead of hand-written per-key code.

use crate::{
    error::{FontResult, ParseError},
    lex::LexBase,
};

/// Token cursor over dictionary text.
pub(crate) struct TokenReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl LexBase for TokenReader<'_> {
    fn buffer(&self) -> &[u8] {
        self.buffer
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn cursor_mut(&mut self) -> &mut usize {
        &mut self.cursor
    }
}

impl<'a> TokenReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.peek_byte().is_none()
    }

    pub fn take_bytes(&mut self, count: usize) -> FontResult<&'a [u8]> {
        if self.cursor + count > self.buffer.len() {
            return Err(ParseError::UnexpectedEof);
        }

        let bytes = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;

        Ok(bytes)
    }

    pub fn parse_bool(&mut self) -> FontResult<bool> {
        self.skip_whitespace();

        match self.lex_identifier().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ParseError::InvalidData { table: "boolean" }),
        }
    }

    pub fn parse_integer(&mut self) -> FontResult<i32> {
        self.skip_whitespace();
        self.lex_integer()
    }

    pub fn parse_number(&mut self) -> FontResult<f32> {
        self.skip_whitespace();
        self.lex_number()
    }

    /// A parenthesized PostScript string, with balanced-paren nesting
    pub fn parse_string(&mut self) -> FontResult<String> {
        self.skip_whitespace();
        self.expect_byte(b'(')?;

        let mut string = String::new();
        let mut open_parens = 0;

        loop {
            match self.next_byte_err()? {
                b')' if open_parens == 0 => break,
                b')' => {
                    open_parens -= 1;
                    string.push(')');
                }
                b'(' => {
                    open_parens += 1;
                    string.push('(');
                }
                b'\\' => match self.next_byte_err()? {
                    b'n' => string.push('\n'),
                    b'r' => string.push('\r'),
                    b't' => string.push('\t'),
                    b => string.push(b as char),
                },
                b => string.push(b as char),
            }
        }

        Ok(string)
    }

    /// `[ ... ]` or `{ ... }` of numbers
    pub fn parse_number_array(&mut self) -> FontResult<Vec<f32>> {
        self.skip_whitespace();

        let close = match self.next_byte_err()? {
            b'[' => b']',
            b'{' => b'}',
            _ => return Err(ParseError::InvalidData { table: "array" }),
        };

        let mut values = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek_byte() {
                Some(b) if b == close => {
                    self.next_byte();
                    break;
                }
                Some(..) => values.push(self.lex_number()?),
                None => return Err(ParseError::UnexpectedEof),
            }
        }

        Ok(values)
    }

    pub fn parse_integer_array(&mut self) -> FontResult<Vec<i32>> {
        Ok(self
            .parse_number_array()?
            .into_iter()
            .map(|n| n as i32)
            .collect())
    }

    pub fn parse_bbox(&mut self) -> FontResult<[f32; 4]> {
        let values = self.parse_number_array()?;

        values
            .try_into()
            .map_err(|_| ParseError::InvalidData { table: "FontBBox" })
    }

    /// The token after a dictionary value, e.g. `def` or `readonly def`;
    /// consumed without interpretation
    pub fn skip_token(&mut self) {
        self.skip_whitespace();

        if matches!(self.peek_byte(), Some(b) if Self::is_regular(b)) {
            self.lex_identifier();
        } else {
            self.next_byte();
        }
    }
}

pub(crate) enum DictSetter<T> {
    Bool(fn(&mut T, bool)),
    Integer(fn(&mut T, i32)),
    Number(fn(&mut T, f32)),
    String(fn(&mut T, String)),
    /// A literal name value, `/FontName /Times-Roman def`
    Name(fn(&mut T, String)),
    BBox(fn(&mut T, [f32; 4])),
    IntegerArray(fn(&mut T, Vec<i32>)),
    NumberArray(fn(&mut T, Vec<f32>)),
    /// Escape hatch for values with bespoke grammar (encodings, charstring
    /// collections)
    Callback(fn(&mut T, &mut TokenReader) -> FontResult<()>),
}

pub(crate) struct DictField<T> {
    pub name: &'static str,
    pub set: DictSetter<T>,
}

impl<T> DictField<T> {
    pub const fn new(name: &'static str, set: DictSetter<T>) -> Self {
        Self { name, set }
    }
}

/// Parses the value for dictionary key `name` if a descriptor covers it.
/// Returns whether the key was recognized; unknown keys are the caller's
/// business (usually skipped to the next `def`).
pub(crate) fn load_field<T>(
    reader: &mut TokenReader,
    fields: &[DictField<T>],
    name: &str,
    dest: &mut T,
) -> FontResult<bool> {
    let field = match fields.iter().find(|field| field.name == name) {
        Some(field) => field,
        None => return Ok(false),
    };

    match &field.set {
        DictSetter::Bool(set) => set(dest, reader.parse_bool()?),
        DictSetter::Integer(set) => set(dest, reader.parse_integer()?),
        DictSetter::Number(set) => set(dest, reader.parse_number()?),
        DictSetter::String(set) => set(dest, reader.parse_string()?),
        DictSetter::Name(set) => {
            reader.skip_whitespace();
            set(dest, reader.lex_name()?);
        }
        DictSetter::BBox(set) => set(dest, reader.parse_bbox()?),
        DictSetter::IntegerArray(set) => set(dest, reader.parse_integer_array()?),
        DictSetter::NumberArray(set) => set(dest, reader.parse_number_array()?),
        DictSetter::Callback(parse) => parse(dest, reader)?,
    }

    Ok(true)
}
