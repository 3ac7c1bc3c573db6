use crate::error::{FontResult, ParseError};

const FORM_FEED: u8 = b'\x0C';

/// Cursor discipline shared by the textual parsers (Type 1 dictionaries,
/// Type 42 wrappers, AFM metrics). Implementors supply the buffer and cursor;
/// everything else is defaulted.
pub(crate) trait LexBase {
    fn buffer(&self) -> &[u8];
    fn cursor(&self) -> usize;
    fn cursor_mut(&mut self) -> &mut usize;

    fn next_byte(&mut self) -> Option<u8> {
        self.buffer().get(self.cursor()).copied().map(|b| {
            *self.cursor_mut() += 1;
            b
        })
    }

    fn peek_byte(&self) -> Option<u8> {
        self.buffer().get(self.cursor()).copied()
    }

    fn peek_byte_offset(&self, offset: usize) -> Option<u8> {
        self.buffer().get(self.cursor() + offset).copied()
    }

    fn next_byte_err(&mut self) -> FontResult<u8> {
        self.next_byte().ok_or(ParseError::UnexpectedEof)
    }

    /// Whitespace chars are defined as
    ///
    /// * NUL             0x0
    /// * Horizontal tab  0x9
    /// * Line feed       0xa
    /// * Form feed       0xc
    /// * Carriage return 0xd
    /// * Space           0x20
    fn is_whitespace(b: u8) -> bool {
        matches!(b, b'\0' | 0x9 | b'\n' | FORM_FEED | b'\r' | b' ')
    }

    fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    fn is_regular(b: u8) -> bool {
        !Self::is_whitespace(b) && !Self::is_delimiter(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            if Self::is_whitespace(b) {
                self.next_byte();
            } else if b == b'%' {
                self.next_byte();
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    /// Assumes the leading `%` has already been consumed
    fn skip_comment(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b == b'\r' || b == b'\n' {
                break;
            }
            self.next_byte();
        }
    }

    fn skip_to_next_line(&mut self) {
        while let Some(b) = self.next_byte() {
            if b == b'\n' {
                break;
            }
            if b == b'\r' {
                if self.peek_byte() == Some(b'\n') {
                    self.next_byte();
                }
                break;
            }
        }
    }

    /// Does not modify the cursor
    fn next_matches(&mut self, bytes: &[u8]) -> bool {
        let start_pos = self.cursor();

        for &b in bytes {
            if Some(b) != self.next_byte() {
                *self.cursor_mut() = start_pos;
                return false;
            }
        }

        *self.cursor_mut() = start_pos;

        true
    }

    fn expect_byte(&mut self, expected: u8) -> FontResult<()> {
        match self.next_byte() {
            Some(found) if expected == found => Ok(()),
            Some(..) => Err(ParseError::InvalidData { table: "token" }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn expect_bytes(&mut self, bytes: &[u8]) -> FontResult<()> {
        for &b in bytes {
            self.expect_byte(b)?;
        }

        Ok(())
    }

    /// Assumes the leading `/` has not been consumed
    fn lex_name(&mut self) -> FontResult<String> {
        self.expect_byte(b'/')?;
        Ok(self.lex_identifier())
    }

    /// A bare run of regular characters; empty if the next byte is not
    /// regular
    fn lex_identifier(&mut self) -> String {
        let mut ident = String::new();

        while let Some(b) = self.peek_byte() {
            if !Self::is_regular(b) {
                break;
            }

            self.next_byte();
            ident.push(b as char);
        }

        ident
    }

    fn lex_whole_number(&mut self) -> String {
        let mut whole_number = String::new();

        while let Some(b) = self.peek_byte() {
            if !b.is_ascii_digit() {
                break;
            }

            self.next_byte();
            whole_number.push(b as char);
        }

        whole_number
    }

    fn lex_integer(&mut self) -> FontResult<i32> {
        let negative = match self.peek_byte() {
            Some(b'+') => {
                self.next_byte();
                1
            }
            Some(b'-') => {
                self.next_byte();
                -1
            }
            _ => 1,
        };

        let whole_number = self.lex_whole_number();
        if whole_number.is_empty() {
            return Err(ParseError::InvalidData { table: "number" });
        }

        whole_number
            .parse::<i32>()
            .map(|n| n * negative)
            .map_err(|_| ParseError::InvalidData { table: "number" })
    }

    /// Integer or real; reals are parsed with `fast_float`, matching
    /// PostScript's permissive number grammar
    fn lex_number(&mut self) -> FontResult<f32> {
        let start = self.cursor();

        if matches!(self.peek_byte(), Some(b'+' | b'-')) {
            self.next_byte();
        }

        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'-' || b == b'+' {
                self.next_byte();
            } else {
                break;
            }
        }

        if self.cursor() == start {
            return Err(ParseError::InvalidData { table: "number" });
        }

        fast_float::parse(&self.buffer()[start..self.cursor()])
            .map_err(|_| ParseError::InvalidData { table: "number" })
    }
}
