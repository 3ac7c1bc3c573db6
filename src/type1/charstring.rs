//! Type 1 charstring decoder.
//!
//! Charstrings arrive here already decrypted, with their `lenIV` random
//! prefix stripped. The decoder is a small stack machine: an operand stack
//! capped at the BuildChar limit of 24 entries, nested subroutine zones
//! capped at [`MAX_SUBR_CALLS`], and the flex accumulation state driven
//! through the reserved OtherSubrs. It is created per glyph load and writes
//! into an [`OutlineBuilder`].

use crate::{
    error::{FontResult, ParseError},
    geometry::{Matrix, Outline, OutlineBuilder, Point},
};

pub const MAX_OPERANDS: usize = 24;
pub const MAX_SUBR_CALLS: u32 = 16;

/// Access to sibling charstrings, needed by the `seac` composition operator.
pub(crate) trait CharstringSource {
    fn charstring_for_standard_code(&self, code: u8) -> Option<&[u8]>;
}

#[derive(Debug)]
struct OperandStack {
    stack: [f32; MAX_OPERANDS],
    end: u8,
}

impl OperandStack {
    fn new() -> Self {
        Self {
            // zero is not used as a sentinel value, this is just an
            // initializer
            stack: [0.0; MAX_OPERANDS],
            end: 0,
        }
    }

    fn pop(&mut self) -> FontResult<f32> {
        if self.end == 0 {
            return Err(ParseError::InvalidData {
                table: "charstring stack",
            });
        }

        self.end -= 1;

        Ok(self.stack[self.end as usize])
    }

    fn pop_front(&mut self) -> FontResult<f32> {
        if self.end == 0 {
            return Err(ParseError::InvalidData {
                table: "charstring stack",
            });
        }

        self.end -= 1;

        let v = self.stack[0];

        self.stack.rotate_left(1);

        Ok(v)
    }

    fn push(&mut self, n: f32) -> FontResult<()> {
        if self.end as usize >= MAX_OPERANDS {
            return Err(ParseError::InvalidData {
                table: "charstring stack",
            });
        }

        self.stack[self.end as usize] = n;
        self.end += 1;

        Ok(())
    }

    fn clear(&mut self) {
        self.end = 0;
    }
}

/// Whether the zone that just finished ended the whole glyph or merely
/// returned to its caller.
#[derive(Debug, PartialEq)]
enum Flow {
    Returned,
    Done,
}

#[derive(Debug)]
pub struct DecodedGlyph {
    pub outline: Outline,
    pub advance: Point,
    pub left_side_bearing: Point,
}

pub(crate) struct CharstringDecoder<'a> {
    builder: OutlineBuilder,
    operand_stack: OperandStack,
    /// Results handed back by OtherSubrs, consumed by `pop`
    ps_stack: Vec<f32>,
    subrs: &'a [Vec<u8>],
    charstrings: Option<&'a dyn CharstringSource>,
    flex_points: Vec<Point>,
    in_flex: bool,
}

impl<'a> CharstringDecoder<'a> {
    pub fn new(subrs: &'a [Vec<u8>], charstrings: Option<&'a dyn CharstringSource>) -> Self {
        Self {
            builder: OutlineBuilder::new(),
            operand_stack: OperandStack::new(),
            ps_stack: Vec::new(),
            subrs,
            charstrings,
            flex_points: Vec::new(),
            in_flex: false,
        }
    }

    pub fn decode(mut self, charstring: &[u8]) -> FontResult<DecodedGlyph> {
        self.execute(charstring, 0)?;

        Ok(DecodedGlyph {
            advance: self.builder.advance,
            left_side_bearing: self.builder.left_side_bearing,
            outline: self.builder.finish(),
        })
    }

    fn execute(&mut self, bytes: &[u8], depth: u32) -> FontResult<Flow> {
        if depth > MAX_SUBR_CALLS {
            return Err(ParseError::InvalidData {
                table: "charstring subrs",
            });
        }

        let mut i = 0;

        while i < bytes.len() {
            let byte = bytes[i];
            i += 1;

            match byte {
                // y dy hstem (1) / x dx vstem (3): hints are parsed and
                // discarded, this build does not grid-fit
                1 | 3 => self.operand_stack.clear(),

                // dy vmoveto (4)
                4 => {
                    let dy = self.operand_stack.pop_front()?;
                    self.move_to(0.0, dy);
                    self.operand_stack.clear();
                }

                // dx dy rlineto (5)
                5 => {
                    let dx = self.operand_stack.pop_front()?;
                    let dy = self.operand_stack.pop_front()?;
                    self.builder.relative_line_to(dx, dy);
                    self.operand_stack.clear();
                }

                // dx hlineto (6)
                6 => {
                    let dx = self.operand_stack.pop_front()?;
                    self.builder.relative_line_to(dx, 0.0);
                    self.operand_stack.clear();
                }

                // dy vlineto (7)
                7 => {
                    let dy = self.operand_stack.pop_front()?;
                    self.builder.relative_line_to(0.0, dy);
                    self.operand_stack.clear();
                }

                // dx1 dy1 dx2 dy2 dx3 dy3 rrcurveto (8)
                8 => {
                    let dx1 = self.operand_stack.pop_front()?;
                    let dy1 = self.operand_stack.pop_front()?;
                    let dx2 = self.operand_stack.pop_front()?;
                    let dy2 = self.operand_stack.pop_front()?;
                    let dx3 = self.operand_stack.pop_front()?;
                    let dy3 = self.operand_stack.pop_front()?;
                    self.builder
                        .relative_cubic_curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
                    self.operand_stack.clear();
                }

                // closepath (9): closes the subpath without moving the
                // current point
                9 => {
                    let current = self.builder.current_point();
                    self.builder.close_path();
                    self.builder.update_current_point(current);
                    self.operand_stack.clear();
                }

                // subr# callsubr (10)
                10 => {
                    let n = self.operand_stack.pop()? as usize;
                    let subrs = self.subrs;
                    let subr = subrs.get(n).ok_or(ParseError::InvalidData {
                        table: "charstring subrs",
                    })?;

                    if self.execute(subr, depth + 1)? == Flow::Done {
                        return Ok(Flow::Done);
                    }
                }

                // return (11)
                11 => return Ok(Flow::Returned),

                // escape (12)
                12 => {
                    let escape = *bytes.get(i).ok_or(ParseError::UnexpectedEof)?;
                    i += 1;

                    if self.escape(escape)? == Flow::Done {
                        return Ok(Flow::Done);
                    }
                }

                // sbx wx hsbw (13)
                13 => {
                    let sbx = self.operand_stack.pop_front()?;
                    let wx = self.operand_stack.pop_front()?;
                    self.builder
                        .set_side_bearing_and_advance(Point::new(sbx, 0.0), Point::new(wx, 0.0));
                    self.operand_stack.clear();
                }

                // endchar (14)
                14 => return Ok(Flow::Done),

                // dx dy rmoveto (21)
                21 => {
                    let dx = self.operand_stack.pop_front()?;
                    let dy = self.operand_stack.pop_front()?;
                    self.move_to(dx, dy);
                    self.operand_stack.clear();
                }

                // dx hmoveto (22)
                22 => {
                    let dx = self.operand_stack.pop_front()?;
                    self.move_to(dx, 0.0);
                    self.operand_stack.clear();
                }

                // dy1 dx2 dy2 dx3 vhcurveto (30)
                30 => {
                    let dy1 = self.operand_stack.pop_front()?;
                    let dx2 = self.operand_stack.pop_front()?;
                    let dy2 = self.operand_stack.pop_front()?;
                    let dx3 = self.operand_stack.pop_front()?;
                    self.builder
                        .relative_cubic_curve_to(0.0, dy1, dx2, dy2, dx3, 0.0);
                    self.operand_stack.clear();
                }

                // dx1 dx2 dy2 dy3 hvcurveto (31)
                31 => {
                    let dx1 = self.operand_stack.pop_front()?;
                    let dx2 = self.operand_stack.pop_front()?;
                    let dy2 = self.operand_stack.pop_front()?;
                    let dy3 = self.operand_stack.pop_front()?;
                    self.builder
                        .relative_cubic_curve_to(dx1, 0.0, dx2, dy2, 0.0, dy3);
                    self.operand_stack.clear();
                }

                // A charstring byte containing a value, v, between 32 and
                // 246 inclusive, indicates the integer v - 139
                v @ 32..=246 => self.operand_stack.push(f32::from(v) - 139.0)?,

                // [(v - 247) * 256] + w + 108
                v @ 247..=250 => {
                    let w = *bytes.get(i).ok_or(ParseError::UnexpectedEof)?;
                    i += 1;

                    self.operand_stack
                        .push(((f32::from(v) - 247.0) * 256.0) + f32::from(w) + 108.0)?;
                }

                // -[(v - 251) * 256] - w - 108
                v @ 251..=254 => {
                    let w = *bytes.get(i).ok_or(ParseError::UnexpectedEof)?;
                    i += 1;

                    self.operand_stack
                        .push(-((f32::from(v) - 251.0) * 256.0) - f32::from(w) - 108.0)?;
                }

                // 255: the next four bytes are a two's complement signed
                // integer
                255 => {
                    let int = bytes
                        .get(i..i + 4)
                        .ok_or(ParseError::UnexpectedEof)
                        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))?;
                    i += 4;

                    self.operand_stack.push(int as f32)?;
                }

                _ => {
                    return Err(ParseError::InvalidData {
                        table: "charstring",
                    });
                }
            }
        }

        Ok(Flow::Returned)
    }

    fn escape(&mut self, escape: u8) -> FontResult<Flow> {
        match escape {
            // dotsection (12 0): hint related, nothing to build
            0 => self.operand_stack.clear(),

            // vstem3 (12 1) / hstem3 (12 2)
            1 | 2 => self.operand_stack.clear(),

            // asb adx ady bchar achar seac (12 6)
            6 => {
                let asb = self.operand_stack.pop_front()?;
                let adx = self.operand_stack.pop_front()?;
                let ady = self.operand_stack.pop_front()?;
                let bchar = self.operand_stack.pop_front()? as u8;
                let achar = self.operand_stack.pop_front()? as u8;
                self.operand_stack.clear();

                self.seac(asb, adx, ady, bchar, achar)?;

                return Ok(Flow::Done);
            }

            // sbx sby wx wy sbw (12 7)
            7 => {
                let sbx = self.operand_stack.pop_front()?;
                let sby = self.operand_stack.pop_front()?;
                let wx = self.operand_stack.pop_front()?;
                let wy = self.operand_stack.pop_front()?;
                self.builder
                    .set_side_bearing_and_advance(Point::new(sbx, sby), Point::new(wx, wy));
                self.operand_stack.clear();
            }

            // num1 num2 div (12 12)
            12 => {
                let num2 = self.operand_stack.pop()?;
                let num1 = self.operand_stack.pop()?;
                self.operand_stack.push(num1 / num2)?;
            }

            // arg1 ... argn n othersubr# callothersubr (12 16)
            16 => {
                let othersubr = self.operand_stack.pop()? as u32;
                let num_args = self.operand_stack.pop()? as usize;

                let mut args = Vec::with_capacity(num_args);
                for _ in 0..num_args {
                    args.push(self.operand_stack.pop()?);
                }
                args.reverse();

                self.call_othersubr(othersubr, &args)?;
            }

            // pop (12 17)
            17 => {
                let value = self.ps_stack.pop().unwrap_or(0.0);
                self.operand_stack.push(value)?;
            }

            // x y setcurrentpoint (12 33)
            33 => {
                let x = self.operand_stack.pop_front()?;
                let y = self.operand_stack.pop_front()?;
                self.builder.update_current_point(Point::new(x, y));
                self.operand_stack.clear();
            }

            _ => {
                return Err(ParseError::InvalidData {
                    table: "charstring",
                })
            }
        }

        Ok(Flow::Returned)
    }

    fn move_to(&mut self, dx: f32, dy: f32) {
        if self.in_flex {
            // flex reference and control points arrive as rmoveto commands
            let point = Point::new(
                self.builder.current_point().x + dx,
                self.builder.current_point().y + dy,
            );
            self.flex_points.push(point);
            self.builder.update_current_point(point);
        } else {
            self.builder.relative_move_to(dx, dy);
        }
    }

    fn call_othersubr(&mut self, othersubr: u32, args: &[f32]) -> FontResult<()> {
        match othersubr {
            // flex end: 7 accumulated points become two curves
            0 => {
                if !self.in_flex || self.flex_points.len() != 7 {
                    return Err(ParseError::InvalidData {
                        table: "charstring flex",
                    });
                }
                self.in_flex = false;

                let p = std::mem::take(&mut self.flex_points);
                // point 0 is the flex reference point and is not drawn
                self.builder.cubic_curve_to(p[1], p[2], p[3]);
                self.builder.cubic_curve_to(p[4], p[5], p[6]);

                // the final position is handed back for `pop pop
                // setcurrentpoint`
                let (x, y) = match args {
                    [_height, x, y] => (*x, *y),
                    _ => (p[6].x, p[6].y),
                };
                self.ps_stack.push(y);
                self.ps_stack.push(x);
            }

            // flex start
            1 => {
                self.in_flex = true;
                self.flex_points.clear();
            }

            // flex point collection: the preceding rmoveto already recorded
            // the point
            2 => {}

            // hint replacement: hand the subr number back to the following
            // `pop`
            3 => {
                self.ps_stack.push(args.first().copied().unwrap_or(0.0));
            }

            _ => {
                return Err(ParseError::InvalidData {
                    table: "charstring othersubr",
                })
            }
        }

        Ok(())
    }

    /// Standard-encoding accented character: the outlines of `bchar` and a
    /// translated `achar` are merged into this glyph.
    fn seac(&mut self, asb: f32, adx: f32, ady: f32, bchar: u8, achar: u8) -> FontResult<()> {
        let source = self.charstrings.ok_or(ParseError::InvalidData {
            table: "charstring seac",
        })?;

        let invalid = || ParseError::InvalidData {
            table: "charstring seac",
        };

        let base_cs = source.charstring_for_standard_code(bchar).ok_or_else(invalid)?;
        let base = CharstringDecoder::new(self.subrs, Some(source)).decode(base_cs)?;

        let accent_cs = source.charstring_for_standard_code(achar).ok_or_else(invalid)?;
        let mut accent = CharstringDecoder::new(self.subrs, Some(source)).decode(accent_cs)?;

        accent
            .outline
            .apply_transform(Matrix::new(1.0, 0.0, 0.0, 1.0, adx - asb, ady));

        self.builder.append(base.outline);
        self.builder.append(accent.outline);

        Ok(())
    }
}
