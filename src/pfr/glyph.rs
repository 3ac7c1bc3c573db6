//! PFR glyph program string decoder.
//!
//! A glyph program encodes either a simple outline or a compound glyph made
//! of transformed sub-glyphs. Simple outlines carry two tables of controlled
//! coordinates (the stem-aligned X and Y positions of the design) followed by
//! an instruction stream whose arguments index those tables, encode small
//! deltas, or spell coordinates out in full.

use crate::{
    error::{FontResult, ParseError},
    geometry::{Matrix, Outline, OutlineBuilder, Point},
    pfr::{
        font::{PfrChar, PhysFont},
        header::PfrHeader,
    },
    stream::{Frame, Stream},
};

pub const GLYPH_IS_COMPOUND: u8 = 0x80;
pub const GLYPH_EXTRA_ITEMS: u8 = 0x10;
/// X and Y coordinate counts packed into the nibbles of a single byte
pub const GLYPH_1BYTE_XYCOUNT: u8 = 0x01;

/// Compound element: a scale transform is present
const ELEMENT_HAVE_SCALE: u8 = 0x01;

const MAX_COMPOUND_DEPTH: u32 = 4;

/// Instruction opcodes (high nibble of the instruction byte)
const OP_END: u8 = 0;
const OP_MOVE_TO: u8 = 1;
const OP_LINE_TO: u8 = 2;
const OP_CURVE_TO: u8 = 3;

/// Coordinate argument encodings (2 bits each in the low nibble of
/// move/line instructions: x in bits 2-3, y in bits 0-1)
const ARG_CONTROLLED: u8 = 0;
const ARG_DELTA: u8 = 1;
const ARG_ABSOLUTE: u8 = 2;
const ARG_SAME: u8 = 3;

#[derive(Debug)]
pub struct PfrGlyph {
    pub outline: Outline,
    /// Advance in metrics units
    pub advance: i32,
}

struct SimpleGlyphDecoder<'a, 'b> {
    frame: &'a mut Frame<'b>,
    x_control: Vec<i16>,
    y_control: Vec<i16>,
    builder: OutlineBuilder,
}

impl SimpleGlyphDecoder<'_, '_> {
    fn coordinate(&mut self, format: u8, current: f32, control: bool) -> FontResult<f32> {
        let table = if control {
            &self.x_control
        } else {
            &self.y_control
        };

        Ok(match format {
            ARG_CONTROLLED => {
                let index = self.frame.next_u8()? as usize;
                let value = table.get(index).copied().ok_or(ParseError::InvalidData {
                    table: "glyph program",
                })?;
                f32::from(value)
            }
            ARG_DELTA => current + f32::from(self.frame.next_i8()?),
            ARG_ABSOLUTE => f32::from(self.frame.next_i16_be()?),
            _ => current,
        })
    }

    fn point(&mut self, args: u8) -> FontResult<Point> {
        let current = self.builder.current_point();

        let x = self.coordinate((args >> 2) & 3, current.x, true)?;
        let y = self.coordinate(args & 3, current.y, false)?;

        Ok(Point::new(x, y))
    }

    /// A curve argument nibble selects delta or absolute encoding for all
    /// three points at once
    fn curve_points(&mut self, args: u8) -> FontResult<[Point; 3]> {
        let mut points = [Point::origin(); 3];
        let mut current = self.builder.current_point();

        for point in &mut points {
            *point = if args & 1 != 0 {
                Point::new(
                    current.x + f32::from(self.frame.next_i8()?),
                    current.y + f32::from(self.frame.next_i8()?),
                )
            } else {
                Point::new(
                    f32::from(self.frame.next_i16_be()?),
                    f32::from(self.frame.next_i16_be()?),
                )
            };
            current = *point;
        }

        Ok(points)
    }

    fn run(mut self) -> FontResult<Outline> {
        loop {
            let instruction = self.frame.next_u8()?;
            let args = instruction & 15;

            match instruction >> 4 {
                OP_END => break,
                OP_MOVE_TO => {
                    let point = self.point(args)?;
                    self.builder.move_to(point);
                }
                OP_LINE_TO => {
                    let point = self.point(args)?;
                    self.builder.line_to(point);
                }
                OP_CURVE_TO => {
                    let [control1, control2, end] = self.curve_points(args)?;
                    self.builder.cubic_curve_to(control1, control2, end);
                }
                _ => {
                    return Err(ParseError::InvalidData {
                        table: "glyph program",
                    })
                }
            }
        }

        Ok(self.builder.finish())
    }
}

fn parse_simple_glyph(frame: &mut Frame, flags: u8) -> FontResult<Outline> {
    let (x_count, y_count) = if flags & GLYPH_1BYTE_XYCOUNT != 0 {
        let count = frame.next_u8()?;
        (usize::from(count & 15), usize::from(count >> 4))
    } else {
        (usize::from(frame.next_u8()?), usize::from(frame.next_u8()?))
    };

    let mut x_control = Vec::with_capacity(x_count);
    let mut y_control = Vec::with_capacity(y_count);

    for _ in 0..x_count {
        x_control.push(frame.next_i16_be()?);
    }
    for _ in 0..y_count {
        y_control.push(frame.next_i16_be()?);
    }

    if flags & GLYPH_EXTRA_ITEMS != 0 {
        crate::pfr::font::extra_items_parse::<()>(frame, 0, &[], &mut ())?;
    }

    SimpleGlyphDecoder {
        frame,
        x_control,
        y_control,
        builder: OutlineBuilder::new(),
    }
    .run()
}

/// Decodes the glyph program at `gps_offset`, recursing into compound
/// elements. Every decoded contour is transformed by `transform` and
/// appended to `outline`.
fn load_glyph_data(
    stream: &mut Stream,
    header: &PfrHeader,
    gps_offset: u32,
    gps_size: u32,
    transform: Matrix,
    outline: &mut Outline,
    depth: u32,
) -> FontResult<()> {
    if depth > MAX_COMPOUND_DEPTH {
        return Err(ParseError::InvalidData {
            table: "glyph program",
        });
    }

    stream.seek(header.gps_section_offset as usize + gps_offset as usize)?;
    let record = stream.extract_frame(gps_size as usize)?;
    let mut frame = Frame::from_bytes(&record);

    let flags = frame.next_u8()?;

    if flags & GLYPH_IS_COMPOUND == 0 {
        let mut decoded = parse_simple_glyph(&mut frame, flags)?;
        decoded.apply_transform(transform);
        outline.contours.append(&mut decoded.contours);
        return Ok(());
    }

    // compound glyph: count, then one element record per sub-glyph
    let count = frame.next_u8()?;

    struct Element {
        transform: Matrix,
        gps_size: u32,
        gps_offset: u32,
    }

    let mut elements = Vec::with_capacity(usize::from(count));

    for _ in 0..count {
        let format = frame.next_u8()?;

        let (x_scale, y_scale) = if format & ELEMENT_HAVE_SCALE != 0 {
            (
                f32::from(frame.next_i16_be()?) / 16384.0,
                f32::from(frame.next_i16_be()?) / 16384.0,
            )
        } else {
            (1.0, 1.0)
        };

        let dx = f32::from(frame.next_i16_be()?);
        let dy = f32::from(frame.next_i16_be()?);
        let gps_size = u32::from(frame.next_u16_be()?);
        let gps_offset = frame.next_u24_be()?;

        elements.push(Element {
            // the element's local transform applies before the parent's
            transform: Matrix::new(x_scale, 0.0, 0.0, y_scale, dx, dy) * transform,
            gps_size,
            gps_offset,
        });
    }

    if flags & GLYPH_EXTRA_ITEMS != 0 {
        crate::pfr::font::extra_items_parse::<()>(&mut frame, 0, &[], &mut ())?;
    }

    drop(frame);
    drop(record);

    for element in elements {
        load_glyph_data(
            stream,
            header,
            element.gps_offset,
            element.gps_size,
            element.transform,
            outline,
            depth + 1,
        )?;
    }

    Ok(())
}

/// Loads the outline of one character table entry.
pub fn load_glyph(
    stream: &mut Stream,
    header: &PfrHeader,
    _font: &PhysFont,
    gchar: &PfrChar,
) -> FontResult<PfrGlyph> {
    let mut outline = Outline::empty();

    load_glyph_data(
        stream,
        header,
        gchar.gps_offset,
        gchar.gps_size,
        Matrix::identity(),
        &mut outline,
        0,
    )?;

    Ok(PfrGlyph {
        outline,
        advance: gchar.advance,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Segment;

    // a triangle using controlled coordinates and absolute/delta args
    fn simple_triangle_gps() -> Vec<u8> {
        let mut gps = Vec::new();

        gps.push(GLYPH_1BYTE_XYCOUNT); // flags: nibble-packed counts
        gps.push(0x12); // 2 x coords, 1 y coord

        gps.extend_from_slice(&10i16.to_be_bytes()); // x_control[0]
        gps.extend_from_slice(&30i16.to_be_bytes()); // x_control[1]
        gps.extend_from_slice(&0i16.to_be_bytes()); // y_control[0]

        // move to (x_control[0], y_control[0])
        gps.push(OP_MOVE_TO << 4 | (ARG_CONTROLLED << 2) | ARG_CONTROLLED);
        gps.extend_from_slice(&[0, 0]);

        // line to (x_control[1], same y)
        gps.push(OP_LINE_TO << 4 | (ARG_CONTROLLED << 2) | ARG_SAME);
        gps.push(1);

        // line to (delta -10, absolute 15)
        gps.push(OP_LINE_TO << 4 | (ARG_DELTA << 2) | ARG_ABSOLUTE);
        gps.push((-10i8) as u8);
        gps.extend_from_slice(&15i16.to_be_bytes());

        // close by returning to the start, then end
        gps.push(OP_LINE_TO << 4 | (ARG_CONTROLLED << 2) | ARG_CONTROLLED);
        gps.extend_from_slice(&[0, 0]);
        gps.push(OP_END << 4);

        gps
    }

    fn header_with_gps_at(offset: u32) -> PfrHeader {
        PfrHeader {
            gps_section_offset: offset,
            ..Default::default()
        }
    }

    #[test]
    fn simple_glyph_decodes_to_triangle() {
        let gps = simple_triangle_gps();
        let header = header_with_gps_at(0);
        let mut stream = Stream::from_bytes(&gps);

        let gchar = PfrChar {
            char_code: 65,
            advance: 600,
            gps_size: gps.len() as u32,
            gps_offset: 0,
        };

        let glyph = load_glyph(&mut stream, &header, &PhysFont::default(), &gchar).unwrap();

        assert_eq!(glyph.advance, 600);
        assert_eq!(glyph.outline.contours.len(), 1);

        let contour = &glyph.outline.contours[0];
        assert_eq!(contour.start, Point::new(10.0, 0.0));
        assert_eq!(contour.segments[0], Segment::Line { end: Point::new(30.0, 0.0) });
        assert_eq!(contour.segments[1], Segment::Line { end: Point::new(20.0, 15.0) });
        assert_eq!(contour.segments[2], Segment::Line { end: Point::new(10.0, 0.0) });
    }

    #[test]
    fn compound_glyph_transforms_sub_glyphs() {
        // layout: [simple glyph][compound glyph]
        let simple = simple_triangle_gps();

        let mut compound = Vec::new();
        compound.push(GLYPH_IS_COMPOUND);
        compound.push(1); // one element
        compound.push(0); // no scale
        compound.extend_from_slice(&100i16.to_be_bytes()); // dx
        compound.extend_from_slice(&(-20i16).to_be_bytes()); // dy
        compound.extend_from_slice(&(simple.len() as u16).to_be_bytes());
        compound.extend_from_slice(&[0, 0, 0]); // gps_offset = 0

        let mut file = simple.clone();
        let compound_offset = file.len() as u32;
        file.extend_from_slice(&compound);

        let header = header_with_gps_at(0);
        let mut stream = Stream::from_bytes(&file);

        let gchar = PfrChar {
            char_code: 65,
            advance: 600,
            gps_size: compound.len() as u32,
            gps_offset: compound_offset,
        };

        let glyph = load_glyph(&mut stream, &header, &PhysFont::default(), &gchar).unwrap();

        assert_eq!(glyph.outline.contours.len(), 1);
        assert_eq!(glyph.outline.contours[0].start, Point::new(110.0, -20.0));
    }

    #[test]
    fn out_of_range_controlled_index_fails() {
        let mut gps = Vec::new();
        gps.push(GLYPH_1BYTE_XYCOUNT);
        gps.push(0x11); // 1 x coord, 1 y coord
        gps.extend_from_slice(&10i16.to_be_bytes());
        gps.extend_from_slice(&0i16.to_be_bytes());
        gps.push(OP_MOVE_TO << 4 | (ARG_CONTROLLED << 2) | ARG_CONTROLLED);
        gps.extend_from_slice(&[7, 0]); // x index 7 out of range
        gps.push(OP_END << 4);

        let header = header_with_gps_at(0);
        let mut stream = Stream::from_bytes(&gps);

        let gchar = PfrChar {
            char_code: 65,
            advance: 0,
            gps_size: gps.len() as u32,
            gps_offset: 0,
        };

        assert!(load_glyph(&mut stream, &header, &PhysFont::default(), &gchar).is_err());
    }

    #[test]
    fn runaway_compound_recursion_is_capped() {
        // a compound glyph whose single element is itself
        let mut gps = Vec::new();
        gps.push(GLYPH_IS_COMPOUND);
        gps.push(1);
        gps.push(0);
        gps.extend_from_slice(&0i16.to_be_bytes());
        gps.extend_from_slice(&0i16.to_be_bytes());
        gps.extend_from_slice(&12u16.to_be_bytes()); // own size
        gps.extend_from_slice(&[0, 0, 0]); // own offset

        let header = header_with_gps_at(0);
        let mut stream = Stream::from_bytes(&gps);

        let gchar = PfrChar {
            char_code: 65,
            advance: 0,
            gps_size: gps.len() as u32,
            gps_offset: 0,
        };

        assert!(load_glyph(&mut stream, &header, &PhysFont::default(), &gchar).is_err());
    }
}
