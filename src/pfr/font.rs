//! Logical and physical font records of a PFR container.

use crate::{
    error::{FontResult, ParseError},
    pfr::{bitmap, header::PfrHeader, kerning},
    stream::{Frame, Stream},
};

/// Logical font record flag bits
pub const LOG_STROKE: u8 = 0x01;
pub const LOG_2BYTE_STROKE: u8 = 0x02;
pub const LOG_BOLD: u8 = 0x04;
pub const LOG_2BYTE_BOLD: u8 = 0x08;
pub const LOG_EXTRA_ITEMS: u8 = 0x40;

/// Physical font record flag bits
pub const PHY_VERTICAL: u8 = 0x01;
pub const PHY_2BYTE_CHARCODE: u8 = 0x02;
pub const PHY_PROPORTIONAL: u8 = 0x04;
pub const PHY_ASCII_CODE: u8 = 0x08;
pub const PHY_2BYTE_GPS_SIZE: u8 = 0x10;
pub const PHY_3BYTE_GPS_OFFSET: u8 = 0x20;
pub const PHY_EXTRA_ITEMS: u8 = 0x80;

/// One entry of the physical font's character table: the char code plus the
/// location of the glyph program string that draws it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfrChar {
    pub char_code: u32,
    pub advance: i32,
    pub gps_size: u32,
    pub gps_offset: u32,
}

/// A logical font: a transform over a physical font.
///
/// TABLE OVERVIEW
/// --------------
///
///   NAME              TYPE       DESCRIPTION
///
///   matrix            LONG[4]    16.16 font matrix
///   flags             BYTE       see `LOG_*` bits
///   stroke_thickness  BYTE|SHORT present if LOG_STROKE
///   bold_thickness    BYTE|SHORT present if LOG_BOLD
///   extra items                  present if LOG_EXTRA_ITEMS
///   phys_size         USHORT     physical font record size
///   phys_offset       UINT24     physical font record offset
#[derive(Debug, Default)]
pub struct LogFont {
    pub matrix: [i32; 4],
    pub flags: u8,
    pub stroke_thickness: i32,
    pub bold_thickness: i32,
    pub phys_size: u32,
    pub phys_offset: u32,
}

/// A physical font: resolution, metrics, character table and the optional
/// extra items (strikes, kerning, stem snaps, font id).
#[derive(Debug, Default)]
pub struct PhysFont {
    pub font_ref_number: u16,
    pub outline_resolution: u16,
    pub metrics_resolution: u16,
    pub bbox: [i16; 4],
    pub flags: u8,
    pub standard_advance: i32,

    pub font_id: Option<String>,
    pub vert_stem_snaps: Vec<i16>,
    pub horz_stem_snaps: Vec<i16>,
    pub blue_values: Vec<i16>,

    pub strikes: Vec<bitmap::BitmapStrike>,
    pub kern_items: Vec<kerning::KernItem>,

    /// Sorted ascending by `char_code`
    pub chars: Vec<PfrChar>,
}

/// Handler for one extra-item type code. `item_offset` is the absolute file
/// position of the item's payload, for items whose records are re-read
/// through stream frames later (kerning).
pub(crate) type ExtraItemParser<T> = fn(&mut Frame, usize, &mut T) -> FontResult<()>;

/// Reads the `(size, type)`-prefixed trailing metadata of a record and
/// dispatches each item to its registered handler. Unknown type codes are
/// skipped using their declared length; a declared length that overruns the
/// record is an `InvalidTable` error.
pub(crate) fn extra_items_parse<T>(
    frame: &mut Frame,
    base_offset: usize,
    handlers: &[(u8, ExtraItemParser<T>)],
    dest: &mut T,
) -> FontResult<()> {
    let count = frame.next_u8()?;

    for _ in 0..count {
        let size = frame.next_u8()? as usize;
        let code = frame.next_u8()?;
        let item_offset = base_offset + frame.cursor();

        let payload = frame
            .next_bytes(size)
            .map_err(|_| ParseError::InvalidTable { table: "extra items" })?;

        match handlers.iter().find(|(c, _)| *c == code) {
            Some((_, parse)) => {
                let mut item = Frame::from_bytes(payload);
                parse(&mut item, item_offset, dest)?;
            }
            None => log::debug!("skipping unknown PFR extra item type {}", code),
        }
    }

    Ok(())
}

/// Number of fonts in the logical font directory.
pub fn log_font_count(stream: &mut Stream, header: &PfrHeader) -> FontResult<u16> {
    stream.seek(header.log_dir_offset as usize)?;
    let count = stream.read_u16_be()?;

    // each directory entry is 5 bytes (size + 24-bit offset)
    if 2 + count as usize * 5 > header.log_dir_size as usize {
        return Err(ParseError::InvalidTable {
            table: "logical font directory",
        });
    }

    Ok(count)
}

impl LogFont {
    pub fn load(stream: &mut Stream, header: &PfrHeader, index: u16) -> FontResult<Self> {
        let count = log_font_count(stream, header)?;
        if index >= count {
            return Err(ParseError::InvalidArgument { what: "face index" });
        }

        stream.seek(header.log_dir_offset as usize + 2 + index as usize * 5)?;
        let mut entry = stream.enter_frame(5)?;
        let size = entry.next_u16_be()? as usize;
        let offset = entry.next_u24_be()? as usize;
        drop(entry);

        stream.seek(offset)?;
        let mut frame = stream.enter_frame(size)?;

        let mut log_font = LogFont::default();

        for value in &mut log_font.matrix {
            *value = frame.next_i32_be()?;
        }

        log_font.flags = frame.next_u8()?;

        if log_font.flags & LOG_STROKE != 0 {
            log_font.stroke_thickness = if log_font.flags & LOG_2BYTE_STROKE != 0 {
                i32::from(frame.next_i16_be()?)
            } else {
                i32::from(frame.next_u8()?)
            };
        }

        if log_font.flags & LOG_BOLD != 0 {
            log_font.bold_thickness = if log_font.flags & LOG_2BYTE_BOLD != 0 {
                i32::from(frame.next_i16_be()?)
            } else {
                i32::from(frame.next_u8()?)
            };
        }

        if log_font.flags & LOG_EXTRA_ITEMS != 0 {
            // no logical-font extra items are recognized by this build
            extra_items_parse::<LogFont>(&mut frame, offset, &[], &mut log_font)?;
        }

        log_font.phys_size = u32::from(frame.next_u16_be()?);
        log_font.phys_offset = frame.next_u24_be()?;

        Ok(log_font)
    }
}

const PHY_FONT_EXTRA_ITEMS: &[(u8, ExtraItemParser<PhysFont>)] = &[
    (1, bitmap::parse_bitmap_strikes),
    (2, parse_font_id),
    (3, parse_stem_snaps),
    (4, kerning::parse_kern_item),
];

fn parse_font_id(frame: &mut Frame, _offset: usize, font: &mut PhysFont) -> FontResult<()> {
    let bytes = frame.next_bytes(frame.remaining())?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

    font.font_id = Some(String::from_utf8_lossy(&bytes[..end]).into_owned());

    Ok(())
}

fn parse_stem_snaps(frame: &mut Frame, _offset: usize, font: &mut PhysFont) -> FontResult<()> {
    let count = frame.next_u8()?;
    let num_vert = count & 15;
    let num_horz = count >> 4;

    for _ in 0..num_vert {
        font.vert_stem_snaps.push(frame.next_i16_be()?);
    }

    for _ in 0..num_horz {
        font.horz_stem_snaps.push(frame.next_i16_be()?);
    }

    Ok(())
}

impl PhysFont {
    /// TABLE OVERVIEW
    /// --------------
    ///
    ///   NAME                TYPE         DESCRIPTION
    ///
    ///   font_ref_number     USHORT
    ///   outline_resolution  USHORT       outline units per em
    ///   metrics_resolution  USHORT       metrics units per em
    ///   bbox                SHORT[4]     xMin yMin xMax yMax
    ///   flags               BYTE         see `PHY_*` bits
    ///   standard_advance    SHORT        present if !PHY_PROPORTIONAL
    ///   extra items                      present if PHY_EXTRA_ITEMS
    ///   num_aux             UINT24       auxiliary bytes, skipped
    ///   aux bytes           BYTE[num_aux]
    ///   num_blue_values     BYTE
    ///   blue_values         SHORT[n]
    ///   num_chars           USHORT
    ///   chars                            widths selected by `flags`
    pub fn load(stream: &mut Stream, offset: u32, size: u32) -> FontResult<Self> {
        let offset = offset as usize;

        stream.seek(offset)?;
        let mut frame = stream.enter_frame(size as usize)?;

        let mut font = PhysFont::default();

        font.font_ref_number = frame.next_u16_be()?;
        font.outline_resolution = frame.next_u16_be()?;
        font.metrics_resolution = frame.next_u16_be()?;
        for value in &mut font.bbox {
            *value = frame.next_i16_be()?;
        }
        font.flags = frame.next_u8()?;

        if font.flags & PHY_PROPORTIONAL == 0 {
            font.standard_advance = i32::from(frame.next_i16_be()?);
        }

        if font.flags & PHY_EXTRA_ITEMS != 0 {
            extra_items_parse(&mut frame, offset, PHY_FONT_EXTRA_ITEMS, &mut font)?;
        }

        let num_aux = frame.next_u24_be()? as usize;
        frame
            .skip(num_aux)
            .map_err(|_| ParseError::TooShort {
                table: "physical font",
            })?;

        let num_blues = frame.next_u8()?;
        for _ in 0..num_blues {
            font.blue_values.push(frame.next_i16_be()?);
        }

        let num_chars = frame.next_u16_be()?;
        font.chars.reserve(num_chars as usize);

        for _ in 0..num_chars {
            let char_code = if font.flags & PHY_2BYTE_CHARCODE != 0 {
                u32::from(frame.next_u16_be()?)
            } else {
                u32::from(frame.next_u8()?)
            };

            let advance = if font.flags & PHY_PROPORTIONAL != 0 {
                i32::from(frame.next_i16_be()?)
            } else {
                font.standard_advance
            };

            let gps_size = if font.flags & PHY_2BYTE_GPS_SIZE != 0 {
                u32::from(frame.next_u16_be()?)
            } else {
                u32::from(frame.next_u8()?)
            };

            let gps_offset = if font.flags & PHY_3BYTE_GPS_OFFSET != 0 {
                frame.next_u24_be()?
            } else {
                u32::from(frame.next_u16_be()?)
            };

            font.chars.push(PfrChar {
                char_code,
                advance,
                gps_size,
                gps_offset,
            });
        }

        // the char-map binary search relies on this ordering
        if font.chars.windows(2).any(|w| w[0].char_code >= w[1].char_code) {
            return Err(ParseError::InvalidTable {
                table: "physical font chars",
            });
        }

        Ok(font)
    }

    pub fn num_chars(&self) -> u32 {
        self.chars.len() as u32
    }
}
