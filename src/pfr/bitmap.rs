//! Embedded bitmap (strike) support for PFR fonts.
//!
//! Strikes carry a per-size bitmap character table (bct) mapping char codes
//! to glyph bitmap records in the glyph program section. The records hold
//! variable-width metrics followed by the pixel data in one of three
//! packings: raw bits, nibble run lengths (RLE1) or byte run lengths (RLE2).

use crate::{
    error::{FontResult, ParseError},
    pfr::{font::PhysFont, header::PfrHeader},
    stream::{Frame, Stream},
};

/// Strike table width-selection bits (`flags0` of the strikes extra item)
pub const STRIKE_2BYTE_XPPM: u8 = 0x01;
pub const STRIKE_2BYTE_YPPM: u8 = 0x02;
pub const STRIKE_3BYTE_SIZE: u8 = 0x04;
pub const STRIKE_3BYTE_OFFSET: u8 = 0x08;
pub const STRIKE_2BYTE_COUNT: u8 = 0x10;

/// Per-strike flag bits
pub const BITMAP_2BYTE_CHARCODE: u8 = 0x01;
pub const BITMAP_2BYTE_SIZE: u8 = 0x02;
pub const BITMAP_3BYTE_OFFSET: u8 = 0x04;
/// Scanlines are stored top to bottom
pub const BITMAP_DECREASING: u8 = 0x20;

#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapStrike {
    pub x_ppm: u16,
    pub y_ppm: u16,
    pub flags: u8,
    pub bct_size: u32,
    pub bct_offset: u32,
    pub num_bitmaps: u32,
}

/// Strikes extra item (type 1).
///
/// TABLE OVERVIEW
/// --------------
///
///   NAME         TYPE           DESCRIPTION
///
///   bct_set_size UINT24         total bitmap char table size, skipped
///   flags0       BYTE           field widths for the records below
///   count        BYTE           number of strikes
///
/// then per strike, widths selected by `flags0`:
///
///   x_ppm        BYTE|USHORT
///   y_ppm        BYTE|USHORT
///   flags        BYTE
///   bct_size     USHORT|UINT24
///   bct_offset   USHORT|UINT24  absolute file offset of the strike's bct
///   num_bitmaps  BYTE|USHORT
pub(crate) fn parse_bitmap_strikes(
    frame: &mut Frame,
    _offset: usize,
    font: &mut PhysFont,
) -> FontResult<()> {
    frame.skip(3)?; // bct set size
    let flags0 = frame.next_u8()?;
    let count = frame.next_u8()?;

    for _ in 0..count {
        let mut strike = BitmapStrike::default();

        strike.x_ppm = if flags0 & STRIKE_2BYTE_XPPM != 0 {
            frame.next_u16_be()?
        } else {
            u16::from(frame.next_u8()?)
        };

        strike.y_ppm = if flags0 & STRIKE_2BYTE_YPPM != 0 {
            frame.next_u16_be()?
        } else {
            u16::from(frame.next_u8()?)
        };

        strike.flags = frame.next_u8()?;

        strike.bct_size = if flags0 & STRIKE_3BYTE_SIZE != 0 {
            frame.next_u24_be()?
        } else {
            u32::from(frame.next_u16_be()?)
        };

        strike.bct_offset = if flags0 & STRIKE_3BYTE_OFFSET != 0 {
            frame.next_u24_be()?
        } else {
            u32::from(frame.next_u16_be()?)
        };

        strike.num_bitmaps = if flags0 & STRIKE_2BYTE_COUNT != 0 {
            u32::from(frame.next_u16_be()?)
        } else {
            u32::from(frame.next_u8()?)
        };

        font.strikes.push(strike);
    }

    Ok(())
}

/// Binary search over a strike's `(char_code, size, offset)` records.
///
/// The record field widths depend on the strike flags and are re-derived on
/// every probe; a probe whose byte range would leave the frame reads as "not
/// found" rather than out of bounds.
pub fn lookup_bitmap_data(
    frame: &Frame,
    flags: u8,
    num_bitmaps: u32,
    char_code: u32,
) -> Option<(u32, u32)> {
    let mut min = 0u32;
    let mut max = num_bitmaps;

    while min < max {
        let mid = min + (max - min) / 2;

        // widths come from the flag bits on each probe
        let char_size: usize = if flags & BITMAP_2BYTE_CHARCODE != 0 { 2 } else { 1 };
        let size_size: usize = if flags & BITMAP_2BYTE_SIZE != 0 { 2 } else { 1 };
        let offset_size: usize = if flags & BITMAP_3BYTE_OFFSET != 0 { 3 } else { 2 };
        let record_size = char_size + size_size + offset_size;

        let record = mid as usize * record_size;
        if record + record_size > frame.len() {
            return None;
        }

        let code = if char_size == 2 {
            u32::from(frame.peek_u16_be_at(record).ok()?)
        } else {
            u32::from(frame.peek_u8_at(record).ok()?)
        };

        if code == char_code {
            let size = if size_size == 2 {
                u32::from(frame.peek_u16_be_at(record + char_size).ok()?)
            } else {
                u32::from(frame.peek_u8_at(record + char_size).ok()?)
            };

            let offset = if offset_size == 3 {
                frame.peek_u24_be_at(record + char_size + size_size).ok()?
            } else {
                u32::from(frame.peek_u16_be_at(record + char_size + size_size).ok()?)
            };

            return Some((size, offset));
        }

        if code < char_code {
            min = mid + 1;
        } else {
            max = mid;
        }
    }

    None
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BitmapMetrics {
    pub x_pos: i32,
    pub y_pos: i32,
    pub width: u32,
    pub height: u32,
    pub advance: i32,
    pub format: u8,
}

/// Decodes the variable-width metrics prefix of a bitmap record.
///
/// One leading flag byte packs four 2-bit selectors:
///
///   bits 0-1  position: nibble pair | INT8 pair | SHORT pair | INT24 pair
///   bits 2-3  size:     empty | nibble pair | BYTE pair | USHORT pair
///   bits 4-5  advance:  implicit | INT8 * 256 | SHORT | INT24
///   bits 6-7  pixel data format: 0 bytes, 1 RLE1, 2 RLE2
///
/// Every read is bounds-checked against the frame; truncation is an
/// `InvalidTable` error, never a garbage read.
pub fn load_bitmap_metrics(frame: &mut Frame, scaled_advance: i32) -> FontResult<BitmapMetrics> {
    fn invalid(_: ParseError) -> ParseError {
        ParseError::InvalidTable {
            table: "bitmap metrics",
        }
    }

    let flags = frame.next_u8().map_err(invalid)?;

    let mut metrics = BitmapMetrics::default();

    match flags & 3 {
        0 => {
            // both coordinates fit nibbles: x low, y high, sign extended
            let b = frame.next_u8().map_err(invalid)?;
            metrics.x_pos = (i32::from(b & 15) << 28) >> 28;
            metrics.y_pos = i32::from(b as i8 >> 4);
        }
        1 => {
            metrics.x_pos = i32::from(frame.next_i8().map_err(invalid)?);
            metrics.y_pos = i32::from(frame.next_i8().map_err(invalid)?);
        }
        2 => {
            metrics.x_pos = i32::from(frame.next_i16_be().map_err(invalid)?);
            metrics.y_pos = i32::from(frame.next_i16_be().map_err(invalid)?);
        }
        _ => {
            metrics.x_pos = frame.next_i24_be().map_err(invalid)?;
            metrics.y_pos = frame.next_i24_be().map_err(invalid)?;
        }
    }

    match (flags >> 2) & 3 {
        0 => {
            // blank image
            metrics.width = 0;
            metrics.height = 0;
        }
        1 => {
            let b = frame.next_u8().map_err(invalid)?;
            metrics.width = u32::from(b >> 4);
            metrics.height = u32::from(b & 15);
        }
        2 => {
            metrics.width = u32::from(frame.next_u8().map_err(invalid)?);
            metrics.height = u32::from(frame.next_u8().map_err(invalid)?);
        }
        _ => {
            metrics.width = u32::from(frame.next_u16_be().map_err(invalid)?);
            metrics.height = u32::from(frame.next_u16_be().map_err(invalid)?);
        }
    }

    match (flags >> 4) & 3 {
        0 => metrics.advance = scaled_advance,
        1 => metrics.advance = i32::from(frame.next_i8().map_err(invalid)?) * 256,
        2 => metrics.advance = i32::from(frame.next_i16_be().map_err(invalid)?),
        _ => metrics.advance = frame.next_i24_be().map_err(invalid)?,
    }

    metrics.format = flags >> 6;
    if metrics.format > 2 {
        return Err(ParseError::InvalidTable {
            table: "bitmap metrics",
        });
    }

    Ok(metrics)
}

/// Writes decoded bits into a packed 1bpp bitmap, wrapping to a new scanline
/// every `width` bits and stopping at exactly `width * height` bits.
struct BitWriter<'a> {
    buffer: &'a mut [u8],
    row_bytes: usize,
    width: usize,
    rows: usize,
    written: usize,
    total: usize,
    decreasing: bool,
}

impl<'a> BitWriter<'a> {
    fn new(buffer: &'a mut [u8], width: usize, rows: usize, decreasing: bool) -> Self {
        Self {
            buffer,
            row_bytes: (width + 7) / 8,
            width,
            rows,
            written: 0,
            total: width * rows,
            decreasing,
        }
    }

    fn remaining(&self) -> usize {
        self.total - self.written
    }

    fn write_bit(&mut self, on: bool) {
        if self.written >= self.total {
            return;
        }

        if on {
            let row = self.written / self.width;
            let col = self.written % self.width;
            let line = if self.decreasing {
                row
            } else {
                self.rows - 1 - row
            };

            self.buffer[line * self.row_bytes + col / 8] |= 0x80 >> (col % 8);
        }

        self.written += 1;
    }

    fn write_run(&mut self, count: usize, on: bool) {
        for _ in 0..count.min(self.remaining()) {
            self.write_bit(on);
        }
    }
}

/// Raw packing: each input byte supplies 8 bits, most significant first,
/// capped by both the input length and the declared pixel count.
fn decode_bytes(writer: &mut BitWriter, data: &[u8]) {
    let mut bits = writer.remaining().min(data.len() * 8);

    'outer: for &byte in data {
        for shift in (0..8).rev() {
            if bits == 0 {
                break 'outer;
            }
            writer.write_bit(byte >> shift & 1 != 0);
            bits -= 1;
        }
    }
}

/// RLE1: nibble run lengths, high nibble first, alternating on/off runs
/// starting with "on". A zero nibble is an empty run and merely toggles the
/// phase, which is how runs longer than 15 are encoded.
fn decode_rle1(writer: &mut BitWriter, data: &[u8]) {
    let mut on = true;
    let mut nibbles = data.iter().flat_map(|&b| [b >> 4, b & 15]);

    while writer.remaining() > 0 {
        match nibbles.next() {
            Some(count) => {
                writer.write_run(count as usize, on);
                on = !on;
            }
            None => break,
        }
    }
}

/// RLE2: one byte per run, same on/off alternation as RLE1.
fn decode_rle2(writer: &mut BitWriter, data: &[u8]) {
    let mut on = true;

    for &count in data {
        if writer.remaining() == 0 {
            break;
        }
        writer.write_run(count as usize, on);
        on = !on;
    }
}

#[derive(Debug)]
pub struct PfrBitmap {
    pub width: u32,
    pub height: u32,
    /// Bytes per scanline; negative for bottom-up storage
    pub pitch: i32,
    pub x_pos: i32,
    pub y_pos: i32,
    pub advance: i32,
    pub buffer: Vec<u8>,
}

/// Loads the embedded bitmap of `char_code` at the strike matching
/// `(x_ppm, y_ppm)`, or `Ok(None)` if no strike or no bitmap covers it.
pub fn slot_load_bitmap(
    stream: &mut Stream,
    header: &PfrHeader,
    font: &PhysFont,
    char_code: u32,
    x_ppm: u16,
    y_ppm: u16,
) -> FontResult<Option<PfrBitmap>> {
    let strike = match font
        .strikes
        .iter()
        .find(|s| s.x_ppm == x_ppm && s.y_ppm == y_ppm)
    {
        Some(strike) => *strike,
        None => return Ok(None),
    };

    stream.seek(strike.bct_offset as usize)?;
    let bct = stream.enter_frame(strike.bct_size as usize)?;

    let (gps_size, gps_offset) =
        match lookup_bitmap_data(&bct, strike.flags, strike.num_bitmaps, char_code) {
            Some(found) => found,
            None => return Ok(None),
        };
    drop(bct);

    let scaled_advance = match font.chars.binary_search_by(|c| c.char_code.cmp(&char_code)) {
        Ok(index) => font.chars[index].advance,
        Err(..) => 0,
    };

    stream.seek(header.gps_section_offset as usize + gps_offset as usize)?;
    let mut record = stream.enter_frame(gps_size as usize)?;

    let metrics = load_bitmap_metrics(&mut record, scaled_advance)?;

    let width = metrics.width as usize;
    let height = metrics.height as usize;
    let row_bytes = (width + 7) / 8;
    let decreasing = strike.flags & BITMAP_DECREASING != 0;

    let mut buffer = vec![0u8; row_bytes * height];

    if width > 0 && height > 0 {
        let data = record.next_bytes(record.remaining())?;
        let mut writer = BitWriter::new(&mut buffer, width, height, decreasing);

        match metrics.format {
            0 => decode_bytes(&mut writer, data),
            1 => decode_rle1(&mut writer, data),
            _ => decode_rle2(&mut writer, data),
        }
    }

    Ok(Some(PfrBitmap {
        width: metrics.width,
        height: metrics.height,
        pitch: if decreasing {
            row_bytes as i32
        } else {
            -(row_bytes as i32)
        },
        x_pos: metrics.x_pos,
        y_pos: metrics.y_pos,
        advance: metrics.advance,
        buffer,
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    fn on_pixels(buffer: &[u8]) -> u32 {
        buffer.iter().map(|b| b.count_ones()).sum()
    }

    #[test]
    fn rle1_decodes_exact_bit_count() {
        // 8x2 bitmap: runs 5 on, 3 off, 2 on, 6 off = 16 bits
        let data = [0x53, 0x26];
        let mut buffer = vec![0u8; 2];
        let mut writer = BitWriter::new(&mut buffer, 8, 2, true);

        decode_rle1(&mut writer, &data);

        assert_eq!(on_pixels(&buffer), 7);
        assert_eq!(buffer[0], 0b1111_1000); // 5 on, 3 off fill row 0
        assert_eq!(buffer[1], 0b1100_0000); // 2 on, 6 off fill row 1
    }

    #[test]
    fn rle1_zero_nibble_extends_runs() {
        // 15 on + 0 off + 5 on = 20 on bits in a 5x4 bitmap
        let data = [0xF0, 0x50];
        let mut buffer = vec![0u8; 4];
        let mut writer = BitWriter::new(&mut buffer, 5, 4, true);

        decode_rle1(&mut writer, &data);

        assert_eq!(on_pixels(&buffer), 20);
    }

    #[test]
    fn rle2_alternates_byte_runs() {
        // 4x4: 10 on, 6 off
        let data = [10, 6];
        let mut buffer = vec![0u8; 4];
        let mut writer = BitWriter::new(&mut buffer, 4, 4, true);

        decode_rle2(&mut writer, &data);

        assert_eq!(on_pixels(&buffer), 10);
        assert_eq!(buffer[0] >> 4, 0b1111);
        assert_eq!(buffer[3] >> 4, 0b0000);
    }

    #[test]
    fn bottom_up_rows_mirror_top_down() {
        let data = [0x40]; // 4 on, 0 off: first scanline all on in a 4x2 bitmap
        let mut top_down = vec![0u8; 2];
        let mut bottom_up = vec![0u8; 2];

        decode_rle1(&mut BitWriter::new(&mut top_down, 4, 2, true), &data);
        decode_rle1(&mut BitWriter::new(&mut bottom_up, 4, 2, false), &data);

        assert_eq!(top_down[0], 0b1111_0000);
        assert_eq!(top_down[1], 0);
        assert_eq!(bottom_up[0], 0);
        assert_eq!(bottom_up[1], 0b1111_0000);
    }

    #[test]
    fn packed_bytes_stop_at_pixel_count() {
        let data = [0xFF, 0xFF];
        let mut buffer = vec![0u8; 3]; // 3x3 = row_bytes(1) * rows(3)
        let mut writer = BitWriter::new(&mut buffer, 3, 3, true); // 9 pixels

        decode_bytes(&mut writer, &data);

        assert_eq!(on_pixels(&buffer), 9);
    }

    #[test]
    fn metrics_nibble_position_sign_extends() {
        // flags: pos=nibble (0), size=byte pair (2 << 2), advance=short (2 << 4)
        let bytes = [
            0b0010_1000,
            0xE5, // y = -2, x = 5
            10,
            12,
            0x01,
            0x00,
        ];
        let mut frame = Frame::from_bytes(&bytes);

        let metrics = load_bitmap_metrics(&mut frame, 0).unwrap();

        assert_eq!(metrics.x_pos, 5);
        assert_eq!(metrics.y_pos, -2);
        assert_eq!(metrics.width, 10);
        assert_eq!(metrics.height, 12);
        assert_eq!(metrics.advance, 256);
        assert_eq!(metrics.format, 0);
    }

    #[test]
    fn truncated_metrics_fail() {
        // flags ask for a short pair but only one byte follows
        let bytes = [0b0000_0010, 0x12];
        let mut frame = Frame::from_bytes(&bytes);

        assert!(load_bitmap_metrics(&mut frame, 0).is_err());
    }

    #[test]
    fn bitmap_lookup_narrow_and_wide_records() {
        // three records, 1-byte codes, 1-byte sizes, 2-byte offsets
        let narrow = [65u8, 10, 0, 100, 66, 12, 0, 110, 90, 8, 0, 130];
        let frame = Frame::from_bytes(&narrow);

        assert_eq!(lookup_bitmap_data(&frame, 0, 3, 66), Some((12, 110)));
        assert_eq!(lookup_bitmap_data(&frame, 0, 3, 67), None);

        // wide: 2-byte codes, 2-byte sizes, 3-byte offsets
        let mut wide = Vec::new();
        for (code, size, offset) in [(0x3042u16, 300u16, 0x010000u32), (0x3044, 310, 0x010200)] {
            wide.extend_from_slice(&code.to_be_bytes());
            wide.extend_from_slice(&size.to_be_bytes());
            wide.extend_from_slice(&offset.to_be_bytes()[1..]);
        }
        let frame = Frame::from_bytes(&wide);
        let flags = BITMAP_2BYTE_CHARCODE | BITMAP_2BYTE_SIZE | BITMAP_3BYTE_OFFSET;

        assert_eq!(
            lookup_bitmap_data(&frame, flags, 2, 0x3044),
            Some((310, 0x010200))
        );
    }

    #[test]
    fn bitmap_lookup_truncated_table_is_not_found() {
        // claims 3 records but only bytes for one and a half
        let bytes = [65u8, 10, 0, 100, 66, 12];
        let frame = Frame::from_bytes(&bytes);

        assert_eq!(lookup_bitmap_data(&frame, 0, 3, 90), None);
    }
}
