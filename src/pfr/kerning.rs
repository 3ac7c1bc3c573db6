//! PFR kerning: items partition the pair space, pairs within an item are
//! binary searched through a stream frame.

use crate::{
    error::{FontResult, ParseError},
    pfr::font::PhysFont,
    stream::{Frame, Stream},
};

pub const KERN_2BYTE_CHAR: u8 = 0x01;
pub const KERN_2BYTE_ADJ: u8 = 0x02;

/// Composite lookup key of a kerning pair.
pub fn kern_index(glyph1: u32, glyph2: u32) -> u32 {
    (glyph1 << 16) | (glyph2 & 0xFFFF)
}

/// One kerning item: a contiguous, sorted run of kerning pair records.
///
/// TABLE OVERVIEW (extra item type 4)
/// --------------
///
///   NAME        TYPE     DESCRIPTION
///
///   pair_count  BYTE
///   base_adjust SHORT    added to every stored adjustment
///   flags       BYTE     see `KERN_*` bits
///   pairs                pair records, sorted by composite key
///
/// Pair record, widths selected by `flags`:
///
///   glyph1      BYTE|USHORT
///   glyph2      BYTE|USHORT
///   adjustment  CHAR|SHORT
#[derive(Debug, Clone, Copy)]
pub struct KernItem {
    pub pair_count: u16,
    pub base_adjust: i16,
    pub flags: u8,
    /// Absolute file offset of the pair records
    pub offset: usize,
    pub pair_size: u8,
    /// Composite keys of the first and last pair, for the covering-item scan
    pub pair1: u32,
    pub pair2: u32,
}

fn pair_widths(flags: u8) -> (usize, usize) {
    let char_size = if flags & KERN_2BYTE_CHAR != 0 { 2 } else { 1 };
    let adj_size = if flags & KERN_2BYTE_ADJ != 0 { 2 } else { 1 };

    (char_size, adj_size)
}

fn read_pair_key(frame: &Frame, at: usize, char_size: usize) -> FontResult<u32> {
    Ok(if char_size == 2 {
        kern_index(
            u32::from(frame.peek_u16_be_at(at)?),
            u32::from(frame.peek_u16_be_at(at + 2)?),
        )
    } else {
        kern_index(
            u32::from(frame.peek_u8_at(at)?),
            u32::from(frame.peek_u8_at(at + 1)?),
        )
    })
}

pub(crate) fn parse_kern_item(
    frame: &mut Frame,
    item_offset: usize,
    font: &mut PhysFont,
) -> FontResult<()> {
    let pair_count = u16::from(frame.next_u8()?);
    let base_adjust = frame.next_i16_be()?;
    let flags = frame.next_u8()?;

    let (char_size, adj_size) = pair_widths(flags);
    let pair_size = 2 * char_size + adj_size;

    let pairs_start = frame.cursor();
    let pairs_len = pair_count as usize * pair_size;
    if pairs_start + pairs_len > frame.len() {
        return Err(ParseError::TooShort {
            table: "kerning item",
        });
    }

    if pair_count == 0 {
        return Ok(());
    }

    // the pairs must arrive sorted by composite key for the binary search
    let mut last = read_pair_key(frame, pairs_start, char_size)?;
    for n in 1..pair_count as usize {
        let key = read_pair_key(frame, pairs_start + n * pair_size, char_size)?;
        if key <= last {
            return Err(ParseError::InvalidTable {
                table: "kerning item",
            });
        }
        last = key;
    }

    let pair1 = read_pair_key(frame, pairs_start, char_size)?;
    let pair2 = read_pair_key(
        frame,
        pairs_start + (pair_count as usize - 1) * pair_size,
        char_size,
    )?;

    font.kern_items.push(KernItem {
        pair_count,
        base_adjust,
        flags,
        offset: item_offset + 4,
        pair_size: pair_size as u8,
        pair1,
        pair2,
    });

    Ok(())
}

/// Kerning adjustment for a glyph pair, `(0, 0)` when the pair is absent.
///
/// A linear scan finds the item covering the composite key, then a binary
/// search inside that item's byte range locates the exact pair. Field widths
/// are re-derived from the item flags on every probe.
pub fn get_kerning(
    stream: &mut Stream,
    items: &[KernItem],
    glyph1: u32,
    glyph2: u32,
) -> FontResult<(i32, i32)> {
    let code = kern_index(glyph1, glyph2);

    let item = match items.iter().find(|i| i.pair1 <= code && code <= i.pair2) {
        Some(item) => item,
        None => return Ok((0, 0)),
    };

    stream.seek(item.offset)?;
    let frame = stream.enter_frame(item.pair_count as usize * item.pair_size as usize)?;

    let mut min = 0u32;
    let mut max = u32::from(item.pair_count);

    while min < max {
        let mid = min + (max - min) / 2;

        // widths come from the item flags on each probe
        let (char_size, _) = pair_widths(item.flags);
        let at = mid as usize * item.pair_size as usize;

        let key = read_pair_key(&frame, at, char_size)?;

        if key == code {
            let adjust = if item.flags & KERN_2BYTE_ADJ != 0 {
                i32::from(frame.peek_i16_be_at(at + 2 * char_size)?)
            } else {
                i32::from(frame.peek_u8_at(at + 2 * char_size)? as i8)
            };

            return Ok((i32::from(item.base_adjust) + adjust, 0));
        }

        if key < code {
            min = mid + 1;
        } else {
            max = mid;
        }
    }

    Ok((0, 0))
}
