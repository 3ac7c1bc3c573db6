//! TrueType `cmap` sub-table support, formats 0, 2, 4, 6, 8, 10 and 12.
//!
//! Sub-tables are never materialized: validators and lookups work directly
//! on the raw big-endian bytes, so a mapping stays valid exactly as long as
//! the font file buffer behind it. Each format supplies `validate`,
//! `char_index` (0 for a missing glyph) and `char_next` (the smallest valid
//! char code strictly greater than the argument, with its glyph index, or
//! `(0, 0)` when exhausted).

use crate::error::{FontResult, ParseError};

/// How hard a validator tries.
///
/// `Default` accepts the minor spec violations found in popular real-world
/// fonts; `Tight` additionally verifies every glyph index; `Paranoid`
/// rejects everything the specification forbids. Checks are written as
/// `level >= X`, so a stricter level never accepts more than a looser one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationLevel {
    Default,
    Tight,
    Paranoid,
}

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    pub level: ValidationLevel,
    pub num_glyphs: u32,
}

fn too_short() -> ParseError {
    ParseError::TooShort { table: "cmap" }
}

fn invalid_data() -> ParseError {
    ParseError::InvalidData { table: "cmap" }
}

fn invalid_offset() -> ParseError {
    ParseError::InvalidOffset { table: "cmap" }
}

fn invalid_glyph_id(glyph_id: u32, num_glyphs: u32) -> ParseError {
    ParseError::InvalidGlyphId {
        glyph_id,
        num_glyphs,
    }
}

fn peek_u8(table: &[u8], at: usize) -> Option<u32> {
    table.get(at).map(|&b| u32::from(b))
}

fn peek_u16(table: &[u8], at: usize) -> Option<u32> {
    Some(u32::from(u16::from_be_bytes([
        *table.get(at)?,
        *table.get(at + 1)?,
    ])))
}

fn peek_i16(table: &[u8], at: usize) -> Option<i32> {
    peek_u16(table, at).map(|v| i32::from(v as u16 as i16))
}

fn peek_u32(table: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes([
        *table.get(at)?,
        *table.get(at + 1)?,
        *table.get(at + 2)?,
        *table.get(at + 3)?,
    ]))
}

fn req_u16(table: &[u8], at: usize) -> FontResult<u32> {
    peek_u16(table, at).ok_or_else(too_short)
}

fn req_u32(table: &[u8], at: usize) -> FontResult<u32> {
    peek_u32(table, at).ok_or_else(too_short)
}

/*************************************************************************/
/*                               FORMAT 0                                */
/*                                                                       */
/*   NAME        OFFSET  TYPE       DESCRIPTION                          */
/*                                                                       */
/*   format      0       USHORT     must be 0                            */
/*   length      2       USHORT     table length in bytes                */
/*   language    4       USHORT    Mac language code                     */
/*   glyph_ids   6       BYTE[256]  array of glyph indices               */
/*                                                                       */
/*************************************************************************/

fn cmap0_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    let length = req_u16(table, 2)? as usize;

    if length > table.len() || length < 262 {
        return Err(too_short());
    }

    // check glyph indices whenever necessary
    if valid.level >= ValidationLevel::Tight {
        for n in 0..256 {
            let idx = peek_u8(table, 6 + n).ok_or_else(too_short)?;
            if idx >= valid.num_glyphs {
                return Err(invalid_glyph_id(idx, valid.num_glyphs));
            }
        }
    }

    Ok(())
}

fn cmap0_char_index(table: &[u8], char_code: u32) -> u32 {
    if char_code < 256 {
        peek_u8(table, 6 + char_code as usize).unwrap_or(0)
    } else {
        0
    }
}

fn cmap0_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut charcode = char_code;

    while charcode + 1 < 256 {
        charcode += 1;
        let gindex = peek_u8(table, 6 + charcode as usize).unwrap_or(0);
        if gindex != 0 {
            return (charcode, gindex);
        }
    }

    (0, 0)
}

/*************************************************************************/
/*                               FORMAT 2                                */
/*                                                                       */
/* Mixed 8/16-bit CJK encodings: a 256-entry key table maps the high     */
/* byte of a code to one of NSUBS sub-headers (each key is the           */
/* sub-header index times eight). Sub-header 0 covers the plain one-byte */
/* codes.                                                                */
/*                                                                       */
/*   NAME        OFFSET       TYPE            DESCRIPTION                */
/*                                                                       */
/*   format      0            USHORT          must be 2                  */
/*   length      2            USHORT          table length in bytes      */
/*   language    4            USHORT          Mac language code          */
/*   keys        6            USHORT[256]     sub-header keys            */
/*   subs        518          SUBHEAD[NSUBS]  sub-header array           */
/*   glyph_ids   518+NSUB*8   USHORT[]        glyph id array             */
/*                                                                       */
/* Each sub-header is (first, count, delta, offset); `offset` is a byte  */
/* distance from its own field position into the glyph id array, or 0   */
/* for "no glyphs".                                                      */
/*************************************************************************/

fn cmap2_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    let length = req_u16(table, 2)? as usize;

    if length > table.len() || length < 6 + 512 {
        return Err(too_short());
    }

    // parse keys to compute the sub-header count
    let mut max_subs = 0;
    for n in 0..256 {
        let idx = req_u16(table, 6 + n * 2)?;

        // values must be multiples of 8
        if valid.level >= ValidationLevel::Paranoid && idx & 7 != 0 {
            return Err(invalid_data());
        }

        max_subs = max_subs.max(idx >> 3);
    }

    let subs = 518usize;
    let glyph_ids = subs + (max_subs as usize + 1) * 8;
    if glyph_ids > table.len() {
        return Err(too_short());
    }

    // parse sub-headers
    for n in 0..=max_subs as usize {
        let sub = subs + n * 8;

        let first_code = req_u16(table, sub)?;
        let code_count = req_u16(table, sub + 2)?;
        let delta = peek_i16(table, sub + 4).ok_or_else(too_short)?;
        let offset = req_u16(table, sub + 6)? as usize;

        // check range within 0..255
        if valid.level >= ValidationLevel::Paranoid
            && (first_code >= 256 || first_code + code_count > 256)
        {
            return Err(invalid_data());
        }

        if offset != 0 {
            // `offset` is relative to its own field position
            let ids = sub + 6 + offset;
            if ids < glyph_ids || ids + code_count as usize * 2 > length {
                return Err(invalid_offset());
            }

            if valid.level >= ValidationLevel::Tight {
                for i in 0..code_count as usize {
                    let idx = req_u16(table, ids + i * 2)?;
                    if idx != 0 {
                        let idx = (idx as i32 + delta) as u32 & 0xFFFF;
                        if idx >= valid.num_glyphs {
                            return Err(invalid_glyph_id(idx, valid.num_glyphs));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Byte offset of the sub-header covering `char_code`, or `None` for a code
/// the key table rejects.
fn cmap2_get_subheader(table: &[u8], char_code: u32) -> Option<usize> {
    if char_code >= 0x10000 {
        return None;
    }

    let char_lo = (char_code & 0xFF) as usize;
    let char_hi = (char_code >> 8) as usize;
    let subs = 518;

    if char_hi == 0 {
        // an 8-bit character code: sub-header 0, valid only if the key for
        // this byte is 0
        if peek_u16(table, 6 + char_lo * 2)? != 0 {
            return None;
        }
        Some(subs)
    } else {
        let key = peek_u16(table, 6 + char_hi * 2)?;
        let sub = subs + (key & !7u32) as usize;

        // the high byte must not be a valid one-byte code
        if sub == subs {
            return None;
        }
        Some(sub)
    }
}

fn cmap2_char_index(table: &[u8], char_code: u32) -> u32 {
    let sub = match cmap2_get_subheader(table, char_code) {
        Some(sub) => sub,
        None => return 0,
    };

    let start = match peek_u16(table, sub) {
        Some(v) => v,
        None => return 0,
    };
    let count = peek_u16(table, sub + 2).unwrap_or(0);
    let delta = peek_i16(table, sub + 4).unwrap_or(0);
    let offset = peek_u16(table, sub + 6).unwrap_or(0) as usize;

    let idx = (char_code & 0xFF).wrapping_sub(start);

    if idx < count && offset != 0 {
        let at = sub + 6 + offset + 2 * idx as usize;
        let idx = peek_u16(table, at).unwrap_or(0);

        if idx != 0 {
            return (idx as i32 + delta) as u32 & 0xFFFF;
        }
    }

    0
}

fn cmap2_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut charcode = char_code + 1;

    while charcode < 0x10000 {
        let sub = match cmap2_get_subheader(table, charcode) {
            Some(sub) => sub,
            None => {
                // jump to the next sub-header, i.e. higher byte value
                charcode = (charcode & !0xFFu32) + 256;
                continue;
            }
        };

        let start = peek_u16(table, sub).unwrap_or(0);
        let count = peek_u16(table, sub + 2).unwrap_or(0);
        let delta = peek_i16(table, sub + 4).unwrap_or(0);
        let offset = peek_u16(table, sub + 6).unwrap_or(0) as usize;

        if offset != 0 {
            let mut char_lo = charcode & 0xFF;
            let mut pos = if char_lo < start {
                char_lo = start;
                0
            } else {
                char_lo - start
            };

            charcode = (charcode & !0xFFu32) + char_lo;

            while pos < count {
                let at = sub + 6 + offset + 2 * pos as usize;
                let idx = peek_u16(table, at).unwrap_or(0);

                if idx != 0 {
                    let gindex = (idx as i32 + delta) as u32 & 0xFFFF;
                    if gindex != 0 {
                        return (charcode, gindex);
                    }
                }

                pos += 1;
                charcode += 1;
            }
        }

        charcode = (charcode & !0xFFu32) + 256;
    }

    (0, 0)
}

/*************************************************************************/
/*                               FORMAT 4                                */
/*                                                                       */
/*   NAME          OFFSET         TYPE              DESCRIPTION          */
/*                                                                       */
/*   format        0              USHORT            must be 4            */
/*   length        2              USHORT            table length         */
/*   language      4              USHORT            Mac language code    */
/*   segCountX2    6              USHORT            2 * NUM_SEGS         */
/*   searchRange   8              USHORT            2 * (1 << LOG_SEGS)  */
/*   entrySelector 10             USHORT            LOG_SEGS             */
/*   rangeShift    12             USHORT                                 */
/*   endCount      14             USHORT[NUM_SEGS]  last is 0xFFFF       */
/*   pad           14+NUM_SEGS*2  USHORT                                 */
/*   startCount    16+NUM_SEGS*2  USHORT[NUM_SEGS]                       */
/*   idDelta       16+NUM_SEGS*4  SHORT[NUM_SEGS]                        */
/*   idOffset      16+NUM_SEGS*6  USHORT[NUM_SEGS]                       */
/*   glyphIds      16+NUM_SEGS*8  USHORT[]                               */
/*                                                                       */
/* Segments are ordered, non-overlapping char code intervals. A zero     */
/* idOffset maps a code by adding idDelta modulo 65536; otherwise the    */
/* offset indexes into glyphIds relative to its own field position.     */
/*                                                                       */
/* Certain fonts carry an invalid final segment with start = end =       */
/* 0xFFFF, delta = 1, offset = 0xFFFF meaning "missing glyph"; it is     */
/* accepted below paranoid level.                                        */
/*************************************************************************/

fn cmap4_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    let mut length = req_u16(table, 2)? as usize;

    // in certain fonts the length field is invalid and goes out of bounds;
    // clamp it below tight level
    if length < 16 {
        return Err(too_short());
    }
    if length > table.len() {
        if valid.level >= ValidationLevel::Tight {
            return Err(too_short());
        }
        length = table.len();
    }

    let seg_count_x2 = req_u16(table, 6)? as usize;

    if valid.level >= ValidationLevel::Paranoid && seg_count_x2 & 1 != 0 {
        return Err(invalid_data());
    }

    let num_segs = seg_count_x2 / 2;

    // the binary-search parameters are never used for lookup, but paranoid
    // validation still checks them
    if valid.level >= ValidationLevel::Paranoid {
        let search_range = req_u16(table, 8)?;
        let entry_selector = req_u16(table, 10)?;
        let range_shift = req_u16(table, 12)?;

        if (search_range | range_shift) & 1 != 0 {
            return Err(invalid_data());
        }

        let search_range = search_range / 2;
        let range_shift = range_shift / 2;
        let num_segs = num_segs as u32;

        if search_range > num_segs
            || search_range * 2 < num_segs
            || search_range + range_shift != num_segs
            || search_range != 1 << entry_selector
        {
            return Err(invalid_data());
        }
    }

    let ends = 14;
    let starts = 16 + num_segs * 2;
    let deltas = starts + num_segs * 2;
    let offsets = deltas + num_segs * 2;
    let glyph_ids = offsets + num_segs * 2;

    if glyph_ids > length {
        return Err(too_short());
    }

    // the last segment's end count must be 0xFFFF
    if valid.level >= ValidationLevel::Paranoid && num_segs > 0 {
        if req_u16(table, ends + (num_segs - 1) * 2)? != 0xFFFF {
            return Err(invalid_data());
        }
    }

    // segments must be sorted in increasing order without overlap, and
    // their offsets must stay within the glyph id array
    let mut last = 0;
    for n in 0..num_segs {
        let start = req_u16(table, starts + n * 2)?;
        let end = req_u16(table, ends + n * 2)?;
        let delta = peek_i16(table, deltas + n * 2).ok_or_else(too_short)?;
        let offset = req_u16(table, offsets + n * 2)? as usize;

        if start > end {
            return Err(invalid_data());
        }

        // overlap should be an error at default level, but some popular
        // Asian fonts present overlapping ranges in their charmaps
        if valid.level >= ValidationLevel::Tight && n > 0 && start <= last {
            return Err(invalid_data());
        }

        if offset != 0 && offset != 0xFFFF {
            let ids = offsets + n * 2 + offset;

            if ids < glyph_ids || ids + (end - start + 1) as usize * 2 > length {
                return Err(invalid_data());
            }

            if valid.level >= ValidationLevel::Tight {
                for i in 0..(end - start) as usize {
                    let idx = req_u16(table, ids + i * 2)?;
                    if idx != 0 {
                        let idx = (idx as i32 + delta) as u32 & 0xFFFF;
                        if idx >= valid.num_glyphs {
                            return Err(invalid_glyph_id(idx, valid.num_glyphs));
                        }
                    }
                }
            }
        } else if offset == 0xFFFF {
            // some fonts (erroneously?) use a range offset of 0xFFFF to
            // mean "missing glyph"
            if valid.level >= ValidationLevel::Paranoid
                || n != num_segs - 1
                || !(start == 0xFFFF && end == 0xFFFF && delta == 1)
            {
                return Err(invalid_data());
            }
        }

        last = end;
    }

    Ok(())
}

fn cmap4_char_index(table: &[u8], char_code: u32) -> u32 {
    if char_code >= 0x10000 {
        return 0;
    }

    let code = char_code;
    let num_segs2 = (peek_u16(table, 6).unwrap_or(0) & !1u32) as usize; // be paranoid!

    // binary search over the segments; some fonts have more than 170
    let mut min = 0usize;
    let mut max = num_segs2 / 2;

    while min < max {
        let mid = (min + max) / 2;

        let end = match peek_u16(table, 14 + mid * 2) {
            Some(v) => v,
            None => return 0,
        };
        let start = match peek_u16(table, 16 + num_segs2 + mid * 2) {
            Some(v) => v,
            None => return 0,
        };

        if code < start {
            max = mid;
        } else if code > end {
            min = mid + 1;
        } else {
            // we found the segment
            let delta = peek_i16(table, 16 + num_segs2 * 2 + mid * 2).unwrap_or(0);
            let offset_at = 16 + num_segs2 * 3 + mid * 2;
            let offset = peek_u16(table, offset_at).unwrap_or(0);

            if offset == 0xFFFF {
                return 0;
            }

            let mut idx = code;
            if offset != 0 {
                let at = offset_at + offset as usize + 2 * (idx - start) as usize;
                idx = peek_u16(table, at).unwrap_or(0);
                if idx == 0 {
                    return 0;
                }
            }

            return (idx as i32 + delta) as u32 & 0xFFFF;
        }
    }

    0
}

fn cmap4_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    if char_code + 1 >= 0x10000 {
        return (0, 0);
    }

    let mut code = char_code + 1;
    let num_segs2 = (peek_u16(table, 6).unwrap_or(0) & !1u32) as usize; // ensure even-ness
    let num_segs = num_segs2 / 2;

    'retry: loop {
        for n in 0..num_segs {
            let end = peek_u16(table, 14 + n * 2).unwrap_or(0);
            let start = peek_u16(table, 16 + num_segs2 + n * 2).unwrap_or(0);

            if code < start {
                code = start;
            }

            if code <= end {
                let delta = peek_i16(table, 16 + num_segs2 * 2 + n * 2).unwrap_or(0);
                let offset_at = 16 + num_segs2 * 3 + n * 2;
                let offset = peek_u16(table, offset_at).unwrap_or(0);

                let mut gindex = 0;

                if offset != 0 && offset != 0xFFFF {
                    // parse the glyph ids array for a non-0 index
                    while code <= end {
                        let at = offset_at + offset as usize + (code - start) as usize * 2;
                        let idx = peek_u16(table, at).unwrap_or(0);

                        if idx != 0 {
                            gindex = (idx as i32 + delta) as u32 & 0xFFFF;
                            if gindex != 0 {
                                break;
                            }
                        }
                        code += 1;
                    }
                } else if offset == 0xFFFF {
                    // an offset of 0xFFFF means an empty segment in certain
                    // fonts
                    code = u32::from(end);
                    break;
                } else {
                    gindex = (code as i32 + delta) as u32 & 0xFFFF;
                }

                if gindex == 0 {
                    break;
                }

                return (code, gindex);
            }
        }

        // loop to the next trial charcode
        if code >= 0xFFFF {
            return (0, 0);
        }

        code += 1;
        continue 'retry;
    }
}

/*************************************************************************/
/*                               FORMAT 6                                */
/*                                                                       */
/*   NAME        OFFSET  TYPE           DESCRIPTION                      */
/*                                                                       */
/*   format      0       USHORT         must be 6                        */
/*   length      2       USHORT         table length in bytes            */
/*   language    4       USHORT         Mac language code                */
/*   first       6       USHORT         first segment code               */
/*   count       8       USHORT         segment size in chars            */
/*   glyphIds    10      USHORT[count]  glyph ids                        */
/*                                                                       */
/* A very simplified segment mapping.                                    */
/*************************************************************************/

fn cmap6_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    if table.len() < 10 {
        return Err(too_short());
    }

    let length = req_u16(table, 2)? as usize;
    let count = req_u16(table, 8)? as usize;

    if length > table.len() || length < 10 + count * 2 {
        return Err(too_short());
    }

    // check glyph indices
    if valid.level >= ValidationLevel::Tight {
        for n in 0..count {
            let gindex = req_u16(table, 10 + n * 2)?;
            if gindex >= valid.num_glyphs {
                return Err(invalid_glyph_id(gindex, valid.num_glyphs));
            }
        }
    }

    Ok(())
}

fn cmap6_char_index(table: &[u8], char_code: u32) -> u32 {
    let start = peek_u16(table, 6).unwrap_or(0);
    let count = peek_u16(table, 8).unwrap_or(0);

    let idx = char_code.wrapping_sub(start);

    if idx < count {
        peek_u16(table, 10 + 2 * idx as usize).unwrap_or(0)
    } else {
        0
    }
}

fn cmap6_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut char_code = char_code + 1;

    if char_code >= 0x10000 {
        return (0, 0);
    }

    let start = peek_u16(table, 6).unwrap_or(0);
    let count = peek_u16(table, 8).unwrap_or(0);

    if char_code < start {
        char_code = start;
    }

    let mut idx = char_code - start;

    while idx < count {
        let gindex = peek_u16(table, 10 + 2 * idx as usize).unwrap_or(0);
        if gindex != 0 {
            return (char_code, gindex);
        }

        idx += 1;
        char_code += 1;
    }

    (0, 0)
}

/*************************************************************************/
/*                               FORMAT 8                                */
/*                                                                       */
/* Maps UTF-16 text, including surrogate pairs, to glyph indices. The    */
/* embedded `is32` bitmap flags which 16-bit values are the halves of    */
/* 32-bit (surrogate pair) codes.                                        */
/*                                                                       */
/*   NAME        OFFSET  TYPE        DESCRIPTION                         */
/*                                                                       */
/*   format      0       USHORT      must be 8                           */
/*   reserved    2       USHORT                                          */
/*   length      4       ULONG       length in bytes                     */
/*   language    8       ULONG       Mac language code                   */
/*   is32        12      BYTE[8192]  32-bitness bitmap                   */
/*   count       8204    ULONG       number of groups                    */
/*                                                                       */
/* followed by `count` groups of (start, end, startId), each ULONG.      */
/*************************************************************************/

fn cmap8_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    if table.len() < 16 + 8192 {
        return Err(too_short());
    }

    let length = req_u32(table, 4)? as usize;
    if length > table.len() || length < 8208 {
        return Err(too_short());
    }

    let is32 = 12;
    let num_groups = req_u32(table, 8204)? as usize;

    if 8208 + num_groups * 12 > table.len() {
        return Err(too_short());
    }

    // check that the groups are in increasing order
    let mut last = 0;
    for n in 0..num_groups {
        let group = 8208 + n * 12;

        let start = req_u32(table, group)?;
        let end = req_u32(table, group + 4)?;
        let start_id = req_u32(table, group + 8)?;

        if start > end {
            return Err(invalid_data());
        }

        if n > 0 && start <= last {
            return Err(invalid_data());
        }

        if valid.level >= ValidationLevel::Tight {
            let last_id = start_id.saturating_add(end - start);
            if last_id >= valid.num_glyphs {
                return Err(invalid_glyph_id(last_id, valid.num_glyphs));
            }

            // the group ranges and the is32 bitmap must agree on which
            // codes are 32-bit
            let bit = |v: u32| -> FontResult<bool> {
                let byte = peek_u8(table, is32 + (v >> 3) as usize).ok_or_else(too_short)?;
                Ok(byte & (0x80 >> (v & 7)) != 0)
            };

            if start & !0xFFFF != 0 {
                for code in start..=end {
                    let hi = code >> 16;
                    let lo = code & 0xFFFF;

                    if !bit(hi)? || !bit(lo)? {
                        return Err(invalid_data());
                    }
                }
            } else {
                // end_hi cannot be != 0 here
                if end & !0xFFFF != 0 {
                    return Err(invalid_data());
                }

                for code in start..=end {
                    if bit(code & 0xFFFF)? {
                        return Err(invalid_data());
                    }
                }
            }
        }

        last = end;
    }

    Ok(())
}

fn cmap8_char_index(table: &[u8], char_code: u32) -> u32 {
    let num_groups = peek_u32(table, 8204).unwrap_or(0) as usize;

    for n in 0..num_groups {
        let group = 8208 + n * 12;

        let start = peek_u32(table, group).unwrap_or(0);
        let end = peek_u32(table, group + 4).unwrap_or(0);
        let start_id = peek_u32(table, group + 8).unwrap_or(0);

        if char_code < start {
            break;
        }

        if char_code <= end {
            return start_id.wrapping_add(char_code - start);
        }
    }

    0
}

fn cmap8_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut char_code = match char_code.checked_add(1) {
        Some(code) => code,
        None => return (0, 0),
    };
    let num_groups = peek_u32(table, 8204).unwrap_or(0) as usize;

    for n in 0..num_groups {
        let group = 8208 + n * 12;

        let start = peek_u32(table, group).unwrap_or(0);
        let end = peek_u32(table, group + 4).unwrap_or(0);
        let start_id = peek_u32(table, group + 8).unwrap_or(0);

        if char_code < start {
            char_code = start;
        }

        if char_code <= end {
            let gindex = start_id.wrapping_add(char_code - start);
            if gindex != 0 {
                return (char_code, gindex);
            }
        }
    }

    (0, 0)
}

/*************************************************************************/
/*                               FORMAT 10                               */
/*                                                                       */
/*   NAME       OFFSET  TYPE           DESCRIPTION                       */
/*                                                                       */
/*   format     0       USHORT         must be 10                        */
/*   reserved   2       USHORT                                           */
/*   length     4       ULONG          length in bytes                   */
/*   language   8       ULONG          Mac language code                 */
/*   start      12      ULONG          first char in range               */
/*   count      16      ULONG          number of chars in range          */
/*   glyphIds   20      USHORT[count]  glyph indices                     */
/*************************************************************************/

fn cmap10_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    if table.len() < 20 {
        return Err(too_short());
    }

    let length = req_u32(table, 4)? as usize;
    let count = req_u32(table, 16)? as usize;

    if length > table.len() || length < 20 + count * 2 {
        return Err(too_short());
    }

    // check glyph indices
    if valid.level >= ValidationLevel::Tight {
        for n in 0..count {
            let gindex = req_u16(table, 20 + n * 2)?;
            if gindex >= valid.num_glyphs {
                return Err(invalid_glyph_id(gindex, valid.num_glyphs));
            }
        }
    }

    Ok(())
}

fn cmap10_char_index(table: &[u8], char_code: u32) -> u32 {
    let start = peek_u32(table, 12).unwrap_or(0);
    let count = peek_u32(table, 16).unwrap_or(0);

    let idx = char_code.wrapping_sub(start);

    if idx < count {
        peek_u16(table, 20 + 2 * idx as usize).unwrap_or(0)
    } else {
        0
    }
}

fn cmap10_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut char_code = match char_code.checked_add(1) {
        Some(code) => code,
        None => return (0, 0),
    };

    let start = peek_u32(table, 12).unwrap_or(0);
    let count = peek_u32(table, 16).unwrap_or(0);

    if char_code < start {
        char_code = start;
    }

    let mut idx = char_code.wrapping_sub(start);

    while idx < count {
        let gindex = peek_u16(table, 20 + 2 * idx as usize).unwrap_or(0);
        if gindex != 0 {
            return (char_code, gindex);
        }

        idx += 1;
        char_code += 1;
    }

    (0, 0)
}

/*************************************************************************/
/*                               FORMAT 12                               */
/*                                                                       */
/*   NAME       OFFSET  TYPE    DESCRIPTION                              */
/*                                                                       */
/*   format     0       USHORT  must be 12                               */
/*   reserved   2       USHORT                                           */
/*   length     4       ULONG   length in bytes                          */
/*   language   8       ULONG   Mac language code                        */
/*   count      12      ULONG   number of groups                         */
/*                                                                       */
/* followed by `count` groups of (start, end, startId), each ULONG.      */
/*************************************************************************/

fn cmap12_validate(table: &[u8], valid: &Validator) -> FontResult<()> {
    if table.len() < 16 {
        return Err(too_short());
    }

    let length = req_u32(table, 4)? as usize;
    let num_groups = req_u32(table, 12)? as usize;

    if length > table.len() || length < 16 + 12 * num_groups {
        return Err(too_short());
    }

    // check that the groups are in increasing order
    let mut last = 0;
    for n in 0..num_groups {
        let group = 16 + n * 12;

        let start = req_u32(table, group)?;
        let end = req_u32(table, group + 4)?;
        let start_id = req_u32(table, group + 8)?;

        if start > end {
            return Err(invalid_data());
        }

        if n > 0 && start <= last {
            return Err(invalid_data());
        }

        if valid.level >= ValidationLevel::Tight {
            let last_id = start_id.saturating_add(end - start);
            if last_id >= valid.num_glyphs {
                return Err(invalid_glyph_id(last_id, valid.num_glyphs));
            }
        }

        last = end;
    }

    Ok(())
}

fn cmap12_char_index(table: &[u8], char_code: u32) -> u32 {
    let num_groups = peek_u32(table, 12).unwrap_or(0) as usize;

    for n in 0..num_groups {
        let group = 16 + n * 12;

        let start = peek_u32(table, group).unwrap_or(0);
        let end = peek_u32(table, group + 4).unwrap_or(0);
        let start_id = peek_u32(table, group + 8).unwrap_or(0);

        if char_code < start {
            break;
        }

        if char_code <= end {
            return start_id.wrapping_add(char_code - start);
        }
    }

    0
}

fn cmap12_char_next(table: &[u8], char_code: u32) -> (u32, u32) {
    let mut char_code = match char_code.checked_add(1) {
        Some(code) => code,
        None => return (0, 0),
    };
    let num_groups = peek_u32(table, 12).unwrap_or(0) as usize;

    for n in 0..num_groups {
        let group = 16 + n * 12;

        let start = peek_u32(table, group).unwrap_or(0);
        let end = peek_u32(table, group + 4).unwrap_or(0);
        let start_id = peek_u32(table, group + 8).unwrap_or(0);

        if char_code < start {
            char_code = start;
        }

        if char_code <= end {
            let gindex = start_id.wrapping_add(char_code - start);
            if gindex != 0 {
                return (char_code, gindex);
            }
        }
    }

    (0, 0)
}

/// The closed set of sub-table formats this build understands.
const CMAP_FORMATS: &[u16] = &[0, 2, 4, 6, 8, 10, 12];

pub fn validate_subtable(format: u16, table: &[u8], valid: &Validator) -> FontResult<()> {
    match format {
        0 => cmap0_validate(table, valid),
        2 => cmap2_validate(table, valid),
        4 => cmap4_validate(table, valid),
        6 => cmap6_validate(table, valid),
        8 => cmap8_validate(table, valid),
        10 => cmap10_validate(table, valid),
        12 => cmap12_validate(table, valid),
        _ => Err(ParseError::Unimplemented {
            feature: "cmap sub-table format",
        }),
    }
}

pub fn subtable_char_index(format: u16, table: &[u8], char_code: u32) -> u32 {
    match format {
        0 => cmap0_char_index(table, char_code),
        2 => cmap2_char_index(table, char_code),
        4 => cmap4_char_index(table, char_code),
        6 => cmap6_char_index(table, char_code),
        8 => cmap8_char_index(table, char_code),
        10 => cmap10_char_index(table, char_code),
        12 => cmap12_char_index(table, char_code),
        _ => 0,
    }
}

pub fn subtable_char_next(format: u16, table: &[u8], char_code: u32) -> (u32, u32) {
    match format {
        0 => cmap0_char_next(table, char_code),
        2 => cmap2_char_next(table, char_code),
        4 => cmap4_char_next(table, char_code),
        6 => cmap6_char_next(table, char_code),
        8 => cmap8_char_next(table, char_code),
        10 => cmap10_char_next(table, char_code),
        12 => cmap12_char_next(table, char_code),
        _ => (0, 0),
    }
}

/// One usable charmap of a face: a validated sub-table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharMap {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub format: u16,
    /// Byte offset of the sub-table within the `cmap` table
    pub offset: usize,
}

/// Walks the `cmap` directory and validates every sub-table whose format is
/// registered. A sub-table that fails validation is logged and skipped; one
/// malformed mapping never kills the whole font.
pub fn build_cmaps(cmap: &[u8], num_glyphs: u32) -> FontResult<Vec<CharMap>> {
    if cmap.len() < 4 {
        return Err(ParseError::InvalidTable { table: "cmap" });
    }

    // only table version 0 is recognized
    let version = peek_u16(cmap, 0).unwrap_or(0);
    if version != 0 {
        log::error!("unsupported `cmap' table version {}", version);
        return Err(ParseError::InvalidTable { table: "cmap" });
    }

    let num_cmaps = peek_u16(cmap, 2).unwrap_or(0) as usize;
    let mut charmaps = Vec::new();

    for n in 0..num_cmaps {
        let entry = 4 + n * 8;
        if entry + 8 > cmap.len() {
            break;
        }

        let platform_id = peek_u16(cmap, entry).unwrap_or(0) as u16;
        let encoding_id = peek_u16(cmap, entry + 2).unwrap_or(0) as u16;
        let offset = peek_u32(cmap, entry + 4).unwrap_or(0) as usize;

        if offset == 0 || offset + 2 >= cmap.len() {
            continue;
        }

        let subtable = &cmap[offset..];
        let format = peek_u16(subtable, 0).unwrap_or(0) as u16;

        if !CMAP_FORMATS.contains(&format) {
            continue;
        }

        let valid = Validator {
            level: ValidationLevel::Default,
            num_glyphs,
        };

        match validate_subtable(format, subtable, &valid) {
            Ok(()) => charmaps.push(CharMap {
                platform_id,
                encoding_id,
                format,
                offset,
            }),
            Err(err) => {
                log::warn!("broken cmap sub-table (format {}) ignored: {}", format, err);
            }
        }
    }

    Ok(charmaps)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    fn validator(level: ValidationLevel, num_glyphs: u32) -> Validator {
        Validator { level, num_glyphs }
    }

    pub(crate) fn format0_table(glyph_ids: &[u8; 256]) -> Vec<u8> {
        let mut table = Vec::new();
        table.extend_from_slice(&0u16.to_be_bytes());
        table.extend_from_slice(&262u16.to_be_bytes());
        table.extend_from_slice(&0u16.to_be_bytes());
        table.extend_from_slice(glyph_ids);
        table
    }

    /// Segments as (start, end, delta, range_offset)
    pub(crate) fn format4_table(segments: &[(u16, u16, i16, u16)]) -> Vec<u8> {
        let seg_count = segments.len();
        let length = 16 + seg_count * 8;

        let mut table = Vec::new();
        table.extend_from_slice(&4u16.to_be_bytes());
        table.extend_from_slice(&(length as u16).to_be_bytes());
        table.extend_from_slice(&0u16.to_be_bytes()); // language
        table.extend_from_slice(&((seg_count * 2) as u16).to_be_bytes());

        // search parameters: greatest power of two <= seg_count
        let mut search_range = 1u16;
        let mut entry_selector = 0u16;
        while (search_range * 2) as usize <= seg_count {
            search_range *= 2;
            entry_selector += 1;
        }
        table.extend_from_slice(&(search_range * 2).to_be_bytes());
        table.extend_from_slice(&entry_selector.to_be_bytes());
        table.extend_from_slice(&((seg_count as u16 - search_range) * 2).to_be_bytes());

        for &(_, end, _, _) in segments {
            table.extend_from_slice(&end.to_be_bytes());
        }
        table.extend_from_slice(&0u16.to_be_bytes()); // pad
        for &(start, _, _, _) in segments {
            table.extend_from_slice(&start.to_be_bytes());
        }
        for &(_, _, delta, _) in segments {
            table.extend_from_slice(&delta.to_be_bytes());
        }
        for &(_, _, _, offset) in segments {
            table.extend_from_slice(&offset.to_be_bytes());
        }

        table
    }

    #[test]
    fn format0_lookup_and_iteration() {
        let mut ids = [0u8; 256];
        ids[65] = 3;
        ids[90] = 7;
        let table = format0_table(&ids);

        cmap0_validate(&table, &validator(ValidationLevel::Paranoid, 10)).unwrap();

        assert_eq!(cmap0_char_index(&table, 65), 3);
        assert_eq!(cmap0_char_index(&table, 66), 0);
        assert_eq!(cmap0_char_index(&table, 300), 0);

        assert_eq!(cmap0_char_next(&table, 0), (65, 3));
        assert_eq!(cmap0_char_next(&table, 65), (90, 7));
        assert_eq!(cmap0_char_next(&table, 90), (0, 0));
    }

    #[test]
    fn format0_tight_rejects_out_of_range_glyphs() {
        let mut ids = [0u8; 256];
        ids[65] = 200;
        let table = format0_table(&ids);

        // fine when only checking sizes
        cmap0_validate(&table, &validator(ValidationLevel::Default, 10)).unwrap();

        // glyph 200 does not exist in a 10-glyph face
        assert!(cmap0_validate(&table, &validator(ValidationLevel::Tight, 10)).is_err());
    }

    #[test]
    fn format4_segment_lookup() {
        // the segments of spec'd behavior: delta-mapped, a gap, another
        // delta segment, and the required sentinel
        let table = format4_table(&[
            (0, 10, 5, 0),
            (20, 30, -3, 0),
            (0xFFFF, 0xFFFF, 1, 0),
        ]);

        cmap4_validate(&table, &validator(ValidationLevel::Default, 1000)).unwrap();

        assert_eq!(cmap4_char_index(&table, 5), 10);
        assert_eq!(cmap4_char_index(&table, 15), 0); // gap between segments
        assert_eq!(cmap4_char_index(&table, 25), 22);
    }

    #[test]
    fn format4_iteration_walks_segments() {
        let table = format4_table(&[
            (10, 12, 5, 0),
            (100, 101, -50, 0),
            (0xFFFF, 0xFFFF, 1, 0),
        ]);

        assert_eq!(cmap4_char_next(&table, 0), (10, 15));
        assert_eq!(cmap4_char_next(&table, 12), (100, 50));
        assert_eq!(cmap4_char_next(&table, 101), (0, 0));
    }

    #[test]
    fn format4_sentinel_segment_strictness() {
        // end=0xFFFF, start=0xFFFF, delta=1, offset=0xFFFF: the malformed
        // trailer of certain real-world fonts
        let table = format4_table(&[(32, 40, 0, 0), (0xFFFF, 0xFFFF, 1, 0xFFFF)]);

        cmap4_validate(&table, &validator(ValidationLevel::Default, 100)).unwrap();
        cmap4_validate(&table, &validator(ValidationLevel::Tight, 100)).unwrap();
        assert!(cmap4_validate(&table, &validator(ValidationLevel::Paranoid, 100)).is_err());

        // the sentinel maps nothing
        assert_eq!(cmap4_char_index(&table, 0xFFFF), 0);
    }

    #[test]
    fn format4_overlapping_segments_strictness() {
        let table = format4_table(&[
            (0, 50, 1, 0),
            (40, 60, 1, 0),
            (0xFFFF, 0xFFFF, 1, 0),
        ]);

        // overlapping ranges appear in popular Asian fonts and pass the
        // default level
        cmap4_validate(&table, &validator(ValidationLevel::Default, 1000)).unwrap();
        assert!(cmap4_validate(&table, &validator(ValidationLevel::Tight, 1000)).is_err());
    }

    #[test]
    fn strictness_is_monotonic() {
        // anything rejected at default must be rejected at tight and
        // paranoid
        let truncated = {
            let mut t = format4_table(&[(0, 10, 5, 0), (0xFFFF, 0xFFFF, 1, 0)]);
            t[3] = 8; // declared length smaller than the minimum
            t.truncate(8);
            t
        };

        for level in [
            ValidationLevel::Default,
            ValidationLevel::Tight,
            ValidationLevel::Paranoid,
        ] {
            assert!(cmap4_validate(&truncated, &validator(level, 100)).is_err());
        }
    }

    #[test]
    fn format6_dense_range() {
        let mut table = Vec::new();
        table.extend_from_slice(&6u16.to_be_bytes());
        table.extend_from_slice(&16u16.to_be_bytes()); // length
        table.extend_from_slice(&0u16.to_be_bytes()); // language
        table.extend_from_slice(&48u16.to_be_bytes()); // first
        table.extend_from_slice(&3u16.to_be_bytes()); // count
        for id in [5u16, 0, 7] {
            table.extend_from_slice(&id.to_be_bytes());
        }

        cmap6_validate(&table, &validator(ValidationLevel::Tight, 10)).unwrap();

        assert_eq!(cmap6_char_index(&table, 48), 5);
        assert_eq!(cmap6_char_index(&table, 49), 0);
        assert_eq!(cmap6_char_index(&table, 50), 7);
        assert_eq!(cmap6_char_index(&table, 51), 0);

        assert_eq!(cmap6_char_next(&table, 0), (48, 5));
        assert_eq!(cmap6_char_next(&table, 48), (50, 7));
        assert_eq!(cmap6_char_next(&table, 50), (0, 0));
    }

    #[test]
    fn format2_single_and_double_byte_codes() {
        // one sub-header for single-byte codes plus one for lead byte 0x81
        let mut table = Vec::new();
        table.extend_from_slice(&2u16.to_be_bytes());

        let glyph_ids_offset = 518 + 2 * 8;
        let length = glyph_ids_offset + 4 * 2;
        table.extend_from_slice(&(length as u16).to_be_bytes());
        table.extend_from_slice(&0u16.to_be_bytes()); // language

        // keys: lead byte 0x81 -> sub-header 1, everything else 0
        for hi in 0..256usize {
            let key: u16 = if hi == 0x81 { 8 } else { 0 };
            table.extend_from_slice(&key.to_be_bytes());
        }

        // sub-header 0: codes 0x40..0x42 map through the first two ids.
        // `offset` counts from its own field position (518 + 6)
        let sub0_ids_distance = (glyph_ids_offset - (518 + 6)) as u16;
        table.extend_from_slice(&0x40u16.to_be_bytes());
        table.extend_from_slice(&2u16.to_be_bytes());
        table.extend_from_slice(&0i16.to_be_bytes());
        table.extend_from_slice(&sub0_ids_distance.to_be_bytes());

        // sub-header 1: lows 0x20..0x21 of lead 0x81, next two ids
        let sub1_ids_distance = (glyph_ids_offset + 4 - (518 + 8 + 6)) as u16;
        table.extend_from_slice(&0x20u16.to_be_bytes());
        table.extend_from_slice(&2u16.to_be_bytes());
        table.extend_from_slice(&100i16.to_be_bytes());
        table.extend_from_slice(&sub1_ids_distance.to_be_bytes());

        for id in [9u16, 0, 40, 41] {
            table.extend_from_slice(&id.to_be_bytes());
        }

        cmap2_validate(&table, &validator(ValidationLevel::Default, 1000)).unwrap();

        // single-byte codes
        assert_eq!(cmap2_char_index(&table, 0x40), 9);
        assert_eq!(cmap2_char_index(&table, 0x41), 0);
        // 0x81 is a lead byte, not a valid single-byte code
        assert_eq!(cmap2_char_index(&table, 0x81), 0);

        // double-byte codes with delta applied
        assert_eq!(cmap2_char_index(&table, 0x8120), 140);
        assert_eq!(cmap2_char_index(&table, 0x8121), 141);
        assert_eq!(cmap2_char_index(&table, 0x8122), 0);

        // iteration crosses from the single-byte range into the two-byte
        // range
        assert_eq!(cmap2_char_next(&table, 0), (0x40, 9));
        assert_eq!(cmap2_char_next(&table, 0x40), (0x8120, 140));
        assert_eq!(cmap2_char_next(&table, 0x8120), (0x8121, 141));
        assert_eq!(cmap2_char_next(&table, 0x8121), (0, 0));
    }

    fn format12_table(groups: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut table = Vec::new();
        table.extend_from_slice(&12u16.to_be_bytes());
        table.extend_from_slice(&0u16.to_be_bytes()); // reserved
        table.extend_from_slice(&((16 + groups.len() * 12) as u32).to_be_bytes());
        table.extend_from_slice(&0u32.to_be_bytes()); // language
        table.extend_from_slice(&(groups.len() as u32).to_be_bytes());
        for &(start, end, start_id) in groups {
            table.extend_from_slice(&start.to_be_bytes());
            table.extend_from_slice(&end.to_be_bytes());
            table.extend_from_slice(&start_id.to_be_bytes());
        }
        table
    }

    #[test]
    fn format12_group_lookup() {
        let table = format12_table(&[(0x41, 0x5A, 1), (0x1F600, 0x1F603, 100)]);

        cmap12_validate(&table, &validator(ValidationLevel::Tight, 200)).unwrap();

        assert_eq!(cmap12_char_index(&table, 0x41), 1);
        assert_eq!(cmap12_char_index(&table, 0x5A), 26);
        assert_eq!(cmap12_char_index(&table, 0x1F601), 101);
        assert_eq!(cmap12_char_index(&table, 0x60), 0);

        assert_eq!(cmap12_char_next(&table, 0x5A), (0x1F600, 100));
        assert_eq!(cmap12_char_next(&table, 0x1F603), (0, 0));
    }

    #[test]
    fn format12_unordered_groups_rejected() {
        let table = format12_table(&[(100, 200, 1), (150, 250, 5)]);

        assert!(cmap12_validate(&table, &validator(ValidationLevel::Default, 1000)).is_err());
    }

    #[test]
    fn format10_trimmed_array() {
        let mut table = Vec::new();
        table.extend_from_slice(&10u16.to_be_bytes());
        table.extend_from_slice(&0u16.to_be_bytes());
        table.extend_from_slice(&26u32.to_be_bytes()); // length
        table.extend_from_slice(&0u32.to_be_bytes()); // language
        table.extend_from_slice(&0x100u32.to_be_bytes()); // start
        table.extend_from_slice(&3u32.to_be_bytes()); // count
        for id in [11u16, 0, 13] {
            table.extend_from_slice(&id.to_be_bytes());
        }

        cmap10_validate(&table, &validator(ValidationLevel::Tight, 100)).unwrap();

        assert_eq!(cmap10_char_index(&table, 0x100), 11);
        assert_eq!(cmap10_char_index(&table, 0x101), 0);
        assert_eq!(cmap10_char_index(&table, 0x102), 13);
        assert_eq!(cmap10_char_index(&table, 0xFF), 0);

        assert_eq!(cmap10_char_next(&table, 0), (0x100, 11));
        assert_eq!(cmap10_char_next(&table, 0x100), (0x102, 13));
        assert_eq!(cmap10_char_next(&table, 0x102), (0, 0));
    }

    #[test]
    fn format8_groups_with_bitmap() {
        let mut table = vec![0u8; 8208];
        table[0..2].copy_from_slice(&8u16.to_be_bytes());
        // one group of plain 16-bit codes
        let length = 8208 + 12;
        table[4..8].copy_from_slice(&(length as u32).to_be_bytes());
        table[8204..8208].copy_from_slice(&1u32.to_be_bytes());
        table.extend_from_slice(&0x41u32.to_be_bytes());
        table.extend_from_slice(&0x43u32.to_be_bytes());
        table.extend_from_slice(&7u32.to_be_bytes());

        cmap8_validate(&table, &validator(ValidationLevel::Tight, 100)).unwrap();

        assert_eq!(cmap8_char_index(&table, 0x41), 7);
        assert_eq!(cmap8_char_index(&table, 0x43), 9);
        assert_eq!(cmap8_char_index(&table, 0x44), 0);

        assert_eq!(cmap8_char_next(&table, 0), (0x41, 7));
        assert_eq!(cmap8_char_next(&table, 0x43), (0, 0));
    }

    #[test]
    fn format8_bitmap_mismatch_is_tight_only() {
        let mut table = vec![0u8; 8208];
        table[0..2].copy_from_slice(&8u16.to_be_bytes());
        let length = 8208 + 12;
        table[4..8].copy_from_slice(&(length as u32).to_be_bytes());
        // mark 0x41 as a surrogate half even though the group treats it as
        // a plain 16-bit code
        table[12 + (0x41 >> 3)] |= 0x80 >> (0x41 & 7);
        table[8204..8208].copy_from_slice(&1u32.to_be_bytes());
        table.extend_from_slice(&0x41u32.to_be_bytes());
        table.extend_from_slice(&0x43u32.to_be_bytes());
        table.extend_from_slice(&7u32.to_be_bytes());

        cmap8_validate(&table, &validator(ValidationLevel::Default, 100)).unwrap();
        assert!(cmap8_validate(&table, &validator(ValidationLevel::Tight, 100)).is_err());
    }

    #[test]
    fn build_cmaps_skips_broken_subtables() {
        // directory with one valid format 0 sub-table and one corrupt
        // format 4 sub-table
        let mut ids = [0u8; 256];
        ids[65] = 1;
        let format0 = format0_table(&ids);

        let mut format4 = format4_table(&[(0, 10, 5, 0), (0xFFFF, 0xFFFF, 1, 0)]);
        format4[7] = 0xFF; // clobber segCountX2 so validation fails

        let mut cmap = Vec::new();
        cmap.extend_from_slice(&0u16.to_be_bytes()); // version
        cmap.extend_from_slice(&2u16.to_be_bytes()); // two tables

        let format4_offset = 4 + 16 + format0.len();
        cmap.extend_from_slice(&3u16.to_be_bytes()); // platform
        cmap.extend_from_slice(&1u16.to_be_bytes()); // encoding
        cmap.extend_from_slice(&((4 + 16) as u32).to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&0u16.to_be_bytes());
        cmap.extend_from_slice(&(format4_offset as u32).to_be_bytes());

        cmap.extend_from_slice(&format0);
        cmap.extend_from_slice(&format4);

        let charmaps = build_cmaps(&cmap, 100).unwrap();

        assert_eq!(charmaps.len(), 1);
        assert_eq!(charmaps[0].format, 0);
        assert_eq!(
            subtable_char_index(0, &cmap[charmaps[0].offset..], 65),
            1
        );
    }

    #[test]
    fn build_cmaps_rejects_unknown_version() {
        let mut cmap = Vec::new();
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&0u16.to_be_bytes());

        assert!(build_cmaps(&cmap, 10).is_err());
    }
}
