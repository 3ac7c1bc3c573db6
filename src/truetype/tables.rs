//! Loaders for the fixed-layout sfnt tables this crate consumes.

use crate::{
    error::{FontResult, ParseError},
    stream::{
        fields::{read_fields, Field, FieldKind},
        Stream,
    },
    truetype::{FWord, Fixed, LongDateTime},
};

#[derive(Debug, Default)]
pub struct Head {
    pub font_revision: Fixed,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    pub x_min: FWord,
    pub y_min: FWord,
    pub x_max: FWord,
    pub y_max: FWord,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

const HEAD_MAGIC: u32 = 0x5F0F3CF5;

#[rustfmt::skip]
const HEAD_FIELDS: &[Field<(Head, u32, u32)>] = &[
    Field::int(FieldKind::U32Be, |h: &mut (Head, u32, u32), v| h.1 = v as u32), // version
    Field::int(FieldKind::I32Be, |h: &mut (Head, u32, u32), v| h.0.font_revision = Fixed(v as i32)),
    Field::skip(4), // checksum adjustment
    Field::int(FieldKind::U32Be, |h: &mut (Head, u32, u32), v| h.2 = v as u32), // magic
    Field::int(FieldKind::U16Be, |h: &mut (Head, u32, u32), v| h.0.flags = v as u16),
    Field::int(FieldKind::U16Be, |h: &mut (Head, u32, u32), v| h.0.units_per_em = v as u16),
    Field::bytes(8, |h: &mut (Head, u32, u32), b| {
        h.0.created = LongDateTime(i64::from_be_bytes(b.try_into().unwrap()))
    }),
    Field::bytes(8, |h: &mut (Head, u32, u32), b| {
        h.0.modified = LongDateTime(i64::from_be_bytes(b.try_into().unwrap()))
    }),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.x_min = FWord(v as i16)),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.y_min = FWord(v as i16)),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.x_max = FWord(v as i16)),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.y_max = FWord(v as i16)),
    Field::int(FieldKind::U16Be, |h: &mut (Head, u32, u32), v| h.0.mac_style = v as u16),
    Field::int(FieldKind::U16Be, |h: &mut (Head, u32, u32), v| h.0.lowest_rec_ppem = v as u16),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.font_direction_hint = v as i16),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.index_to_loc_format = v as i16),
    Field::int(FieldKind::I16Be, |h: &mut (Head, u32, u32), v| h.0.glyph_data_format = v as i16),
];

impl Head {
    pub fn load(stream: &mut Stream, offset: u32) -> FontResult<Self> {
        stream.seek(offset as usize)?;
        let mut frame = stream.enter_frame(crate::stream::fields::fields_size(HEAD_FIELDS))?;

        let mut dest = (Head::default(), 0u32, 0u32);
        read_fields(&mut frame, HEAD_FIELDS, &mut dest)?;

        let (head, version, magic) = dest;

        if version != 0x00010000 {
            return Err(ParseError::InvalidTable { table: "head" });
        }
        if magic != HEAD_MAGIC {
            return Err(ParseError::InvalidTable { table: "head" });
        }

        Ok(head)
    }
}

#[derive(Debug, Default)]
pub struct Maxp {
    pub num_glyphs: u16,
}

impl Maxp {
    pub fn load(stream: &mut Stream, offset: u32) -> FontResult<Self> {
        stream.seek(offset as usize)?;
        let mut frame = stream.enter_frame(6)?;

        let _version = frame.next_u32_be()?;
        let num_glyphs = frame.next_u16_be()?;

        Ok(Self { num_glyphs })
    }
}

/// Glyph location table: per-glyph byte offsets into `glyf`, with a trailing
/// sentinel entry. Short-format offsets are stored halved.
#[derive(Debug, Default)]
pub struct LocaTable {
    pub offsets: Vec<u32>,
}

impl LocaTable {
    pub fn load(
        stream: &mut Stream,
        offset: u32,
        length: u32,
        index_to_loc_format: i16,
    ) -> FontResult<Self> {
        stream.seek(offset as usize)?;
        let mut frame = stream.enter_frame(length as usize)?;

        let offsets = match index_to_loc_format {
            // short
            0 => {
                let count = length as usize / 2;
                let mut offsets = Vec::with_capacity(count);
                for _ in 0..count {
                    offsets.push(u32::from(frame.next_u16_be()?) * 2);
                }
                offsets
            }
            // long
            1 => {
                let count = length as usize / 4;
                let mut offsets = Vec::with_capacity(count);
                for _ in 0..count {
                    offsets.push(frame.next_u32_be()?);
                }
                offsets
            }
            _ => return Err(ParseError::InvalidTable { table: "loca" }),
        };

        // offsets must never decrease
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(ParseError::InvalidTable { table: "loca" });
        }

        Ok(Self { offsets })
    }

    /// `(offset, length)` of a glyph's record in `glyf`; `None` past the
    /// table, `Some((_, 0))` for an empty glyph.
    pub fn glyph_location(&self, glyph_id: u32) -> Option<(u32, u32)> {
        let start = *self.offsets.get(glyph_id as usize)?;
        let end = *self.offsets.get(glyph_id as usize + 1)?;

        Some((start, end - start))
    }
}

/// Control value table: a bare FWord array.
#[derive(Debug, Default)]
pub struct CvtTable {
    pub entries: Vec<FWord>,
}

impl CvtTable {
    pub fn load(stream: &mut Stream, offset: u32, length: u32) -> FontResult<Self> {
        stream.seek(offset as usize)?;
        let mut frame = stream.enter_frame(length as usize)?;

        let count = length as usize / 2;
        let mut entries = Vec::with_capacity(count);

        for _ in 0..count {
            entries.push(FWord(frame.next_i16_be()?));
        }

        Ok(Self { entries })
    }
}

/// `fpgm` and `prep` are raw instruction programs.
pub fn load_program(stream: &mut Stream, offset: u32, length: u32) -> FontResult<Vec<u8>> {
    stream.seek(offset as usize)?;

    Ok(stream.extract_frame(length as usize)?.into_owned())
}
