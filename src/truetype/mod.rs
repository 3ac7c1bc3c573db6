//! TrueType (sfnt) container support: the table directory, the fixed-layout
//! tables this crate needs, and the `cmap` character mapping family.

use fixed::types::extra::{U14, U6};

use crate::{
    error::{FontResult, ParseError},
    stream::Stream,
    truetype::{
        cmap::CharMap,
        tables::{CvtTable, Head, LocaTable, Maxp},
    },
};

pub mod cmap;
pub mod tables;

/// 16.16-bit signed fixed-point number
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fixed(pub i32);

/// 16-bit quantity in FUnits, the smallest measurable distance in em space
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct FWord(pub i16);

/// Seconds since 12:00 midnight, January 1, 1904
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LongDateTime(pub i64);

/// 16-bit signed fixed number with the low 14 bits representing fraction
pub type F2Dot14 = fixed::FixedI16<U14>;
/// 32-bit signed fixed number with the low 6 bits representing fraction
pub type F26Dot6 = fixed::FixedI32<U6>;

pub type TableTag = [u8; 4];

pub const TAG_HEAD: TableTag = *b"head";
pub const TAG_MAXP: TableTag = *b"maxp";
pub const TAG_CMAP: TableTag = *b"cmap";
pub const TAG_LOCA: TableTag = *b"loca";
pub const TAG_GLYF: TableTag = *b"glyf";
pub const TAG_CVT: TableTag = *b"cvt ";
pub const TAG_FPGM: TableTag = *b"fpgm";
pub const TAG_PREP: TableTag = *b"prep";

#[derive(Debug, Clone, Copy)]
pub struct DirectoryEntry {
    pub tag: TableTag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

#[derive(Debug, Default)]
pub struct FontDirectory {
    pub entries: Vec<DirectoryEntry>,
}

impl FontDirectory {
    pub fn find(&self, tag: TableTag) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    fn load(stream: &mut Stream) -> FontResult<Self> {
        stream.seek(0)?;
        let mut frame = stream.enter_frame(12)?;

        let sfnt_version = frame.next_u32_be()?;
        if sfnt_version != 0x00010000 && sfnt_version.to_be_bytes() != *b"true" {
            return Err(ParseError::InvalidFileFormat { format: "sfnt" });
        }

        let num_tables = frame.next_u16_be()?;
        // searchRange, entrySelector and rangeShift are traces of
        // over-engineering in the TrueType specification
        frame.skip(6)?;
        drop(frame);

        let mut frame = stream.enter_frame(num_tables as usize * 16)?;
        let mut entries = Vec::with_capacity(num_tables as usize);

        for _ in 0..num_tables {
            let tag: TableTag = frame.next_bytes(4)?.try_into().unwrap();

            entries.push(DirectoryEntry {
                tag,
                checksum: frame.next_u32_be()?,
                offset: frame.next_u32_be()?,
                length: frame.next_u32_be()?,
            });
        }

        Ok(Self { entries })
    }
}

#[derive(Debug)]
pub struct TrueTypeFace {
    data: Vec<u8>,
    pub directory: FontDirectory,
    pub head: Head,
    pub maxp: Maxp,
    pub loca: Option<LocaTable>,
    pub cvt: Option<CvtTable>,
    pub fpgm: Option<Vec<u8>>,
    pub prep: Option<Vec<u8>>,
    cmap_range: Option<(usize, usize)>,
    pub charmaps: Vec<CharMap>,
}

impl TrueTypeFace {
    pub fn parse(data: Vec<u8>) -> FontResult<Self> {
        let mut stream = Stream::from_bytes(&data);

        let directory = FontDirectory::load(&mut stream)?;

        let head_entry = directory
            .find(TAG_HEAD)
            .ok_or(ParseError::InvalidTable { table: "head" })?;
        let head = Head::load(&mut stream, head_entry.offset)?;

        let maxp_entry = directory
            .find(TAG_MAXP)
            .ok_or(ParseError::InvalidTable { table: "maxp" })?;
        let maxp = Maxp::load(&mut stream, maxp_entry.offset)?;

        let loca = match directory.find(TAG_LOCA) {
            Some(entry) => Some(LocaTable::load(
                &mut stream,
                entry.offset,
                entry.length,
                head.index_to_loc_format,
            )?),
            None => None,
        };

        let cvt = match directory.find(TAG_CVT) {
            Some(entry) => Some(CvtTable::load(&mut stream, entry.offset, entry.length)?),
            None => None,
        };

        let fpgm = match directory.find(TAG_FPGM) {
            Some(entry) => Some(tables::load_program(&mut stream, entry.offset, entry.length)?),
            None => None,
        };

        let prep = match directory.find(TAG_PREP) {
            Some(entry) => Some(tables::load_program(&mut stream, entry.offset, entry.length)?),
            None => None,
        };

        let mut cmap_range = None;
        let mut charmaps = Vec::new();

        if let Some(entry) = directory.find(TAG_CMAP) {
            let start = entry.offset as usize;
            let end = start + entry.length as usize;

            if end > data.len() {
                return Err(ParseError::TooShort { table: "cmap" });
            }

            charmaps = cmap::build_cmaps(&data[start..end], u32::from(maxp.num_glyphs))?;
            cmap_range = Some((start, end));
        }

        drop(stream);

        Ok(Self {
            data,
            directory,
            head,
            maxp,
            loca,
            cvt,
            fpgm,
            prep,
            cmap_range,
            charmaps,
        })
    }

    pub fn num_glyphs(&self) -> u32 {
        u32::from(self.maxp.num_glyphs)
    }

    fn cmap_bytes(&self) -> Option<&[u8]> {
        self.cmap_range.map(|(start, end)| &self.data[start..end])
    }

    /// The charmap used for lookups: a Windows UCS-4 mapping when present,
    /// then Windows Unicode BMP, then whatever validated first.
    pub fn best_charmap(&self) -> Option<&CharMap> {
        self.charmaps
            .iter()
            .find(|c| c.platform_id == 3 && c.encoding_id == 10)
            .or_else(|| {
                self.charmaps
                    .iter()
                    .find(|c| c.platform_id == 3 && c.encoding_id == 1)
            })
            .or_else(|| self.charmaps.first())
    }

    pub fn char_index(&self, char_code: u32) -> u32 {
        let (charmap, cmap) = match (self.best_charmap(), self.cmap_bytes()) {
            (Some(charmap), Some(cmap)) => (charmap, cmap),
            _ => return 0,
        };

        cmap::subtable_char_index(charmap.format, &cmap[charmap.offset..], char_code)
    }

    pub fn char_next(&self, char_code: u32) -> (u32, u32) {
        let (charmap, cmap) = match (self.best_charmap(), self.cmap_bytes()) {
            (Some(charmap), Some(cmap)) => (charmap, cmap),
            _ => return (0, 0),
        };

        cmap::subtable_char_next(charmap.format, &cmap[charmap.offset..], char_code)
    }

    /// Raw `glyf` record of a glyph; empty for glyphs without an outline.
    pub fn glyph_data(&self, glyph_id: u32) -> FontResult<&[u8]> {
        if glyph_id >= self.num_glyphs() {
            return Err(ParseError::InvalidGlyphId {
                glyph_id,
                num_glyphs: self.num_glyphs(),
            });
        }

        let loca = self
            .loca
            .as_ref()
            .ok_or(ParseError::InvalidTable { table: "loca" })?;
        let glyf = self
            .directory
            .find(TAG_GLYF)
            .ok_or(ParseError::InvalidTable { table: "glyf" })?;

        let (offset, length) = loca
            .glyph_location(glyph_id)
            .ok_or(ParseError::InvalidTable { table: "loca" })?;

        let start = glyf.offset as usize + offset as usize;
        let end = start + length as usize;

        self.data
            .get(start..end)
            .ok_or(ParseError::InvalidOffset { table: "glyf" })
    }
}
