use crate::{
    error::FontResult,
    stream::{
        fields::{read_fields, Field, FieldKind},
        Stream,
    },
};

/// PFR container header.
///
/// TABLE OVERVIEW
/// --------------
///
///   NAME                     OFFSET  TYPE     DESCRIPTION
///
///   signature                 0      ULONG    must be "PFR0"
///   version                   4      USHORT   container version, <= 4
///   signature2                6      USHORT   must be 0x0D0A (CR/LF)
///   header_size               8      USHORT   58 for this version
///
///   log_dir_size             10      USHORT   logical font directory size
///   log_dir_offset           12      USHORT   logical font directory offset
///
///   log_font_max_size        14      USHORT   largest logical font record
///   log_font_section_size    16      UINT24   logical font section size
///   log_font_section_offset  19      UINT24   logical font section offset
///
///   phy_font_max_size        22      USHORT   largest physical font record
///   phy_font_section_size    24      UINT24   physical font section size
///   phy_font_section_offset  27      UINT24   physical font section offset
///
///   gps_max_size             30      USHORT   largest glyph program string
///   gps_section_size         32      UINT24   glyph program section size
///   gps_section_offset       35      UINT24   glyph program section offset
///
///   max_blue_values          38      BYTE
///   max_x_orus               39      BYTE
///   max_y_orus               40      BYTE
///   phy_font_max_size_high   41      BYTE
///   color_flags              42      BYTE
///
///   bct_max_size             43      UINT24   largest bitmap char table
///   bct_set_max_size         46      UINT24
///   phy_bct_max_size         49      UINT24
///
///   num_phy_fonts            52      USHORT
///   max_vert_stem_snap       54      BYTE
///   max_horz_stem_snap       55      BYTE
///   max_chars                56      USHORT
///                            58
#[derive(Debug, Default)]
pub struct PfrHeader {
    pub signature: u32,
    pub version: u16,
    pub signature2: u16,
    pub header_size: u16,

    pub log_dir_size: u16,
    pub log_dir_offset: u16,

    pub log_font_max_size: u16,
    pub log_font_section_size: u32,
    pub log_font_section_offset: u32,

    pub phy_font_max_size: u16,
    pub phy_font_section_size: u32,
    pub phy_font_section_offset: u32,

    pub gps_max_size: u16,
    pub gps_section_size: u32,
    pub gps_section_offset: u32,

    pub max_blue_values: u8,
    pub max_x_orus: u8,
    pub max_y_orus: u8,
    pub phy_font_max_size_high: u8,
    pub color_flags: u8,

    pub bct_max_size: u32,
    pub bct_set_max_size: u32,
    pub phy_bct_max_size: u32,

    pub num_phy_fonts: u16,
    pub max_vert_stem_snap: u8,
    pub max_horz_stem_snap: u8,
    pub max_chars: u16,
}

pub const PFR_HEADER_SIZE: usize = 58;

const PFR_SIGNATURE: u32 = 0x5046_5230; // "PFR0"

#[rustfmt::skip]
const HEADER_FIELDS: &[Field<PfrHeader>] = &[
    Field::int(FieldKind::U32Be, |h: &mut PfrHeader, v| h.signature = v as u32),
    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.version = v as u16),
    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.signature2 = v as u16),
    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.header_size = v as u16),

    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.log_dir_size = v as u16),
    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.log_dir_offset = v as u16),

    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.log_font_max_size = v as u16),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.log_font_section_size = v as u32),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.log_font_section_offset = v as u32),

    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.phy_font_max_size = v as u16),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.phy_font_section_size = v as u32),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.phy_font_section_offset = v as u32),

    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.gps_max_size = v as u16),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.gps_section_size = v as u32),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.gps_section_offset = v as u32),

    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.max_blue_values = v as u8),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.max_x_orus = v as u8),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.max_y_orus = v as u8),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.phy_font_max_size_high = v as u8),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.color_flags = v as u8),

    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.bct_max_size = v as u32),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.bct_set_max_size = v as u32),
    Field::int(FieldKind::U24Be, |h: &mut PfrHeader, v| h.phy_bct_max_size = v as u32),

    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.num_phy_fonts = v as u16),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.max_vert_stem_snap = v as u8),
    Field::int(FieldKind::U8, |h: &mut PfrHeader, v| h.max_horz_stem_snap = v as u8),
    Field::int(FieldKind::U16Be, |h: &mut PfrHeader, v| h.max_chars = v as u16),
];

impl PfrHeader {
    pub fn load(stream: &mut Stream) -> FontResult<Self> {
        let mut header = PfrHeader::default();

        let mut frame = stream.enter_frame(PFR_HEADER_SIZE)?;
        read_fields(&mut frame, HEADER_FIELDS, &mut header)?;

        Ok(header)
    }

    /// Magic and size sanity checks. Returns a plain boolean so format
    /// sniffing can probe a stream without raising an error.
    pub fn check(&self) -> bool {
        self.signature == PFR_SIGNATURE
            && self.version <= 4
            && self.signature2 == 0x0D0A
            && self.header_size as usize >= PFR_HEADER_SIZE
    }
}

#[cfg(test)]
mod test {
    use super::*;

    pub(super) fn valid_header_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(b"PFR0"); // signature
        bytes.extend_from_slice(&4u16.to_be_bytes()); // version
        bytes.extend_from_slice(&0x0D0Au16.to_be_bytes()); // signature2
        bytes.extend_from_slice(&58u16.to_be_bytes()); // header_size
        bytes.extend_from_slice(&12u16.to_be_bytes()); // log_dir_size
        bytes.extend_from_slice(&58u16.to_be_bytes()); // log_dir_offset
        bytes.extend_from_slice(&64u16.to_be_bytes()); // log_font_max_size
        bytes.extend_from_slice(&[0, 0, 64]); // log_font_section_size
        bytes.extend_from_slice(&[0, 0, 70]); // log_font_section_offset
        bytes.extend_from_slice(&128u16.to_be_bytes()); // phy_font_max_size
        bytes.extend_from_slice(&[0, 0, 128]); // phy_font_section_size
        bytes.extend_from_slice(&[0, 0, 134]); // phy_font_section_offset
        bytes.extend_from_slice(&256u16.to_be_bytes()); // gps_max_size
        bytes.extend_from_slice(&[0, 1, 0]); // gps_section_size
        bytes.extend_from_slice(&[0, 1, 6]); // gps_section_offset
        bytes.extend_from_slice(&[8, 16, 16, 0, 0]); // maxima + color flags
        bytes.extend_from_slice(&[0, 0, 0]); // bct_max_size
        bytes.extend_from_slice(&[0, 0, 0]); // bct_set_max_size
        bytes.extend_from_slice(&[0, 0, 0]); // phy_bct_max_size
        bytes.extend_from_slice(&1u16.to_be_bytes()); // num_phy_fonts
        bytes.extend_from_slice(&[12, 12]); // stem snap maxima
        bytes.extend_from_slice(&2u16.to_be_bytes()); // max_chars

        assert_eq!(bytes.len(), PFR_HEADER_SIZE);

        bytes
    }

    #[test]
    fn loads_and_checks_valid_header() {
        let bytes = valid_header_bytes();
        let mut stream = Stream::from_bytes(&bytes);

        let header = PfrHeader::load(&mut stream).unwrap();

        assert!(header.check());
        assert_eq!(header.version, 4);
        assert_eq!(header.log_dir_offset, 58);
        assert_eq!(header.gps_section_offset, 0x106);
        assert_eq!(stream.pos(), PFR_HEADER_SIZE);
    }

    #[test]
    fn bad_magic_fails_check() {
        let mut bytes = valid_header_bytes();
        bytes[0] = b'X';

        let mut stream = Stream::from_bytes(&bytes);
        let header = PfrHeader::load(&mut stream).unwrap();

        assert!(!header.check());
    }

    #[test]
    fn version_above_four_fails_check() {
        let mut bytes = valid_header_bytes();
        bytes[4..6].copy_from_slice(&5u16.to_be_bytes());

        let mut stream = Stream::from_bytes(&bytes);
        let header = PfrHeader::load(&mut stream).unwrap();

        assert!(!header.check());
    }
}
