//! Portable Font Resource (PFR) container support.
//!
//! Load order follows the container layout: header, logical font directory,
//! logical font record, physical font record (with its extra items), then
//! per-glyph program strings on demand.

use crate::{
    error::{FontResult, ParseError},
    stream::Stream,
};

pub use bitmap::PfrBitmap;
pub use font::{LogFont, PfrChar, PhysFont};
pub use glyph::PfrGlyph;
pub use header::PfrHeader;

pub mod bitmap;
pub mod cmap;
pub mod font;
pub mod glyph;
pub mod header;
pub mod kerning;

#[derive(Debug)]
pub struct PfrFace<'a> {
    stream: Stream<'a>,
    pub header: PfrHeader,
    pub log_font: LogFont,
    pub phys_font: PhysFont,
}

impl<'a> PfrFace<'a> {
    /// Loads face `index` out of the container's logical font directory.
    pub fn load(mut stream: Stream<'a>, index: u16) -> FontResult<Self> {
        stream.seek(0)?;
        let header = PfrHeader::load(&mut stream)?;

        if !header.check() {
            return Err(ParseError::InvalidFileFormat { format: "PFR" });
        }

        let log_font = LogFont::load(&mut stream, &header, index)?;
        let phys_font = PhysFont::load(&mut stream, log_font.phys_offset, log_font.phys_size)?;

        Ok(Self {
            stream,
            header,
            log_font,
            phys_font,
        })
    }

    pub fn num_faces(stream: &mut Stream, header: &PfrHeader) -> FontResult<u16> {
        font::log_font_count(stream, header)
    }

    /// Glyph count, excluding the reserved index 0
    pub fn num_glyphs(&self) -> u32 {
        self.phys_font.num_chars()
    }

    pub fn char_index(&self, char_code: u32) -> u32 {
        cmap::char_index(&self.phys_font.chars, char_code)
    }

    pub fn char_next(&self, char_code: u32) -> (u32, u32) {
        cmap::char_next(&self.phys_font.chars, char_code)
    }

    pub fn get_kerning(&mut self, glyph1: u32, glyph2: u32) -> FontResult<(i32, i32)> {
        kerning::get_kerning(&mut self.stream, &self.phys_font.kern_items, glyph1, glyph2)
    }

    /// Loads the outline of glyph `glyph_id` (1-based, as returned by
    /// [`char_index`](Self::char_index)).
    pub fn load_glyph(&mut self, glyph_id: u32) -> FontResult<PfrGlyph> {
        let gchar = self.char_for_glyph(glyph_id)?;

        glyph::load_glyph(&mut self.stream, &self.header, &self.phys_font, &gchar)
    }

    /// Loads the embedded bitmap of `glyph_id` at the given strike size, or
    /// `Ok(None)` when the face has no matching strike or bitmap.
    pub fn load_bitmap(
        &mut self,
        glyph_id: u32,
        x_ppm: u16,
        y_ppm: u16,
    ) -> FontResult<Option<PfrBitmap>> {
        let gchar = self.char_for_glyph(glyph_id)?;

        bitmap::slot_load_bitmap(
            &mut self.stream,
            &self.header,
            &self.phys_font,
            gchar.char_code,
            x_ppm,
            y_ppm,
        )
    }

    fn char_for_glyph(&self, glyph_id: u32) -> FontResult<PfrChar> {
        if glyph_id == 0 || glyph_id > self.num_glyphs() {
            return Err(ParseError::InvalidGlyphId {
                glyph_id,
                num_glyphs: self.num_glyphs(),
            });
        }

        Ok(self.phys_font.chars[glyph_id as usize - 1])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Assembles a minimal but complete PFR container with two glyphs and a
    /// kerning item.
    fn build_container() -> Vec<u8> {
        // glyph program section: one square per glyph
        let mut gps = Vec::new();
        let mut glyph_locations = Vec::new();

        for size in [100i16, 200] {
            let start = gps.len() as u32;

            gps.push(0); // flags: plain 2-byte counts, no extras
            gps.push(0); // x_count = 0
            gps.push(0); // y_count = 0
            gps.push(1 << 4 | (2 << 2) | 2); // move-to, absolute x and y
            gps.extend_from_slice(&0i16.to_be_bytes());
            gps.extend_from_slice(&0i16.to_be_bytes());
            gps.push(2 << 4 | (2 << 2) | 3); // line-to, absolute x, same y
            gps.extend_from_slice(&size.to_be_bytes());
            gps.push(2 << 4 | (3 << 2) | 2); // line-to, same x, absolute y
            gps.extend_from_slice(&size.to_be_bytes());
            gps.push(0); // end

            glyph_locations.push((start, (gps.len() as u32 - start) as u16));
        }

        // physical font record with a kerning extra item and two chars
        let mut phys = Vec::new();
        phys.extend_from_slice(&1u16.to_be_bytes()); // font_ref_number
        phys.extend_from_slice(&1000u16.to_be_bytes()); // outline_resolution
        phys.extend_from_slice(&1000u16.to_be_bytes()); // metrics_resolution
        for v in [0i16, 0, 1000, 1000] {
            phys.extend_from_slice(&v.to_be_bytes()); // bbox
        }
        phys.push(font::PHY_EXTRA_ITEMS); // flags: monospaced, extras
        phys.extend_from_slice(&600i16.to_be_bytes()); // standard_advance

        // one extra item: kerning, pair (1, 2) -> -40
        let kern_payload: &[u8] = &[
            1, // pair_count
            0, 0, // base_adjust
            0, // flags: narrow pairs
            1, 2, (-40i8) as u8, // the pair
        ];
        phys.push(1); // item count
        phys.push(kern_payload.len() as u8);
        phys.push(4); // type: kerning
        phys.extend_from_slice(kern_payload);

        phys.extend_from_slice(&[0, 0, 0]); // num_aux
        phys.push(0); // num_blue_values

        phys.extend_from_slice(&2u16.to_be_bytes()); // num_chars
        for (code, (offset, size)) in [65u8, 66].iter().zip(&glyph_locations) {
            phys.push(*code);
            phys.push(*size as u8); // gps_size (1 byte)
            phys.extend_from_slice(&(*offset as u16).to_be_bytes()); // gps_offset
        }

        // logical font record
        let mut log = Vec::new();
        for v in [0x10000i32, 0, 0, 0x10000] {
            log.extend_from_slice(&v.to_be_bytes()); // matrix
        }
        log.push(0); // flags

        let log_dir_offset = header::PFR_HEADER_SIZE as u32;
        let log_font_offset = log_dir_offset + 7;
        let phys_offset = log_font_offset + log.len() as u32 + 5;
        let gps_offset = phys_offset + phys.len() as u32;

        log.extend_from_slice(&(phys.len() as u16).to_be_bytes());
        log.extend_from_slice(&phys_offset.to_be_bytes()[1..]);

        // header
        let mut file = Vec::new();
        file.extend_from_slice(b"PFR0");
        file.extend_from_slice(&4u16.to_be_bytes()); // version
        file.extend_from_slice(&0x0D0Au16.to_be_bytes()); // signature2
        file.extend_from_slice(&58u16.to_be_bytes()); // header_size
        file.extend_from_slice(&7u16.to_be_bytes()); // log_dir_size
        file.extend_from_slice(&(log_dir_offset as u16).to_be_bytes()); // log_dir_offset
        file.extend_from_slice(&(log.len() as u16).to_be_bytes()); // log_font_max_size
        file.extend_from_slice(&(log.len() as u32).to_be_bytes()[1..]);
        file.extend_from_slice(&log_font_offset.to_be_bytes()[1..]);
        file.extend_from_slice(&(phys.len() as u16).to_be_bytes()); // phy_font_max_size
        file.extend_from_slice(&(phys.len() as u32).to_be_bytes()[1..]);
        file.extend_from_slice(&phys_offset.to_be_bytes()[1..]);
        file.extend_from_slice(&(gps.len() as u16).to_be_bytes()); // gps_max_size
        file.extend_from_slice(&(gps.len() as u32).to_be_bytes()[1..]);
        file.extend_from_slice(&gps_offset.to_be_bytes()[1..]);
        file.extend_from_slice(&[0, 0, 0, 0, 0]); // maxima + color flags
        file.extend_from_slice(&[0, 0, 0]); // bct_max_size
        file.extend_from_slice(&[0, 0, 0]); // bct_set_max_size
        file.extend_from_slice(&[0, 0, 0]); // phy_bct_max_size
        file.extend_from_slice(&1u16.to_be_bytes()); // num_phy_fonts
        file.extend_from_slice(&[0, 0]); // stem snap maxima
        file.extend_from_slice(&2u16.to_be_bytes()); // max_chars
        assert_eq!(file.len(), header::PFR_HEADER_SIZE);

        // logical font directory
        file.extend_from_slice(&1u16.to_be_bytes()); // count
        file.extend_from_slice(&(log.len() as u16).to_be_bytes());
        file.extend_from_slice(&log_font_offset.to_be_bytes()[1..]);

        file.extend_from_slice(&log);
        assert_eq!(file.len() as u32, phys_offset);
        file.extend_from_slice(&phys);
        assert_eq!(file.len() as u32, gps_offset);
        file.extend_from_slice(&gps);

        file
    }

    #[test]
    fn full_container_round_trip() {
        let file = build_container();
        let mut face = PfrFace::load(Stream::from_bytes(&file), 0).unwrap();

        assert_eq!(face.num_glyphs(), 2);
        assert_eq!(face.phys_font.outline_resolution, 1000);

        // char map
        assert_eq!(face.char_index(65), 1);
        assert_eq!(face.char_index(66), 2);
        assert_eq!(face.char_index(67), 0);
        assert_eq!(face.char_next(0), (65, 1));

        // kerning
        assert_eq!(face.get_kerning(1, 2).unwrap(), (-40, 0));
        assert_eq!(face.get_kerning(2, 1).unwrap(), (0, 0));

        // outlines
        let glyph = face.load_glyph(1).unwrap();
        assert_eq!(glyph.advance, 600);
        assert_eq!(glyph.outline.contours.len(), 1);
        assert_eq!(glyph.outline.contours[0].segments.len(), 2);

        let glyph = face.load_glyph(2).unwrap();
        assert_eq!(
            glyph.outline.contours[0].segments[1].end(),
            crate::geometry::Point::new(200.0, 200.0)
        );

        // reserved and out-of-range glyph ids are rejected
        assert!(face.load_glyph(0).is_err());
        assert!(face.load_glyph(3).is_err());
    }

    #[test]
    fn face_index_out_of_range() {
        let file = build_container();

        assert!(PfrFace::load(Stream::from_bytes(&file), 1).is_err());
    }

    #[test]
    fn corrupt_magic_is_rejected() {
        let mut file = build_container();
        file[0] = b'Q';

        assert!(PfrFace::load(Stream::from_bytes(&file), 0).is_err());
    }
}
