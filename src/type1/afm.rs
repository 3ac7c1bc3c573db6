//! AFM (Adobe Font Metrics) kerning support for Type 1 faces.
//!
//! Only the `KP`/`KPX` kerning-pair lines are consumed; everything else in
//! the metrics file is skipped line by line.

use crate::{
    error::FontResult,
    lex::LexBase,
    psnames::GlyphNames,
    type1::dict::TokenReader,
};

/// `(glyph1 << 16) | glyph2`, the binary-search key.
fn kern_pair_index(glyph1: u32, glyph2: u32) -> u32 {
    (glyph1 << 16) | (glyph2 & 0xFFFF)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernPair {
    pub glyph1: u32,
    pub glyph2: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Default)]
pub struct AfmKerning {
    /// Sorted by composite key after construction
    pairs: Vec<KernPair>,
}

/// Parses the kerning pairs out of AFM text.
///
/// Two passes, preserved from the original design: the first counts `"KP"`
/// substrings to size the allocation, the second extracts the
/// `KP/KPX name1 name2 dx [dy]` lines. A `"KP"` appearing in an unexpected
/// context (a glyph name, a comment) inflates the count; the extraction pass
/// trusts the count rather than validating it, which is a known limitation
/// rather than a bug to fix.
pub fn read_afm(buffer: &[u8], names: &dyn GlyphNames) -> FontResult<AfmKerning> {
    let count = buffer.windows(2).filter(|w| w == b"KP").count();

    let mut kerning = AfmKerning {
        pairs: Vec::with_capacity(count),
    };

    let mut reader = TokenReader::new(buffer);

    while !reader.at_end() {
        if kerning.pairs.len() >= count {
            break;
        }

        if !reader.next_matches(b"KP") {
            reader.skip_to_next_line();
            continue;
        }

        if let Some(pair) = parse_kern_line(&mut reader, names) {
            kerning.pairs.push(pair);
        }

        reader.skip_to_next_line();
    }

    kerning
        .pairs
        .sort_by_key(|pair| kern_pair_index(pair.glyph1, pair.glyph2));

    Ok(kerning)
}

/// `KP name1 name2 dx dy` or `KPX name1 name2 dx`; anything malformed on
/// the line yields nothing.
fn parse_kern_line(reader: &mut TokenReader, names: &dyn GlyphNames) -> Option<KernPair> {
    let keyword = reader.lex_identifier();
    let is_kpx = match keyword.as_str() {
        "KP" => false,
        "KPX" => true,
        _ => return None,
    };

    reader.skip_whitespace();
    let name1 = reader.lex_identifier();
    reader.skip_whitespace();
    let name2 = reader.lex_identifier();

    let glyph1 = names.glyph_index(&name1)?;
    let glyph2 = names.glyph_index(&name2)?;

    reader.skip_whitespace();
    let x = reader.lex_integer().ok()?;

    let y = if is_kpx {
        0
    } else {
        reader.skip_whitespace();
        reader.lex_integer().ok()?
    };

    Some(KernPair {
        glyph1,
        glyph2,
        x,
        y,
    })
}

impl AfmKerning {
    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[KernPair] {
        &self.pairs
    }

    /// Binary search by composite key; `(0, 0)` for any absent pair.
    pub fn get_kerning(&self, glyph1: u32, glyph2: u32) -> (i32, i32) {
        let key = kern_pair_index(glyph1, glyph2);

        match self
            .pairs
            .binary_search_by_key(&key, |pair| kern_pair_index(pair.glyph1, pair.glyph2))
        {
            Ok(index) => (self.pairs[index].x, self.pairs[index].y),
            Err(..) => (0, 0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Names(Vec<&'static str>);

    impl GlyphNames for Names {
        fn glyph_name(&self, glyph_id: u32) -> Option<&str> {
            self.0.get(glyph_id as usize).copied()
        }

        fn glyph_index(&self, name: &str) -> Option<u32> {
            self.0.iter().position(|&n| n == name).map(|i| i as u32)
        }

        fn num_glyphs(&self) -> u32 {
            self.0.len() as u32
        }
    }

    fn names() -> Names {
        Names(vec![".notdef", "A", "V", "T", "o", "W"])
    }

    const AFM: &str = "StartFontMetrics 2.0\n\
        Comment Copyright\n\
        FontName Sample\n\
        StartKernData\n\
        StartKernPairs 3\n\
        KPX A V -80\n\
        KPX T o -70\n\
        KP W o -60 -5\n\
        EndKernPairs\n\
        EndKernData\n\
        EndFontMetrics\n";

    #[test]
    fn three_pairs_round_trip() {
        let kerning = read_afm(AFM.as_bytes(), &names()).unwrap();

        assert_eq!(kerning.num_pairs(), 3);

        // sorted by composite key
        let keys: Vec<u32> = kerning
            .pairs()
            .iter()
            .map(|p| kern_pair_index(p.glyph1, p.glyph2))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);

        assert_eq!(kerning.get_kerning(1, 2), (-80, 0)); // A V
        assert_eq!(kerning.get_kerning(3, 4), (-70, 0)); // T o
        assert_eq!(kerning.get_kerning(5, 4), (-60, -5)); // W o

        // any other pair yields the zero sentinel
        assert_eq!(kerning.get_kerning(2, 1), (0, 0));
        assert_eq!(kerning.get_kerning(1, 5), (0, 0));
    }

    #[test]
    fn unresolvable_names_are_dropped() {
        let afm = "KPX A Zeta -10\nKPX A V -80\n";
        let kerning = read_afm(afm.as_bytes(), &names()).unwrap();

        assert_eq!(kerning.num_pairs(), 1);
        assert_eq!(kerning.get_kerning(1, 2), (-80, 0));
    }

    #[test]
    fn stray_kp_substring_only_inflates_the_count() {
        // "KPX" inside a comment is counted by the first pass but produces
        // no pair in the second; the count is trusted, not validated
        let afm = "Comment mentions KPX pairs here\nKPX A V -80\n";
        let kerning = read_afm(afm.as_bytes(), &names()).unwrap();

        assert_eq!(kerning.num_pairs(), 1);
    }
}
