//! Glyph-name services consumed by the Type 1 and AFM parsers.
//!
//! Faces resolve glyph names against their own name tables through the
//! [`GlyphNames`] seam; the Adobe StandardEncoding table lives here as the
//! one built-in provider every Type 1 font can fall back on.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Capability seam for name <-> glyph index mapping.
///
/// Hosts that carry their own name database can substitute an implementation;
/// the parsers only ever call through this trait.
pub trait GlyphNames {
    fn glyph_name(&self, glyph_id: u32) -> Option<&str>;

    fn glyph_index(&self, name: &str) -> Option<u32>;

    fn num_glyphs(&self) -> u32;
}

pub const NOTDEF: &str = ".notdef";

#[rustfmt::skip]
pub static STANDARD_ENCODING: &[Option<&str>; 256] = &[
    /*\00x*/ None, None, None, None, None, None, None, None,
    /*\01x*/ None, None, None, None, None, None, None, None,
    /*\02x*/ None, None, None, None, None, None, None, None,
    /*\03x*/ None, None, None, None, None, None, None, None,
    /*\04x*/ Some("space"), Some("exclam"), Some("quotedbl"), Some("numbersign"),
             Some("dollar"), Some("percent"), Some("ampersand"), Some("quoteright"),
    /*\05x*/ Some("parenleft"), Some("parenright"), Some("asterisk"), Some("plus"),
             Some("comma"), Some("hyphen"), Some("period"), Some("slash"),
    /*\06x*/ Some("zero"), Some("one"), Some("two"), Some("three"),
             Some("four"), Some("five"), Some("six"), Some("seven"),
    /*\07x*/ Some("eight"), Some("nine"), Some("colon"), Some("semicolon"),
             Some("less"), Some("equal"), Some("greater"), Some("question"),
    /*\10x*/ Some("at"), Some("A"), Some("B"), Some("C"),
             Some("D"), Some("E"), Some("F"), Some("G"),
    /*\11x*/ Some("H"), Some("I"), Some("J"), Some("K"),
             Some("L"), Some("M"), Some("N"), Some("O"),
    /*\12x*/ Some("P"), Some("Q"), Some("R"), Some("S"),
             Some("T"), Some("U"), Some("V"), Some("W"),
    /*\13x*/ Some("X"), Some("Y"), Some("Z"), Some("bracketleft"),
             Some("backslash"), Some("bracketright"), Some("asciicircum"), Some("underscore"),
    /*\14x*/ Some("quoteleft"), Some("a"), Some("b"), Some("c"),
             Some("d"), Some("e"), Some("f"), Some("g"),
    /*\15x*/ Some("h"), Some("i"), Some("j"), Some("k"),
             Some("l"), Some("m"), Some("n"), Some("o"),
    /*\16x*/ Some("p"), Some("q"), Some("r"), Some("s"),
             Some("t"), Some("u"), Some("v"), Some("w"),
    /*\17x*/ Some("x"), Some("y"), Some("z"), Some("braceleft"),
             Some("bar"), Some("braceright"), Some("asciitilde"), None,
    /*\20x*/ None, None, None, None, None, None, None, None,
    /*\21x*/ None, None, None, None, None, None, None, None,
    /*\22x*/ None, None, None, None, None, None, None, None,
    /*\23x*/ None, None, None, None, None, None, None, None,
    /*\24x*/ None, Some("exclamdown"), Some("cent"), Some("sterling"),
             Some("fraction"), Some("yen"), Some("florin"), Some("section"),
    /*\25x*/ Some("currency"), Some("quotesingle"), Some("quotedblleft"), Some("guillemotleft"),
             Some("guilsinglleft"), Some("guilsinglright"), Some("fi"), Some("fl"),
    /*\26x*/ None, Some("endash"), Some("dagger"), Some("daggerdbl"),
             Some("periodcentered"), None, Some("paragraph"), Some("bullet"),
    /*\27x*/ Some("quotesinglbase"), Some("quotedblbase"), Some("quotedblright"), Some("guillemotright"),
             Some("ellipsis"), Some("perthousand"), None, Some("questiondown"),
    /*\30x*/ None, Some("grave"), Some("acute"), Some("circumflex"),
             Some("tilde"), Some("macron"), Some("breve"), Some("dotaccent"),
    /*\31x*/ Some("dieresis"), None, Some("ring"), Some("cedilla"),
             None, Some("hungarumlaut"), Some("ogonek"), Some("caron"),
    /*\32x*/ Some("emdash"), None, None, None, None, None, None, None,
    /*\33x*/ None, None, None, None, None, None, None, None,
    /*\34x*/ None, Some("AE"), None, Some("ordfeminine"), None, None, None, None,
    /*\35x*/ Some("Lslash"), Some("Oslash"), Some("OE"), Some("ordmasculine"), None, None, None, None,
    /*\36x*/ None, Some("ae"), None, None, None, Some("dotlessi"), None, None,
    /*\37x*/ Some("lslash"), Some("oslash"), Some("oe"), Some("germandbls"), None, None, None, None,
];

static STANDARD_ENCODING_BY_NAME: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    STANDARD_ENCODING
        .iter()
        .enumerate()
        .filter_map(|(code, name)| name.map(|name| (name, code as u8)))
        .collect()
});

pub fn standard_code_to_name(code: u32) -> Option<&'static str> {
    STANDARD_ENCODING.get(code as usize).copied().flatten()
}

pub fn standard_name_to_code(name: &str) -> Option<u8> {
    STANDARD_ENCODING_BY_NAME.get(name).copied()
}
