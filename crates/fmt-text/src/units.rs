//! Grapheme-and-marker scanning.
//!
//! The renderer emits two kinds of in-band, non-text byte sequences that
//! must survive width accounting and case folding untouched:
//!
//! * a two-byte **colour marker**, `{SENTINEL, colour_id}` (§6 "Colour
//!   markers"), zero columns wide;
//! * **tree-drawing glyphs** (`U+2500..=U+257F`, the box-drawing block used
//!   to draw thread-tree ASCII art), which are ordinary printable clusters
//!   for width purposes but must not be case-folded.
//!
//! [`scan`] walks a string once and yields [`Unit`]s that downstream code
//! (padding, truncation, lowercasing) can operate on without re-deriving
//! grapheme boundaries or re-detecting markers.

use crate::width::{needs_replacement, width_of_grapheme, REPLACEMENT_CHAR};
use unicode_segmentation::UnicodeSegmentation;

/// Sentinel byte introducing a colour marker. Chosen in the C0 control
/// range so the byte is always valid single-byte UTF-8 and never collides
/// with ordinary printable text.
pub const SENTINEL: u8 = 0x01;

/// Box-drawing block used for thread-tree art; transparent to case-folding.
pub const TREE_GLYPH_RANGE: std::ops::RangeInclusive<char> = '\u{2500}'..='\u{257F}';

/// One scanned unit of a rendered string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A single extended grapheme cluster with its screen width.
    Grapheme { text: String, width: u16 },
    /// A colour marker; always zero columns wide.
    Marker(u8),
}

impl Unit {
    pub fn width(&self) -> u16 {
        match self {
            Unit::Grapheme { width, .. } => *width,
            Unit::Marker(_) => 0,
        }
    }

    /// Byte length of this unit once re-serialised.
    pub fn byte_len(&self) -> usize {
        match self {
            Unit::Grapheme { text, .. } => text.len(),
            Unit::Marker(_) => 2,
        }
    }

    pub fn push_to(&self, out: &mut String) {
        match self {
            Unit::Grapheme { text, .. } => out.push_str(text),
            Unit::Marker(id) => {
                out.push(SENTINEL as char);
                out.push(*id as char);
            }
        }
    }
}

/// Scan `s` into grapheme/marker units, replacing non-printable control
/// characters (other than the colour sentinel itself) with `U+FFFD`.
pub fn scan(s: &str) -> Vec<Unit> {
    let mut units = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == SENTINEL && i + 1 < bytes.len() {
            units.push(Unit::Marker(bytes[i + 1]));
            i += 2;
            continue;
        }
        // Find the next marker (or end of string) and grapheme-segment the
        // plain-text run in between.
        let mut j = i + 1;
        while j < bytes.len() && bytes[j] != SENTINEL {
            j += 1;
        }
        let run = &s[i..j];
        for g in run.graphemes(true) {
            if g.chars().count() == 1 && needs_replacement(g.chars().next().unwrap()) {
                units.push(Unit::Grapheme {
                    text: REPLACEMENT_CHAR.to_string(),
                    width: 1,
                });
            } else {
                units.push(Unit::Grapheme {
                    text: g.to_string(),
                    width: width_of_grapheme(g),
                });
            }
        }
        i = j;
    }
    units
}

/// Render a unit sequence back to a plain string.
pub fn render(units: &[Unit]) -> String {
    let mut out = String::new();
    for u in units {
        u.push_to(&mut out);
    }
    out
}

/// Total screen-column width of a unit sequence.
pub fn total_width(units: &[Unit]) -> u16 {
    units.iter().map(Unit::width).sum()
}

/// Is this grapheme a tree-drawing glyph (single codepoint in the
/// box-drawing block)?
pub fn is_tree_glyph(g: &str) -> bool {
    let mut chars = g.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => TREE_GLYPH_RANGE.contains(&c),
        _ => false,
    }
}
