//! Special-aware lowercasing (§4.A).
//!
//! ASCII letters fold to lowercase; colour markers and tree-drawing glyphs
//! pass through untouched so embedded colour codes and thread-tree ASCII
//! art survive the `_` (lower) format flag.

use crate::units::{is_tree_glyph, scan, Unit};

pub fn lowercase_preserving_markers(s: &str) -> String {
    let mut out = String::new();
    for unit in scan(s) {
        match unit {
            Unit::Marker(id) => {
                out.push(crate::units::SENTINEL as char);
                out.push(id as char);
            }
            Unit::Grapheme { text, .. } => {
                if is_tree_glyph(&text) {
                    out.push_str(&text);
                } else {
                    out.push_str(&text.to_ascii_lowercase());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::SENTINEL;

    #[test]
    fn lowercases_ascii() {
        assert_eq!(lowercase_preserving_markers("HeLLo"), "hello");
    }

    #[test]
    fn preserves_colour_markers() {
        let mut s = String::new();
        s.push(SENTINEL as char);
        s.push(3 as char);
        s.push_str("AB");
        s.push(SENTINEL as char);
        s.push(0 as char);
        let out = lowercase_preserving_markers(&s);
        let mut expected = String::new();
        expected.push(SENTINEL as char);
        expected.push(3 as char);
        expected.push_str("ab");
        expected.push(SENTINEL as char);
        expected.push(0 as char);
        assert_eq!(out, expected);
    }

    #[test]
    fn preserves_tree_glyphs() {
        let s = "\u{2514}\u{2500}X";
        assert_eq!(lowercase_preserving_markers(s), "\u{2514}\u{2500}x");
    }
}
