//! Screen-column width primitives.
//!
//! Maps byte strings to terminal column counts the way the downstream
//! renderer needs: combining marks don't advance the cursor, East-Asian
//! wide characters take two cells, and the engine's own in-band colour
//! markers are transparent to both width accounting and case folding.

pub mod advance;
pub mod lower;
pub mod units;
pub mod width;

pub use advance::{advance, fill_remaining, pad, truncate_to_cols, Justify};
pub use lower::lowercase_preserving_markers;
pub use units::{scan, Unit, SENTINEL, TREE_GLYPH_RANGE};
pub use width::{width_of_char, width_of_grapheme};
