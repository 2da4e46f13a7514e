//! Renders an [`fmt_core::Node`] tree into a column-bounded string (§4.E).

mod cutoff;
mod renderer;

pub use cutoff::{cutoff, cutoff_at};
pub use renderer::render;
