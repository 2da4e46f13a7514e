//! Parses a format string into an [`fmt_core::Node`] tree (§4.D).
//!
//! The grammar is driven entirely off a caller-supplied [`DefinitionTable`]:
//! every symbol name the parser accepts has to be registered by the host
//! ahead of time, which is what keeps an unknown `(domain, uid)` pair from
//! ever reaching the renderer (§4.C).

mod error;
mod parser;

pub use error::ParseError;

use fmt_core::{optimize, DefinitionTable, Node};
use parser::Parser;

/// Parse `input` against `defs`, returning an optimized tree (padding
/// repad + container collapse already applied) or the first parse error
/// encountered. On error, no partial tree escapes this function — Rust
/// drops whatever had been built as the `?` chain unwinds.
pub fn parse(input: &str, defs: &DefinitionTable) -> Result<Node, ParseError> {
    let mut p = Parser::new(input, defs);
    let nodes = p.parse_root()?;
    Ok(optimize(Node::new_container(nodes, None)))
}
