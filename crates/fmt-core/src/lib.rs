//! Node model, symbol registry, and debug serialiser.
//!
//! This crate owns the data the parser builds and the renderer walks, but
//! knows nothing about format-string syntax or column budgets itself —
//! those live in `fmt-parser` and `fmt-render` respectively.

pub mod node;
pub mod optimize;
pub mod registry;
pub mod serialize;

pub use node::{FormatDescriptor, Leader, Node, PaddingKind, Period, SymbolRef};
pub use optimize::optimize;
pub use registry::{
    DataType, DefinitionTable, NumberGetter, RenderData, RenderEntry, StringGetter, SymbolDef,
    SymbolEntry, SymbolTable,
};
pub use serialize::serialize;
