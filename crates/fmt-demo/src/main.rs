//! Demonstrates the engine end to end: parse a format string against a
//! small built-in symbol table, then render (optionally through the pipe
//! filter) into a fixed column width.

use anyhow::{Context, Result};
use clap::Parser;
use fmt_core::{
    DataType, DefinitionTable, RenderData, RenderEntry, SymbolDef, SymbolEntry, SymbolTable,
};
use fmt_config::FormatVariable;
use fmt_filter::expando_filter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "fmt-demo", version, about = "Format-string engine demo")]
struct Args {
    /// The format string to parse and render, e.g. "%-20.20s %4n%|>".
    format: String,

    /// Output column width.
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Run the pipe-filter path instead of plain rendering.
    #[arg(long)]
    filter: bool,
}

/// Domain id for this demo's one symbol table.
const DOMAIN: i32 = 1;

fn demo_defs() -> DefinitionTable {
    DefinitionTable::new(vec![
        SymbolDef {
            domain: DOMAIN,
            uid: 1,
            short_name: "s",
            long_name: Some("subject"),
            data_type: DataType::String,
            is_date_shorthand: false,
            takes_enclosed_text: false,
        },
        SymbolDef {
            domain: DOMAIN,
            uid: 2,
            short_name: "n",
            long_name: Some("number"),
            data_type: DataType::Number,
            is_date_shorthand: false,
            takes_enclosed_text: false,
        },
    ])
}

fn demo_table() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.insert(SymbolEntry::string_only(
        1,
        Box::new(|_n, _o, _f, out: &mut String| out.push_str("Quarterly report")),
    ));
    table.insert(SymbolEntry::number_only(2, Box::new(|_n, _o, _f| 42)));
    table
}

fn configure_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    let defs = demo_defs();
    let variable = FormatVariable::new("demo_format", args.format.clone(), defs, false, false)
        .with_context(|| format!("invalid format string: {:?}", args.format))?;

    let table = demo_table();
    let object: i32 = 0;
    let data = RenderData::new().register(RenderEntry {
        domain: DOMAIN,
        table: &table,
        object: &object,
        flags: 0,
    });

    let mut out = String::new();
    if args.filter {
        expando_filter(variable.tree(), &data, args.width, &mut out);
    } else {
        fmt_render::render(variable.tree(), &data, args.width, &mut out);
    }

    println!("{out}");
    Ok(())
}
