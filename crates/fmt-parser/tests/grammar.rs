//! Integration-level grammar tests exercising whole format strings rather
//! than individual specifier forms.

use fmt_core::{DataType, Node, SymbolDef};
use fmt_core::DefinitionTable;
use fmt_parser::parse;

fn defs() -> DefinitionTable {
    DefinitionTable::new(vec![
        SymbolDef {
            domain: 1,
            uid: 1,
            short_name: "a",
            long_name: None,
            data_type: DataType::Number,
            is_date_shorthand: false,
            takes_enclosed_text: false,
        },
        SymbolDef {
            domain: 1,
            uid: 2,
            short_name: "b",
            long_name: None,
            data_type: DataType::Number,
            is_date_shorthand: false,
            takes_enclosed_text: false,
        },
    ])
}

#[test]
fn nested_new_style_conditional_with_literal_brackets_and_trailing_fill() {
    let tree = parse("%<a?[%<b?bb&cc>]&dd>%|.", &defs()).expect("parses");
    match tree {
        Node::Padding {
            kind,
            fill,
            left,
            right,
        } => {
            assert_eq!(kind, fmt_core::PaddingKind::FillToEol);
            assert_eq!(fill, ".");
            assert!(matches!(*left, Node::Condition { .. }));
            assert_eq!(*right, Node::Empty);
        }
        other => panic!("expected top-level Padding, got {other:?}"),
    }
}

#[test]
fn old_and_new_style_conditionals_compose_with_plain_text() {
    let tree = parse("Subject: %?a?present&absent? / %<b?yes&no>", &defs()).expect("parses");
    match tree {
        Node::Container { children, .. } => {
            assert!(children.len() >= 3);
        }
        other => panic!("expected Container, got {other:?}"),
    }
}

#[test]
fn unknown_symbol_reports_the_offending_byte_offset() {
    let err = parse("prefix %zz suffix", &defs()).unwrap_err();
    assert_eq!(err.position, "prefix %".len());
}

#[test]
fn missing_closing_question_mark_on_old_style_is_an_error() {
    let err = parse("%?a?yes&no", &defs()).unwrap_err();
    assert!(err.message.contains("end of input"));
}
