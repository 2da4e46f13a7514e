//! Deterministic debug dump (§4.H).
//!
//! Not meant to round-trip back into a format string — only to be
//! deterministic, so two structurally equal trees produce byte-identical
//! dumps. Used by tests and a debug command.

use crate::node::{FormatDescriptor, Leader, Node, PaddingKind, Period, SymbolRef};
use fmt_text::Justify;

pub fn serialize(node: &Node) -> String {
    match node {
        Node::Empty => "<EMPTY>".to_string(),
        Node::Text(s) => format!("<TEXT:{}>", escape(s)),
        Node::Expando {
            symbol,
            desc,
            text,
            color,
        } => {
            let mut out = format!(
                "<EXP:({},{}):{}",
                symbol.domain,
                symbol.uid,
                desc_str(desc)
            );
            if let Some(t) = text {
                out.push_str(&format!(":text={}", escape(t)));
            }
            if let Some(c) = color {
                out.push_str(&format!(":color={c}"));
            }
            out.push('>');
            out
        }
        Node::Padding {
            kind,
            fill,
            left,
            right,
        } => format!(
            "<PAD:{}:'{}':{}|{}>",
            padding_kind_str(*kind),
            escape(fill),
            serialize(left),
            serialize(right)
        ),
        Node::Condition {
            predicate,
            when_true,
            when_false,
            desc,
        } => format!(
            "<COND:{}{}|{}|{}>",
            desc_str(desc),
            serialize(predicate),
            serialize(when_true),
            serialize(when_false)
        ),
        Node::CondBool(SymbolRef { domain, uid }) => format!("<CONDBOOL:({domain},{uid})>"),
        Node::CondDate {
            symbol,
            count,
            period,
        } => format!(
            "<CONDDATE:({},{}):{}{}>",
            symbol.domain,
            symbol.uid,
            count,
            period_letter(*period)
        ),
        Node::Container { children, desc } => {
            let parts: Vec<String> = children.iter().map(serialize).collect();
            format!("<CONTAINER:{}[{}]>", desc_str(desc), parts.join(","))
        }
    }
}

fn desc_str(desc: &Option<FormatDescriptor>) -> String {
    match desc {
        None => "{}".to_string(),
        Some(d) => format!(
            "{{min={},max={},justify={},leader={},lower={}}}",
            d.min_cols,
            d.max_cols.map(|m| m.to_string()).unwrap_or_else(|| "inf".into()),
            justify_str(d.justify),
            leader_str(d.leader),
            d.lower
        ),
    }
}

fn justify_str(j: Option<Justify>) -> &'static str {
    match j {
        None => "default",
        Some(Justify::Left) => "left",
        Some(Justify::Center) => "center",
        Some(Justify::Right) => "right",
    }
}

fn leader_str(l: Leader) -> &'static str {
    match l {
        Leader::Space => "space",
        Leader::Zero => "zero",
    }
}

fn padding_kind_str(k: PaddingKind) -> &'static str {
    match k {
        PaddingKind::FillToEol => "FillToEol",
        PaddingKind::Hard => "Hard",
        PaddingKind::Soft => "Soft",
    }
}

fn period_letter(p: Period) -> char {
    match p {
        Period::Years => 'y',
        Period::Months => 'm',
        Period::Weeks => 'w',
        Period::Days => 'd',
        Period::Hours => 'H',
        Period::Minutes => 'M',
    }
}

/// Escape characters that would make the dump ambiguous to read.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('>', "\\>").replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PaddingKind;

    #[test]
    fn text_node_dump() {
        assert_eq!(serialize(&Node::new_text("hi")), "<TEXT:hi>");
    }

    #[test]
    fn equal_trees_produce_identical_dumps() {
        let a = Node::new_padding(PaddingKind::Hard, "-".into(), Node::new_text("L"), Node::new_text("R"));
        let b = Node::new_padding(PaddingKind::Hard, "-".into(), Node::new_text("L"), Node::new_text("R"));
        assert_eq!(serialize(&a), serialize(&b));
    }

    #[test]
    fn different_trees_produce_different_dumps() {
        let a = Node::new_text("a");
        let b = Node::new_text("b");
        assert_ne!(serialize(&a), serialize(&b));
    }

    #[test]
    fn cond_date_dump_includes_count_and_period_letter() {
        let n = Node::new_cond_date(
            SymbolRef { domain: 1, uid: 2 },
            3,
            Period::Weeks,
        );
        assert_eq!(serialize(&n), "<CONDDATE:(1,2):3w>");
    }
}
