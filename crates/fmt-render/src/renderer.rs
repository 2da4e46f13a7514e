//! Post-order tree walk (§4.E).
//!
//! Every recursive call threads a columns-remaining budget and returns the
//! number of columns it actually used; nothing here ever measures byte
//! length where a column count is meant.

use crate::cutoff::cutoff;
use fmt_core::{FormatDescriptor, Leader, Node, RenderData};
use fmt_text::{advance, fill_remaining, lowercase_preserving_markers, pad, truncate_to_cols, Justify};

/// Render `node` against `data` into `out`, never exceeding `budget`
/// columns. Returns the number of columns actually written.
pub fn render(node: &Node, data: &RenderData, budget: u16, out: &mut String) -> u16 {
    match node {
        Node::Empty => 0,
        Node::Text(s) => {
            let (byte_len, cols) = advance(s, budget);
            out.push_str(&s[..byte_len]);
            cols
        }
        Node::Expando {
            symbol,
            desc,
            text: _,
            color,
        } => render_expando(node, symbol, desc.as_ref(), *color, data, budget, out),
        Node::Container { children, desc } => render_container(children, desc.as_ref(), data, budget, out),
        Node::Condition {
            predicate,
            when_true,
            when_false,
            desc,
        } => render_condition(predicate, when_true, when_false, desc.as_ref(), data, budget, out),
        Node::Padding { kind, fill, left, right } => {
            render_padding(*kind, fill, left, right, data, budget, out)
        }
        // CondBool/CondDate only ever appear as a Condition's predicate,
        // evaluated through `eval_predicate` rather than rendered directly;
        // reaching here means a tree was built outside the parser/optimizer.
        Node::CondBool(_) | Node::CondDate { .. } => {
            tracing::error!("CondBool/CondDate node reached render() directly, not as a predicate");
            0
        }
    }
}

/// Evaluate a predicate node's boolean value without writing visible
/// output (§4.E "rendered into a scratch buffer only to obtain its
/// boolean return value; text is discarded").
fn eval_predicate(node: &Node, data: &RenderData) -> bool {
    match node {
        Node::CondBool(symbol) => eval_cond_bool(symbol, data),
        Node::CondDate { symbol, count, period } => eval_cond_date(symbol, *count, *period, data),
        Node::Container { children, .. } if children.len() == 1 => eval_predicate(&children[0], data),
        other => {
            tracing::error!(?other, "Condition predicate is not CondBool/CondDate; treating as false");
            false
        }
    }
}

fn eval_cond_bool(symbol: &fmt_core::SymbolRef, data: &RenderData) -> bool {
    match data.resolve(symbol.domain, symbol.uid) {
        Some((entry, object, flags)) => {
            if let Some(get_number) = &entry.get_number {
                get_number(&Node::CondBool(symbol.clone()), object, flags) != 0
            } else if let Some(get_string) = &entry.get_string {
                let mut buf = String::new();
                get_string(&Node::CondBool(symbol.clone()), object, flags, &mut buf);
                !buf.is_empty()
            } else {
                tracing::error!(domain = symbol.domain, uid = symbol.uid, "symbol entry has no getters");
                false
            }
        }
        None => {
            tracing::error!(domain = symbol.domain, uid = symbol.uid, "unresolved symbol at render time");
            false
        }
    }
}

fn eval_cond_date(symbol: &fmt_core::SymbolRef, count: u32, period: fmt_core::Period, data: &RenderData) -> bool {
    match data.resolve(symbol.domain, symbol.uid) {
        Some((entry, object, flags)) => match &entry.get_number {
            Some(get_number) => {
                let ts = get_number(
                    &Node::CondDate {
                        symbol: symbol.clone(),
                        count,
                        period,
                    },
                    object,
                    flags,
                );
                ts > cutoff(period, count)
            }
            None => {
                tracing::error!(domain = symbol.domain, uid = symbol.uid, "CondDate symbol has no numeric getter");
                false
            }
        },
        None => {
            tracing::error!(domain = symbol.domain, uid = symbol.uid, "unresolved symbol at render time");
            false
        }
    }
}

fn render_expando(
    node: &Node,
    symbol: &fmt_core::SymbolRef,
    desc: Option<&FormatDescriptor>,
    color: Option<u8>,
    data: &RenderData,
    budget: u16,
    out: &mut String,
) -> u16 {
    let (raw, is_numeric_source) = match data.resolve(symbol.domain, symbol.uid) {
        Some((entry, object, flags)) => {
            if let Some(get_string) = &entry.get_string {
                let mut buf = String::new();
                get_string(node, object, flags, &mut buf);
                (buf, false)
            } else if let Some(get_number) = &entry.get_number {
                let n = get_number(node, object, flags);
                let min_digits = match desc {
                    Some(d) if d.leader == Leader::Zero => d.min_cols,
                    _ => 0,
                };
                (format_number(n, min_digits), true)
            } else {
                tracing::error!(domain = symbol.domain, uid = symbol.uid, "symbol entry has no getters");
                (String::new(), false)
            }
        }
        None => {
            tracing::error!(domain = symbol.domain, uid = symbol.uid, "unresolved symbol at render time");
            (String::new(), false)
        }
    };

    let formatted = apply_descriptor(&raw, desc, is_numeric_source, budget);
    let wrapped = wrap_color(formatted, color);
    let (_, used) = truncate_to_cols(&wrapped, budget);
    out.push_str(&wrapped);
    used
}

fn format_number(n: i64, min_digits: u16) -> String {
    let neg = n < 0;
    let digits = n.unsigned_abs().to_string();
    let needed = min_digits as usize;
    let body_len = digits.len() + if neg { 1 } else { 0 };
    let mut s = String::new();
    if neg {
        s.push('-');
    }
    if body_len < needed {
        for _ in 0..(needed - body_len) {
            s.push('0');
        }
    }
    s.push_str(&digits);
    s
}

/// Apply a format descriptor's truncate/pad/lowercase to `raw`, respecting
/// the outer render `budget` as a hard ceiling (§4.E, §4.A).
fn apply_descriptor(
    raw: &str,
    desc: Option<&FormatDescriptor>,
    is_numeric_source: bool,
    budget: u16,
) -> String {
    let lowered = match desc {
        Some(d) if d.lower => lowercase_preserving_markers(raw),
        _ => raw.to_string(),
    };

    let min_cols = desc.map(|d| d.min_cols).unwrap_or(0);
    let max_cols = desc.and_then(|d| d.max_cols);
    let leader = desc.map(|d| d.leader).unwrap_or(Leader::Space);
    let justify = effective_justify(desc, is_numeric_source);

    let cap = max_cols.unwrap_or(u16::MAX).min(budget);
    let (byte_len, cur_cols) = advance(&lowered, cap);
    let truncated = &lowered[..byte_len];

    let target_min = min_cols.min(budget);
    if cur_cols < target_min {
        let fill = if leader == Leader::Zero { '0' } else { ' ' };
        pad(truncated, cur_cols, target_min, justify, fill)
    } else {
        truncated.to_string()
    }
}

fn effective_justify(desc: Option<&FormatDescriptor>, is_numeric_source: bool) -> Justify {
    match desc {
        None => Justify::Left,
        Some(d) => match d.justify {
            Some(j) => j,
            None => {
                if is_numeric_source || d.leader == Leader::Zero {
                    Justify::Right
                } else {
                    Justify::Left
                }
            }
        },
    }
}

fn wrap_color(text: String, color: Option<u8>) -> String {
    match color {
        None => text,
        Some(id) => {
            let mut s = String::with_capacity(text.len() + 4);
            s.push(fmt_text::SENTINEL as char);
            s.push(id as char);
            s.push_str(&text);
            s.push(fmt_text::SENTINEL as char);
            s.push(0u8 as char);
            s
        }
    }
}

fn render_container(
    children: &[Node],
    desc: Option<&FormatDescriptor>,
    data: &RenderData,
    budget: u16,
    out: &mut String,
) -> u16 {
    let children_budget = desc.and_then(|d| d.max_cols).unwrap_or(u16::MAX).min(budget);
    let mut scratch = String::new();
    let mut used = 0u16;
    for child in children {
        let remaining = children_budget - used;
        if remaining == 0 {
            break;
        }
        used += render(child, data, remaining, &mut scratch);
    }

    match desc {
        None => {
            out.push_str(&scratch);
            used
        }
        Some(d) => {
            let formatted = apply_descriptor(&scratch, Some(d), false, budget);
            let (_, cols) = advance(&formatted, budget);
            out.push_str(&formatted);
            cols
        }
    }
}

fn render_condition(
    predicate: &Node,
    when_true: &Node,
    when_false: &Node,
    desc: Option<&FormatDescriptor>,
    data: &RenderData,
    budget: u16,
    out: &mut String,
) -> u16 {
    let truth = eval_predicate(predicate, data);
    let chosen = if truth { when_true } else { when_false };

    let mut scratch = String::new();
    render(chosen, data, budget, &mut scratch);

    match desc {
        None => {
            out.push_str(&scratch);
            let (_, cols) = advance(&scratch, budget);
            cols
        }
        Some(d) => {
            let formatted = apply_descriptor(&scratch, Some(d), false, budget);
            let (_, cols) = advance(&formatted, budget);
            out.push_str(&formatted);
            cols
        }
    }
}

fn render_padding(
    kind: fmt_core::PaddingKind,
    fill: &str,
    left: &Node,
    right: &Node,
    data: &RenderData,
    budget: u16,
    out: &mut String,
) -> u16 {
    use fmt_core::PaddingKind::*;
    match kind {
        FillToEol => {
            let mut left_buf = String::new();
            let left_cols = render(left, data, budget, &mut left_buf);
            let remaining = budget - left_cols;
            let filler = fill_remaining(fill, remaining);
            out.push_str(&left_buf);
            out.push_str(&filler);
            left_cols + remaining
        }
        Hard => {
            let mut left_buf = String::new();
            let left_cols = render(left, data, budget, &mut left_buf);
            let remaining = budget - left_cols;
            let mut right_buf = String::new();
            let right_cols = render(right, data, remaining, &mut right_buf);
            let gap = remaining - right_cols;
            let filler = fill_remaining(fill, gap);
            out.push_str(&left_buf);
            out.push_str(&filler);
            out.push_str(&right_buf);
            left_cols + gap + right_cols
        }
        Soft => {
            let mut right_buf = String::new();
            let right_cols = render(right, data, budget, &mut right_buf);
            let remaining = budget - right_cols;
            let mut left_buf = String::new();
            let left_cols = render(left, data, remaining, &mut left_buf);
            let gap = remaining - left_cols;
            let filler = fill_remaining(fill, gap);
            out.push_str(&left_buf);
            out.push_str(&filler);
            out.push_str(&right_buf);
            left_cols + gap + right_cols
        }
    }
}
