//! Parse-tree node model (§3, §4.B).
//!
//! Every relation in the tree is owned and strictly tree-shaped: no cycles,
//! no shared pointers. A child slot that has nothing in it holds
//! [`Node::Empty`] rather than being absent, so traversal code never has to
//! special-case a missing child.

use fmt_text::Justify;

/// Pad character for a format descriptor's `leader` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leader {
    Space,
    Zero,
}

/// `(min_cols, max_cols, justify, leader, lower)` bundle applied to a
/// rendered string (§3 "Format descriptor"). Absent on a node means the
/// defaults in §4.E apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub min_cols: u16,
    pub max_cols: Option<u16>,
    pub justify: Option<Justify>,
    pub leader: Leader,
    pub lower: bool,
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self {
            min_cols: 0,
            max_cols: None,
            justify: None,
            leader: Leader::Space,
            lower: false,
        }
    }
}

impl FormatDescriptor {
    /// Invariant 5: `min_cols <= max_cols` when both are bounded.
    pub fn is_valid(&self) -> bool {
        match self.max_cols {
            Some(max) => self.min_cols <= max,
            None => true,
        }
    }
}

/// Calendar period used by a conditional-date predicate (§4.I).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
}

impl Period {
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'y' => Some(Period::Years),
            'm' => Some(Period::Months),
            'w' => Some(Period::Weeks),
            'd' => Some(Period::Days),
            'H' => Some(Period::Hours),
            'M' => Some(Period::Minutes),
            _ => None,
        }
    }
}

/// One of the three padding disciplines (§3 "Padding").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingKind {
    FillToEol,
    Hard,
    Soft,
}

/// A symbol reference: `(domain, uid)` plus whatever the parser captured
/// alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub domain: i32,
    pub uid: i32,
}

/// A parse-tree node (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Placeholder, no contribution to output.
    Empty,
    /// Literal, already de-escaped text.
    Text(String),
    /// A `%`-introduced expando.
    Expando {
        symbol: SymbolRef,
        desc: Option<FormatDescriptor>,
        /// Verbatim enclosed text for `%[FORMAT]`-shaped expandos, if any.
        text: Option<String>,
        /// Colour id this expando's output should be wrapped in, if set.
        color: Option<u8>,
    },
    /// One of the three padding disciplines, with the children it splits
    /// free space between.
    Padding {
        kind: PaddingKind,
        fill: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Three-branch conditional: predicate / true-branch / false-branch.
    Condition {
        predicate: Box<Node>,
        when_true: Box<Node>,
        when_false: Box<Node>,
        desc: Option<FormatDescriptor>,
    },
    /// Predicate: "symbol's number is non-zero, or its string is
    /// non-empty".
    CondBool(SymbolRef),
    /// Predicate: "symbol's timestamp is newer than a calendar cutoff".
    CondDate {
        symbol: SymbolRef,
        count: u32,
        period: Period,
    },
    /// Ordered sequence of children, optionally carrying its own format
    /// descriptor.
    Container {
        children: Vec<Node>,
        desc: Option<FormatDescriptor>,
    },
}

impl Node {
    pub fn new_empty() -> Self {
        Node::Empty
    }

    pub fn new_text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn new_expando(symbol: SymbolRef, desc: Option<FormatDescriptor>) -> Self {
        Node::Expando {
            symbol,
            desc,
            text: None,
            color: None,
        }
    }

    pub fn new_expando_with_text(
        symbol: SymbolRef,
        desc: Option<FormatDescriptor>,
        text: String,
    ) -> Self {
        Node::Expando {
            symbol,
            desc,
            text: Some(text),
            color: None,
        }
    }

    pub fn new_padding(kind: PaddingKind, fill: String, left: Node, right: Node) -> Self {
        Node::Padding {
            kind,
            fill,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn new_condition(
        predicate: Node,
        when_true: Node,
        when_false: Node,
        desc: Option<FormatDescriptor>,
    ) -> Self {
        debug_assert!(
            predicate.is_valid_predicate(),
            "Condition predicate must be CondBool/CondDate or a single-child wrapper around one"
        );
        Node::Condition {
            predicate: Box::new(predicate),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
            desc,
        }
    }

    pub fn new_cond_bool(symbol: SymbolRef) -> Self {
        Node::CondBool(symbol)
    }

    pub fn new_cond_date(symbol: SymbolRef, count: u32, period: Period) -> Self {
        Node::CondDate {
            symbol,
            count,
            period,
        }
    }

    pub fn new_container(children: Vec<Node>, desc: Option<FormatDescriptor>) -> Self {
        Node::Container { children, desc }
    }

    /// Invariant 2: a `Condition`'s predicate is never empty and is of kind
    /// `CondBool`, `CondDate`, or a wrapper `Container` around exactly one
    /// such node.
    fn is_valid_predicate(&self) -> bool {
        match self {
            Node::CondBool(_) | Node::CondDate { .. } => true,
            Node::Container { children, .. } if children.len() == 1 => {
                children[0].is_valid_predicate()
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }
}
