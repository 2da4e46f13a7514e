//! Recursive-descent parser for the format-string grammar (§4.D).
//!
//! Nesting of the new-style conditional (`%<...>`) falls out of the
//! recursion for free: each `%<` call consumes its own matching bare `>`
//! before returning, so a terminator scan at any given level only ever
//! sees the `>` that belongs to it. There is no separate depth counter.

use crate::error::ParseError;
use fmt_core::{FormatDescriptor, Leader, Node, PaddingKind, Period, SymbolDef, SymbolRef};
use fmt_core::DefinitionTable;
use fmt_text::Justify;

pub struct Parser<'a> {
    src: &'a str,
    defs: &'a DefinitionTable,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, defs: &'a DefinitionTable) -> Self {
        Self { src, defs, pos: 0 }
    }

    pub fn parse_root(&mut self) -> Result<Vec<Node>, ParseError> {
        self.parse_sequence(&[], true)
    }

    fn remaining(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn err_at(&self, position: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            position,
            message: message.into(),
        }
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        self.err_at(self.pos, message)
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        let at = self.pos;
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.err_at(at, format!("expected '{expected}', found '{c}'"))),
            None => Err(self.err_at(at, format!("unexpected end of input, expected '{expected}'"))),
        }
    }

    /// Consume a run of ASCII digits, returning the captured text and the
    /// byte offset it started at (for error anchoring on overflow).
    fn take_digits(&mut self) -> (String, usize) {
        let start = self.pos;
        let mut digits = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }
        (digits, start)
    }

    /// Parse a run of text/expandos/paddings/conditionals until EOF or one
    /// of `terminators` is reached (the terminator itself is left
    /// unconsumed). `allow_conditionals` is false inside an old-style
    /// branch, where nesting another conditional is a parse error.
    fn parse_sequence(
        &mut self,
        terminators: &[char],
        allow_conditionals: bool,
    ) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        let mut text_buf = String::new();
        loop {
            match self.peek_char() {
                None => break,
                Some(c) if terminators.contains(&c) => break,
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        // `|` is special: the filter glue (outside this
                        // crate) distinguishes an escaped trailing pipe
                        // from a real one by counting backslashes still
                        // present in the rendered text, so the escape is
                        // kept verbatim here rather than consumed.
                        Some('|') => text_buf.push_str("\\|"),
                        Some(escaped) => text_buf.push(escaped),
                        None => return Err(self.err("dangling escape at end of input")),
                    }
                }
                Some('%') => {
                    let percent_start = self.pos;
                    self.bump();
                    if self.peek_char() == Some('%') {
                        self.bump();
                        text_buf.push('%');
                        continue;
                    }
                    if !text_buf.is_empty() {
                        nodes.push(Node::new_text(std::mem::take(&mut text_buf)));
                    }
                    let node = self.parse_specifier()?;
                    if !allow_conditionals && matches!(node, Node::Condition { .. }) {
                        return Err(self.err_at(
                            percent_start,
                            "nested conditional not allowed inside an old-style branch",
                        ));
                    }
                    nodes.push(node);
                }
                Some(c) => {
                    self.bump();
                    text_buf.push(c);
                }
            }
        }
        if !text_buf.is_empty() {
            nodes.push(Node::new_text(text_buf));
        }
        Ok(nodes)
    }

    /// Parse everything after a `%` that was not itself `%%`.
    fn parse_specifier(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;

        let mut justify: Option<Justify> = None;
        match self.peek_char() {
            Some('-') => {
                self.bump();
                justify = Some(Justify::Left);
            }
            Some('=') => {
                self.bump();
                justify = Some(Justify::Center);
            }
            _ => {}
        }

        let mut leader = Leader::Space;
        let mut min_cols: u16 = 0;
        let (digits, digit_start) = self.take_digits();
        if !digits.is_empty() {
            if digits.len() > 1 && digits.starts_with('0') {
                leader = Leader::Zero;
                min_cols = digits[1..]
                    .parse()
                    .map_err(|_| self.err_at(digit_start, "numeric width overflow"))?;
            } else {
                min_cols = digits
                    .parse()
                    .map_err(|_| self.err_at(digit_start, "numeric width overflow"))?;
            }
        }

        let mut max_cols: Option<u16> = None;
        if self.peek_char() == Some('.') {
            self.bump();
            let (pdigits, prec_start) = self.take_digits();
            if pdigits.is_empty() {
                return Err(self.err("missing precision digits after '.'"));
            }
            max_cols = Some(
                pdigits
                    .parse()
                    .map_err(|_| self.err_at(prec_start, "numeric precision overflow"))?,
            );
        }

        let mut lower = false;
        if self.peek_char() == Some('_') {
            self.bump();
            lower = true;
        }

        let has_descriptor =
            justify.is_some() || leader == Leader::Zero || min_cols != 0 || max_cols.is_some() || lower;
        let desc = if has_descriptor {
            let d = FormatDescriptor {
                min_cols,
                max_cols,
                justify,
                leader,
                lower,
            };
            if !d.is_valid() {
                return Err(self.err_at(start, "minimum width exceeds maximum width"));
            }
            Some(d)
        } else {
            None
        };

        match self.peek_char() {
            None => Err(self.err("unexpected end of input in format specifier")),
            Some(c) if c == '|' || c == '>' || c == '*' => {
                if has_descriptor {
                    return Err(self.err_at(
                        start,
                        "padding specifier must not carry a format descriptor",
                    ));
                }
                self.bump();
                let kind = match c {
                    '|' => PaddingKind::FillToEol,
                    '>' => PaddingKind::Hard,
                    '*' => PaddingKind::Soft,
                    _ => unreachable!(),
                };
                let fill = match self.bump() {
                    Some(g) => g.to_string(),
                    None => " ".to_string(),
                };
                Ok(Node::new_padding(kind, fill, Node::Empty, Node::Empty))
            }
            Some('?') => {
                self.bump();
                self.parse_old_conditional(desc)
            }
            Some('<') => {
                self.bump();
                self.parse_new_conditional(desc)
            }
            Some('[') => self.parse_enclosed_expando(desc),
            _ => self.parse_named_expando(desc),
        }
    }

    fn parse_old_conditional(&mut self, desc: Option<FormatDescriptor>) -> Result<Node, ParseError> {
        let predicate = self.parse_predicate()?;
        self.expect_char('?')?;
        let true_nodes = self.parse_sequence(&['&', '?'], false)?;
        let when_true = Node::new_container(true_nodes, None);
        let when_false = if self.peek_char() == Some('&') {
            self.bump();
            let false_nodes = self.parse_sequence(&['?'], false)?;
            Node::new_container(false_nodes, None)
        } else {
            Node::Empty
        };
        self.expect_char('?')?;
        Ok(Node::new_condition(predicate, when_true, when_false, desc))
    }

    fn parse_new_conditional(&mut self, desc: Option<FormatDescriptor>) -> Result<Node, ParseError> {
        let predicate = self.parse_predicate()?;
        self.expect_char('?')?;
        let true_nodes = self.parse_sequence(&['&', '>'], true)?;
        let when_true = Node::new_container(true_nodes, None);
        let when_false = if self.peek_char() == Some('&') {
            self.bump();
            let false_nodes = self.parse_sequence(&['>'], true)?;
            Node::new_container(false_nodes, None)
        } else {
            Node::Empty
        };
        self.expect_char('>')?;
        Ok(Node::new_condition(predicate, when_true, when_false, desc))
    }

    /// Predicate grammar: the leading `%` is elided, so this parses either
    /// a bare date shorthand (`[digits]period`, digits required so a plain
    /// registered short name always wins over a bare period letter) or an
    /// ordinary registered symbol name.
    fn parse_predicate(&mut self) -> Result<Node, ParseError> {
        match self.peek_char() {
            None => Err(self.err("unexpected end of input in conditional predicate")),
            Some(c) if c == '|' || c == '>' || c == '*' => {
                Err(self.err("padding specifier must not appear as a conditional predicate"))
            }
            Some(c) if c.is_ascii_digit() => self.parse_date_shorthand(),
            Some(_) => self.parse_symbol_predicate(),
        }
    }

    fn parse_date_shorthand(&mut self) -> Result<Node, ParseError> {
        let (digits, digit_start) = self.take_digits();
        let count: u32 = digits
            .parse()
            .map_err(|_| self.err_at(digit_start, "numeric overflow in date shorthand count"))?;
        let period_pos = self.pos;
        let period_char = self
            .bump()
            .ok_or_else(|| self.err_at(period_pos, "missing period letter in date shorthand"))?;
        let period = Period::from_letter(period_char).ok_or_else(|| {
            self.err_at(
                period_pos,
                format!("unknown period letter '{period_char}' in date shorthand"),
            )
        })?;
        let anchor: SymbolDef = *self
            .defs
            .iter()
            .find(|d| d.is_date_shorthand)
            .ok_or_else(|| self.err_at(digit_start, "no date-shorthand symbol registered"))?;
        Ok(Node::new_cond_date(
            SymbolRef {
                domain: anchor.domain,
                uid: anchor.uid,
            },
            count,
            period,
        ))
    }

    fn parse_symbol_predicate(&mut self) -> Result<Node, ParseError> {
        let name_start = self.pos;
        match self.match_symbol_name() {
            Some(def) => Ok(Node::new_cond_bool(SymbolRef {
                domain: def.domain,
                uid: def.uid,
            })),
            None => Err(self.err_at(name_start, "unknown symbol name in conditional predicate")),
        }
    }

    fn parse_named_expando(&mut self, desc: Option<FormatDescriptor>) -> Result<Node, ParseError> {
        let name_start = self.pos;
        match self.match_symbol_name() {
            Some(def) => Ok(Node::new_expando(
                SymbolRef {
                    domain: def.domain,
                    uid: def.uid,
                },
                desc,
            )),
            None => Err(self.err_at(name_start, "unknown symbol name")),
        }
    }

    fn parse_enclosed_expando(&mut self, desc: Option<FormatDescriptor>) -> Result<Node, ParseError> {
        let bracket_pos = self.pos;
        self.bump(); // '['
        let anchor: SymbolDef = *self
            .defs
            .iter()
            .find(|d| d.takes_enclosed_text)
            .ok_or_else(|| self.err_at(bracket_pos, "no enclosed-expando symbol registered"))?;
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.err("missing ']' terminator for enclosed format")),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(self.err("dangling escape in enclosed format")),
                    }
                }
                Some(c) => {
                    self.bump();
                    text.push(c);
                }
            }
        }
        Ok(Node::new_expando_with_text(
            SymbolRef {
                domain: anchor.domain,
                uid: anchor.uid,
            },
            desc,
            text,
        ))
    }

    /// Longest-match (two characters, then one) lookup against the
    /// definition table, advancing past whatever matched.
    fn match_symbol_name(&mut self) -> Option<SymbolDef> {
        let rem = self.remaining();
        let mut chars = rem.chars();
        let c1 = chars.next()?;
        let c2 = chars.next();
        if let Some(b) = c2 {
            let two: String = [c1, b].iter().collect();
            if let Some(def) = self.defs.lookup(&two) {
                let def = *def;
                self.pos += c1.len_utf8() + b.len_utf8();
                return Some(def);
            }
        }
        let one = c1.to_string();
        if let Some(def) = self.defs.lookup(&one) {
            let def = *def;
            self.pos += c1.len_utf8();
            return Some(def);
        }
        None
    }
}
