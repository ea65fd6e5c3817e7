//! Encoded affix patterns.
//!
//! An [`AffixPattern`] is the compiled form of an affix string such as
//! `"¤¤ "` or `"'%'-"`: an ordered list of token cells plus one append-only
//! buffer holding the text of every literal run. Adjacent literal text is
//! always merged into a single run, so the encoding of a pattern does not
//! depend on how its literal text was split across calls.
//!
//! Two input syntaxes are understood:
//!
//! - the user syntax ([`AffixPattern::parse_user`]): `%`, `‰`, `-` and runs
//!   of one to three `¤` are symbols, text between single quotes is literal,
//!   and `''` is a literal quote;
//! - the escaped syntax ([`AffixPattern::parse_escaped`]): everything is
//!   literal except a quote followed by a symbol character, so `'%` is a
//!   percent token and `'¤¤` an ISO currency token.

use std::fmt;

use tracing::trace;

use crate::error::AffixError;
use crate::locale_data::CURRENCY_PLACEHOLDER;

const QUOTE: char = '\'';
const PERCENT: char = '%';
const PERMILLE: char = '\u{2030}';
const MINUS: char = '-';

/// Longest currency placeholder run: symbol, ISO code, long name.
pub const MAX_CURRENCY_COUNT: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffixTokenKind {
    Literal,
    Percent,
    PerMill,
    Negative,
    Currency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    /// A literal run of `len` bytes in the literal buffer.
    Literal { len: usize },
    Symbol { kind: AffixTokenKind, count: u8 },
}

/// One decoded token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffixToken<'a> {
    Literal(&'a str),
    Percent,
    PerMill,
    Negative,
    /// Currency placeholder repeated 1 (symbol), 2 (ISO) or 3 (long name) times.
    Currency(u8),
}

impl AffixToken<'_> {
    pub fn kind(&self) -> AffixTokenKind {
        match self {
            AffixToken::Literal(_) => AffixTokenKind::Literal,
            AffixToken::Percent => AffixTokenKind::Percent,
            AffixToken::PerMill => AffixTokenKind::PerMill,
            AffixToken::Negative => AffixTokenKind::Negative,
            AffixToken::Currency(_) => AffixTokenKind::Currency,
        }
    }

    /// Byte length for literals, repetition count for symbols.
    pub fn len(&self) -> usize {
        match self {
            AffixToken::Literal(text) => text.len(),
            AffixToken::Currency(count) => usize::from(*count),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffixPattern {
    cells: Vec<Cell>,
    literals: String,
    char_count: usize,
    has_currency: bool,
    has_percent: bool,
    has_permille: bool,
}

/// Compiles an affix string in user syntax.
pub fn compile_pattern(text: &str) -> Result<AffixPattern, AffixError> {
    AffixPattern::parse_user(text)
}

impl AffixPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_user(text: &str) -> Result<Self, AffixError> {
        let mut pattern = Self::new();
        pattern.append_user(text)?;
        Ok(pattern)
    }

    pub fn parse_escaped(text: &str) -> Result<Self, AffixError> {
        let mut pattern = Self::new();
        pattern.append_escaped(text)?;
        Ok(pattern)
    }

    /// Appends literal text, merging it with a directly preceding literal run.
    pub fn add_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.char_count += text.chars().count();
        self.literals.push_str(text);
        if let Some(Cell::Literal { len }) = self.cells.last_mut() {
            *len += text.len();
        } else {
            self.cells.push(Cell::Literal { len: text.len() });
        }
    }

    /// Appends a single-count symbol token.
    pub fn add(&mut self, kind: AffixTokenKind) {
        self.add_symbol(kind, 1);
    }

    pub fn add_currency(&mut self, count: u8) {
        debug_assert!((1..=MAX_CURRENCY_COUNT).contains(&count));
        self.add_symbol(AffixTokenKind::Currency, count);
    }

    fn add_symbol(&mut self, kind: AffixTokenKind, count: u8) {
        debug_assert!(kind != AffixTokenKind::Literal);
        self.char_count += usize::from(count);
        match kind {
            AffixTokenKind::Currency => self.has_currency = true,
            AffixTokenKind::Percent => self.has_percent = true,
            AffixTokenKind::PerMill => self.has_permille = true,
            _ => {}
        }
        self.cells.push(Cell::Symbol { kind, count });
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of code points the pattern decodes to, counting each symbol
    /// repetition as one.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn has_currency_token(&self) -> bool {
        self.has_currency
    }

    pub fn has_percent_token(&self) -> bool {
        self.has_percent
    }

    pub fn has_permille_token(&self) -> bool {
        self.has_permille
    }

    pub fn iter(&self) -> AffixPatternIter<'_> {
        AffixPatternIter {
            pattern: self,
            next_cell: 0,
            literal_offset: 0,
        }
    }

    /// Appends `text` in user syntax. An unterminated quote runs to the end
    /// of the text.
    pub fn append_user(&mut self, text: &str) -> Result<(), AffixError> {
        let mut pending = String::new();
        let mut quoted = false;
        let mut chars = text.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            if ch == QUOTE {
                if chars.next_if(|&(_, next)| next == QUOTE).is_some() {
                    pending.push(QUOTE);
                } else {
                    quoted = !quoted;
                }
                continue;
            }
            if quoted {
                pending.push(ch);
                continue;
            }
            match ch {
                PERCENT => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::Percent);
                }
                PERMILLE => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::PerMill);
                }
                MINUS => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::Negative);
                }
                CURRENCY_PLACEHOLDER => {
                    let mut count = 1usize;
                    while chars.next_if(|&(_, next)| next == CURRENCY_PLACEHOLDER).is_some() {
                        count += 1;
                    }
                    let count = currency_count(text, offset, count)?;
                    self.flush(&mut pending);
                    self.add_currency(count);
                }
                _ => pending.push(ch),
            }
        }
        self.flush(&mut pending);
        trace!(pattern = text, cells = self.cells.len(), "compiled user affix pattern");
        Ok(())
    }

    /// Appends `text` in escaped syntax.
    pub fn append_escaped(&mut self, text: &str) -> Result<(), AffixError> {
        let mut pending = String::new();
        let mut chars = text.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            if ch != QUOTE {
                pending.push(ch);
                continue;
            }
            let Some((_, escaped)) = chars.next() else {
                // A trailing quote is literal.
                pending.push(QUOTE);
                break;
            };
            match escaped {
                PERCENT => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::Percent);
                }
                PERMILLE => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::PerMill);
                }
                MINUS => {
                    self.flush(&mut pending);
                    self.add(AffixTokenKind::Negative);
                }
                CURRENCY_PLACEHOLDER => {
                    let mut count = 1usize;
                    while chars.next_if(|&(_, next)| next == CURRENCY_PLACEHOLDER).is_some() {
                        count += 1;
                    }
                    let count = currency_count(text, offset, count)?;
                    self.flush(&mut pending);
                    self.add_currency(count);
                }
                other => pending.push(other),
            }
        }
        self.flush(&mut pending);
        trace!(pattern = text, cells = self.cells.len(), "compiled escaped affix pattern");
        Ok(())
    }

    fn flush(&mut self, pending: &mut String) {
        self.add_literal(pending);
        pending.clear();
    }

    /// Renders the pattern back into user syntax. Literal runs are quoted.
    pub fn to_user_string(&self) -> String {
        let mut out = String::with_capacity(self.literals.len() + self.cells.len() * 2);
        for token in self.iter() {
            match token {
                AffixToken::Literal(text) => {
                    // A quote cannot open a quoted run: `'''` reads as a
                    // literal quote followed by an opening one.
                    let rest = text.trim_start_matches(QUOTE);
                    for _ in 0..text.len() - rest.len() {
                        out.push(QUOTE);
                        out.push(QUOTE);
                    }
                    if rest.chars().any(is_special) {
                        out.push(QUOTE);
                        for ch in rest.chars() {
                            if ch == QUOTE {
                                out.push(QUOTE);
                            }
                            out.push(ch);
                        }
                        out.push(QUOTE);
                    } else {
                        out.push_str(rest);
                    }
                }
                AffixToken::Percent => out.push(PERCENT),
                AffixToken::PerMill => out.push(PERMILLE),
                AffixToken::Negative => out.push(MINUS),
                AffixToken::Currency(count) => {
                    out.extend(std::iter::repeat_n(CURRENCY_PLACEHOLDER, usize::from(count)));
                }
            }
        }
        out
    }
}

fn is_special(ch: char) -> bool {
    matches!(ch, QUOTE | PERCENT | PERMILLE | MINUS | CURRENCY_PLACEHOLDER)
}

fn currency_count(text: &str, offset: usize, count: usize) -> Result<u8, AffixError> {
    match u8::try_from(count) {
        Ok(n) if n <= MAX_CURRENCY_COUNT => Ok(n),
        _ => Err(AffixError::parse(
            text,
            offset,
            format!("currency placeholder repeated {count} times, at most 3 allowed"),
        )),
    }
}

impl fmt::Display for AffixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl<'a> IntoIterator for &'a AffixPattern {
    type Item = AffixToken<'a>;
    type IntoIter = AffixPatternIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Replay cursor over an encoded pattern. A fresh cursor is needed to start
/// over.
pub struct AffixPatternIter<'a> {
    pattern: &'a AffixPattern,
    next_cell: usize,
    literal_offset: usize,
}

impl<'a> Iterator for AffixPatternIter<'a> {
    type Item = AffixToken<'a>;

    fn next(&mut self) -> Option<AffixToken<'a>> {
        let cell = *self.pattern.cells.get(self.next_cell)?;
        self.next_cell += 1;
        let token = match cell {
            Cell::Literal { len } => {
                let start = self.literal_offset;
                self.literal_offset += len;
                AffixToken::Literal(&self.pattern.literals[start..self.literal_offset])
            }
            Cell::Symbol { kind, count } => match kind {
                AffixTokenKind::Percent => AffixToken::Percent,
                AffixTokenKind::PerMill => AffixToken::PerMill,
                AffixTokenKind::Negative => AffixToken::Negative,
                AffixTokenKind::Currency => AffixToken::Currency(count),
                AffixTokenKind::Literal => unreachable!("literal stored as symbol cell"),
            },
        };
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.pattern.cells.len() - self.next_cell;
        (left, Some(left))
    }
}

impl ExactSizeIterator for AffixPatternIter<'_> {}
