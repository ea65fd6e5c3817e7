//! Symbolic tokenizer for affix pattern strings.
//!
//! Classifies each character of a user-syntax affix string into a symbol
//! type or a literal code point. The parser side compiles matchers from this
//! token stream directly rather than from an encoded [`AffixPattern`].
//!
//! [`AffixPattern`]: crate::pattern::AffixPattern

use std::str::Chars;

use crate::locale_data::{CURRENCY_PLACEHOLDER, IgnorableSet};

/// Longest currency placeholder run with its own token type.
pub const MAX_CURRENCY_RUN: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffixTokenType {
    MinusSign,
    PlusSign,
    Percent,
    Permille,
    /// A run of 1 to 5 currency placeholders.
    Currency(u8),
    /// A run of more than 5 currency placeholders.
    CurrencyOverflow,
    CodePoint(char),
}

impl AffixTokenType {
    pub fn is_symbol(self) -> bool {
        !matches!(self, AffixTokenType::CodePoint(_))
    }

    pub fn is_currency(self) -> bool {
        matches!(
            self,
            AffixTokenType::Currency(_) | AffixTokenType::CurrencyOverflow
        )
    }
}

pub struct AffixLexer<'a> {
    chars: Chars<'a>,
    current: Option<char>,
    offset: usize,
    quoted: bool,
}

impl<'a> AffixLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            chars,
            current,
            offset: 0,
            quoted: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current;
        if let Some(c) = ch {
            self.offset += c.len_utf8();
            self.current = self.chars.next();
        }
        ch
    }

    /// Byte offset just past the last consumed character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next token, or `None` at the end of the pattern. An
    /// unterminated quote extends to the end.
    pub fn next_token(&mut self) -> Option<AffixTokenType> {
        loop {
            let ch = self.advance()?;
            if ch == '\'' {
                if self.peek() == Some('\'') {
                    self.advance();
                    return Some(AffixTokenType::CodePoint('\''));
                }
                self.quoted = !self.quoted;
                continue;
            }
            if self.quoted {
                return Some(AffixTokenType::CodePoint(ch));
            }
            let token = match ch {
                '-' => AffixTokenType::MinusSign,
                '+' => AffixTokenType::PlusSign,
                '%' => AffixTokenType::Percent,
                '\u{2030}' => AffixTokenType::Permille,
                CURRENCY_PLACEHOLDER => {
                    let mut run = 1usize;
                    while self.peek() == Some(CURRENCY_PLACEHOLDER) {
                        self.advance();
                        run += 1;
                    }
                    match u8::try_from(run) {
                        Ok(n) if n <= MAX_CURRENCY_RUN => AffixTokenType::Currency(n),
                        _ => AffixTokenType::CurrencyOverflow,
                    }
                }
                other => AffixTokenType::CodePoint(other),
            };
            return Some(token);
        }
    }
}

impl Iterator for AffixLexer<'_> {
    type Item = AffixTokenType;

    fn next(&mut self) -> Option<AffixTokenType> {
        self.next_token()
    }
}

pub fn tokenize(pattern: &str) -> AffixLexer<'_> {
    AffixLexer::new(pattern)
}

/// True if every literal in `pattern` is ignorable, i.e. the pattern has no
/// required literal text.
pub fn contains_only_symbols_and_ignorables(pattern: &str, ignorables: IgnorableSet) -> bool {
    tokenize(pattern).all(|token| match token {
        AffixTokenType::CodePoint(cp) => ignorables.contains(cp),
        _ => true,
    })
}

pub fn contains_type(pattern: &str, ty: AffixTokenType) -> bool {
    tokenize(pattern).any(|token| token == ty)
}

pub fn has_currency_symbols(pattern: &str) -> bool {
    tokenize(pattern).any(AffixTokenType::is_currency)
}

/// Quotes `text` so that it tokenizes back to exactly its own characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut quoted = false;
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '-' | '+' | '%' | '\u{2030}' | CURRENCY_PLACEHOLDER => {
                if !quoted {
                    out.push('\'');
                    quoted = true;
                }
                out.push(ch);
            }
            _ => {
                if quoted {
                    out.push('\'');
                    quoted = false;
                }
                out.push(ch);
            }
        }
    }
    if quoted {
        out.push('\'');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use AffixTokenType::*;

    fn lex(src: &str) -> Vec<AffixTokenType> {
        tokenize(src).collect()
    }

    #[test]
    fn empty_pattern() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn symbols() {
        assert_eq!(
            lex("-+%\u{2030}"),
            vec![MinusSign, PlusSign, Percent, Permille]
        );
    }

    #[test]
    fn currency_runs() {
        assert_eq!(lex("\u{a4}"), vec![Currency(1)]);
        assert_eq!(lex("\u{a4}\u{a4}\u{a4}\u{a4}\u{a4}"), vec![Currency(5)]);
        assert_eq!(
            lex("\u{a4}\u{a4}\u{a4}\u{a4}\u{a4}\u{a4}x"),
            vec![CurrencyOverflow, CodePoint('x')]
        );
    }

    #[test]
    fn quoting() {
        assert_eq!(lex("'-'"), vec![CodePoint('-')]);
        assert_eq!(lex("a''b"), vec![CodePoint('a'), CodePoint('\''), CodePoint('b')]);
        assert_eq!(lex("'it''s'"), vec![
            CodePoint('i'),
            CodePoint('t'),
            CodePoint('\''),
            CodePoint('s'),
        ]);
        assert_eq!(lex("'%"), vec![CodePoint('%')]);
    }

    #[test]
    fn offset_tracks_bytes() {
        let mut lexer = AffixLexer::new("\u{a4}\u{a4}x");
        assert_eq!(lexer.next_token(), Some(Currency(2)));
        assert_eq!(lexer.offset(), 4);
    }

    #[test]
    fn predicates() {
        let set = IgnorableSet::Default;
        assert!(contains_only_symbols_and_ignorables("", set));
        assert!(contains_only_symbols_and_ignorables("-\u{a4} ", set));
        assert!(!contains_only_symbols_and_ignorables("PRE", set));
        assert!(!contains_only_symbols_and_ignorables("\u{a4} ", IgnorableSet::Strict));
        assert!(contains_type("a-", MinusSign));
        assert!(!contains_type("'-'", MinusSign));
        assert!(has_currency_symbols("x\u{a4}\u{a4}"));
        assert!(!has_currency_symbols("'\u{a4}'"));
    }

    #[test]
    fn escape_round_trips() {
        for text in ["", "abc", "-", "it's", "%'%", "'%", "a\u{a4}\u{a4}b", "''"] {
            let escaped = escape(text);
            let back: String = tokenize(&escaped)
                .map(|t| match t {
                    CodePoint(cp) => cp,
                    other => panic!("{text:?} escaped to symbol {other:?}"),
                })
                .collect();
            assert_eq!(back, text, "escaped form {escaped:?}");
        }
    }
}
