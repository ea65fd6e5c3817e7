//! Parse-time cursor and result accumulator.

use fixed_decimal::{Decimal, Sign};

use crate::locale_data::CurrencyCode;

bitflags::bitflags! {
    /// What a parse recorded about the number besides its digits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResultFlags: u8 {
        const NEGATIVE = 1 << 0;
        const PERCENT  = 1 << 1;
        const PERMILLE = 1 << 2;
        /// Set by validators when the parse must be rejected.
        const FAIL     = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Parser configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParseFlags: u16 {
        /// Affixes must match exactly; no ignorables between tokens.
        const EXACT_AFFIX              = 1 << 0;
        /// Always build affix matchers, even for purely symbolic affixes.
        const USE_FULL_AFFIXES         = 1 << 1;
        /// Also accept a prefix without its suffix and vice versa.
        const INCLUDE_UNPAIRED_AFFIXES = 1 << 2;
        /// Accept a plus sign where the pattern shows a minus.
        const PLUS_SIGN_ALLOWED        = 1 << 3;
        /// Require a complete affix pair. Implies full and exact affixes.
        const STRICT                   = 1 << 4;
    }
}

impl ParseFlags {
    /// Expands `STRICT` into the flags it implies.
    pub fn normalized(self) -> Self {
        if self.contains(ParseFlags::STRICT) {
            self | ParseFlags::USE_FULL_AFFIXES | ParseFlags::EXACT_AFFIX
        } else {
            self
        }
    }
}

/// A cursor over the input text. Offsets are byte offsets on char
/// boundaries.
#[derive(Clone, Debug)]
pub struct StringSegment<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> StringSegment<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        debug_assert!(self.input.is_char_boundary(offset));
        self.offset = offset;
    }

    pub fn adjust_offset(&mut self, delta: usize) {
        self.set_offset(self.offset + delta);
    }

    /// Remaining input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Remaining length in bytes.
    pub fn len(&self) -> usize {
        self.input.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn adjust_offset_by_char(&mut self) {
        if let Some(ch) = self.peek() {
            self.offset += ch.len_utf8();
        }
    }

    pub fn starts_with(&self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    /// Byte length of the longest common prefix of the remaining input and
    /// `text`, on char boundaries.
    pub fn common_prefix_len(&self, text: &str) -> usize {
        self.rest()
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum()
    }

    /// Like [`common_prefix_len`](Self::common_prefix_len), ignoring ASCII case.
    pub fn common_prefix_len_ignore_case(&self, text: &str) -> usize {
        self.rest()
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .map(|(a, _)| a.len_utf8())
            .sum()
    }
}

/// Mutable state of one parse call.
///
/// `prefix` and `suffix` hold the pattern text of the affix that matched.
/// `None` means no affix was recorded; `Some("")` means an affix matcher
/// accepted an absent affix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedNumber {
    pub quantity: Option<Decimal>,
    pub flags: ResultFlags,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub currency_code: Option<CurrencyCode>,
    /// Byte offset just past the last char that counts as consumed.
    pub char_end: usize,
}

impl ParsedNumber {
    pub fn seen_number(&self) -> bool {
        self.quantity.is_some()
    }

    pub fn set_chars_consumed(&mut self, segment: &StringSegment<'_>) {
        self.char_end = segment.offset();
    }

    pub fn success(&self) -> bool {
        self.char_end > 0 && self.seen_number() && !self.flags.contains(ResultFlags::FAIL)
    }

    /// The quantity with the sign and percent/permille scaling applied.
    pub fn signed_quantity(&self) -> Option<Decimal> {
        let mut value = self.quantity.clone()?;
        if self.flags.contains(ResultFlags::PERCENT) {
            value.absolute.multiply_pow10(-2);
        }
        if self.flags.contains(ResultFlags::PERMILLE) {
            value.absolute.multiply_pow10(-3);
        }
        if self.flags.contains(ResultFlags::NEGATIVE) {
            value.sign = Sign::Negative;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_navigation() {
        let mut seg = StringSegment::new("\u{a4}12");
        assert_eq!(seg.peek(), Some('\u{a4}'));
        seg.adjust_offset_by_char();
        assert_eq!(seg.offset(), 2);
        assert_eq!(seg.rest(), "12");
        assert_eq!(seg.len(), 2);
        seg.adjust_offset(2);
        assert!(seg.is_empty());
        assert_eq!(seg.peek(), None);
    }

    #[test]
    fn common_prefix() {
        let seg = StringSegment::new("US dollars");
        assert_eq!(seg.common_prefix_len("US dollar"), 9);
        assert_eq!(seg.common_prefix_len("USD"), 2);
        assert_eq!(seg.common_prefix_len_ignore_case("us d"), 4);
        assert_eq!(StringSegment::new("\u{e9}t\u{e9}").common_prefix_len("\u{e9}x"), 2);
    }

    #[test]
    fn signed_quantity_applies_flags() {
        let mut result = ParsedNumber {
            quantity: Some("12.5".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(result.signed_quantity().unwrap().to_string(), "12.5");
        result.flags |= ResultFlags::NEGATIVE | ResultFlags::PERCENT;
        assert_eq!(result.signed_quantity().unwrap().to_string(), "-0.125");
    }

    #[test]
    fn success_requires_number() {
        let mut result = ParsedNumber {
            char_end: 1,
            ..Default::default()
        };
        assert!(!result.success());
        result.quantity = Some(Decimal::from(1i32));
        assert!(result.success());
        result.flags |= ResultFlags::FAIL;
        assert!(!result.success());
    }
}
