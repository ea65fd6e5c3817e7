//! Positive/negative affix strings of a number pattern, and the synthesis of
//! the effective affix for a given sign.

use crate::error::AffixError;
use crate::tokenizer::{AffixTokenType, contains_type, has_currency_symbols};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffixSlot {
    PositivePrefix,
    PositiveSuffix,
    NegativePrefix,
    NegativeSuffix,
}

impl AffixSlot {
    pub fn new(negative: bool, prefix: bool) -> Self {
        match (negative, prefix) {
            (false, true) => AffixSlot::PositivePrefix,
            (false, false) => AffixSlot::PositiveSuffix,
            (true, true) => AffixSlot::NegativePrefix,
            (true, false) => AffixSlot::NegativeSuffix,
        }
    }
}

/// Source of the user-syntax affix strings of a number pattern.
pub trait AffixPatternProvider {
    /// The affix string in `slot`. Negative slots are empty when there is
    /// no negative subpattern.
    fn affix(&self, slot: AffixSlot) -> &str;

    fn has_negative_subpattern(&self) -> bool;

    fn contains_symbol_type(&self, ty: AffixTokenType) -> bool {
        [
            AffixSlot::PositivePrefix,
            AffixSlot::PositiveSuffix,
            AffixSlot::NegativePrefix,
            AffixSlot::NegativeSuffix,
        ]
        .into_iter()
        .any(|slot| contains_type(self.affix(slot), ty))
    }

    fn positive_has_plus_sign(&self) -> bool {
        contains_type(self.affix(AffixSlot::PositivePrefix), AffixTokenType::PlusSign)
            || contains_type(self.affix(AffixSlot::PositiveSuffix), AffixTokenType::PlusSign)
    }

    fn negative_has_minus_sign(&self) -> bool {
        self.has_negative_subpattern()
            && (contains_type(self.affix(AffixSlot::NegativePrefix), AffixTokenType::MinusSign)
                || contains_type(self.affix(AffixSlot::NegativeSuffix), AffixTokenType::MinusSign))
    }

    fn has_currency_sign(&self) -> bool {
        has_currency_symbols(self.affix(AffixSlot::PositivePrefix))
            || has_currency_symbols(self.affix(AffixSlot::PositiveSuffix))
            || has_currency_symbols(self.affix(AffixSlot::NegativePrefix))
            || has_currency_symbols(self.affix(AffixSlot::NegativeSuffix))
    }
}

/// Affix strings held directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffixPatterns {
    pub positive_prefix: String,
    pub positive_suffix: String,
    pub negative: Option<(String, String)>,
}

impl AffixPatterns {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            positive_prefix: prefix.into(),
            positive_suffix: suffix.into(),
            negative: None,
        }
    }

    pub fn with_negative(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.negative = Some((prefix.into(), suffix.into()));
        self
    }

    /// Splits a decimal pattern such as `"¤#,##0.00;(¤#,##0.00)"` into its
    /// affixes. Quoted text never counts as part of the number.
    pub fn from_decimal_pattern(pattern: &str) -> Result<Self, AffixError> {
        let (positive, negative) = split_subpatterns(pattern);
        let (prefix, suffix) = split_subpattern(pattern, positive, 0)?;
        let mut patterns = Self::new(prefix, suffix);
        if let Some(negative) = negative {
            let offset = positive.len() + 1;
            let (prefix, suffix) = split_subpattern(pattern, negative, offset)?;
            patterns = patterns.with_negative(prefix, suffix);
        }
        Ok(patterns)
    }
}

impl AffixPatternProvider for AffixPatterns {
    fn affix(&self, slot: AffixSlot) -> &str {
        match (slot, &self.negative) {
            (AffixSlot::PositivePrefix, _) => &self.positive_prefix,
            (AffixSlot::PositiveSuffix, _) => &self.positive_suffix,
            (AffixSlot::NegativePrefix, Some((prefix, _))) => prefix,
            (AffixSlot::NegativeSuffix, Some((_, suffix))) => suffix,
            (_, None) => "",
        }
    }

    fn has_negative_subpattern(&self) -> bool {
        self.negative.is_some()
    }
}

fn split_subpatterns(pattern: &str) -> (&str, Option<&str>) {
    let mut quoted = false;
    for (i, ch) in pattern.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            ';' if !quoted => return (&pattern[..i], Some(&pattern[i + 1..])),
            _ => {}
        }
    }
    (pattern, None)
}

fn is_number_char(ch: char) -> bool {
    matches!(ch, '#' | '0'..='9' | '@' | ',' | '.')
}

fn split_subpattern(
    pattern: &str,
    sub: &str,
    base_offset: usize,
) -> Result<(String, String), AffixError> {
    let mut quoted = false;
    let mut number: Option<(usize, usize)> = None;
    for (i, ch) in sub.char_indices() {
        match number {
            None => {
                if ch == '\'' {
                    quoted = !quoted;
                } else if !quoted && is_number_char(ch) {
                    number = Some((i, i + ch.len_utf8()));
                }
            }
            Some((start, _)) => {
                if is_number_char(ch) {
                    number = Some((start, i + ch.len_utf8()));
                } else {
                    break;
                }
            }
        }
    }
    match number {
        Some((start, end)) => Ok((sub[..start].to_string(), sub[end..].to_string())),
        None => Err(AffixError::parse(
            pattern,
            base_offset,
            "subpattern has no digits",
        )),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signum {
    Negative,
    Zero,
    Positive,
}

/// When a sign is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SignDisplay {
    /// Minus for negatives only.
    #[default]
    Auto,
    /// Minus for negatives, plus for everything else.
    Always,
    Never,
    /// Like `Always`, but zero gets no sign.
    ExceptZero,
}

/// Builds the effective user-syntax affix for one sign.
///
/// The negative subpattern is used for negatives when present; otherwise a
/// `-` is put in front of the positive prefix unless signs are never shown.
/// When a plus is forced, `-` symbols become `+`. Quoted text is copied
/// unchanged.
pub fn sign_affix_pattern(
    provider: &(impl AffixPatternProvider + ?Sized),
    is_prefix: bool,
    signum: Signum,
    display: SignDisplay,
    per_mille_replaces_percent: bool,
) -> String {
    let plus_replaces_minus = signum != Signum::Negative
        && (display == SignDisplay::Always
            || (signum == Signum::Positive && display == SignDisplay::ExceptZero))
        && !provider.positive_has_plus_sign();

    let use_negative = provider.has_negative_subpattern()
        && (signum == Signum::Negative
            || (provider.negative_has_minus_sign() && plus_replaces_minus));

    let prepend_sign = if !is_prefix || use_negative {
        false
    } else if signum == Signum::Negative {
        display != SignDisplay::Never
    } else {
        plus_replaces_minus
    };

    let source = provider.affix(AffixSlot::new(use_negative, is_prefix));
    let mut out = String::with_capacity(source.len() + 1);
    if prepend_sign {
        out.push(if plus_replaces_minus { '+' } else { '-' });
    }
    let mut quoted = false;
    for ch in source.chars() {
        let ch = match ch {
            '\'' => {
                quoted = !quoted;
                ch
            }
            '-' if !quoted && plus_replaces_minus => '+',
            '%' if !quoted && per_mille_replaces_percent => '\u{2030}',
            other => other,
        };
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(p: &AffixPatterns, signum: Signum, display: SignDisplay) -> String {
        sign_affix_pattern(p, true, signum, display, false)
    }

    fn suffix(p: &AffixPatterns, signum: Signum, display: SignDisplay) -> String {
        sign_affix_pattern(p, false, signum, display, false)
    }

    #[test]
    fn implicit_negative_prepends_minus() {
        let p = AffixPatterns::new("\u{a4}", "");
        assert_eq!(prefix(&p, Signum::Positive, SignDisplay::Auto), "\u{a4}");
        assert_eq!(prefix(&p, Signum::Negative, SignDisplay::Auto), "-\u{a4}");
        assert_eq!(suffix(&p, Signum::Negative, SignDisplay::Auto), "");
        assert_eq!(prefix(&p, Signum::Negative, SignDisplay::Never), "\u{a4}");
    }

    #[test]
    fn forced_plus() {
        let p = AffixPatterns::new("", "%");
        assert_eq!(prefix(&p, Signum::Positive, SignDisplay::Always), "+");
        assert_eq!(prefix(&p, Signum::Zero, SignDisplay::Always), "+");
        assert_eq!(prefix(&p, Signum::Zero, SignDisplay::ExceptZero), "");
        assert_eq!(prefix(&p, Signum::Negative, SignDisplay::Always), "-");
    }

    #[test]
    fn explicit_negative_subpattern() {
        let p = AffixPatterns::new("\u{a4}", "").with_negative("(\u{a4}", ")");
        assert_eq!(prefix(&p, Signum::Negative, SignDisplay::Auto), "(\u{a4}");
        assert_eq!(suffix(&p, Signum::Negative, SignDisplay::Auto), ")");
        assert_eq!(prefix(&p, Signum::Positive, SignDisplay::Always), "+\u{a4}");
    }

    #[test]
    fn negative_minus_becomes_plus_when_forced() {
        let p = AffixPatterns::new("", "").with_negative("", "- '-'");
        assert_eq!(suffix(&p, Signum::Positive, SignDisplay::Always), "+ '-'");
    }

    #[test]
    fn permille_replacement() {
        let p = AffixPatterns::new("'%'", "%");
        assert_eq!(
            sign_affix_pattern(&p, false, Signum::Positive, SignDisplay::Auto, true),
            "\u{2030}"
        );
        assert_eq!(
            sign_affix_pattern(&p, true, Signum::Positive, SignDisplay::Auto, true),
            "'%'"
        );
    }

    #[test]
    fn decimal_pattern_split() {
        let p = AffixPatterns::from_decimal_pattern("\u{a4}#,##0.00;(\u{a4}#,##0.00)").unwrap();
        assert_eq!(p.affix(AffixSlot::PositivePrefix), "\u{a4}");
        assert_eq!(p.affix(AffixSlot::PositiveSuffix), "");
        assert_eq!(p.affix(AffixSlot::NegativePrefix), "(\u{a4}");
        assert_eq!(p.affix(AffixSlot::NegativeSuffix), ")");
        assert!(p.has_currency_sign());

        let p = AffixPatterns::from_decimal_pattern("'#'0 'pts; ok'").unwrap();
        assert_eq!(p.affix(AffixSlot::PositivePrefix), "'#'");
        assert_eq!(p.affix(AffixSlot::PositiveSuffix), " 'pts; ok'");
        assert!(!p.has_negative_subpattern());
        assert_eq!(p.affix(AffixSlot::NegativePrefix), "");

        assert!(matches!(
            AffixPatterns::from_decimal_pattern("abc"),
            Err(AffixError::PatternParse { .. })
        ));
    }

    #[test]
    fn symbol_queries() {
        let p = AffixPatterns::new("+", "").with_negative("-", "");
        assert!(p.positive_has_plus_sign());
        assert!(p.negative_has_minus_sign());
        assert!(p.contains_symbol_type(AffixTokenType::MinusSign));
        assert!(!p.contains_symbol_type(AffixTokenType::Percent));
        assert!(!p.has_currency_sign());
    }
}
