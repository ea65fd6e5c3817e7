//! Elementary parse matchers.
//!
//! Each matcher inspects the segment at its current offset. On success it
//! advances the segment and updates the result; on failure it leaves both
//! untouched. The returned flag tells the caller whether more input could
//! have let the matcher succeed (a partial match at the end of the input).

use fixed_decimal::Decimal;

use crate::currency::CurrencyAffixInfo;
use crate::locale_data::{CurrencyCode, IgnorableSet, SymbolTable};
use crate::plural::CATEGORY_ORDER;
use crate::segment::{ParsedNumber, ResultFlags, StringSegment};

const MINUS_SIGNS: &[char] = &[
    '-', '\u{207B}', '\u{208B}', '\u{2212}', '\u{2796}', '\u{FE63}', '\u{FF0D}',
];
const PLUS_SIGNS: &[char] = &[
    '+', '\u{207A}', '\u{208A}', '\u{2795}', '\u{FB29}', '\u{FE62}', '\u{FF0B}',
];
const PERCENT_SIGNS: &[char] = &['%', '\u{066A}', '\u{FE6A}', '\u{FF05}'];
const PERMILLE_SIGNS: &[char] = &['\u{2030}', '\u{0609}'];

pub trait NumberParseMatcher {
    /// Tries to match at the segment's offset. Returns whether more input
    /// might lead to a longer match.
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool;

    /// A cheap check that the matcher could match at all at this offset.
    fn smoke_test(&self, _segment: &StringSegment<'_>) -> bool {
        true
    }

    /// Flexible matchers may match repeatedly in a row.
    fn is_flexible(&self) -> bool {
        false
    }

    /// Runs once after the whole input has been consumed.
    fn post_process(&self, _result: &mut ParsedNumber) {}
}

struct SymbolMatch {
    matched: bool,
    maybe_more: bool,
}

/// Matches `symbol` in full, or else one char from `alternates`.
fn match_symbol(segment: &mut StringSegment<'_>, symbol: &str, alternates: &[char]) -> SymbolMatch {
    let mut overlap = 0;
    if !symbol.is_empty() {
        overlap = segment.common_prefix_len(symbol);
        if overlap == symbol.len() {
            segment.adjust_offset(symbol.len());
            return SymbolMatch {
                matched: true,
                maybe_more: false,
            };
        }
    }
    if let Some(ch) = segment.peek().filter(|ch| alternates.contains(ch)) {
        segment.adjust_offset(ch.len_utf8());
        return SymbolMatch {
            matched: true,
            maybe_more: false,
        };
    }
    SymbolMatch {
        matched: false,
        maybe_more: overlap == segment.len(),
    }
}

fn symbol_smoke_test(segment: &StringSegment<'_>, symbol: &str, alternates: &[char]) -> bool {
    match segment.peek() {
        Some(ch) => symbol.starts_with(ch) || alternates.contains(&ch),
        None => false,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinusSignMatcher {
    symbol: String,
    allow_trailing: bool,
}

impl MinusSignMatcher {
    pub fn new(symbols: &SymbolTable, allow_trailing: bool) -> Self {
        Self {
            symbol: symbols.minus_sign.clone(),
            allow_trailing,
        }
    }
}

impl NumberParseMatcher for MinusSignMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if !self.allow_trailing && result.seen_number() {
            return false;
        }
        let m = match_symbol(segment, &self.symbol, MINUS_SIGNS);
        if m.matched {
            result.flags |= ResultFlags::NEGATIVE;
            result.set_chars_consumed(segment);
        }
        m.maybe_more
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        symbol_smoke_test(segment, &self.symbol, MINUS_SIGNS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlusSignMatcher {
    symbol: String,
    allow_trailing: bool,
}

impl PlusSignMatcher {
    pub fn new(symbols: &SymbolTable, allow_trailing: bool) -> Self {
        Self {
            symbol: symbols.plus_sign.clone(),
            allow_trailing,
        }
    }
}

impl NumberParseMatcher for PlusSignMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if !self.allow_trailing && result.seen_number() {
            return false;
        }
        let m = match_symbol(segment, &self.symbol, PLUS_SIGNS);
        if m.matched {
            result.set_chars_consumed(segment);
        }
        m.maybe_more
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        symbol_smoke_test(segment, &self.symbol, PLUS_SIGNS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PercentMatcher {
    symbol: String,
}

impl PercentMatcher {
    pub fn new(symbols: &SymbolTable) -> Self {
        Self {
            symbol: symbols.percent.clone(),
        }
    }
}

impl NumberParseMatcher for PercentMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if result.flags.contains(ResultFlags::PERCENT) {
            return false;
        }
        let m = match_symbol(segment, &self.symbol, PERCENT_SIGNS);
        if m.matched {
            result.flags |= ResultFlags::PERCENT;
            result.set_chars_consumed(segment);
        }
        m.maybe_more
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        symbol_smoke_test(segment, &self.symbol, PERCENT_SIGNS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermilleMatcher {
    symbol: String,
}

impl PermilleMatcher {
    pub fn new(symbols: &SymbolTable) -> Self {
        Self {
            symbol: symbols.permille.clone(),
        }
    }
}

impl NumberParseMatcher for PermilleMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if result.flags.contains(ResultFlags::PERMILLE) {
            return false;
        }
        let m = match_symbol(segment, &self.symbol, PERMILLE_SIGNS);
        if m.matched {
            result.flags |= ResultFlags::PERMILLE;
            result.set_chars_consumed(segment);
        }
        m.maybe_more
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        symbol_smoke_test(segment, &self.symbol, PERMILLE_SIGNS)
    }
}

/// Matches any display form of one currency: symbol, ISO code (in any
/// ASCII case) or a long name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyMatcher {
    code: CurrencyCode,
    iso: String,
    /// Longest first, so that "US dollars" wins over "US dollar".
    names: Vec<String>,
}

impl CurrencyMatcher {
    pub fn new(info: &CurrencyAffixInfo) -> Self {
        let mut names = vec![info.symbol().to_string(), info.iso().to_string()];
        for category in CATEGORY_ORDER {
            let long = info.long().get(category);
            if !names.iter().any(|n| n == long) {
                names.push(long.to_string());
            }
        }
        names.retain(|n| !n.is_empty());
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names.dedup();
        Self {
            code: info.code().unwrap_or_else(CurrencyCode::no_currency),
            iso: info.iso().to_string(),
            names,
        }
    }
}

impl NumberParseMatcher for CurrencyMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if result.currency_code.is_some() {
            return false;
        }
        let mut maybe_more = false;
        for name in &self.names {
            let overlap = if *name == self.iso {
                segment.common_prefix_len_ignore_case(name)
            } else {
                segment.common_prefix_len(name)
            };
            if overlap == name.len() {
                segment.adjust_offset(overlap);
                result.currency_code = Some(self.code);
                result.set_chars_consumed(segment);
                return false;
            }
            maybe_more |= overlap == segment.len();
        }
        maybe_more
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        match segment.peek() {
            Some(ch) => self.names.iter().any(|n| {
                n.chars()
                    .next()
                    .is_some_and(|first| first.eq_ignore_ascii_case(&ch))
            }),
            None => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodePointMatcher {
    cp: char,
}

impl CodePointMatcher {
    pub fn new(cp: char) -> Self {
        Self { cp }
    }

    pub fn code_point(&self) -> char {
        self.cp
    }
}

impl NumberParseMatcher for CodePointMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if segment.starts_with(self.cp) {
            segment.adjust_offset_by_char();
            result.set_chars_consumed(segment);
        }
        false
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        segment.starts_with(self.cp)
    }
}

/// Skips one ignorable char. Ignorables never count as consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IgnorablesMatcher {
    set: IgnorableSet,
}

impl IgnorablesMatcher {
    pub fn new(set: IgnorableSet) -> Self {
        Self { set }
    }

    pub fn set(&self) -> IgnorableSet {
        self.set
    }
}

impl NumberParseMatcher for IgnorablesMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, _result: &mut ParsedNumber) -> bool {
        if segment.peek().is_some_and(|ch| self.set.contains(ch)) {
            segment.adjust_offset_by_char();
        }
        false
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        segment.peek().is_some_and(|ch| self.set.contains(ch))
    }

    fn is_flexible(&self) -> bool {
        true
    }
}

/// Matches a run of ASCII digits with at most one decimal separator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecimalMatcher {
    decimal_separator: char,
}

impl DecimalMatcher {
    pub fn new(symbols: &SymbolTable) -> Self {
        Self {
            decimal_separator: symbols.decimal_separator,
        }
    }
}

impl NumberParseMatcher for DecimalMatcher {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        if result.seen_number() {
            return false;
        }
        let rest = segment.rest();
        let mut digits = String::new();
        let mut end = 0;
        let mut seen_separator = false;
        let mut chars = rest.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                end = i + 1;
            } else if ch == self.decimal_separator
                && !seen_separator
                && chars.peek().is_some_and(|(_, next)| next.is_ascii_digit())
            {
                seen_separator = true;
                if digits.is_empty() {
                    digits.push('0');
                }
                digits.push('.');
            } else {
                break;
            }
        }
        if end == 0 {
            return false;
        }
        let Ok(quantity) = digits.parse::<Decimal>() else {
            return false;
        };
        segment.adjust_offset(end);
        result.quantity = Some(quantity);
        result.set_chars_consumed(segment);
        segment.is_empty()
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        segment
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == self.decimal_separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale_data::BuiltinCurrencyData;
    use icu::locale::Locale;
    use icu::plurals::PluralCategory;

    fn run(matcher: &dyn NumberParseMatcher, input: &str) -> (usize, ParsedNumber, bool) {
        let mut segment = StringSegment::new(input);
        let mut result = ParsedNumber::default();
        let more = matcher.match_segment(&mut segment, &mut result);
        (segment.offset(), result, more)
    }

    #[test]
    fn minus_sign_variants() {
        let en = SymbolTable::default();
        let m = MinusSignMatcher::new(&en, true);
        let (offset, result, _) = run(&m, "-5");
        assert_eq!(offset, 1);
        assert!(result.flags.contains(ResultFlags::NEGATIVE));
        assert_eq!(result.char_end, 1);
        let (offset, _, _) = run(&m, "\u{2212}5");
        assert_eq!(offset, 3);
        let (offset, result, _) = run(&m, "x");
        assert_eq!(offset, 0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn minus_sign_trailing_disabled() {
        let m = MinusSignMatcher::new(&SymbolTable::default(), false);
        let mut segment = StringSegment::new("-");
        let mut result = ParsedNumber {
            quantity: Some(Decimal::from(5i32)),
            ..Default::default()
        };
        m.match_segment(&mut segment, &mut result);
        assert_eq!(segment.offset(), 0);
    }

    #[test]
    fn multi_char_symbol_partial_match() {
        let he = SymbolTable::for_locale(&"he".parse().unwrap());
        let m = MinusSignMatcher::new(&he, true);
        let (offset, _, more) = run(&m, "\u{200E}");
        assert_eq!(offset, 0);
        assert!(more);
        let (offset, _, _) = run(&m, "\u{200E}-");
        assert_eq!(offset, 4);
    }

    #[test]
    fn percent_only_once() {
        let m = PercentMatcher::new(&SymbolTable::default());
        let mut segment = StringSegment::new("%%");
        let mut result = ParsedNumber::default();
        m.match_segment(&mut segment, &mut result);
        m.match_segment(&mut segment, &mut result);
        assert_eq!(segment.offset(), 1);
        assert!(result.flags.contains(ResultFlags::PERCENT));
        let p = PermilleMatcher::new(&SymbolTable::default());
        let (_, result, _) = run(&p, "\u{2030}");
        assert!(result.flags.contains(ResultFlags::PERMILLE));
    }

    #[test]
    fn currency_forms() {
        let en: Locale = "en".parse().unwrap();
        let info = CurrencyAffixInfo::resolve(
            Some(CurrencyCode::new("USD").unwrap()),
            &en,
            &[PluralCategory::One, PluralCategory::Other],
            &BuiltinCurrencyData,
        )
        .unwrap();
        let m = CurrencyMatcher::new(&info);
        for (input, len) in [("$1", 1), ("USD1", 3), ("usd1", 3), ("US dollars", 10), ("US dollar 1", 9)] {
            let (offset, result, _) = run(&m, input);
            assert_eq!(offset, len, "{input}");
            assert_eq!(result.currency_code.map(|c| c.to_string()), Some("USD".into()));
        }
        let (offset, _, more) = run(&m, "US");
        assert_eq!(offset, 0);
        assert!(more);
    }

    #[test]
    fn placeholder_currency_records_no_currency() {
        let m = CurrencyMatcher::new(&CurrencyAffixInfo::default());
        let (offset, result, _) = run(&m, "\u{a4}\u{a4}");
        assert_eq!(offset, 4);
        assert_eq!(result.currency_code, Some(CurrencyCode::no_currency()));
    }

    #[test]
    fn code_point_and_ignorables() {
        let m = CodePointMatcher::new('x');
        assert_eq!(run(&m, "xy").0, 1);
        assert_eq!(run(&m, "yx").0, 0);
        let ig = IgnorablesMatcher::new(IgnorableSet::Default);
        let (offset, result, _) = run(&ig, " 5");
        assert_eq!(offset, 1);
        assert_eq!(result.char_end, 0);
        assert!(ig.is_flexible());
    }

    #[test]
    fn decimal_digits() {
        let m = DecimalMatcher::new(&SymbolTable::default());
        let (offset, result, more) = run(&m, "12.50%");
        assert_eq!(offset, 5);
        assert_eq!(result.quantity.unwrap().to_string(), "12.50");
        assert!(!more);
        let (offset, result, _) = run(&m, "7.");
        assert_eq!(offset, 1);
        assert_eq!(result.quantity.unwrap().to_string(), "7");
        let (offset, result, _) = run(&m, ".5");
        assert_eq!(offset, 2);
        assert_eq!(result.quantity.unwrap().to_string(), "0.5");
        assert_eq!(run(&m, ".x").0, 0);
        let de = DecimalMatcher::new(&SymbolTable::for_locale(&"de".parse().unwrap()));
        assert_eq!(run(&de, "3,25").1.quantity.unwrap().to_string(), "3.25");
    }
}
