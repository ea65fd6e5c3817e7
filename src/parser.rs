//! Greedy number parser built from an affix pattern provider.

use fixed_decimal::Decimal;
use tracing::debug;

use crate::affixes::AffixMatcherSet;
use crate::currency::CurrencyAffixInfo;
use crate::locale_data::SymbolTable;
use crate::matchers::{
    CurrencyMatcher, DecimalMatcher, IgnorablesMatcher, MinusSignMatcher, NumberParseMatcher,
    PercentMatcher, PermilleMatcher, PlusSignMatcher,
};
use crate::pool::AffixTokenMatcherPool;
use crate::provider::AffixPatternProvider;
use crate::segment::{ParseFlags, ParsedNumber, ResultFlags, StringSegment};
use crate::tokenizer::AffixTokenType;

type BoxedMatcher = Box<dyn NumberParseMatcher + Send + Sync>;

pub struct NumberParser {
    pool: AffixTokenMatcherPool,
    affixes: Option<AffixMatcherSet>,
    /// Currency, percent and sign matchers used outside of affixes.
    generic: Vec<BoxedMatcher>,
    ignorables: IgnorablesMatcher,
    decimal: DecimalMatcher,
    flags: ParseFlags,
}

impl NumberParser {
    pub fn new(
        provider: &(impl AffixPatternProvider + ?Sized),
        symbols: &SymbolTable,
        currency: CurrencyAffixInfo,
        flags: ParseFlags,
    ) -> Self {
        let flags = flags.normalized();
        let strict = flags.contains(ParseFlags::STRICT);
        let symbols = if strict {
            symbols.clone().with_strict_ignorables()
        } else {
            symbols.clone()
        };

        let mut pool = AffixTokenMatcherPool::new(symbols.clone(), currency);
        let affixes = AffixMatcherSet::build(provider, &mut pool, flags);

        let mut generic: Vec<BoxedMatcher> = Vec::new();
        if provider.has_currency_sign() {
            generic.push(Box::new(CurrencyMatcher::new(pool.currency_info())));
        }
        if !strict {
            if provider.contains_symbol_type(AffixTokenType::Percent) {
                generic.push(Box::new(PercentMatcher::new(&symbols)));
            }
            if provider.contains_symbol_type(AffixTokenType::Permille) {
                generic.push(Box::new(PermilleMatcher::new(&symbols)));
            }
            generic.push(Box::new(PlusSignMatcher::new(&symbols, false)));
            generic.push(Box::new(MinusSignMatcher::new(&symbols, false)));
        }

        debug!(
            affix_matchers = affixes.as_ref().map_or(0, AffixMatcherSet::len),
            generic_matchers = generic.len(),
            ?flags,
            "created number parser"
        );
        Self {
            ignorables: IgnorablesMatcher::new(symbols.ignorables),
            decimal: DecimalMatcher::new(&symbols),
            pool,
            affixes,
            generic,
            flags,
        }
    }

    pub fn flags(&self) -> ParseFlags {
        self.flags
    }

    pub fn affix_matchers(&self) -> Option<&AffixMatcherSet> {
        self.affixes.as_ref()
    }

    /// Parses as much of `input` as possible. Check
    /// [`ParsedNumber::success`] and `char_end` on the result.
    pub fn parse(&self, input: &str) -> ParsedNumber {
        let bound: Vec<_> = self
            .affixes
            .as_ref()
            .map(|set| set.bind(&self.pool).iter().collect())
            .unwrap_or_default();
        let mut matchers: Vec<&dyn NumberParseMatcher> = Vec::with_capacity(bound.len() + self.generic.len() + 2);
        matchers.extend(bound.iter().map(|m| m as &dyn NumberParseMatcher));
        matchers.extend(self.generic.iter().map(|m| m.as_ref() as &dyn NumberParseMatcher));
        matchers.push(&self.ignorables);
        matchers.push(&self.decimal);

        let mut segment = StringSegment::new(input);
        let mut result = ParsedNumber::default();
        parse_greedy(&matchers, &mut segment, &mut result);
        for matcher in &matchers {
            matcher.post_process(&mut result);
        }
        self.validate(&mut result);
        result
    }

    /// The signed value of `input` if all of it parsed.
    pub fn parse_value(&self, input: &str) -> Option<Decimal> {
        let result = self.parse(input);
        if result.success() && result.char_end == input.len() {
            result.signed_quantity()
        } else {
            None
        }
    }

    fn validate(&self, result: &mut ParsedNumber) {
        if !result.seen_number() {
            result.flags |= ResultFlags::FAIL;
        }
        if self.flags.contains(ParseFlags::STRICT)
            && (result.prefix.is_none() || result.suffix.is_none())
        {
            result.flags |= ResultFlags::FAIL;
        }
    }
}

/// Runs the first matcher that consumes input, then starts over from the
/// top, until no matcher consumes anything.
fn parse_greedy(
    matchers: &[&dyn NumberParseMatcher],
    segment: &mut StringSegment<'_>,
    result: &mut ParsedNumber,
) {
    let mut i = 0;
    while i < matchers.len() && !segment.is_empty() {
        let matcher = matchers[i];
        if !matcher.smoke_test(segment) {
            i += 1;
            continue;
        }
        let initial_offset = segment.offset();
        matcher.match_segment(segment, result);
        i = if segment.offset() != initial_offset { 0 } else { i + 1 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale_data::{BuiltinCurrencyData, CurrencyCode};
    use crate::provider::AffixPatterns;
    use icu::locale::Locale;
    use icu::plurals::PluralCategory;

    fn parser(pattern: &str, flags: ParseFlags) -> NumberParser {
        let patterns = AffixPatterns::from_decimal_pattern(pattern).unwrap();
        NumberParser::new(
            &patterns,
            &SymbolTable::default(),
            CurrencyAffixInfo::default(),
            flags,
        )
    }

    fn value(parser: &NumberParser, input: &str) -> Option<String> {
        parser.parse_value(input).map(|d| d.to_string())
    }

    #[test]
    fn plain_decimal_with_generic_signs() {
        let p = parser("#,##0.##", ParseFlags::empty());
        assert!(p.affix_matchers().is_none());
        assert_eq!(value(&p, "12.5").as_deref(), Some("12.5"));
        assert_eq!(value(&p, "-12.5").as_deref(), Some("-12.5"));
        assert_eq!(value(&p, "+3").as_deref(), Some("3"));
        assert_eq!(value(&p, "abc"), None);
    }

    #[test]
    fn percent_scales_value() {
        let p = parser("0%", ParseFlags::empty());
        assert_eq!(value(&p, "45%").as_deref(), Some("0.45"));
        assert_eq!(value(&p, "45").as_deref(), Some("45"));
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
        let patterns = AffixPatterns::from_decimal_pattern("\u{a4}#,##0.00").unwrap();
        let p = NumberParser::new(&patterns, &SymbolTable::default(), info, ParseFlags::empty());
        for input in ["$12.50", "USD 12.50", "usd12.50"] {
            let result = p.parse(input);
            assert!(result.success(), "{input}");
            assert_eq!(result.char_end, input.len(), "{input}");
            assert_eq!(result.currency_code.map(|c| c.to_string()).as_deref(), Some("USD"));
        }
    }

    #[test]
    fn literal_prefix_and_implicit_negative() {
        let p = parser("'PRE'0", ParseFlags::empty());
        let result = p.parse("PRE5");
        assert_eq!(result.prefix.as_deref(), Some("'PRE'"));
        assert_eq!(value(&p, "PRE5").as_deref(), Some("5"));
        assert_eq!(value(&p, "-PRE5").as_deref(), Some("-5"));
        assert_eq!(value(&p, "- PRE5").as_deref(), Some("-5"));
    }

    #[test]
    fn explicit_negative_subpattern() {
        let p = parser("#0;(#0)", ParseFlags::empty());
        assert_eq!(value(&p, "(42)").as_deref(), Some("-42"));
        assert_eq!(value(&p, "42").as_deref(), Some("42"));
    }

    #[test]
    fn longer_negative_prefix_is_reachable() {
        let p = parser("'A'0'LONGSUFFIX';'AB'0", ParseFlags::empty());
        assert_eq!(value(&p, "AB5").as_deref(), Some("-5"));
        assert_eq!(value(&p, "A5LONGSUFFIX").as_deref(), Some("5"));
    }

    #[test]
    fn strict_requires_full_pair() {
        let p = parser("'PRE'0'SUF'", ParseFlags::STRICT);
        assert!(p.parse("PRE5SUF").success());
        assert!(!p.parse("PRE5").success());
        assert!(!p.parse("5SUF").success());
        assert!(!p.parse("5").success());
    }

    #[test]
    fn strict_empty_affixes() {
        let p = parser("0", ParseFlags::STRICT);
        assert_eq!(value(&p, "5").as_deref(), Some("5"));
        assert_eq!(value(&p, "-5").as_deref(), Some("-5"));
        assert_eq!(value(&p, "+5"), None);
    }

    #[test]
    fn lenient_accepts_unpaired_affix() {
        let p = parser("'<'0'>'", ParseFlags::INCLUDE_UNPAIRED_AFFIXES);
        assert_eq!(value(&p, "<5").as_deref(), Some("5"));
        assert_eq!(value(&p, "5>").as_deref(), Some("5"));
        assert_eq!(value(&p, "<5>").as_deref(), Some("5"));
    }
}
