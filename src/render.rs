//! Rendering encoded affix patterns into styled text.

use std::ops::Range;

use fixed_decimal::Decimal;
use icu::plurals::PluralCategory;
use tracing::trace;

use crate::currency::{CurrencyAffixInfo, PluralText};
use crate::locale_data::SymbolTable;
use crate::pattern::{AffixPattern, AffixToken};
use crate::plural::{CATEGORY_COUNT, CATEGORY_ORDER, PluralCategorySource, category_index};

/// Field annotation of a rendered span, named like format-to-parts types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Literal,
    Percent,
    Permille,
    Sign,
    Currency,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Literal => "literal",
            Field::Percent => "percentSign",
            Field::Permille => "permilleSign",
            Field::Sign => "minusSign",
            Field::Currency => "currency",
        }
    }
}

/// Text with a field annotation for each appended span.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledString {
    text: String,
    spans: Vec<(Field, Range<usize>)>,
}

impl StyledString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: &str, field: Field) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        match self.spans.last_mut() {
            Some((last, range)) if *last == field && range.end == start => {
                range.end = self.text.len();
            }
            _ => self.spans.push((field, start..self.text.len())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Annotated spans in order; adjacent spans of one field are merged.
    pub fn parts(&self) -> impl Iterator<Item = (Field, &str)> {
        self.spans
            .iter()
            .map(|(field, range)| (*field, &self.text[range.clone()]))
    }
}

/// A rendered affix per plural category. The `other` variant always exists
/// and stands in for every category without one of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluralAffix {
    variants: [Option<StyledString>; CATEGORY_COUNT],
}

impl Default for PluralAffix {
    fn default() -> Self {
        let mut variants: [Option<StyledString>; CATEGORY_COUNT] = Default::default();
        variants[category_index(PluralCategory::Other)] = Some(StyledString::new());
        Self { variants }
    }
}

impl PluralAffix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the same text to every variant.
    pub fn append(&mut self, text: &str, field: Field) {
        for variant in self.variants.iter_mut().flatten() {
            variant.append(text, field);
        }
    }

    /// Appends category-dependent text. Categories that `text` distinguishes
    /// but this affix does not yet get their own variant, copied from `other`.
    pub fn append_plural(&mut self, text: &PluralText, field: Field) {
        let other = self.other().clone();
        for (category, _) in text.variants() {
            let slot = &mut self.variants[category_index(category)];
            if slot.is_none() {
                *slot = Some(other.clone());
            }
        }
        for (category, variant) in CATEGORY_ORDER.iter().zip(self.variants.iter_mut()) {
            if let Some(variant) = variant {
                variant.append(text.get(*category), field);
            }
        }
    }

    pub fn get(&self, category: PluralCategory) -> &StyledString {
        self.variants[category_index(category)]
            .as_ref()
            .unwrap_or_else(|| self.other())
    }

    pub fn other(&self) -> &StyledString {
        match &self.variants[category_index(PluralCategory::Other)] {
            Some(other) => other,
            None => unreachable!("plural affix without an other variant"),
        }
    }

    pub fn has_variant(&self, category: PluralCategory) -> bool {
        self.variants[category_index(category)].is_some()
    }

    /// The variant the locale's plural rules pick for `quantity`.
    pub fn select(&self, quantity: &Decimal, plurals: &impl PluralCategorySource) -> &StyledString {
        self.get(plurals.select(quantity))
    }

    /// Categories with their own variant, in CLDR order.
    pub fn categories(&self) -> impl Iterator<Item = PluralCategory> + '_ {
        CATEGORY_ORDER
            .iter()
            .zip(self.variants.iter())
            .filter(|(_, v)| v.is_some())
            .map(|(cat, _)| *cat)
    }
}

/// Renders encoded patterns with one locale's sign and symbol glyphs.
#[derive(Clone, Debug)]
pub struct AffixRenderer {
    percent: String,
    permille: String,
    negative: String,
}

impl Default for AffixRenderer {
    fn default() -> Self {
        Self::new(&SymbolTable::default())
    }
}

impl AffixRenderer {
    pub fn new(symbols: &SymbolTable) -> Self {
        Self {
            percent: symbols.percent.clone(),
            permille: symbols.permille.clone(),
            negative: symbols.minus_sign.clone(),
        }
    }

    /// Renders all plural variants of `pattern` in one walk.
    pub fn render(&self, pattern: &AffixPattern, currency: &CurrencyAffixInfo) -> PluralAffix {
        let mut out = PluralAffix::new();
        for token in pattern {
            match token {
                AffixToken::Currency(3) => out.append_plural(currency.long(), Field::Currency),
                other => {
                    let (text, field) = self.span(other, currency, PluralCategory::Other);
                    out.append(text, field);
                }
            }
        }
        trace!(
            pattern = %pattern,
            variants = out.categories().count(),
            "rendered plural affix"
        );
        out
    }

    /// Renders `pattern` for a single plural category.
    pub fn render_category(
        &self,
        pattern: &AffixPattern,
        currency: &CurrencyAffixInfo,
        category: PluralCategory,
    ) -> StyledString {
        let mut out = StyledString::new();
        for token in pattern {
            let (text, field) = self.span(token, currency, category);
            out.append(text, field);
        }
        out
    }

    fn span<'a>(
        &'a self,
        token: AffixToken<'a>,
        currency: &'a CurrencyAffixInfo,
        category: PluralCategory,
    ) -> (&'a str, Field) {
        match token {
            AffixToken::Literal(text) => (text, Field::Literal),
            AffixToken::Percent => (&self.percent, Field::Percent),
            AffixToken::PerMill => (&self.permille, Field::Permille),
            AffixToken::Negative => (&self.negative, Field::Sign),
            AffixToken::Currency(1) => (currency.symbol(), Field::Currency),
            AffixToken::Currency(2) => (currency.iso(), Field::Currency),
            AffixToken::Currency(3) => (currency.long().get(category), Field::Currency),
            AffixToken::Currency(n) => unreachable!("currency token of length {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale_data::{BuiltinCurrencyData, CurrencyCode};
    use crate::pattern::compile_pattern;
    use crate::plural::LocalePlurals;
    use icu::locale::Locale;

    fn usd_en() -> CurrencyAffixInfo {
        let en: Locale = "en".parse().unwrap();
        CurrencyAffixInfo::resolve(
            Some(CurrencyCode::new("USD").unwrap()),
            &en,
            &[PluralCategory::One, PluralCategory::Other],
            &BuiltinCurrencyData,
        )
        .unwrap()
    }

    #[test]
    fn percent_without_currency() {
        let pattern = compile_pattern("%").unwrap();
        let affix = AffixRenderer::default().render(&pattern, &CurrencyAffixInfo::default());
        for cat in CATEGORY_ORDER {
            let parts: Vec<_> = affix.get(cat).parts().collect();
            assert_eq!(parts, vec![(Field::Percent, "%")]);
        }
    }

    #[test]
    fn iso_code_ignores_category() {
        let pattern = compile_pattern("\u{a4}\u{a4}").unwrap();
        let affix = AffixRenderer::default().render(&pattern, &usd_en());
        assert!(!affix.has_variant(PluralCategory::One));
        for cat in CATEGORY_ORDER {
            let parts: Vec<_> = affix.get(cat).parts().collect();
            assert_eq!(parts, vec![(Field::Currency, "USD")]);
        }
    }

    #[test]
    fn long_name_varies_by_category() {
        let pattern = compile_pattern(" \u{a4}\u{a4}\u{a4}").unwrap();
        let affix = AffixRenderer::default().render(&pattern, &usd_en());
        assert_eq!(affix.get(PluralCategory::One).as_str(), " US dollar");
        assert_eq!(affix.get(PluralCategory::Other).as_str(), " US dollars");
        assert_eq!(affix.get(PluralCategory::Few).as_str(), " US dollars");
        assert_eq!(
            affix.categories().collect::<Vec<_>>(),
            vec![PluralCategory::One, PluralCategory::Other]
        );
    }

    #[test]
    fn select_by_quantity() {
        let pattern = compile_pattern(" \u{a4}\u{a4}\u{a4}").unwrap();
        let affix = AffixRenderer::default().render(&pattern, &usd_en());
        let plurals = LocalePlurals::new(&"en".parse().unwrap()).unwrap();
        let one: Decimal = "1".parse().unwrap();
        let many: Decimal = "12.5".parse().unwrap();
        assert_eq!(affix.select(&one, &plurals).as_str(), " US dollar");
        assert_eq!(affix.select(&many, &plurals).as_str(), " US dollars");
    }

    #[test]
    fn single_category_matches_full_render() {
        let pattern = compile_pattern("-\u{a4}\u{a4}\u{a4} '%'").unwrap();
        let renderer = AffixRenderer::default();
        let info = usd_en();
        let all = renderer.render(&pattern, &info);
        for cat in [PluralCategory::One, PluralCategory::Other] {
            assert_eq!(&renderer.render_category(&pattern, &info, cat), all.get(cat));
        }
    }

    #[test]
    fn locale_glyphs_and_fields() {
        let symbols = SymbolTable::for_locale(&"sv".parse().unwrap());
        let pattern = compile_pattern("-\u{a4} x\u{2030}").unwrap();
        let affix = AffixRenderer::new(&symbols).render(&pattern, &usd_en());
        let parts: Vec<_> = affix.other().parts().collect();
        assert_eq!(
            parts,
            vec![
                (Field::Sign, "\u{2212}"),
                (Field::Currency, "$"),
                (Field::Literal, " x"),
                (Field::Permille, "\u{2030}"),
            ]
        );
    }

    #[test]
    fn styled_string_merges_adjacent_fields() {
        let mut s = StyledString::new();
        s.append("a", Field::Literal);
        s.append("b", Field::Literal);
        s.append("", Field::Percent);
        s.append("%", Field::Percent);
        assert_eq!(
            s.parts().collect::<Vec<_>>(),
            vec![(Field::Literal, "ab"), (Field::Percent, "%")]
        );
        assert_eq!(Field::Percent.as_str(), "percentSign");
    }
}
