//! Currency variant resolution.
//!
//! A currency placeholder in an affix pattern can be rendered three ways:
//! as the short symbol (`¤`), the ISO code (`¤¤`) or the long name (`¤¤¤`),
//! which varies by plural category. [`CurrencyAffixInfo`] resolves all three
//! once per currency and locale; it is shared by the positive and negative
//! prefix and suffix of a pattern.

use fixed_decimal::{Decimal, FloatPrecision};
use icu::locale::Locale;
use icu::plurals::PluralCategory;
use tracing::debug;

use crate::error::AffixError;
use crate::locale_data::{CURRENCY_PLACEHOLDER, CurrencyCode, CurrencyData, CurrencyUsage};
use crate::plural::{CATEGORY_COUNT, CATEGORY_ORDER, category_index};

/// One string per plural category, with a mandatory `other` form that
/// every missing category falls back to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluralText {
    forms: [Option<String>; CATEGORY_COUNT],
}

impl PluralText {
    pub fn new(other: impl Into<String>) -> Self {
        let mut forms: [Option<String>; CATEGORY_COUNT] = Default::default();
        forms[category_index(PluralCategory::Other)] = Some(other.into());
        Self { forms }
    }

    pub fn set(&mut self, category: PluralCategory, text: impl Into<String>) {
        self.forms[category_index(category)] = Some(text.into());
    }

    pub fn get(&self, category: PluralCategory) -> &str {
        self.forms[category_index(category)]
            .as_deref()
            .unwrap_or_else(|| self.other())
    }

    pub fn other(&self) -> &str {
        self.forms[category_index(PluralCategory::Other)]
            .as_deref()
            .unwrap_or_default()
    }

    pub fn has_variant(&self, category: PluralCategory) -> bool {
        self.forms[category_index(category)].is_some()
    }

    /// Categories with an explicit form, in CLDR order.
    pub fn variants(&self) -> impl Iterator<Item = (PluralCategory, &str)> {
        CATEGORY_ORDER
            .iter()
            .zip(self.forms.iter())
            .filter_map(|(cat, form)| form.as_deref().map(|f| (*cat, f)))
    }
}

/// The three renderable forms of one currency in one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyAffixInfo {
    code: Option<CurrencyCode>,
    symbol: String,
    iso: String,
    long: PluralText,
}

impl Default for CurrencyAffixInfo {
    fn default() -> Self {
        Self {
            code: None,
            symbol: placeholder(1),
            iso: placeholder(2),
            long: PluralText::new(placeholder(3)),
        }
    }
}

fn placeholder(count: usize) -> String {
    std::iter::repeat_n(CURRENCY_PLACEHOLDER, count).collect()
}

impl CurrencyAffixInfo {
    /// Resolves the forms of `currency` for `locale`. With no currency the
    /// result holds placeholder glyphs so patterns can still be compiled.
    ///
    /// A category whose long name is missing is left out and falls back to
    /// `other`; lookup errors propagate.
    pub fn resolve(
        currency: Option<CurrencyCode>,
        locale: &Locale,
        categories: &[PluralCategory],
        data: &impl CurrencyData,
    ) -> Result<Self, AffixError> {
        let Some(code) = currency else {
            return Ok(Self::default());
        };
        let symbol = data.symbol(code, locale)?;
        let iso = code.as_str().to_string();
        let mut long = PluralText::new(
            data.plural_name(code, locale, PluralCategory::Other)?
                .unwrap_or_else(|| iso.clone()),
        );
        for &category in categories {
            if let Some(name) = data.plural_name(code, locale, category)? {
                long.set(category, name);
            }
        }
        debug!(
            currency = %code,
            %locale,
            symbol = %symbol,
            categories = categories.len(),
            "resolved currency affix info"
        );
        Ok(Self {
            code: Some(code),
            symbol,
            iso,
            long,
        })
    }

    /// Whether this is the placeholder set used without a currency.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn code(&self) -> Option<CurrencyCode> {
        self.code
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn iso(&self) -> &str {
        &self.iso
    }

    pub fn long(&self) -> &PluralText {
        &self.long
    }
}

/// Default fraction digits and rounding increment for a currency.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrencyPrecision {
    pub min_fraction_digits: u8,
    pub max_fraction_digits: u8,
    pub rounding_increment: Option<Decimal>,
}

impl CurrencyPrecision {
    pub fn for_currency(
        code: CurrencyCode,
        usage: CurrencyUsage,
        data: &impl CurrencyData,
    ) -> Result<Self, AffixError> {
        let digits = data.fraction_digits(code, usage)?;
        let increment = data.rounding_increment(code, usage)?;
        let rounding_increment = if increment == 0.0 {
            None
        } else {
            // Binary noise is rounded off at six fraction digits.
            Decimal::try_from_f64(increment, FloatPrecision::RoundTrip)
                .ok()
                .map(|mut d| {
                    d.round(-6);
                    d.absolute.trim_end();
                    d
                })
        };
        Ok(Self {
            min_fraction_digits: digits,
            max_fraction_digits: digits,
            rounding_increment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use crate::locale_data::BuiltinCurrencyData;

    fn en() -> Locale {
        "en".parse().unwrap()
    }

    #[test]
    fn no_currency_yields_placeholders() {
        let info = CurrencyAffixInfo::resolve(None, &en(), &[], &BuiltinCurrencyData).unwrap();
        assert!(info.is_default());
        assert_eq!(info.symbol(), "\u{a4}");
        assert_eq!(info.iso(), "\u{a4}\u{a4}");
        assert_eq!(info.long().get(PluralCategory::One), "\u{a4}\u{a4}\u{a4}");
        assert_eq!(info.code(), None);
    }

    #[test]
    fn resolves_usd_in_english() {
        let usd = CurrencyCode::new("USD").unwrap();
        let info = CurrencyAffixInfo::resolve(
            Some(usd),
            &en(),
            &[PluralCategory::One, PluralCategory::Other],
            &BuiltinCurrencyData,
        )
        .unwrap();
        assert!(!info.is_default());
        assert_eq!(info.symbol(), "$");
        assert_eq!(info.iso(), "USD");
        assert_eq!(info.long().get(PluralCategory::One), "US dollar");
        assert_eq!(info.long().get(PluralCategory::Other), "US dollars");
    }

    #[test]
    fn missing_category_falls_back_to_other() {
        let usd = CurrencyCode::new("USD").unwrap();
        let info = CurrencyAffixInfo::resolve(
            Some(usd),
            &"ru".parse().unwrap(),
            &[PluralCategory::One, PluralCategory::Few, PluralCategory::Many],
            &BuiltinCurrencyData,
        )
        .unwrap();
        assert!(!info.long().has_variant(PluralCategory::Few));
        assert_eq!(info.long().get(PluralCategory::Few), "US dollars");
    }

    #[test]
    fn unknown_currency_is_a_lookup_error() {
        let code = CurrencyCode::new("QQQ").unwrap();
        let err = CurrencyAffixInfo::resolve(Some(code), &en(), &[], &BuiltinCurrencyData)
            .unwrap_err();
        assert_eq!(
            err,
            AffixError::Lookup(LookupError::UnknownCurrency("QQQ".to_string()))
        );
    }

    #[test]
    fn plural_text_variants_in_order() {
        let mut text = PluralText::new("items");
        text.set(PluralCategory::One, "item");
        let variants: Vec<_> = text.variants().collect();
        assert_eq!(
            variants,
            vec![(PluralCategory::One, "item"), (PluralCategory::Other, "items")]
        );
    }

    #[test]
    fn cash_precision() {
        let chf = CurrencyCode::new("CHF").unwrap();
        let cash = CurrencyPrecision::for_currency(chf, CurrencyUsage::Cash, &BuiltinCurrencyData)
            .unwrap();
        assert_eq!(cash.max_fraction_digits, 2);
        assert_eq!(
            cash.rounding_increment.map(|d| d.to_string()),
            Some("0.05".to_string())
        );
        let standard =
            CurrencyPrecision::for_currency(chf, CurrencyUsage::Standard, &BuiltinCurrencyData)
                .unwrap();
        assert_eq!(standard.rounding_increment, None);

        let jpy = CurrencyCode::new("JPY").unwrap();
        let yen = CurrencyPrecision::for_currency(jpy, CurrencyUsage::Standard, &BuiltinCurrencyData)
            .unwrap();
        assert_eq!((yen.min_fraction_digits, yen.max_fraction_digits), (0, 0));
    }
}
