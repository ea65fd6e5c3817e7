use fixed_decimal::Decimal;
use icu::locale::Locale;
use icu::plurals::{
    PluralCategory, PluralOperands, PluralRuleType, PluralRules, PluralRulesOptions,
    PluralRulesPreferences,
};

use crate::error::LookupError;

/// CLDR order: zero, one, two, few, many, other.
pub const CATEGORY_ORDER: [PluralCategory; 6] = [
    PluralCategory::Zero,
    PluralCategory::One,
    PluralCategory::Two,
    PluralCategory::Few,
    PluralCategory::Many,
    PluralCategory::Other,
];

pub(crate) const CATEGORY_COUNT: usize = CATEGORY_ORDER.len();

pub(crate) fn category_index(cat: PluralCategory) -> usize {
    match cat {
        PluralCategory::Zero => 0,
        PluralCategory::One => 1,
        PluralCategory::Two => 2,
        PluralCategory::Few => 3,
        PluralCategory::Many => 4,
        PluralCategory::Other => 5,
    }
}

pub fn plural_category_to_str(cat: PluralCategory) -> &'static str {
    match cat {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}

pub fn plural_category_from_str(s: &str) -> Option<PluralCategory> {
    CATEGORY_ORDER
        .iter()
        .copied()
        .find(|c| plural_category_to_str(*c) == s)
}

/// Grammatical-number category resolution for one locale.
pub trait PluralCategorySource {
    /// Categories the locale distinguishes, in CLDR order.
    fn categories(&self) -> Vec<PluralCategory>;

    fn select(&self, quantity: &Decimal) -> PluralCategory;
}

/// Cardinal plural rules backed by ICU compiled data.
pub struct LocalePlurals {
    rules: PluralRules,
}

impl LocalePlurals {
    pub fn new(locale: &Locale) -> Result<Self, LookupError> {
        let prefs = PluralRulesPreferences::from(locale);
        let mut opts = PluralRulesOptions::default();
        opts.rule_type = Some(PluralRuleType::Cardinal);
        let rules = PluralRules::try_new(prefs, opts)
            .map_err(|_| LookupError::UnsupportedLocale(locale.to_string()))?;
        Ok(Self { rules })
    }
}

impl PluralCategorySource for LocalePlurals {
    fn categories(&self) -> Vec<PluralCategory> {
        let available: Vec<PluralCategory> = self.rules.categories().collect();
        CATEGORY_ORDER
            .iter()
            .copied()
            .filter(|c| available.contains(c))
            .collect()
    }

    fn select(&self, quantity: &Decimal) -> PluralCategory {
        self.rules.category_for(PluralOperands::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip() {
        for cat in CATEGORY_ORDER {
            assert_eq!(plural_category_from_str(plural_category_to_str(cat)), Some(cat));
        }
        assert_eq!(plural_category_from_str("several"), None);
    }

    #[test]
    fn english_categories() {
        let plurals = LocalePlurals::new(&"en".parse().unwrap()).unwrap();
        assert_eq!(
            plurals.categories(),
            vec![PluralCategory::One, PluralCategory::Other]
        );
        let one: Decimal = "1".parse().unwrap();
        let two: Decimal = "2".parse().unwrap();
        let one_point_five: Decimal = "1.5".parse().unwrap();
        assert_eq!(plurals.select(&one), PluralCategory::One);
        assert_eq!(plurals.select(&two), PluralCategory::Other);
        assert_eq!(plurals.select(&one_point_five), PluralCategory::Other);
    }

    #[test]
    fn russian_has_few_and_many() {
        let plurals = LocalePlurals::new(&"ru".parse().unwrap()).unwrap();
        let cats = plurals.categories();
        assert!(cats.contains(&PluralCategory::Few));
        assert!(cats.contains(&PluralCategory::Many));
        let three: Decimal = "3".parse().unwrap();
        assert_eq!(plurals.select(&three), PluralCategory::Few);
    }
}
