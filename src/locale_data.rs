//! Locale symbols and currency metadata.
//!
//! These tables stand in for full CLDR data: they cover the languages and
//! currencies exercised by the formatter and parser, and fall back to
//! English/Latin defaults for everything else.

use std::fmt;

use icu::locale::Locale;
use icu::plurals::PluralCategory;
use tinystr::TinyAsciiStr;

use crate::error::{AffixError, LookupError};

/// Placeholder glyph written in affix patterns where a currency goes.
pub const CURRENCY_PLACEHOLDER: char = '\u{00A4}';

pub(crate) fn language(locale: &Locale) -> &str {
    locale.id.language.as_str()
}

/// A three-letter ISO 4217 currency code, stored uppercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyCode(TinyAsciiStr<3>);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, AffixError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AffixError::InvalidCurrency(code.to_string()));
        }
        TinyAsciiStr::<3>::try_from_str(code)
            .map(|s| CurrencyCode(s.to_ascii_uppercase()))
            .map_err(|_| AffixError::InvalidCurrency(code.to_string()))
    }

    /// ISO 4217 "no currency", recorded when a currency placeholder is
    /// matched without any currency context.
    pub fn no_currency() -> Self {
        CurrencyCode(tinystr::tinystr!(3, "XXX"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characters that may appear between affix tokens without being required.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnorableSet {
    /// Bidi controls plus horizontal whitespace.
    Default,
    /// Bidi controls only.
    Strict,
}

impl IgnorableSet {
    pub fn contains(self, ch: char) -> bool {
        if is_bidi_control(ch) {
            return true;
        }
        match self {
            IgnorableSet::Strict => false,
            IgnorableSet::Default => matches!(
                ch,
                '\t' | ' '
                    | '\u{00A0}'
                    | '\u{1680}'
                    | '\u{2000}'..='\u{200A}'
                    | '\u{202F}'
                    | '\u{205F}'
                    | '\u{3000}'
            ),
        }
    }
}

fn is_bidi_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{061C}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
    )
}

/// Locale-specific glyphs used when rendering and recognizing affixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    pub percent: String,
    pub permille: String,
    pub minus_sign: String,
    pub plus_sign: String,
    pub decimal_separator: char,
    pub ignorables: IgnorableSet,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self {
            percent: "%".to_string(),
            permille: "\u{2030}".to_string(),
            minus_sign: "-".to_string(),
            plus_sign: "+".to_string(),
            decimal_separator: '.',
            ignorables: IgnorableSet::Default,
        }
    }
}

impl SymbolTable {
    pub fn for_locale(locale: &Locale) -> Self {
        let lang = language(locale);
        let minus_sign = match lang {
            "sv" | "fi" | "nb" | "nn" | "no" | "et" | "lt" | "sl" | "hr" | "eu" | "fo" | "se" => {
                "\u{2212}"
            }
            "he" => "\u{200E}-",
            "ar" => "\u{061C}-",
            "fa" => "\u{200E}\u{2212}",
            _ => "-",
        };
        let plus_sign = match lang {
            "he" => "\u{200E}+",
            "ar" => "\u{061C}+",
            "fa" => "\u{200E}+",
            _ => "+",
        };
        let percent = match lang {
            "ar" | "fa" => "\u{066A}",
            _ => "%",
        };
        let permille = match lang {
            "ar" | "fa" => "\u{0609}",
            _ => "\u{2030}",
        };
        let decimal_separator = match lang {
            "de" | "fr" | "es" | "pt" | "nl" | "it" | "ca" | "da" | "fi" | "nb" | "nn" | "no"
            | "sv" | "pl" | "cs" | "sk" | "hu" | "ro" | "bg" | "hr" | "sl" | "sr" | "tr"
            | "el" | "uk" | "ru" | "be" | "et" | "lv" | "lt" | "vi" | "id" => ',',
            _ => '.',
        };
        Self {
            percent: percent.to_string(),
            permille: permille.to_string(),
            minus_sign: minus_sign.to_string(),
            plus_sign: plus_sign.to_string(),
            decimal_separator,
            ignorables: IgnorableSet::Default,
        }
    }

    pub fn with_strict_ignorables(mut self) -> Self {
        self.ignorables = IgnorableSet::Strict;
        self
    }
}

/// Which rounding context currency precision is looked up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CurrencyUsage {
    #[default]
    Standard,
    Cash,
}

/// Currency metadata lookup.
pub trait CurrencyData {
    /// Short display symbol, e.g. `$` for USD in English.
    fn symbol(&self, code: CurrencyCode, locale: &Locale) -> Result<String, LookupError>;

    /// Long display name for one plural category. `Ok(None)` means the
    /// locale has no specific form for that category.
    fn plural_name(
        &self,
        code: CurrencyCode,
        locale: &Locale,
        category: PluralCategory,
    ) -> Result<Option<String>, LookupError>;

    fn fraction_digits(&self, code: CurrencyCode, usage: CurrencyUsage) -> Result<u8, LookupError>;

    /// Absolute rounding increment, such as 0.05; 0 means none.
    fn rounding_increment(
        &self,
        code: CurrencyCode,
        usage: CurrencyUsage,
    ) -> Result<f64, LookupError>;
}

const KNOWN_CURRENCIES: &[&str] = &[
    "AUD", "BHD", "BRL", "CAD", "CHF", "CLP", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF",
    "ILS", "INR", "ISK", "JOD", "JPY", "KRW", "KWD", "MXN", "NOK", "NZD", "PLN", "RUB", "SEK",
    "SGD", "THB", "TRY", "TWD", "USD", "XXX", "ZAR",
];

/// Built-in currency tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCurrencyData;

impl BuiltinCurrencyData {
    fn check(code: CurrencyCode) -> Result<&'static str, LookupError> {
        KNOWN_CURRENCIES
            .iter()
            .copied()
            .find(|known| *known == code.as_str())
            .ok_or_else(|| LookupError::UnknownCurrency(code.to_string()))
    }
}

impl CurrencyData for BuiltinCurrencyData {
    fn symbol(&self, code: CurrencyCode, locale: &Locale) -> Result<String, LookupError> {
        let code = Self::check(code)?;
        let lang = language(locale);
        let sym = match code {
            "USD" => {
                if matches!(lang, "en" | "ja" | "de" | "fr") {
                    "$"
                } else {
                    "US$"
                }
            }
            "EUR" => "\u{20AC}",
            "GBP" => "\u{00A3}",
            "JPY" | "CNY" => "\u{00A5}",
            "KRW" => "\u{20A9}",
            "INR" => "\u{20B9}",
            "RUB" => "\u{20BD}",
            "BRL" => "R$",
            "CAD" | "AUD" | "NZD" | "HKD" | "SGD" | "MXN" | "CLP" => {
                return Ok(format!("{}$", &code[..2]));
            }
            "SEK" | "NOK" | "DKK" | "ISK" | "CZK" => "kr",
            "PLN" => "z\u{0142}",
            "THB" => "\u{0E3F}",
            "TRY" => "\u{20BA}",
            "ILS" => "\u{20AA}",
            "ZAR" => "R",
            "TWD" => "NT$",
            "XXX" => "\u{00A4}",
            other => other,
        };
        Ok(sym.to_string())
    }

    fn plural_name(
        &self,
        code: CurrencyCode,
        locale: &Locale,
        category: PluralCategory,
    ) -> Result<Option<String>, LookupError> {
        let code = Self::check(code)?;
        let forms: Option<(&str, &str)> = match (language(locale), code) {
            ("de", "USD") => Some(("US-Dollar", "US-Dollar")),
            ("de", "EUR") => Some(("Euro", "Euro")),
            ("de", "CHF") => Some(("Schweizer Franken", "Schweizer Franken")),
            ("fr", "USD") => Some(("dollar des \u{00C9}tats-Unis", "dollars des \u{00C9}tats-Unis")),
            ("fr", "EUR") => Some(("euro", "euros")),
            (_, "USD") => Some(("US dollar", "US dollars")),
            (_, "EUR") => Some(("euro", "euros")),
            (_, "GBP") => Some(("British pound", "British pounds")),
            (_, "JPY") => Some(("Japanese yen", "Japanese yen")),
            (_, "CNY") => Some(("Chinese yuan", "Chinese yuan")),
            (_, "KRW") => Some(("South Korean won", "South Korean won")),
            (_, "INR") => Some(("Indian rupee", "Indian rupees")),
            (_, "CAD") => Some(("Canadian dollar", "Canadian dollars")),
            (_, "AUD") => Some(("Australian dollar", "Australian dollars")),
            (_, "CHF") => Some(("Swiss franc", "Swiss francs")),
            (_, "BRL") => Some(("Brazilian real", "Brazilian reals")),
            (_, "XXX") => Some(("(unknown unit of currency)", "(unknown currency)")),
            _ => None,
        };
        Ok(match (forms, category) {
            (Some((one, _)), PluralCategory::One) => Some(one.to_string()),
            (Some((_, other)), PluralCategory::Other) => Some(other.to_string()),
            (None, PluralCategory::Other) => Some(code.to_string()),
            _ => None,
        })
    }

    fn fraction_digits(&self, code: CurrencyCode, usage: CurrencyUsage) -> Result<u8, LookupError> {
        let code = Self::check(code)?;
        let digits = match (code, usage) {
            ("BHD" | "JOD" | "KWD", _) => 3,
            ("CLP" | "ISK" | "JPY" | "KRW", _) => 0,
            ("CZK" | "HUF" | "NOK" | "SEK" | "TWD", CurrencyUsage::Cash) => 0,
            _ => 2,
        };
        Ok(digits)
    }

    fn rounding_increment(
        &self,
        code: CurrencyCode,
        usage: CurrencyUsage,
    ) -> Result<f64, LookupError> {
        let code = Self::check(code)?;
        let increment = match (code, usage) {
            ("CHF" | "CAD", CurrencyUsage::Cash) => 0.05,
            ("DKK", CurrencyUsage::Cash) => 0.5,
            _ => 0.0,
        };
        Ok(increment)
    }
}
