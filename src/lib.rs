//! Affix patterns for locale-aware number formatting and parsing.
//!
//! The formatting side compiles affix strings such as `"¤ "` or `"'%'"`
//! into an [`AffixPattern`] and renders it with locale symbols and
//! currency names. The parsing side compiles the same strings into
//! matchers and derives the prefix/suffix pairings a parser has to try.
#![forbid(unsafe_code)]

pub mod affixes;
pub mod compiler;
pub mod currency;
pub mod error;
pub mod locale_data;
pub mod matchers;
pub mod parser;
pub mod pattern;
pub mod plural;
pub mod pool;
pub mod provider;
pub mod render;
pub mod segment;
pub mod tokenizer;

pub use affixes::{AffixMatcher, AffixMatcherSet};
pub use compiler::AffixPatternMatcher;
pub use currency::{CurrencyAffixInfo, CurrencyPrecision, PluralText};
pub use error::{AffixError, LookupError};
pub use locale_data::{
    BuiltinCurrencyData, CurrencyCode, CurrencyData, CurrencyUsage, IgnorableSet, SymbolTable,
};
pub use parser::NumberParser;
pub use pattern::{AffixPattern, AffixToken, AffixTokenKind, compile_pattern};
pub use plural::{LocalePlurals, PluralCategorySource};
pub use pool::AffixTokenMatcherPool;
pub use provider::{AffixPatternProvider, AffixPatterns, SignDisplay, Signum};
pub use render::{AffixRenderer, Field, PluralAffix, StyledString};
pub use segment::{ParseFlags, ParsedNumber, ResultFlags};
