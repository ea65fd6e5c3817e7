use std::fmt;

/// Failure of a locale or currency data lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// The currency data provider does not know this ISO code.
    UnknownCurrency(String),
    /// The locale could not be resolved to any data.
    UnsupportedLocale(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCurrency(code) => write!(f, "no data for currency {code}"),
            Self::UnsupportedLocale(locale) => write!(f, "unsupported locale: {locale}"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Errors from compiling affix patterns or resolving their currency data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AffixError {
    /// The affix pattern text is malformed.
    PatternParse {
        pattern: String,
        offset: usize,
        message: String,
    },
    /// A currency or plural data lookup failed.
    Lookup(LookupError),
    /// A currency identifier is not a three-letter ISO code.
    InvalidCurrency(String),
}

impl AffixError {
    pub(crate) fn parse(pattern: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::PatternParse {
            pattern: pattern.to_string(),
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for AffixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternParse {
                pattern,
                offset,
                message,
            } => write!(f, "pattern \"{pattern}\" at {offset}: {message}"),
            Self::Lookup(e) => write!(f, "lookup failed: {e}"),
            Self::InvalidCurrency(code) => write!(f, "invalid currency code: {code}"),
        }
    }
}

impl std::error::Error for AffixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LookupError> for AffixError {
    fn from(e: LookupError) -> Self {
        AffixError::Lookup(e)
    }
}
