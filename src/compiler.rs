//! Compiles a user-syntax affix string into a composite matcher.

use tracing::trace;

use crate::pool::{AffixTokenMatcherPool, MatcherHandle};
use crate::segment::{ParseFlags, ParsedNumber, StringSegment};
use crate::tokenizer::{AffixTokenType, tokenize};

/// An ordered series of pool matchers that must all succeed in turn.
///
/// Two compiled affixes are equal when they were compiled from the same
/// pattern text.
#[derive(Clone, Debug)]
pub struct AffixPatternMatcher {
    matchers: Vec<MatcherHandle>,
    pattern: String,
}

impl PartialEq for AffixPatternMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for AffixPatternMatcher {}

impl AffixPatternMatcher {
    /// Returns `None` for an empty pattern, which means "no affix" rather
    /// than an affix that matches nothing.
    pub fn from_affix_pattern(
        pattern: &str,
        pool: &mut AffixTokenMatcherPool,
        flags: ParseFlags,
    ) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        let ignorables = (!flags.contains(ParseFlags::EXACT_AFFIX)).then(|| pool.ignorable_set());
        let mut matchers = Vec::new();
        let mut last: Option<AffixTokenType> = None;

        for token in tokenize(pattern) {
            if let Some(set) = ignorables {
                let last_was_ignorable =
                    matches!(last, Some(AffixTokenType::CodePoint(cp)) if set.contains(cp));
                if !matchers.is_empty() && !last_was_ignorable {
                    matchers.push(pool.ignorables());
                }
            }
            match token {
                AffixTokenType::MinusSign => matchers.push(pool.minus_sign()),
                AffixTokenType::PlusSign => matchers.push(pool.plus_sign()),
                AffixTokenType::Percent => matchers.push(pool.percent()),
                AffixTokenType::Permille => matchers.push(pool.permille()),
                AffixTokenType::Currency(_) | AffixTokenType::CurrencyOverflow => {
                    matchers.push(pool.currency())
                }
                AffixTokenType::CodePoint(cp) => {
                    if !ignorables.is_some_and(|set| set.contains(cp)) {
                        matchers.push(pool.next_code_point(cp));
                    }
                }
            }
            last = Some(token);
        }

        trace!(pattern, matchers = matchers.len(), "compiled affix matcher");
        Some(Self {
            matchers,
            pattern: pattern.to_string(),
        })
    }

    /// The affix text this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handles(&self) -> &[MatcherHandle] {
        &self.matchers
    }

    /// Runs the series. On failure the segment and result are restored and
    /// the return value says whether more input might have helped.
    pub fn match_segment(
        &self,
        pool: &AffixTokenMatcherPool,
        segment: &mut StringSegment<'_>,
        result: &mut ParsedNumber,
    ) -> bool {
        let backup = result.clone();
        let initial_offset = segment.offset();
        let mut maybe_more = true;
        let mut i = 0;
        while i < self.matchers.len() {
            let Some(matcher) = pool.get(self.matchers[i]) else {
                debug_assert!(false, "affix matcher compiled against another pool");
                segment.set_offset(initial_offset);
                *result = backup;
                return false;
            };
            let matcher_offset = segment.offset();
            maybe_more = if segment.is_empty() {
                true
            } else {
                matcher.match_segment(segment, result)
            };
            let success = segment.offset() != matcher_offset;
            let flexible = matcher.is_flexible();
            if success && flexible {
                // Flexible matchers run again until they stop consuming.
            } else if success {
                i += 1;
                // Trailing weak chars are left for the next matcher.
                if i < self.matchers.len()
                    && segment.offset() != result.char_end
                    && result.char_end > matcher_offset
                {
                    segment.set_offset(result.char_end);
                }
            } else if flexible {
                i += 1;
            } else {
                segment.set_offset(initial_offset);
                *result = backup;
                return maybe_more;
            }
        }
        maybe_more
    }

    /// A series never starts with a flexible matcher, so the first one
    /// decides.
    pub fn smoke_test(&self, pool: &AffixTokenMatcherPool, segment: &StringSegment<'_>) -> bool {
        self.matchers
            .first()
            .and_then(|&handle| pool.get(handle))
            .is_some_and(|m| m.smoke_test(segment))
    }

    pub fn post_process(&self, pool: &AffixTokenMatcherPool, result: &mut ParsedNumber) {
        for &handle in &self.matchers {
            if let Some(matcher) = pool.get(handle) {
                matcher.post_process(result);
            }
        }
    }
}
