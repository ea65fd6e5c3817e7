//! Prefix/suffix pairings used while parsing, and the builder that derives
//! the minimal set of them from a number pattern.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::compiler::AffixPatternMatcher;
use crate::matchers::NumberParseMatcher;
use crate::pool::AffixTokenMatcherPool;
use crate::provider::{AffixPatternProvider, AffixSlot, SignDisplay, Signum, sign_affix_pattern};
use crate::segment::{ParseFlags, ParsedNumber, ResultFlags, StringSegment};
use crate::tokenizer::{
    AffixTokenType, contains_only_symbols_and_ignorables, contains_type, tokenize,
};

/// Index of a compiled affix inside its [`AffixMatcherSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternId(usize);

/// What an [`AffixMatcher`] needs to run: its compiled affixes and the pool
/// their elementary matchers live in.
pub trait AffixPatternSource {
    fn affix_pattern(&self, id: PatternId) -> &AffixPatternMatcher;
    fn pool(&self) -> &AffixTokenMatcherPool;
}

/// One prefix/suffix pairing. An absent side means the pairing has no
/// affix there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffixMatcher {
    prefix: Option<PatternId>,
    suffix: Option<PatternId>,
    flags: ResultFlags,
}

impl AffixMatcher {
    pub fn prefix(&self) -> Option<PatternId> {
        self.prefix
    }

    pub fn suffix(&self) -> Option<PatternId> {
        self.suffix
    }

    pub fn flags(&self) -> ResultFlags {
        self.flags
    }

    /// Matches the prefix before a number has been seen and the suffix
    /// after.
    pub fn match_segment(
        &self,
        source: &impl AffixPatternSource,
        segment: &mut StringSegment<'_>,
        result: &mut ParsedNumber,
    ) -> bool {
        if !result.seen_number() {
            let Some(prefix) = self.prefix.map(|id| source.affix_pattern(id)) else {
                return false;
            };
            if result.prefix.is_some() {
                return false;
            }
            let initial_offset = segment.offset();
            let maybe_more = prefix.match_segment(source.pool(), segment, result);
            if segment.offset() != initial_offset {
                result.prefix = Some(prefix.pattern().to_string());
            }
            maybe_more
        } else {
            let Some(suffix) = self.suffix.map(|id| source.affix_pattern(id)) else {
                return false;
            };
            if result.suffix.is_some() || !matched(source, self.prefix, result.prefix.as_deref()) {
                return false;
            }
            let initial_offset = segment.offset();
            let maybe_more = suffix.match_segment(source.pool(), segment, result);
            if segment.offset() != initial_offset {
                result.suffix = Some(suffix.pattern().to_string());
            }
            maybe_more
        }
    }

    pub fn smoke_test(&self, source: &impl AffixPatternSource, segment: &StringSegment<'_>) -> bool {
        [self.prefix, self.suffix]
            .into_iter()
            .flatten()
            .any(|id| source.affix_pattern(id).smoke_test(source.pool(), segment))
    }

    /// Whether the recorded prefix and suffix are exactly this pairing.
    pub fn is_fully_matched(&self, source: &impl AffixPatternSource, result: &ParsedNumber) -> bool {
        matched(source, self.prefix, result.prefix.as_deref())
            && matched(source, self.suffix, result.suffix.as_deref())
    }

    /// Claims the result if this pairing is the one that was matched:
    /// applies its flags and marks both sides as present.
    pub fn post_process(&self, source: &impl AffixPatternSource, result: &mut ParsedNumber) {
        if !self.is_fully_matched(source, result) {
            return;
        }
        result.prefix.get_or_insert_with(String::new);
        result.suffix.get_or_insert_with(String::new);
        result.flags |= self.flags;
        for id in [self.prefix, self.suffix].into_iter().flatten() {
            source.affix_pattern(id).post_process(source.pool(), result);
        }
    }
}

/// An absent affix matches only an unrecorded side; a present one matches
/// only its own pattern text.
fn matched(source: &impl AffixPatternSource, affix: Option<PatternId>, recorded: Option<&str>) -> bool {
    match (affix, recorded) {
        (None, None) => true,
        (Some(id), Some(text)) => source.affix_pattern(id).pattern() == text,
        _ => false,
    }
}

/// The affix pairings of one number pattern.
#[derive(Clone, Debug, Default)]
pub struct AffixMatcherSet {
    patterns: Vec<AffixPatternMatcher>,
    matchers: Vec<AffixMatcher>,
}

impl AffixMatcherSet {
    /// Derives the pairings for `provider`. Returns `None` when the affixes
    /// hold nothing the generic sign, percent and currency matchers would
    /// not already handle.
    ///
    /// Pairings are ordered by descending prefix length, then descending
    /// suffix length. A prefix is claimed by the first pairing that matches
    /// it, so the longest prefix has to be tried first. Equal lengths keep
    /// the positive pairing first.
    pub fn build(
        provider: &(impl AffixPatternProvider + ?Sized),
        pool: &mut AffixTokenMatcherPool,
        flags: ParseFlags,
    ) -> Option<Self> {
        let flags = flags.normalized();
        if !is_interesting(provider, pool, flags) {
            debug!("affixes are purely symbolic; no affix matchers built");
            return None;
        }

        let display = if flags.contains(ParseFlags::PLUS_SIGN_ALLOWED) {
            SignDisplay::Always
        } else {
            SignDisplay::Auto
        };
        let include_unpaired = flags.contains(ParseFlags::INCLUDE_UNPAIRED_AFFIXES);

        let mut set = Self::default();
        let mut ids: FxHashMap<String, PatternId> = FxHashMap::default();
        let mut positive: Option<(Option<PatternId>, Option<PatternId>)> = None;

        for signum in [Signum::Positive, Signum::Zero, Signum::Negative] {
            let prefix = set.intern(
                &sign_affix_pattern(provider, true, signum, display, false),
                pool,
                flags,
                &mut ids,
            );
            let suffix = set.intern(
                &sign_affix_pattern(provider, false, signum, display, false),
                pool,
                flags,
                &mut ids,
            );

            let Some((pos_prefix, pos_suffix)) = positive else {
                positive = Some((prefix, suffix));
                set.push_pairing(prefix, suffix, ResultFlags::empty(), None, include_unpaired);
                continue;
            };
            if prefix == pos_prefix && suffix == pos_suffix {
                debug!(?signum, "affix pairing identical to positive; skipped");
                continue;
            }
            let pair_flags = if signum == Signum::Negative {
                ResultFlags::NEGATIVE
            } else {
                ResultFlags::empty()
            };
            set.push_pairing(prefix, suffix, pair_flags, positive, include_unpaired);
        }

        set.sort_matchers();
        debug!(
            patterns = set.patterns.len(),
            matchers = set.matchers.len(),
            "built affix matcher set"
        );
        Some(set)
    }

    fn intern(
        &mut self,
        pattern: &str,
        pool: &mut AffixTokenMatcherPool,
        flags: ParseFlags,
        ids: &mut FxHashMap<String, PatternId>,
    ) -> Option<PatternId> {
        if let Some(&id) = ids.get(pattern) {
            return Some(id);
        }
        let matcher = AffixPatternMatcher::from_affix_pattern(pattern, pool, flags)?;
        let id = PatternId(self.patterns.len());
        self.patterns.push(matcher);
        ids.insert(pattern.to_string(), id);
        Some(id)
    }

    /// Adds a pairing and, when unpaired affixes are accepted, its
    /// one-sided forms. A one-sided form equal to the positive side is
    /// already covered by the positive pairing.
    fn push_pairing(
        &mut self,
        prefix: Option<PatternId>,
        suffix: Option<PatternId>,
        flags: ResultFlags,
        positive: Option<(Option<PatternId>, Option<PatternId>)>,
        include_unpaired: bool,
    ) {
        self.matchers.push(AffixMatcher {
            prefix,
            suffix,
            flags,
        });
        if !include_unpaired || prefix.is_none() || suffix.is_none() {
            return;
        }
        let (prefix_only, suffix_only) = match positive {
            Some((pos_prefix, pos_suffix)) => (pos_prefix != prefix, pos_suffix != suffix),
            None => (true, true),
        };
        if prefix_only {
            self.matchers.push(AffixMatcher {
                prefix,
                suffix: None,
                flags,
            });
        }
        if suffix_only {
            self.matchers.push(AffixMatcher {
                prefix: None,
                suffix,
                flags,
            });
        }
    }

    /// Length in matched tokens, so quoting does not count.
    fn token_len(&self, id: Option<PatternId>) -> usize {
        id.map_or(0, |id| tokenize(self.patterns[id.0].pattern()).count())
    }

    fn sort_matchers(&mut self) {
        let mut keyed: Vec<((usize, usize), AffixMatcher)> = self
            .matchers
            .iter()
            .map(|m| ((self.token_len(m.prefix), self.token_len(m.suffix)), *m))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        self.matchers = keyed.into_iter().map(|(_, m)| m).collect();
    }

    pub fn matchers(&self) -> &[AffixMatcher] {
        &self.matchers
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Pattern text of a compiled affix.
    pub fn pattern_text(&self, id: PatternId) -> &str {
        self.patterns[id.0].pattern()
    }

    /// Pairs the set with the pool it was built against.
    pub fn bind<'a>(&'a self, pool: &'a AffixTokenMatcherPool) -> BoundAffixMatchers<'a> {
        BoundAffixMatchers { set: self, pool }
    }
}

/// The fast path applies when full affixes are not required and every affix
/// is made only of symbols and ignorables. A sign in a suffix still needs
/// affix matchers, since generic signs are only accepted in front.
fn is_interesting(
    provider: &(impl AffixPatternProvider + ?Sized),
    pool: &AffixTokenMatcherPool,
    flags: ParseFlags,
) -> bool {
    if flags.intersects(ParseFlags::USE_FULL_AFFIXES | ParseFlags::EXACT_AFFIX) {
        return true;
    }
    let set = pool.ignorable_set();
    let symbolic = [
        AffixSlot::PositivePrefix,
        AffixSlot::PositiveSuffix,
        AffixSlot::NegativePrefix,
        AffixSlot::NegativeSuffix,
    ]
    .into_iter()
    .all(|slot| contains_only_symbols_and_ignorables(provider.affix(slot), set));
    let signed_suffix = [AffixSlot::PositiveSuffix, AffixSlot::NegativeSuffix]
        .into_iter()
        .any(|slot| {
            let suffix = provider.affix(slot);
            contains_type(suffix, AffixTokenType::PlusSign)
                || contains_type(suffix, AffixTokenType::MinusSign)
        });
    !symbolic || signed_suffix
}

/// An [`AffixMatcherSet`] together with its pool.
#[derive(Clone, Copy)]
pub struct BoundAffixMatchers<'a> {
    set: &'a AffixMatcherSet,
    pool: &'a AffixTokenMatcherPool,
}

impl AffixPatternSource for BoundAffixMatchers<'_> {
    fn affix_pattern(&self, id: PatternId) -> &AffixPatternMatcher {
        &self.set.patterns[id.0]
    }

    fn pool(&self) -> &AffixTokenMatcherPool {
        self.pool
    }
}

impl<'a> BoundAffixMatchers<'a> {
    pub fn iter(self) -> impl Iterator<Item = BoundAffixMatcher<'a>> + 'a {
        let source = self;
        self.set
            .matchers
            .iter()
            .map(move |matcher| BoundAffixMatcher { source, matcher })
    }
}

/// One pairing usable as a [`NumberParseMatcher`].
#[derive(Clone, Copy)]
pub struct BoundAffixMatcher<'a> {
    source: BoundAffixMatchers<'a>,
    matcher: &'a AffixMatcher,
}

impl BoundAffixMatcher<'_> {
    pub fn affix_matcher(&self) -> &AffixMatcher {
        self.matcher
    }
}

impl NumberParseMatcher for BoundAffixMatcher<'_> {
    fn match_segment(&self, segment: &mut StringSegment<'_>, result: &mut ParsedNumber) -> bool {
        self.matcher.match_segment(&self.source, segment, result)
    }

    fn smoke_test(&self, segment: &StringSegment<'_>) -> bool {
        self.matcher.smoke_test(&self.source, segment)
    }

    fn post_process(&self, result: &mut ParsedNumber) {
        self.matcher.post_process(&self.source, result)
    }
}
