//! Owner of the elementary matchers that compiled affix patterns refer to.
//!
//! Compiled patterns hold [`MatcherHandle`]s rather than references. A
//! handle stays valid for the life of the pool: code-point matchers are
//! never moved once issued, and the single-instance slots are rebuilt from
//! the same configuration on every request.

use tracing::debug;

use crate::currency::CurrencyAffixInfo;
use crate::locale_data::{IgnorableSet, SymbolTable};
use crate::matchers::{
    CodePointMatcher, CurrencyMatcher, IgnorablesMatcher, MinusSignMatcher, NumberParseMatcher,
    PercentMatcher, PermilleMatcher, PlusSignMatcher,
};

pub const CODE_POINT_INLINE_CAPACITY: usize = 5;
pub const CODE_POINT_BATCH_SIZE: usize = 2 * CODE_POINT_INLINE_CAPACITY;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatcherHandle {
    MinusSign,
    PlusSign,
    Percent,
    Permille,
    Currency,
    Ignorables,
    CodePoint(usize),
}

pub struct AffixTokenMatcherPool {
    symbols: SymbolTable,
    currency_info: CurrencyAffixInfo,
    ignorables: IgnorablesMatcher,

    minus_sign: Option<MinusSignMatcher>,
    plus_sign: Option<PlusSignMatcher>,
    percent: Option<PercentMatcher>,
    permille: Option<PermilleMatcher>,
    currency: Option<CurrencyMatcher>,

    code_points: [CodePointMatcher; CODE_POINT_INLINE_CAPACITY],
    code_point_count: usize,
    code_point_batches: Vec<Box<[CodePointMatcher; CODE_POINT_BATCH_SIZE]>>,
}

impl AffixTokenMatcherPool {
    pub fn new(symbols: SymbolTable, currency_info: CurrencyAffixInfo) -> Self {
        let ignorables = IgnorablesMatcher::new(symbols.ignorables);
        Self {
            symbols,
            currency_info,
            ignorables,
            minus_sign: None,
            plus_sign: None,
            percent: None,
            permille: None,
            currency: None,
            code_points: [CodePointMatcher::default(); CODE_POINT_INLINE_CAPACITY],
            code_point_count: 0,
            code_point_batches: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn currency_info(&self) -> &CurrencyAffixInfo {
        &self.currency_info
    }

    pub fn ignorable_set(&self) -> IgnorableSet {
        self.ignorables.set()
    }

    pub fn minus_sign(&mut self) -> MatcherHandle {
        self.minus_sign = Some(MinusSignMatcher::new(&self.symbols, true));
        MatcherHandle::MinusSign
    }

    pub fn plus_sign(&mut self) -> MatcherHandle {
        self.plus_sign = Some(PlusSignMatcher::new(&self.symbols, true));
        MatcherHandle::PlusSign
    }

    pub fn percent(&mut self) -> MatcherHandle {
        self.percent = Some(PercentMatcher::new(&self.symbols));
        MatcherHandle::Percent
    }

    pub fn permille(&mut self) -> MatcherHandle {
        self.permille = Some(PermilleMatcher::new(&self.symbols));
        MatcherHandle::Permille
    }

    pub fn currency(&mut self) -> MatcherHandle {
        self.currency = Some(CurrencyMatcher::new(&self.currency_info));
        MatcherHandle::Currency
    }

    pub fn ignorables(&self) -> MatcherHandle {
        MatcherHandle::Ignorables
    }

    /// Issues a new matcher bound to `cp`.
    pub fn next_code_point(&mut self, cp: char) -> MatcherHandle {
        let index = self.code_point_count;
        let matcher = CodePointMatcher::new(cp);
        if index < CODE_POINT_INLINE_CAPACITY {
            self.code_points[index] = matcher;
        } else {
            let (batch, slot) = batch_position(index);
            if batch == self.code_point_batches.len() {
                self.code_point_batches
                    .push(Box::new([CodePointMatcher::default(); CODE_POINT_BATCH_SIZE]));
                debug!(
                    batches = self.code_point_batches.len(),
                    issued = index,
                    "grew code point matcher pool"
                );
            }
            self.code_point_batches[batch][slot] = matcher;
        }
        self.code_point_count += 1;
        MatcherHandle::CodePoint(index)
    }

    /// The matcher behind `handle`, or `None` if it was never issued.
    pub fn get(&self, handle: MatcherHandle) -> Option<&dyn NumberParseMatcher> {
        match handle {
            MatcherHandle::MinusSign => self.minus_sign.as_ref().map(|m| m as &dyn NumberParseMatcher),
            MatcherHandle::PlusSign => self.plus_sign.as_ref().map(|m| m as &dyn NumberParseMatcher),
            MatcherHandle::Percent => self.percent.as_ref().map(|m| m as &dyn NumberParseMatcher),
            MatcherHandle::Permille => self.permille.as_ref().map(|m| m as &dyn NumberParseMatcher),
            MatcherHandle::Currency => self.currency.as_ref().map(|m| m as &dyn NumberParseMatcher),
            MatcherHandle::Ignorables => Some(&self.ignorables as &dyn NumberParseMatcher),
            MatcherHandle::CodePoint(index) => self.code_point(index).map(|m| m as &dyn NumberParseMatcher),
        }
    }

    fn code_point(&self, index: usize) -> Option<&CodePointMatcher> {
        if index >= self.code_point_count {
            return None;
        }
        if index < CODE_POINT_INLINE_CAPACITY {
            return Some(&self.code_points[index]);
        }
        let (batch, slot) = batch_position(index);
        self.code_point_batches.get(batch).map(|b| &b[slot])
    }

    pub fn code_point_count(&self) -> usize {
        self.code_point_count
    }

    pub fn batch_count(&self) -> usize {
        self.code_point_batches.len()
    }
}

fn batch_position(index: usize) -> (usize, usize) {
    let overflow = index - CODE_POINT_INLINE_CAPACITY;
    (overflow / CODE_POINT_BATCH_SIZE, overflow % CODE_POINT_BATCH_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{ParsedNumber, StringSegment};

    fn pool() -> AffixTokenMatcherPool {
        AffixTokenMatcherPool::new(SymbolTable::default(), CurrencyAffixInfo::default())
    }

    fn matches(pool: &AffixTokenMatcherPool, handle: MatcherHandle, input: &str) -> bool {
        let matcher = pool.get(handle).unwrap();
        let mut segment = StringSegment::new(input);
        let mut result = ParsedNumber::default();
        matcher.match_segment(&mut segment, &mut result);
        segment.offset() > 0
    }

    #[test]
    fn slots_exist_only_after_request() {
        let mut pool = pool();
        assert!(pool.get(MatcherHandle::Percent).is_none());
        let handle = pool.percent();
        assert!(matches(&pool, handle, "%"));
        assert_eq!(pool.percent(), handle);
        assert!(pool.get(MatcherHandle::Ignorables).is_some());
        assert!(pool.get(MatcherHandle::CodePoint(0)).is_none());
    }

    #[test]
    fn code_points_stay_distinct_across_growth() {
        let mut pool = pool();
        let letters: Vec<char> = ('a'..='z').collect();
        let handles: Vec<_> = letters.iter().map(|&c| pool.next_code_point(c)).collect();
        assert_eq!(pool.code_point_count(), 26);
        // 5 inline, then batches of 10.
        assert_eq!(pool.batch_count(), 3);
        for (i, (&handle, &cp)) in handles.iter().zip(&letters).enumerate() {
            assert!(matches(&pool, handle, &cp.to_string()), "matcher {i}");
            let other = if cp == 'z' { 'a' } else { 'z' };
            assert!(!matches(&pool, handle, &other.to_string()), "matcher {i}");
        }
    }

    #[test]
    fn first_batch_allocated_on_sixth_code_point() {
        let mut pool = pool();
        for cp in "abcde".chars() {
            pool.next_code_point(cp);
        }
        assert_eq!(pool.batch_count(), 0);
        pool.next_code_point('f');
        assert_eq!(pool.batch_count(), 1);
    }
}
