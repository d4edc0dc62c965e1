//! Issue counts and their arithmetic.
//!
//! A [`LinterResult`] holds a signed count per [`Issue`]. Results form a
//! commutative group under addition: the empty result is the identity and
//! negation is the inverse. That is what makes per-file nets compose into an
//! overall net independently of the order in which files are visited.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

use crate::issue::Issue;

/// Count of issues by kind for one file (or an aggregate of files).
///
/// Missing issues count as zero. Zero counts are never stored, so two results
/// compare equal exactly when every issue has the same count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinterResult {
    counts: BTreeMap<Issue, i64>,
}

/// Pre and post count of one issue, as produced by [`LinterResult::compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueChange {
    pub issue: Issue,
    pub pre: i64,
    pub post: i64,
}

impl IssueChange {
    pub fn net(&self) -> i64 {
        self.post - self.pre
    }

    /// Fewer issues than before
    pub fn is_improvement(&self) -> bool {
        self.post < self.pre
    }
}

impl LinterResult {
    /// The identity: no issues at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from explicit counts. Zero entries are dropped.
    pub fn from_counts(counts: impl IntoIterator<Item = (Issue, i64)>) -> Self {
        let mut result = Self::new();
        for (issue, count) in counts {
            result.bump(issue, count);
        }
        result
    }

    /// Tally issue occurrences; each occurrence counts once.
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        Self::from_counts(issues.into_iter().map(|issue| (issue, 1)))
    }

    fn bump(&mut self, issue: Issue, delta: i64) {
        if delta == 0 {
            return;
        }
        match self.counts.entry(issue) {
            Entry::Vacant(slot) => {
                slot.insert(delta);
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += delta;
                if *slot.get() == 0 {
                    slot.remove();
                }
            }
        }
    }

    /// Count for an issue; zero when absent
    pub fn count(&self, issue: &Issue) -> i64 {
        self.counts.get(issue).copied().unwrap_or(0)
    }

    /// Whether this is the identity element
    pub fn is_identity(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct issues with a non-zero count
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_identity()
    }

    /// Non-zero counts, ordered by issue
    pub fn iter(&self) -> impl Iterator<Item = (&Issue, i64)> {
        self.counts.iter().map(|(issue, count)| (issue, *count))
    }

    /// Issues with a non-zero count, in order
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.counts.keys()
    }

    /// Sum of all counts
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }

    /// `a + b`
    pub fn combine(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (issue, count) in other.iter() {
            result.bump(issue.clone(), count);
        }
        result
    }

    /// `post - pre`
    pub fn net_delta(pre: &Self, post: &Self) -> Self {
        post.combine(&pre.invert())
    }

    /// `-a`
    pub fn invert(&self) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .map(|(issue, count)| (issue.clone(), -count))
                .collect(),
        }
    }

    /// Pair up counts of `pre` and `post` over the union of their issues.
    pub fn compare(pre: &Self, post: &Self) -> Vec<IssueChange> {
        let mut issues: Vec<&Issue> = pre.counts.keys().chain(post.counts.keys()).collect();
        issues.sort();
        issues.dedup();

        issues
            .into_iter()
            .map(|issue| IssueChange {
                issue: issue.clone(),
                pre: pre.count(issue),
                post: post.count(issue),
            })
            .collect()
    }
}

impl Add for LinterResult {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.combine(&other)
    }
}

impl<'a> Add<&'a LinterResult> for &'a LinterResult {
    type Output = LinterResult;

    fn add(self, other: &'a LinterResult) -> LinterResult {
        self.combine(other)
    }
}

impl AddAssign for LinterResult {
    fn add_assign(&mut self, other: Self) {
        *self = self.combine(&other);
    }
}

impl<'a> AddAssign<&'a LinterResult> for LinterResult {
    fn add_assign(&mut self, other: &'a LinterResult) {
        *self = self.combine(other);
    }
}

impl Sub for LinterResult {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        LinterResult::net_delta(&other, &self)
    }
}

impl<'a> Sub<&'a LinterResult> for &'a LinterResult {
    type Output = LinterResult;

    fn sub(self, other: &'a LinterResult) -> LinterResult {
        LinterResult::net_delta(other, self)
    }
}

impl Neg for LinterResult {
    type Output = Self;

    fn neg(self) -> Self {
        self.invert()
    }
}

impl Sum for LinterResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(LinterResult::new(), Add::add)
    }
}

impl<'a> Sum<&'a LinterResult> for LinterResult {
    fn sum<I: Iterator<Item = &'a LinterResult>>(iter: I) -> Self {
        iter.fold(LinterResult::new(), |acc, r| acc.combine(r))
    }
}
