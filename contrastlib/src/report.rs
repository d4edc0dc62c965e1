//! The structured (JSON) form of a [`DiffReport`].
//!
//! ```json
//! {
//!   "added": 1,
//!   "added_Pylint": 1,
//!   "deleted": 0,
//!   "modified": 0,
//!   "results": {
//!     "Pylint": {
//!       "missing-docstring": { "category": "convention", "post": 1, "pre": 0 }
//!     }
//!   },
//!   "unchanged": 0
//! }
//! ```
//!
//! `failures` is only present when files were skipped. Object keys are
//! sorted so the output is stable across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffReport, FileFailure};
use crate::issue::Category;
use crate::result::LinterResult;

/// Total counts of one issue before and after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEntry {
    pub pre: i64,
    pub post: i64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReport {
    /// linter name -> issue symbol -> counts
    pub results: BTreeMap<String, BTreeMap<String, IssueEntry>>,
    /// File tallies, flattened into the top-level object
    #[serde(flatten)]
    pub file_counts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

impl StructuredReport {
    pub fn from_report(report: &DiffReport) -> Self {
        Self {
            results: results(&report.pre_total, &report.post_total),
            file_counts: report.file_counts.clone(),
            failures: report.failures.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        // going through a Value sorts the flattened keys in with the rest
        let value = serde_json::to_value(self)?;
        serde_json::to_string_pretty(&value)
    }
}

fn results(
    pre: &LinterResult,
    post: &LinterResult,
) -> BTreeMap<String, BTreeMap<String, IssueEntry>> {
    let changes = LinterResult::compare(pre, post);

    // a symbol reported under two categories by one linter needs two keys
    let mut seen: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for change in &changes {
        *seen
            .entry((change.issue.linter.as_str(), change.issue.symbolic_name.as_str()))
            .or_insert(0) += 1;
    }

    let mut results: BTreeMap<String, BTreeMap<String, IssueEntry>> = BTreeMap::new();
    for change in &changes {
        let issue = &change.issue;
        let key = if seen[&(issue.linter.as_str(), issue.symbolic_name.as_str())] > 1 {
            format!("{} ({})", issue.symbolic_name, issue.category.label())
        } else {
            issue.symbolic_name.clone()
        };

        results.entry(issue.linter.clone()).or_default().insert(
            key,
            IssueEntry {
                pre: change.pre,
                post: change.post,
                category: issue.category,
            },
        );
    }
    results
}
