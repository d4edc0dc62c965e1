//! Issue count changes between two commits.
//!
//! This module walks the files changed between two commits and, for each
//! one a linter is registered for, lints the old and the new version and
//! nets the results:
//!
//! 1. Gets change records from the [`Vcs`]
//! 2. Classifies them (added, deleted, modified, unchanged) and tallies them
//! 3. Picks a linter through the [`LinterRegistry`]
//! 4. Delegates to [`resolve::lint_change`](crate::resolve::lint_change) for
//!    the pre and post results
//! 5. Accumulates `pre`, `post` and `net` totals
//!
//! Totals are sums in the [`LinterResult`] group, so they do not depend on
//! the order in which files are visited.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::language::Language;
use crate::registry::LinterRegistry;
use crate::resolve::lint_change;
use crate::result::LinterResult;
use crate::vcs::{ChangeRecord, CommitId, Vcs};
use crate::Result;

/// Classification of a change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    /// Same content on both sides (pure rename or mode change)
    Unchanged,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 4] = [
        ChangeKind::Added,
        ChangeKind::Deleted,
        ChangeKind::Modified,
        ChangeKind::Unchanged,
    ];

    pub fn classify(change: &ChangeRecord) -> Self {
        match change {
            ChangeRecord::Added { .. } => ChangeKind::Added,
            ChangeRecord::Deleted { .. } => ChangeKind::Deleted,
            ChangeRecord::Modified {
                pre_blob, post_blob, ..
            } if pre_blob == post_blob => ChangeKind::Unchanged,
            ChangeRecord::Modified { .. } => ChangeKind::Modified,
        }
    }

    /// Key used in file tallies
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
            ChangeKind::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do when a single file cannot be linted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop and return the error
    Abort,
    /// Log it, record it in the report and leave the file out of the totals
    #[default]
    Degrade,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "degrade" => Ok(FailurePolicy::Degrade),
            other => Err(format!(
                "unknown failure policy '{}', expected 'degrade' or 'abort'",
                other
            )),
        }
    }
}

/// Options for [`diff_commits`]
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Only lint files of this language
    pub language: Option<Language>,
    /// Extension to linter routing
    pub registry: LinterRegistry,
    pub failure_policy: FailurePolicy,
}

impl DiffOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict linting to one language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Replace the linter routing
    pub fn registry(mut self, registry: LinterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Results for one linted file
#[derive(Debug, Clone, PartialEq)]
pub struct FileDiff {
    pub change: ChangeRecord,
    pub kind: ChangeKind,
    /// Name of the linter that produced the results
    pub linter: String,
    pub pre: LinterResult,
    pub post: LinterResult,
    /// `post - pre`
    pub net: LinterResult,
}

impl FileDiff {
    pub fn new(
        change: ChangeRecord,
        kind: ChangeKind,
        linter: &str,
        pre: LinterResult,
        post: LinterResult,
    ) -> Self {
        let net = LinterResult::net_delta(&pre, &post);
        Self {
            change,
            kind,
            linter: linter.to_string(),
            pre,
            post,
            net,
        }
    }

    /// No issue count changed
    pub fn is_unchanged(&self) -> bool {
        self.net.is_identity()
    }
}

/// A file left out of the totals because it could not be linted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub linter: String,
    pub error: String,
}

/// Result of contrasting two commits
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub from: CommitId,
    pub to: CommitId,
    /// Linted files, in the order the VCS reported them
    pub files: Vec<FileDiff>,
    pub pre_total: LinterResult,
    pub post_total: LinterResult,
    pub net_total: LinterResult,
    /// Change records per classification (`added`, ...) and linted files
    /// per classification and linter (`added_Pylint`, ...)
    pub file_counts: BTreeMap<String, u64>,
    /// Files skipped under [`FailurePolicy::Degrade`]
    pub failures: Vec<FileFailure>,
}

impl DiffReport {
    pub fn new(from: CommitId, to: CommitId) -> Self {
        Self {
            from,
            to,
            files: Vec::new(),
            pre_total: LinterResult::new(),
            post_total: LinterResult::new(),
            net_total: LinterResult::new(),
            file_counts: ChangeKind::ALL
                .iter()
                .map(|kind| (kind.label().to_string(), 0))
                .collect(),
            failures: Vec::new(),
        }
    }

    /// Tally for a key of [`DiffReport::file_counts`]; zero when absent
    pub fn file_count(&self, key: &str) -> u64 {
        self.file_counts.get(key).copied().unwrap_or(0)
    }

    fn tally(&mut self, key: String) {
        *self.file_counts.entry(key).or_insert(0) += 1;
    }

    pub(crate) fn record(&mut self, file: FileDiff) {
        self.tally(format!("{}_{}", file.kind.label(), file.linter));
        self.pre_total += &file.pre;
        self.post_total += &file.post;
        self.net_total += &file.net;
        self.files.push(file);
    }
}

/// Resolve a range specification and contrast the two commits.
///
/// See [`Vcs::resolve_range`] for the accepted forms.
pub fn diff_range(vcs: &dyn Vcs, range: &[String], options: &DiffOptions) -> Result<DiffReport> {
    let (from, to) = vcs.resolve_range(range)?;
    diff_commits(vcs, &from, &to, options)
}

/// Contrast issue counts between two commits.
///
/// # Errors
///
/// VCS errors always abort. Per-file linter and resource errors abort under
/// [`FailurePolicy::Abort`] and are recorded in
/// [`DiffReport::failures`] under [`FailurePolicy::Degrade`].
pub fn diff_commits(
    vcs: &dyn Vcs,
    from: &CommitId,
    to: &CommitId,
    options: &DiffOptions,
) -> Result<DiffReport> {
    info!(from = from.short(), to = to.short(), "contrasting commits");

    let changes = vcs.changes(from, to)?;
    let mut report = DiffReport::new(from.clone(), to.clone());

    for change in changes {
        let kind = ChangeKind::classify(&change);
        report.tally(kind.label().to_string());

        if kind == ChangeKind::Unchanged {
            debug!(path = %change.path().display(), "content unchanged, skipping");
            continue;
        }

        let Some(linter) = options.registry.select(change.path(), options.language) else {
            debug!(path = %change.path().display(), "no linter for file, skipping");
            continue;
        };

        debug!(
            path = %change.path().display(),
            kind = kind.label(),
            linter = linter.name(),
            "linting file"
        );

        match lint_change(vcs, linter.as_ref(), &change, from, to) {
            Ok((pre, post)) => report.record(FileDiff::new(change, kind, linter.name(), pre, post)),
            Err(e) if e.is_per_file() && options.failure_policy == FailurePolicy::Degrade => {
                warn!(
                    path = %change.path().display(),
                    linter = linter.name(),
                    error = %e,
                    "skipping file"
                );
                report.failures.push(FileFailure {
                    path: change.path().to_path_buf(),
                    linter: linter.name().to_string(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        files = report.files.len(),
        failures = report.failures.len(),
        net = report.net_total.total(),
        "contrast complete"
    );

    Ok(report)
}
