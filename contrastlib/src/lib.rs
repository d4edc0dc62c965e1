//! # contrastlib
//!
//! Reveals how code quality changed between two commits by running each
//! changed file's linter on its old and new content and netting the issue
//! counts.
//!
//! ## Overview
//!
//! External linters all report in their own format. This library maps their
//! reports onto a common taxonomy ([`Category`], [`Issue`]) and counts them
//! in a [`LinterResult`]. Results form a commutative group, so per-file nets
//! (`post - pre`) add up to an overall net regardless of file order.
//!
//! - **Adapters**: Pylint, flawfinder, HLint, ktlint, PMD, Cppcheck, OCLint
//! - **Routing**: by file extension, optionally restricted to one
//!   [`Language`]
//! - **Content**: isolated temporary copies of blobs, or a real checkout for
//!   linters that need the whole project (the working tree is restored
//!   afterwards)
//! - **Failures**: per-file tool failures either abort the run or are
//!   recorded and skipped ([`FailurePolicy`])
//!
//! ## Example
//!
//! ```no_run
//! use contrastlib::{diff_range, DiffOptions, GitRepository, Language, StructuredReport};
//!
//! let repo = GitRepository::discover(".").unwrap();
//! let range = vec!["HEAD~1..HEAD".to_string()];
//! let options = DiffOptions::new().language(Language::Python);
//!
//! let report = diff_range(&repo, &range, &options).unwrap();
//! for (issue, net) in report.net_total.iter() {
//!     println!("{} {:+}", issue, net);
//! }
//! println!("{}", StructuredReport::from_report(&report).to_json().unwrap());
//! ```

pub mod diff;
pub mod error;
pub mod issue;
pub mod language;
pub mod linter;
pub mod linters;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod result;
pub mod vcs;

#[cfg(test)]
pub(crate) mod fakes;

pub use diff::{
    diff_commits, diff_range, ChangeKind, DiffOptions, DiffReport, FailurePolicy, FileDiff,
    FileFailure,
};
pub use error::ContrastError;
pub use issue::{Category, Issue};
pub use language::Language;
pub use linter::{Descriptor, Linter};
pub use registry::LinterRegistry;
pub use report::{IssueEntry, StructuredReport};
pub use resolve::Strategy;
pub use result::{IssueChange, LinterResult};
pub use vcs::{BlobId, ChangeRecord, CommitId, GitRepository, HeadState, Vcs};

/// Result type for contrastlib operations
pub type Result<T> = std::result::Result<T, ContrastError>;
