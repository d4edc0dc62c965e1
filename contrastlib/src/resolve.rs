//! Materializing file versions for linters.
//!
//! Most linters only need the file itself: its blob is streamed into a
//! temporary file that keeps the original extension. Linters that need the
//! whole project are run inside the working tree after checking out the
//! relevant commit. The working tree is shared state, so checkouts are
//! serialized and HEAD is always put back where it was.

use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::ContrastError;
use crate::language::extension_of;
use crate::linter::Linter;
use crate::result::LinterResult;
use crate::vcs::{BlobId, ChangeRecord, CommitId, HeadState, Vcs};
use crate::Result;

/// How a file version is handed to a linter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Check the commit out and lint the file in place
    Checkout,
    /// Lint an isolated temporary copy of the blob
    BlobExtraction,
}

impl Strategy {
    pub fn for_linter(linter: &dyn Linter) -> Self {
        if linter.needs_checkout() {
            Strategy::Checkout
        } else {
            Strategy::BlobExtraction
        }
    }
}

/// Lint both sides of a change.
///
/// Returns `(pre, post)`. A side that does not exist (the old side of an
/// added file, the new side of a deleted one) is the identity result.
pub fn lint_change(
    vcs: &dyn Vcs,
    linter: &dyn Linter,
    change: &ChangeRecord,
    from: &CommitId,
    to: &CommitId,
) -> Result<(LinterResult, LinterResult)> {
    let pre = change.pre().map(|(path, blob)| Version {
        commit: from,
        path,
        blob,
    });
    let post = change.post().map(|(path, blob)| Version {
        commit: to,
        path,
        blob,
    });

    match Strategy::for_linter(linter) {
        Strategy::BlobExtraction => Ok((
            lint_blob(vcs, linter, pre)?,
            lint_blob(vcs, linter, post)?,
        )),
        Strategy::Checkout => {
            let mut guard = WorktreeGuard::acquire(vcs, change.path())?;
            let pre = guard.lint(linter, pre)?;
            let post = guard.lint(linter, post)?;
            Ok((pre, post))
        }
    }
}

#[derive(Clone, Copy)]
struct Version<'a> {
    commit: &'a CommitId,
    path: &'a Path,
    blob: &'a BlobId,
}

fn lint_blob(vcs: &dyn Vcs, linter: &dyn Linter, version: Option<Version<'_>>) -> Result<LinterResult> {
    let Some(version) = version else {
        return Ok(LinterResult::new());
    };

    let file = extract(vcs, version.path, version.blob)?;
    debug!(
        linter = linter.name(),
        path = %version.path.display(),
        commit = version.commit.short(),
        "linting extracted blob"
    );

    linter
        .lint(file.path())
        .map_err(|e| attribute_to(e, version.path))
}

/// Copy a blob into a temporary file with the same extension as `path`.
///
/// The file is removed when the returned handle is dropped.
pub fn extract(vcs: &dyn Vcs, path: &Path, blob: &BlobId) -> Result<tempfile::NamedTempFile> {
    let suffix = extension_of(path).unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix("git-contrast-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| ContrastError::resource(path, format!("failed to create temporary file: {}", e)))?;

    let written = vcs
        .write_blob(blob, &mut file)
        .and_then(|()| file.flush().map_err(ContrastError::from));
    match written {
        Ok(()) => Ok(file),
        Err(ContrastError::Io(e)) => Err(ContrastError::resource(
            path,
            format!("failed to write temporary file: {}", e),
        )),
        Err(e) => Err(e),
    }
}

/// Report a tool failure against the repository path rather than the
/// file the tool actually saw.
fn attribute_to(error: ContrastError, path: &Path) -> ContrastError {
    match error {
        ContrastError::LintToolFailure { linter, message, .. } => ContrastError::LintToolFailure {
            linter,
            path: path.to_path_buf(),
            message,
        },
        other => other,
    }
}

static WORKTREE: Mutex<()> = Mutex::new(());

/// Exclusive use of the working tree.
///
/// Refuses to start on a dirty tree and restores the original HEAD when
/// dropped, whether linting succeeded or not.
struct WorktreeGuard<'a> {
    vcs: &'a dyn Vcs,
    original: HeadState,
    moved: bool,
    _lock: MutexGuard<'static, ()>,
}

impl<'a> WorktreeGuard<'a> {
    fn acquire(vcs: &'a dyn Vcs, path: &Path) -> Result<Self> {
        // a panic in another checkout leaves nothing to clean up here
        let lock = WORKTREE.lock().unwrap_or_else(|e| e.into_inner());

        let clean = vcs
            .is_clean()
            .map_err(|e| ContrastError::resource(path, e.to_string()))?;
        if !clean {
            return Err(ContrastError::resource(
                path,
                "working tree has uncommitted changes, refusing to check out",
            ));
        }

        let original = vcs
            .head()
            .map_err(|e| ContrastError::resource(path, e.to_string()))?;

        Ok(Self {
            vcs,
            original,
            moved: false,
            _lock: lock,
        })
    }

    fn lint(&mut self, linter: &dyn Linter, version: Option<Version<'_>>) -> Result<LinterResult> {
        let Some(version) = version else {
            return Ok(LinterResult::new());
        };

        debug!(
            linter = linter.name(),
            path = %version.path.display(),
            commit = version.commit.short(),
            "checking out for linter"
        );
        self.moved = true;
        self.vcs
            .checkout(&HeadState::Detached(version.commit.clone()))
            .map_err(|e| ContrastError::resource(version.path, e.to_string()))?;

        linter
            .lint(&self.vcs.workdir().join(version.path))
            .map_err(|e| attribute_to(e, version.path))
    }
}

impl Drop for WorktreeGuard<'_> {
    fn drop(&mut self) {
        if !self.moved {
            return;
        }
        if let Err(e) = self.vcs.checkout(&self.original) {
            warn!(head = %self.original, error = %e, "failed to restore working tree");
        }
    }
}
