//! Access to version control history.
//!
//! The engine only needs a handful of things from the repository: a commit
//! range resolved to two commits, the files changed between them, the bytes
//! of a blob, and (for linters that need the whole project) the ability to
//! check a commit out into the working tree and go back afterwards. These
//! are captured by the [`Vcs`] trait; [`GitRepository`] implements it on top
//! of `gix`, using the `git` executable for the working tree operations.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::ContrastError;
use crate::Result;

/// A resolved commit (full hex object id for git)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitId(pub String);

impl CommitId {
    /// Abbreviated form for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content address of a file version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(pub String);

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file's change between two commits.
///
/// Paths are relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeRecord {
    Added {
        path: PathBuf,
        blob: BlobId,
    },
    Deleted {
        path: PathBuf,
        blob: BlobId,
    },
    Modified {
        pre_path: PathBuf,
        pre_blob: BlobId,
        post_path: PathBuf,
        post_blob: BlobId,
        renamed: bool,
    },
}

impl ChangeRecord {
    /// Path and blob before the change, if the file existed
    pub fn pre(&self) -> Option<(&Path, &BlobId)> {
        match self {
            ChangeRecord::Added { .. } => None,
            ChangeRecord::Deleted { path, blob } => Some((path, blob)),
            ChangeRecord::Modified {
                pre_path, pre_blob, ..
            } => Some((pre_path, pre_blob)),
        }
    }

    /// Path and blob after the change, if the file still exists
    pub fn post(&self) -> Option<(&Path, &BlobId)> {
        match self {
            ChangeRecord::Added { path, blob } => Some((path, blob)),
            ChangeRecord::Deleted { .. } => None,
            ChangeRecord::Modified {
                post_path,
                post_blob,
                ..
            } => Some((post_path, post_blob)),
        }
    }

    /// The path a change is known by: the new path, or the old one for
    /// deletions.
    pub fn path(&self) -> &Path {
        match self.post().or_else(|| self.pre()) {
            Some((path, _)) => path,
            None => unreachable!("every change has at least one side"),
        }
    }

    pub fn is_renamed(&self) -> bool {
        matches!(self, ChangeRecord::Modified { renamed: true, .. })
    }
}

/// Where HEAD points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// On a branch (short name)
    Branch(String),
    /// Detached at a commit
    Detached(CommitId),
}

impl fmt::Display for HeadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadState::Branch(name) => f.write_str(name),
            HeadState::Detached(commit) => write!(f, "{} (detached)", commit.short()),
        }
    }
}

/// The version control operations the engine depends on.
pub trait Vcs {
    /// Resolve a range specification to exactly two commits.
    ///
    /// Accepts `A..B`, `A B`, or a single `A` meaning `A..HEAD`. Anything
    /// else is a [`ContrastError::Configuration`].
    fn resolve_range(&self, range: &[String]) -> Result<(CommitId, CommitId)>;

    /// Files changed between two commits, in a stable order
    fn changes(&self, from: &CommitId, to: &CommitId) -> Result<Vec<ChangeRecord>>;

    /// Stream a blob's content into `out`
    fn write_blob(&self, blob: &BlobId, out: &mut dyn Write) -> Result<()>;

    /// Root of the working tree
    fn workdir(&self) -> &Path;

    fn head(&self) -> Result<HeadState>;

    /// No uncommitted changes to tracked files
    fn is_clean(&self) -> Result<bool>;

    /// Switch the working tree to `target`
    fn checkout(&self, target: &HeadState) -> Result<()>;
}

/// Split a range specification into its two revisions.
///
/// `A..B` and `A B` give `(A, B)`; a single `A` gives `(A, HEAD)`; an empty
/// side of `..` means `HEAD`, as in git.
pub fn split_range(range: &[String]) -> Result<(String, String)> {
    let invalid = || {
        ContrastError::Configuration(format!(
            "invalid commit range '{}': use 'from..to', 'from to' or 'from'",
            range.join(" ")
        ))
    };

    let side = |s: &str| {
        if s.is_empty() {
            "HEAD".to_string()
        } else {
            s.to_string()
        }
    };

    match range {
        [single] if single.contains("...") => Err(invalid()),
        [single] => match single.split_once("..") {
            Some((from, to)) if !(from.is_empty() && to.is_empty()) && !to.contains("..") => {
                Ok((side(from), side(to)))
            }
            Some(_) => Err(invalid()),
            None if single.is_empty() => Err(invalid()),
            None => Ok((single.clone(), "HEAD".to_string())),
        },
        [from, to] if !from.is_empty() && !to.is_empty() && !from.contains("..") && !to.contains("..") => {
            Ok((from.clone(), to.clone()))
        }
        _ => Err(invalid()),
    }
}

/// A git repository on disk.
pub struct GitRepository {
    repo: gix::Repository,
    workdir: PathBuf,
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl GitRepository {
    /// Open the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::discover(path).map_err(|e| {
            ContrastError::Configuration(format!(
                "failed to discover git repository at '{}': {}",
                path.display(),
                e
            ))
        })?;

        let workdir = repo
            .work_dir()
            .ok_or_else(|| {
                ContrastError::Configuration("repository has no work directory".to_string())
            })?
            .to_path_buf();

        Ok(Self { repo, workdir })
    }

    fn resolve_commit(&self, reference: &str) -> Result<CommitId> {
        // peel annotated tags down to the commit they point at
        let spec = format!("{}^{{commit}}", reference);
        let id = self
            .repo
            .rev_parse_single(spec.as_bytes())
            .map_err(|e| {
                ContrastError::Configuration(format!("failed to resolve '{}': {}", reference, e))
            })?
            .detach();

        let commit = self.repo.find_commit(id).map_err(|e| {
            ContrastError::Configuration(format!("'{}' is not a commit: {}", reference, e))
        })?;

        Ok(CommitId(commit.id.to_string()))
    }

    fn find_tree(&self, commit: &CommitId) -> Result<gix::Tree<'_>> {
        let id = parse_object_id(&commit.0)?;
        self.repo
            .find_commit(id)
            .map_err(|e| ContrastError::Git(format!("failed to find commit {}: {}", commit, e)))?
            .tree()
            .map_err(|e| ContrastError::Git(format!("failed to get tree for {}: {}", commit, e)))
    }

    /// Run `git` in the working tree and return its stdout.
    fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| ContrastError::Git(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContrastError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitRepository {
    fn resolve_range(&self, range: &[String]) -> Result<(CommitId, CommitId)> {
        let (from, to) = split_range(range)?;
        Ok((self.resolve_commit(&from)?, self.resolve_commit(&to)?))
    }

    fn changes(&self, from: &CommitId, to: &CommitId) -> Result<Vec<ChangeRecord>> {
        use gix::object::tree::diff::{Action, Change};

        let from_tree = self.find_tree(from)?;
        let to_tree = self.find_tree(to)?;

        let mut changes = Vec::new();

        from_tree
            .changes()
            .map_err(|e| ContrastError::Git(format!("failed to get tree changes: {}", e)))?
            .for_each_to_obtain_tree(&to_tree, |change| {
                let record = match change {
                    Change::Addition {
                        entry_mode,
                        id,
                        location,
                        ..
                    } if entry_mode.is_blob() => Some(ChangeRecord::Added {
                        path: to_path(location),
                        blob: BlobId(id.detach().to_string()),
                    }),
                    Change::Deletion {
                        entry_mode,
                        id,
                        location,
                        ..
                    } if entry_mode.is_blob() => Some(ChangeRecord::Deleted {
                        path: to_path(location),
                        blob: BlobId(id.detach().to_string()),
                    }),
                    Change::Modification {
                        previous_entry_mode,
                        entry_mode,
                        previous_id,
                        id,
                        location,
                        ..
                    } if entry_mode.is_blob() && previous_entry_mode.is_blob() => {
                        let path = to_path(location);
                        Some(ChangeRecord::Modified {
                            pre_path: path.clone(),
                            pre_blob: BlobId(previous_id.detach().to_string()),
                            post_path: path,
                            post_blob: BlobId(id.detach().to_string()),
                            renamed: false,
                        })
                    }
                    Change::Rewrite {
                        source_location,
                        source_entry_mode,
                        source_id,
                        entry_mode,
                        id,
                        location,
                        copy,
                        ..
                    } if entry_mode.is_blob() && source_entry_mode.is_blob() => {
                        if copy {
                            // the source is untouched, only the copy is new
                            Some(ChangeRecord::Added {
                                path: to_path(location),
                                blob: BlobId(id.detach().to_string()),
                            })
                        } else {
                            Some(ChangeRecord::Modified {
                                pre_path: to_path(source_location),
                                pre_blob: BlobId(source_id.detach().to_string()),
                                post_path: to_path(location),
                                post_blob: BlobId(id.detach().to_string()),
                                renamed: true,
                            })
                        }
                    }
                    // trees, submodules and blob <-> non-blob mode switches
                    _ => None,
                };

                if let Some(record) = record {
                    changes.push(record);
                }
                Ok::<_, std::convert::Infallible>(Action::Continue)
            })
            .map_err(|e| ContrastError::Git(format!("failed to compute tree diff: {}", e)))?;

        Ok(changes)
    }

    fn write_blob(&self, blob: &BlobId, out: &mut dyn Write) -> Result<()> {
        let id = parse_object_id(&blob.0)?;
        let object = self
            .repo
            .find_object(id)
            .map_err(|e| ContrastError::Git(format!("failed to find object {}: {}", blob, e)))?;

        let blob_object = object
            .try_into_blob()
            .map_err(|_| ContrastError::Git(format!("object {} is not a blob", blob)))?;

        out.write_all(&blob_object.data)?;
        Ok(())
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head(&self) -> Result<HeadState> {
        match self.git(&["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(branch) if !branch.is_empty() => Ok(HeadState::Branch(branch)),
            _ => Ok(HeadState::Detached(CommitId(
                self.git(&["rev-parse", "HEAD"])?,
            ))),
        }
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self
            .git(&["status", "--porcelain", "--untracked-files=no"])?
            .is_empty())
    }

    fn checkout(&self, target: &HeadState) -> Result<()> {
        match target {
            HeadState::Branch(name) => self.git(&["checkout", "--quiet", name.as_str()])?,
            HeadState::Detached(commit) => {
                self.git(&["checkout", "--quiet", "--detach", commit.0.as_str()])?
            }
        };
        Ok(())
    }
}

fn to_path(location: &gix::bstr::BStr) -> PathBuf {
    PathBuf::from(gix::path::from_bstr(location))
}

fn parse_object_id(hex: &str) -> Result<gix::ObjectId> {
    gix::ObjectId::from_hex(hex.as_bytes())
        .map_err(|e| ContrastError::Git(format!("invalid object id '{}': {}", hex, e)))
}
