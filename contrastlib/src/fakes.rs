//! In-memory fakes (testing only)
//!
//! [`MemoryVcs`] holds two snapshots, `from` and `to`, and derives change
//! records from them. Checkouts materialize a snapshot into a temporary
//! working tree so checkout-based linting can be exercised without git.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::error::ContrastError;
use crate::issue::{Category, Issue};
use crate::linter::{Descriptor, Linter};
use crate::result::LinterResult;
use crate::vcs::{BlobId, ChangeRecord, CommitId, HeadState, Vcs};
use crate::Result;

pub const FROM: &str = "from";
pub const TO: &str = "to";
pub const BRANCH: &str = "main";

pub struct MemoryVcs {
    workdir: TempDir,
    records: Vec<ChangeRecord>,
    blobs: HashMap<BlobId, Vec<u8>>,
    snapshots: HashMap<String, BTreeMap<PathBuf, BlobId>>,
    head: RefCell<HeadState>,
    pub checkouts: RefCell<Vec<HeadState>>,
    pub dirty: bool,
}

impl MemoryVcs {
    pub fn new() -> Self {
        Self {
            workdir: tempfile::tempdir().unwrap(),
            records: Vec::new(),
            blobs: HashMap::new(),
            snapshots: HashMap::from([
                (FROM.to_string(), BTreeMap::new()),
                (TO.to_string(), BTreeMap::new()),
            ]),
            head: RefCell::new(HeadState::Branch(BRANCH.to_string())),
            checkouts: RefCell::new(Vec::new()),
            dirty: false,
        }
    }

    pub fn range() -> (CommitId, CommitId) {
        (CommitId(FROM.to_string()), CommitId(TO.to_string()))
    }

    fn blob(&mut self, content: &str) -> BlobId {
        let id = BlobId(format!("blob-{}", self.blobs.len()));
        self.blobs.insert(id.clone(), content.as_bytes().to_vec());
        id
    }

    fn place(&mut self, snapshot: &str, path: &str, blob: &BlobId) {
        self.snapshots
            .get_mut(snapshot)
            .unwrap()
            .insert(PathBuf::from(path), blob.clone());
    }

    pub fn added(mut self, path: &str, content: &str) -> Self {
        let blob = self.blob(content);
        self.place(TO, path, &blob);
        self.records.push(ChangeRecord::Added {
            path: PathBuf::from(path),
            blob,
        });
        self
    }

    pub fn deleted(mut self, path: &str, content: &str) -> Self {
        let blob = self.blob(content);
        self.place(FROM, path, &blob);
        self.records.push(ChangeRecord::Deleted {
            path: PathBuf::from(path),
            blob,
        });
        self
    }

    pub fn modified(self, path: &str, pre: &str, post: &str) -> Self {
        self.renamed(path, path, pre, post)
    }

    pub fn renamed(mut self, pre_path: &str, post_path: &str, pre: &str, post: &str) -> Self {
        let pre_blob = self.blob(pre);
        // identical content shares a blob, as in git
        let post_blob = if pre == post {
            pre_blob.clone()
        } else {
            self.blob(post)
        };
        self.place(FROM, pre_path, &pre_blob);
        self.place(TO, post_path, &post_blob);
        self.records.push(ChangeRecord::Modified {
            pre_path: PathBuf::from(pre_path),
            pre_blob,
            post_path: PathBuf::from(post_path),
            post_blob,
            renamed: pre_path != post_path,
        });
        self
    }

    pub fn current_head(&self) -> HeadState {
        self.head.borrow().clone()
    }

    fn materialize(&self, snapshot: &str) -> Result<()> {
        let root = self.workdir.path();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
            } else {
                std::fs::remove_file(entry.path())?;
            }
        }
        for (path, blob) in &self.snapshots[snapshot] {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, &self.blobs[blob])?;
        }
        Ok(())
    }
}

impl Vcs for MemoryVcs {
    fn resolve_range(&self, range: &[String]) -> Result<(CommitId, CommitId)> {
        let (from, to) = crate::vcs::split_range(range)?;
        for name in [&from, &to] {
            if !self.snapshots.contains_key(name) {
                return Err(ContrastError::Configuration(format!(
                    "failed to resolve '{}'",
                    name
                )));
            }
        }
        Ok((CommitId(from), CommitId(to)))
    }

    fn changes(&self, _from: &CommitId, _to: &CommitId) -> Result<Vec<ChangeRecord>> {
        Ok(self.records.clone())
    }

    fn write_blob(&self, blob: &BlobId, out: &mut dyn Write) -> Result<()> {
        let bytes = self
            .blobs
            .get(blob)
            .ok_or_else(|| ContrastError::Git(format!("object {} not found", blob)))?;
        out.write_all(bytes)?;
        Ok(())
    }

    fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    fn head(&self) -> Result<HeadState> {
        Ok(self.current_head())
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(!self.dirty)
    }

    fn checkout(&self, target: &HeadState) -> Result<()> {
        let snapshot = match target {
            HeadState::Branch(_) => TO,
            HeadState::Detached(commit) => commit.0.as_str(),
        };
        if !self.snapshots.contains_key(snapshot) {
            return Err(ContrastError::Git(format!("unknown revision {}", snapshot)));
        }
        self.materialize(snapshot)?;
        self.checkouts.borrow_mut().push(target.clone());
        *self.head.borrow_mut() = target.clone();
        Ok(())
    }
}

/// Counts one `<name>` issue per line of the form `ISSUE <name>`.
///
/// Fails on files containing `CRASH`, so failure handling can be tested.
#[derive(Debug, Clone)]
pub struct MarkerLinter {
    pub name: &'static str,
    pub needs_checkout: bool,
    pub seen: Arc<std::sync::Mutex<Vec<PathBuf>>>,
}

impl MarkerLinter {
    pub fn new(name: &'static str, needs_checkout: bool) -> Self {
        Self {
            name,
            needs_checkout,
            seen: Arc::default(),
        }
    }

    pub fn issue(&self, marker: &str) -> Issue {
        Issue::new(marker, self.name, Category::Warning)
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl Linter for MarkerLinter {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: self.name,
            needs_checkout: self.needs_checkout,
        }
    }

    fn lint(&self, path: &Path) -> Result<LinterResult> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContrastError::lint_failure(self.name, path, e.to_string()))?;
        if content.contains("CRASH") {
            return Err(ContrastError::lint_failure(self.name, path, "tool crashed"));
        }
        Ok(LinterResult::from_issues(content.lines().filter_map(|line| {
            line.strip_prefix("ISSUE ")
                .map(|marker| Issue::new(marker.trim(), self.name, Category::Warning))
        })))
    }
}

/// An executable shell script standing in for a linter.
///
/// The script records its arguments, one per line, before running `body`.
#[cfg(unix)]
pub struct StubTool {
    dir: TempDir,
}

#[cfg(unix)]
impl StubTool {
    pub fn new(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("tool");
        let log = dir.path().join("args");
        let text = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
            log.display(),
            body
        );
        std::fs::write(&script, text).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    /// A tool that prints `report` on stdout and exits with `code`.
    pub fn printing(report: &str, code: i32) -> Self {
        Self::new(&format!("cat <<'REPORT'\n{}\nREPORT\nexit {}", report, code))
    }

    /// A tool that dies with a traceback and no report.
    pub fn crashing() -> Self {
        Self::new("echo 'Traceback (most recent call last):' >&2\nexit 1")
    }

    pub fn program(&self) -> String {
        self.dir.path().join("tool").to_string_lossy().into_owned()
    }

    /// Arguments of the last invocation
    pub fn args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("args"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Shell snippet writing `report` to the path following `flag` in the
/// script's arguments.
#[cfg(unix)]
pub fn write_report_after(flag: &str, report: &str) -> String {
    format!(
        "while [ $# -gt 0 ]; do\n  if [ \"$1\" = '{flag}' ]; then out=\"$2\"; fi\n  shift\ndone\ncat > \"$out\" <<'REPORT'\n{report}\nREPORT"
    )
}
