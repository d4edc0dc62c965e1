//! The linter adapter interface.
//!
//! A [`Linter`] wraps one external static-analysis tool. It runs the tool on
//! a single file and normalizes the tool's report into a [`LinterResult`].
//! Adapters hold no per-file state and are shared between files.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::error::ContrastError;
use crate::result::LinterResult;
use crate::Result;

/// Static identity of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Namespace for the adapter's issues, and the name used in reports
    pub name: &'static str,
    /// The tool needs the whole project checked out (e.g. to resolve
    /// includes) instead of an isolated copy of the file
    pub needs_checkout: bool,
}

/// An external linter.
pub trait Linter: Send + Sync {
    fn descriptor(&self) -> Descriptor;

    /// Run the tool on `path` and count the issues it reports.
    ///
    /// An empty report from a tool that exited cleanly is the identity
    /// result. A tool that cannot be started, crashes without a report, or
    /// whose report cannot be parsed yields
    /// [`ContrastError::LintToolFailure`].
    fn lint(&self, path: &Path) -> Result<LinterResult>;

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn needs_checkout(&self) -> bool {
        self.descriptor().needs_checkout
    }
}

impl fmt::Debug for dyn Linter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptor = self.descriptor();
        f.debug_struct("Linter")
            .field("name", &descriptor.name)
            .field("needs_checkout", &descriptor.needs_checkout)
            .finish()
    }
}

/// Captured output of one tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// The tool exited nonzero or wrote to stderr.
    ///
    /// Only meaningful together with a blank report: most linters exit
    /// nonzero whenever they found something.
    pub fn complained(&self) -> bool {
        !self.status.success() || !self.stderr.trim().is_empty()
    }
}

/// Run `program` with `args` and wait for it to exit.
///
/// The exit status is not interpreted here.
pub fn run_tool<I, S>(linter: &str, program: &str, args: I, path: &Path) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!(linter, command = ?command, "running linter");

    let output = command.output().map_err(|e| {
        ContrastError::lint_failure(linter, path, format!("failed to run `{}`: {}", program, e))
    })?;

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

const STDERR_EXCERPT: usize = 400;

/// Build the failure for a tool run that did not produce a usable report.
pub fn tool_failure(
    linter: &str,
    path: &Path,
    output: &ToolOutput,
    reason: impl fmt::Display,
) -> ContrastError {
    let stderr = output.stderr.trim();
    let excerpt: String = stderr.chars().take(STDERR_EXCERPT).collect();
    let mut message = format!("{}, {}", reason, output.status);
    if !excerpt.is_empty() {
        message.push_str(": ");
        message.push_str(&excerpt);
    }
    ContrastError::lint_failure(linter, path, message)
}

/// Build the failure for a report that could not be understood.
pub fn unparsable_report(
    linter: &str,
    path: &Path,
    output: &ToolOutput,
    reason: impl fmt::Display,
) -> ContrastError {
    tool_failure(linter, path, output, format!("unparsable report ({})", reason))
}

/// Parse `report` with `parse`, refusing a blank report from a tool that
/// complained: that is a crash, not a clean file.
pub(crate) fn read_report<E: fmt::Display>(
    linter: &str,
    path: &Path,
    output: &ToolOutput,
    report: &str,
    parse: impl FnOnce(&str) -> std::result::Result<LinterResult, E>,
) -> Result<LinterResult> {
    if is_blank(report) && output.complained() {
        return Err(tool_failure(linter, path, output, "no report"));
    }
    parse(report).map_err(|e| unparsable_report(linter, path, output, e))
}

/// Whether a report is empty
pub(crate) fn is_blank(report: &str) -> bool {
    report.trim().is_empty()
}
