//! Cppcheck (C/C++)

use std::ffi::OsStr;
use std::path::Path;

use thiserror::Error;

use crate::issue::{Category, Issue};
use crate::linter::{read_report, run_tool, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

/// A report line that is not `<id> <severity>`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed line '{0}'")]
pub struct MalformedLine(pub String);

/// Runs cppcheck with every check enabled and a `{id} {severity}` template.
///
/// Include resolution needs the surrounding project, so files are linted on
/// a checked out working tree.
#[derive(Debug, Clone)]
pub struct CppcheckLinter {
    program: String,
}

impl CppcheckLinter {
    pub const NAME: &'static str = "Cppcheck";

    pub fn new() -> Self {
        Self {
            program: "cppcheck".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// One diagnostic per line: `<id> <severity>`.
    pub fn parse_report(report: &str) -> std::result::Result<LinterResult, MalformedLine> {
        let mut issues = Vec::new();
        for line in report.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(id), Some(severity), None) => {
                    issues.push(Issue::new(id, Self::NAME, Category::from_native(severity)));
                }
                _ => return Err(MalformedLine(line.to_string())),
            }
        }
        Ok(LinterResult::from_issues(issues))
    }
}

impl Default for CppcheckLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for CppcheckLinter {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: Self::NAME,
            needs_checkout: true,
        }
    }

    fn lint(&self, path: &Path) -> Result<LinterResult> {
        let output = run_tool(
            Self::NAME,
            &self.program,
            [
                OsStr::new("-q"),
                OsStr::new("-f"),
                OsStr::new("--enable=all"),
                OsStr::new("--suppress=missingInclude"),
                OsStr::new("--suppress=unusedFunction"),
                OsStr::new("--suppress=unmatchedSuppression"),
                OsStr::new("--template={id} {severity}"),
                path.as_os_str(),
            ],
            path,
        )?;
        // diagnostics go to stderr
        let report = format!("{}\n{}", output.stdout, output.stderr);
        read_report(Self::NAME, path, &output, &report, Self::parse_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::error::ContrastError;
    #[cfg(unix)]
    use crate::fakes::StubTool;

    #[test]
    fn test_parse_report() {
        let report = "variableScope style\nvariableScope style\nnullPointer error\n";
        let result = CppcheckLinter::parse_report(report).unwrap();

        assert_eq!(
            result.count(&Issue::new("variableScope", "Cppcheck", Category::Format)),
            2
        );
        assert_eq!(
            result.count(&Issue::new("nullPointer", "Cppcheck", Category::Error)),
            1
        );
    }

    #[test]
    fn test_empty_output() {
        assert!(CppcheckLinter::parse_report("").unwrap().is_identity());
        assert!(CppcheckLinter::parse_report("\n\n").unwrap().is_identity());
    }

    #[test]
    fn test_malformed_line() {
        let err = CppcheckLinter::parse_report("cppcheck: error: could not find or open any of the paths given.")
            .unwrap_err();
        assert!(err.to_string().contains("could not find"));
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_reads_diagnostics_from_stderr() {
        let tool = StubTool::new("echo 'nullPointer error' >&2\necho 'variableScope style' >&2");
        let linter = CppcheckLinter::new().with_program(tool.program());

        let result = linter.lint(Path::new("main.c")).unwrap();

        let args = tool.args();
        assert!(args.contains(&"--template={id} {severity}".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("main.c"));
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.count(&Issue::new("nullPointer", "Cppcheck", Category::Error)),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_clean_file() {
        let tool = StubTool::new("exit 0");
        let linter = CppcheckLinter::new().with_program(tool.program());

        assert!(linter.lint(Path::new("main.c")).unwrap().is_identity());
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_crash_is_failure() {
        let tool = StubTool::new("exit 1");
        let linter = CppcheckLinter::new().with_program(tool.program());

        let err = linter.lint(Path::new("main.c")).unwrap_err();
        assert!(matches!(err, ContrastError::LintToolFailure { .. }));
    }
}
