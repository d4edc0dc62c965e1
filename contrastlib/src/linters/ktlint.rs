//! ktlint (Kotlin)

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use crate::issue::{Category, Issue};
use crate::linter::{is_blank, read_report, run_tool, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

#[derive(Debug, Deserialize)]
struct FileReport {
    #[serde(default)]
    errors: Vec<LintError>,
}

#[derive(Debug, Deserialize)]
struct LintError {
    rule: String,
}

/// Runs `ktlint --reporter=json <file>`.
#[derive(Debug, Clone)]
pub struct KtlintLinter {
    program: String,
}

impl KtlintLinter {
    pub const NAME: &'static str = "ktlint";

    pub fn new() -> Self {
        Self {
            program: "ktlint".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// ktlint rules carry no severity; everything it reports is formatting.
    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let files: Vec<FileReport> = serde_json::from_str(report)?;
        Ok(LinterResult::from_issues(
            files
                .iter()
                .flat_map(|file| &file.errors)
                .map(|error| Issue::new(&error.rule, Self::NAME, Category::Format)),
        ))
    }
}

impl Default for KtlintLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for KtlintLinter {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: Self::NAME,
            needs_checkout: false,
        }
    }

    fn lint(&self, path: &Path) -> Result<LinterResult> {
        let output = run_tool(
            Self::NAME,
            &self.program,
            [OsStr::new("--reporter=json"), path.as_os_str()],
            path,
        )?;
        read_report(Self::NAME, path, &output, &output.stdout, Self::parse_report)
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
        let report = r#"[{"file": "/tmp/Main.kt", "errors": [
            {"line": 1, "column": 1, "message": "Unexpected blank line(s)", "rule": "standard:no-blank-line-before-rbrace"},
            {"line": 4, "column": 9, "message": "Missing newline", "rule": "standard:no-blank-line-before-rbrace"},
            {"line": 9, "column": 1, "message": "Wildcard import", "rule": "no-wildcard-imports"}
        ]}]"#;

        let result = KtlintLinter::parse_report(report).unwrap();
        assert_eq!(
            result.count(&Issue::new(
                "standard:no-blank-line-before-rbrace",
                "ktlint",
                Category::Format
            )),
            2
        );
        assert_eq!(
            result.count(&Issue::new("no-wildcard-imports", "ktlint", Category::Format)),
            1
        );
    }

    #[test]
    fn test_no_files_means_no_issues() {
        assert!(KtlintLinter::parse_report("[]").unwrap().is_identity());
        assert!(KtlintLinter::parse_report(r#"[{"file": "a.kt", "errors": []}]"#)
            .unwrap()
            .is_identity());
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_runs_json_reporter() {
        let tool = StubTool::printing(
            r#"[{"file": "Main.kt", "errors": [{"rule": "no-wildcard-imports"}]}]"#,
            1,
        );
        let linter = KtlintLinter::new().with_program(tool.program());

        let result = linter.lint(Path::new("Main.kt")).unwrap();

        assert_eq!(tool.args(), ["--reporter=json", "Main.kt"]);
        assert_eq!(
            result.count(&Issue::new("no-wildcard-imports", "ktlint", Category::Format)),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_crash_is_failure() {
        let tool = StubTool::crashing();
        let linter = KtlintLinter::new().with_program(tool.program());

        let err = linter.lint(Path::new("Main.kt")).unwrap_err();
        assert!(matches!(err, ContrastError::LintToolFailure { .. }));
    }
}
