//! HLint (Haskell)

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use crate::issue::{Category, Issue};
use crate::linter::{is_blank, read_report, run_tool, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

#[derive(Debug, Deserialize)]
struct Idea {
    hint: String,
    severity: String,
}

/// Runs `hlint --cpp-simple --json <file>`.
#[derive(Debug, Clone)]
pub struct HlintLinter {
    program: String,
}

impl HlintLinter {
    pub const NAME: &'static str = "HLint";

    pub fn new() -> Self {
        Self {
            program: "hlint".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Hints are free text ("Use fewer imports"), so they are normalized
    /// into symbols.
    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let ideas: Vec<Idea> = serde_json::from_str(report)?;
        Ok(LinterResult::from_issues(ideas.iter().map(|idea| {
            Issue::new(&idea.hint, Self::NAME, Category::from_native(&idea.severity))
        })))
    }
}

impl Default for HlintLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for HlintLinter {
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
            [OsStr::new("--cpp-simple"), OsStr::new("--json"), path.as_os_str()],
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
    fn test_parse_report_normalizes_hints() {
        let report = r#"[
            {"module": ["Main"], "decl": ["main"], "severity": "Suggestion",
             "hint": "Eta reduce", "file": "Main.hs", "startLine": 3,
             "from": "f x = g x", "to": "f = g", "note": [], "refactorings": "[]"},
            {"module": ["Main"], "decl": ["foo"], "severity": "Suggestion",
             "hint": "Eta reduce", "file": "Main.hs", "startLine": 7,
             "from": "h y = k y", "to": "h = k", "note": [], "refactorings": "[]"},
            {"module": ["Main"], "decl": [], "severity": "Warning",
             "hint": "Use fewer imports", "file": "Main.hs", "startLine": 1,
             "from": "", "to": null, "note": [], "refactorings": "[]"}
        ]"#;

        let result = HlintLinter::parse_report(report).unwrap();
        assert_eq!(
            result.count(&Issue::new("Eta-reduce", "HLint", Category::Suggestion)),
            2
        );
        assert_eq!(
            result.count(&Issue::new("Use-fewer-imports", "HLint", Category::Warning)),
            1
        );
    }

    #[test]
    fn test_empty_report() {
        assert!(HlintLinter::parse_report("[]").unwrap().is_identity());
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_runs_json_output() {
        let tool = StubTool::printing(
            r#"[{"severity": "Warning", "hint": "Use fewer imports"}]"#,
            1,
        );
        let linter = HlintLinter::new().with_program(tool.program());

        let result = linter.lint(Path::new("Main.hs")).unwrap();

        assert_eq!(tool.args(), ["--cpp-simple", "--json", "Main.hs"]);
        assert_eq!(
            result.count(&Issue::new("Use-fewer-imports", "HLint", Category::Warning)),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_crash_is_failure() {
        let tool = StubTool::crashing();
        let linter = HlintLinter::new().with_program(tool.program());

        let err = linter.lint(Path::new("Main.hs")).unwrap_err();
        assert!(matches!(err, ContrastError::LintToolFailure { .. }));
    }
}
