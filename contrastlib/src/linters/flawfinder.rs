//! flawfinder (C/C++), read through its SARIF output.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use crate::issue::{Category, Issue};
use crate::linter::{is_blank, read_report, run_tool, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

#[derive(Debug, Default, Deserialize)]
struct SarifLog {
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct Run {
    tool: Tool,
    #[serde(default)]
    results: Vec<SarifResult>,
}

#[derive(Debug, Deserialize)]
struct Tool {
    driver: Driver,
}

#[derive(Debug, Deserialize)]
struct Driver {
    #[serde(default)]
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize)]
struct Rule {
    id: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    /// SARIF defaults a missing level to "warning"
    level: Option<String>,
}

/// Runs `flawfinder --sarif <file>`.
#[derive(Debug, Clone)]
pub struct FlawfinderLinter {
    program: String,
}

impl FlawfinderLinter {
    pub const NAME: &'static str = "flawfinder";

    pub fn new() -> Self {
        Self {
            program: "flawfinder".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Issues are keyed by the rule *name* (e.g. `buffer/strcpy`), looked up
    /// from the rule id of each result; unknown ids fall back to the id.
    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let log: SarifLog = serde_json::from_str(report)?;

        let mut issues = Vec::new();
        for run in &log.runs {
            let names: HashMap<&str, &str> = run
                .tool
                .driver
                .rules
                .iter()
                .filter_map(|rule| rule.name.as_deref().map(|name| (rule.id.as_str(), name)))
                .collect();

            for result in &run.results {
                let name = names
                    .get(result.rule_id.as_str())
                    .copied()
                    .unwrap_or(result.rule_id.as_str());
                let level = result.level.as_deref().unwrap_or("warning");
                issues.push(Issue::new(name, Self::NAME, Category::from_native(level)));
            }
        }

        Ok(LinterResult::from_issues(issues))
    }
}

impl Default for FlawfinderLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for FlawfinderLinter {
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
            [OsStr::new("--sarif"), path.as_os_str()],
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

    const REPORT: &str = r#"{
        "$schema": "https://schemastore.azurewebsites.net/schemas/json/sarif-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {"driver": {"name": "Flawfinder", "rules": [
                {"id": "FF1001", "name": "buffer/char", "shortDescription": {"text": "x"}},
                {"id": "FF1012", "name": "buffer/strcpy"}
            ]}},
            "results": [
                {"ruleId": "FF1001", "level": "note", "message": {"text": "a"}},
                {"ruleId": "FF1012", "level": "error", "message": {"text": "b"}},
                {"ruleId": "FF1012", "level": "error", "message": {"text": "c"}},
                {"ruleId": "FF9999", "message": {"text": "d"}}
            ]
        }]
    }"#;

    #[test]
    fn test_parse_report_uses_rule_names() {
        let result = FlawfinderLinter::parse_report(REPORT).unwrap();

        let strcpy = Issue::new("buffer-strcpy", "flawfinder", Category::Error);
        let char_buf = Issue::new("buffer-char", "flawfinder", Category::Information);
        let unknown = Issue::new("FF9999", "flawfinder", Category::Warning);

        assert_eq!(result.count(&strcpy), 2);
        assert_eq!(result.count(&char_buf), 1);
        assert_eq!(result.count(&unknown), 1);
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn test_run_without_results() {
        let report = r#"{"runs": [{"tool": {"driver": {"rules": []}}, "results": []}]}"#;
        assert!(FlawfinderLinter::parse_report(report).unwrap().is_identity());
        assert!(FlawfinderLinter::parse_report("{}").unwrap().is_identity());
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_runs_sarif_output() {
        let tool = StubTool::printing(REPORT, 0);
        let linter = FlawfinderLinter::new().with_program(tool.program());

        let result = linter.lint(Path::new("main.c")).unwrap();

        assert_eq!(tool.args(), ["--sarif", "main.c"]);
        assert_eq!(
            result.count(&Issue::new("buffer-strcpy", "flawfinder", Category::Error)),
            2
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_crash_is_failure() {
        let tool = StubTool::crashing();
        let linter = FlawfinderLinter::new().with_program(tool.program());

        let err = linter.lint(Path::new("main.c")).unwrap_err();
        assert!(matches!(err, ContrastError::LintToolFailure { .. }));
    }
}
