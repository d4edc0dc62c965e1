//! PMD (Java)

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use super::report_file;
use crate::issue::{Category, Issue};
use crate::linter::{is_blank, read_report, run_tool, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    files: Vec<FileReport>,
}

#[derive(Debug, Deserialize)]
struct FileReport {
    #[serde(default)]
    violations: Vec<Violation>,
}

#[derive(Debug, Deserialize)]
struct Violation {
    rule: String,
    ruleset: String,
}

/// Runs PMD with every built-in Java rule and a JSON report file.
#[derive(Debug, Clone)]
pub struct PmdLinter {
    program: String,
    ruleset: String,
}

impl PmdLinter {
    pub const NAME: &'static str = "PMD";

    pub fn new() -> Self {
        Self {
            program: "pmd".to_string(),
            ruleset: "rulesets/internal/all-java.xml".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different ruleset than every built-in rule
    pub fn with_ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.ruleset = ruleset.into();
        self
    }

    /// Violations are keyed by rule, categorized by their ruleset
    /// ("Best Practices", "Code Style", ...).
    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let report: Report = serde_json::from_str(report)?;
        Ok(LinterResult::from_issues(
            report
                .files
                .iter()
                .flat_map(|file| &file.violations)
                .map(|v| Issue::new(&v.rule, Self::NAME, Category::from_native(&v.ruleset))),
        ))
    }
}

impl Default for PmdLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for PmdLinter {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: Self::NAME,
            needs_checkout: false,
        }
    }

    fn lint(&self, path: &Path) -> Result<LinterResult> {
        let report = report_file::create(path)?;
        let output = run_tool(
            Self::NAME,
            &self.program,
            [
                OsStr::new("-R"),
                OsStr::new(&self.ruleset),
                OsStr::new("-language"),
                OsStr::new("java"),
                OsStr::new("-f"),
                OsStr::new("json"),
                OsStr::new("-r"),
                report.path().as_os_str(),
                OsStr::new("-d"),
                path.as_os_str(),
            ],
            path,
        )?;
        let contents = report_file::read(&report, path)?;
        read_report(Self::NAME, path, &output, &contents, Self::parse_report)
    }
}
