//! OCLint (C/C++/Objective-C)
//!
//! OCLint resolves headers through the project, so it is linted on a
//! checked out working tree.

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
    violation: Vec<Violation>,
}

#[derive(Debug, Deserialize)]
struct Violation {
    rule: String,
    category: String,
}

/// Runs `oclint --report-type=json` with priority thresholds lifted so the
/// tool never aborts on the number of violations.
#[derive(Debug, Clone)]
pub struct OclintLinter {
    program: String,
}

impl OclintLinter {
    pub const NAME: &'static str = "OCLint";

    pub fn new() -> Self {
        Self {
            program: "oclint".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let report: Report = serde_json::from_str(report)?;
        Ok(LinterResult::from_issues(report.violation.iter().map(|v| {
            Issue::new(&v.rule, Self::NAME, Category::from_native(&v.category))
        })))
    }
}

impl Default for OclintLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for OclintLinter {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            name: Self::NAME,
            needs_checkout: true,
        }
    }

    fn lint(&self, path: &Path) -> Result<LinterResult> {
        let report = report_file::create(path)?;
        let output = run_tool(
            Self::NAME,
            &self.program,
            [
                OsStr::new("--report-type=json"),
                OsStr::new("-o"),
                report.path().as_os_str(),
                OsStr::new("--max-priority-1=999999"),
                OsStr::new("--max-priority-2=999999"),
                OsStr::new("--max-priority-3=999999"),
                path.as_os_str(),
            ],
            path,
        )?;
        let contents = report_file::read(&report, path)?;
        read_report(Self::NAME, path, &output, &contents, Self::parse_report)
    }
}
