//! Pylint (Python)

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use crate::issue::{Category, Issue};
use crate::linter::{is_blank, read_report, run_tool, tool_failure, Descriptor, Linter};
use crate::result::LinterResult;
use crate::Result;

/// One entry of `pylint --output-format=json`
#[derive(Debug, Deserialize)]
struct Message {
    symbol: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Exit status bits for a fatal message (1) and a usage error (32)
const FATAL_OR_USAGE: i32 = 1 | 32;

/// Runs `pylint --output-format=json <file>`.
#[derive(Debug, Clone)]
pub struct PylintLinter {
    program: String,
}

impl PylintLinter {
    pub const NAME: &'static str = "Pylint";

    pub fn new() -> Self {
        Self {
            program: "pylint".to_string(),
        }
    }

    /// Use a different executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Count the messages of a JSON report, keyed by message symbol.
    pub fn parse_report(report: &str) -> serde_json::Result<LinterResult> {
        if is_blank(report) {
            return Ok(LinterResult::new());
        }
        let messages: Vec<Message> = serde_json::from_str(report)?;
        Ok(LinterResult::from_issues(messages.iter().map(|m| {
            Issue::new(&m.symbol, Self::NAME, Category::from_native(&m.kind))
        })))
    }
}

impl Default for PylintLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Linter for PylintLinter {
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
            [OsStr::new("--output-format=json"), path.as_os_str()],
            path,
        )?;
        if output.status.code().is_some_and(|code| code & FATAL_OR_USAGE != 0) {
            return Err(tool_failure(Self::NAME, path, &output, "fatal error or usage error"));
        }
        read_report(Self::NAME, path, &output, &output.stdout, Self::parse_report)
    }
}
