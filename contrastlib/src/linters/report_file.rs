//! Temporary report files for tools that cannot write to stdout.

use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ContrastError;
use crate::Result;

/// Create an empty file for a tool to write its report into.
///
/// The file is removed when the returned handle is dropped.
pub(crate) fn create(linted: &Path) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix("git-contrast-report-")
        .suffix(".json")
        .tempfile()
        .map_err(|e| {
            ContrastError::resource(linted, format!("failed to create report file: {}", e))
        })
}

/// Read the report back. A report the tool never wrote reads as empty.
pub(crate) fn read(report: &NamedTempFile, linted: &Path) -> Result<String> {
    std::fs::read(report.path())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| ContrastError::resource(linted, format!("failed to read report file: {}", e)))
}
