//! Text and JSON rendering of a diff report

use std::fmt::{self, Write};
use std::path::Path;

use console::Style;
use contrastlib::{ChangeRecord, DiffReport, FileDiff, LinterResult, StructuredReport};

/// Output format selected with `--output-format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub fn render(report: &DiffReport, format: OutputFormat) -> Result<String, anyhow::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(report)?),
        OutputFormat::Json => {
            let mut json = StructuredReport::from_report(report).to_json()?;
            json.push('\n');
            Ok(json)
        }
    }
}

struct Theme {
    heading: Style,
    improved: Style,
    worsened: Style,
    dim: Style,
}

impl Theme {
    fn new() -> Self {
        Self {
            heading: Style::new().bold(),
            improved: Style::new().green(),
            worsened: Style::new().red(),
            dim: Style::new().dim(),
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Heading line for a linted file
fn heading(file: &FileDiff) -> String {
    match &file.change {
        ChangeRecord::Added { path, .. } => format!("File {} was added:", display(path)),
        ChangeRecord::Deleted { path, .. } => format!("File {} was deleted:", display(path)),
        ChangeRecord::Modified {
            pre_path,
            post_path,
            renamed: true,
            ..
        } => format!(
            "File {} was modified and renamed to {}:",
            display(pre_path),
            display(post_path)
        ),
        ChangeRecord::Modified { post_path, .. } => {
            format!("File {} was modified:", display(post_path))
        }
    }
}

/// One line per issue whose count changed, or a no-change note
fn write_changes(
    out: &mut String,
    theme: &Theme,
    pre: &LinterResult,
    post: &LinterResult,
) -> fmt::Result {
    let changes: Vec<_> = LinterResult::compare(pre, post)
        .into_iter()
        .filter(|change| change.net() != 0)
        .collect();

    if changes.is_empty() {
        return writeln!(out, "  {}", theme.dim.apply_to("No change in quality detected."));
    }

    for change in changes {
        let style = if change.is_improvement() {
            &theme.improved
        } else {
            &theme.worsened
        };
        let line = format!("{} {} -> {}", change.issue, change.pre, change.post);
        writeln!(out, "  {}", style.apply_to(line))?;
    }
    Ok(())
}

pub fn render_text(report: &DiffReport) -> Result<String, fmt::Error> {
    let theme = Theme::new();
    let mut out = String::new();

    writeln!(
        out,
        "{}",
        theme.heading.apply_to(format!(
            "Contrasting {}..{}",
            report.from.short(),
            report.to.short()
        ))
    )?;
    writeln!(out)?;

    for file in &report.files {
        writeln!(out, "{}", theme.heading.apply_to(heading(file)))?;
        write_changes(&mut out, &theme, &file.pre, &file.post)?;
        writeln!(out)?;
    }

    writeln!(out, "{}", theme.heading.apply_to("Overall change in quality:"))?;
    write_changes(&mut out, &theme, &report.pre_total, &report.post_total)?;

    if !report.failures.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            theme.worsened.apply_to(format!(
                "{} file(s) could not be linted:",
                report.failures.len()
            ))
        )?;
        for failure in &report.failures {
            writeln!(out, "  {}: {}", display(&failure.path), failure.error)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrastlib::{BlobId, Category, ChangeKind, CommitId, FileFailure, Issue};
    use std::path::PathBuf;

    fn issue(name: &str) -> Issue {
        Issue::new(name, "Pylint", Category::Warning)
    }

    fn blob(id: &str) -> BlobId {
        BlobId(id.to_string())
    }

    fn report(files: Vec<FileDiff>) -> DiffReport {
        let mut report = DiffReport::new(
            CommitId("1111111111".into()),
            CommitId("2222222222".into()),
        );
        for file in &files {
            report.pre_total += &file.pre;
            report.post_total += &file.post;
            report.net_total += &file.net;
        }
        report.files = files;
        report
    }

    fn plain(report: &DiffReport) -> String {
        console::set_colors_enabled(false);
        render_text(report).unwrap()
    }

    #[test]
    fn test_headings() {
        let added = FileDiff::new(
            ChangeRecord::Added {
                path: PathBuf::from("a.py"),
                blob: blob("1"),
            },
            ChangeKind::Added,
            "Pylint",
            LinterResult::new(),
            LinterResult::new(),
        );
        let renamed = FileDiff::new(
            ChangeRecord::Modified {
                pre_path: PathBuf::from("old.py"),
                pre_blob: blob("2"),
                post_path: PathBuf::from("new.py"),
                post_blob: blob("3"),
                renamed: true,
            },
            ChangeKind::Modified,
            "Pylint",
            LinterResult::new(),
            LinterResult::new(),
        );

        assert_eq!(heading(&added), "File a.py was added:");
        assert_eq!(
            heading(&renamed),
            "File old.py was modified and renamed to new.py:"
        );
    }

    #[test]
    fn test_text_lists_changed_issues() {
        let file = FileDiff::new(
            ChangeRecord::Modified {
                pre_path: PathBuf::from("app.py"),
                pre_blob: blob("1"),
                post_path: PathBuf::from("app.py"),
                post_blob: blob("2"),
                renamed: false,
            },
            ChangeKind::Modified,
            "Pylint",
            LinterResult::from_counts([(issue("unused-import"), 2), (issue("kept"), 1)]),
            LinterResult::from_counts([(issue("unused-import"), 1), (issue("kept"), 1)]),
        );

        let text = plain(&report(vec![file]));

        assert!(text.contains("Contrasting 11111111..22222222"));
        assert!(text.contains("File app.py was modified:"));
        assert!(text.contains("unused-import 2 -> 1"));
        assert!(!text.contains("kept"));
        assert!(text.contains("Overall change in quality:"));
    }

    #[test]
    fn test_text_no_change() {
        let file = FileDiff::new(
            ChangeRecord::Deleted {
                path: PathBuf::from("empty.py"),
                blob: blob("1"),
            },
            ChangeKind::Deleted,
            "Pylint",
            LinterResult::new(),
            LinterResult::new(),
        );

        let text = plain(&report(vec![file]));

        assert!(text.contains("File empty.py was deleted:"));
        assert_eq!(text.matches("No change in quality detected.").count(), 2);
    }

    #[test]
    fn test_text_lists_failures_last() {
        let mut report = report(Vec::new());
        report.failures.push(FileFailure {
            path: PathBuf::from("bad.py"),
            linter: "Pylint".into(),
            error: "Pylint failed on 'bad.py': boom".into(),
        });

        let text = plain(&report);

        let overall = text.find("Overall change in quality:").unwrap();
        let failures = text.find("1 file(s) could not be linted:").unwrap();
        assert!(overall < failures);
        assert!(text.contains("bad.py: Pylint failed on 'bad.py': boom"));
    }

    #[test]
    fn test_json_render() {
        let output = render(&report(Vec::new()), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["added"], 0);
        assert!(value["results"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_name("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("csv"), None);
    }
}
