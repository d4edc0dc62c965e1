//! # git-contrast
//!
//! A CLI tool that reveals the change in code quality between two commits.
//!
//! ## Overview
//!
//! git-contrast is built on top of contrastlib. For every file changed in a
//! commit range it runs the linter for the file's language on the old and the
//! new version, and reports which issues appeared or went away, per file and
//! overall.
//!
//! ## Usage
//!
//! ```bash
//! # Changes introduced by the last five commits
//! git-contrast HEAD~5..HEAD
//!
//! # Compare two branches, Python files only
//! git-contrast main feature-branch --language python
//!
//! # Machine readable output
//! git-contrast v1.0 --output-format json
//!
//! # Use Cppcheck instead of flawfinder for C sources
//! git-contrast HEAD~1 --linter .c=cppcheck --linter .h=cppcheck
//! ```

mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use contrastlib::{
    diff_range, linters, DiffOptions, FailurePolicy, GitRepository, Language, LinterRegistry,
};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use render::{render, OutputFormat};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("git-contrast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reveal the change in code quality between two commits")
        .arg(
            Arg::new("range")
                .value_name("COMMIT_RANGE")
                .required(true)
                .num_args(1..=2)
                .help("Commit range: 'from..to', 'from to', or 'from' (compared to HEAD)"),
        )
        .arg(
            Arg::new("output-format")
                .short('o')
                .long("output-format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .help("Only lint files of this language (python, java, kotlin, c, c++, haskell)"),
        )
        .arg(
            Arg::new("on-failure")
                .long("on-failure")
                .value_parser(["degrade", "abort"])
                .default_value("degrade")
                .help("What to do when a file cannot be linted"),
        )
        .arg(
            Arg::new("linter")
                .long("linter")
                .value_name("EXT=NAME")
                .action(ArgAction::Append)
                .help(linter_help()),
        )
        .arg(
            Arg::new("repo")
                .short('C')
                .long("repo")
                .value_name("PATH")
                .default_value(".")
                .help("Path to the repository"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log progress to stderr"),
        )
}

fn linter_help() -> String {
    let registry = LinterRegistry::default();
    let extensions: Vec<&str> = registry.extensions().collect();
    format!(
        "Route an extension to a linter (can be specified multiple times). Linters: {}. Routed by default: {}",
        linters::NAMES.join(", "),
        extensions.join(" ")
    )
}

/// Install the stderr logger. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

/// Build diff options from matches
fn build_options(matches: &ArgMatches) -> Result<DiffOptions, anyhow::Error> {
    let mut registry = LinterRegistry::default();
    if let Some(overrides) = matches.get_many::<String>("linter") {
        for spec in overrides {
            registry = registry.with_override(spec)?;
        }
    }

    let policy = matches
        .get_one::<String>("on-failure")
        .map(|s| s.parse::<FailurePolicy>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let mut options = DiffOptions::new().registry(registry).failure_policy(policy);

    if let Some(language) = matches.get_one::<String>("language") {
        let language: Language = language.parse().map_err(anyhow::Error::msg)?;
        options = options.language(language);
    }

    Ok(options)
}

fn run(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let range: Vec<String> = matches
        .get_many::<String>("range")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let path = matches
        .get_one::<String>("repo")
        .map(|s| s.as_str())
        .unwrap_or(".");
    let format = matches
        .get_one::<String>("output-format")
        .and_then(|s| OutputFormat::from_name(s))
        .unwrap_or(OutputFormat::Text);

    let options = build_options(matches)?;
    debug!(repo = path, range = ?range, "discovering repository");
    let repo = GitRepository::discover(path)?;
    let report = diff_range(&repo, &range, &options)
        .with_context(|| format!("failed to contrast '{}'", range.join(" ")))?;

    render(&report, format)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
