//! Routing of files to linters by extension.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::ContrastError;
use crate::language::{extension_of, Language};
use crate::linter::Linter;
use crate::linters::{self, FlawfinderLinter, HlintLinter, KtlintLinter, PmdLinter, PylintLinter};
use crate::Result;

/// Maps file extensions (with leading dot) to linters.
#[derive(Debug, Clone)]
pub struct LinterRegistry {
    linters: BTreeMap<String, Arc<dyn Linter>>,
}

impl Default for LinterRegistry {
    /// The stock routing: flawfinder for C/C++, HLint for Haskell, PMD for
    /// Java, ktlint for Kotlin and Pylint for Python.
    fn default() -> Self {
        let flawfinder: Arc<dyn Linter> = Arc::new(FlawfinderLinter::new());
        let ktlint: Arc<dyn Linter> = Arc::new(KtlintLinter::new());

        Self::empty()
            .with(".c", flawfinder.clone())
            .with(".cpp", flawfinder.clone())
            .with(".h", flawfinder.clone())
            .with(".hpp", flawfinder)
            .with(".hs", Arc::new(HlintLinter::new()))
            .with(".java", Arc::new(PmdLinter::new()))
            .with(".kt", ktlint.clone())
            .with(".kts", ktlint)
            .with(".py", Arc::new(PylintLinter::new()))
    }
}

impl LinterRegistry {
    /// A registry that routes nothing
    pub fn empty() -> Self {
        Self {
            linters: BTreeMap::new(),
        }
    }

    /// Route `extension` to `linter`, replacing any previous route.
    pub fn with(mut self, extension: &str, linter: Arc<dyn Linter>) -> Self {
        self.linters.insert(normalize_extension(extension), linter);
        self
    }

    /// Apply an `EXT=NAME` override such as `.c=cppcheck`.
    pub fn with_override(self, spec: &str) -> Result<Self> {
        let (extension, name) = spec.split_once('=').ok_or_else(|| {
            ContrastError::Configuration(format!(
                "invalid linter override '{}', expected EXT=NAME",
                spec
            ))
        })?;
        let extension = extension.trim();
        if extension.trim_start_matches('.').is_empty() {
            return Err(ContrastError::Configuration(format!(
                "invalid linter override '{}': empty extension",
                spec
            )));
        }
        let linter = linters::by_name(name.trim()).ok_or_else(|| {
            ContrastError::Configuration(format!(
                "unknown linter '{}', expected one of: {}",
                name.trim(),
                linters::NAMES.join(", ")
            ))
        })?;
        Ok(self.with(extension, linter))
    }

    /// Linter for a path, constrained to `language` when one is declared.
    ///
    /// With a language filter, a path whose extension is outside the
    /// language's extension set gets no linter even if one is registered for
    /// that extension.
    pub fn select(&self, path: &Path, language: Option<Language>) -> Option<Arc<dyn Linter>> {
        if let Some(language) = language {
            if !language.matches(path) {
                return None;
            }
        }
        let extension = extension_of(path)?;
        self.linters.get(&extension).cloned()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.linters.keys().map(String::as_str)
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}
