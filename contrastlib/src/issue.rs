//! Issue taxonomy.
//!
//! Every external tool speaks its own vocabulary. This module maps that
//! vocabulary onto two things:
//!
//! - [`Category`]: a small closed set of issue categories with a stable label
//!   and description.
//! - [`Issue`]: the linter-scoped issue symbol, identified by the triple
//!   `(symbolic_name, linter, category)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Format,
    Documentation,
    Convention,
    Refactor,
    Design,
    BestPractice,
    Performance,
    Portability,
    Security,
    Warning,
    Error,
    Fatal,
    Hint,
    Suggestion,
    Information,
    Uncategorized,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 16] = [
        Category::Format,
        Category::Documentation,
        Category::Convention,
        Category::Refactor,
        Category::Design,
        Category::BestPractice,
        Category::Performance,
        Category::Portability,
        Category::Security,
        Category::Warning,
        Category::Error,
        Category::Fatal,
        Category::Hint,
        Category::Suggestion,
        Category::Information,
        Category::Uncategorized,
    ];

    /// Stable label and human readable description
    pub fn describe(self) -> (&'static str, &'static str) {
        match self {
            Category::Format => ("format", "Formatting and code style"),
            Category::Documentation => ("documentation", "Missing or malformed documentation"),
            Category::Convention => ("convention", "Violation of a coding convention"),
            Category::Refactor => ("refactor", "Code that should be refactored"),
            Category::Design => ("design", "Questionable design"),
            Category::BestPractice => ("best-practice", "Deviation from best practices"),
            Category::Performance => ("performance", "Potential performance problem"),
            Category::Portability => ("portability", "Non-portable construct"),
            Category::Security => ("security", "Potential security flaw"),
            Category::Warning => ("warning", "Likely bug or dangerous construct"),
            Category::Error => ("error", "Probable bug"),
            Category::Fatal => ("fatal", "Analysis could not complete"),
            Category::Hint => ("hint", "Hint for a simpler construct"),
            Category::Suggestion => ("suggestion", "Suggested improvement"),
            Category::Information => ("information", "Informational message"),
            Category::Uncategorized => ("uncategorized", "Issue without a known category"),
        }
    }

    pub fn label(self) -> &'static str {
        self.describe().0
    }

    /// Map a tool's native severity or ruleset name onto a category.
    ///
    /// Matching ignores case, whitespace, `-` and `_`, so `"Best Practices"`,
    /// `"best-practices"` and `"bestpractices"` are the same thing.
    pub fn from_native(native: &str) -> Self {
        let key: String = native
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "format" | "formatting" | "style" | "codestyle" => Category::Format,
            "documentation" | "docs" => Category::Documentation,
            "convention" | "naming" => Category::Convention,
            "refactor" | "redundant" | "unused" | "size" => Category::Refactor,
            "design" | "cocoa" | "migration" => Category::Design,
            "bestpractice" | "bestpractices" | "basic" | "empty" => Category::BestPractice,
            "performance" | "multithreading" => Category::Performance,
            "portability" => Category::Portability,
            "security" => Category::Security,
            "warning" => Category::Warning,
            "error" | "errorprone" => Category::Error,
            "fatal" => Category::Fatal,
            "hint" | "ignore" => Category::Hint,
            "suggestion" => Category::Suggestion,
            "info" | "information" | "note" | "none" => Category::Information,
            _ => Category::Uncategorized,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize a native issue name into a symbolic identifier.
///
/// Spaces and slashes become `-`; surrounding whitespace is dropped.
pub fn normalize_symbol(native: &str) -> String {
    native
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .collect()
}

/// One kind of issue, scoped to the linter that reports it.
///
/// Two issues are the same only if name, linter and category all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Issue {
    /// Normalized native identifier (e.g. `missing-docstring`)
    pub symbolic_name: String,
    /// Name of the linter that reported it
    pub linter: String,
    pub category: Category,
}

impl Issue {
    /// Create an issue, normalizing the native name.
    pub fn new(native_name: &str, linter: &str, category: Category) -> Self {
        Self {
            symbolic_name: normalize_symbol(native_name),
            linter: linter.to_string(),
            category,
        }
    }

    /// Category and a one-line description of this issue
    pub fn describe(&self) -> (Category, String) {
        let (_, text) = self.category.describe();
        (
            self.category,
            format!("{} ({}): {}", self.symbolic_name, self.linter, text),
        )
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbolic_name)
    }
}
