//! Declared languages and the file extensions that belong to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A programming language a diff can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Java,
    Kotlin,
    C,
    Cpp,
    Haskell,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::Java,
        Language::Kotlin,
        Language::C,
        Language::Cpp,
        Language::Haskell,
    ];

    /// Extensions (with leading dot) considered part of this language
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Python => &[".py"],
            Language::Java => &[".java"],
            Language::Kotlin => &[".kt", ".kts"],
            // C and C++ sources are routinely mixed, so both share one set
            Language::C | Language::Cpp => &[".c", ".cpp", ".h", ".hpp"],
            Language::Haskell => &[".hs"],
        }
    }

    /// Whether the path's extension belongs to this language
    pub fn matches(self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Haskell => "Haskell",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "kotlin" | "kt" => Ok(Language::Kotlin),
            "c" => Ok(Language::C),
            "c++" | "cpp" => Ok(Language::Cpp),
            "haskell" | "hs" => Ok(Language::Haskell),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// Extension of a path with its leading dot, e.g. `.py`
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
}
