//! Adapters for the supported external linters.
//!
//! | adapter | language | checkout |
//! |---------|----------|----------|
//! | [`PylintLinter`] | Python | no |
//! | [`FlawfinderLinter`] | C/C++ | no |
//! | [`HlintLinter`] | Haskell | no |
//! | [`KtlintLinter`] | Kotlin | no |
//! | [`PmdLinter`] | Java | no |
//! | [`CppcheckLinter`] | C/C++ | yes |
//! | [`OclintLinter`] | C/C++ | yes |

pub mod cppcheck;
pub mod flawfinder;
pub mod hlint;
pub mod ktlint;
pub mod oclint;
pub mod pmd;
pub mod pylint;
mod report_file;

use std::sync::Arc;

pub use cppcheck::CppcheckLinter;
pub use flawfinder::FlawfinderLinter;
pub use hlint::HlintLinter;
pub use ktlint::KtlintLinter;
pub use oclint::OclintLinter;
pub use pmd::PmdLinter;
pub use pylint::PylintLinter;

use crate::linter::Linter;

/// Names accepted by [`by_name`]
pub const NAMES: [&str; 7] = [
    "pylint",
    "flawfinder",
    "hlint",
    "ktlint",
    "pmd",
    "cppcheck",
    "oclint",
];

/// Look up an adapter by name, ignoring case.
pub fn by_name(name: &str) -> Option<Arc<dyn Linter>> {
    let linter: Arc<dyn Linter> = match name.to_lowercase().as_str() {
        "pylint" => Arc::new(PylintLinter::new()),
        "flawfinder" => Arc::new(FlawfinderLinter::new()),
        "hlint" => Arc::new(HlintLinter::new()),
        "ktlint" => Arc::new(KtlintLinter::new()),
        "pmd" => Arc::new(PmdLinter::new()),
        "cppcheck" => Arc::new(CppcheckLinter::new()),
        "oclint" => Arc::new(OclintLinter::new()),
        _ => return None,
    };
    Some(linter)
}
