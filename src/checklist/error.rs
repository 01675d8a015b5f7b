//! Checklist definition errors.

use std::path::PathBuf;

/// Errors raised while assembling the checklist registry.
///
/// All of these surface before any matching happens; a registry that
/// builds successfully never fails at match time.
#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    #[error("failed to read checklist file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse checklist definitions{}: {source}", display_path(path.as_deref()))]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    #[error("checklist '{name}' has an invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        name: String,
        pattern: String,
        source: regex::Error,
    },
    #[error("checklist '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("checklist '{0}' does not match any paths; add prefixes, exact, contains, suffixes or patterns")]
    NoMatchers(String),
    #[error("checklist definitions must have a non-empty name")]
    EmptyName,
}

fn display_path(path: Option<&std::path::Path>) -> String {
    path.map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}
