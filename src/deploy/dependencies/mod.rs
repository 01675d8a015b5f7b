//! Dependency changes between two revisions of a manifest or lockfile.

mod elm;
mod javascript;
mod ruby;

pub use elm::ElmPackages;
pub use javascript::JavascriptPackages;
pub use ruby::RubyGems;

use crate::git::GitRepo;
use crate::{log_debug, log_warn};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;

/// A resolved dependency as recorded in one revision of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub version: String,
    /// Where the dependency comes from when not the default registry
    pub source: Option<String>,
}

impl Dependency {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Dependencies by name
pub type Dependencies = BTreeMap<String, Dependency>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyChange {
    Added {
        name: String,
        new: Dependency,
    },
    Removed {
        name: String,
        old: Dependency,
    },
    Updated {
        name: String,
        old: Dependency,
        new: Dependency,
    },
}

impl DependencyChange {
    /// Render as a report line attributed to `file`.
    pub fn describe(&self, file: &str) -> String {
        match self {
            Self::Added { name, new } => format!("Added {name}: {} ({file})", new.version),
            Self::Removed { name, old } => format!("Removed {name}: {} ({file})", old.version),
            Self::Updated { name, old, new } => {
                let source = new
                    .source
                    .as_ref()
                    .map(|s| format!(" ({s})"))
                    .unwrap_or_default();
                format!(
                    "Updated {name}: {} -> {}{source} ({file})",
                    old.version, new.version
                )
            }
        }
    }
}

impl fmt::Display for DependencyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { name, new } => write!(f, "+{name} {}", new.version),
            Self::Removed { name, old } => write!(f, "-{name} {}", old.version),
            Self::Updated { name, old, new } => {
                write!(f, "~{name} {} -> {}", old.version, new.version)
            }
        }
    }
}

/// Additions, then removals, then updates; each sorted by name.
pub fn compare_dependencies(old: &Dependencies, new: &Dependencies) -> Vec<DependencyChange> {
    let added = new
        .iter()
        .filter(|(name, _)| !old.contains_key(*name))
        .map(|(name, dep)| DependencyChange::Added {
            name: name.clone(),
            new: dep.clone(),
        });
    let removed = old
        .iter()
        .filter(|(name, _)| !new.contains_key(*name))
        .map(|(name, dep)| DependencyChange::Removed {
            name: name.clone(),
            old: dep.clone(),
        });
    let updated = old.iter().filter_map(|(name, old_dep)| {
        let new_dep = new.get(name)?;
        (new_dep != old_dep).then(|| DependencyChange::Updated {
            name: name.clone(),
            old: old_dep.clone(),
            new: new_dep.clone(),
        })
    });

    added.chain(removed).chain(updated).collect()
}

/// A dependency file format the deploy report knows how to read
pub trait DependencyFile {
    /// Section heading in the report
    fn heading(&self) -> &'static str;

    fn parse(&self, content: &str) -> Result<Dependencies>;

    /// Report lines for the changes between two versions of a file.
    fn changes(&self, file: &str, old: &str, new: &str) -> Result<Vec<String>> {
        let old = self.parse(old)?;
        let new = self.parse(new)?;
        Ok(compare_dependencies(&old, &new)
            .iter()
            .map(|change| change.describe(file))
            .collect())
    }
}

/// Reads dependency files at two revisions and reports what changed.
pub struct RevisionComparator<'a> {
    git_repo: &'a GitRepo,
    base: &'a str,
    to: &'a str,
}

impl<'a> RevisionComparator<'a> {
    pub fn new(git_repo: &'a GitRepo, base: &'a str, to: &'a str) -> Self {
        Self { git_repo, base, to }
    }

    /// Change lines for every file; missing files count as empty.
    /// A file that fails to parse at either revision is skipped with a warning.
    pub fn compare(&self, kind: &dyn DependencyFile, files: &[String]) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for file in files {
            let old = self.git_repo.file_at(self.base, file)?.unwrap_or_default();
            let new = self.git_repo.file_at(self.to, file)?.unwrap_or_default();
            match kind.changes(file, &old, &new) {
                Ok(changes) => {
                    log_debug!("{} dependency change(s) in {}", changes.len(), file);
                    lines.extend(changes);
                }
                Err(e) => log_warn!("Skipping {}: {}", file, e),
            }
        }
        Ok(lines)
    }
}
