//! Matches changed files against a checklist registry.

use super::registry::ChecklistRegistry;
use super::rule::Checklist;
use std::sync::Arc;

/// A checklist together with the changed files that triggered it.
#[derive(Debug, Clone)]
pub struct ChecklistMatch {
    pub checklist: Arc<dyn Checklist>,
    /// Never empty; input order, duplicates preserved.
    pub files: Vec<String>,
}

impl ChecklistMatch {
    pub fn name(&self) -> &str {
        self.checklist.name()
    }
}

/// Checklists that apply to a change set, in registry order.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    matches: Vec<ChecklistMatch>,
}

impl MatchResult {
    pub fn new(matches: Vec<ChecklistMatch>) -> Self {
        Self { matches }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChecklistMatch> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Files matched by the checklist named `name`, if it matched.
    pub fn files_for(&self, name: &str) -> Option<&[String]> {
        self.matches
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.files.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files_for(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.matches.iter().map(ChecklistMatch::name).collect()
    }

    /// Split into (matching, not matching) while keeping order.
    pub fn partition<F>(self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(&ChecklistMatch) -> bool,
    {
        let (yes, no): (Vec<_>, Vec<_>) = self.matches.into_iter().partition(|m| predicate(m));
        (Self::new(yes), Self::new(no))
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = &'a ChecklistMatch;
    type IntoIter = std::slice::Iter<'a, ChecklistMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Evaluate every checklist against every file.
///
/// A checklist is included only when at least one file matched. Pure: the
/// result depends on nothing but the two arguments.
pub fn match_files(files: &[String], registry: &ChecklistRegistry) -> MatchResult {
    let matches = registry
        .iter()
        .filter_map(|checklist| {
            let files = checklist.relevant_files(files);
            (!files.is_empty()).then(|| ChecklistMatch {
                checklist: Arc::clone(checklist),
                files,
            })
        })
        .collect();

    MatchResult::new(matches)
}
