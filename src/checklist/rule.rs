//! The checklist capability and its declarative path-based implementation.

use regex::Regex;
use std::fmt;

/// A named policy that decides whether a changed path needs a checklist,
/// and renders that checklist for a pull request body.
///
/// Implementors only provide the four required methods; identity, title
/// and the rendered body block are derived so every checklist is embedded
/// the same way and can be found again on later runs.
pub trait Checklist: Send + Sync + fmt::Debug {
    /// Unique identifier, e.g. `MigrationChecklist`. Changing it changes the
    /// marker, so previously annotated pull requests will get it again.
    fn name(&self) -> &str;

    /// Display name, e.g. `Migrations`.
    fn human_name(&self) -> &str;

    /// Whether a repository-relative path triggers this checklist.
    fn is_relevant(&self, path: &str) -> bool;

    /// Markdown checklist content.
    fn body(&self) -> &str;

    /// Marker token embedded in the pull request body.
    fn id(&self) -> String {
        format!("checklist:{}", self.name())
    }

    /// The HTML comment carrying the marker.
    fn marker(&self) -> String {
        format!("<!-- {} -->", self.id())
    }

    fn title(&self) -> String {
        format!("**{} Checklist**", self.human_name())
    }

    /// Block appended to a pull request body: separator, marker, title, body.
    fn for_pr_body(&self) -> String {
        format!("\n\n{}\n{}\n\n{}", self.marker(), self.title(), self.body())
    }

    /// Whether this checklist was already applied to `body`. Searches for the
    /// whole comment so `checklist:Nix` is not found inside `checklist:NixOS`;
    /// a bare `checklist:Name` mentioned elsewhere in the body does not count.
    fn is_present_in(&self, body: &str) -> bool {
        body.contains(&self.marker())
    }

    /// The subset of `files` this checklist applies to, in input order.
    fn relevant_files(&self, files: &[String]) -> Vec<String> {
        files
            .iter()
            .filter(|file| self.is_relevant(file))
            .cloned()
            .collect()
    }
}

/// A single path predicate.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    Prefix(String),
    Exact(String),
    Contains(String),
    Suffix(String),
    /// Unanchored regular-expression search.
    Pattern(Regex),
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Exact(literal) => path == literal,
            Self::Contains(needle) => path.contains(needle.as_str()),
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
            Self::Pattern(re) => re.is_match(path),
        }
    }
}

/// A checklist whose relevance is any-of a fixed set of path matchers.
#[derive(Debug, Clone)]
pub struct PathRule {
    name: String,
    human_name: String,
    body: String,
    matchers: Vec<PathMatcher>,
}

impl PathRule {
    pub fn new(
        name: impl Into<String>,
        human_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            human_name: human_name.into(),
            body: body.into().trim().to_string(),
            matchers: Vec::new(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.matchers.push(PathMatcher::Prefix(prefix.into()));
        self
    }

    pub fn exact(mut self, literal: impl Into<String>) -> Self {
        self.matchers.push(PathMatcher::Exact(literal.into()));
        self
    }

    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.matchers.push(PathMatcher::Contains(needle.into()));
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.matchers.push(PathMatcher::Suffix(suffix.into()));
        self
    }

    pub fn pattern(mut self, re: Regex) -> Self {
        self.matchers.push(PathMatcher::Pattern(re));
        self
    }

    pub fn matchers(&self) -> &[PathMatcher] {
        &self.matchers
    }
}

impl Checklist for PathRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn human_name(&self) -> &str {
        &self.human_name
    }

    fn is_relevant(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> PathRule {
        PathRule::new("ExampleChecklist", "Example", "\n- [ ] check it\n   ")
            .prefix("db/")
            .exact("Gemfile")
            .contains("opsworks")
            .suffix(".nix")
    }

    #[test]
    fn test_identity_and_rendering() {
        let rule = rule();
        assert_eq!(rule.id(), "checklist:ExampleChecklist");
        assert_eq!(rule.title(), "**Example Checklist**");
        assert_eq!(
            rule.for_pr_body(),
            "\n\n<!-- checklist:ExampleChecklist -->\n**Example Checklist**\n\n- [ ] check it"
        );
    }

    #[test]
    fn test_presence_requires_the_whole_marker() {
        let rule = rule();
        assert!(rule.is_present_in(&format!("intro{}", rule.for_pr_body())));
        assert!(!rule.is_present_in("<!-- checklist:ExampleChecklistV2 -->"));
        assert!(!rule.is_present_in("intro"));
    }

    #[test]
    fn test_matcher_primitives() {
        let rule = rule();
        assert!(rule.is_relevant("db/migrate/1.rb"));
        assert!(rule.is_relevant("Gemfile"));
        assert!(!rule.is_relevant("Gemfile.lock"));
        assert!(rule.is_relevant("config/opsworks/stack.yml"));
        assert!(rule.is_relevant("shell.nix"));
        assert!(!rule.is_relevant("app/db/thing.rb"));
    }

    #[test]
    fn test_pattern_is_a_search() {
        let rule = PathRule::new("P", "P", "body")
            .pattern(Regex::new(r"[_./]cap[_./]").expect("valid regex"));
        assert!(rule.is_relevant("lib/cap/tasks.rb"));
        assert!(rule.is_relevant("config/deploy_cap_tasks.rb"));
        assert!(!rule.is_relevant("lib/capistrano.rb"));
    }

    #[test]
    fn test_relevant_files_keeps_order_and_duplicates() {
        let rule = rule();
        let files = vec![
            "Gemfile".to_string(),
            "README.md".to_string(),
            "db/a.rb".to_string(),
            "Gemfile".to_string(),
        ];
        assert_eq!(
            rule.relevant_files(&files),
            vec!["Gemfile", "db/a.rb", "Gemfile"]
        );
    }
}
