//! Checklist registry: built-ins plus optional externally defined rules,
//! frozen before any matching happens.

use super::builtins::builtin_checklists;
use super::error::ChecklistError;
use super::rule::{Checklist, PathRule};
use crate::log_debug;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// On-disk shape of an external checklist file.
///
/// ```toml
/// [[checklist]]
/// name = "TerraformChecklist"
/// human_name = "Terraform"
/// prefixes = ["infra/"]
/// suffixes = [".tf"]
/// body = """
/// - [ ] `terraform plan` output attached
/// """
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistFile {
    #[serde(default, rename = "checklist")]
    pub checklists: Vec<ChecklistDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecklistDefinition {
    pub name: String,
    /// Defaults to `name` when omitted.
    pub human_name: Option<String>,
    pub body: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ChecklistDefinition {
    fn into_rule(self) -> Result<PathRule, ChecklistError> {
        if self.name.trim().is_empty() {
            return Err(ChecklistError::EmptyName);
        }

        let human_name = self.human_name.unwrap_or_else(|| self.name.clone());
        let mut rule = PathRule::new(self.name.clone(), human_name, self.body);
        for prefix in self.prefixes {
            rule = rule.prefix(prefix);
        }
        for literal in self.exact {
            rule = rule.exact(literal);
        }
        for needle in self.contains {
            rule = rule.contains(needle);
        }
        for suffix in self.suffixes {
            rule = rule.suffix(suffix);
        }
        for pattern in self.patterns {
            let re = Regex::new(&pattern).map_err(|source| ChecklistError::InvalidPattern {
                name: self.name.clone(),
                pattern: pattern.clone(),
                source,
            })?;
            rule = rule.pattern(re);
        }

        if rule.matchers().is_empty() {
            return Err(ChecklistError::NoMatchers(self.name));
        }
        Ok(rule)
    }
}

/// Parse checklist definitions from TOML text.
pub fn load_from_str(
    content: &str,
    path: Option<&Path>,
) -> Result<Vec<PathRule>, ChecklistError> {
    let file: ChecklistFile = toml::from_str(content).map_err(|source| ChecklistError::Parse {
        path: path.map(Path::to_path_buf),
        source,
    })?;

    file.checklists
        .into_iter()
        .map(ChecklistDefinition::into_rule)
        .collect()
}

/// Read and parse a checklist definition file.
pub fn load_from_file(path: &Path) -> Result<Vec<PathRule>, ChecklistError> {
    let content = std::fs::read_to_string(path).map_err(|source| ChecklistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content, Some(path))
}

/// Collects checklists before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    checklists: Vec<Arc<dyn Checklist>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in checklists.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        for rule in builtin_checklists() {
            builder = builder.register(rule);
        }
        builder
    }

    pub fn register(mut self, checklist: impl Checklist + 'static) -> Self {
        self.checklists.push(Arc::new(checklist));
        self
    }

    /// Append every checklist defined in `path`, in file order.
    pub fn load_file(mut self, path: &Path) -> Result<Self, ChecklistError> {
        let rules = load_from_file(path)?;
        log_debug!(
            "Loaded {} checklist(s) from {}",
            rules.len(),
            path.display()
        );
        for rule in rules {
            self = self.register(rule);
        }
        Ok(self)
    }

    /// Freeze the registry. Fails if two checklists share a name, since the
    /// name is the identity embedded in pull request bodies.
    pub fn build(self) -> Result<ChecklistRegistry, ChecklistError> {
        let mut seen = HashSet::new();
        for checklist in &self.checklists {
            if !seen.insert(checklist.name().to_string()) {
                return Err(ChecklistError::DuplicateName(checklist.name().to_string()));
            }
        }
        Ok(ChecklistRegistry {
            checklists: self.checklists,
        })
    }
}

/// An immutable, ordered set of checklists.
#[derive(Debug, Clone)]
pub struct ChecklistRegistry {
    checklists: Vec<Arc<dyn Checklist>>,
}

impl ChecklistRegistry {
    /// Built-ins only.
    pub fn builtin() -> Result<Self, ChecklistError> {
        RegistryBuilder::with_builtins().build()
    }

    /// Built-ins followed by the checklists in `custom_file`, if any.
    pub fn load(custom_file: Option<&Path>) -> Result<Self, ChecklistError> {
        let builder = RegistryBuilder::with_builtins();
        match custom_file {
            Some(path) => builder.load_file(path)?.build(),
            None => builder.build(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Checklist>> {
        self.checklists.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Checklist>> {
        self.checklists.iter().find(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.checklists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checklists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTERNAL: &str = r#"
        [[checklist]]
        name = "TerraformChecklist"
        human_name = "Terraform"
        prefixes = ["infra/"]
        suffixes = [".tf"]
        body = """
        - [ ] plan attached
        """

        [[checklist]]
        name = "ProtoChecklist"
        patterns = ['^proto/.*\.proto$']
        body = "- [ ] wire compatible"
    "#;

    #[test]
    fn test_load_definitions() {
        let rules = load_from_str(EXTERNAL, None).expect("valid definitions");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "TerraformChecklist");
        assert_eq!(rules[0].human_name(), "Terraform");
        assert_eq!(rules[0].body(), "- [ ] plan attached");
        assert!(rules[0].is_relevant("infra/main.tf"));
        assert!(rules[0].is_relevant("modules/vpc.tf"));
        assert_eq!(rules[1].human_name(), "ProtoChecklist");
        assert!(rules[1].is_relevant("proto/api.proto"));
        assert!(!rules[1].is_relevant("src/proto/api.proto"));
    }

    #[test]
    fn test_external_rules_follow_builtins() {
        let mut builder = RegistryBuilder::with_builtins();
        for rule in load_from_str(EXTERNAL, None).expect("valid definitions") {
            builder = builder.register(rule);
        }
        let registry = builder.build().expect("unique names");
        let names: Vec<&str> = registry.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[9], "TerraformChecklist");
        assert_eq!(names[10], "ProtoChecklist");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = RegistryBuilder::with_builtins()
            .register(PathRule::new("NixChecklist", "Nix again", "- [ ] x").prefix("x"))
            .build();
        assert!(matches!(result, Err(ChecklistError::DuplicateName(name)) if name == "NixChecklist"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let toml = r#"
            [[checklist]]
            name = "Broken"
            patterns = ["("]
            body = "- [ ] x"
        "#;
        assert!(matches!(
            load_from_str(toml, None),
            Err(ChecklistError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_definition_without_matchers_rejected() {
        let toml = r#"
            [[checklist]]
            name = "Nothing"
            body = "- [ ] x"
        "#;
        assert!(matches!(
            load_from_str(toml, None),
            Err(ChecklistError::NoMatchers(name)) if name == "Nothing"
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let toml = r#"
            [[checklist]]
            name = "  "
            body = "- [ ] x"
            prefixes = ["app/"]
        "#;
        assert!(matches!(
            load_from_str(toml, None),
            Err(ChecklistError::EmptyName)
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let toml = r#"
            [[checklist]]
            name = "Typo"
            prefix = ["x/"]
            body = "- [ ] x"
        "#;
        assert!(matches!(
            load_from_str(toml, None),
            Err(ChecklistError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ChecklistRegistry::load(Some(Path::new("/nonexistent/checklists.toml")));
        assert!(matches!(result, Err(ChecklistError::Io { .. })));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ChecklistRegistry::builtin().expect("built-ins are unique");
        assert_eq!(registry.len(), 9);
        assert!(registry.get("DockerfileChecklist").is_some());
        assert!(registry.get("Dockerfile").is_none());
    }
}
