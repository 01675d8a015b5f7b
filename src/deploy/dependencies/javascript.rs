use super::{Dependencies, Dependency, DependencyFile};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `package.json` dependency ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptPackages;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
}

impl DependencyFile for JavascriptPackages {
    fn heading(&self) -> &'static str {
        "Javascript Dependency Changes:"
    }

    fn parse(&self, content: &str) -> Result<Dependencies> {
        if content.trim().is_empty() {
            return Ok(Dependencies::new());
        }
        let package: PackageJson =
            serde_json::from_str(content).context("Invalid package.json")?;

        // A package listed in both keeps its runtime range.
        Ok(package
            .dev_dependencies
            .into_iter()
            .chain(package.dependencies)
            .map(|(name, version)| (name, Dependency::new(version)))
            .collect())
    }
}
