use super::{Dependencies, Dependency, DependencyFile};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `elm.json` (0.19) and `elm-package.json` (0.18) package versions
#[derive(Debug, Clone, Copy, Default)]
pub struct ElmPackages;

/// Applications split dependencies into direct and indirect; packages and
/// 0.18 manifests list constraints by name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElmDependencies {
    Application {
        direct: BTreeMap<String, String>,
        indirect: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

impl Default for ElmDependencies {
    fn default() -> Self {
        Self::Flat(BTreeMap::new())
    }
}

impl ElmDependencies {
    fn into_entries(self) -> Vec<(String, String)> {
        match self {
            Self::Application { direct, indirect } => indirect.into_iter().chain(direct).collect(),
            Self::Flat(deps) => deps.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ElmManifest {
    #[serde(default)]
    dependencies: ElmDependencies,
    #[serde(default, rename = "test-dependencies")]
    test_dependencies: ElmDependencies,
}

impl DependencyFile for ElmPackages {
    fn heading(&self) -> &'static str {
        "Changed Elm packages:"
    }

    fn parse(&self, content: &str) -> Result<Dependencies> {
        if content.trim().is_empty() {
            return Ok(Dependencies::new());
        }
        let manifest: ElmManifest = serde_json::from_str(content).context("Invalid Elm manifest")?;

        Ok(manifest
            .test_dependencies
            .into_entries()
            .into_iter()
            .chain(manifest.dependencies.into_entries())
            .map(|(name, version)| (name, Dependency::new(version)))
            .collect())
    }
}
