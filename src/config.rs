use crate::log_debug;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration filename, looked up at the repository root
pub const PROJECT_CONFIG_FILENAME: &str = ".deploy-complexity.toml";

/// Configuration structure for deploy-complexity
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where pull requests live and how to reach them
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GitHubConfig {
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    /// Only honoured in the personal config file
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Only honoured in the personal config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            repo: default_repo(),
            api_url: default_api_url(),
            token: None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct DeployConfig {
    /// Deploy tags contain this name, e.g. `production-2016-10-22-0103`
    #[serde(default = "default_deploy_branch")]
    pub branch: String,
    /// Project URL used for links; derived from `remote.origin.url` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gh_url: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            branch: default_deploy_branch(),
            gh_url: None,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ChecklistConfig {
    /// Extra checklist definitions, relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_file: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct LoggingConfig {
    /// Include HTTP client logs
    #[serde(default)]
    pub verbose: bool,
}

fn default_org() -> String {
    "NoRedInk".to_string()
}

fn default_repo() -> String {
    "NoRedInk".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_deploy_branch() -> String {
    "production".to_string()
}

impl Config {
    /// Load the personal configuration, then merge the project configuration
    /// found at `repo_root`, if any.
    pub fn load(repo_root: Option<&Path>) -> Result<Self> {
        let personal = Self::get_config_path().ok();
        Self::load_from(personal.as_deref(), repo_root)
    }

    /// Like [`Config::load`] with an explicit personal config path.
    pub fn load_from(personal_path: Option<&Path>, repo_root: Option<&Path>) -> Result<Self> {
        let mut config = match personal_path {
            Some(path) if path.exists() => Self::read_file(path)?,
            _ => Self::default(),
        };

        if let Some(root) = repo_root {
            let project_path = root.join(PROJECT_CONFIG_FILENAME);
            if project_path.exists() {
                let mut project_config = Self::read_file(&project_path)?;
                if let Some(custom) = project_config.checklist.custom_file.take() {
                    project_config.checklist.custom_file = Some(root.join(custom));
                }
                config.merge_with_project_config(project_config);
            }
        }

        log_debug!("Configuration loaded: {:?}", config.redacted());
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).map_err(|e| {
            anyhow!(
                "Invalid configuration file format in {}: {}",
                path.display(),
                e
            )
        })
    }

    /// Merge project settings over this config. The token and the API host
    /// it is sent to are never taken from a project file.
    pub fn merge_with_project_config(&mut self, project_config: Self) {
        log_debug!("Merging with project configuration");
        let defaults = Self::default();

        if project_config.github.org != defaults.github.org {
            self.github.org = project_config.github.org;
        }
        if project_config.github.repo != defaults.github.repo {
            self.github.repo = project_config.github.repo;
        }
        if project_config.deploy.branch != defaults.deploy.branch {
            self.deploy.branch = project_config.deploy.branch;
        }
        if project_config.deploy.gh_url.is_some() {
            self.deploy.gh_url = project_config.deploy.gh_url;
        }
        if project_config.checklist.custom_file.is_some() {
            self.checklist.custom_file = project_config.checklist.custom_file;
        }
        self.logging.verbose |= project_config.logging.verbose;
    }

    /// Get the path to the personal configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("deploy-complexity");
        path.push("config.toml");
        Ok(path)
    }

    /// A copy safe to log
    fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.github.token.is_some() {
            copy.github.token = Some("<redacted>".to_string());
        }
        copy
    }
}
