use crate::config::Config;
use crate::git::GitRepo;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Project directory to run git commands from
    #[arg(
        long = "git-dir",
        value_name = "DIR",
        help = "Project directory to run git commands from (default: nearest ancestor containing .git)"
    )]
    pub git_dir: Option<PathBuf>,
}

impl CommonParams {
    /// The repository to operate on: `--git-dir` when given, otherwise the
    /// nearest ancestor of the working directory containing `.git`.
    pub fn git_repo(&self) -> Result<GitRepo> {
        match &self.git_dir {
            Some(dir) => GitRepo::new(dir)
                .with_context(|| format!("Failed to open repository at {}", dir.display())),
            None => GitRepo::discover().context("Failed to locate a git repository"),
        }
    }

    /// Repository plus configuration merged with its project file
    pub fn load(&self) -> Result<(GitRepo, Config)> {
        let git_repo = self.git_repo()?;
        let config = Config::load(Some(git_repo.repo_path()))?;
        Ok((git_repo, config))
    }
}

/// Value of an environment variable, ignoring unset and blank values
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
