use super::summary::{DeployOptions, DeploySummary};
use crate::common::CommonParams;
use crate::config::Config;
use crate::git::{GitRepo, safe_name, web_url_from_remote};
use crate::{log_debug, ui};
use anyhow::{Result, anyhow, bail};
use clap::Args;

#[derive(Args, Clone, Default, Debug)]
pub struct DeployArgs {
    /// `[[base] to]`: with no revisions, promote staging and master
    #[arg(value_name = "REVISION", num_args = 0..=2)]
    pub revisions: Vec<String>,

    #[arg(short, long, help = "Deploy branch whose tags are deploys (default: production)")]
    pub branch: Option<String>,

    /// Show historical deploys
    #[arg(
        short = 'd',
        long = "deploys",
        value_name = "N",
        num_args = 0..=1,
        help = "Show historical deploys, shows all if N is not specified"
    )]
    pub deploys: Option<Option<usize>>,

    #[arg(long, help = "Statistics on directory changes")]
    pub dirstat: bool,

    #[arg(long, help = "Statistics on file changes")]
    pub stat: bool,

    #[arg(
        long = "gh-url",
        value_name = "URL",
        help = "GitHub project url to construct links from (default: from remote.origin.url)"
    )]
    pub gh_url: Option<String>,
}

/// Which deploys to report on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployAction {
    /// production <- staging, then staging <- master
    Promote,
    /// `base` defaults to the latest deploy tag
    Diff { base: Option<String>, to: String },
    /// Consecutive deploy tags; all of them, or only the last `n` deploys
    History { last: Option<usize> },
}

impl DeployAction {
    pub fn from_args(args: &DeployArgs) -> Result<Self> {
        if let Some(last) = args.deploys {
            return Ok(Self::History {
                last: last.filter(|n| *n > 0),
            });
        }
        match args.revisions.as_slice() {
            [] => Ok(Self::Promote),
            [to] => Ok(Self::Diff {
                base: None,
                to: to.clone(),
            }),
            [base, to] => Ok(Self::Diff {
                base: Some(base.clone()),
                to: to.clone(),
            }),
            _ => Err(anyhow!("Usage: deploy [[base] to]")),
        }
    }
}

/// `(base, to)` pairs to summarize, in report order.
pub fn deploy_pairs(action: &DeployAction, deploy_tags: &[String]) -> Result<Vec<(String, String)>> {
    match action {
        DeployAction::Promote => Ok(vec![
            ("origin/production".to_string(), "origin/staging".to_string()),
            ("origin/staging".to_string(), "origin/master".to_string()),
        ]),
        DeployAction::Diff { base, to } => {
            let base = match base {
                Some(base) => base.clone(),
                None => deploy_tags
                    .last()
                    .cloned()
                    .ok_or_else(|| anyhow!("No deploy tags found to diff against"))?,
            };
            Ok(vec![(base, to.clone())])
        }
        DeployAction::History { last } => {
            let start = last.map_or(0, |n| deploy_tags.len().saturating_sub(n.saturating_add(1)));
            Ok(deploy_tags[start..]
                .windows(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect())
        }
    }
}

fn resolve_gh_url(args: &DeployArgs, config: &Config, git_repo: &GitRepo) -> Result<String> {
    if let Some(url) = args.gh_url.clone().or_else(|| config.deploy.gh_url.clone()) {
        return Ok(url.trim_end_matches('/').to_string());
    }
    let remote = git_repo.remote_url("origin")?;
    remote
        .as_deref()
        .and_then(web_url_from_remote)
        .ok_or_else(|| anyhow!("Could not determine the GitHub URL from remote.origin.url; pass --gh-url"))
}

/// Handles the `deploy` command.
pub fn handle_deploy_command(common: CommonParams, args: DeployArgs) -> Result<()> {
    let (git_repo, config) = common.load()?;
    let action = DeployAction::from_args(&args)?;
    let branch = safe_name(args.branch.as_deref().unwrap_or(&config.deploy.branch));
    if branch.is_empty() {
        bail!("--branch must not be empty");
    }

    let options = DeployOptions {
        gh_url: resolve_gh_url(&args, &config, &git_repo)?,
        dirstat: args.dirstat,
        stat: args.stat,
    };

    let deploy_tags = git_repo.tags_matching(&branch)?;
    log_debug!("{} deploy tag(s) for {}", deploy_tags.len(), branch);

    for (base, to) in deploy_pairs(&action, &deploy_tags)? {
        tracing::debug!(%base, %to, "Summarizing deploy");
        let spinner = ui::create_spinner(&format!("Summarizing {base}...{to}"));
        let summary = DeploySummary::build(&git_repo, &base, &to, &options);
        spinner.finish_and_clear();
        print!("{}", summary?.render());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        (1..=4)
            .map(|i| format!("production-2016-10-2{i}-0100"))
            .collect()
    }

    #[test]
    fn test_action_from_args() {
        let mut args = DeployArgs::default();
        assert_eq!(DeployAction::from_args(&args).expect("promote"), DeployAction::Promote);

        args.revisions = vec!["origin/staging".into()];
        assert_eq!(
            DeployAction::from_args(&args).expect("diff"),
            DeployAction::Diff {
                base: None,
                to: "origin/staging".into()
            }
        );

        args.deploys = Some(None);
        assert_eq!(
            DeployAction::from_args(&args).expect("history"),
            DeployAction::History { last: None }
        );

        args.deploys = Some(Some(0));
        assert_eq!(
            DeployAction::from_args(&args).expect("history"),
            DeployAction::History { last: None }
        );
    }

    #[test]
    fn test_diff_defaults_to_latest_tag() {
        let pairs = deploy_pairs(
            &DeployAction::Diff {
                base: None,
                to: "origin/master".into(),
            },
            &tags(),
        )
        .expect("pairs");
        assert_eq!(
            pairs,
            vec![("production-2016-10-24-0100".to_string(), "origin/master".to_string())]
        );

        assert!(
            deploy_pairs(
                &DeployAction::Diff {
                    base: None,
                    to: "x".into()
                },
                &[]
            )
            .is_err()
        );
    }

    #[test]
    fn test_history_pairs() {
        let all = deploy_pairs(&DeployAction::History { last: None }, &tags()).expect("pairs");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].0, "production-2016-10-21-0100");

        let last = deploy_pairs(&DeployAction::History { last: Some(2) }, &tags()).expect("pairs");
        assert_eq!(
            last,
            vec![
                (
                    "production-2016-10-22-0100".to_string(),
                    "production-2016-10-23-0100".to_string()
                ),
                (
                    "production-2016-10-23-0100".to_string(),
                    "production-2016-10-24-0100".to_string()
                ),
            ]
        );

        let many = deploy_pairs(&DeployAction::History { last: Some(10) }, &tags()).expect("pairs");
        assert_eq!(many.len(), 3);

        let max = deploy_pairs(&DeployAction::History { last: Some(usize::MAX) }, &tags())
            .expect("pairs");
        assert_eq!(max, all);
    }

    #[test]
    fn test_promote_pairs() {
        let pairs = deploy_pairs(&DeployAction::Promote, &[]).expect("pairs");
        assert_eq!(pairs[0], ("origin/production".to_string(), "origin/staging".to_string()));
        assert_eq!(pairs[1], ("origin/staging".to_string(), "origin/master".to_string()));
    }
}
