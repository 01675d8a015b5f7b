//! The `pr-checklist` command: add relevant checklists to an open pull request.

use crate::checklist::{Annotation, ChecklistMatch, ChecklistRegistry, annotate, match_files};
use crate::common::{CommonParams, env_value};
use crate::config::Config;
use crate::git::{GitRepo, safe_name};
use crate::github::{GitHubClient, PullRequest, PullRequestClient};
use crate::{log_debug, log_info, ui};
use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::path::PathBuf;

pub const DRY_RUN_BANNER: &str = "!!! IN DRY RUN MODE, NOT DOING ANY OF THESE THINGS !!!";

#[derive(Args, Clone, Default, Debug)]
pub struct PrChecklistArgs {
    /// Which branch should we examine?
    #[arg(short, long, help = "Which branch should we examine? (default: $GIT_BRANCH)")]
    pub branch: Option<String>,

    /// GitHub access token
    #[arg(short, long, help = "GitHub access token (default: $GITHUB_TOKEN)")]
    pub token: Option<String>,

    #[arg(short, long, help = "GitHub organization to query for PRs (default: NoRedInk)")]
    pub org: Option<String>,

    #[arg(short, long, help = "GitHub repository to query for PRs (default: NoRedInk)")]
    pub repo: Option<String>,

    #[arg(
        short = 'n',
        long,
        help = "Check things, but do not make any edits or comments"
    )]
    pub dry_run: bool,

    #[arg(
        short = 'c',
        long = "custom-checklist",
        value_name = "FILE",
        help = "TOML file with additional checklist definitions"
    )]
    pub custom_checklist: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrChecklistOptions {
    pub branch: String,
    pub token: String,
    pub org: String,
    pub repo: String,
    pub api_url: String,
    pub dry_run: bool,
    pub custom_checklist: Option<PathBuf>,
}

impl PrChecklistOptions {
    /// Resolve each value from flag, then environment, then configuration.
    pub fn resolve(
        args: &PrChecklistArgs,
        env_branch: Option<String>,
        env_token: Option<String>,
        config: &Config,
    ) -> Result<Self> {
        let branch = args
            .branch
            .clone()
            .or(env_branch)
            .map(|b| safe_name(&b))
            .filter(|b| !b.is_empty())
            .ok_or_else(|| anyhow!("--branch must be set"))?;

        let token = args
            .token
            .clone()
            .or(env_token)
            .or_else(|| config.github.token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("--token or GITHUB_TOKEN must be set"))?;

        Ok(Self {
            branch,
            token,
            org: args.org.clone().unwrap_or_else(|| config.github.org.clone()),
            repo: args.repo.clone().unwrap_or_else(|| config.github.repo.clone()),
            api_url: config.github.api_url.clone(),
            dry_run: args.dry_run,
            custom_checklist: args
                .custom_checklist
                .clone()
                .or_else(|| config.checklist.custom_file.clone()),
        })
    }
}

/// What a run found and did
#[derive(Debug, Clone)]
pub enum PrChecklistOutcome {
    /// No open pull request for the branch; nothing to do
    NoPullRequest,
    Annotated {
        pull_request: PullRequest,
        annotation: Annotation,
        /// Whether the body and comment were actually written
        written: bool,
    },
}

/// Find the branch's pull request, match its changes against `registry` and
/// append any checklists it does not carry yet.
///
/// The body is written before the comment is posted, and only when at least
/// one checklist is new. In dry-run mode nothing is written.
pub async fn run(
    client: &dyn PullRequestClient,
    git_repo: &GitRepo,
    registry: &ChecklistRegistry,
    options: &PrChecklistOptions,
) -> Result<PrChecklistOutcome> {
    let spinner = ui::create_spinner("Looking up pull request...");
    let found = client
        .find_open_pull_request(&options.org, &options.repo, &options.branch)
        .await;
    spinner.finish_and_clear();

    let Some(pull_request) = found.context("Failed to look up pull request")? else {
        return Ok(PrChecklistOutcome::NoPullRequest);
    };
    log_info!(
        "Found pull request #{} ({}..{})",
        pull_request.number,
        pull_request.base.sha,
        pull_request.head.sha
    );

    let common_ancestor = git_repo
        .merge_base(&pull_request.base.sha, &pull_request.head.sha)
        .context("Failed to find the common ancestor of the pull request")?;
    let files = git_repo.changed_files(&common_ancestor, &pull_request.head.sha)?;
    log_debug!("{} file(s) changed in pull request", files.len());

    let matches = match_files(&files, registry);
    let annotation = annotate(pull_request.body_text(), matches);

    let mut written = false;
    if annotation.has_changes() && !options.dry_run {
        client
            .update_body(
                &options.org,
                &options.repo,
                pull_request.number,
                &annotation.new_body,
            )
            .await
            .context("Failed to update pull request body")?;
        if let Some(comment) = &annotation.comment {
            client
                .add_comment(&options.org, &options.repo, pull_request.number, comment)
                .await
                .context("Failed to comment on pull request")?;
        }
        written = true;
        tracing::info!(
            pull_request = pull_request.number,
            added = annotation.newly_added.len(),
            "Pull request annotated"
        );
    }

    Ok(PrChecklistOutcome::Annotated {
        pull_request,
        annotation,
        written,
    })
}

fn joined_files(m: &ChecklistMatch) -> String {
    m.files.join(", ")
}

/// Operator-facing report lines for a run
pub fn report_lines(outcome: &PrChecklistOutcome) -> Vec<String> {
    let PrChecklistOutcome::Annotated { annotation, .. } = outcome else {
        return vec!["Could not find pull request!".to_string()];
    };

    let mut lines = Vec::new();
    for m in &annotation.newly_added {
        lines.push(format!(
            "Added the {} checklist to this PR since these files changed: {}",
            m.name(),
            joined_files(m)
        ));
    }
    for m in &annotation.already_present {
        lines.push(format!(
            "Already added the {} checklist to this PR since these files changed: {}",
            m.name(),
            joined_files(m)
        ));
    }
    if annotation.newly_added.is_empty() {
        lines.push("Didn't need to add any checklists on this PR.".to_string());
    } else {
        lines.push("Left a comment about the new checklists.".to_string());
    }
    lines
}

/// Handles the `pr-checklist` command.
pub async fn handle_pr_checklist_command(common: CommonParams, args: PrChecklistArgs) -> Result<()> {
    let (git_repo, config) = common.load()?;
    let options = PrChecklistOptions::resolve(
        &args,
        env_value("GIT_BRANCH"),
        env_value("GITHUB_TOKEN"),
        &config,
    )?;

    ui::print_message(&format!("Checking branch {}...", options.branch));
    if options.dry_run {
        ui::print_warning(DRY_RUN_BANNER);
    }

    if let Some(path) = &options.custom_checklist {
        ui::print_info(&format!(
            "Loading external configuration from {}",
            path.display()
        ));
    }
    let registry = ChecklistRegistry::load(options.custom_checklist.as_deref())?;

    let client = GitHubClient::new(&options.api_url, &options.token)?;
    let outcome = run(&client, &git_repo, &registry, &options).await?;

    if let PrChecklistOutcome::Annotated { pull_request, .. } = &outcome {
        ui::print_message(&format!("Found pull request {}", pull_request.html_url));
    }
    for line in report_lines(&outcome) {
        ui::print_message(&line);
    }
    Ok(())
}
