use super::changed_files::ChangedFiles;
use super::dependencies::{
    DependencyFile, ElmPackages, JavascriptPackages, RevisionComparator, RubyGems,
};
use super::pull_requests::{merges, pull_requests};
use super::timing::time_between_deploys;
use crate::git::{DirStat, GitRepo, safe_name};
use crate::log_debug;
use anyhow::{Context, Result};
use std::fmt::Write;

/// Report settings shared by every deploy in a run
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Project web URL, e.g. `https://github.com/NoRedInk/NoRedInk`
    pub gh_url: String,
    pub dirstat: bool,
    pub stat: bool,
}

/// A titled list of report lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Everything shown for one `base...to` deploy
#[derive(Debug, Clone)]
pub struct DeploySummary {
    pub base: String,
    pub to: String,
    pub revision: String,
    pub time_delta: String,
    pub commits: Vec<String>,
    pub merges: Vec<String>,
    pub pull_requests: Vec<String>,
    pub shortstat: Option<String>,
    pub compare_url: String,
    pub migrations: Vec<String>,
    pub dependency_sections: Vec<Section>,
    pub dirstat: Option<Vec<DirStat>>,
    pub stat: Option<String>,
}

/// The closest tag for a revision whose name mentions the branch, otherwise
/// the abbreviated commit id.
pub fn reference(git_repo: &GitRepo, name: &str) -> Result<String> {
    let branch = safe_name(name);
    let tag = git_repo
        .tags_pointing_at(name)?
        .into_iter()
        .find(|tag| tag.contains(&branch));
    match tag {
        Some(tag) => Ok(tag),
        None => git_repo.short_id(name),
    }
}

impl DeploySummary {
    /// Collect the deploy of `to` on top of `base`.
    pub fn build(git_repo: &GitRepo, base: &str, to: &str, options: &DeployOptions) -> Result<Self> {
        log_debug!("Summarizing deploy {}...{}", base, to);
        let gh_url = options.gh_url.trim_end_matches('/');

        let revision = git_repo.short_id(to)?;
        let time_delta = time_between_deploys(&safe_name(base), &safe_name(to));

        let commits = git_repo
            .commits_between(base, to)
            .with_context(|| format!("Failed to list commits in {base}...{to}"))?;
        let merges = merges(&commits);
        let pull_requests = pull_requests(&merges)
            .iter()
            .map(|pr| pr.render(gh_url))
            .collect();

        let changes = git_repo.range_changes(base, to)?;
        let versioned_url = format!("{gh_url}/blob/{}/", safe_name(to));
        let changed_files = ChangedFiles::new(changes.files, versioned_url);

        let compare_url = format!(
            "{gh_url}/compare/{}...{}",
            reference(git_repo, base)?,
            reference(git_repo, to)?
        );

        let comparator = RevisionComparator::new(git_repo, base, to);
        let manifests: [(&dyn DependencyFile, Vec<String>); 3] = [
            (&ElmPackages, changed_files.elm_packages()),
            (&JavascriptPackages, changed_files.javascript_dependencies()),
            (&RubyGems, changed_files.ruby_dependencies()),
        ];
        let mut dependency_sections = Vec::new();
        for (kind, files) in manifests {
            if files.is_empty() {
                continue;
            }
            let lines = comparator.compare(kind, &files)?;
            if !lines.is_empty() {
                dependency_sections.push(Section {
                    heading: kind.heading().to_string(),
                    lines,
                });
            }
        }

        Ok(Self {
            base: base.to_string(),
            to: to.to_string(),
            revision,
            time_delta,
            commits,
            merges,
            pull_requests,
            shortstat: (!changes.summary.is_empty()).then(|| changes.summary.to_string()),
            compare_url,
            migrations: changed_files.migrations(),
            dependency_sections,
            dirstat: options.dirstat.then_some(changes.dirstat),
            stat: options.stat.then_some(changes.stat),
        })
    }

    pub fn is_redeploy(&self) -> bool {
        self.commits.is_empty()
    }

    /// Plain-text report, ending with a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Deploy tag {} [{}]", self.to, self.revision)?;

        if self.is_redeploy() {
            writeln!(out, "redeployed {} {}", self.base, self.time_delta)?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(
            out,
            "{} pull requests of {} merges, {} commits {}",
            self.pull_requests.len(),
            self.merges.len(),
            self.commits.len(),
            self.time_delta
        )?;
        if let Some(shortstat) = &self.shortstat {
            writeln!(out, "{shortstat}")?;
        }
        writeln!(out, "{}", self.compare_url)?;
        writeln!(out)?;

        if !self.migrations.is_empty() {
            writeln!(out, "Migrations:")?;
            for migration in &self.migrations {
                writeln!(out, "{migration}")?;
            }
            writeln!(out)?;
        }

        for section in &self.dependency_sections {
            writeln!(out, "{}", section.heading)?;
            for line in &section.lines {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }

        if self.pull_requests.is_empty() {
            writeln!(out, "Commits:")?;
            for commit in &self.commits {
                writeln!(out, "{commit}")?;
            }
        } else {
            writeln!(out, "Pull Requests:")?;
            for pr in &self.pull_requests {
                writeln!(out, "{pr}")?;
            }
        }

        if let Some(dirstat) = &self.dirstat {
            writeln!(out, "Dirstats:")?;
            for stat in dirstat {
                writeln!(out, "{stat}")?;
            }
        }
        if let Some(stat) = &self.stat {
            writeln!(out, "Stats:")?;
            write!(out, "{stat}")?;
            if !stat.ends_with('\n') {
                writeln!(out)?;
            }
        }

        writeln!(out)?;
        Ok(())
    }
}
