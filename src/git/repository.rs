use crate::git::diff::{DiffSummary, DirStat, changed_lines_per_file, dirstat};
use crate::git::utils::locate_git_dir;
use crate::log_debug;
use anyhow::{Context, Result, anyhow};
use git2::{Commit, Diff, DiffStatsFormat, Oid, Repository, Sort};
use std::env;
use std::path::{Path, PathBuf};

/// Width used when rendering `--stat` output
const STAT_WIDTH: usize = 80;

/// Everything the deploy report needs about the changes in `base...to`
#[derive(Debug, Clone, Default)]
pub struct RangeChanges {
    pub summary: DiffSummary,
    /// Changed paths, in diff order
    pub files: Vec<String>,
    pub dirstat: Vec<DirStat>,
    /// Rendered per-file stat, as `git diff --stat`
    pub stat: String,
}

/// Represents a Git repository and provides methods for interacting with it.
#[derive(Debug, Clone)]
pub struct GitRepo {
    repo_path: PathBuf,
}

impl GitRepo {
    /// Creates a new `GitRepo` instance from a local path.
    pub fn new(repo_path: &Path) -> Result<Self> {
        Ok(Self {
            repo_path: repo_path.to_path_buf(),
        })
    }

    /// Creates a `GitRepo` for the nearest ancestor of the current directory
    /// containing `.git`, falling back to the current directory itself.
    pub fn discover() -> Result<Self> {
        let current_dir = env::current_dir()?;
        let root = locate_git_dir(&current_dir).unwrap_or_else(|| PathBuf::from("."));
        log_debug!("Using git directory {:?}", root);
        Self::new(&root)
    }

    /// Open the repository at the stored path
    pub fn open_repo(&self) -> Result<Repository, git2::Error> {
        Repository::open(&self.repo_path)
    }

    /// Returns the repository path
    pub fn repo_path(&self) -> &PathBuf {
        &self.repo_path
    }

    fn find_commit<'r>(repo: &'r Repository, rev: &str) -> Result<Commit<'r>> {
        repo.revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .with_context(|| format!("Unknown revision '{rev}'"))
    }

    /// The best common ancestor of two revisions, as a full commit id.
    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let repo = self.open_repo()?;
        let a = Self::find_commit(&repo, a)?.id();
        let b = Self::find_commit(&repo, b)?.id();
        let base = repo
            .merge_base(a, b)
            .with_context(|| format!("No merge base between {a} and {b}"))?;
        log_debug!("Merge base of {} and {}: {}", a, b, base);
        Ok(base.to_string())
    }

    fn tree_diff<'r>(repo: &'r Repository, from: Oid, to: Oid) -> Result<Diff<'r>> {
        let from_tree = repo.find_commit(from)?.tree()?;
        let to_tree = repo.find_commit(to)?.tree()?;
        Ok(repo.diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)?)
    }

    fn diff_paths(diff: &Diff<'_>) -> Vec<String> {
        diff.deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect()
    }

    /// Paths changed between two revisions, as `git diff --name-only from to`.
    pub fn changed_files(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let repo = self.open_repo()?;
        let from = Self::find_commit(&repo, from)?.id();
        let to = Self::find_commit(&repo, to)?.id();
        let diff = Self::tree_diff(&repo, from, to)?;
        Ok(Self::diff_paths(&diff))
    }

    /// Changes introduced by `to` since it diverged from `base`
    /// (the three-dot range `base...to`).
    pub fn range_changes(&self, base: &str, to: &str) -> Result<RangeChanges> {
        let repo = self.open_repo()?;
        let base = Self::find_commit(&repo, base)?.id();
        let to = Self::find_commit(&repo, to)?.id();
        let fork = repo.merge_base(base, to)?;
        let diff = Self::tree_diff(&repo, fork, to)?;

        let stat = diff
            .stats()?
            .to_buf(DiffStatsFormat::FULL, STAT_WIDTH)?
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(RangeChanges {
            summary: DiffSummary::from_diff(&diff)?,
            files: Self::diff_paths(&diff),
            dirstat: dirstat(&changed_lines_per_file(&diff)?),
            stat,
        })
    }

    /// Commits reachable from either revision but not both, newest first,
    /// rendered as `<short id> <subject>`.
    pub fn commits_between(&self, base: &str, to: &str) -> Result<Vec<String>> {
        let repo = self.open_repo()?;
        let base = Self::find_commit(&repo, base)?.id();
        let to = Self::find_commit(&repo, to)?.id();

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(base)?;
        revwalk.push(to)?;
        if let Ok(fork) = repo.merge_base(base, to) {
            revwalk.hide(fork)?;
        }

        revwalk
            .map(|id| -> Result<String> {
                let commit = repo.find_commit(id?)?;
                let short = commit.as_object().short_id()?;
                Ok(format!(
                    "{} {}",
                    short.as_str().unwrap_or_default(),
                    commit.summary().unwrap_or_default()
                ))
            })
            .collect()
    }

    /// Abbreviated commit id for a revision
    pub fn short_id(&self, rev: &str) -> Result<String> {
        let repo = self.open_repo()?;
        let commit = Self::find_commit(&repo, rev)?;
        let short = commit.as_object().short_id()?;
        short
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("Commit id for '{rev}' is not valid UTF-8"))
    }

    /// All tag names containing `needle`, sorted by name.
    pub fn tags_matching(&self, needle: &str) -> Result<Vec<String>> {
        let repo = self.open_repo()?;
        let names = repo.tag_names(None)?;
        let mut tags: Vec<String> = names
            .iter()
            .flatten()
            .filter(|name| name.contains(needle))
            .map(ToString::to_string)
            .collect();
        tags.sort();
        Ok(tags)
    }

    /// Tag names pointing at the commit `rev` resolves to, sorted by name.
    pub fn tags_pointing_at(&self, rev: &str) -> Result<Vec<String>> {
        let repo = self.open_repo()?;
        let target = Self::find_commit(&repo, rev)?.id();
        let mut tags = Vec::new();
        for name in repo.tag_names(None)?.iter().flatten() {
            let Ok(obj) = repo.revparse_single(&format!("refs/tags/{name}")) else {
                continue;
            };
            if obj.peel_to_commit().is_ok_and(|c| c.id() == target) {
                tags.push(name.to_string());
            }
        }
        tags.sort();
        Ok(tags)
    }

    /// Contents of `path` at `rev`, or `None` when the file does not exist there.
    pub fn file_at(&self, rev: &str, path: &str) -> Result<Option<String>> {
        let repo = self.open_repo()?;
        let tree = Self::find_commit(&repo, rev)?.tree()?;
        let Ok(entry) = tree.get_path(Path::new(path)) else {
            return Ok(None);
        };
        let object = entry.to_object(&repo)?;
        Ok(object
            .as_blob()
            .map(|blob| String::from_utf8_lossy(blob.content()).into_owned()))
    }

    /// URL configured for a remote
    pub fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let repo = self.open_repo()?;
        let Ok(remote) = repo.find_remote(remote) else {
            return Ok(None);
        };
        Ok(remote.url().map(ToString::to_string))
    }
}
