use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MERGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Merges|#\d+").expect("valid merge pattern"));
static MERGE_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pull request #(\d+) from (.*)$").expect("valid merge commit pattern")
});
static SQUASH_COMMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s+(.*)\(#(\d+)\)").expect("valid squash pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// A merge commit from the pull request's branch
    Merge,
    /// A single squashed commit
    Squash,
}

impl MergeKind {
    fn marker(self) -> &'static str {
        match self {
            Self::Merge => "-",
            Self::Squash => "S",
        }
    }
}

/// A pull request referenced by a commit subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub kind: MergeKind,
    /// Branch name for merges, title for squashes
    pub title: String,
}

impl PullRequestRef {
    /// Parse a `<short id> <subject>` line.
    pub fn from_commit_line(line: &str) -> Option<Self> {
        if let Some(caps) = MERGE_COMMIT.captures(line) {
            let source = caps[2].trim();
            // owner/branch -> branch
            let branch = source.split_once('/').map_or(source, |(_, branch)| branch);
            return Some(Self {
                number: caps[1].parse().ok()?,
                kind: MergeKind::Merge,
                title: branch.to_string(),
            });
        }

        let caps = SQUASH_COMMIT.captures(line)?;
        Some(Self {
            number: caps[3].parse().ok()?,
            kind: MergeKind::Squash,
            title: caps[2].trim().to_string(),
        })
    }

    /// `<project>/pull/<n> <marker> <title>`
    pub fn render(&self, gh_url: &str) -> String {
        format!(
            "{}/pull/{} {:>1} {}",
            gh_url,
            self.number,
            self.kind.marker(),
            self.title
        )
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.number, self.kind.marker(), self.title)
    }
}

/// Commit lines that look like merges, either merge commits or squashed PRs.
pub fn merges(commits: &[String]) -> Vec<String> {
    commits
        .iter()
        .filter(|line| MERGE_LINE.is_match(line))
        .cloned()
        .collect()
}

/// Pull requests referenced by merge lines, in order.
pub fn pull_requests(merges: &[String]) -> Vec<PullRequestRef> {
    merges
        .iter()
        .filter_map(|line| PullRequestRef::from_commit_line(line))
        .collect()
}
