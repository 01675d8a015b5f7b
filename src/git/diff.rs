use anyhow::Result;
use git2::{Diff, Patch};
use std::collections::BTreeMap;
use std::fmt;

/// Directories holding less than this share of changed lines are omitted
/// from the dirstat, matching `git diff --dirstat`.
pub const DIRSTAT_THRESHOLD_PERCENT: f64 = 3.0;

/// Totals for a diff, as printed by `git diff --shortstat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn from_diff(diff: &Diff<'_>) -> Result<Self> {
        let stats = diff.stats()?;
        Ok(Self {
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.files_changed == 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        write!(
            f,
            "{} file{} changed",
            self.files_changed,
            plural(self.files_changed)
        )?;
        if self.insertions > 0 || self.deletions == 0 {
            write!(
                f,
                ", {} insertion{}(+)",
                self.insertions,
                plural(self.insertions)
            )?;
        }
        if self.deletions > 0 || self.insertions == 0 {
            write!(
                f,
                ", {} deletion{}(-)",
                self.deletions,
                plural(self.deletions)
            )?;
        }
        Ok(())
    }
}

/// One line of a cumulative dirstat
#[derive(Debug, Clone, PartialEq)]
pub struct DirStat {
    pub percent: f64,
    /// Directory with a trailing slash; `./` for the repository root
    pub directory: String,
}

impl fmt::Display for DirStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5.1}% {}", self.percent, self.directory)
    }
}

/// Changed lines (insertions + deletions) per file path.
pub fn changed_lines_per_file(diff: &Diff<'_>) -> Result<Vec<(String, usize)>> {
    let mut per_file = Vec::new();
    for idx in 0..diff.deltas().len() {
        let Some(patch) = Patch::from_diff(diff, idx)? else {
            continue;
        };
        let delta = patch.delta();
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (_, additions, deletions) = patch.line_stats()?;
        per_file.push((path, additions + deletions));
    }
    Ok(per_file)
}

/// Cumulative share of changed lines per directory: a parent directory's
/// share includes its children. Sorted by directory name.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn dirstat(per_file: &[(String, usize)]) -> Vec<DirStat> {
    let total: usize = per_file.iter().map(|(_, lines)| lines).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut per_dir: BTreeMap<String, usize> = BTreeMap::new();
    for (path, lines) in per_file {
        let mut dirs: Vec<&str> = path.match_indices('/').map(|(i, _)| &path[..=i]).collect();
        if dirs.is_empty() {
            dirs.push("./");
        }
        for dir in dirs {
            *per_dir.entry(dir.to_string()).or_default() += lines;
        }
    }

    per_dir
        .into_iter()
        .map(|(directory, lines)| DirStat {
            percent: lines as f64 * 100.0 / total as f64,
            directory,
        })
        .filter(|stat| stat.percent >= DIRSTAT_THRESHOLD_PERCENT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortstat_format() {
        let summary = DiffSummary {
            files_changed: 3,
            insertions: 10,
            deletions: 1,
        };
        assert_eq!(
            summary.to_string(),
            "3 files changed, 10 insertions(+), 1 deletion(-)"
        );

        let only_adds = DiffSummary {
            files_changed: 1,
            insertions: 1,
            deletions: 0,
        };
        assert_eq!(only_adds.to_string(), "1 file changed, 1 insertion(+)");
    }

    #[test]
    fn test_dirstat_is_cumulative() {
        let per_file = vec![
            ("app/models/user.rb".to_string(), 50),
            ("app/jobs/foo.rb".to_string(), 30),
            ("README.md".to_string(), 19),
            ("lib/x.rb".to_string(), 1),
        ];
        let stats = dirstat(&per_file);
        let rendered: Vec<String> = stats.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                " 19.0% ./",
                " 80.0% app/",
                " 30.0% app/jobs/",
                " 50.0% app/models/",
            ]
        );
    }

    #[test]
    fn test_dirstat_empty() {
        assert!(dirstat(&[]).is_empty());
        assert!(dirstat(&[("a/b".to_string(), 0)]).is_empty());
    }
}
