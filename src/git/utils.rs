use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Strips a leading `origin/` remote prefix from a branch name.
///
/// `origin/master` becomes `master`, `origin/team/branch` becomes
/// `team/branch`; anything else is returned unchanged.
pub fn safe_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix("origin/").unwrap_or(name).to_string()
}

/// Finds the nearest directory at or above `start` that contains `.git`.
pub fn locate_git_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

static SCP_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@([\w.-]+):(.+?)(?:\.git)?/?$").expect("valid scp remote pattern")
});

/// Turns a remote URL into the project's web URL.
///
/// Understands scp-style (`git@github.com:org/repo.git`) and URL-style
/// (`https://github.com/org/repo.git`, `ssh://git@host/org/repo`) remotes.
pub fn web_url_from_remote(remote: &str) -> Option<String> {
    let remote = remote.trim();

    if let Some(caps) = SCP_REMOTE.captures(remote) {
        return Some(format!("https://{}/{}", &caps[1], &caps[2]));
    }

    let url = url::Url::parse(remote).ok()?;
    let host = url.host_str()?;
    let path = url.path().trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() {
        return None;
    }
    Some(format!("https://{host}/{path}"))
}
