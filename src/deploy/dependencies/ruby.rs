use super::{Dependencies, Dependency, DependencyFile};
use anyhow::Result;

/// `Gemfile.lock` as written by Bundler
#[derive(Debug, Clone, Copy, Default)]
pub struct RubyGems;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Gem,
    Git,
    Path,
    Other,
}

impl DependencyFile for RubyGems {
    fn heading(&self) -> &'static str {
        "Ruby dependency changes:"
    }

    /// Collects the gems listed under `specs:` of every `GEM`, `GIT` and
    /// `PATH` section. Gems from git or a path carry that as their source.
    fn parse(&self, content: &str) -> Result<Dependencies> {
        let mut gems = Dependencies::new();
        let mut section = Section::Other;
        let mut remote: Option<String> = None;
        let mut revision: Option<String> = None;

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if !line.starts_with(' ') {
                section = match line.trim() {
                    "GEM" => Section::Gem,
                    "GIT" => Section::Git,
                    "PATH" => Section::Path,
                    _ => Section::Other,
                };
                remote = None;
                revision = None;
                continue;
            }

            if section == Section::Other {
                continue;
            }

            // Section attributes are indented by two spaces, gems by four and
            // the gems' own requirements by six.
            let indent = line.len() - line.trim_start().len();
            let text = line.trim();
            match indent {
                2 => {
                    if let Some(value) = text.strip_prefix("remote:") {
                        remote = Some(value.trim().to_string());
                    } else if let Some(value) = text.strip_prefix("revision:") {
                        revision = Some(value.trim().to_string());
                    }
                }
                4 => {
                    let Some((name, rest)) = text.split_once(' ') else {
                        continue;
                    };
                    let version = rest.trim().trim_start_matches('(').trim_end_matches(')');
                    let mut gem = Dependency::new(version);
                    match section {
                        Section::Git => {
                            let mut source = format!("GIT {}", remote.as_deref().unwrap_or_default());
                            if let Some(rev) = &revision {
                                source.push(' ');
                                source.push_str(rev);
                            }
                            gem = gem.with_source(source);
                        }
                        Section::Path => {
                            gem = gem.with_source(format!(
                                "PATH {}",
                                remote.as_deref().unwrap_or_default()
                            ));
                        }
                        Section::Gem | Section::Other => {}
                    }
                    gems.insert(name.to_string(), gem);
                }
                _ => {}
            }
        }

        Ok(gems)
    }
}
