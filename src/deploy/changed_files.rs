use std::path::Path;

const MIGRATIONS_DIR: &str = "db/migrate/";

/// Changed paths of a deploy, classified by what the report calls out.
#[derive(Debug, Clone, Default)]
pub struct ChangedFiles {
    files: Vec<String>,
    /// Blob URL prefix at the deployed revision, ending in `/`
    versioned_url: String,
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

impl ChangedFiles {
    pub fn new(files: Vec<String>, versioned_url: impl Into<String>) -> Self {
        Self {
            files,
            versioned_url: versioned_url.into(),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn named(&self, names: &[&str]) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| names.contains(&file_name(f)))
            .cloned()
            .collect()
    }

    /// Migration files as links to their content at the deployed revision
    pub fn migrations(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.starts_with(MIGRATIONS_DIR))
            .map(|f| format!("{}{}", self.versioned_url, f))
            .collect()
    }

    pub fn ruby_dependencies(&self) -> Vec<String> {
        self.named(&["Gemfile.lock"])
    }

    pub fn javascript_dependencies(&self) -> Vec<String> {
        self.named(&["package.json"])
    }

    pub fn elm_packages(&self) -> Vec<String> {
        self.named(&["elm.json", "elm-package.json"])
    }
}
