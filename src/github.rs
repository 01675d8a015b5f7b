//! Pull request access for the checklist annotator.

use crate::log_debug;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("--token or GITHUB_TOKEN must be set")]
    MissingToken,
}

/// One side of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    pub sha: String,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    /// GitHub returns `null` for a pull request without a description
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub base: GitRef,
    pub head: GitRef,
}

impl PullRequest {
    /// Body text, with a missing body treated as empty
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Operations the annotator needs from an issue tracker.
#[async_trait]
pub trait PullRequestClient: Send + Sync {
    /// The first open pull request whose head is `org:branch`.
    async fn find_open_pull_request(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<PullRequest>, GitHubError>;

    /// Replace the pull request description.
    async fn update_body(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError>;

    /// Post a comment on the pull request conversation.
    async fn add_comment(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError>;
}

/// REST v3 implementation of [`PullRequestClient`]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, GitHubError> {
        if token.trim().is_empty() {
            return Err(GitHubError::MissingToken);
        }
        let client = Client::builder()
            .user_agent(concat!("deploy-complexity/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
    }

    async fn send(&self, url: String, request: RequestBuilder) -> Result<String, GitHubError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GitHubError::Status {
                url,
                status,
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl PullRequestClient for GitHubClient {
    async fn find_open_pull_request(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<PullRequest>, GitHubError> {
        let url = self.url(&format!("/repos/{org}/{repo}/pulls"));
        log_debug!("Looking up open pull requests for {}:{}", org, branch);
        let head = format!("{org}:{branch}");
        let request = self
            .client
            .get(&url)
            .query(&[("head", head.as_str()), ("state", "open")]);
        let text = self.send(url, request).await?;
        let pulls: Vec<PullRequest> = serde_json::from_str(&text)?;
        log_debug!("Found {} open pull request(s)", pulls.len());
        Ok(pulls.into_iter().next())
    }

    async fn update_body(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let url = self.url(&format!("/repos/{org}/{repo}/issues/{number}"));
        log_debug!("Updating body of {}/{}#{}", org, repo, number);
        let request = self.client.patch(&url).json(&json!({ "body": body }));
        self.send(url, request).await?;
        Ok(())
    }

    async fn add_comment(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let url = self.url(&format!("/repos/{org}/{repo}/issues/{number}/comments"));
        log_debug!("Commenting on {}/{}#{}", org, repo, number);
        let request = self.client.post(&url).json(&json!({ "body": body }));
        self.send(url, request).await?;
        Ok(())
    }
}
