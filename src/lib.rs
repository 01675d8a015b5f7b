//! deploy-complexity - release engineering helpers
//!
//! Summarizes what a deploy ships and keeps pull request checklists in sync
//! with the files a pull request changes.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod checklist;
pub mod cli;
pub mod common;
pub mod config;
pub mod deploy;
pub mod git;
pub mod github;
pub mod logger;
pub mod pr_checklist;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use checklist::{
    Annotation, Checklist, ChecklistError, ChecklistRegistry, MatchResult, PathRule, annotate,
    match_files,
};
pub use config::Config;
pub use github::{GitHubClient, GitHubError, PullRequest, PullRequestClient};
