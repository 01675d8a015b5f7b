//! Idempotent pull request annotation.
//!
//! The only persisted state is the pull request body itself: each applied
//! checklist leaves an HTML comment marker (`<!-- checklist:Name -->`)
//! that a later run finds with a plain text search.

use super::matcher::{ChecklistMatch, MatchResult};
use std::fmt::Write;

/// Outcome of annotating a pull request body.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Body to write back. Equal to the input when nothing is new.
    pub new_body: String,
    /// Checklists appended by this run.
    pub newly_added: MatchResult,
    /// Checklists whose marker was already in the body.
    pub already_present: MatchResult,
    /// Summary comment; `Some` exactly when `newly_added` is non-empty.
    pub comment: Option<String>,
}

impl Annotation {
    /// Whether the body needs to be written back.
    pub fn has_changes(&self) -> bool {
        !self.newly_added.is_empty()
    }
}

/// Compute the new body and summary comment for `current_body`.
///
/// Never performs I/O; persisting the body and posting the comment is up to
/// the caller. Once the body is written, a retry sees the markers and adds
/// nothing, even if the comment failed to post.
pub fn annotate(current_body: &str, matches: MatchResult) -> Annotation {
    let (already_present, newly_added) =
        matches.partition(|m| m.checklist.is_present_in(current_body));

    if newly_added.is_empty() {
        return Annotation {
            new_body: current_body.to_string(),
            newly_added,
            already_present,
            comment: None,
        };
    }

    let mut new_body = current_body.to_string();
    for m in &newly_added {
        new_body.push_str(&m.checklist.for_pr_body());
    }

    let comment = Some(checklist_comment(&newly_added));
    Annotation {
        new_body,
        newly_added,
        already_present,
        comment,
    }
}

/// One comment covering every newly added checklist.
pub fn checklist_comment(added: &MatchResult) -> String {
    let noun = if added.len() == 1 {
        "a checklist"
    } else {
        "some checklists"
    };

    let mut comment = format!(
        "🤖 Beep boop! I added {noun}! Why?\n\n\
         | I added this checklist | because these files changed |\n\
         |---|---|\n"
    );
    for m in added {
        let _ = writeln!(comment, "| {} | {}|", m.checklist.human_name(), quoted_files(m));
    }
    comment.push_str(
        "\nPlease take a look at the updated pull request body and make sure you check off any new items. Thanks!",
    );
    comment
}

fn quoted_files(m: &ChecklistMatch) -> String {
    m.files
        .iter()
        .map(|f| format!("`{f}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
