//! Pull request checklists
//!
//! A fixed, ordered registry of checklist rules is matched against the files
//! a pull request changes; the checklists that apply are appended to the
//! pull request body exactly once, identified by an embedded marker.

mod annotator;
mod builtins;
mod error;
mod matcher;
mod registry;
mod rule;

pub use annotator::{Annotation, annotate, checklist_comment};
pub use builtins::builtin_checklists;
pub use error::ChecklistError;
pub use matcher::{ChecklistMatch, MatchResult, match_files};
pub use registry::{
    ChecklistDefinition, ChecklistFile, ChecklistRegistry, RegistryBuilder, load_from_file,
    load_from_str,
};
pub use rule::{Checklist, PathMatcher, PathRule};
