//! Deploy summaries: what changed between two deploy tags or branches.

pub mod changed_files;
pub mod cli;
pub mod dependencies;
pub mod pull_requests;
pub mod summary;
pub mod timing;

pub use changed_files::ChangedFiles;
pub use cli::{DeployAction, DeployArgs, deploy_pairs, handle_deploy_command};
pub use summary::{DeployOptions, DeploySummary, Section, reference};
pub use timing::{parse_when, time_between_deploys};
