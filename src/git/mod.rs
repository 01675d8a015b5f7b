// Git module providing the repository queries used by both commands

mod diff;
mod repository;
mod utils;

pub use diff::{DIRSTAT_THRESHOLD_PERCENT, DiffSummary, DirStat, changed_lines_per_file, dirstat};
pub use repository::{GitRepo, RangeChanges};

pub use utils::*;
