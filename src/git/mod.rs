//! Git operations: subprocess wrapper plus read-only status inspection.

pub mod command;
pub mod status;

pub use command::{Git, MAX_DIFF_LENGTH, StagedDiff};
pub use status::{ChangedFile, FileStatus, changed_files};
