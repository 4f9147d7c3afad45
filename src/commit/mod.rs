//! Commit message drafting: prompt, cleanup, and interactive review.

pub mod message;
pub mod picker;
pub mod prompt;
pub mod review;

pub use message::{CONVENTIONAL_TYPES, CommitMessage, ConventionalHeader, normalize_response};
pub use picker::select_files;
pub use prompt::{MAX_SUBJECT_LENGTH, build_commit_prompt, sanitize_diff};
pub use review::{Decision, Reviewer, TerminalReviewer};
