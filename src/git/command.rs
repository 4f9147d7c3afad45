//! Git subprocess wrapper: check, diff, stage, and commit.
//!
//! All operations use `std::process::Command` to shell out to the system `git`
//! binary, inheriting the user's existing git config, hooks, and signing setup.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;
use crate::git::status::{ChangedFile, FileStatus};

/// Maximum characters of staged diff text handed to the prompt builder.
pub const MAX_DIFF_LENGTH: usize = 30_000;

/// Staged changes read once, before the model call.
#[derive(Debug, Clone, Default)]
pub struct StagedDiff {
    pub diff_text: String,
    pub files: Vec<ChangedFile>,
    pub truncated: bool,
}

impl StagedDiff {
    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.diff_text.trim().is_empty()
    }
}

/// Handle to a work tree that runs `git` with that directory as cwd.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Git handle for the process's current directory.
    pub fn current() -> Self {
        Self::new(".")
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Fail unless the working directory is inside a git work tree.
    pub fn check_repository(&self) -> Result<(), GitError> {
        match self.run(&["rev-parse", "--is-inside-work-tree"], "rev-parse") {
            Ok(out) if out.trim() == "true" => Ok(()),
            Ok(_) | Err(GitError::CommandFailed { .. }) => Err(GitError::NotARepository),
            Err(e) => Err(e),
        }
    }

    /// Read the staged diff and the list of staged files.
    ///
    /// The diff text is capped at [`MAX_DIFF_LENGTH`] characters.
    pub fn staged_diff(&self) -> Result<StagedDiff, GitError> {
        let raw = self.run(
            &["diff", "--cached", "--no-color", "--no-ext-diff"],
            "diff --cached",
        )?;
        let files = self.staged_files()?;

        let (diff_text, truncated) = truncate_diff(raw, MAX_DIFF_LENGTH);
        debug!(
            "Staged diff: {} files, {} chars, truncated={}",
            files.len(),
            diff_text.len(),
            truncated
        );

        Ok(StagedDiff {
            diff_text,
            files,
            truncated,
        })
    }

    /// List staged files with their status.
    pub fn staged_files(&self) -> Result<Vec<ChangedFile>, GitError> {
        let out = self.run(
            &["diff", "--cached", "--name-status", "-z"],
            "diff --name-status",
        )?;
        Ok(parse_name_status(&out))
    }

    /// Short name of the checked-out branch, `None` on a detached HEAD.
    pub fn current_branch(&self) -> Option<String> {
        self.run(&["symbolic-ref", "--short", "-q", "HEAD"], "symbolic-ref")
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Stage the given paths. An empty list is a no-op.
    pub fn stage_paths(&self, paths: &[String]) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args, "add")?;
        Ok(())
    }

    /// Create a commit from the staged changes. Returns git's summary output.
    pub fn commit(&self, message: &str) -> Result<String, GitError> {
        let out = self.run(&["commit", "-m", message], "commit")?;
        Ok(out.trim().to_string())
    }

    /// Run a git command and return stdout or a descriptive error.
    fn run(&self, args: &[&str], operation: &str) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Parse NUL-separated `git diff --name-status -z` output.
///
/// Renames and copies carry two paths (old, then new); everything else one.
fn parse_name_status(output: &str) -> Vec<ChangedFile> {
    let mut files = Vec::new();
    let mut fields = output.split('\0').filter(|f| !f.is_empty());

    while let Some(code) = fields.next() {
        let Some(status) = FileStatus::from_letter(code) else {
            // Unknown status letter: consume its path and move on.
            fields.next();
            continue;
        };

        match status {
            FileStatus::Renamed | FileStatus::Copied => {
                let (Some(old), Some(new)) = (fields.next(), fields.next()) else {
                    break;
                };
                files.push(ChangedFile {
                    path: new.to_string(),
                    status,
                    old_path: Some(old.to_string()),
                });
            }
            _ => {
                let Some(path) = fields.next() else {
                    break;
                };
                files.push(ChangedFile {
                    path: path.to_string(),
                    status,
                    old_path: None,
                });
            }
        }
    }

    files
}

/// Cap diff text at `max_chars` characters.
fn truncate_diff(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => {
            text.truncate(end);
            (text, true)
        }
        None => (text, false),
    }
}
