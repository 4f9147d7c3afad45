//! Changed-file listing using git2.
//!
//! Used by the interactive picker, which needs every file with pending
//! working-tree changes, including untracked ones.

use std::fmt;

use git2::{Repository, Status, StatusOptions};

use crate::error::GitError;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
    Untracked,
}

impl FileStatus {
    /// Map a `git diff --name-status` letter (e.g. `M`, `R100`) to a status.
    pub fn from_letter(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'A' => Some(FileStatus::Added),
            'M' => Some(FileStatus::Modified),
            'D' => Some(FileStatus::Deleted),
            'R' => Some(FileStatus::Renamed),
            'C' => Some(FileStatus::Copied),
            'T' => Some(FileStatus::TypeChanged),
            _ => None,
        }
    }

    /// Single-letter code as printed by `git status --short`.
    pub fn letter(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
            FileStatus::Copied => 'C',
            FileStatus::TypeChanged => 'T',
            FileStatus::Untracked => '?',
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
            FileStatus::Copied => write!(f, "Copied"),
            FileStatus::TypeChanged => write!(f, "Type changed"),
            FileStatus::Untracked => write!(f, "Untracked"),
        }
    }
}

/// A file with pending changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    /// Old path for renamed or copied files.
    pub old_path: Option<String>,
}

/// List files with unstaged or untracked changes in the work tree.
///
/// Files that are only staged are skipped; the picker exists to stage
/// things, not to re-stage them.
pub fn changed_files(repo: &Repository) -> Result<Vec<ChangedFile>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts)).map_err(GitError::StatusFailed)?;

    let mut files = Vec::new();
    for entry in statuses.iter() {
        let Some(status) = workdir_status(entry.status()) else {
            continue;
        };

        let diff = entry.index_to_workdir();
        let new_path = diff
            .as_ref()
            .and_then(|d| d.new_file().path())
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| entry.path().map(String::from));
        let old_path = diff
            .as_ref()
            .and_then(|d| d.old_file().path())
            .map(|p| p.to_string_lossy().to_string());

        let Some(path) = new_path.filter(|p| !p.is_empty()) else {
            continue;
        };

        let old_path = match status {
            FileStatus::Renamed => old_path.filter(|old| *old != path),
            _ => None,
        };

        files.push(ChangedFile {
            path,
            status,
            old_path,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn workdir_status(status: Status) -> Option<FileStatus> {
    if status.contains(Status::WT_NEW) {
        Some(FileStatus::Untracked)
    } else if status.contains(Status::WT_DELETED) {
        Some(FileStatus::Deleted)
    } else if status.contains(Status::WT_RENAMED) {
        Some(FileStatus::Renamed)
    } else if status.contains(Status::WT_TYPECHANGE) {
        Some(FileStatus::TypeChanged)
    } else if status.contains(Status::WT_MODIFIED) {
        Some(FileStatus::Modified)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn init_repo_with_commit(dir: &Path, files: &[(&str, &str)]) -> Repository {
        let repo = Repository::init(dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        {
            let mut index = repo.index().unwrap();
            for (name, _) in files {
                index.add_path(Path::new(name)).unwrap();
            }
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_file_status_display() {
        assert_eq!(FileStatus::Added.to_string(), "Added");
        assert_eq!(FileStatus::Modified.to_string(), "Modified");
        assert_eq!(FileStatus::Deleted.to_string(), "Deleted");
        assert_eq!(FileStatus::Renamed.to_string(), "Renamed");
        assert_eq!(FileStatus::Untracked.to_string(), "Untracked");
    }

    #[test]
    fn test_from_letter_handles_similarity_scores() {
        assert_eq!(FileStatus::from_letter("M"), Some(FileStatus::Modified));
        assert_eq!(FileStatus::from_letter("R087"), Some(FileStatus::Renamed));
        assert_eq!(FileStatus::from_letter("C100"), Some(FileStatus::Copied));
        assert_eq!(FileStatus::from_letter("X"), None);
        assert_eq!(FileStatus::from_letter(""), None);
    }

    #[test]
    fn test_changed_files_clean_repo_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path(), &[("a.txt", "a\n")]);

        let files = changed_files(&repo).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_changed_files_lists_untracked_and_modified() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path(), &[("a.txt", "a\n"), ("b.txt", "b\n")]);

        std::fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
        std::fs::write(dir.path().join("new.txt"), "new\n").unwrap();
        std::fs::remove_file(dir.path().join("b.txt")).unwrap();

        let files = changed_files(&repo).unwrap();
        let summary: Vec<(&str, FileStatus)> =
            files.iter().map(|f| (f.path.as_str(), f.status)).collect();

        assert_eq!(
            summary,
            vec![
                ("a.txt", FileStatus::Modified),
                ("b.txt", FileStatus::Deleted),
                ("new.txt", FileStatus::Untracked),
            ]
        );
    }

    #[test]
    fn test_changed_files_skips_fully_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path(), &[("a.txt", "a\n")]);

        std::fs::write(dir.path().join("a.txt"), "staged\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();

        let files = changed_files(&repo).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_changed_files_recurses_untracked_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path(), &[("a.txt", "a\n")]);

        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "fn main() {}\n").unwrap();

        let files = changed_files(&repo).unwrap();
        assert!(files.iter().any(|f| f.path == "src/nested/lib.rs"));
    }
}
