//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use quill::{
    ChangedFile, CommitError, CommitMessage, Completion, Decision, Generator, Git, LlmError,
    Provider, Reviewer,
};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a local identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to set commit.gpgsign");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> Git {
        Git::new(self.path())
    }

    /// Write a file in the work tree without staging it.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write a file and add it to the index.
    pub fn stage_file(&self, name: &str, content: &str) {
        self.write_file(name, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(name))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is in the index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Full message of HEAD, or `None` before the first commit.
    pub fn head_message(&self) -> Option<String> {
        let head = self.repo.head().ok()?.peel_to_commit().ok()?;
        head.message().map(|m| m.trim_end().to_string())
    }

    pub fn commit_count(&self) -> usize {
        let Ok(mut walk) = self.repo.revwalk() else {
            return 0;
        };
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }

    /// Paths currently staged relative to HEAD (or the empty tree).
    pub fn staged_paths(&self) -> Vec<String> {
        self.git()
            .staged_files()
            .expect("Failed to list staged files")
            .into_iter()
            .map(|f| f.path)
            .collect()
    }
}

/// Generator that returns a fixed response and records prompts.
pub struct FixedGenerator {
    pub response: String,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl FixedGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("poisoned").len()
    }
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, prompt: &str) -> Result<Completion, LlmError> {
        self.prompts
            .lock()
            .expect("poisoned")
            .push(prompt.to_string());
        Ok(Completion {
            text: self.response.clone(),
            provider: Provider::Ollama,
            primary_error: None,
        })
    }
}

/// Reviewer that replays a script of decisions and edits.
#[derive(Default)]
pub struct ScriptedReviewer {
    pub decisions: RefCell<VecDeque<Decision>>,
    pub edits: RefCell<VecDeque<CommitMessage>>,
    pub picks: RefCell<Vec<String>>,
    pub reviewed: RefCell<Vec<CommitMessage>>,
}

impl ScriptedReviewer {
    pub fn new(decisions: &[Decision]) -> Self {
        Self {
            decisions: RefCell::new(decisions.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn with_edit(self, message: CommitMessage) -> Self {
        self.edits.borrow_mut().push_back(message);
        self
    }

    pub fn with_picks(self, paths: &[&str]) -> Self {
        *self.picks.borrow_mut() = paths.iter().map(|p| p.to_string()).collect();
        self
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&self, message: &CommitMessage) -> Decision {
        self.reviewed.borrow_mut().push(message.clone());
        self.decisions
            .borrow_mut()
            .pop_front()
            .unwrap_or(Decision::Abort)
    }

    fn edit(&self, _message: &CommitMessage) -> Result<CommitMessage, CommitError> {
        self.edits
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CommitError::PromptFailed("no scripted edit".to_string()))
    }

    fn pick_files(&self, _files: &[ChangedFile]) -> Result<Vec<String>, CommitError> {
        Ok(self.picks.borrow().clone())
    }
}
