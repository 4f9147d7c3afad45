//! Interactive accept/edit/abort step before committing.

use dialoguer::{Editor, Input, Select};

use crate::commit::message::CommitMessage;
use crate::commit::picker::select_files;
use crate::error::CommitError;
use crate::git::ChangedFile;

/// What the user wants to do with a drafted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Edit,
    Abort,
}

/// Every interactive prompt the pipeline needs.
///
/// This abstraction allows driving the pipeline without a terminal in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Reviewer {
    /// Show the message and ask what to do with it.
    fn review(&self, message: &CommitMessage) -> Decision;

    /// Let the user rewrite the message.
    fn edit(&self, message: &CommitMessage) -> Result<CommitMessage, CommitError>;

    /// Let the user choose which changed files to stage.
    fn pick_files(&self, files: &[ChangedFile]) -> Result<Vec<String>, CommitError>;
}

/// Reviewer backed by dialoguer prompts on the terminal.
#[derive(Debug, Default)]
pub struct TerminalReviewer;

impl Reviewer for TerminalReviewer {
    fn review(&self, message: &CommitMessage) -> Decision {
        println!();
        println!("{}", message.format());
        println!();

        let choice = Select::new()
            .with_prompt("Commit with this message?")
            .items(&["Accept", "Edit", "Abort"])
            .default(0)
            .interact_opt();

        match choice {
            Ok(Some(0)) => Decision::Accept,
            Ok(Some(1)) => Decision::Edit,
            // Esc, Ctrl-C, or a broken terminal
            _ => Decision::Abort,
        }
    }

    fn edit(&self, message: &CommitMessage) -> Result<CommitMessage, CommitError> {
        let subject: String = Input::new()
            .with_prompt("Subject")
            .with_initial_text(message.subject.clone())
            .interact_text()
            .map_err(|e| CommitError::PromptFailed(e.to_string()))?;

        let body = match message.body.as_deref() {
            Some(body) => Editor::new()
                .edit(body)
                .map_err(|e| CommitError::PromptFailed(e.to_string()))?
                // Closing the editor without saving keeps the old body
                .or_else(|| Some(body.to_string())),
            None => None,
        };

        Ok(CommitMessage::new(subject.trim(), body))
    }

    fn pick_files(&self, files: &[ChangedFile]) -> Result<Vec<String>, CommitError> {
        select_files(files)
    }
}

