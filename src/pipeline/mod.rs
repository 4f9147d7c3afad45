//! Commit pipeline: staged diff -> prompt -> model -> review -> `git commit`.

use anyhow::{Context, Result};
use git2::Repository;
use tracing::{debug, warn};

use crate::commit::{
    CommitMessage, Decision, MAX_SUBJECT_LENGTH, Reviewer, build_commit_prompt,
    normalize_response,
};
use crate::error::GitError;
use crate::git::{Git, changed_files};
use crate::llm::Generator;

pub const NOTHING_STAGED_MESSAGE: &str = "No staged changes. Stage files with `git add` first.";

/// Options for one run, derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub list: bool,
    pub interactive: bool,
    pub debug: bool,
}

/// How a run ended. Every variant is a successful exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed,
    NothingStaged,
    DryRun(CommitMessage),
    Committed(CommitMessage),
    Aborted,
}

/// Run the commit pipeline once.
///
/// The staged diff is read exactly once, before the single model call.
pub async fn run<G, R>(
    git: &Git,
    options: &RunOptions,
    generator: &G,
    reviewer: &R,
) -> Result<Outcome>
where
    G: Generator + ?Sized,
    R: Reviewer + ?Sized,
{
    git.check_repository()?;

    // ── Stage 1: Optional file picker ──
    if options.interactive {
        stage_interactively(git, reviewer)?;
    }

    // ── Stage 2: Listing ──
    if options.list {
        let files = git.staged_files().context("Failed to list staged files")?;
        if files.is_empty() {
            println!("{}", NOTHING_STAGED_MESSAGE);
        }
        for file in &files {
            println!("{}\t{}", file.status.letter(), file.path);
        }
        return Ok(Outcome::Listed);
    }

    // ── Stage 3: Staged diff ──
    let diff = git.staged_diff().context("Failed to read staged changes")?;
    if diff.is_empty() {
        println!("{}", NOTHING_STAGED_MESSAGE);
        return Ok(Outcome::NothingStaged);
    }

    // ── Stage 4: Prompt and model call ──
    let branch = git.current_branch();
    let prompt = build_commit_prompt(&diff, branch.as_deref());
    debug!("Commit prompt length: {} chars", prompt.len());
    if options.debug {
        eprintln!("--- Prompt ---\n{}\n--- End prompt ---", prompt);
    }

    eprintln!("Generating commit message for {} staged file(s)...", diff.files.len());
    let completion = generator
        .generate(&prompt)
        .await
        .context("Failed to generate commit message")?;

    if let Some(ref http_error) = completion.primary_error {
        debug!("Used `ollama run` after HTTP failure: {}", http_error);
    }
    debug!(
        "{} returned {} chars",
        completion.provider.display_name(),
        completion.text.len()
    );
    if options.debug {
        eprintln!("--- Raw response ---\n{}\n--- End response ---", completion.text);
    }

    // ── Stage 5: Normalize ──
    let mut message = normalize_response(&completion.text)?;
    warn_on_style(&message);

    if options.dry_run {
        println!("--- Dry run ---");
        println!("{}", message.format());
        return Ok(Outcome::DryRun(message));
    }

    // ── Stage 6: Review loop ──
    loop {
        match reviewer.review(&message) {
            Decision::Accept => {
                let summary = git
                    .commit(&message.format())
                    .context("Failed to create commit")?;
                if !summary.is_empty() {
                    println!("{}", summary);
                }
                return Ok(Outcome::Committed(message));
            }
            Decision::Edit => match reviewer.edit(&message) {
                Ok(edited) if !edited.subject.trim().is_empty() => {
                    message = edited;
                    warn_on_style(&message);
                }
                Ok(_) => eprintln!("Subject cannot be empty; keeping the previous message."),
                Err(e) => {
                    debug!("Edit prompt failed: {}", e);
                    println!("Commit aborted.");
                    return Ok(Outcome::Aborted);
                }
            },
            Decision::Abort => {
                println!("Commit aborted.");
                return Ok(Outcome::Aborted);
            }
        }
    }
}

/// Let the user pick unstaged files and stage them.
///
/// Returns the paths that were staged.
pub fn stage_interactively<R: Reviewer + ?Sized>(git: &Git, reviewer: &R) -> Result<Vec<String>> {
    let repo = Repository::discover(git.workdir()).map_err(GitError::StatusFailed)?;
    let files = changed_files(&repo)?;

    if files.is_empty() {
        println!("No unstaged changes to pick from.");
        return Ok(Vec::new());
    }

    let chosen = reviewer
        .pick_files(&files)
        .context("File selection failed")?;
    git.stage_paths(&chosen)?;

    if !chosen.is_empty() {
        println!("Staged {} file(s)", chosen.len());
    }
    Ok(chosen)
}

fn warn_on_style(message: &CommitMessage) {
    if !message.is_conventional() {
        warn!(
            "Subject does not follow Conventional Commits: {}",
            message.subject
        );
    }
    let len = message.subject.chars().count();
    if len > MAX_SUBJECT_LENGTH {
        warn!(
            "Subject is {} characters (limit {})",
            len, MAX_SUBJECT_LENGTH
        );
    }
}
