//! Prompt construction for AI-generated commit messages.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::git::StagedDiff;

/// Maximum length for sanitized diff text.
const MAX_DIFF_SANITIZED_LENGTH: usize = 30_000;

/// Maximum subject line length requested from the model.
pub const MAX_SUBJECT_LENGTH: usize = 72;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
        .expect("Invalid regex")
});

static INJECTION_PATTERNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)ignore\s+(?:all\s+)?(?:previous|prior|above)\s+instructions|disregard\s+(?:all\s+)?(?:previous|prior|above)\s+instructions|forget\s+(?:all\s+)?(?:previous|prior|your)\s+instructions|you\s+are\s+now\s+a|new\s+instructions\s*:|system\s+prompt\s*:",
    )
    .expect("Invalid regex")
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("Invalid regex"));

/// Build the LLM prompt for generating a commit message.
///
/// Includes the list of staged files, the sanitized diff, and the branch name
/// when one is checked out.
pub fn build_commit_prompt(diff: &StagedDiff, branch: Option<&str>) -> String {
    let files_section: String = diff
        .files
        .iter()
        .map(|f| match &f.old_path {
            Some(old) => format!("- {} -> {} ({})", old, f.path, f.status),
            None => format!("- {} ({})", f.path, f.status),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let sanitized_diff = sanitize_diff(&diff.diff_text, MAX_DIFF_SANITIZED_LENGTH);

    let truncation_note = if diff.truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    let branch_section = match branch {
        Some(name) => format!("\n\n## Branch\n{}", sanitize_line(name)),
        None => String::new(),
    };

    format!(
        r#"You are writing a Git commit message following the Conventional Commits specification.

## Staged Files
{files_section}

## Diff
```
{sanitized_diff}
```{truncation_note}{branch_section}

## Rules
- Subject format: `type(scope): description` (scope is optional)
- Type: one of feat, fix, build, chore, ci, docs, style, refactor, perf, test, revert
- Add `!` after the type or scope only for breaking changes
- The subject line MUST be at most {MAX_SUBJECT_LENGTH} characters
- Use the imperative mood ("add", "fix", "remove"), lowercase after the colon
- Do NOT end the subject with a period
- A body is optional. If you add one, leave a blank line after the subject, explain why the change was made, and wrap lines at 72 characters

Respond with ONLY the commit message. No explanation, no markdown, no quotes."#
    )
}

/// Sanitize diff text for inclusion in an LLM prompt.
///
/// Removes control characters and ANSI escapes, neutralizes known prompt
/// injection phrases, collapses blank-line runs, then truncates.
pub fn sanitize_diff(text: &str, max_len: usize) -> String {
    let mut result = remove_control_chars(text);
    result = remove_ansi_escapes(&result);
    result = filter_injection_patterns(&result);
    result = normalize_whitespace(&result);

    if let Some((end, _)) = result.char_indices().nth(max_len) {
        result.truncate(end);
    }

    result
}

/// Remove control characters except newline and tab.
///
/// ESC is kept so that [`remove_ansi_escapes`] can still match whole sequences.
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t' || c == '\x1b')
        .collect()
}

pub fn remove_ansi_escapes(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").replace('\x1b', "")
}

pub fn filter_injection_patterns(text: &str) -> String {
    INJECTION_PATTERNS
        .replace_all(text, "[filtered]")
        .into_owned()
}

/// Collapse three or more consecutive newlines (with only whitespace between)
/// into a single blank line.
pub fn normalize_whitespace(text: &str) -> String {
    BLANK_RUNS.replace_all(text, "\n\n").into_owned()
}

fn sanitize_line(text: &str) -> String {
    remove_ansi_escapes(&remove_control_chars(text))
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
