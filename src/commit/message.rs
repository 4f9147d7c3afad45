//! Commit message type and cleanup of raw model output.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::commit::prompt::{remove_ansi_escapes, remove_control_chars};
use crate::error::CommitError;

/// Conventional commit types accepted by [`CommitMessage::is_conventional`].
pub const CONVENTIONAL_TYPES: &[&str] = &[
    "feat", "fix", "build", "chore", "ci", "docs", "style", "refactor", "perf", "test", "revert",
];

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()\s]+)\))?(?P<bang>!)?: (?P<desc>\S.*)$")
        .expect("Invalid regex")
});

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think(?:ing)?>.*?</think(?:ing)?>").expect("Invalid regex"));

/// An unmatched opening tag; everything after it is cut-off reasoning.
static THINK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<think(?:ing)?>").expect("Invalid regex"));

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*$").expect("Invalid regex"));

/// A line that only announces the message, e.g. `Here is the commit message:`.
static PREAMBLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:here(?:'s| is| are)\b.*|sure\b.*|(?:suggested |proposed |generated )?commit message(?: for [^:]*)?)\s*:\s*$",
    )
    .expect("Invalid regex")
});

/// An inline label in front of the subject, e.g. `Commit message: fix: x`.
static INLINE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:suggested |proposed |generated )?commit message|subject)\s*:\s*")
        .expect("Invalid regex")
});

/// A commit message ready for review and `git commit -m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub subject: String,
    pub body: Option<String>,
}

/// Parsed `type(scope)!: description` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalHeader {
    pub kind: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
}

impl CommitMessage {
    pub fn new(subject: impl Into<String>, body: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.filter(|b| !b.trim().is_empty()),
        }
    }

    /// Format the commit message for git: subject, blank line, body.
    pub fn format(&self) -> String {
        match self.body.as_deref().map(str::trim) {
            Some(body) if !body.is_empty() => format!("{}\n\n{}", self.subject, body),
            _ => self.subject.clone(),
        }
    }

    /// Parse the subject as a Conventional Commits header.
    ///
    /// `breaking` is also set by a `BREAKING CHANGE:` footer in the body.
    pub fn parse_header(&self) -> Option<ConventionalHeader> {
        let caps = HEADER.captures(&self.subject)?;

        let footer_breaking = self.body.as_deref().is_some_and(|body| {
            body.lines().any(|line| {
                line.starts_with("BREAKING CHANGE:") || line.starts_with("BREAKING-CHANGE:")
            })
        });

        Some(ConventionalHeader {
            kind: caps["type"].to_string(),
            scope: caps.name("scope").map(|m| m.as_str().to_string()),
            breaking: caps.name("bang").is_some() || footer_breaking,
            description: caps["desc"].trim().to_string(),
        })
    }

    /// Whether the subject uses a known conventional type.
    pub fn is_conventional(&self) -> bool {
        self.parse_header()
            .is_some_and(|h| CONVENTIONAL_TYPES.contains(&h.kind.to_ascii_lowercase().as_str()))
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Turn raw model output into a [`CommitMessage`].
///
/// Strips reasoning blocks, a fence around the whole reply, chatty
/// preambles and wrapping quotes. The first non-empty line becomes the subject (without a trailing
/// period) and the rest becomes the body.
pub fn normalize_response(raw: &str) -> Result<CommitMessage, CommitError> {
    let mut text = remove_ansi_escapes(&remove_control_chars(raw));

    text = THINK_BLOCK.replace_all(&text, "").into_owned();
    // Unbalanced reasoning output: keep only what follows the last close tag.
    if let Some(idx) = text.rfind("</think>") {
        text = text[idx + "</think>".len()..].to_string();
    }
    if let Some(m) = THINK_OPEN.find(&text) {
        let start = m.start();
        text.truncate(start);
    }

    let lines = unwrap_fence(drop_preamble(&text));
    let text = strip_wrapping_quotes(lines.join("\n").trim()).to_string();

    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }

    let Some((first, rest)) = lines.split_first() else {
        return Err(CommitError::EmptyMessage);
    };

    let subject = clean_subject(first);
    if subject.is_empty() {
        return Err(CommitError::EmptyMessage);
    }

    let body = collapse_blank_lines(rest);
    Ok(CommitMessage::new(subject, Some(body)))
}

/// Drop leading lines that only introduce the message.
fn drop_preamble(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.trim().lines().map(str::to_string).collect();

    loop {
        let Some(first) = lines.first() else {
            break;
        };
        let stripped = first.trim().trim_matches('*').trim();
        if stripped.is_empty() || PREAMBLE_LINE.is_match(stripped) {
            lines.remove(0);
        } else {
            break;
        }
    }

    if let Some(first) = lines.first_mut() {
        let stripped = first.trim().trim_start_matches('*').trim_start();
        if let Some(m) = INLINE_LABEL.find(stripped) {
            *first = stripped[m.end()..].trim_start_matches('*').trim().to_string();
        }
    }

    lines
}

/// Unwrap a code fence only when it opens the response.
///
/// Text after the closing fence is chatter and is dropped. A fence that
/// appears later belongs to the body and is left alone.
fn unwrap_fence(lines: Vec<String>) -> Vec<String> {
    let is_fence = |line: &str| FENCE_LINE.is_match(line.trim());

    if !lines.first().is_some_and(|first| is_fence(first.as_str())) {
        return lines;
    }

    match lines.iter().rposition(|line| is_fence(line.as_str())) {
        Some(close) if close > 0 => lines[1..close].to_vec(),
        // Unterminated fence
        _ => lines[1..].to_vec(),
    }
}

/// Strip one pair of matching quotes around the whole text.
///
/// Nothing is stripped when the quote also appears inside, e.g.
/// `` `a` and `b` `` is two spans, not one quoted string.
fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            if inner.contains(quote) {
                return text;
            }
            return inner.trim();
        }
    }
    text
}

fn clean_subject(line: &str) -> String {
    let subject = strip_wrapping_quotes(line.trim()).trim();
    let subject = subject.strip_suffix('.').unwrap_or(subject);
    subject.trim_end().to_string()
}

/// Join body lines, collapsing runs of blank lines into one.
fn collapse_blank_lines(lines: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if out.last().is_some_and(|l| l.is_empty()) || out.is_empty() {
                continue;
            }
            out.push("");
        } else {
            out.push(line);
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
