//! Heuristics for discarding turns that carry no authored content.

use std::sync::LazyLock;

use regex::Regex;

use crate::conversation::Turn;

/// Markers in user text that identify a session-exit turn.
const EXIT_MARKERS: &[&str] = &[
    "<command-name>exit</command-name>",
    "<local-command-stdout>(no content)</local-command-stdout>",
];

/// Lines consisting of only these tokens are ignored by the tool-only rule.
const STRUCTURAL_TOKENS: &[&str] = &["---", "{", "}", "[", "]"];

/// Substrings that mark a line as a tool echo rather than prose.
const TOOL_REFERENCE_PATTERNS: &[&str] = &[
    "Edit file:",
    "Write file:",
    "Read file:",
    "TodoWrite:",
    "Bash:",
    "Task:",
    "Grep:",
    "Glob:",
    "MultiEdit:",
    "LS:",
    "<details>",
    "</details>",
    "\"todos\":",
    "\"id\":",
    "\"content\":",
    "\"status\":",
    "\"priority\":",
    "\"command\":",
    "\"description\":",
    "\"prompt\":",
    "\"file_path\":",
    "\"edits\":",
    "\"old_string\":",
    "\"new_string\":",
    "\"path\":",
    "\"pattern\":",
    "```",
];

// A bare JSON field line: starts with a quote, ends with `",` or `":`.
static JSON_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:(?s:.*)")?[,:]$"#).unwrap());

/// Outcome of classifying a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnVerdict {
    Keep,
    /// The user text is a session-exit command.
    DiscardExit,
    /// No user text and the assistant text is only tool echoes.
    DiscardToolOnly,
}

/// Classify a turn from its already-extracted texts.
pub fn classify_texts(user_text: &str, assistant_text: &str) -> TurnVerdict {
    let user = user_text.trim();
    let assistant = assistant_text.trim();

    if !user.is_empty() && EXIT_MARKERS.iter().any(|m| user.contains(m)) {
        return TurnVerdict::DiscardExit;
    }

    if user.is_empty() && !assistant.is_empty() && is_tool_only(assistant) {
        return TurnVerdict::DiscardToolOnly;
    }

    TurnVerdict::Keep
}

/// Classify a turn by extracting its user and assistant text.
pub fn classify_turn(turn: &Turn) -> TurnVerdict {
    classify_texts(&turn.user_text(), &turn.assistant_text())
}

/// True when every meaningful line of `text` is a tool echo or a JSON fragment.
pub fn is_tool_only(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !STRUCTURAL_TOKENS.contains(line))
        .all(is_tool_echo)
}

fn is_tool_echo(line: &str) -> bool {
    TOOL_REFERENCE_PATTERNS.iter().any(|p| line.contains(p)) || JSON_FIELD_RE.is_match(line)
}
