//! Markdown rendering of kept turns.

use crate::conversation::Turn;
use crate::helpers::{fenced_block, parse_timestamp, project_dir_name};
use crate::record::{Record, ToolResult};

pub const GENERATOR_MARKER: &str = "<!-- Generated by SpecStory -->";
pub const USER_MARKER: &str = "_**User**_";
pub const ASSISTANT_MARKER: &str = "_**Assistant**_";
pub const SEPARATOR: &str = "---";
pub const ERROR_LABEL: &str = "**Error:**";
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// A turn whose texts have already been extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTurn<'a> {
    pub user_text: String,
    pub assistant_text: String,
    pub tool_results: &'a [ToolResult],
}

impl<'a> RenderedTurn<'a> {
    pub fn from_turn(turn: &'a Turn) -> Self {
        Self {
            user_text: turn.user_text(),
            assistant_text: turn.assistant_text(),
            tool_results: &turn.tool_results,
        }
    }
}

/// Accumulates document lines and joins them with newlines.
#[derive(Debug, Default)]
pub struct DocumentRenderer {
    lines: Vec<String>,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Emit the generator marker, the optional source line and the title.
    pub fn header(&mut self, first_record: Option<&Record>, source_name: Option<&str>) {
        self.push(GENERATOR_MARKER);
        self.blank();

        if let Some(source) = source_name.filter(|s| !s.is_empty()) {
            self.push(format!("Source: {}", source));
            self.blank();
        }

        if let Some(first) = first_record {
            self.push(format!("# {} ({})", document_title(first), document_date(first)));
            self.blank();
        }
    }

    /// Emit one User/Assistant block followed by its tool output.
    pub fn turn(&mut self, turn: &RenderedTurn<'_>) {
        self.push(USER_MARKER);
        self.blank();
        self.push(turn.user_text.as_str());
        self.blank();
        self.push(SEPARATOR);
        self.blank();
        self.push(ASSISTANT_MARKER);
        self.blank();

        if !turn.assistant_text.trim().is_empty() {
            self.push(turn.assistant_text.as_str());
        }

        for result in turn.tool_results {
            self.tool_result(result);
        }

        self.blank();
        self.push(SEPARATOR);
        self.blank();
    }

    fn tool_result(&mut self, result: &ToolResult) {
        match result {
            ToolResult::Structured { stdout, stderr } => {
                if let Some(out) = stdout.as_deref().filter(|s| !s.is_empty()) {
                    self.blank();
                    self.push(fenced_block(None, out));
                }
                if let Some(err) = stderr.as_deref().filter(|s| !s.is_empty()) {
                    self.blank();
                    self.push(ERROR_LABEL);
                    self.push(fenced_block(None, err));
                }
            }
            ToolResult::Text(text) if !text.trim().is_empty() => {
                self.blank();
                self.push(fenced_block(None, text));
            }
            ToolResult::Text(_) | ToolResult::Other(_) => {}
        }
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Render a header and the given turns into one document.
pub fn render_document(
    first_record: Option<&Record>,
    source_name: Option<&str>,
    turns: &[RenderedTurn<'_>],
) -> String {
    let mut renderer = DocumentRenderer::new();
    renderer.header(first_record, source_name);
    for turn in turns {
        renderer.turn(turn);
    }
    renderer.finish()
}

fn document_title(first: &Record) -> String {
    project_dir_name(first.cwd.as_deref().unwrap_or("Unknown"))
}

fn document_date(first: &Record) -> String {
    first
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}
