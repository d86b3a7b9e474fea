//! Record model and line-delimited JSON reader.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Which side of the conversation a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    User,
    Assistant,
    #[default]
    Unknown,
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: RecordKind,
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: Option<Message>,
    /// Present on synthetic user records that carry tool output instead of
    /// authored text. A JSON `null` still counts as present.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub tool_use_result: Option<ToolResult>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub session_id: Option<String>,
}

impl Record {
    /// The message content, if the record has any.
    pub fn content(&self) -> Option<&MessageContent> {
        self.message.as_ref().and_then(|m| m.content.as_ref())
    }

    /// A user record whose only payload is tool output.
    pub fn is_tool_result(&self) -> bool {
        self.kind == RecordKind::User && self.tool_use_result.is_some()
    }
}

/// The `message` envelope of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub content: Option<MessageContent>,
}

/// Content of a message: either plain text or an ordered list of typed parts.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    /// Any other JSON shape; rendered through string coercion.
    Other(Value),
}

impl From<Value> for MessageContent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => MessageContent::Text(s),
            Value::Array(items) => {
                MessageContent::Parts(items.into_iter().map(ContentPart::from).collect())
            }
            other => MessageContent::Other(other),
        }
    }
}

/// A single typed part inside a list-shaped message content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    ToolUse(ToolInvocation),
    /// Unknown part type or a malformed part; skipped during extraction.
    Unknown,
}

impl From<Value> for ContentPart {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return ContentPart::Unknown;
        };

        match map.get("type").and_then(Value::as_str) {
            Some("text") => match map.get("text") {
                Some(Value::String(text)) => ContentPart::Text(text.clone()),
                None => ContentPart::Text(String::new()),
                Some(_) => ContentPart::Unknown,
            },
            Some("tool_use") => {
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown Tool");
                let input = map
                    .get("input")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                ContentPart::ToolUse(ToolInvocation::new(name, input))
            }
            _ => ContentPart::Unknown,
        }
    }
}

/// A tool request embedded in assistant content.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    Read { file_path: Option<String> },
    Write { file_path: Option<String> },
    Edit { file_path: Option<String> },
    ListDirectory { path: Option<String> },
    /// Any tool without a dedicated rendering.
    Other { name: String, input: Value },
}

impl ToolInvocation {
    pub fn new(name: &str, input: Value) -> Self {
        let field = |key: &str| input.get(key).and_then(Value::as_str).map(str::to_string);
        match name {
            "Read" => ToolInvocation::Read {
                file_path: field("file_path"),
            },
            "Write" => ToolInvocation::Write {
                file_path: field("file_path"),
            },
            "Edit" => ToolInvocation::Edit {
                file_path: field("file_path"),
            },
            "LS" => ToolInvocation::ListDirectory { path: field("path") },
            _ => ToolInvocation::Other {
                name: name.to_string(),
                input,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolInvocation::Read { .. } => "Read",
            ToolInvocation::Write { .. } => "Write",
            ToolInvocation::Edit { .. } => "Edit",
            ToolInvocation::ListDirectory { .. } => "LS",
            ToolInvocation::Other { name, .. } => name,
        }
    }
}

/// Tool output attached to a synthetic user record.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Shell-style output with separate streams.
    Structured {
        stdout: Option<String>,
        stderr: Option<String>,
    },
    Text(String),
    /// Anything else (lists, numbers, null); not rendered.
    Other(Value),
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let stream = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                ToolResult::Structured {
                    stdout: stream("stdout"),
                    stderr: stream("stderr"),
                }
            }
            Value::String(s) => ToolResult::Text(s),
            other => ToolResult::Other(other),
        }
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<ToolResult>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| Some(ToolResult::from(v)))
}

fn deserialize_message<'de, D>(deserializer: D) -> std::result::Result<Option<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(mut map) => Some(Message {
            content: map.remove("content").map(MessageContent::from),
        }),
        _ => None,
    })
}

fn deserialize_kind<'de, D>(deserializer: D) -> std::result::Result<RecordKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => match s.as_str() {
            "user" => RecordKind::User,
            "assistant" => RecordKind::Assistant,
            _ => RecordKind::Unknown,
        },
        _ => RecordKind::Unknown,
    })
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Parse line-delimited JSON into records.
///
/// Blank lines are skipped silently. Lines that are not a JSON object are
/// skipped with a warning; they never abort the read.
pub fn parse_records(raw: &str) -> Vec<Record> {
    parse_lines(raw.lines().map(str::as_bytes))
}

/// Read and parse a JSONL log file.
///
/// Lines are decoded one at a time, so a line with invalid UTF-8 is skipped
/// like any other malformed line.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let raw = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lines(raw.split(|b| *b == b'\n')))
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a [u8]>) -> Vec<Record> {
    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim_ascii().is_empty() {
            continue;
        }
        match serde_json::from_slice::<Record>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping unparseable record");
            }
        }
    }
    records
}
