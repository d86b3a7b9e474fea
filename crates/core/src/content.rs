//! Conversion of message content into display text.

use serde_json::Value;

use crate::record::{ContentPart, MessageContent, ToolInvocation};

/// Extract display text from a message's content.
///
/// Plain strings pass through unchanged. Part lists are rendered part by part
/// and joined with blank lines; unknown parts are skipped.
pub fn extract_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(render_part)
            .collect::<Vec<_>>()
            .join("\n\n"),
        MessageContent::Other(Value::Null) => String::new(),
        MessageContent::Other(other) => other.to_string(),
    }
}

/// Extract text from an optional content field; absent content is empty.
pub fn extract_optional(content: Option<&MessageContent>) -> String {
    content.map(extract_text).unwrap_or_default()
}

fn render_part(part: &ContentPart) -> Option<String> {
    match part {
        ContentPart::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        ContentPart::ToolUse(tool) => Some(render_tool(tool)),
        ContentPart::Unknown => None,
    }
}

fn render_tool(tool: &ToolInvocation) -> String {
    match tool {
        ToolInvocation::Read { file_path }
        | ToolInvocation::Write { file_path }
        | ToolInvocation::Edit { file_path } => format!(
            "{} file: {}",
            tool.name(),
            file_path.as_deref().unwrap_or("Unknown file")
        ),
        ToolInvocation::ListDirectory { path } => format!(
            "<details>\n            <summary>Listed directory {}</summary>\n        \n(Directory listing will appear here)\n\n</details>",
            path.as_deref().unwrap_or("Unknown path")
        ),
        ToolInvocation::Other { name, input } => {
            let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
            format!("{}: {}", name, pretty)
        }
    }
}
