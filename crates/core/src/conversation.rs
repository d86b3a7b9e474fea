//! Turn assembly: groups a record stream into logical conversational turns.

use crate::content::extract_optional;
use crate::record::{Record, RecordKind, ToolResult};

/// One logical exchange: an optional user prompt, the assistant replies that
/// followed it and any tool output delivered in between.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub user: Option<Record>,
    pub assistant_messages: Vec<Record>,
    pub tool_results: Vec<ToolResult>,
}

impl Turn {
    /// A turn is closable once it has a user record or an assistant reply.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.assistant_messages.is_empty()
    }

    /// Extracted user text, empty when there is no user record.
    pub fn user_text(&self) -> String {
        self.user
            .as_ref()
            .map(|u| extract_optional(u.content()))
            .unwrap_or_default()
    }

    /// Extracted assistant text. Messages that extract to blank text are
    /// skipped; the rest are joined with blank lines.
    pub fn assistant_text(&self) -> String {
        self.assistant_messages
            .iter()
            .map(|m| extract_optional(m.content()))
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Builds turns from records in chronological order.
///
/// Authored user records open a new turn, assistant records and tool output
/// accumulate into the current one.
#[derive(Debug, Default)]
pub struct TurnAssembler {
    current: Turn,
    turns: Vec<Turn>,
}

impl TurnAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a full record sequence into turns.
    pub fn assemble<'a, I>(records: I) -> Vec<Turn>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut assembler = Self::new();
        for record in records {
            assembler.handle_record(record);
        }
        assembler.finish()
    }

    /// Feed one record into the state machine.
    pub fn handle_record(&mut self, record: &Record) {
        match record.kind {
            RecordKind::User => match &record.tool_use_result {
                Some(result) => self.handle_tool_result(result.clone()),
                None => self.handle_user(record.clone()),
            },
            RecordKind::Assistant => self.handle_assistant(record.clone()),
            RecordKind::Unknown => {}
        }
    }

    /// Tool output never opens a turn.
    pub fn handle_tool_result(&mut self, result: ToolResult) {
        self.current.tool_results.push(result);
    }

    /// An authored user record closes the current turn and opens a new one.
    pub fn handle_user(&mut self, record: Record) {
        self.close_current_turn();
        self.current.user = Some(record);
    }

    pub fn handle_assistant(&mut self, record: Record) {
        self.current.assistant_messages.push(record);
    }

    /// Close the current turn if it has content and start a fresh one.
    fn close_current_turn(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.turns.push(std::mem::take(&mut self.current));
    }

    /// Flush the last turn and return everything assembled so far.
    pub fn finish(mut self) -> Vec<Turn> {
        self.close_current_turn();
        self.turns
    }
}
