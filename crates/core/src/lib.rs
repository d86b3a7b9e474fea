//! Core serialization logic for conversation logs.
//!
//! This crate turns line-delimited JSON conversation records (user prompts,
//! assistant replies and tool output) into Markdown transcripts. Records are
//! grouped into turns, degenerate turns are dropped, and the rendered document
//! gets a second structural pass that removes turns which only look empty
//! once rendered.

mod content;
mod conversation;
mod error;
mod filter;
mod helpers;
mod naming;
mod paths;
pub mod pipeline;
mod record;
mod render;
mod scrub;

pub use content::{extract_optional, extract_text};
pub use conversation::{Turn, TurnAssembler};
pub use error::{Error, Result};
pub use filter::{classify_texts, classify_turn, is_tool_only, TurnVerdict};
pub use helpers::{
    fenced_block, normalize_display_name, parse_timestamp, project_dir_name, project_slug,
};
pub use naming::{
    date_prefix, resolve_date, resolve_filename, DateSource, FileTimes, NameMapping,
    ProjectCounter, NAME_MAPPING_FILE,
};
pub use paths::{
    project_path_from_cwd, resolve_output_dir, ClaudeProjectsDecoder, ProjectPathResolver,
    DEFAULT_BASE_FOLDER, FALLBACK_OUTPUT_DIR, HISTORY_DIR,
};
pub use pipeline::{
    convert_records, discover_jsonl_files, process_all_files, process_file, ConvertedDocument,
    FileResult, PipelineConfig, PipelineResult,
};
pub use record::{
    parse_records, read_records, ContentPart, Message, MessageContent, Record, RecordKind,
    ToolInvocation, ToolResult,
};
pub use render::{
    render_document, DocumentRenderer, RenderedTurn, ASSISTANT_MARKER, GENERATOR_MARKER,
    SEPARATOR, USER_MARKER,
};
pub use scrub::{count_turns, scrub_fake_turns};
