//! Pipeline for converting JSONL conversation logs into Markdown transcripts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::conversation::TurnAssembler;
use crate::error::{Error, Result};
use crate::filter::{classify_texts, TurnVerdict};
use crate::naming::{resolve_filename, FileTimes, NameMapping, ProjectCounter, NAME_MAPPING_FILE};
use crate::paths::{resolve_output_dir, ClaudeProjectsDecoder, DEFAULT_BASE_FOLDER};
use crate::record::{read_records, Record};
use crate::render::{render_document, RenderedTurn};
use crate::scrub::{count_turns, scrub_fake_turns};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Write every transcript here instead of the inferred project directory.
    pub output_dir: Option<PathBuf>,
    /// Folder name that ends the path prefix in encoded project directories.
    pub base_folder: String,
    /// Name of the identifier-to-display-name side file.
    pub mapping_file_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            base_folder: DEFAULT_BASE_FOLDER.to_string(),
            mapping_file_name: NAME_MAPPING_FILE.to_string(),
        }
    }
}

/// A rendered and scrubbed transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub markdown: String,
    /// Turns rendered before the scrub pass.
    pub turns_before: usize,
    /// Turns left after the scrub pass.
    pub turns_after: usize,
    /// Turns dropped by the text filter.
    pub turns_filtered: usize,
}

/// Result of processing a single log file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub turns_before: usize,
    pub turns_after: usize,
    pub turns_filtered: usize,
}

/// Result of processing a whole input.
#[derive(Debug, Default, Serialize)]
pub struct PipelineResult {
    pub total_files: usize,
    pub written_files: usize,
    pub empty_files: usize,
    pub failed_files: usize,
    pub total_turns: usize,
    pub filtered_turns: usize,
    pub scrubbed_turns: usize,
    pub outputs: Vec<PathBuf>,
}

/// Discover the JSONL logs for an input path.
///
/// A file is returned as-is; a directory yields its direct `.jsonl` children,
/// sorted so runs are reproducible.
pub fn discover_jsonl_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(Error::InvalidInput(input.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "jsonl"))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::NoInputFiles(input.to_path_buf()));
    }
    Ok(paths)
}

/// Convert parsed records into a Markdown transcript.
///
/// Runs turn assembly, the text filter, rendering and the fake-turn scrub.
pub fn convert_records(records: &[Record], source_name: Option<&str>) -> ConvertedDocument {
    let turns = TurnAssembler::assemble(records);

    let mut kept = Vec::with_capacity(turns.len());
    for (idx, turn) in turns.iter().enumerate() {
        let rendered = RenderedTurn::from_turn(turn);
        match classify_texts(&rendered.user_text, &rendered.assistant_text) {
            TurnVerdict::Keep => kept.push(rendered),
            verdict => tracing::debug!(turn = idx, ?verdict, "Discarding turn"),
        }
    }
    let turns_filtered = turns.len() - kept.len();

    let markdown = render_document(records.first(), source_name, &kept);
    let turns_before = count_turns(&markdown);
    let (markdown, _) = scrub_fake_turns(&markdown);
    let turns_after = count_turns(&markdown);

    ConvertedDocument {
        markdown,
        turns_before,
        turns_after,
        turns_filtered,
    }
}

/// Process a single log file and write its transcript.
///
/// Returns `Ok(None)` when the log holds no records; nothing is written then.
pub fn process_file(
    log_path: &Path,
    mapping: &NameMapping,
    counter: &mut ProjectCounter,
    config: &PipelineConfig,
) -> Result<Option<FileResult>> {
    tracing::info!(path = %log_path.display(), "Processing");

    let records = read_records(log_path)?;
    if records.is_empty() {
        tracing::warn!(path = %log_path.display(), "No records found");
        return Ok(None);
    }

    let source_name = log_path.file_name().map(|n| n.to_string_lossy().into_owned());
    let document = convert_records(&records, source_name.as_deref());

    let source_id = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = resolve_filename(
        mapping,
        counter,
        &source_id,
        &FileTimes::from_path(log_path),
        &records,
    );

    let decoder = ClaudeProjectsDecoder::new(config.base_folder.clone());
    let output_dir = resolve_output_dir(
        config.output_dir.as_deref(),
        log_path,
        records.first(),
        &decoder,
    )?;
    let output_path = output_dir.join(file_name);

    fs::write(&output_path, &document.markdown).map_err(|source| Error::Io {
        path: output_path.clone(),
        source,
    })?;

    tracing::info!(
        output = %output_path.display(),
        turns_before = document.turns_before,
        turns_after = document.turns_after,
        turns_filtered = document.turns_filtered,
        "Transcript written"
    );

    Ok(Some(FileResult {
        source_path: log_path.to_path_buf(),
        output_path,
        turns_before: document.turns_before,
        turns_after: document.turns_after,
        turns_filtered: document.turns_filtered,
    }))
}

/// Process every log under `input` sequentially.
///
/// The name mapping is loaded once and the project counter lives for the
/// whole run. A failing file is logged and counted; it never stops the batch.
pub fn process_all_files(input: &Path, config: &PipelineConfig) -> Result<PipelineResult> {
    let files = discover_jsonl_files(input)?;
    let mapping = NameMapping::for_input(input, &config.mapping_file_name);
    let mut counter = ProjectCounter::new();

    let mut result = PipelineResult {
        total_files: files.len(),
        ..Default::default()
    };

    for log_path in &files {
        match process_file(log_path, &mapping, &mut counter, config) {
            Ok(Some(file)) => {
                result.written_files += 1;
                result.total_turns += file.turns_after;
                result.filtered_turns += file.turns_filtered;
                result.scrubbed_turns += file.turns_before - file.turns_after;
                result.outputs.push(file.output_path);
            }
            Ok(None) => result.empty_files += 1,
            Err(e) => {
                result.failed_files += 1;
                tracing::warn!(path = %log_path.display(), error = %e, "Failed to process log");
            }
        }
    }

    if result.failed_files > 0 {
        tracing::warn!(failed = result.failed_files, "Some logs failed to process");
    }

    Ok(result)
}
