//! CLI tool for converting conversation JSONL logs into Markdown transcripts.
//!
//! Accepts a single log file or a directory of logs. Each log becomes one
//! Markdown document, written next to the project it belongs to unless an
//! output directory is given.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use transcript_serializer_core::{
    process_all_files, PipelineConfig, PipelineResult, DEFAULT_BASE_FOLDER, NAME_MAPPING_FILE,
};

/// Convert conversation JSONL logs to Markdown transcripts.
#[derive(Parser, Debug)]
#[command(name = "transcript-serialize")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSONL file or directory containing JSONL files
    input_path: PathBuf,

    /// Output directory for Markdown files (default: the project's .specstory/history)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base folder name used to decode encoded project directory names
    #[arg(short, long, default_value = DEFAULT_BASE_FOLDER)]
    base_folder: String,

    /// Name of the identifier-to-display-name mapping file
    #[arg(long, default_value = NAME_MAPPING_FILE)]
    mapping_file: String,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = PipelineConfig {
        output_dir: args.output.clone(),
        base_folder: args.base_folder.clone(),
        mapping_file_name: args.mapping_file.clone(),
    };

    let result: PipelineResult = process_all_files(&args.input_path, &config)
        .with_context(|| format!("Failed to process {:?}", args.input_path))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\n[summary]");
    println!("  Logs found: {}", result.total_files);
    println!("  Transcripts written: {}", result.written_files);
    println!("  Logs without records: {}", result.empty_files);
    println!("  Logs failed: {}", result.failed_files);
    println!("  Turns kept: {}", result.total_turns);
    println!("  Turns removed by filter: {}", result.filtered_turns);
    println!("  Turns removed by second pass: {}", result.scrubbed_turns);
    for path in &result.outputs {
        println!("  Output: {:?}", path);
    }

    Ok(())
}
