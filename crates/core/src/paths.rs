//! Project directory inference and output directory resolution.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::record::Record;

/// Default base folder that separates the path prefix from the project name
/// in encoded project directory names.
pub const DEFAULT_BASE_FOLDER: &str = "Python";

/// Directory under the project root that receives transcripts.
pub const HISTORY_DIR: &str = ".specstory/history";

/// Output directory used when no project directory can be found.
pub const FALLBACK_OUTPUT_DIR: &str = "output";

const PROJECTS_MARKER: &str = ".claude/projects/";

/// Best-effort mapping from a log file path to the project it belongs to.
pub trait ProjectPathResolver {
    fn resolve(&self, log_path: &Path) -> Option<PathBuf>;
}

// Blanket implementation for references to resolvers
impl<T: ProjectPathResolver + ?Sized> ProjectPathResolver for &T {
    fn resolve(&self, log_path: &Path) -> Option<PathBuf> {
        (*self).resolve(log_path)
    }
}

/// Decodes project directory names such as
/// `-Users-dev-Documents-Python-My-Tool` back into `/Users/dev/Documents/Python/My_Tool`.
///
/// Every segment up to and including `base_folder` is a path component; the
/// rest is the project name, re-joined with underscores since the encoding
/// loses the original separators.
#[derive(Debug, Clone)]
pub struct ClaudeProjectsDecoder {
    pub base_folder: String,
}

impl Default for ClaudeProjectsDecoder {
    fn default() -> Self {
        Self {
            base_folder: DEFAULT_BASE_FOLDER.to_string(),
        }
    }
}

impl ClaudeProjectsDecoder {
    pub fn new(base_folder: impl Into<String>) -> Self {
        Self {
            base_folder: base_folder.into(),
        }
    }

    /// Decode one encoded directory name.
    pub fn decode(&self, encoded: &str) -> Option<PathBuf> {
        let rest = encoded.strip_prefix('-')?;
        let parts: Vec<&str> = rest.split('-').collect();
        let base_idx = parts.iter().position(|p| *p == self.base_folder)?;
        let (prefix, project) = parts.split_at(base_idx + 1);
        if project.is_empty() {
            return None;
        }
        Some(PathBuf::from(format!(
            "/{}/{}",
            prefix.join("/"),
            project.join("_")
        )))
    }
}

impl ProjectPathResolver for ClaudeProjectsDecoder {
    fn resolve(&self, log_path: &Path) -> Option<PathBuf> {
        if !log_path.to_string_lossy().contains(PROJECTS_MARKER) {
            return None;
        }
        let folder = log_path.parent()?.file_name()?.to_str()?;
        self.decode(folder)
    }
}

/// Project directory recorded in the log's first working directory.
pub fn project_path_from_cwd(first_record: Option<&Record>) -> Option<PathBuf> {
    match first_record.and_then(|r| r.cwd.as_deref()) {
        Some(cwd) if !cwd.is_empty() && cwd != "Unknown" => Some(PathBuf::from(cwd)),
        _ => None,
    }
}

fn create_dir(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Pick and create the directory a transcript is written to.
///
/// An explicit override wins. Otherwise the project directory is taken from
/// the log path, then from the first record's working directory; the first
/// one that exists gets a `.specstory/history` subdirectory. Failing both, a
/// local `output` directory is used.
pub fn resolve_output_dir<R: ProjectPathResolver>(
    override_dir: Option<&Path>,
    log_path: &Path,
    first_record: Option<&Record>,
    resolver: R,
) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return create_dir(dir.to_path_buf());
    }

    let decoded = resolver.resolve(log_path);
    tracing::debug!(path = ?decoded, "Project path decoded from log location");

    let project = decoded
        .filter(|p| p.exists())
        .or_else(|| project_path_from_cwd(first_record).filter(|p| p.exists()));

    match project {
        Some(project) => create_dir(project.join(HISTORY_DIR)),
        None => {
            tracing::warn!(
                log = %log_path.display(),
                "Could not determine project directory, using default output directory"
            );
            create_dir(PathBuf::from(FALLBACK_OUTPUT_DIR))
        }
    }
}
