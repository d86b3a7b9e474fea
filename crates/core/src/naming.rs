//! Output file naming: date prefix, mapped display names and per-project counters.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::helpers::{normalize_display_name, parse_timestamp, project_slug};
use crate::record::Record;

/// Name of the side-file mapping log identifiers to display names.
pub const NAME_MAPPING_FILE: &str = "json_name_match.txt";

const DATE_PREFIX_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Read-only mapping from a log identifier (file stem) to a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping {
    entries: HashMap<String, String>,
}

impl NameMapping {
    /// Parse `identifier=display name` lines. Lines without `=` are ignored and
    /// surrounding double quotes are stripped from the name.
    pub fn parse(raw: &str) -> Self {
        let mut entries = HashMap::new();
        for line in raw.lines().map(str::trim) {
            let Some((id, name)) = line.split_once('=') else {
                continue;
            };
            let id = id.trim();
            let name = name.trim().trim_matches('"');
            tracing::debug!(id, display_name = name, "Loaded name mapping");
            entries.insert(id.to_string(), name.to_string());
        }
        Self { entries }
    }

    /// Load a mapping file. A missing or unreadable file yields an empty mapping.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => {
                tracing::info!(path = %path.display(), "Found name mapping file");
                Self::parse(&raw)
            }
            Err(e) => {
                if path.exists() {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not read name mapping file"
                    );
                }
                Self::default()
            }
        }
    }

    /// Locate the mapping file for an input path: inside it when it is a
    /// directory, next to it when it is a file.
    pub fn mapping_path_for(input: &Path, file_name: &str) -> PathBuf {
        if input.is_dir() {
            input.join(file_name)
        } else {
            input
                .parent()
                .map(|p| p.join(file_name))
                .unwrap_or_else(|| PathBuf::from(file_name))
        }
    }

    pub fn for_input(input: &Path, file_name: &str) -> Self {
        Self::load(&Self::mapping_path_for(input, file_name))
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-run sequence numbers for documents named after their project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCounter {
    counts: HashMap<String, usize>,
}

impl ProjectCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the counter for `project`, starting at 1.
    pub fn next(&mut self, project: &str) -> usize {
        let count = self.counts.entry(project.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn current(&self, project: &str) -> usize {
        self.counts.get(project).copied().unwrap_or(0)
    }
}

/// Filesystem timestamps of a log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTimes {
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

impl FileTimes {
    /// Read creation and modification times; either may be unavailable.
    pub fn from_path(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => Self {
                created: meta.created().ok(),
                modified: meta.modified().ok(),
            },
            Err(_) => Self::default(),
        }
    }
}

/// Where the date prefix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Created,
    Modified,
    RecordTimestamp,
    Now,
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Pick the document date: creation time, then modification time, then the
/// first record's timestamp, then the current time.
pub fn resolve_date(
    times: &FileTimes,
    first_record: Option<&Record>,
) -> (NaiveDateTime, DateSource) {
    if let Some(created) = times.created {
        return (local_time(created), DateSource::Created);
    }
    if let Some(modified) = times.modified {
        return (local_time(modified), DateSource::Modified);
    }
    if let Some(ts) = first_record
        .and_then(|r| r.timestamp.as_deref())
        .and_then(parse_timestamp)
    {
        return (ts, DateSource::RecordTimestamp);
    }
    (Local::now().naive_local(), DateSource::Now)
}

/// `YYYY-MM-DD_HH-MM` prefix for an output file name.
pub fn date_prefix(times: &FileTimes, first_record: Option<&Record>) -> String {
    let (date, source) = resolve_date(times, first_record);
    tracing::debug!(?source, "Resolved document date");
    date.format(DATE_PREFIX_FORMAT).to_string()
}

/// Resolve the output file name for one log.
///
/// A mapped display name wins; otherwise the project name plus the next value
/// of that project's counter is used.
pub fn resolve_filename(
    mapping: &NameMapping,
    counter: &mut ProjectCounter,
    source_id: &str,
    times: &FileTimes,
    records: &[Record],
) -> String {
    let first = records.first();
    let prefix = date_prefix(times, first);

    if let Some(name) = mapping.get(source_id) {
        let file_name = format!("{}-{}.md", prefix, normalize_display_name(name));
        tracing::info!(%file_name, "Using mapped name");
        return file_name;
    }

    let project = project_slug(first.and_then(|r| r.cwd.as_deref()));
    let n = counter.next(&project);
    format!("{}-{}_{}.md", prefix, project, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_records;
    use chrono::{NaiveDate, TimeZone};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn records(cwd: &str, ts: &str) -> Vec<Record> {
        parse_records(&serde_json::json!({"type": "user", "cwd": cwd, "timestamp": ts}).to_string())
    }

    fn system_time(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> SystemTime {
        let naive = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap();
        let local = Local.from_local_datetime(&naive).single().unwrap();
        UNIX_EPOCH + Duration::from_secs(local.timestamp() as u64)
    }

    #[test]
    fn test_parse_mapping() {
        let mapping = NameMapping::parse(
            "abc-123=My Cool Chat\n  def = \"Quoted Name\"  \nno equals sign here\nx=a=b\n",
        );
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get("abc-123"), Some("My Cool Chat"));
        assert_eq!(mapping.get("def"), Some("Quoted Name"));
        assert_eq!(mapping.get("x"), Some("a=b"));
        assert_eq!(mapping.get("missing"), None);
    }

    #[test]
    fn test_load_missing_mapping_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(NameMapping::load(&temp.path().join(NAME_MAPPING_FILE)).is_empty());
    }

    #[test]
    fn test_mapping_path_for_file_and_dir() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.jsonl");
        std::fs::write(&log, "").unwrap();
        assert_eq!(
            NameMapping::mapping_path_for(temp.path(), NAME_MAPPING_FILE),
            temp.path().join(NAME_MAPPING_FILE)
        );
        assert_eq!(
            NameMapping::mapping_path_for(&log, NAME_MAPPING_FILE),
            temp.path().join(NAME_MAPPING_FILE)
        );
    }

    #[test]
    fn test_project_counter() {
        let mut counter = ProjectCounter::new();
        assert_eq!(counter.next("a"), 1);
        assert_eq!(counter.next("a"), 2);
        assert_eq!(counter.next("b"), 1);
        assert_eq!(counter.current("a"), 2);
        assert_eq!(counter.current("zzz"), 0);
    }

    #[test]
    fn test_date_priority_chain() {
        let recs = records("/p", "2023-01-02T03:04:05Z");
        let created = system_time(2024, 6, 7, 8, 9);
        let modified = system_time(2024, 7, 8, 9, 10);

        let both = FileTimes {
            created: Some(created),
            modified: Some(modified),
        };
        assert_eq!(date_prefix(&both, recs.first()), "2024-06-07_08-09");

        let only_modified = FileTimes {
            created: None,
            modified: Some(modified),
        };
        assert_eq!(date_prefix(&only_modified, recs.first()), "2024-07-08_09-10");

        let none = FileTimes::default();
        assert_eq!(date_prefix(&none, recs.first()), "2023-01-02_03-04");

        let bad = records("/p", "not a date");
        assert_eq!(resolve_date(&none, bad.first()).1, DateSource::Now);
        assert_eq!(resolve_date(&none, None).1, DateSource::Now);
    }

    #[test]
    fn test_mapped_name() {
        let mapping = NameMapping::parse("session-1=My Cool Chat\n");
        let mut counter = ProjectCounter::new();
        let recs = records("/work/proj", "2023-01-02T03:04:05Z");
        let times = FileTimes::default();
        let name = resolve_filename(&mapping, &mut counter, "session-1", &times, &recs);
        assert_eq!(name, "2023-01-02_03-04-my-cool-chat.md");
        assert_eq!(counter.current("proj"), 0);
    }

    #[test]
    fn test_project_counter_names() {
        let mapping = NameMapping::default();
        let mut counter = ProjectCounter::new();
        let recs = records("/work/My Proj", "2023-01-02T03:04:05Z");
        let times = FileTimes::default();
        assert_eq!(
            resolve_filename(&mapping, &mut counter, "a", &times, &recs),
            "2023-01-02_03-04-my_proj_1.md"
        );
        assert_eq!(
            resolve_filename(&mapping, &mut counter, "b", &times, &recs),
            "2023-01-02_03-04-my_proj_2.md"
        );

        let unknown = records("Unknown", "2023-01-02T03:04:05Z");
        assert_eq!(
            resolve_filename(&mapping, &mut counter, "c", &times, &unknown),
            "2023-01-02_03-04-unknown_project_1.md"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mapping = NameMapping::default();
        let recs = records("/work/proj", "2023-01-02T03:04:05Z");
        let times = FileTimes {
            created: Some(system_time(2024, 1, 1, 0, 0)),
            modified: None,
        };

        let first = resolve_filename(&mapping, &mut ProjectCounter::new(), "id", &times, &recs);
        let second = resolve_filename(&mapping, &mut ProjectCounter::new(), "id", &times, &recs);
        assert_eq!(first, second);
    }
}
