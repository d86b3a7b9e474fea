//! Helper functions for text processing and naming.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

/// Fallback project name used in file names when no working directory is known.
pub const UNKNOWN_PROJECT: &str = "unknown_project";

/// Create a fenced code block with optional language tag.
pub fn fenced_block(language: Option<&str>, content: &str) -> String {
    let lang = language.unwrap_or("").to_lowercase();
    format!("```{}\n{}\n```", lang, content)
}

/// True when the line holds nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Last path segment of a working directory with spaces replaced by underscores.
///
/// Used verbatim in document titles, so the original casing is kept.
pub fn project_dir_name(cwd: &str) -> String {
    Path::new(cwd)
        .file_name()
        .map(|n| n.to_string_lossy().replace(' ', "_"))
        .unwrap_or_default()
}

/// Lower-cased project name for output file names.
pub fn project_slug(cwd: Option<&str>) -> String {
    match cwd {
        Some(cwd) if !cwd.is_empty() && cwd != "Unknown" => project_dir_name(cwd).to_lowercase(),
        _ => UNKNOWN_PROJECT.to_string(),
    }
}

/// Normalize a human display name into a file-name suffix.
///
/// Spaces and underscores become hyphens, everything is lower-cased, and any
/// character that is neither alphanumeric nor a hyphen is dropped.
pub fn normalize_display_name(name: &str) -> String {
    name.replace([' ', '_'], "-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Parse an ISO-8601 record timestamp into its own wall-clock time.
///
/// Accepts RFC 3339 (including a trailing `Z`) and offset-less forms.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block() {
        assert_eq!(fenced_block(Some("bash"), "echo hello"), "```bash\necho hello\n```");
        assert_eq!(fenced_block(None, "code"), "```\ncode\n```");
    }

    #[test]
    fn test_project_names() {
        assert_eq!(project_dir_name("/Users/dev/My Project"), "My_Project");
        assert_eq!(project_dir_name("/Users/dev/tool/"), "tool");
        assert_eq!(project_dir_name("Unknown"), "Unknown");
        assert_eq!(project_slug(Some("/Users/dev/My Project")), "my_project");
        assert_eq!(project_slug(Some("Unknown")), UNKNOWN_PROJECT);
        assert_eq!(project_slug(Some("")), UNKNOWN_PROJECT);
        assert_eq!(project_slug(None), UNKNOWN_PROJECT);
    }

    #[test]
    fn test_normalize_display_name() {
        assert_eq!(normalize_display_name("My Cool Chat"), "my-cool-chat");
        assert_eq!(normalize_display_name("fix_bug: #42!"), "fix-bug-42");
        assert_eq!(normalize_display_name("Über Café"), "über-café");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-05-01T10:20:30.123Z").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-01 10:20:30");

        let ts = parse_timestamp("2024-05-01T10:20:30+02:00").unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "10:20");

        let ts = parse_timestamp("2024-05-01T10:20:30").unwrap();
        assert_eq!(ts.format("%Y-%m-%d_%H-%M").to_string(), "2024-05-01_10-20");

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
