//! Second pass over rendered Markdown that removes visually empty turns.
//!
//! Some content collapses to blank text only after extraction and joining, so
//! a turn can survive the text filter and still render as a User marker with
//! nothing before the separator and nothing after the Assistant marker. This
//! pass works on the rendered lines alone.

use crate::helpers::is_blank;
use crate::render::{ASSISTANT_MARKER, SEPARATOR, USER_MARKER};

fn is_line(line: &str, marker: &str) -> bool {
    line.trim() == marker
}

fn skip_blank(lines: &[&str], mut i: usize) -> usize {
    while i < lines.len() && is_blank(lines[i]) {
        i += 1;
    }
    i
}

/// If a fake turn starts at `start`, return the index just past it.
///
/// A fake turn is a User marker, blank lines, a separator, blank lines and
/// then immediately an Assistant marker. It extends through the next
/// separator and the blank lines after it.
fn fake_turn_end(lines: &[&str], start: usize) -> Result<usize, usize> {
    let mut i = skip_blank(lines, start + 1);
    if i >= lines.len() || !is_line(lines[i], SEPARATOR) {
        return Err(i);
    }
    i = skip_blank(lines, i + 1);
    if i >= lines.len() || !is_line(lines[i], ASSISTANT_MARKER) {
        return Err(i);
    }
    while i < lines.len() && !is_line(lines[i], SEPARATOR) {
        i += 1;
    }
    if i < lines.len() {
        i = skip_blank(lines, i + 1);
    }
    Ok(i)
}

/// Remove fake turns from a rendered document and trim trailing blank lines.
///
/// Returns the cleaned document and the number of turns removed.
pub fn scrub_fake_turns(markdown: &str) -> (String, usize) {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut removed = 0;
    let mut i = 0;

    while i < lines.len() {
        if !is_line(lines[i], USER_MARKER) {
            kept.push(lines[i]);
            i += 1;
            continue;
        }
        match fake_turn_end(&lines, i) {
            Ok(end) => {
                removed += 1;
                i = end;
            }
            Err(scanned) => {
                kept.extend_from_slice(&lines[i..scanned]);
                i = scanned;
            }
        }
    }

    while kept.last().is_some_and(|l| is_blank(l)) {
        kept.pop();
    }

    (kept.join("\n"), removed)
}

/// Count User markers in a rendered document.
pub fn count_turns(markdown: &str) -> usize {
    markdown.lines().filter(|l| is_line(l, USER_MARKER)).count()
}
