//! Entry naming and summary extraction.
//!
//! Entry files are named `YYYY-MM-DD-HHMMSS-entry.md`. The first line is the
//! title (usually a `#` heading), the second line feeds the preview.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Title written into freshly created entries.
pub const NEW_ENTRY_TITLE: &str = "Today, ...";

/// Preview length in characters before truncation.
pub const PREVIEW_CHARS: usize = 100;

/// Listing row for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub date: String,
    pub title: String,
    pub preview: String,
    pub filename: String,
}

impl EntrySummary {
    pub fn from_content(filename: &str, content: &str) -> Self {
        let mut lines = content.split('\n');
        let title = lines
            .next()
            .unwrap_or_default()
            .trim_matches(|c| c == '#' || c == ' ')
            .to_string();
        let body = lines.next().unwrap_or_default();

        Self {
            date: entry_date(filename),
            title,
            preview: preview(body),
            filename: filename.to_string(),
        }
    }
}

/// First three `-` separated parts of the filename.
pub fn entry_date(filename: &str) -> String {
    filename.split('-').take(3).collect::<Vec<_>>().join("-")
}

fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_CHARS {
        let head = body.chars().take(PREVIEW_CHARS).collect::<String>();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

pub fn new_entry_filename(now: NaiveDateTime) -> String {
    format!("{}-entry.md", now.format("%Y-%m-%d-%H%M%S"))
}

pub fn new_entry_content() -> String {
    format!("# {}\n\n", NEW_ENTRY_TITLE)
}

/// Normalize edited content to `"{title}\n\n{body}"`.
///
/// The title is the first non-blank line and the body everything after it.
/// Content with no visible text gets the title `Untitled` and keeps all lines as body.
pub fn compose_update(content: &str) -> String {
    let lines = content.split('\n').collect::<Vec<_>>();

    match lines.iter().position(|line| !line.trim().is_empty()) {
        Some(index) => format!("{}\n\n{}", lines[index], lines[index + 1..].join("\n")),
        None => format!("Untitled\n\n{}", content),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_strips_heading_marks() {
        let summary =
            EntrySummary::from_content("2024-05-01-093000-entry.md", "# Morning pages #\nSlept well.");

        assert_eq!(summary.title, "Morning pages");
        assert_eq!(summary.preview, "Slept well.");
        assert_eq!(summary.date, "2024-05-01");
        assert_eq!(summary.filename, "2024-05-01-093000-entry.md");
    }

    #[test]
    fn test_preview_is_the_second_line_only() {
        let summary = EntrySummary::from_content("2024-05-01-x.md", "# Title\n\nThird line");
        assert_eq!(summary.preview, "");
    }

    #[test]
    fn test_long_preview_is_truncated() {
        let body = "é".repeat(150);
        let summary = EntrySummary::from_content("2024-05-01-x.md", &format!("# T\n{}", body));

        assert!(summary.preview.ends_with("..."));
        assert_eq!(summary.preview.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_exactly_limit_is_not_truncated() {
        let body = "a".repeat(PREVIEW_CHARS);
        let summary = EntrySummary::from_content("2024-05-01-x.md", &format!("# T\n{}", body));
        assert_eq!(summary.preview, body);
    }

    #[test]
    fn test_single_line_entry() {
        let summary = EntrySummary::from_content("notes.md", "# Only title");
        assert_eq!(summary.title, "Only title");
        assert_eq!(summary.preview, "");
        assert_eq!(summary.date, "notes.md");
    }

    #[test]
    fn test_new_entry_filename() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap();
        assert_eq!(new_entry_filename(now), "2024-05-01-070509-entry.md");
        assert_eq!(entry_date(&new_entry_filename(now)), "2024-05-01");
    }

    #[test]
    fn test_compose_update_uses_first_non_blank_line() {
        let composed = compose_update("\n\n# Evening\nwent for a run\n\nthen dinner");
        assert_eq!(composed, "# Evening\n\nwent for a run\n\nthen dinner");
    }

    #[test]
    fn test_compose_update_title_only() {
        assert_eq!(compose_update("# Just this"), "# Just this\n\n");
    }

    #[test]
    fn test_compose_update_blank_content() {
        assert_eq!(compose_update("  \n "), "Untitled\n\n  \n ");
    }
}
