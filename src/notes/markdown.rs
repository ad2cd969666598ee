//! Markdown rendering for notes.

use crate::store::VideoRecord;
use chrono::{DateTime, Utc};

const MAX_TITLE_CHARS: usize = 100;

/// Reduce a title to a filesystem-safe stem.
///
/// Keeps the first 100 characters, replaces anything but letters, digits, spaces,
/// `-` and `_` with `_`, and trims surrounding whitespace.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .take(MAX_TITLE_CHARS)
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output filename for a note about `title`.
pub fn note_filename(title: &str) -> String {
    format!("{}.md", sanitize_filename(title))
}

/// Note filename with the video id appended, for titles that collide.
///
/// The stem is shortened so the whole name stays within the plain filename's limit.
pub fn disambiguated_note_filename(title: &str, video_id: &str) -> String {
    let suffix = format!("-{}", sanitize_filename(video_id));
    let keep = MAX_TITLE_CHARS.saturating_sub(suffix.chars().count());
    let stem: String = sanitize_filename(title).chars().take(keep).collect();
    format!("{}{}.md", stem.trim_end(), suffix)
}

/// `March 05, 2024` for an RFC 3339 timestamp; anything else is returned as-is.
pub fn format_date(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%B %d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Double-quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn dates_line(record: &VideoRecord, now: DateTime<Utc>) -> String {
    format!(
        "Published: {}, Processed: {}",
        format_date(&record.publish_date),
        now.format("%B %d, %Y")
    )
}

fn thumbnail_link(record: &VideoRecord) -> String {
    format!("[![Thumbnail]({})]({})", record.thumbnail_url, record.video_url)
}

/// Summarize-mode note: frontmatter, channel header, dates, thumbnail and summary.
pub fn render_summary(
    record: &VideoRecord,
    summary: &str,
    now: DateTime<Utc>,
    include_transcript: bool,
) -> String {
    let mut md = String::new();

    md.push_str("---\n");
    md.push_str(&format!("title: {}\n", yaml_quote(&record.title)));
    md.push_str(&format!("channel_name: {}\n", yaml_quote(&record.channel_name)));
    md.push_str(&format!("view_count: {}\n", yaml_quote(&record.view_count)));
    md.push_str(&format!("publish_date: {}\n", yaml_quote(&record.publish_date)));
    md.push_str(&format!(
        "processed_date: {}\n",
        yaml_quote(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    ));
    md.push_str(&format!("description: {}\n", yaml_quote(&record.description)));
    md.push_str("---\n\n");

    md.push_str(&format!("## {}\n", record.channel_name));
    md.push_str(&dates_line(record, now));
    md.push_str("\n\n");
    md.push_str(&thumbnail_link(record));
    md.push_str("\n\n");
    md.push_str(summary.trim());
    md.push('\n');

    if include_transcript {
        md.push_str("\n## Transcript\n");
        md.push_str(&record.transcript);
        md.push('\n');
    }

    md
}

/// Roast-mode note: stats headers, then feedback followed by the roast.
pub fn render_roast(
    record: &VideoRecord,
    constructive: &str,
    roast: &str,
    now: DateTime<Utc>,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {}\n", record.channel_name));
    md.push_str(&format!("### Views: {}\n", record.view_count));
    md.push_str(&format!("### Likes: {}\n", record.like_count));
    md.push_str(&format!("### Comments: {}\n", record.comment_count));
    md.push_str(&format!("### Duration: {}\n", record.duration));
    md.push_str(&dates_line(record, now));
    md.push_str("\n\n");
    md.push_str(&thumbnail_link(record));
    md.push_str("\n\n## Constructive Feedback\n");
    md.push_str(constructive.trim());
    md.push_str("\n\n## ROAST 🔥\n");
    md.push_str(roast.trim());
    md.push('\n');

    md
}
