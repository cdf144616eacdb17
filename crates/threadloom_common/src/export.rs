//! Tabular export of a finished calendar.
//!
//! One sheet, two sections: the posts table, a gap, a section marker,
//! then the comments table keyed by post id. Pure function of the
//! calendar - rendering the same result twice is byte-identical.

use crate::types::CalendarResult;
use chrono::SecondsFormat;

pub const POSTS_HEADER: [&str; 7] = [
    "post_id",
    "subreddit",
    "title",
    "body",
    "author_username",
    "timestamp",
    "keywords_ids",
];

pub const COMMENTS_HEADER: [&str; 4] = ["post_id", "comment_text", "username", "timestamp"];

pub const COMMENTS_SECTION_MARKER: &str = "COMMENTS SECTION";

/// Build the sheet as rows of cells. Only top-level comments appear in
/// the comments section; replies stay in the JSON result.
pub fn export_rows(calendar: &CalendarResult) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    rows.push(POSTS_HEADER.iter().map(|h| h.to_string()).collect());
    for post in &calendar.posts {
        rows.push(vec![
            post.id.to_string(),
            post.subreddit.clone(),
            post.title.clone(),
            post.body.clone(),
            post.persona.clone(),
            post.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            post.topic.clone(),
        ]);
    }

    rows.push(Vec::new());
    rows.push(vec![COMMENTS_SECTION_MARKER.to_string()]);

    rows.push(COMMENTS_HEADER.iter().map(|h| h.to_string()).collect());
    for post in &calendar.posts {
        for comment in &post.comments {
            rows.push(vec![
                post.id.to_string(),
                comment.text.clone(),
                comment.persona.clone(),
                comment.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            ]);
        }
    }

    rows
}

/// Render rows as CSV. Cells containing separators, quotes, or
/// newlines are quoted with doubled inner quotes.
pub fn render_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|cell| escape_cell(cell)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

pub fn export_csv(calendar: &CalendarResult) -> String {
    render_csv(&export_rows(calendar))
}

fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
