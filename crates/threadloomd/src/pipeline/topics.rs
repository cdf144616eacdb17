//! Topic selection.

/// Drop topics already used in previous weeks (exact string match,
/// order preserved). If everything has been used, start over with the
/// full list instead of stalling.
pub fn select_topics(topics: &[String], previous: &[String]) -> Vec<String> {
    let fresh: Vec<String> = topics
        .iter()
        .filter(|t| !previous.contains(*t))
        .cloned()
        .collect();

    if fresh.is_empty() {
        topics.to_vec()
    } else {
        fresh
    }
}
