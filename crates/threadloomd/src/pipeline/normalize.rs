//! Response normalization.
//!
//! Strict by design: the final pass's text either parses as a calendar
//! with a `posts` array or the whole request fails. No brace
//! scavenging, no re-prompting. Shape tolerance (the comments union,
//! defaulted optional fields) lives on the draft types themselves.

use super::GenerateError;
use threadloom_common::DraftCalendar;

pub fn normalize(text: &str) -> Result<DraftCalendar, GenerateError> {
    serde_json::from_str(text).map_err(|e| GenerateError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_calendar_parses() {
        let calendar = normalize(
            r#"{
                "week_start": "2026-01-05",
                "qualityScore": 85,
                "critique": "less salesy now",
                "posts": [{
                    "title": "t", "body": "b", "subreddit": "r/rust",
                    "persona": "kai", "topic": "x",
                    "comments": {"comments": [{"persona": "mia", "text": "hi"}]}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(calendar.quality_score, Some(85.0));
        assert_eq!(calendar.posts[0].comments.len(), 1);
    }

    #[test]
    fn prose_is_malformed() {
        let err = normalize("Sure! Here is your calendar: {\"posts\": []}").unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }

    #[test]
    fn missing_posts_is_malformed() {
        let err = normalize(r#"{"week_start": "2026-01-05"}"#).unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }

    #[test]
    fn code_fences_are_malformed() {
        // The prompt forbids fences; if the model fences anyway that is
        // terminal, not repaired.
        let err = normalize("```json\n{\"posts\": []}\n```").unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }
}
