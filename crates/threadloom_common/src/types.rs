//! Calendar data model.
//!
//! Two families of types: the *draft* shapes as the completion service
//! emits them (lenient, union-coerced where the model is inconsistent)
//! and the *enriched* shapes returned to callers, which additionally
//! carry an identifier and a synthetic timestamp on every node.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A caller-defined fictional author identity constraining generated voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub username: String,
    pub bio: String,
}

/// One generation request, constructed per HTTP call and discarded after use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub company_info: String,
    pub company_website: String,
    pub personas: Vec<Persona>,
    /// Target discussion venues the content is themed for.
    pub subreddits: Vec<String>,
    pub topics: Vec<String>,
    /// Advisory to the prompt only; the parsed result is never rejected
    /// for carrying more or fewer posts.
    pub posts_per_week: u32,
    #[serde(default)]
    pub previous_topics: Vec<String>,
    /// Number of 7-day periods ahead of the current date.
    #[serde(default)]
    pub week_offset: u32,
}

/// A model-emitted comment. Replies nest to arbitrary (practically
/// shallow) depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftComment {
    pub persona: String,
    pub text: String,
    #[serde(default)]
    pub replies: Vec<DraftComment>,
}

/// A model-emitted post. The `comments` field tolerates the two shapes
/// the upstream is known to produce: a plain array, or an object
/// wrapping the array under a `comments` key. Absent comments become an
/// empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPost {
    pub title: String,
    pub body: String,
    pub subreddit: String,
    pub persona: String,
    pub topic: String,
    #[serde(default, deserialize_with = "comments_any_shape")]
    pub comments: Vec<DraftComment>,
}

/// The top-level shape of the final pass's output. `posts` is required;
/// everything else is optional model commentary. The echoed `week_start`
/// is never trusted - the enricher overwrites it.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftCalendar {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default, rename = "qualityScore")]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub critique: Option<String>,
    pub posts: Vec<DraftPost>,
}

/// Discriminated parse for the comment union: try a direct array, else
/// an object wrapping one, else fail. `null` and absent both normalize
/// to empty.
fn comments_any_shape<'de, D>(deserializer: D) -> Result<Vec<DraftComment>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        List(Vec<DraftComment>),
        Wrapped { comments: Vec<DraftComment> },
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Shape::List(list)) => list,
        Some(Shape::Wrapped { comments }) => comments,
    })
}

/// [`DraftComment`] plus identifier and synthetic timestamp, applied
/// recursively to every reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedComment {
    pub id: Uuid,
    pub persona: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<EnrichedComment>,
}

/// [`DraftPost`] plus identifier, synthetic timestamp, and fully
/// enriched comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub subreddit: String,
    pub persona: String,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<EnrichedComment>,
}

/// The finished calendar returned to the caller and appended to the
/// audit sink. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResult {
    /// Authoritative week start (UTC calendar date), not the model echo.
    pub week_start: NaiveDate,
    #[serde(rename = "qualityScore", skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
    pub posts: Vec<EnrichedPost>,
}
