//! Enrichment: identifiers and synthetic timestamps.
//!
//! Every post and every comment at every depth gets a fresh UUID and a
//! random instant inside the target week, biased to business hours
//! (9:00-20:59) but uniform across the seven days. Timestamps carry no
//! ordering constraint between a post and its comments; that jitter is
//! accepted behavior.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::Rng;
use threadloom_common::{
    CalendarResult, DraftCalendar, DraftComment, DraftPost, EnrichedComment, EnrichedPost,
};
use uuid::Uuid;

/// The UTC calendar date the target week starts on.
pub fn week_start_for(week_offset: u32) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(7 * week_offset as i64)
}

/// Materialize a parsed draft into the final calendar. `week_start` is
/// authoritative; whatever the model echoed back is discarded.
pub fn enrich(draft: DraftCalendar, week_start: NaiveDate) -> CalendarResult {
    let mut rng = rand::thread_rng();
    let posts = draft
        .posts
        .into_iter()
        .map(|post| enrich_post(post, week_start, &mut rng))
        .collect();

    CalendarResult {
        week_start,
        quality_score: draft.quality_score,
        critique: draft.critique,
        posts,
    }
}

fn enrich_post(post: DraftPost, week_start: NaiveDate, rng: &mut impl Rng) -> EnrichedPost {
    EnrichedPost {
        id: Uuid::new_v4(),
        timestamp: random_instant_in_week(week_start, rng),
        title: post.title,
        body: post.body,
        subreddit: post.subreddit,
        persona: post.persona,
        topic: post.topic,
        comments: post
            .comments
            .into_iter()
            .map(|comment| enrich_comment(comment, week_start, rng))
            .collect(),
    }
}

fn enrich_comment(
    comment: DraftComment,
    week_start: NaiveDate,
    rng: &mut impl Rng,
) -> EnrichedComment {
    EnrichedComment {
        id: Uuid::new_v4(),
        timestamp: random_instant_in_week(week_start, rng),
        persona: comment.persona,
        text: comment.text,
        replies: comment
            .replies
            .into_iter()
            .map(|reply| enrich_comment(reply, week_start, rng))
            .collect(),
    }
}

fn random_instant_in_week(week_start: NaiveDate, rng: &mut impl Rng) -> DateTime<Utc> {
    let day = rng.gen_range(0..7);
    let hour = rng.gen_range(9..21);
    let minute = rng.gen_range(0..60);

    let naive = week_start.and_time(NaiveTime::MIN)
        + Duration::days(day)
        + Duration::hours(hour)
        + Duration::minutes(minute);
    Utc.from_utc_datetime(&naive)
}
