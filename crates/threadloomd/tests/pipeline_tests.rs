//! Deterministic pipeline tests.
//!
//! These drive the full generation pipeline with a scripted completion
//! client, so no network is involved and every model "response" is
//! chosen by the test.

use chrono::{Duration, Timelike, Utc};
use std::collections::HashSet;
use threadloom_common::{
    CompletionError, GenerationRequest, Persona, ScriptedCompletionClient,
};
use threadloomd::config::PipelineConfig;
use threadloomd::pipeline::{run_generation, GenerateError};

fn request() -> GenerationRequest {
    GenerationRequest {
        company_info: "Acme builds developer tooling".to_string(),
        company_website: "https://acme.io".to_string(),
        personas: vec![
            Persona {
                username: "kai_dev".to_string(),
                bio: "grumpy backend dev".to_string(),
            },
            Persona {
                username: "mia".to_string(),
                bio: "startup founder".to_string(),
            },
        ],
        subreddits: vec!["r/rust".to_string()],
        topics: vec![
            "build times".to_string(),
            "error handling".to_string(),
            "hiring".to_string(),
        ],
        posts_per_week: 2,
        previous_topics: vec![],
        week_offset: 0,
    }
}

fn two_pass_config() -> PipelineConfig {
    PipelineConfig::default()
}

fn single_pass_config() -> PipelineConfig {
    PipelineConfig {
        passes: 1,
        ..PipelineConfig::default()
    }
}

const DRAFT_JSON: &str = r#"{
    "week_start": "2020-01-01",
    "posts": [
        {"title": "draft title", "body": "draft body", "subreddit": "r/rust",
         "persona": "kai_dev", "topic": "build times",
         "comments": [{"persona": "mia", "text": "draft comment"}]}
    ]
}"#;

const FINAL_JSON: &str = r#"{
    "week_start": "2020-01-01",
    "qualityScore": 91,
    "critique": "removed salesy phrasing",
    "posts": [
        {"title": "why are my builds so slow lately", "body": "long body",
         "subreddit": "r/rust", "persona": "kai_dev", "topic": "build times",
         "comments": [
            {"persona": "mia", "text": "same here",
             "replies": [{"persona": "kai_dev", "text": "glad it's not just me"}]}
         ]},
        {"title": "how do you handle errors", "body": "short body",
         "subreddit": "r/rust", "persona": "mia", "topic": "error handling",
         "comments": {"comments": [{"persona": "kai_dev", "text": "anyhow at the edges"}]}}
    ]
}"#;

/// Scenario A: two-pass happy path.
#[tokio::test]
async fn two_pass_run_produces_enriched_calendar() {
    let client = ScriptedCompletionClient::new()
        .push_ok(DRAFT_JSON)
        .push_ok(FINAL_JSON);

    let result = run_generation(&client, &two_pass_config(), &request())
        .await
        .unwrap();

    assert_eq!(client.call_count(), 2);
    // week_start comes from today, not the model echo.
    assert_eq!(result.week_start, Utc::now().date_naive());
    assert_eq!(result.quality_score, Some(91.0));
    assert_eq!(result.critique.as_deref(), Some("removed salesy phrasing"));
    assert_eq!(result.posts.len(), 2);

    let roster: HashSet<&str> = ["kai_dev", "mia"].into_iter().collect();
    let mut ids = HashSet::new();
    for post in &result.posts {
        assert!(roster.contains(post.persona.as_str()));
        assert!(ids.insert(post.id));
        assert!((9..=20).contains(&post.timestamp.hour()));
        for comment in &post.comments {
            assert!(roster.contains(comment.persona.as_str()));
            assert!(ids.insert(comment.id));
            for reply in &comment.replies {
                assert!(roster.contains(reply.persona.as_str()));
                assert!(ids.insert(reply.id));
            }
        }
    }
    // Object-wrapped comments were coerced to a plain array.
    assert_eq!(result.posts[1].comments.len(), 1);
}

/// The review pass must receive the draft text verbatim.
#[tokio::test]
async fn review_pass_embeds_draft_output() {
    let client = ScriptedCompletionClient::new()
        .push_ok(DRAFT_JSON)
        .push_ok(FINAL_JSON);

    run_generation(&client, &two_pass_config(), &request())
        .await
        .unwrap();

    let calls = client.recorded_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1][1].content.contains(DRAFT_JSON));
    // Both passes carry a system message plus the composed prompt.
    assert_eq!(calls[0][0].role, "system");
    assert_eq!(calls[1][0].role, "system");
}

#[tokio::test]
async fn single_pass_run_calls_upstream_once() {
    let client = ScriptedCompletionClient::new().push_ok(FINAL_JSON);

    let result = run_generation(&client, &single_pass_config(), &request())
        .await
        .unwrap();

    assert_eq!(client.call_count(), 1);
    assert_eq!(result.posts.len(), 2);
}

/// Scenario B: week offset shifts the window by whole weeks.
#[tokio::test]
async fn week_offset_shifts_week_start() {
    let client = ScriptedCompletionClient::new().push_ok(FINAL_JSON);
    let mut req = request();
    req.week_offset = 1;

    let result = run_generation(&client, &single_pass_config(), &req)
        .await
        .unwrap();

    assert_eq!(result.week_start, Utc::now().date_naive() + Duration::days(7));
    for post in &result.posts {
        let date = post.timestamp.date_naive();
        assert!(date >= result.week_start);
        assert!(date < result.week_start + Duration::days(7));
    }
}

#[tokio::test]
async fn previously_used_topics_are_excluded_from_the_prompt() {
    let client = ScriptedCompletionClient::new().push_ok(FINAL_JSON);
    let mut req = request();
    req.previous_topics = vec!["build times".to_string(), "hiring".to_string()];

    run_generation(&client, &single_pass_config(), &req)
        .await
        .unwrap();

    let prompt = &client.recorded_calls()[0][1].content;
    assert!(prompt.contains("TOPIC QUERIES:\nerror handling"));
    assert!(prompt.contains("PREVIOUS TOPICS (avoid repeating):\nbuild times, hiring"));
}

/// Scenario C precursor: an empty draft pass is terminal.
#[tokio::test]
async fn empty_draft_response_fails_the_request() {
    let client = ScriptedCompletionClient::new().push_err(CompletionError::EmptyResponse);

    let err = run_generation(&client, &two_pass_config(), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::UpstreamEmpty("draft")));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn auth_failure_surfaces_without_retry() {
    let client = ScriptedCompletionClient::new().push_err(CompletionError::AuthFailed);

    let err = run_generation(&client, &two_pass_config(), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::UpstreamAuth));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn unparseable_final_text_is_malformed() {
    let client = ScriptedCompletionClient::new()
        .push_ok(DRAFT_JSON)
        .push_ok("here you go: not json at all");

    let err = run_generation(&client, &two_pass_config(), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Malformed(_)));
}

#[tokio::test]
async fn invalid_request_never_reaches_upstream() {
    let client = ScriptedCompletionClient::new().push_ok(FINAL_JSON);
    let mut req = request();
    req.personas.clear();

    let err = run_generation(&client, &two_pass_config(), &req)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Input(_)));
    assert_eq!(client.call_count(), 0);
}
