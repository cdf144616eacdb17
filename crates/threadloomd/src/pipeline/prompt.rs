//! Prompt composition.
//!
//! Pure string interpolation: the composer renders the draft
//! instruction document and, for two-pass runs, the reviewer document
//! that embeds the verbatim pass-1 output. It never parses what it
//! embeds - that is the normalizer's job.

use chrono::NaiveDate;
use threadloom_common::{GenerationRequest, Persona};

pub const DRAFT_SYSTEM_PROMPT: &str =
    "You represent the raw, unfiltered internet. Output JSON.";

pub const REVIEW_SYSTEM_PROMPT: &str = "You are an expert editor. Output optimized JSON.";

/// Render the persona roster block shared by both prompts.
pub fn format_personas(personas: &[Persona]) -> String {
    personas
        .iter()
        .map(|p| format!("- Username: u/{}\n  Bio/Tone: {}", p.username, p.bio))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The pass-1 document: writing rules, the closed persona roster, the
/// allowed channels and topics, and the strict output contract.
pub fn draft_prompt(
    req: &GenerationRequest,
    topics_to_use: &[String],
    week_start: NaiveDate,
) -> String {
    format!(
        r#"
You are "The Architect" - the best generator of human-like community content.

Your mission:
Create content so natural, opinionated, flawed, emotional, and contextually aware that real community members cannot distinguish it from a human.

RULES OF WRITING:
1. Zero corporate tone. These communities hate marketing speak.
2. Imperfect grammar allowed: lowercase "i", run-on sentences, slang, "idk", "ngl", etc.
3. Vary sentence structure and rhythm.
4. Posts must reflect the actual culture of the target community.
5. Include mild disagreements, uncertainty, humor, sarcasm.
6. When appropriate, use personal anecdotes.
7. Subtle company mentions are okay, but no sales pitch.

STRICT PERSONA RULES:
- Only use the personas provided below.
- No invented usernames.
- Never have a persona reply to themselves.
- Every persona must keep a consistent tone, vocabulary, and viewpoint.

TECHNICAL RULES:
- Always output VALID JSON.
- No trailing commas.
- No markdown formatting and no code fences.

TASK: Generate a complete weekly content calendar following all rules above.

---------------------------------
COMPANY INFO:
{company_info}

WEBSITE:
{company_website}

PERSONAS (ONLY use these personas):
{personas}

TARGET COMMUNITIES:
{subreddits}

TOPIC QUERIES:
{topics}

POSTS REQUIRED THIS WEEK:
{posts_per_week}

PREVIOUS TOPICS (avoid repeating):
{previous_topics}

---------------------------------
For each post generate:
- title: short, punchy, human
- body: 2-6 paragraphs, variable length (long for deep topics, short for questions or rants)
- 3-6 comments, each from a different persona on the provided list, that reference specific parts of the post, build on each other, and include disagreements, clarifications, advice, and emotion

---------------------------------
OUTPUT FORMAT (STRICT JSON ONLY)

{{
  "week_start": "{week_start}",
  "posts": [
    {{
      "title": "string",
      "body": "string",
      "subreddit": "string",
      "persona": "string",
      "topic": "string",
      "comments": [
        {{ "persona": "string", "text": "string", "replies": [ ... ] }}
      ]
    }}
  ]
}}

No markdown. No explanation. Return ONLY JSON.
"#,
        company_info = req.company_info,
        company_website = req.company_website,
        personas = format_personas(&req.personas),
        subreddits = req.subreddits.join(", "),
        topics = topics_to_use.join(", "),
        posts_per_week = req.posts_per_week,
        previous_topics = req.previous_topics.join(", "),
        week_start = week_start,
    )
}

/// The pass-2 document: review checklist over the embedded draft, plus
/// the required qualityScore and critique fields in the output shape.
pub fn review_prompt(personas: &[Persona], draft_json: &str) -> String {
    format!(
        r#"
You are "The Critic" - an elite content QA model.

Your job is to FIX and UPGRADE the draft calendar JSON below.

---------------------------------
VALID PERSONAS:
{personas}

INPUT JSON:
{draft_json}

---------------------------------
CRITIC CHECKLIST:

1. SALESY DETECTION
If any post sounds like an ad, a pitch, or corporate content, rewrite it as a frustrated question, rant, or anecdotal post.

2. PERSONA CONSISTENCY
Personas must speak consistently, vocabulary must match their bio, and no persona may reply to themselves. Fix violations.

3. UNKNOWN USERNAMES
If ANY username is not in the valid persona list, replace it with a valid one.

4. COMMUNITY FIT
If a post does not match the culture of its target community, rewrite the tone or content to fit.

5. REALISM BOOST
Enhance natural flow, slang, slight typos, conversational engagement, and emotional nuance.

6. LENGTH BALANCING
Posts should vary: some long deep dives, some short raw questions, some personal stories.

7. COMMENT THREAD LOGIC
Fix comments that do not reference the post, replies that make no sense, repetitive personas, or threads that feel too polished.

---------------------------------
FINAL TASK:
Return:

{{
  "week_start": "...",
  "qualityScore": number (0-100),
  "critique": "description of what you improved",
  "posts": [...]
}}

Only JSON. Nothing else. No markdown, no code fences.
"#,
        personas = format_personas(personas),
        draft_json = draft_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> GenerationRequest {
        GenerationRequest {
            company_info: "Acme builds rust tooling".to_string(),
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
            topics: vec!["build times".to_string()],
            posts_per_week: 2,
            previous_topics: vec!["pricing".to_string()],
            week_offset: 0,
        }
    }

    #[test]
    fn draft_prompt_carries_all_inputs() {
        let week = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let prompt = draft_prompt(&request(), &["build times".to_string()], week);

        assert!(prompt.contains("u/kai_dev"));
        assert!(prompt.contains("grumpy backend dev"));
        assert!(prompt.contains("r/rust"));
        assert!(prompt.contains("\"week_start\": \"2026-01-05\""));
        assert!(prompt.contains("POSTS REQUIRED THIS WEEK:\n2"));
        assert!(prompt.contains("PREVIOUS TOPICS (avoid repeating):\npricing"));
    }

    #[test]
    fn draft_prompt_states_persona_constraints() {
        let week = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let prompt = draft_prompt(&request(), &[], week);
        assert!(prompt.contains("No invented usernames"));
        assert!(prompt.contains("Never have a persona reply to themselves"));
        assert!(prompt.contains("no code fences"));
    }

    #[test]
    fn review_prompt_embeds_draft_verbatim() {
        let draft = r#"{"week_start":"2026-01-05","posts":[]}"#;
        let prompt = review_prompt(&request().personas, draft);
        assert!(prompt.contains(draft));
        assert!(prompt.contains("qualityScore"));
        assert!(prompt.contains("critique"));
        assert!(prompt.contains("u/mia"));
    }
}
