//! Command implementations.

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;
use threadloom_common::{export, CalendarResult, GenerationRequest};

/// Submit a request file to the daemon, print the calendar, and
/// optionally write the CSV export.
pub async fn generate(request_path: &Path, server: &str, export_path: Option<&Path>) -> Result<()> {
    let contents = fs::read_to_string(request_path)
        .with_context(|| format!("failed to read {}", request_path.display()))?;
    let request: GenerationRequest = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid generation request", request_path.display()))?;

    println!(
        "Generating {} post(s) for {} persona(s)...",
        request.posts_per_week,
        request.personas.len()
    );

    let url = format!("{}/generate", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("failed to reach daemon at {}", server))?;

    if !response.status().is_success() {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["error"].as_str().unwrap_or("unknown error");
        bail!("daemon returned {}: {}", status, message);
    }

    let calendar: CalendarResult = response
        .json()
        .await
        .context("daemon returned an unreadable calendar")?;

    print_calendar(&calendar);

    if let Some(path) = export_path {
        fs::write(path, export::export_csv(&calendar))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nExport written to {}", path.display().green());
    }

    Ok(())
}

/// Query daemon liveness.
pub async fn health(server: &str) -> Result<()> {
    let url = format!("{}/health", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach daemon at {}", server))?;

    let body: serde_json::Value = response.json().await.context("unreadable health response")?;
    println!(
        "{} v{} (uptime {}s, {} pass pipeline)",
        body["status"].as_str().unwrap_or("unknown").green().bold(),
        body["version"].as_str().unwrap_or("?"),
        body["uptime_secs"].as_u64().unwrap_or(0),
        body["passes"].as_u64().unwrap_or(0),
    );
    Ok(())
}

fn print_calendar(calendar: &CalendarResult) {
    println!();
    println!("{}", "Content Schedule".bold());
    println!("Week of {}", calendar.week_start.to_string().cyan());
    if let Some(score) = calendar.quality_score {
        println!("Quality score: {}", format!("{:.0}/100", score).yellow());
    }
    if let Some(critique) = &calendar.critique {
        println!("Critique: {}", critique.dimmed());
    }

    for post in &calendar.posts {
        println!();
        println!(
            "  {} {} {}",
            post.subreddit.blue().bold(),
            format!("u/{}", post.persona).dimmed(),
            post.timestamp.format("%a %H:%M").to_string().dimmed(),
        );
        println!("  {}", post.title.bold());
        println!("  topic: {} | {} comment(s)", post.topic, post.comments.len());
    }
    println!();
}
