//! Append-only audit sink.
//!
//! Every successful generation is recorded in a local SQLite table for
//! history and audit. The write is best-effort and fire-and-forget:
//! failures are logged and never reach the caller, and an unconfigured
//! sink skips the write entirely. Rows are never updated or deleted.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Arc;
use threadloom_common::CalendarResult;
use tracing::{info, warn};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS content_generations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_info TEXT NOT NULL,
    week_start TEXT NOT NULL,
    full_response TEXT NOT NULL,
    quality_score REAL NOT NULL,
    created_at TEXT NOT NULL
)";

pub struct AuditSink {
    path: PathBuf,
}

impl AuditSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one generation record. Blocking; call through
    /// [`spawn_append`] from async context.
    pub fn append(&self, company_info: &str, result: &CalendarResult) -> Result<()> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("failed to open audit db at {}", self.path.display()))?;
        conn.execute(CREATE_TABLE_SQL, [])
            .context("failed to create audit table")?;

        let full_response =
            serde_json::to_string(result).context("failed to serialize calendar")?;
        conn.execute(
            "INSERT INTO content_generations
                 (company_info, week_start, full_response, quality_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                company_info,
                result.week_start.to_string(),
                full_response,
                result.quality_score.unwrap_or(0.0),
                Utc::now().to_rfc3339(),
            ],
        )
        .context("failed to insert audit row")?;
        Ok(())
    }
}

/// Fire-and-forget append. The HTTP response is already decided when
/// this runs; a sink failure only produces a warning.
pub fn spawn_append(sink: Arc<AuditSink>, company_info: String, result: CalendarResult) {
    tokio::task::spawn_blocking(move || match sink.append(&company_info, &result) {
        Ok(()) => info!("Audit record appended for week {}", result.week_start),
        Err(e) => warn!("Audit sink write failed (ignored): {:#}", e),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn calendar() -> CalendarResult {
        CalendarResult {
            week_start: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            quality_score: Some(77.0),
            critique: None,
            posts: vec![],
        }
    }

    #[test]
    fn append_creates_table_and_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AuditSink::new(dir.path().join("audit.db"));

        sink.append("acme", &calendar()).unwrap();
        sink.append("acme", &calendar()).unwrap();

        let conn = Connection::open(dir.path().join("audit.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM content_generations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 2);

        let (week, score): (String, f64) = conn
            .query_row(
                "SELECT week_start, quality_score FROM content_generations LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(week, "2026-01-05");
        assert_eq!(score, 77.0);
    }

    #[test]
    fn append_to_unwritable_path_fails_without_panicking() {
        let sink = AuditSink::new(PathBuf::from("/nonexistent/threadloom/audit.db"));
        assert!(sink.append("acme", &calendar()).is_err());
    }
}
