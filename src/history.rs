use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::session::{EndReason, SessionSummary};
use crate::variant::GameKind;

/// Receives the final result of every finished session
pub trait ScoreSink {
    fn submit(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// Hand a finished session to `sink` exactly once.
///
/// Failures are logged and swallowed; the player keeps their score either way.
pub fn report_final_score<S: ScoreSink + ?Sized>(sink: &mut S, summary: &SessionSummary) -> bool {
    match sink.submit(summary) {
        Ok(()) => {
            debug!(game = %summary.game, score = summary.score, "final score recorded");
            true
        }
        Err(e) => {
            warn!(game = %summary.game, score = summary.score, error = %e, "could not record final score");
            false
        }
    }
}

/// Local record of finished sessions
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database at the default state location
    pub fn new() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| "wordrush_history.db".into());
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game TEXT NOT NULL,
                prompt TEXT NOT NULL,
                score INTEGER NOT NULL,
                rounds_completed INTEGER NOT NULL,
                correct_answers INTEGER NOT NULL,
                lives_remaining INTEGER NOT NULL,
                end_reason TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_game ON sessions(game)",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn record(&self, summary: &SessionSummary) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (game, prompt, score, rounds_completed, correct_answers, lives_remaining, end_reason, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                summary.game.to_string(),
                summary.prompt,
                summary.score,
                summary.rounds_completed,
                summary.correct_answers,
                summary.lives_remaining,
                summary.end_reason.to_string(),
                summary.finished_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent sessions first
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game, prompt, score, rounds_completed, correct_answers, lives_remaining, end_reason, finished_at
            FROM sessions
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let game: String = row.get(0)?;
            let end_reason: String = row.get(6)?;
            let finished_at: String = row.get(7)?;
            Ok(SessionSummary {
                game: game.parse().map_err(|_| bad_column(0, "game"))?,
                prompt: row.get(1)?,
                score: row.get(2)?,
                rounds_completed: row.get(3)?,
                correct_answers: row.get(4)?,
                lives_remaining: row.get(5)?,
                end_reason: parse_end_reason(&end_reason).ok_or_else(|| bad_column(6, "end_reason"))?,
                finished_at: DateTime::parse_from_rfc3339(&finished_at)
                    .map_err(|_| bad_column(7, "finished_at"))?
                    .with_timezone(&Local),
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    pub fn best_score(&self, game: GameKind) -> Result<Option<u32>> {
        let best: Option<u32> = self
            .conn
            .query_row(
                "SELECT MAX(score) FROM sessions WHERE game = ?1",
                [game.to_string()],
                |row| row.get::<_, Option<u32>>(0),
            )
            .optional()?
            .flatten();
        Ok(best)
    }

    pub fn average_score(&self, game: GameKind) -> Result<Option<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT score FROM sessions WHERE game = ?1")?;
        let scores = stmt
            .query_map([game.to_string()], |row| row.get::<_, u32>(0))?
            .collect::<std::result::Result<Vec<u32>, _>>()?;
        let scores: Vec<f64> = scores.into_iter().map(f64::from).collect();
        Ok(crate::util::mean(&scores))
    }
}

impl ScoreSink for HistoryDb {
    fn submit(&mut self, summary: &SessionSummary) -> Result<()> {
        self.record(summary)
    }
}

fn bad_column(idx: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, name.to_string(), rusqlite::types::Type::Text)
}

fn parse_end_reason(s: &str) -> Option<EndReason> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}
