use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::catalog::CategoryRef;
use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::StoreError;
use crate::rank::Rank;
use crate::session::{GameMode, SessionResult};

/// One finished session as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub id: i64,
    pub timestamp: DateTime<Local>,
    pub mode: GameMode,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub average_speed: f64,
    pub elapsed_secs: u32,
    pub rank: String,
}

impl GameRecord {
    /// Unsaved record; the store assigns the id.
    pub fn from_result(result: &SessionResult, rank: &Rank, timestamp: DateTime<Local>) -> Self {
        Self {
            id: 0,
            timestamp,
            mode: result.mode,
            category_id: result.category.as_ref().map(|c| c.id.clone()),
            category_name: result.category.as_ref().map(|c| c.name.clone()),
            score: result.score,
            correct: result.correct,
            wrong: result.wrong,
            accuracy: result.accuracy,
            max_combo: result.max_combo,
            average_speed: result.average_speed,
            elapsed_secs: result.elapsed_secs,
            rank: rank.title.to_string(),
        }
    }

    pub fn category(&self) -> Option<CategoryRef> {
        match (&self.category_id, &self.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef {
                id: id.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }
}

/// Append-only log of finished sessions.
pub trait HistoryStore {
    /// Persist a record and return its id.
    fn record_result(&self, record: &GameRecord) -> Result<i64, StoreError>;
    /// Newest first.
    fn read_history(&self) -> Result<Vec<GameRecord>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

pub trait AchievementStore {
    /// Ids in unlock order.
    fn unlocked_achievements(&self) -> Result<Vec<String>, StoreError>;
    /// Returns false if the id was already unlocked.
    fn unlock(&self, id: &str, at: DateTime<Local>) -> Result<bool, StoreError>;
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS game_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        mode TEXT NOT NULL,
        category_id TEXT,
        category_name TEXT,
        score INTEGER NOT NULL,
        correct INTEGER NOT NULL,
        wrong INTEGER NOT NULL,
        accuracy INTEGER NOT NULL,
        max_combo INTEGER NOT NULL,
        average_speed REAL NOT NULL,
        elapsed_secs INTEGER NOT NULL,
        rank TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_game_history_category ON game_history(category_id);
    CREATE TABLE IF NOT EXISTS achievements (
        id TEXT PRIMARY KEY,
        unlocked_at TEXT NOT NULL
    );
"#;

/// SQLite-backed history and achievement storage
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
    history_limit: usize,
}

impl StatsDb {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening history db");
        Self::init(Connection::open(path)?)
    }

    /// Database under the application state directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kanatype_history.db"));
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(StatsDb {
            conn,
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Keep at most `limit` records; older ones are dropped on insert.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn prune(&self) -> Result<usize, StoreError> {
        let removed = self.conn.execute(
            r#"
            DELETE FROM game_history
            WHERE id NOT IN (SELECT id FROM game_history ORDER BY id DESC LIMIT ?1)
            "#,
            params![self.history_limit],
        )?;
        if removed > 0 {
            debug!(removed, "pruned history");
        }
        Ok(removed)
    }
}

/// Raw column values before they are validated.
struct StoredRow {
    id: i64,
    timestamp: String,
    mode: String,
    category_id: Option<String>,
    category_name: Option<String>,
    score: u32,
    correct: u32,
    wrong: u32,
    accuracy: u32,
    max_combo: u32,
    average_speed: f64,
    elapsed_secs: u32,
    rank: String,
}

impl StoredRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            mode: row.get(2)?,
            category_id: row.get(3)?,
            category_name: row.get(4)?,
            score: row.get(5)?,
            correct: row.get(6)?,
            wrong: row.get(7)?,
            accuracy: row.get(8)?,
            max_combo: row.get(9)?,
            average_speed: row.get(10)?,
            elapsed_secs: row.get(11)?,
            rank: row.get(12)?,
        })
    }

    fn into_record(self) -> Result<GameRecord, StoreError> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| StoreError::CorruptRow {
                id: self.id,
                reason: format!("timestamp {:?}: {e}", self.timestamp),
            })?
            .with_timezone(&Local);
        let mode = self
            .mode
            .parse::<GameMode>()
            .map_err(|_| StoreError::CorruptRow {
                id: self.id,
                reason: format!("unknown mode {:?}", self.mode),
            })?;

        Ok(GameRecord {
            id: self.id,
            timestamp,
            mode,
            category_id: self.category_id,
            category_name: self.category_name,
            score: self.score,
            correct: self.correct,
            wrong: self.wrong,
            accuracy: self.accuracy,
            max_combo: self.max_combo,
            average_speed: self.average_speed,
            elapsed_secs: self.elapsed_secs,
            rank: self.rank,
        })
    }
}

impl HistoryStore for StatsDb {
    fn record_result(&self, record: &GameRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO game_history
            (timestamp, mode, category_id, category_name, score, correct, wrong,
             accuracy, max_combo, average_speed, elapsed_secs, rank)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.timestamp.to_rfc3339(),
                record.mode.to_string(),
                record.category_id,
                record.category_name,
                record.score,
                record.correct,
                record.wrong,
                record.accuracy,
                record.max_combo,
                record.average_speed,
                record.elapsed_secs,
                record.rank,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.prune()?;
        Ok(id)
    }

    fn read_history(&self) -> Result<Vec<GameRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, timestamp, mode, category_id, category_name, score, correct, wrong,
                   accuracy, max_combo, average_speed, elapsed_secs, rank
            FROM game_history
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map([], StoredRow::read)?;

        let mut history = Vec::new();
        for row in rows {
            match row?.into_record() {
                Ok(record) => history.push(record),
                Err(err) => warn!(%err, "skipping history row"),
            }
        }

        Ok(history)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM game_history", [])?;
        Ok(())
    }
}

impl AchievementStore for StatsDb {
    fn unlocked_achievements(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM achievements ORDER BY unlocked_at, rowid")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn unlock(&self, id: &str, at: DateTime<Local>) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO achievements (id, unlocked_at) VALUES (?1, ?2)",
            params![id, at.to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }
}

/// Write the history as CSV with a header row.
pub fn export_csv<W: Write>(records: &[GameRecord], writer: W) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
