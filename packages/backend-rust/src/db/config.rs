use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::SqliteJournalMode;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    /// Database file whose parent directory is created on connect.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub journal_mode: SqliteJournalMode,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let (url, path) = match std::env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            Some(url) => (url, None),
            None => {
                let path = default_db_path();
                (sqlite_url(&path), Some(path))
            }
        };

        Self {
            url,
            path,
            max_connections: env_u32("DB_MAX_CONNECTIONS", 5),
            busy_timeout: Duration::from_millis(env_u64("SQLITE_BUSY_TIMEOUT_MS", 30_000)),
            journal_mode: std::env::var("SQLITE_JOURNAL_MODE")
                .ok()
                .as_deref()
                .and_then(parse_journal_mode)
                .unwrap_or(SqliteJournalMode::Wal),
        }
    }

    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            url: sqlite_url(&path),
            path: Some(path),
            max_connections: 5,
            busy_timeout: Duration::from_secs(30),
            journal_mode: SqliteJournalMode::Wal,
        }
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ai-info")
        .join("data.db")
}

fn sqlite_url(path: &std::path::Path) -> String {
    format!("sqlite:{}?mode=rwc", path.display())
}

fn parse_journal_mode(value: &str) -> Option<SqliteJournalMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "wal" => Some(SqliteJournalMode::Wal),
        "delete" => Some(SqliteJournalMode::Delete),
        "truncate" => Some(SqliteJournalMode::Truncate),
        "memory" => Some(SqliteJournalMode::Memory),
        _ => None,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}
