use ai_info_core::ProgressKey;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Database;

/// One stored progress record with its key still in storage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRow {
    pub key: String,
    pub learned_info: Option<String>,
    pub stats: Option<String>,
}

pub async fn list_progress(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ProgressRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "date", "learned_info", "stats"
        FROM "user_progress"
        WHERE "session_id" = ?
        ORDER BY "date"
        "#,
    )
    .bind(session_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_progress_row).collect())
}

pub async fn find_progress(
    db: &Database,
    session_id: &str,
    key: &ProgressKey,
) -> Result<Option<ProgressRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "date", "learned_info", "stats"
        FROM "user_progress"
        WHERE "session_id" = ? AND "date" = ?
        "#,
    )
    .bind(session_id)
    .bind(key.storage_key())
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_progress_row))
}

pub async fn upsert_learned_info(
    db: &Database,
    session_id: &str,
    key: &ProgressKey,
    learned_info: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "user_progress" ("session_id", "date", "learned_info")
        VALUES (?, ?, ?)
        ON CONFLICT ("session_id", "date") DO UPDATE SET
            "learned_info" = excluded."learned_info",
            "updated_at" = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(session_id)
    .bind(key.storage_key())
    .bind(learned_info)
    .execute(db.pool())
    .await?;
    Ok(())
}

pub async fn upsert_stats(db: &Database, session_id: &str, stats: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "user_progress" ("session_id", "date", "stats")
        VALUES (?, ?, ?)
        ON CONFLICT ("session_id", "date") DO UPDATE SET
            "stats" = excluded."stats",
            "updated_at" = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(session_id)
    .bind(ProgressKey::Stats.storage_key())
    .bind(stats)
    .execute(db.pool())
    .await?;
    Ok(())
}

/// Returns `false` when nothing was stored under `key`.
pub async fn delete_progress(
    db: &Database,
    session_id: &str,
    key: &ProgressKey,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "user_progress" WHERE "session_id" = ? AND "date" = ?"#)
        .bind(session_id)
        .bind(key.storage_key())
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the term records of every slot of `date`.
pub async fn delete_term_progress_for_date(
    db: &Database,
    session_id: &str,
    date: &str,
) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;
    for slot in 0..ai_info_core::SLOT_COUNT {
        let key = ProgressKey::TermCompletion {
            date: date.to_string(),
            slot,
        };
        if delete_progress(db, session_id, &key).await? {
            deleted += 1;
        }
    }
    Ok(deleted)
}

pub async fn delete_session(db: &Database, session_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "user_progress" WHERE "session_id" = ?"#)
        .bind(session_id)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected())
}

fn map_progress_row(row: &SqliteRow) -> ProgressRow {
    ProgressRow {
        key: row.try_get("date").unwrap_or_default(),
        learned_info: row.try_get("learned_info").ok().flatten(),
        stats: row.try_get("stats").ok().flatten(),
    }
}
