use std::collections::{BTreeMap, BTreeSet};

use ai_info_core::progress::{
    decode_slot_indices, decode_term_set, encode_slot_indices, encode_term_set,
};
use ai_info_core::terms;
use ai_info_core::{Language, Ledger, ProgressKey};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::operations::{cards, progress};
use crate::db::Database;
use crate::services::{parse_slot_index, validate_date, ServiceError};

/// Leading path segments of the session-wide progress routes. A session with
/// one of these ids could not be addressed by the per-date routes, so writes
/// for them are rejected.
pub const RESERVED_SESSION_IDS: &[&str] =
    &["term-progress", "stats", "quiz-score", "reset-all-progress"];

#[derive(Debug, Clone, Serialize)]
pub struct TermProgressView {
    pub date: String,
    pub info_index: usize,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub session_id: String,
    /// Fully learned slot indices per date.
    pub learned: BTreeMap<String, Vec<usize>>,
    pub learned_terms: Vec<TermProgressView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermProgressInput {
    pub term: String,
    pub date: String,
    #[serde(alias = "infoIndex")]
    pub info_index: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizScoreInput {
    pub score: u32,
    #[serde(alias = "totalQuestions")]
    pub total_questions: u32,
}

/// Counters persisted under the stats key. Unknown or missing fields default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredStats {
    pub quiz_score: u32,
    pub cumulative_quiz_correct: u64,
    pub cumulative_quiz_total: u64,
    pub max_streak: u32,
    pub last_quiz_date: Option<String>,
}

impl StoredStats {
    fn decode(raw: Option<&str>) -> Self {
        raw.and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total_learned: usize,
    pub total_terms_learned: usize,
    pub streak_days: u32,
    pub max_streak: u32,
    pub last_learned_date: Option<String>,
    pub quiz_score: u32,
    pub cumulative_quiz_correct: u64,
    pub cumulative_quiz_total: u64,
    pub cumulative_quiz_score: u32,
    pub total_ai_info_available: usize,
    pub total_terms_available: usize,
}

pub fn validate_session_id(session_id: &str) -> Result<(), ServiceError> {
    if session_id.trim().is_empty() {
        return Err(ServiceError::Validation("session id must not be empty".to_string()));
    }
    if RESERVED_SESSION_IDS.contains(&session_id) {
        return Err(ServiceError::Validation(format!(
            "session id '{session_id}' is reserved"
        )));
    }
    Ok(())
}

pub async fn load_ledger(db: &Database, session_id: &str) -> Result<Ledger, ServiceError> {
    let rows = progress::list_progress(db, session_id).await?;
    let ledger = Ledger::from_records(
        rows.iter()
            .filter_map(|row| row.learned_info.as_deref().map(|info| (row.key.as_str(), info))),
    );
    Ok(ledger)
}

pub async fn get_progress(db: &Database, session_id: &str) -> Result<ProgressView, ServiceError> {
    let ledger = load_ledger(db, session_id).await?;
    Ok(ProgressView {
        session_id: session_id.to_string(),
        learned: ledger.completed_by_date(),
        learned_terms: ledger
            .learned_terms
            .iter()
            .map(|(slot_ref, terms)| TermProgressView {
                date: slot_ref.date.clone(),
                info_index: slot_ref.slot,
                terms: terms.iter().cloned().collect(),
            })
            .collect(),
    })
}

async fn stored_slot_indices(
    db: &Database,
    session_id: &str,
    key: &ProgressKey,
) -> Result<BTreeSet<usize>, ServiceError> {
    let row = progress::find_progress(db, session_id, key).await?;
    Ok(row
        .and_then(|row| row.learned_info)
        .and_then(|raw| decode_slot_indices(&raw))
        .unwrap_or_default())
}

/// Marks one slot as fully learned. Returns the learned indices for the date.
pub async fn mark_slot(
    db: &Database,
    session_id: &str,
    date: &str,
    raw_index: &str,
) -> Result<Vec<usize>, ServiceError> {
    validate_session_id(session_id)?;
    validate_date(date)?;
    let index = parse_slot_index(raw_index)?;
    let key = ProgressKey::SlotCompletion {
        date: date.to_string(),
    };

    let mut indices = stored_slot_indices(db, session_id, &key).await?;
    indices.insert(index);
    progress::upsert_learned_info(db, session_id, &key, &encode_slot_indices(&indices)).await?;

    tracing::debug!(session_id, date, index, "slot marked learned");
    Ok(indices.into_iter().collect())
}

/// Removes one slot from the learned set; the record goes away once empty.
pub async fn unmark_slot(
    db: &Database,
    session_id: &str,
    date: &str,
    raw_index: &str,
) -> Result<Vec<usize>, ServiceError> {
    let index = parse_slot_index(raw_index)?;
    let key = ProgressKey::SlotCompletion {
        date: date.to_string(),
    };

    let mut indices = stored_slot_indices(db, session_id, &key).await?;
    if !indices.remove(&index) {
        return Err(ServiceError::NotFound(format!(
            "item {index} of {date} is not marked as learned"
        )));
    }

    if indices.is_empty() {
        progress::delete_progress(db, session_id, &key).await?;
    } else {
        progress::upsert_learned_info(db, session_id, &key, &encode_slot_indices(&indices)).await?;
    }

    Ok(indices.into_iter().collect())
}

/// Forgets everything learned for one date, including individual terms.
pub async fn delete_date(db: &Database, session_id: &str, date: &str) -> Result<u64, ServiceError> {
    let key = ProgressKey::SlotCompletion {
        date: date.to_string(),
    };
    let mut deleted = u64::from(progress::delete_progress(db, session_id, &key).await?);
    deleted += progress::delete_term_progress_for_date(db, session_id, date).await?;

    if deleted == 0 {
        return Err(ServiceError::NotFound(format!("no progress recorded for {date}")));
    }
    Ok(deleted)
}

/// Records one individually learned term. Returns the learned terms of the slot.
pub async fn mark_term(
    db: &Database,
    session_id: &str,
    input: TermProgressInput,
) -> Result<Vec<String>, ServiceError> {
    validate_session_id(session_id)?;
    validate_date(&input.date)?;
    let index = parse_slot_index(&input.info_index.to_string())?;
    let term = input.term.trim();
    if term.is_empty() {
        return Err(ServiceError::Validation("term must not be empty".to_string()));
    }

    let key = ProgressKey::TermCompletion {
        date: input.date.clone(),
        slot: index,
    };

    let mut learned = progress::find_progress(db, session_id, &key)
        .await?
        .and_then(|row| row.learned_info)
        .and_then(|raw| decode_term_set(&raw))
        .unwrap_or_default();
    learned.insert(term.to_string());

    progress::upsert_learned_info(db, session_id, &key, &encode_term_set(&learned)).await?;
    Ok(learned.into_iter().collect())
}

/// Recomputes the session's statistics and stores them under the stats key.
pub async fn stats(db: &Database, session_id: &str) -> Result<UserStats, ServiceError> {
    let stored = load_stored_stats(db, session_id).await?;
    let stats = compute_stats(db, session_id, stored, Utc::now().date_naive()).await?;
    Ok(stats)
}

pub async fn record_quiz_score(
    db: &Database,
    session_id: &str,
    input: QuizScoreInput,
) -> Result<UserStats, ServiceError> {
    validate_session_id(session_id)?;
    if input.total_questions == 0 {
        return Err(ServiceError::Validation(
            "total_questions must be greater than 0".to_string(),
        ));
    }
    if input.score > input.total_questions {
        return Err(ServiceError::Validation(format!(
            "score {} exceeds total_questions {}",
            input.score, input.total_questions
        )));
    }

    let today = Utc::now().date_naive();
    let mut stored = load_stored_stats(db, session_id).await?;
    stored.quiz_score = percentage(u64::from(input.score), u64::from(input.total_questions));
    stored.cumulative_quiz_correct += u64::from(input.score);
    stored.cumulative_quiz_total += u64::from(input.total_questions);
    stored.last_quiz_date = Some(today.format("%Y-%m-%d").to_string());

    compute_stats(db, session_id, stored, today).await
}

pub async fn reset(db: &Database, session_id: &str) -> Result<u64, ServiceError> {
    let deleted = progress::delete_session(db, session_id).await?;
    tracing::info!(session_id, deleted, "progress reset");
    Ok(deleted)
}

async fn load_stored_stats(db: &Database, session_id: &str) -> Result<StoredStats, ServiceError> {
    let row = progress::find_progress(db, session_id, &ProgressKey::Stats).await?;
    Ok(StoredStats::decode(row.and_then(|row| row.stats).as_deref()))
}

async fn compute_stats(
    db: &Database,
    session_id: &str,
    mut stored: StoredStats,
    today: NaiveDate,
) -> Result<UserStats, ServiceError> {
    let ledger = load_ledger(db, session_id).await?;
    let all = cards::list_cards(db).await?;

    let learned_terms = terms::aggregate(&ledger, all.as_slice(), Language::PRIMARY);
    let available_terms =
        terms::aggregate(&Ledger::covering(all.iter()), all.as_slice(), Language::PRIMARY);

    let dates: BTreeSet<NaiveDate> = ledger
        .active_dates()
        .iter()
        .filter_map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .collect();
    let streaks = compute_streaks(&dates, today);
    stored.max_streak = stored.max_streak.max(streaks.longest);

    let encoded = serde_json::to_string(&stored).unwrap_or_else(|_| "{}".to_string());
    progress::upsert_stats(db, session_id, &encoded).await?;

    Ok(UserStats {
        total_learned: ledger.completed.len(),
        total_terms_learned: learned_terms.total_terms(),
        streak_days: streaks.current,
        max_streak: stored.max_streak,
        last_learned_date: dates.iter().next_back().map(|d| d.format("%Y-%m-%d").to_string()),
        quiz_score: stored.quiz_score,
        cumulative_quiz_correct: stored.cumulative_quiz_correct,
        cumulative_quiz_total: stored.cumulative_quiz_total,
        cumulative_quiz_score: percentage(
            stored.cumulative_quiz_correct,
            stored.cumulative_quiz_total,
        ),
        total_ai_info_available: all.iter().map(|card| card.populated_slots().count()).sum(),
        total_terms_available: available_terms.total_terms(),
    })
}

fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streaks {
    /// Run ending at the latest date, zero once that date is older than yesterday.
    pub current: u32,
    pub longest: u32,
}

pub fn compute_streaks(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streaks {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in dates {
        run = match previous {
            Some(prev) if *date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*date);
    }

    let current = match previous {
        Some(last) if last >= today - Duration::days(1) => run,
        _ => 0,
    };

    Streaks { current, longest }
}
