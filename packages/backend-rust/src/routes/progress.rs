use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::response::{ok, AppError};
use crate::routes::require_db;
use crate::services::progress::{self, QuizScoreInput, TermProgressInput};
use crate::state::AppState;

/// The session-wide routes share their first segment with `/:session_id`;
/// their names are reserved session ids, see `RESERVED_SESSION_IDS`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/term-progress/:session_id", post(mark_term))
        .route("/stats/:session_id", get(stats))
        .route("/quiz-score/:session_id", post(record_quiz_score))
        .route("/reset-all-progress/:session_id", post(reset))
        .route("/:session_id", get(get_progress))
        .route("/:session_id/:date", axum::routing::delete(delete_date))
        .route(
            "/:session_id/:date/:index",
            post(mark_slot).delete(unmark_slot),
        )
}

#[derive(Debug, Serialize)]
struct SlotProgressData {
    date: String,
    learned: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct TermProgressData {
    date: String,
    info_index: i64,
    learned_terms: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeletedData {
    deleted: u64,
    message: String,
}

async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let view = progress::get_progress(&db, &session_id).await?;
    Ok(ok(view))
}

async fn mark_slot(
    State(state): State<AppState>,
    Path((session_id, date, index)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let learned = progress::mark_slot(&db, &session_id, &date, &index).await?;
    Ok(ok(SlotProgressData { date, learned }))
}

async fn unmark_slot(
    State(state): State<AppState>,
    Path((session_id, date, index)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let learned = progress::unmark_slot(&db, &session_id, &date, &index).await?;
    Ok(ok(SlotProgressData { date, learned }))
}

async fn delete_date(
    State(state): State<AppState>,
    Path((session_id, date)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let deleted = progress::delete_date(&db, &session_id, &date).await?;
    Ok(ok(DeletedData {
        deleted,
        message: format!("progress for {date} deleted"),
    }))
}

async fn mark_term(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<TermProgressInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let db = require_db(&state)?;
    let date = input.date.clone();
    let info_index = input.info_index;
    let learned_terms = progress::mark_term(&db, &session_id, input).await?;
    Ok(ok(TermProgressData {
        date,
        info_index,
        learned_terms,
    }))
}

async fn stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let stats = progress::stats(&db, &session_id).await?;
    Ok(ok(stats))
}

async fn record_quiz_score(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<QuizScoreInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let db = require_db(&state)?;
    let stats = progress::record_quiz_score(&db, &session_id, input).await?;
    Ok(ok(stats))
}

async fn reset(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let deleted = progress::reset(&db, &session_id).await?;
    Ok(ok(DeletedData {
        deleted,
        message: format!("all progress for session {session_id} reset"),
    }))
}
