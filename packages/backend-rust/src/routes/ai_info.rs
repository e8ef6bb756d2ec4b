use ai_info_core::Language;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::{ok, AppError};
use crate::routes::require_db;
use crate::services::ai_info::{self, UpsertRequest};
use crate::services::learning;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upsert))
        .route("/dates/all", get(list_dates))
        .route("/all", get(list_all))
        .route("/total-days", get(total_days))
        .route("/total-count", get(total_count))
        .route("/terms-total-count", get(terms_total_count))
        .route("/categories/all", get(categories))
        .route("/categories/stats", get(category_stats))
        .route("/categories/:category/subcategories", get(subcategories))
        .route("/by-category/:category", get(by_category))
        .route("/classify", post(classify))
        .route("/terms-quiz/:session_id", get(session_quiz))
        .route("/terms-quiz-by-date/:date", get(date_quiz))
        .route("/learned-terms/:session_id", get(learned_terms))
        .route("/all-terms/:language", get(all_terms))
        .route("/:date", get(get_by_date).delete(delete_card))
        .route("/:date/item/:index", delete(delete_slot))
        .route("/:date/category/:index", patch(update_category))
}

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    language: Option<String>,
}

impl LanguageQuery {
    fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(Language::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct QuizQuery {
    language: Option<String>,
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct ListData<T> {
    items: Vec<T>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> ListData<T> {
    fn new(items: Vec<T>, empty_message: &str) -> Self {
        let message = items.is_empty().then(|| empty_message.to_string());
        Self {
            count: items.len(),
            items,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
struct DeletedCard {
    date: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct CountData<T> {
    total: T,
}

async fn get_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let views = ai_info::get_by_date(&db, state.classifier(), &date, query.language()).await?;
    Ok(ok(ListData::new(views, "no AI info for this date")))
}

async fn upsert(
    State(state): State<AppState>,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let db = require_db(&state)?;
    let card = ai_info::upsert(&db, request).await?;
    Ok(ok(card))
}

async fn delete_card(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    ai_info::delete_card(&db, &date).await?;
    Ok(ok(DeletedCard {
        message: format!("AI info for {date} deleted"),
        date,
    }))
}

async fn delete_slot(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let deletion = ai_info::delete_slot(&db, &date, &index).await?;
    Ok(ok(deletion))
}

async fn update_category(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, String)>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let view =
        ai_info::update_category(&db, state.classifier(), &date, &index, &query.category).await?;
    Ok(ok(view))
}

async fn list_dates(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let dates = ai_info::list_dates(&db).await?;
    Ok(ok(dates))
}

async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let views = ai_info::list_all(&db, state.classifier(), query.language()).await?;
    Ok(ok(ListData::new(views, "no AI info registered")))
}

async fn total_days(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let total = ai_info::total_days(&db).await?;
    Ok(ok(CountData { total }))
}

async fn total_count(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let total = ai_info::total_count(&db).await?;
    Ok(ok(CountData { total }))
}

async fn terms_total_count(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let totals = ai_info::terms_totals(&db, query.language()).await?;
    Ok(ok(totals))
}

async fn categories(State(state): State<AppState>) -> impl IntoResponse {
    ok(ai_info::categories(state.classifier()))
}

async fn category_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let stats = ai_info::category_stats(&db, state.classifier()).await?;
    Ok(ok(stats))
}

async fn subcategories(Path(_category): Path<String>) -> impl IntoResponse {
    ok(Vec::<String>::new())
}

async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let views = ai_info::by_category(&db, state.classifier(), &category, query.language()).await?;
    Ok(ok(ListData::new(views, "no AI info in this category")))
}

async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    Ok(ok(ai_info::classify_text(
        state.classifier(),
        &request.title,
        &request.content,
    )))
}

async fn session_quiz(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<QuizQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let count = state.quiz().resolve(query.count);
    let language = query.language.as_deref().unwrap_or(Language::PRIMARY.code());
    let quiz = learning::quiz_for_session(&db, &session_id, language, count).await?;
    Ok(ok(quiz))
}

async fn date_quiz(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<QuizQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let count = state.quiz().resolve(query.count);
    let language = query.language.as_deref().unwrap_or(Language::PRIMARY.code());
    let quiz = learning::quiz_for_date(&db, &date, language, count).await?;
    Ok(ok(quiz))
}

async fn learned_terms(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let view = learning::learned_terms(&db, &session_id, query.language()).await?;
    Ok(ok(view))
}

async fn all_terms(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let language = Language::parse(&language).unwrap_or_default();
    let view = learning::all_terms(&db, language).await?;
    Ok(ok(view))
}
