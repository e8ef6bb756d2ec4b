use std::collections::BTreeMap;

use ai_info_core::quiz::{self, QuizTemplate};
use ai_info_core::terms::{self, LearnedTerm};
use ai_info_core::{Card, Language, Ledger, QuizSet, TermAggregate};
use serde::Serialize;

use crate::db::operations::cards;
use crate::db::Database;
use crate::services::progress::load_ledger;
use crate::services::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct TermsView {
    pub terms: Vec<LearnedTerm>,
    pub terms_by_date: BTreeMap<String, Vec<LearnedTerm>>,
    pub total_terms: usize,
    pub learned_dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TermsView {
    fn from_aggregate(aggregate: TermAggregate, empty_message: &str) -> Self {
        let message = aggregate.is_empty().then(|| empty_message.to_string());
        Self {
            total_terms: aggregate.total_terms(),
            terms: aggregate.terms,
            terms_by_date: aggregate.terms_by_date,
            learned_dates: aggregate.learned_dates,
            message,
        }
    }
}

/// Loads the cards for every date the ledger touches.
async fn cards_for(db: &Database, ledger: &Ledger) -> Result<BTreeMap<String, Card>, ServiceError> {
    let mut loaded = BTreeMap::new();
    for date in ledger.active_dates() {
        if let Some(card) = cards::find_card(db, &date).await? {
            loaded.insert(date, card);
        }
    }
    Ok(loaded)
}

pub async fn learned_terms(
    db: &Database,
    session_id: &str,
    language: Language,
) -> Result<TermsView, ServiceError> {
    let ledger = load_ledger(db, session_id).await?;
    if ledger.is_empty() {
        return Ok(TermsView::from_aggregate(
            TermAggregate::default(),
            "no learning progress recorded for this session",
        ));
    }

    let cards = cards_for(db, &ledger).await?;
    let aggregate = terms::aggregate(&ledger, &cards, language);
    Ok(TermsView::from_aggregate(aggregate, "no learned terms yet"))
}

/// Terms of every populated slot of every card.
pub async fn all_terms(db: &Database, language: Language) -> Result<TermsView, ServiceError> {
    let all = cards::list_cards(db).await?;
    let ledger = Ledger::covering(all.iter());
    let aggregate = terms::aggregate(&ledger, all.as_slice(), language);
    Ok(TermsView::from_aggregate(aggregate, "no terms registered"))
}

pub async fn quiz_for_session(
    db: &Database,
    session_id: &str,
    language_code: &str,
    count: usize,
) -> Result<QuizSet, ServiceError> {
    let language = Language::parse(language_code).unwrap_or_default();

    let ledger = load_ledger(db, session_id).await?;
    if ledger.is_empty() {
        return Ok(QuizSet::empty("no learning progress recorded for this session"));
    }

    let cards = cards_for(db, &ledger).await?;
    let pool = terms::aggregate(&ledger, &cards, language).quiz_pool();
    if pool.is_empty() {
        return Ok(QuizSet::empty("no learned terms yet"));
    }

    Ok(quiz::synthesize(pool, count, QuizTemplate::for_code(language_code)))
}

pub async fn quiz_for_date(
    db: &Database,
    date: &str,
    language_code: &str,
    count: usize,
) -> Result<QuizSet, ServiceError> {
    let language = Language::parse(language_code).unwrap_or_default();

    let Some(card) = cards::find_card(db, date).await? else {
        return Ok(QuizSet::empty(format!("no AI info for {date}")));
    };

    let pool = terms::date_term_pool(&card, language);
    if pool.is_empty() {
        return Ok(QuizSet::empty(format!("no terms registered for {date}")));
    }

    Ok(quiz::synthesize(pool, count, QuizTemplate::for_code(language_code)))
}
