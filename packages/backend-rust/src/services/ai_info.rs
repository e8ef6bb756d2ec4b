use std::collections::BTreeMap;

use ai_info_core::classifier::CategorySuggestion;
use ai_info_core::{
    Card, Classification, Classifier, Language, Localization, Slot, Term, SLOT_COUNT,
    UNCATEGORIZED,
};
use serde::{Deserialize, Serialize};

use crate::db::operations::cards;
use crate::db::Database;
use crate::services::{parse_slot_index, validate_date, ServiceError};

/// Legacy estimate of glossary terms per card.
pub const ESTIMATED_TERMS_PER_CARD: i64 = 20;

/// One slot as sent by clients and echoed back in card views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotPayload {
    #[serde(default, alias = "title")]
    pub title_ko: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub title_ja: String,
    #[serde(default)]
    pub title_zh: String,
    #[serde(default, alias = "content")]
    pub content_ko: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default)]
    pub content_ja: String,
    #[serde(default)]
    pub content_zh: String,
    #[serde(default, alias = "terms")]
    pub terms_ko: Option<Vec<Term>>,
    #[serde(default)]
    pub terms_en: Option<Vec<Term>>,
    #[serde(default)]
    pub terms_ja: Option<Vec<Term>>,
    #[serde(default)]
    pub terms_zh: Option<Vec<Term>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SlotPayload {
    pub fn into_slot(self) -> Slot {
        let category = self.category.unwrap_or_default().trim().to_string();
        Slot::new(category)
            .with_localization(
                Language::Ko,
                Localization::new(
                    self.title_ko,
                    self.content_ko,
                    self.terms_ko.unwrap_or_default(),
                ),
            )
            .with_localization(
                Language::En,
                Localization::new(
                    self.title_en,
                    self.content_en,
                    self.terms_en.unwrap_or_default(),
                ),
            )
            .with_localization(
                Language::Ja,
                Localization::new(
                    self.title_ja,
                    self.content_ja,
                    self.terms_ja.unwrap_or_default(),
                ),
            )
            .with_localization(
                Language::Zh,
                Localization::new(
                    self.title_zh,
                    self.content_zh,
                    self.terms_zh.unwrap_or_default(),
                ),
            )
    }

    pub fn from_slot(slot: &Slot) -> Self {
        let ko = slot.localization(Language::Ko);
        let en = slot.localization(Language::En);
        let ja = slot.localization(Language::Ja);
        let zh = slot.localization(Language::Zh);
        Self {
            title_ko: ko.title.clone(),
            title_en: en.title.clone(),
            title_ja: ja.title.clone(),
            title_zh: zh.title.clone(),
            content_ko: ko.content.clone(),
            content_en: en.content.clone(),
            content_ja: ja.content.clone(),
            content_zh: zh.content.clone(),
            terms_ko: Some(ko.terms.clone()),
            terms_en: Some(en.terms.clone()),
            terms_ja: Some(ja.terms.clone()),
            terms_zh: Some(zh.terms.clone()),
            category: (!slot.category.is_empty()).then(|| slot.category.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertRequest {
    pub date: String,
    #[serde(default)]
    pub infos: Vec<SlotPayload>,
}

/// A populated slot rendered in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub id: String,
    pub date: String,
    pub info_index: usize,
    pub title: String,
    pub content: String,
    pub terms: Vec<Term>,
    pub category: String,
    pub subcategory: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardSlotView {
    pub info_index: usize,
    #[serde(flatten)]
    pub payload: SlotPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub date: String,
    pub infos: Vec<CardSlotView>,
    pub created_at: Option<String>,
}

impl CardView {
    fn from_card(card: &Card) -> Self {
        Self {
            date: card.date.clone(),
            infos: card
                .populated_slots()
                .map(|(info_index, slot)| CardSlotView {
                    info_index,
                    payload: SlotPayload::from_slot(slot),
                })
                .collect(),
            created_at: card.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotDeletion {
    pub date: String,
    pub info_index: usize,
    pub card_deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermsTotals {
    pub total_terms: usize,
    pub estimated_total_terms: i64,
    pub total_days: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStat {
    pub count: usize,
    /// Newest first.
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResult {
    #[serde(flatten)]
    pub classification: Classification,
    pub suggestions: Vec<CategorySuggestion>,
}

/// Stored category wins with full confidence; otherwise the Korean text is
/// classified on the spot.
pub fn resolve_category(classifier: &Classifier, slot: &Slot) -> Classification {
    let stored = slot.category.trim();
    if !stored.is_empty() {
        return Classification {
            category: stored.to_string(),
            subcategory: None,
            confidence: 1.0,
        };
    }

    let primary = slot.localization(Language::PRIMARY);
    classifier.classify(&primary.title, &primary.content)
}

pub fn slot_view(
    classifier: &Classifier,
    card: &Card,
    info_index: usize,
    slot: &Slot,
    language: Language,
) -> SlotView {
    let classification = resolve_category(classifier, slot);
    SlotView {
        id: format!("{}_{}", card.date, info_index),
        date: card.date.clone(),
        info_index,
        title: slot.title(language).to_string(),
        content: slot.content(language).to_string(),
        terms: slot.terms(language).to_vec(),
        category: classification.category,
        subcategory: classification.subcategory,
        confidence: classification.confidence,
        created_at: card.created_at.clone(),
    }
}

fn card_views(classifier: &Classifier, card: &Card, language: Language) -> Vec<SlotView> {
    card.populated_slots()
        .map(|(index, slot)| slot_view(classifier, card, index, slot, language))
        .collect()
}

pub async fn get_by_date(
    db: &Database,
    classifier: &Classifier,
    date: &str,
    language: Language,
) -> Result<Vec<SlotView>, ServiceError> {
    let card = cards::find_card(db, date).await?;
    Ok(card
        .map(|card| card_views(classifier, &card, language))
        .unwrap_or_default())
}

/// Creates the card for `request.date`, or fills the empty slots of the
/// existing card in index order.
///
/// Read-modify-write without locking: two concurrent upserts for one date
/// both read the same empty slots and the later commit wins.
pub async fn upsert(db: &Database, request: UpsertRequest) -> Result<CardView, ServiceError> {
    validate_date(&request.date)?;
    if request.infos.len() > SLOT_COUNT {
        return Err(ServiceError::Validation(format!(
            "too many items: {} given, at most {SLOT_COUNT} allowed",
            request.infos.len()
        )));
    }

    let slots: Vec<Slot> = request.infos.into_iter().map(SlotPayload::into_slot).collect();

    let card = match cards::find_card(db, &request.date).await? {
        Some(mut card) => {
            let filled = card.fill_empty_slots(slots);
            if filled.is_empty() {
                tracing::debug!(date = %card.date, "upsert filled no slots");
                return Ok(CardView::from_card(&card));
            }
            tracing::info!(date = %card.date, slots = ?filled, "filled empty slots");
            card
        }
        None => {
            let card = Card::from_slots(request.date.clone(), slots);
            if !card.has_populated_slot() {
                return Err(ServiceError::Validation(
                    "at least one item needs a Korean title and content".to_string(),
                ));
            }
            tracing::info!(date = %card.date, "creating card");
            card
        }
    };

    cards::save_card(db, &card).await?;

    let stored = cards::find_card(db, &card.date).await?.unwrap_or(card);
    Ok(CardView::from_card(&stored))
}

pub async fn delete_card(db: &Database, date: &str) -> Result<(), ServiceError> {
    if cards::delete_card(db, date).await? {
        tracing::info!(date, "card deleted");
        Ok(())
    } else {
        Err(ServiceError::NotFound("AI info not found".to_string()))
    }
}

/// Clears one slot in every language. The card goes away with its last
/// populated slot.
pub async fn delete_slot(
    db: &Database,
    date: &str,
    raw_index: &str,
) -> Result<SlotDeletion, ServiceError> {
    let index = parse_slot_index(raw_index)?;

    let Some(mut card) = cards::find_card(db, date).await? else {
        return Err(ServiceError::NotFound("AI info not found".to_string()));
    };

    card.clear_slot(index);

    let card_deleted = if card.has_populated_slot() {
        cards::save_card(db, &card).await?;
        false
    } else {
        cards::delete_card(db, date).await?;
        true
    };

    tracing::info!(date, index, card_deleted, "slot deleted");

    Ok(SlotDeletion {
        date: date.to_string(),
        info_index: index,
        card_deleted,
    })
}

pub async fn update_category(
    db: &Database,
    classifier: &Classifier,
    date: &str,
    raw_index: &str,
    category: &str,
) -> Result<SlotView, ServiceError> {
    let index = parse_slot_index(raw_index)?;
    let category = category.trim();
    if category != UNCATEGORIZED && !classifier.is_known_category(category) {
        return Err(ServiceError::Validation(format!("unknown category '{category}'")));
    }

    let Some(mut card) = cards::find_card(db, date).await? else {
        return Err(ServiceError::NotFound("AI info not found".to_string()));
    };
    let populated = card.slot(index).is_some_and(Slot::is_populated);
    if !populated {
        return Err(ServiceError::NotFound(format!("item {index} of {date} is empty")));
    }

    cards::update_slot_category(db, date, index, category).await?;
    if let Some(slot) = card.slot_mut(index) {
        slot.category = category.to_string();
    }

    let slot = &card.slots[index];
    Ok(slot_view(classifier, &card, index, slot, Language::PRIMARY))
}

pub async fn list_dates(db: &Database) -> Result<Vec<String>, ServiceError> {
    Ok(cards::list_dates(db).await?)
}

/// Every populated slot, newest date first.
pub async fn list_all(
    db: &Database,
    classifier: &Classifier,
    language: Language,
) -> Result<Vec<SlotView>, ServiceError> {
    let all = cards::list_cards(db).await?;
    Ok(all
        .iter()
        .rev()
        .flat_map(|card| card_views(classifier, card, language))
        .collect())
}

pub async fn total_days(db: &Database) -> Result<i64, ServiceError> {
    Ok(cards::count_cards(db).await?)
}

pub async fn total_count(db: &Database) -> Result<usize, ServiceError> {
    let all = cards::list_cards(db).await?;
    Ok(all.iter().map(|card| card.populated_slots().count()).sum())
}

/// Distinct glossary terms across every populated slot, next to the legacy
/// per-card estimate.
pub async fn terms_totals(db: &Database, language: Language) -> Result<TermsTotals, ServiceError> {
    let all = cards::list_cards(db).await?;
    let total_days = all.len() as i64;

    let ledger = ai_info_core::Ledger::covering(all.iter());
    let aggregate = ai_info_core::terms::aggregate(&ledger, all.as_slice(), language);

    Ok(TermsTotals {
        total_terms: aggregate.total_terms(),
        estimated_total_terms: total_days * ESTIMATED_TERMS_PER_CARD,
        total_days,
    })
}

pub fn categories(classifier: &Classifier) -> Vec<String> {
    classifier
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Matching slots, newest date first.
pub async fn by_category(
    db: &Database,
    classifier: &Classifier,
    category: &str,
    language: Language,
) -> Result<Vec<SlotView>, ServiceError> {
    let all = cards::list_cards(db).await?;
    Ok(all
        .iter()
        .rev()
        .flat_map(|card| card_views(classifier, card, language))
        .filter(|view| view.category == category)
        .collect())
}

pub async fn category_stats(
    db: &Database,
    classifier: &Classifier,
) -> Result<BTreeMap<String, CategoryStat>, ServiceError> {
    let all = cards::list_cards(db).await?;
    let mut stats: BTreeMap<String, CategoryStat> = BTreeMap::new();

    for card in all.iter().rev() {
        for (_, slot) in card.populated_slots() {
            let category = resolve_category(classifier, slot).category;
            let entry = stats.entry(category).or_default();
            entry.count += 1;
            if !entry.dates.contains(&card.date) {
                entry.dates.push(card.date.clone());
            }
        }
    }

    Ok(stats)
}

pub fn classify_text(classifier: &Classifier, title: &str, content: &str) -> ClassifyResult {
    ClassifyResult {
        classification: classifier.classify(title, content),
        suggestions: classifier.suggest(&format!("{title} {content}")),
    }
}
