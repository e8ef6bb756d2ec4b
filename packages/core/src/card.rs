//! Dated cards and their slots.
//!
//! A [`Card`] owns exactly [`SLOT_COUNT`] slots. Each [`Slot`] carries one
//! [`Localization`] per [`Language`] plus a category shared by all languages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::language::Language;

/// Number of slots a card owns.
pub const SLOT_COUNT: usize = 3;

/// A glossary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub description: String,
}

impl Term {
    pub fn new(term: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            description: description.into(),
        }
    }
}

/// Decodes a stored term list.
///
/// Invalid JSON yields an empty list; array entries that are not term objects
/// are dropped individually.
pub fn decode_terms(raw: &str) -> Vec<Term> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Value>>(trimmed) {
        Ok(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Term>(value).ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn encode_terms(terms: &[Term]) -> String {
    serde_json::to_string(terms).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl Localization {
    pub fn new(title: impl Into<String>, content: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            terms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty() && self.terms.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    localizations: [Localization; 4],
    #[serde(default)]
    pub category: String,
}

impl Slot {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            localizations: Default::default(),
            category: category.into(),
        }
    }

    pub fn with_localization(mut self, language: Language, localization: Localization) -> Self {
        self.localizations[language.index()] = localization;
        self
    }

    pub fn localization(&self, language: Language) -> &Localization {
        &self.localizations[language.index()]
    }

    pub fn localization_mut(&mut self, language: Language) -> &mut Localization {
        &mut self.localizations[language.index()]
    }

    /// A slot counts only when its Korean title and content are both present.
    pub fn is_populated(&self) -> bool {
        let primary = self.localization(Language::PRIMARY);
        !primary.title.is_empty() && !primary.content.is_empty()
    }

    /// Title in `language`, falling back to Korean when missing.
    pub fn title(&self, language: Language) -> &str {
        let own = &self.localization(language).title;
        if own.is_empty() {
            &self.localization(Language::PRIMARY).title
        } else {
            own
        }
    }

    /// Content in `language`, falling back to Korean when missing.
    pub fn content(&self, language: Language) -> &str {
        let own = &self.localization(language).content;
        if own.is_empty() {
            &self.localization(Language::PRIMARY).content
        } else {
            own
        }
    }

    /// Terms in `language`. Terms never fall back to another language.
    pub fn terms(&self, language: Language) -> &[Term] {
        &self.localization(language).terms
    }

    pub fn clear(&mut self) {
        *self = Slot::default();
    }

    pub fn localizations(&self) -> impl Iterator<Item = (Language, &Localization)> {
        Language::ALL
            .into_iter()
            .map(move |language| (language, self.localization(language)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub date: String,
    pub slots: [Slot; SLOT_COUNT],
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Card {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            slots: Default::default(),
            created_at: None,
        }
    }

    /// Builds a card by placing payloads into slots by position. Extra payloads
    /// beyond [`SLOT_COUNT`] are ignored.
    pub fn from_slots(date: impl Into<String>, slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut card = Card::new(date);
        for (target, slot) in card.slots.iter_mut().zip(slots) {
            *target = slot;
        }
        card
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }

    /// Fills unpopulated slots in index order with the given slots, skipping
    /// candidates that are not populated themselves. Returns the indices that
    /// were written.
    pub fn fill_empty_slots(&mut self, candidates: impl IntoIterator<Item = Slot>) -> Vec<usize> {
        let mut queue = candidates.into_iter().filter(Slot::is_populated);
        let mut filled = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_populated() {
                continue;
            }
            match queue.next() {
                Some(candidate) => {
                    *slot = candidate;
                    filled.push(index);
                }
                None => break,
            }
        }

        filled
    }

    /// Clears one slot in every language. Returns `false` when `index` is out
    /// of range.
    pub fn clear_slot(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.clear();
                true
            }
            None => false,
        }
    }

    pub fn has_populated_slot(&self) -> bool {
        self.slots.iter().any(Slot::is_populated)
    }

    /// Populated slots with their indices.
    pub fn populated_slots(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_populated())
    }
}
