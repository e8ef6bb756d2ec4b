//! Per-session progress records.
//!
//! Stored records share one string key column with three meanings:
//!
//! - `__stats__` holds aggregate counters
//! - `__terms__{date}_{slot}` holds the terms learned individually in one slot
//! - any other value is a date whose record lists fully learned slot indices
//!
//! Keys are parsed once into [`ProgressKey`] and never re-inspected as strings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::{Card, SLOT_COUNT};

pub const STATS_KEY: &str = "__stats__";
pub const TERMS_KEY_PREFIX: &str = "__terms__";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgressKey {
    Stats,
    SlotCompletion { date: String },
    TermCompletion { date: String, slot: usize },
}

impl ProgressKey {
    /// Returns `None` for a terms key whose slot suffix is not a number.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == STATS_KEY {
            return Some(ProgressKey::Stats);
        }

        if let Some(rest) = raw.strip_prefix(TERMS_KEY_PREFIX) {
            let (date, slot) = rest.rsplit_once('_')?;
            let slot = slot.parse::<usize>().ok()?;
            if date.is_empty() {
                return None;
            }
            return Some(ProgressKey::TermCompletion {
                date: date.to_string(),
                slot,
            });
        }

        Some(ProgressKey::SlotCompletion {
            date: raw.to_string(),
        })
    }

    pub fn storage_key(&self) -> String {
        match self {
            ProgressKey::Stats => STATS_KEY.to_string(),
            ProgressKey::SlotCompletion { date } => date.clone(),
            ProgressKey::TermCompletion { date, slot } => {
                format!("{TERMS_KEY_PREFIX}{date}_{slot}")
            }
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// One slot of one card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub date: String,
    pub slot: usize,
}

impl SlotRef {
    pub fn new(date: impl Into<String>, slot: usize) -> Self {
        Self {
            date: date.into(),
            slot,
        }
    }
}

/// Decodes a stored list of slot indices. Non-integer entries and indices
/// outside `0..SLOT_COUNT` are dropped; invalid JSON yields `None`.
pub fn decode_slot_indices(raw: &str) -> Option<BTreeSet<usize>> {
    let values: Vec<Value> = serde_json::from_str(raw.trim()).ok()?;
    Some(
        values
            .iter()
            .filter_map(Value::as_u64)
            .filter_map(|index| usize::try_from(index).ok())
            .filter(|index| *index < SLOT_COUNT)
            .collect(),
    )
}

pub fn encode_slot_indices(indices: &BTreeSet<usize>) -> String {
    serde_json::to_string(indices).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a stored list of learned term strings; invalid JSON yields `None`.
pub fn decode_term_set(raw: &str) -> Option<BTreeSet<String>> {
    let values: Vec<Value> = serde_json::from_str(raw.trim()).ok()?;
    Some(
        values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(term) => Some(term),
                _ => None,
            })
            .collect(),
    )
}

pub fn encode_term_set(terms: &BTreeSet<String>) -> String {
    serde_json::to_string(terms).unwrap_or_else(|_| "[]".to_string())
}

/// What a session has learned, read from its stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub completed: BTreeSet<SlotRef>,
    pub learned_terms: BTreeMap<SlotRef, BTreeSet<String>>,
}

impl Ledger {
    /// Reads `(key, learned_info)` pairs. Malformed records are skipped.
    pub fn from_records<'a>(records: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut ledger = Ledger::default();

        for (raw_key, learned_info) in records {
            match ProgressKey::parse(raw_key) {
                None | Some(ProgressKey::Stats) => {}
                Some(ProgressKey::SlotCompletion { date }) => {
                    let Some(indices) = decode_slot_indices(learned_info) else {
                        continue;
                    };
                    for slot in indices {
                        ledger.completed.insert(SlotRef::new(date.clone(), slot));
                    }
                }
                Some(ProgressKey::TermCompletion { date, slot }) => {
                    if slot >= SLOT_COUNT {
                        continue;
                    }
                    let Some(terms) = decode_term_set(learned_info) else {
                        continue;
                    };
                    if terms.is_empty() {
                        continue;
                    }
                    ledger
                        .learned_terms
                        .entry(SlotRef::new(date, slot))
                        .or_default()
                        .extend(terms);
                }
            }
        }

        ledger
    }

    /// A ledger in which every populated slot of `cards` is complete.
    pub fn covering<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut ledger = Ledger::default();
        for card in cards {
            for (index, _) in card.populated_slots() {
                ledger.completed.insert(SlotRef::new(card.date.clone(), index));
            }
        }
        ledger
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.learned_terms.is_empty()
    }

    pub fn is_completed(&self, date: &str, slot: usize) -> bool {
        self.completed.contains(&SlotRef::new(date, slot))
    }

    pub fn terms_for(&self, date: &str, slot: usize) -> Option<&BTreeSet<String>> {
        self.learned_terms.get(&SlotRef::new(date, slot))
    }

    /// Completed slot indices grouped by date.
    pub fn completed_by_date(&self) -> BTreeMap<String, Vec<usize>> {
        let mut grouped: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for slot_ref in &self.completed {
            grouped
                .entry(slot_ref.date.clone())
                .or_default()
                .push(slot_ref.slot);
        }
        grouped
    }

    /// Every date with either a completed slot or an individually learned term.
    pub fn active_dates(&self) -> BTreeSet<String> {
        self.completed
            .iter()
            .chain(self.learned_terms.keys())
            .map(|slot_ref| slot_ref.date.clone())
            .collect()
    }

    pub fn individually_learned_term_count(&self) -> usize {
        self.learned_terms.values().map(BTreeSet::len).sum()
    }
}
