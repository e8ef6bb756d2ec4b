//! Glossary term aggregation across cards.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::card::{Card, Term};
use crate::language::Language;
use crate::progress::{Ledger, SlotRef};

/// Read access to stored cards by date.
pub trait CardLookup {
    fn card(&self, date: &str) -> Option<&Card>;
}

impl CardLookup for HashMap<String, Card> {
    fn card(&self, date: &str) -> Option<&Card> {
        self.get(date)
    }
}

impl CardLookup for BTreeMap<String, Card> {
    fn card(&self, date: &str) -> Option<&Card> {
        self.get(date)
    }
}

impl CardLookup for [Card] {
    fn card(&self, date: &str) -> Option<&Card> {
        self.iter().find(|card| card.date == date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearnedTerm {
    pub term: String,
    pub description: String,
    pub learned_date: String,
    pub info_index: usize,
}

impl LearnedTerm {
    fn tagged(term: &Term, slot_ref: &SlotRef) -> Self {
        Self {
            term: term.term.clone(),
            description: term.description.clone(),
            learned_date: slot_ref.date.clone(),
            info_index: slot_ref.slot,
        }
    }

    pub fn to_term(&self) -> Term {
        Term::new(self.term.clone(), self.description.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TermAggregate {
    /// Unique by `(term, learned_date, info_index)`.
    pub terms: Vec<LearnedTerm>,
    /// Unique by term text within each date.
    pub terms_by_date: BTreeMap<String, Vec<LearnedTerm>>,
    /// Newest first.
    pub learned_dates: Vec<String>,
}

impl TermAggregate {
    pub fn total_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Flat list reduced to one entry per term text, for quiz pools.
    pub fn quiz_pool(&self) -> Vec<Term> {
        unique_by_term(self.terms.iter().map(LearnedTerm::to_term))
    }
}

/// Collects the terms a ledger covers, in `language` only.
///
/// Completed slots contribute all their terms; individually learned term sets
/// contribute only the listed terms. Slots whose card no longer exists are
/// ignored.
pub fn aggregate<L>(ledger: &Ledger, cards: &L, language: Language) -> TermAggregate
where
    L: CardLookup + ?Sized,
{
    let mut collected: Vec<LearnedTerm> = Vec::new();
    let mut dates: BTreeSet<String> = BTreeSet::new();

    for slot_ref in &ledger.completed {
        let Some(card) = cards.card(&slot_ref.date) else {
            continue;
        };
        dates.insert(slot_ref.date.clone());
        if let Some(slot) = card.slot(slot_ref.slot) {
            collected.extend(
                slot.terms(language)
                    .iter()
                    .map(|term| LearnedTerm::tagged(term, slot_ref)),
            );
        }
    }

    for (slot_ref, learned) in &ledger.learned_terms {
        let Some(card) = cards.card(&slot_ref.date) else {
            continue;
        };
        dates.insert(slot_ref.date.clone());
        if let Some(slot) = card.slot(slot_ref.slot) {
            collected.extend(
                slot.terms(language)
                    .iter()
                    .filter(|term| learned.contains(&term.term))
                    .map(|term| LearnedTerm::tagged(term, slot_ref)),
            );
        }
    }

    let mut seen: HashSet<(String, String, usize)> = HashSet::new();
    let terms: Vec<LearnedTerm> = collected
        .into_iter()
        .filter(|term| {
            seen.insert((
                term.term.clone(),
                term.learned_date.clone(),
                term.info_index,
            ))
        })
        .collect();

    let mut terms_by_date: BTreeMap<String, Vec<LearnedTerm>> = BTreeMap::new();
    for term in &terms {
        let bucket = terms_by_date.entry(term.learned_date.clone()).or_default();
        if !bucket.iter().any(|existing| existing.term == term.term) {
            bucket.push(term.clone());
        }
    }

    TermAggregate {
        terms,
        terms_by_date,
        learned_dates: dates.into_iter().rev().collect(),
    }
}

/// Keeps the first occurrence of each term text and drops empty terms.
pub fn unique_by_term(terms: impl IntoIterator<Item = Term>) -> Vec<Term> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .filter(|term| !term.term.is_empty() && seen.insert(term.term.clone()))
        .collect()
}

/// Every term of every slot of one card, in `language`, unique by term text.
pub fn date_term_pool(card: &Card, language: Language) -> Vec<Term> {
    unique_by_term(
        card.slots
            .iter()
            .flat_map(|slot| slot.terms(language).iter().cloned()),
    )
}
