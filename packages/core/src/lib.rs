//! # ai-info-core
//!
//! Pure Rust core of the daily AI terminology learner:
//!
//! - **Keyword classifier** - rule-based category tagging of card text
//! - **Term aggregator** - learned glossary terms collected across cards
//! - **Quiz synthesizer** - multiple-choice questions with random distractors
//! - **Progress ledger** - per-session completion records interpreted once
//!
//! ## Modules
//!
//! - [`language`] - supported content languages
//! - [`card`] - dated cards, their three slots and per-language localizations
//! - [`classifier`] - keyword tables and `classify`
//! - [`progress`] - progress record keys and the ledger reader
//! - [`terms`] - learned/all term aggregation
//! - [`quiz`] - quiz question synthesis
//!
//! ## Example
//!
//! ```rust
//! use ai_info_core::classifier::Classifier;
//!
//! let classifier = Classifier::default();
//! let result = classifier.classify("ChatGPT 활용법", "대화형 언어 모델로 질문에 응답합니다");
//! assert_eq!(result.category, "챗봇/대화형 AI");
//! ```

pub mod card;
pub mod classifier;
pub mod language;
pub mod progress;
pub mod quiz;
pub mod terms;

pub use card::{Card, Localization, Slot, Term, SLOT_COUNT};
pub use classifier::{Classification, Classifier, UNCATEGORIZED};
pub use language::Language;
pub use progress::{Ledger, ProgressKey, SlotRef};
pub use quiz::{QuizQuestion, QuizSet};
pub use terms::{CardLookup, LearnedTerm, TermAggregate};
