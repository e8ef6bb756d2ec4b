//! Multiple-choice quiz synthesis from glossary terms.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::card::Term;
use crate::language::Language;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const OPTION_COUNT: usize = 4;
const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    /// 1-based position of the term in the shuffled selection.
    pub id: usize,
    pub term: String,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    /// Index into `options` of the correct description.
    pub correct: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizSet {
    pub quizzes: Vec<QuizQuestion>,
    pub total_terms: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QuizSet {
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            quizzes: Vec::new(),
            total_terms: 0,
            message: Some(message.into()),
        }
    }
}

/// Localized question and explanation wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizTemplate {
    Korean,
    English,
    Japanese,
    Chinese,
}

impl QuizTemplate {
    /// Unknown language codes use English wording.
    pub fn for_code(code: &str) -> Self {
        match Language::parse(code) {
            Some(language) => Self::for_language(language),
            None => QuizTemplate::English,
        }
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Ko => QuizTemplate::Korean,
            Language::En => QuizTemplate::English,
            Language::Ja => QuizTemplate::Japanese,
            Language::Zh => QuizTemplate::Chinese,
        }
    }

    pub fn question(self, term: &str) -> String {
        match self {
            QuizTemplate::Korean => format!("'{term}'의 올바른 뜻은?"),
            QuizTemplate::English => format!("What is the correct meaning of '{term}'?"),
            QuizTemplate::Japanese => format!("「{term}」の正しい意味は？"),
            QuizTemplate::Chinese => format!("'{term}'的正确含义是什么？"),
        }
    }

    pub fn explanation(self, term: &str, description: &str) -> String {
        match self {
            QuizTemplate::Korean => format!("'{term}'는 '{description}'을 의미합니다."),
            QuizTemplate::English => format!("'{term}' means '{description}'."),
            QuizTemplate::Japanese => format!("「{term}」は「{description}」を意味します。"),
            QuizTemplate::Chinese => format!("'{term}'的意思是'{description}'。"),
        }
    }
}

/// Builds up to `count` questions from `pool` using the thread-local RNG.
pub fn synthesize(pool: Vec<Term>, count: usize, template: QuizTemplate) -> QuizSet {
    synthesize_with_rng(pool, count, template, &mut rand::rng())
}

/// Builds up to `count` questions from `pool`.
///
/// Entries with an empty term are dropped first. A selected term needs at
/// least three other entries with distinct descriptions, all different from
/// its own; terms without enough distractors are skipped.
pub fn synthesize_with_rng<R>(
    pool: Vec<Term>,
    count: usize,
    template: QuizTemplate,
    rng: &mut R,
) -> QuizSet
where
    R: Rng + ?Sized,
{
    let mut pool: Vec<Term> = pool.into_iter().filter(|t| !t.term.is_empty()).collect();
    if pool.is_empty() {
        return QuizSet::empty("no terms available to build a quiz");
    }

    pool.shuffle(rng);
    let total_terms = pool.len();

    let mut quizzes = Vec::new();
    for (position, term) in pool.iter().take(count).enumerate() {
        let mut distractors: Vec<&str> = Vec::new();
        for (other_position, other) in pool.iter().enumerate() {
            if other_position == position
                || other.description == term.description
                || distractors.contains(&other.description.as_str())
            {
                continue;
            }
            distractors.push(other.description.as_str());
        }

        if distractors.len() < DISTRACTOR_COUNT {
            continue;
        }

        let mut options: Vec<String> = distractors
            .choose_multiple(rng, DISTRACTOR_COUNT)
            .map(|description| description.to_string())
            .collect();
        options.push(term.description.clone());
        options.shuffle(rng);

        let Some(correct) = options.iter().position(|o| *o == term.description) else {
            continue;
        };
        let Ok(options) = <[String; OPTION_COUNT]>::try_from(options) else {
            continue;
        };

        quizzes.push(QuizQuestion {
            id: position + 1,
            term: term.term.clone(),
            question: template.question(&term.term),
            options,
            correct,
            explanation: template.explanation(&term.term, &term.description),
        });
    }

    QuizSet {
        quizzes,
        total_terms,
        message: None,
    }
}
