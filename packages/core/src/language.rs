//! Content languages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages a card can be localized into. Korean is the primary language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
    Ja,
    Zh,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Ko, Language::En, Language::Ja, Language::Zh];

    pub const PRIMARY: Language = Language::Ko;

    pub fn code(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::Ja => "ja",
            Language::Zh => "zh",
        }
    }

    /// Parses a language code, case-insensitively. Unknown codes yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ko" => Some(Language::Ko),
            "en" => Some(Language::En),
            "ja" => Some(Language::Ja),
            "zh" => Some(Language::Zh),
            _ => None,
        }
    }

    /// Position of this language inside per-language arrays.
    pub fn index(self) -> usize {
        match self {
            Language::Ko => 0,
            Language::En => 1,
            Language::Ja => 2,
            Language::Zh => 3,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::PRIMARY
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
