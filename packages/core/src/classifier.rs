//! Rule-based keyword classifier.
//!
//! Text is matched against fixed keyword tables by case-insensitive substring
//! search. The category with the most matching keywords wins; ties go to the
//! category listed first.

use serde::{Deserialize, Serialize};

/// Label used when no category keyword matches.
pub const UNCATEGORIZED: &str = "기타";

/// Confidence reported for [`UNCATEGORIZED`].
pub const UNCATEGORIZED_CONFIDENCE: f64 = 0.1;

/// Maximum number of entries returned by [`Classifier::suggest`].
pub const MAX_SUGGESTIONS: usize = 3;

/// Built-in category tables in enumeration order.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "챗봇/대화형 AI",
        &[
            "chatgpt", "gpt", "claude", "bard", "llama", "대화", "챗봇", "conversation",
            "dialogue", "language model", "언어 모델", "자연어", "nlp", "conversational",
            "chat", "talk", "discuss", "question", "answer", "응답", "질문",
        ],
    ),
    (
        "이미지 생성 AI",
        &[
            "dall-e", "midjourney", "stable diffusion", "이미지", "그림", "사진", "생성",
            "image generation", "image creation", "art", "artwork", "visual", "그래픽",
            "디자인", "drawing", "painting", "illustration", "photo", "picture",
        ],
    ),
    (
        "코딩/개발 도구",
        &[
            "github copilot", "copilot", "code", "코딩", "프로그래밍", "개발", "software",
            "programming", "developer", "coder", "script", "algorithm", "function",
            "debug", "testing", "deployment", "git", "repository", "코드", "알고리즘",
        ],
    ),
    (
        "음성/오디오 AI",
        &[
            "stt", "tts", "음성 인식", "음성 합성", "speech", "voice", "audio", "오디오",
            "음성", "말", "발음", "녹음", "재생", "speech recognition", "text to speech",
            "voice generation", "음성 변환", "음성 분석",
        ],
    ),
    (
        "데이터 분석/ML",
        &[
            "machine learning", "ml", "데이터 분석", "data analysis", "statistics", "통계",
            "prediction", "예측", "classification", "분류", "clustering", "군집화",
            "regression", "회귀", "neural network", "신경망", "deep learning", "딥러닝",
        ],
    ),
    (
        "AI 윤리/정책",
        &[
            "ai ethics", "ai 윤리", "bias", "편향", "fairness", "공정성", "transparency",
            "투명성", "accountability", "책임", "privacy", "개인정보", "security", "보안",
            "regulation", "규제", "policy", "정책", "responsible ai", "책임있는 ai",
        ],
    ),
    (
        "AI 하드웨어/인프라",
        &[
            "gpu", "tpu", "npu", "하드웨어", "hardware", "infrastructure", "인프라",
            "computing", "연산", "processing", "처리", "server", "서버", "cloud", "클라우드",
            "edge", "엣지", "quantum", "양자", "chip", "칩", "processor", "프로세서",
        ],
    ),
    (
        "AI 응용 서비스",
        &[
            "recommendation", "추천", "search", "검색", "translation", "번역", "translation",
            "summarization", "요약", "sentiment analysis", "감정 분석", "content creation",
            "콘텐츠 생성", "automation", "자동화", "optimization", "최적화",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    /// Always `None`; kept so API consumers see a stable shape.
    pub subcategory: Option<String>,
    pub confidence: f64,
}

impl Classification {
    pub fn uncategorized() -> Self {
        Self {
            category: UNCATEGORIZED.to_string(),
            subcategory: None,
            confidence: UNCATEGORIZED_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySuggestion {
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
struct CategoryRule {
    name: String,
    keywords: Vec<String>,
}

impl CategoryRule {
    fn matches(&self, lowered_text: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lowered_text.contains(keyword.as_str()))
            .count()
    }

    fn coverage(&self, matches: usize) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }
        (matches as f64 / self.keywords.len() as f64).min(1.0)
    }
}

/// Immutable keyword configuration. Build once and share.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    /// Builds a classifier from `(category, keywords)` pairs. Order defines the
    /// tie-break; keywords are lowercased once here.
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let rules = table
            .iter()
            .map(|(name, keywords)| CategoryRule {
                name: (*name).to_string(),
                keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn categories(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name.as_str()).collect()
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == category)
    }

    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.rules
            .iter()
            .find(|rule| rule.name == category)
            .map(|rule| rule.keywords.as_slice())
    }

    pub fn classify(&self, title: &str, content: &str) -> Classification {
        let text = format!("{title} {content}").to_lowercase();

        let mut best: Option<(&CategoryRule, usize)> = None;
        for rule in &self.rules {
            let matches = rule.matches(&text);
            if matches == 0 {
                continue;
            }
            // strict comparison keeps the earliest category on ties
            if best.map_or(true, |(_, top)| matches > top) {
                best = Some((rule, matches));
            }
        }

        match best {
            Some((rule, matches)) => Classification {
                category: rule.name.clone(),
                subcategory: None,
                confidence: rule.coverage(matches),
            },
            None => Classification::uncategorized(),
        }
    }

    /// Up to [`MAX_SUGGESTIONS`] categories with a non-zero match, ordered by
    /// coverage, highest first.
    pub fn suggest(&self, text: &str) -> Vec<CategorySuggestion> {
        let text = text.to_lowercase();

        let mut suggestions: Vec<CategorySuggestion> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let matches = rule.matches(&text);
                (matches > 0).then(|| CategorySuggestion {
                    category: rule.name.clone(),
                    confidence: rule.coverage(matches),
                })
            })
            .collect();

        suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_table(DEFAULT_CATEGORIES)
    }
}
