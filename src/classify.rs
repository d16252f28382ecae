//! Keyword rules that decide what kind of homework help a title asks for.
//!
//! Every rule table is matched against the case-folded title and walked in
//! the order it is declared, so the first entry wins when several match.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Explain an English topic in Turkish.
    Explain,
    /// Write a piece of English text.
    Produce,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Essay,
    Letter,
    Story,
    Paragraph,
    Dialogue,
    Report,
    Review,
    Speech,
    Description,
    General,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Essay => "essay",
            ContentType::Letter => "letter",
            ContentType::Story => "story",
            ContentType::Paragraph => "paragraph",
            ContentType::Dialogue => "dialogue",
            ContentType::Report => "report",
            ContentType::Review => "review",
            ContentType::Speech => "speech",
            ContentType::Description => "description",
            ContentType::General => "general writing",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn turkish_label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "başlangıç",
            Difficulty::Intermediate => "orta",
            Difficulty::Advanced => "ileri",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub content_type: ContentType,
    pub difficulty: Difficulty,
    pub word_count: Option<u32>,
}

pub const EXPLAIN_KEYWORDS: &[&str] = &[
    "açıkla", "explain", "nasıl", "nedir", "anlat", "anlatır", "örnekle",
];

pub const CONTENT_TYPE_RULES: &[(ContentType, &[&str])] = &[
    (ContentType::Essay, &["essay", "makale", "deneme"]),
    (ContentType::Letter, &["letter", "mektup", "email"]),
    (ContentType::Story, &["story", "hikaye", "öykü"]),
    (ContentType::Paragraph, &["paragraph", "paragraf", "fıkra"]),
    (
        ContentType::Dialogue,
        &["dialogue", "conversation", "diyalog"],
    ),
    (ContentType::Report, &["report", "rapor"]),
    (
        ContentType::Review,
        &["review", "değerlendirme", "eleştiri"],
    ),
    (ContentType::Speech, &["speech", "konuşma", "sunum"]),
    (
        ContentType::Description,
        &["description", "tanımlama", "betimleme"],
    ),
];

// Beginner is checked first and wins when a title mentions both levels.
pub const DIFFICULTY_RULES: &[(Difficulty, &[&str])] = &[
    (
        Difficulty::Beginner,
        &["beginner", "başlangıç", "temel", "basic", "simple", "easy"],
    ),
    (
        Difficulty::Advanced,
        &["advanced", "ileri", "üst", "difficult", "complex", "zor"],
    ),
];

static WORD_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s*(?:kelime|word|sözcük)").unwrap());

pub fn classify(title: &str) -> Classification {
    let folded = fold_case(title);

    Classification {
        intent: detect_intent(&folded),
        content_type: detect_content_type(&folded),
        difficulty: detect_difficulty(&folded),
        word_count: extract_word_count(title),
    }
}

/// Lower-cases `text` so Turkish and English spellings of `I` compare equal:
/// `ı` becomes `i` and the combining dot left behind by `İ` is dropped.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// `haystack` must already be folded with [`fold_case`].
pub(crate) fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystack.contains(fold_case(keyword).as_str()))
}

fn first_match<T: Copy>(haystack: &str, rules: &[(T, &[&str])]) -> Option<T> {
    rules
        .iter()
        .find(|(_, keywords)| contains_any(haystack, keywords))
        .map(|(tag, _)| *tag)
}

fn detect_intent(lower: &str) -> Intent {
    if contains_any(lower, EXPLAIN_KEYWORDS) {
        Intent::Explain
    } else {
        Intent::Produce
    }
}

fn detect_content_type(lower: &str) -> ContentType {
    first_match(lower, CONTENT_TYPE_RULES).unwrap_or(ContentType::General)
}

fn detect_difficulty(lower: &str) -> Difficulty {
    first_match(lower, DIFFICULTY_RULES).unwrap_or(Difficulty::Intermediate)
}

/// Digits directly followed by a unit word, e.g. `250 words` or `150kelime`.
/// Counts that overflow `u32` are ignored. Zero counts as no count at all.
pub fn extract_word_count(title: &str) -> Option<u32> {
    WORD_COUNT_RE
        .captures(&fold_case(title))
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .filter(|count| *count > 0)
}
