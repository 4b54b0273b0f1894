/*!
 * Language utilities for the bilingual (Arabic/French) legal domain.
 *
 * Thin helpers over ISO 639-1 codes using the isolang crate. The core only
 * processes Arabic and French; parsing any other code returns `None` so
 * requests can be rejected with a precise error instead of a panic.
 */

use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};

/// A language the core knows how to validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Arabic (ar)
    Arabic,
    /// French (fr)
    French,
}

impl Language {
    /// Parse an ISO 639-1 code, accepting only the supported languages
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "ar" | "ara" => Some(Language::Arabic),
            "fr" | "fra" | "fre" => Some(Language::French),
            _ => None,
        }
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::French => "fr",
        }
    }

    /// English display name via isolang
    pub fn display_name(&self) -> &'static str {
        let iso = match self {
            Language::Arabic => IsoLanguage::Ara,
            Language::French => IsoLanguage::Fra,
        };
        iso.to_name()
    }

    /// The expected dominant script for text in this language
    pub fn expected_script(&self) -> Script {
        match self {
            Language::Arabic => Script::Arabic,
            Language::French => Script::Latin,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Writing scripts relevant to contamination detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Arabic script block
    Arabic,
    /// Latin script block
    Latin,
    /// Cyrillic script block
    Cyrillic,
    /// CJK unified ideographs
    Cjk,
    /// Anything else (digits, punctuation, symbols)
    Neutral,
}

impl Script {
    /// Classify a single character by script block
    pub fn of_char(c: char) -> Self {
        match c {
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}' => Script::Arabic,
            'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' => Script::Latin,
            '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}' => Script::Cyrillic,
            '\u{4E00}'..='\u{9FFF}' | '\u{3040}'..='\u{30FF}' | '\u{AC00}'..='\u{D7AF}' => {
                Script::Cjk
            }
            _ => Script::Neutral,
        }
    }

    /// Whether this script is foreign to both supported languages
    pub fn is_foreign(&self) -> bool {
        matches!(self, Script::Cyrillic | Script::Cjk)
    }
}

/// An ordered source/target language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Source language
    pub source: Language,
    /// Target language
    pub target: Language,
}

impl LanguagePair {
    /// Create a pair
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    /// Arabic to French
    pub fn ar_to_fr() -> Self {
        Self::new(Language::Arabic, Language::French)
    }

    /// French to Arabic
    pub fn fr_to_ar() -> Self {
        Self::new(Language::French, Language::Arabic)
    }

    /// Parse from two ISO codes
    pub fn from_codes(source: &str, target: &str) -> Option<Self> {
        Some(Self::new(
            Language::from_code(source)?,
            Language::from_code(target)?,
        ))
    }

    /// Stable key for grouping, e.g. "ar-fr"
    pub fn key(&self) -> String {
        format!("{}-{}", self.source.code(), self.target.code())
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source.code(), self.target.code())
    }
}
