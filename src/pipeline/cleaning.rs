/*!
 * Deterministic rule-based text cleaning.
 *
 * The cleaner is the `clean` recovery strategy of the validation pipeline:
 * it strips foreign-alphabet runs, removes control and replacement
 * characters, separates mixed-script boundaries and drops common UI
 * artifacts, then collapses the whitespace left behind by removals.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static FOREIGN_RUNS: Lazy<Regex> = Lazy::new(|| {
    // Cyrillic, CJK, Greek, Japanese kana: foreign to both Arabic and French
    Regex::new(r"[Ѐ-ӿ一-鿿Ͱ-Ͽ぀-ヿ]+").expect("static cleaning pattern")
});

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\u{FFFD}]").expect("static cleaning pattern")
});

static UI_ARTIFACTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{\s*\w+\s*\}\}|</?(?:div|span|button|input)\b[^>]*>|\b(?:undefined|NaN|\[object Object\])\b")
        .expect("static cleaning pattern")
});

static ARABIC_THEN_LATIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([؀-ۿ])([A-Za-z])").expect("static cleaning pattern"));

static LATIN_THEN_ARABIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z])([؀-ۿ])").expect("static cleaning pattern"));

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("static cleaning pattern"));

/// One applied cleaning rule with what it changed
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningStep {
    /// Rule identifier
    pub rule: &'static str,
    /// Number of replacements made
    pub replacements: usize,
}

/// Result of a cleaning pass
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// The cleaned text
    pub text: String,
    /// Rules that changed the text, in application order
    pub steps: Vec<CleaningStep>,
}

impl CleaningResult {
    /// Whether cleaning changed anything
    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// Deterministic text cleaner
#[derive(Debug, Clone, Default)]
pub struct TextCleaner;

impl TextCleaner {
    /// Create a cleaner
    pub fn new() -> Self {
        Self
    }

    /// Apply all cleaning rules in a fixed order
    pub fn clean(&self, text: &str) -> CleaningResult {
        let mut steps = Vec::new();
        let mut current = text.to_string();

        current = apply_rule(&mut steps, "strip_foreign_runs", &FOREIGN_RUNS, &current, " ");
        current = apply_rule(&mut steps, "remove_control_chars", &CONTROL_CHARS, &current, "");
        current = apply_rule(&mut steps, "remove_ui_artifacts", &UI_ARTIFACTS, &current, " ");

        // Mixed-script boundaries get a separating space instead of removal
        let separated = ARABIC_THEN_LATIN.replace_all(&current, "$1 $2");
        let separated = LATIN_THEN_ARABIC.replace_all(&separated, "$1 $2");
        if separated != current {
            steps.push(CleaningStep {
                rule: "separate_mixed_script",
                replacements: 1,
            });
            current = separated.into_owned();
        }

        // Collapse whitespace holes left by removals
        let collapsed = MULTI_SPACE.replace_all(&current, " ");
        let collapsed = collapsed.trim().to_string();
        if collapsed != current {
            steps.push(CleaningStep {
                rule: "collapse_whitespace",
                replacements: 1,
            });
            current = collapsed;
        }

        CleaningResult {
            text: current,
            steps,
        }
    }
}

fn apply_rule(
    steps: &mut Vec<CleaningStep>,
    rule: &'static str,
    pattern: &Regex,
    text: &str,
    replacement: &str,
) -> String {
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return text.to_string();
    }
    steps.push(CleaningStep {
        rule,
        replacements: count,
    });
    pattern.replace_all(text, replacement).into_owned()
}
