/*!
 * Tests for language and script utilities
 */

use lexipure::language_utils::{Language, LanguagePair, Script};

#[test]
fn test_language_fromCode_shouldBeCaseInsensitive() {
    assert_eq!(Language::from_code("AR"), Some(Language::Arabic));
    assert_eq!(Language::from_code("Fr"), Some(Language::French));
    assert_eq!(Language::from_code("fre"), Some(Language::French));
    assert_eq!(Language::from_code("ara"), Some(Language::Arabic));
}

#[test]
fn test_language_fromCode_unsupported_shouldReturnNone() {
    assert_eq!(Language::from_code("en"), None);
    assert_eq!(Language::from_code("ru"), None);
    assert_eq!(Language::from_code(""), None);
}

#[test]
fn test_language_displayName_shouldUseIsoNames() {
    assert_eq!(Language::Arabic.display_name(), "Arabic");
    assert_eq!(Language::French.display_name(), "French");
}

#[test]
fn test_language_expectedScript_shouldMatchLanguage() {
    assert_eq!(Language::Arabic.expected_script(), Script::Arabic);
    assert_eq!(Language::French.expected_script(), Script::Latin);
}

#[test]
fn test_script_isForeign_shouldOnlyFlagNonDomainScripts() {
    assert!(Script::Cyrillic.is_foreign());
    assert!(Script::Cjk.is_foreign());
    assert!(!Script::Arabic.is_foreign());
    assert!(!Script::Latin.is_foreign());
    assert!(!Script::Neutral.is_foreign());
}

#[test]
fn test_script_ofChar_shouldCoverExtendedBlocks() {
    // Presentation forms count as Arabic script
    assert_eq!(Script::of_char('\u{FB51}'), Script::Arabic);
    // Accented Latin
    assert_eq!(Script::of_char('ç'), Script::Latin);
    // ASCII punctuation stays neutral
    assert_eq!(Script::of_char('.'), Script::Neutral);
    assert_eq!(Script::of_char(' '), Script::Neutral);
}

#[test]
fn test_languagePair_fromCodes_shouldParseBothDirections() {
    assert_eq!(
        LanguagePair::from_codes("ar", "fr"),
        Some(LanguagePair::ar_to_fr())
    );
    assert_eq!(
        LanguagePair::from_codes("fra", "ara"),
        Some(LanguagePair::fr_to_ar())
    );
    assert_eq!(LanguagePair::from_codes("ar", "en"), None);
}

#[test]
fn test_languagePair_display_shouldShowDirection() {
    assert_eq!(LanguagePair::ar_to_fr().to_string(), "ar -> fr");
}
