//! Deterministic language detection.
//!
//! Classification happens in two passes: a Unicode-script histogram settles
//! non-Latin scripts outright, and a small stop-word table separates the
//! common Latin-script languages. Anything the tables cannot place resolves
//! to [`DEFAULT_LANGUAGE`].

use super::DEFAULT_LANGUAGE;
use std::collections::HashMap;

/// Minimum number of alphabetic characters required before attempting
/// classification.
const MIN_SAMPLE_CHARS: usize = 3;

/// Minimum stop-word hits before claiming a Latin-script language.
const MIN_STOPWORD_HITS: usize = 2;

/// Trait for classifying a text span into a language code.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`.
    ///
    /// Never fails: empty, too-short, or unrecognizable input returns the
    /// default code. Deterministic for identical input.
    fn detect(&self, text: &str) -> String;
}

/// Script-histogram detector with Latin stop-word refinement.
#[derive(Debug, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    /// Create a new detector.
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> String {
        let alphabetic: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        if alphabetic.len() < MIN_SAMPLE_CHARS {
            return DEFAULT_LANGUAGE.to_string();
        }

        let mut script_counts: HashMap<&'static str, usize> = HashMap::new();
        let mut latin = 0usize;

        for &c in &alphabetic {
            match script_code(c) {
                Some(code) => *script_counts.entry(code).or_insert(0) += 1,
                None if c.is_ascii_alphabetic() || is_latin_extended(c) => latin += 1,
                None => {}
            }
        }

        // Japanese kana outranks Han: mixed kana/kanji text is Japanese even
        // when kanji characters are the majority.
        if script_counts.get("ja").copied().unwrap_or(0) > 0 {
            return "ja".to_string();
        }

        // Tie-break by code so equal counts stay deterministic.
        let dominant = script_counts.iter().map(|(code, count)| (*count, *code)).max();
        if let Some((count, code)) = dominant {
            if count > latin {
                return code.to_string();
            }
        }

        detect_latin(text)
    }
}

/// Map a character to a language code by Unicode script block.
fn script_code(c: char) -> Option<&'static str> {
    match c {
        '\u{0900}'..='\u{097F}' => Some("hi"),
        '\u{0980}'..='\u{09FF}' => Some("bn"),
        '\u{0B80}'..='\u{0BFF}' => Some("ta"),
        '\u{0C00}'..='\u{0C7F}' => Some("te"),
        '\u{0600}'..='\u{06FF}' => Some("ar"),
        '\u{0400}'..='\u{04FF}' => Some("ru"),
        '\u{0370}'..='\u{03FF}' => Some("el"),
        '\u{0590}'..='\u{05FF}' => Some("he"),
        '\u{0E00}'..='\u{0E7F}' => Some("th"),
        '\u{1100}'..='\u{11FF}' | '\u{AC00}'..='\u{D7AF}' => Some("ko"),
        '\u{3040}'..='\u{30FF}' => Some("ja"),
        '\u{4E00}'..='\u{9FFF}' => Some("zh"),
        _ => None,
    }
}

fn is_latin_extended(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{024F}')
}

/// Stop-word tables for Latin-script languages. English is the default and
/// needs no table.
const LATIN_STOPWORDS: &[(&str, &[&str])] = &[
    (
        "es",
        &["el", "la", "los", "las", "es", "de", "que", "en", "una", "por", "con", "como"],
    ),
    (
        "fr",
        &["le", "la", "les", "est", "de", "que", "et", "dans", "une", "pour", "avec", "qui"],
    ),
    (
        "de",
        &["der", "die", "das", "ist", "und", "nicht", "ein", "eine", "mit", "auf", "sich"],
    ),
    (
        "pt",
        &["o", "os", "as", "de", "que", "em", "uma", "para", "com", "como", "mais"],
    ),
    (
        "it",
        &["il", "lo", "gli", "di", "che", "in", "una", "per", "con", "non", "sono"],
    ),
];

fn detect_latin(text: &str) -> String {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    let mut best = (DEFAULT_LANGUAGE, 0usize);
    for &(code, stopwords) in LATIN_STOPWORDS {
        let hits = words.iter().filter(|w| stopwords.contains(*w)).count();
        if hits > best.1 {
            best = (code, hits);
        }
    }

    if best.1 >= MIN_STOPWORD_HITS {
        best.0.to_string()
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> String {
        ScriptDetector::new().detect(text)
    }

    #[test]
    fn test_empty_and_short_input_defaults() {
        assert_eq!(detect(""), "en");
        assert_eq!(detect("  "), "en");
        assert_eq!(detect("42"), "en");
    }

    #[test]
    fn test_english_default() {
        assert_eq!(detect("What color is the sky?"), "en");
    }

    #[test]
    fn test_non_latin_scripts() {
        assert_eq!(detect("आकाश किस रंग का है?"), "hi");
        assert_eq!(detect("Какого цвета небо?"), "ru");
        assert_eq!(detect("ما لون السماء؟"), "ar");
        assert_eq!(detect("空は何色ですか"), "ja");
        assert_eq!(detect("天空是什么颜色的"), "zh");
    }

    #[test]
    fn test_latin_stopwords() {
        assert_eq!(detect("¿De qué color es el cielo en la tarde?"), "es");
        assert_eq!(detect("Quelle est la couleur du ciel dans une nuit?"), "fr");
        assert_eq!(detect("Der Himmel ist blau und das Wasser ist kalt"), "de");
    }

    #[test]
    fn test_deterministic() {
        let text = "The sky is blue over the sea";
        assert_eq!(detect(text), detect(text));
    }
}
