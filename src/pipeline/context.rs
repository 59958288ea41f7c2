//! Context budgeting for the bounded-context generator.

use crate::index::ScoredSegment;

/// Truncate text to a character-prefix of at most `max_chars`.
///
/// Character-based, not token-aware, and safe on multibyte text. Applied
/// independently to transcript context and web context so a long web result
/// cannot crowd out transcript context or vice versa.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Join retrieved segment texts into transcript context, best match first.
pub fn compose_context(matches: &[ScoredSegment]) -> String {
    matches
        .iter()
        .map(|m| m.segment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    #[test]
    fn test_truncate_shorter_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_prefix() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("anything", 0), "");
    }

    #[test]
    fn test_truncate_is_char_boundary_safe() {
        // Devanagari chars are multibyte; byte slicing here would panic.
        let text = "आकाश नीला है";
        assert_eq!(truncate_chars(text, 4), "आकाश");
        assert_eq!(truncate_chars(text, 100), text);
    }

    #[test]
    fn test_compose_context_keeps_retrieval_order() {
        let matches = vec![
            ScoredSegment {
                segment: TranscriptSegment::new(0.0, 1.0, "best"),
                distance: 0.1,
            },
            ScoredSegment {
                segment: TranscriptSegment::new(1.0, 2.0, "second"),
                distance: 0.4,
            },
        ];

        assert_eq!(compose_context(&matches), "best\nsecond");
    }
}
