//! Language detection and translation bridging.
//!
//! Questions, transcripts, and answers may each be in a different language.
//! Detection assigns a language code to a span of text; translation bridges
//! text into the generator's working language and back. Both are best-effort:
//! detection falls back to a default code and translation falls back to
//! passing text through unchanged, so neither can stall the pipeline.

mod detect;
mod translate;

pub use detect::{LanguageDetector, ScriptDetector};
pub use translate::{
    translate_guarded, HttpTranslator, PassthroughTranslator, TranslationDirection, Translator,
    MIN_TRANSLATED_CHARS,
};

/// Language code assumed when detection cannot decide.
pub const DEFAULT_LANGUAGE: &str = "en";
