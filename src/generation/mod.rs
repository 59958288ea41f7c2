//! Bounded text generation.
//!
//! The generator is an opaque capability: it takes a fully composed prompt
//! and a cap on new tokens, and returns raw text. Post-processing and the
//! quality-gated fallback chain live in the pipeline's answer engine.

mod openai;

pub use openai::OpenAiGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for bounded text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for `prompt`, producing at most `max_new_tokens`
    /// new tokens.
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String>;
}
