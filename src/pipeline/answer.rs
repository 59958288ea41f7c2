//! Answer generation with a quality gate and tiered fallback.
//!
//! Two tiers: the primary generation runs against the full composed prompt;
//! when its cleaned output misses the quality gate, a reduced summarize
//! prompt runs against the best segment alone. If that too produces nothing,
//! a deterministic non-generated answer is built from the best segment's
//! text, so the engine can never return an empty answer.

use super::context::truncate_chars;
use crate::config::Prompts;
use crate::generation::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum cleaned-answer length accepted from the primary generation.
pub const MIN_ANSWER_CHARS: usize = 20;

/// Character budget of the best-segment excerpt in fallback answers.
const FALLBACK_SEGMENT_CHARS: usize = 200;

/// Character budget of the web excerpt appended to the fallback prompt.
const FALLBACK_WEB_CHARS: usize = 200;

/// Prefix of the deterministic last-resort answer.
const FALLBACK_PREFIX: &str = "From the video: ";

/// Boilerplate markers some generators echo back in front of the answer.
const ANSWER_MARKERS: [&str; 2] = ["Answer:", "sentences:"];

/// Engine wrapping a generator with post-processing and the fallback policy.
pub struct AnswerEngine {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    max_new_tokens: u32,
}

impl AnswerEngine {
    /// Create a new answer engine.
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts, max_new_tokens: u32) -> Self {
        Self {
            generator,
            prompts,
            max_new_tokens,
        }
    }

    /// Produce an answer for the composed prompt.
    ///
    /// `best_segment` is the top retrieval match's text and `web_context` the
    /// already-budgeted web snippets (possibly empty). The result is never
    /// empty.
    pub async fn answer(&self, prompt: &str, best_segment: &str, web_context: &str) -> String {
        let primary = clean_generated(&self.generate_or_empty(prompt).await).to_string();

        if primary.chars().count() >= MIN_ANSWER_CHARS {
            return primary;
        }

        debug!("Primary answer failed the quality gate, using fallback");
        self.fallback(best_segment, web_context).await
    }

    /// FALLBACK tier: summarize the best segment, then the deterministic
    /// last-resort answer. Terminal, no retries.
    async fn fallback(&self, best_segment: &str, web_context: &str) -> String {
        if !web_context.is_empty() {
            let mut vars = HashMap::new();
            vars.insert("segment".to_string(), best_segment.to_string());
            vars.insert(
                "web".to_string(),
                truncate_chars(web_context, FALLBACK_WEB_CHARS).to_string(),
            );
            let prompt = self
                .prompts
                .render_with_custom(&self.prompts.answer.fallback, &vars);

            let summarized = self.generate_or_empty(&prompt).await.trim().to_string();
            if !summarized.is_empty() {
                return summarized;
            }
        }

        format!(
            "{}{}",
            FALLBACK_PREFIX,
            truncate_chars(best_segment, FALLBACK_SEGMENT_CHARS)
        )
    }

    async fn generate_or_empty(&self, prompt: &str) -> String {
        match self.generator.generate(prompt, self.max_new_tokens).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation failed: {}", e);
                String::new()
            }
        }
    }
}

/// Strip generator boilerplate: keep only the text after the last marker,
/// then trim whitespace.
pub fn clean_generated(text: &str) -> &str {
    let mut out = text;
    for marker in ANSWER_MARKERS {
        if let Some(idx) = out.rfind(marker) {
            out = &out[idx + marker.len()..];
        }
    }
    out.trim()
}
