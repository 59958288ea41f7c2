//! The ask pipeline: question in, answer bundle out.
//!
//! A linear flow per request: load segments, detect languages, retrieve the
//! most relevant segments, bridge context and question into the generator's
//! working language, generate with web-augmented context, and translate the
//! answer back out. Only a missing transcript aborts; every other stage
//! degrades per its component's fallback rules.

mod answer;
pub mod context;

pub use answer::{clean_generated, AnswerEngine, MIN_ANSWER_CHARS};

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAiEmbedder};
use crate::error::{Result, SporreError};
use crate::generation::{Generator, OpenAiGenerator};
use crate::index::{ScoredSegment, SegmentIndex};
use crate::language::{
    translate_guarded, HttpTranslator, LanguageDetector, PassthroughTranslator, ScriptDetector,
    Translator,
};
use crate::transcript::{JsonSegmentSource, SegmentSource, TranscriptSegment};
use crate::websearch::{DisabledSearcher, DuckDuckGoSearcher, WebSearcher};
use context::{compose_context, truncate_chars};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Number of leading segments sampled for video-language detection.
///
/// The transcript is assumed to stay in one language throughout.
const LANGUAGE_SAMPLE_SEGMENTS: usize = 3;

/// Placeholder used in the prompt when no web context is available.
const NO_WEB_CONTEXT: &str = "None";

/// A retrieved segment as returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentView {
    pub speaker: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<&ScoredSegment> for SegmentView {
    fn from(scored: &ScoredSegment) -> Self {
        Self {
            speaker: scored.segment.speaker_or_unknown().to_string(),
            start: scored.segment.start,
            end: scored.segment.end,
            text: scored.segment.text.clone(),
        }
    }
}

/// The complete answer to one question.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerBundle {
    /// Detected language of the question.
    pub question_language: String,
    /// Detected language of the video transcript.
    pub video_language: String,
    /// Answer in the questioner's language.
    pub answer_translated: String,
    /// Answer in the video's language.
    pub answer_original: String,
    /// Retrieved segments, best match first.
    pub segments: Vec<SegmentView>,
}

/// The end-to-end question-answering pipeline.
///
/// Capabilities are injected at construction so tests can substitute
/// deterministic doubles; all of them are safe for concurrent read-only use
/// across simultaneous requests.
pub struct AskPipeline {
    settings: Settings,
    prompts: Prompts,
    source: Arc<dyn SegmentSource>,
    embedder: Arc<dyn Embedder>,
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    searcher: Arc<dyn WebSearcher>,
    answers: AnswerEngine,
}

impl AskPipeline {
    /// Create a pipeline with production capabilities from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source = Arc::new(JsonSegmentSource::new(settings.transcripts_dir()));

        let embedder = Arc::new(OpenAiEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let generator: Arc<dyn Generator> =
            Arc::new(OpenAiGenerator::new(&settings.generation.model));

        let translator: Arc<dyn Translator> = match &settings.translation.endpoint {
            Some(endpoint) => Arc::new(HttpTranslator::new(
                endpoint,
                settings.translation.api_key.clone(),
            )),
            None => Arc::new(PassthroughTranslator),
        };

        let searcher: Arc<dyn WebSearcher> = if settings.web_search.enabled {
            Arc::new(DuckDuckGoSearcher::new())
        } else {
            Arc::new(DisabledSearcher)
        };

        Ok(Self::with_components(
            settings,
            prompts,
            source,
            embedder,
            generator,
            Arc::new(ScriptDetector::new()),
            translator,
            searcher,
        ))
    }

    /// Create a pipeline with custom capabilities.
    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        source: Arc<dyn SegmentSource>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
        searcher: Arc<dyn WebSearcher>,
    ) -> Self {
        let answers = AnswerEngine::new(
            generator,
            prompts.clone(),
            settings.generation.max_new_tokens,
        );

        Self {
            settings,
            prompts,
            source,
            embedder,
            detector,
            translator,
            searcher,
            answers,
        }
    }

    /// Answer a question about a video.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str, video_title: Option<&str>) -> Result<AnswerBundle> {
        if question.trim().is_empty() {
            return Err(SporreError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        // Stage 1: load segments; the only stage allowed to abort.
        let segments: Vec<TranscriptSegment> = self
            .source
            .load(video_title)
            .await?
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .collect();

        if segments.is_empty() {
            return Err(SporreError::TranscriptNotFound(
                video_title.unwrap_or("default").to_string(),
            ));
        }

        // Stage 2: language detection.
        let question_language = self.detector.detect(question);
        let sample = segments
            .iter()
            .take(LANGUAGE_SAMPLE_SEGMENTS)
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let video_language = self.detector.detect(&sample);

        info!(
            "Question language {}, video language {}",
            question_language, video_language
        );

        // Stage 3: retrieval. The question is embedded as-is; the embedding
        // space is multilingual, so the query must not be pre-translated.
        let matches = self.retrieve(question, &segments).await;

        // Stage 4: transcript context in retrieval order.
        let context = compose_context(&matches);

        // Stage 5: bridge context into the working language.
        let working = self.settings.generation.working_language.clone();
        let context_for_llm = if video_language != working {
            translate_guarded(
                self.translator.as_ref(),
                &context,
                &video_language,
                &working,
            )
            .await
            .unwrap_or_else(|| context.clone())
        } else {
            context.clone()
        };

        let question_for_llm = if question_language != working {
            translate_guarded(
                self.translator.as_ref(),
                question,
                &question_language,
                &working,
            )
            .await
            .unwrap_or_else(|| question.to_string())
        } else {
            question.to_string()
        };

        // Stage 6: budget both context sources independently.
        let web_context = self
            .searcher
            .search(&question_for_llm, self.settings.web_search.max_results)
            .await;
        let context_budgeted =
            truncate_chars(&context_for_llm, self.settings.generation.max_context_chars);
        let web_budgeted = truncate_chars(
            &web_context,
            self.settings.generation.max_web_context_chars,
        );

        // Stage 7: compose the prompt and generate the working-language answer.
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_budgeted.to_string());
        vars.insert(
            "web".to_string(),
            if web_budgeted.is_empty() {
                NO_WEB_CONTEXT.to_string()
            } else {
                web_budgeted.to_string()
            },
        );
        vars.insert("question".to_string(), question_for_llm.clone());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.answer.primary, &vars);

        let best_segment = matches
            .first()
            .map(|m| m.segment.text.clone())
            .unwrap_or_else(|| truncate_chars(&context, 300).to_string());

        let answer_working = self.answers.answer(&prompt, &best_segment, web_budgeted).await;

        // Stage 8: translate the answer back out, each direction guarded
        // independently.
        let answer_translated = if question_language != working {
            translate_guarded(
                self.translator.as_ref(),
                &answer_working,
                &working,
                &question_language,
            )
            .await
            .unwrap_or_else(|| answer_working.clone())
        } else {
            answer_working.clone()
        };

        let answer_original = if video_language != working {
            translate_guarded(
                self.translator.as_ref(),
                &answer_working,
                &working,
                &video_language,
            )
            .await
            .unwrap_or_else(|| answer_working.clone())
        } else {
            answer_working.clone()
        };

        // Stage 9: assemble the bundle.
        Ok(AnswerBundle {
            question_language,
            video_language,
            answer_translated,
            answer_original,
            segments: matches.iter().map(SegmentView::from).collect(),
        })
    }

    /// Retrieve the top segments for the question.
    ///
    /// An embedding outage degrades to the leading segments in transcript
    /// order rather than aborting the request.
    async fn retrieve(
        &self,
        question: &str,
        segments: &[TranscriptSegment],
    ) -> Vec<ScoredSegment> {
        let top_k = self.settings.retrieval.top_k;

        let index = match SegmentIndex::build(self.embedder.clone(), segments.to_vec()).await {
            Ok(index) => index,
            Err(e) => {
                warn!("Index build failed, falling back to leading segments: {}", e);
                return leading_segments(segments, top_k);
            }
        };

        match index.query(question, top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Query failed, falling back to leading segments: {}", e);
                leading_segments(segments, top_k)
            }
        }
    }
}

fn leading_segments(segments: &[TranscriptSegment], top_k: usize) -> Vec<ScoredSegment> {
    segments
        .iter()
        .take(top_k)
        .map(|segment| ScoredSegment {
            segment: segment.clone(),
            distance: 0.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Segment source serving a fixed list.
    struct StaticSource {
        segments: Vec<TranscriptSegment>,
    }

    #[async_trait]
    impl SegmentSource for StaticSource {
        async fn load(&self, _video_title: Option<&str>) -> Result<Vec<TranscriptSegment>> {
            Ok(self.segments.clone())
        }
    }

    /// Deterministic embedder: known texts map to fixed vectors, anything
    /// else lands far away from everything.
    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl FixedEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(t, v)| (t.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![9.0, 9.0, 9.0]))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Embedder that always fails, for the degraded-retrieval path.
    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SporreError::Embedding("offline".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SporreError::Embedding("offline".to_string()))
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Generator returning one fixed answer.
    struct FixedGenerator {
        answer: String,
    }

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate(&self, _prompt: &str, _max_new_tokens: u32) -> Result<String> {
            Ok(self.answer.clone())
        }
    }

    fn sky_segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, 2.0, "The sky is blue"),
            TranscriptSegment::new(2.0, 4.0, "Water boils at 100C"),
        ]
    }

    fn sky_embedder() -> Arc<FixedEmbedder> {
        Arc::new(FixedEmbedder::new(&[
            ("The sky is blue", vec![1.0, 0.0, 0.0]),
            ("Water boils at 100C", vec![0.0, 1.0, 0.0]),
            ("What color is the sky?", vec![0.9, 0.1, 0.0]),
            ("आकाश किस रंग का है?", vec![0.9, 0.1, 0.0]),
        ]))
    }

    fn pipeline_with(
        segments: Vec<TranscriptSegment>,
        embedder: Arc<dyn Embedder>,
        translator: Arc<dyn Translator>,
    ) -> AskPipeline {
        let mut settings = Settings::default();
        settings.web_search.enabled = false;

        AskPipeline::with_components(
            settings,
            Prompts::default(),
            Arc::new(StaticSource { segments }),
            embedder,
            Arc::new(FixedGenerator {
                answer: "The video says the sky is blue during the day.".to_string(),
            }),
            Arc::new(ScriptDetector::new()),
            translator,
            Arc::new(DisabledSearcher),
        )
    }

    #[tokio::test]
    async fn test_scenario_top_match_and_answer() {
        let pipeline = pipeline_with(
            sky_segments(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let bundle = pipeline.ask("What color is the sky?", None).await.unwrap();

        assert_eq!(bundle.segments[0].text, "The sky is blue");
        assert!(bundle.answer_original.contains("blue"));
        assert_eq!(bundle.question_language, "en");
        assert_eq!(bundle.video_language, "en");
    }

    #[tokio::test]
    async fn test_cross_language_without_installed_pair() {
        // Hindi question, English video, no translation pair installed:
        // both answers fall back to the working-language answer, no crash.
        let pipeline = pipeline_with(
            sky_segments(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let bundle = pipeline.ask("आकाश किस रंग का है?", None).await.unwrap();

        assert_eq!(bundle.question_language, "hi");
        assert_eq!(bundle.video_language, "en");
        assert_eq!(bundle.answer_translated, bundle.answer_original);
        assert!(!bundle.answer_translated.is_empty());
    }

    #[tokio::test]
    async fn test_web_search_disabled_still_answers() {
        let pipeline = pipeline_with(
            sky_segments(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let bundle = pipeline.ask("What color is the sky?", None).await.unwrap();

        assert!(!bundle.answer_translated.is_empty());
        assert!(!bundle.answer_original.is_empty());
        assert_eq!(bundle.segments.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_segments_is_not_found() {
        let pipeline = pipeline_with(
            Vec::new(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let err = pipeline.ask("What color is the sky?", None).await.unwrap_err();
        assert!(matches!(err, SporreError::TranscriptNotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_segments_are_not_found() {
        let pipeline = pipeline_with(
            vec![TranscriptSegment::new(0.0, 1.0, "   ")],
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let err = pipeline.ask("anything at all", None).await.unwrap_err();
        assert!(matches!(err, SporreError::TranscriptNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_question_is_invalid_input() {
        let pipeline = pipeline_with(
            sky_segments(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let err = pipeline.ask("   ", None).await.unwrap_err();
        assert!(matches!(err, SporreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_idempotent_with_deterministic_capabilities() {
        let pipeline = pipeline_with(
            sky_segments(),
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let first = pipeline.ask("What color is the sky?", None).await.unwrap();
        let second = pipeline.ask("What color is the sky?", None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_embedder_outage_degrades_to_leading_segments() {
        let pipeline = pipeline_with(
            sky_segments(),
            Arc::new(BrokenEmbedder),
            Arc::new(PassthroughTranslator),
        );

        let bundle = pipeline.ask("What color is the sky?", None).await.unwrap();

        // Transcript order, not retrieval order.
        assert_eq!(bundle.segments[0].text, "The sky is blue");
        assert_eq!(bundle.segments.len(), 2);
        assert!(!bundle.answer_original.is_empty());
    }

    #[tokio::test]
    async fn test_answer_translated_back_to_question_language() {
        /// Translator with en<->hi installed, marking output recognizably.
        struct EnHiTranslator;

        #[async_trait]
        impl Translator for EnHiTranslator {
            async fn translate(&self, text: &str, from: &str, to: &str) -> String {
                match (from, to) {
                    ("en", "hi") => format!("हिंदी में पर्याप्त लंबा उत्तर: {}", text),
                    ("hi", "en") => format!("english rendering long enough: {}", text),
                    _ => text.to_string(),
                }
            }
        }

        let pipeline = pipeline_with(sky_segments(), sky_embedder(), Arc::new(EnHiTranslator));

        let bundle = pipeline.ask("आकाश किस रंग का है?", None).await.unwrap();

        assert_eq!(bundle.question_language, "hi");
        assert!(bundle.answer_translated.starts_with("हिंदी में"));
        // Video is already in the working language; the original stays as-is.
        assert!(bundle.answer_original.contains("blue"));
    }

    #[tokio::test]
    async fn test_speaker_defaults_to_unknown() {
        let mut segments = sky_segments();
        segments[1].speaker = Some("Narrator".to_string());

        let pipeline = pipeline_with(
            segments,
            sky_embedder(),
            Arc::new(PassthroughTranslator),
        );

        let bundle = pipeline.ask("What color is the sky?", None).await.unwrap();

        assert_eq!(bundle.segments[0].speaker, "Unknown");
        assert_eq!(bundle.segments[1].speaker, "Narrator");
    }
}
