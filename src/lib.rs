//! Sporre - Video Question Answering
//!
//! Ask questions about a video and get short answers grounded in its
//! transcript, with automatic handling of cross-language question, video,
//! and answer combinations.
//!
//! The name "Sporre" comes from the Norwegian word "spørre" - to ask.
//!
//! # Overview
//!
//! Sporre allows you to:
//! - Retrieve the transcript segments most relevant to a question
//! - Generate a short answer, optionally enriched with web snippets
//! - Ask in one language about a video in another and get both answer
//!   variants back
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `transcript` - Segment model and segment sources
//! - `embedding` - Embedding generation
//! - `index` - Per-request vector index over segments
//! - `language` - Language detection and translation bridging
//! - `websearch` - Optional web-augmented context
//! - `generation` - Bounded text generation
//! - `pipeline` - The question → answer pipeline
//! - `library` - Video file listing
//!
//! # Example
//!
//! ```rust,no_run
//! use sporre::config::Settings;
//! use sporre::pipeline::AskPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = AskPipeline::new(settings)?;
//!
//!     let bundle = pipeline.ask("What color is the sky?", None).await?;
//!     println!("{}", bundle.answer_translated);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod language;
pub mod library;
pub mod openai;
pub mod pipeline;
pub mod transcript;
pub mod websearch;

pub use error::{Result, SporreError};
