//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::AskPipeline;
use crate::transcript::format_timestamp;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, video: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let pipeline = AskPipeline::new(settings)?;

    let spinner = Output::spinner("Searching transcript...");

    match pipeline.ask(question, video.as_deref()).await {
        Ok(bundle) => {
            spinner.finish_and_clear();

            println!("\n{}\n", bundle.answer_translated);

            if bundle.answer_original != bundle.answer_translated {
                Output::kv("In the video's language", &bundle.answer_original);
            }
            Output::kv("Question language", &bundle.question_language);
            Output::kv("Video language", &bundle.video_language);

            if !bundle.segments.is_empty() {
                Output::header("Segments");
                for segment in &bundle.segments {
                    Output::segment(
                        &segment.speaker,
                        &format_timestamp(segment.start),
                        &segment.text,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer question: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
