//! Videos command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::library::list_videos;
use anyhow::Result;

/// Run the videos command.
pub fn run_videos(settings: Settings) -> Result<()> {
    let videos = list_videos(&settings.videos_dir(), &settings.library.extensions)?;

    if videos.is_empty() {
        Output::info(&format!(
            "No videos found in {}",
            settings.videos_dir().display()
        ));
        return Ok(());
    }

    Output::header("Videos");
    for video in &videos {
        Output::list_item(&format!("{} ({})", video.title, video.file));
    }
    println!();
    Output::success(&format!("{} video(s)", videos.len()));

    Ok(())
}
