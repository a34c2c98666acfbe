//! Index command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::Indexer;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(
    playlist: Option<String>,
    limit: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    let playlist_url = playlist
        .or_else(|| settings.playlist.url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No playlist given. Pass a URL or set playlist.url in the config."
            )
        })?;

    if let Some(limit) = limit {
        settings.playlist.max_videos = limit;
    }

    let indexer = Indexer::new(settings)?;

    Output::info(&format!("Indexing playlist: {}", playlist_url));

    match indexer.run(&playlist_url).await {
        Ok(report) => {
            println!();
            Output::success(&format!(
                "Indexed {} chunks from {} videos",
                report.chunks_indexed, report.videos_indexed
            ));

            if !report.skipped.is_empty() {
                Output::warning(&format!("Skipped {} videos:", report.skipped.len()));
                for (video_id, reason) in &report.skipped {
                    Output::kv(video_id, reason);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
