//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;

    match store.list_videos().await {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos indexed yet. Use 'spole index <playlist-url>' to add some.");
            } else {
                Output::header(&format!("Indexed Videos ({})", videos.len()));
                println!();

                for video in &videos {
                    Output::video_info(
                        &video.video_title,
                        &video.video_id,
                        video.chunk_count,
                        video.last_timestamp_seconds,
                    );
                }

                let total_chunks: u32 = videos.iter().map(|v| v.chunk_count).sum();
                println!();
                Output::kv("Total videos", &videos.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
