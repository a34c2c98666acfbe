//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::rag::ContextBuilder;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;
    let embedder = OpenAIEmbedder::new(&settings.embedding);

    let spinner = Output::spinner("Searching...");

    let query_embedding = embedder.embed(query).await?;
    let results = store
        .search_with_threshold(&query_embedding, limit, min_score)
        .await?;

    spinner.finish_and_clear();

    if results.is_empty() {
        Output::info("No matching segments found.");
        return Ok(());
    }

    Output::header(&format!("Results for \"{}\"", query));
    for chunk in ContextBuilder::from_results(results) {
        Output::search_result(
            &chunk.video_title,
            &chunk.timestamp,
            chunk.score,
            chunk.excerpt(),
            &chunk.link,
        );
    }

    Ok(())
}
