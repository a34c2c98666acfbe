//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::RagEngine;
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let model = model.unwrap_or_else(|| settings.rag.model.clone());
    let top_k = top_k.unwrap_or(settings.rag.top_k);

    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let embedder = Arc::new(OpenAIEmbedder::new(&settings.embedding));

    let engine = RagEngine::new(store, embedder, &model, top_k, settings.rag.min_score);

    let spinner = Output::spinner("Searching the playlist...");

    match engine.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::search_result(
                        &source.video_title,
                        &source.timestamp,
                        source.score,
                        source.excerpt(),
                        &source.link,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
