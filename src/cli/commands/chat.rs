//! Interactive chat command.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::RagEngine;
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    let model = model.unwrap_or_else(|| settings.rag.model.clone());

    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let embedder = Arc::new(OpenAIEmbedder::new(&settings.embedding));

    let mut engine = RagEngine::new(
        store,
        embedder,
        &model,
        settings.rag.top_k,
        settings.rag.min_score,
    );

    println!("\n{}", style("Spole Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the playlist, or 'exit' to quit. Use 'clear' to reset conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            engine.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");

        // A failed message is reported and the session keeps going; history
        // stays as it was before the message.
        match engine.chat(input).await {
            Ok(response) => {
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("Spole:").cyan().bold(), response.answer);

                for source in &response.sources {
                    println!(
                        "   {} {} @ {}",
                        style("*").dim(),
                        style(&source.video_title).dim(),
                        style(&source.link).dim()
                    );
                }
                if !response.sources.is_empty() {
                    println!();
                }
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
