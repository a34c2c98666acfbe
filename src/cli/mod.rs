//! CLI module for Spole.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Spole - Chat with a YouTube playlist
///
/// Index the caption transcripts of a playlist and ask questions answered
/// with deep-linked citations into the exact video moments.
/// The name "Spole" comes from the Norwegian word for "rewind."
#[derive(Parser, Debug)]
#[command(name = "spole")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a playlist's transcripts into the vector store
    Index {
        /// Playlist URL (falls back to playlist.url from the config)
        playlist: Option<String>,

        /// Maximum number of videos to process
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a question and get an answer with timestamped citations
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Search for relevant transcript segments
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,
    },

    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List indexed videos
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Dotted config key (e.g. rag.model, chunking.chunk_size)
        key: String,

        /// New value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
