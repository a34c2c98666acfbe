//! Spole - Chat with a YouTube playlist
//!
//! A CLI tool that indexes the caption transcripts of a YouTube playlist and
//! answers questions about it, citing the exact video moments it drew from.
//!
//! The name "Spole" comes from the Norwegian word for "rewind."
//!
//! # Overview
//!
//! Spole allows you to:
//! - Index the caption transcripts of a whole playlist
//! - Ask questions and get AI-powered answers with timestamped citations
//! - Search the playlist semantically and jump straight to the moment
//! - Chat with the playlist in an interactive session
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Playlist and caption fetching (yt-dlp)
//! - `transcript` - Caption snippets and the offset-to-timestamp map
//! - `chunking` - Recursive text splitting and chunk timestamping
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - RAG engine for question answering
//! - `indexer` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use spole::config::Settings;
//! use spole::indexer::Indexer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let indexer = Indexer::new(settings)?;
//!
//!     let report = indexer
//!         .run("https://www.youtube.com/playlist?list=PL0vfts4VzfNiI1BsIK5u7LpPaIDKMJIDN")
//!         .await?;
//!     println!("Indexed {} chunks", report.chunks_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod rag;
pub mod source;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, SpoleError};
