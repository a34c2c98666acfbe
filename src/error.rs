//! Error types for Spole.

use thiserror::Error;

/// Library-level error type for Spole operations.
#[derive(Error, Debug)]
pub enum SpoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playlist error: {0}")]
    Playlist(String),

    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript available for video {0} in the preferred languages")]
    NoTranscriptAvailable(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("Invalid splitter configuration: {0}")]
    SplitterInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Index persistence failed: {0}")]
    IndexPersistence(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SpoleError {
    /// Whether this error only affects a single video during indexing.
    ///
    /// Per-video errors are logged and the video is skipped; the batch continues.
    pub fn is_per_video(&self) -> bool {
        matches!(
            self,
            SpoleError::TranscriptsDisabled(_)
                | SpoleError::NoTranscriptAvailable(_)
                | SpoleError::TranscriptFetch(_)
        )
    }
}

/// Result type alias for Spole operations.
pub type Result<T> = std::result::Result<T, SpoleError>;
