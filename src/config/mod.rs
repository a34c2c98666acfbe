//! Configuration module for Spole.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, PlaylistSettings, RagSettings,
    Settings, VectorStoreSettings,
};
