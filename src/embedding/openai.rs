//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, SpoleError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Texts per embeddings request; the API caps batch sizes.
const MAX_BATCH: usize = 100;

/// Timeout for embedding requests.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// OpenAI-based embedder, configured from the `[embedding]` settings section.
pub struct OpenAIEmbedder {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
    dimensions: u32,
}

impl OpenAIEmbedder {
    /// Create an embedder for the configured model and dimensions.
    ///
    /// Reads the API key from the `OPENAI_API_KEY` environment variable.
    pub fn new(settings: &EmbeddingSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: async_openai::Client::with_config(OpenAIConfig::default())
                .with_http_client(http_client),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        }
    }

    /// One embeddings API call for at most [`MAX_BATCH`] texts.
    async fn request_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .dimensions(self.dimensions)
            .build()
            .map_err(|e| SpoleError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| SpoleError::OpenAI(format!("Embedding API error: {}", e)))?;

        // The API may return entries out of order; restore input order by index.
        let mut data = response.data;
        data.sort_by_key(|e| e.index);

        if data.len() != texts.len() {
            return Err(SpoleError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new(&EmbeddingSettings::default())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SpoleError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            all_embeddings.extend(self.request_batch(batch).await?);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions as usize
    }
}
