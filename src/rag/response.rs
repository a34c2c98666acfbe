//! RAG response generation.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::embedding::Embedder;
use crate::error::{Result, SpoleError};
use crate::vector_store::VectorStore;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// System prompt for single-question answering.
const RAG_SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about the \
content of a YouTube playlist. Answer using only the provided transcript excerpts. Cite the \
video titles and timestamps you drew from. If the excerpts do not contain the answer, say so.";

/// System prompt for the conversational session.
const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant for exploring a YouTube playlist. \
Each user message includes transcript excerpts retrieved from the playlist; ground your answers \
in them and cite video titles and timestamps. Remember context from earlier in the conversation.";

/// Maximum messages kept in the conversation history.
const MAX_HISTORY: usize = 20;

/// Timeout for chat completion requests.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Seam over the chat-completion backend, so the engine can be composed with
/// any model the way it is with [`Embedder`] and [`VectorStore`].
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion over the given messages and return the answer text.
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String>;
}

/// OpenAI chat-completion backend.
///
/// Reads the API key from the `OPENAI_API_KEY` environment variable.
pub struct OpenAIChatModel {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    pub fn new(model: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: async_openai::Client::with_config(OpenAIConfig::default())
                .with_http_client(http_client),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| SpoleError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SpoleError::Generation(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .ok_or_else(|| SpoleError::Generation("Empty response from LLM".to_string()))
    }
}

/// RAG engine for question answering.
pub struct RagEngine {
    model: Arc<dyn ChatModel>,
    context_builder: ContextBuilder,
    conversation_history: Vec<ChatCompletionRequestMessage>,
}

impl RagEngine {
    /// Create a RAG engine backed by the OpenAI chat API.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: &str,
        top_k: usize,
        min_score: f32,
    ) -> Self {
        Self::with_model(
            Arc::new(OpenAIChatModel::new(model)),
            vector_store,
            embedder,
            top_k,
            min_score,
        )
    }

    /// Create a RAG engine with a custom completion backend.
    pub fn with_model(
        model: Arc<dyn ChatModel>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
        min_score: f32,
    ) -> Self {
        let context_builder = ContextBuilder::new(vector_store, embedder)
            .with_top_k(top_k)
            .with_min_score(min_score);

        Self {
            model,
            context_builder,
            conversation_history: Vec::new(),
        }
    }

    /// Ask a single question and get a response.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        // Build context from the knowledge base
        let context_chunks = self.context_builder.build(question).await?;

        if context_chunks.is_empty() {
            return Ok(RagResponse {
                answer: "I couldn't find any relevant content in the indexed playlist for this question.".to_string(),
                sources: Vec::new(),
            });
        }

        let user_prompt = format!(
            "Question: {}\n\nRelevant transcript excerpts:\n{}",
            question,
            format_context_for_prompt(&context_chunks)
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(RAG_SYSTEM_PROMPT)
                .build()
                .map_err(|e| SpoleError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SpoleError::Generation(e.to_string()))?
                .into(),
        ];

        let answer = self.model.complete(messages).await?;

        debug!("Generated response with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }

    /// Continue a chat session with retrieval on every message.
    ///
    /// A retrieval or generation failure is returned as an error for this
    /// message only; the conversation history stays intact for the next one.
    #[instrument(skip(self), fields(message = %message))]
    pub async fn chat(&mut self, message: &str) -> Result<RagResponse> {
        info!("Chat message: {}", message);

        let context_chunks = self.context_builder.build(message).await?;

        let user_content = if context_chunks.is_empty() {
            format!(
                "Question: {}\n\n(No relevant content found in the indexed playlist)",
                message
            )
        } else {
            format!(
                "Question: {}\n\nRelevant transcript excerpts:\n{}",
                message,
                format_context_for_prompt(&context_chunks)
            )
        };

        let user_message: ChatCompletionRequestMessage =
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_content)
                .build()
                .map_err(|e| SpoleError::Generation(e.to_string()))?
                .into();

        // History is only committed once the model call succeeds, so a failed
        // request leaves the session exactly as it was.
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(CHAT_SYSTEM_PROMPT)
                .build()
                .map_err(|e| SpoleError::Generation(e.to_string()))?
                .into(),
        ];
        messages.extend(self.conversation_history.iter().cloned());
        messages.push(user_message.clone());

        let answer = self.model.complete(messages).await?;

        let assistant_message: ChatCompletionRequestMessage =
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(answer.clone())
                .build()
                .map_err(|e| SpoleError::Generation(e.to_string()))?
                .into();

        self.conversation_history.push(user_message);
        self.conversation_history.push(assistant_message);

        // Trim history if too long
        if self.conversation_history.len() > MAX_HISTORY {
            let start = self.conversation_history.len() - MAX_HISTORY;
            self.conversation_history.drain(..start);
        }

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }

    /// Clear conversation history.
    pub fn clear_history(&mut self) {
        self.conversation_history.clear();
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Format the response for display, with deep-linked citations.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} @ {} (score: {:.2})\n  {}\n  > {}...",
                    source.video_title,
                    source.timestamp,
                    source.score,
                    source.link,
                    source.excerpt()
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{MemoryVectorStore, Record};
    use std::sync::Mutex;

    /// Completion backend that fails on one scripted call and answers on the
    /// rest.
    struct ScriptedModel {
        calls: Mutex<usize>,
        fail_on_call: usize,
    }

    impl ScriptedModel {
        fn failing_on(call: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                fail_on_call: call,
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            _messages: Vec<ChatCompletionRequestMessage>,
        ) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == self.fail_on_call {
                return Err(SpoleError::Generation("backend unavailable".to_string()));
            }
            Ok(format!("answer {}", *calls))
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    async fn seeded_store() -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        let record = Record::new(
            "vidA".to_string(),
            "https://www.youtube.com/watch?v=vidA".to_string(),
            "Rust in 100 Seconds".to_string(),
            "Rust is a memory safe language".to_string(),
            10.0,
            vec![1.0, 0.0, 0.0],
            0,
        );
        store.upsert_batch(&[record]).await.unwrap();
        store
    }

    fn engine(model: Arc<dyn ChatModel>, store: Arc<MemoryVectorStore>) -> RagEngine {
        RagEngine::with_model(model, store, Arc::new(StubEmbedder), 3, 0.0)
    }

    #[tokio::test]
    async fn test_failed_chat_leaves_history_intact() {
        let store = seeded_store().await;
        let mut engine = engine(ScriptedModel::failing_on(2), store);

        // One successful exchange commits a user and an assistant message.
        engine.chat("what is rust?").await.unwrap();
        assert_eq!(engine.conversation_history.len(), 2);

        // The failing request must not touch the history.
        let err = engine.chat("tell me more").await.unwrap_err();
        assert!(matches!(err, SpoleError::Generation(_)));
        assert_eq!(engine.conversation_history.len(), 2);

        // The session keeps working afterwards.
        let response = engine.chat("tell me more").await.unwrap();
        assert_eq!(response.answer, "answer 3");
        assert_eq!(engine.conversation_history.len(), 4);
    }

    #[tokio::test]
    async fn test_ask_with_empty_index_skips_the_model() {
        let store = Arc::new(MemoryVectorStore::new());
        let engine = engine(ScriptedModel::failing_on(1), store);

        // No context means a canned answer; the backend is never called, so
        // its scripted failure never fires.
        let response = engine.ask("anything").await.unwrap();
        assert!(response.answer.contains("couldn't find"));
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_chat_response_carries_sources() {
        let store = seeded_store().await;
        let mut engine = engine(ScriptedModel::failing_on(0), store);

        let response = engine.chat("what is rust?").await.unwrap();
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].video_id, "vidA");
        assert!(response.sources[0].link.ends_with("&t=10s"));
    }

    #[tokio::test]
    async fn test_history_trimmed_to_cap() {
        let store = seeded_store().await;
        let mut engine = engine(ScriptedModel::failing_on(0), store);

        for i in 0..(MAX_HISTORY) {
            engine.chat(&format!("question {}", i)).await.unwrap();
        }
        assert_eq!(engine.conversation_history.len(), MAX_HISTORY);
    }
}
