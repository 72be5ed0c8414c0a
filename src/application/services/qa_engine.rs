use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::{RetrievalError, SessionRetriever};
use crate::application::ports::{LlmClient, LlmClientError, SearchResult};

pub const RAG_PROMPT_TEMPLATE: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
Use three sentences maximum and keep the answer concise. \
If you don't know the answer, just say that you don't know. Don't try to make up an answer.
Question: {question}
Context: {context}
Answer:
";

const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

/// Answers questions about one session's document using the shared model.
pub struct QaEngine {
    retriever: SessionRetriever,
    llm_client: Arc<dyn LlmClient>,
    generation_timeout: Duration,
}

impl QaEngine {
    pub fn new(
        retriever: SessionRetriever,
        llm_client: Arc<dyn LlmClient>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            retriever,
            llm_client,
            generation_timeout,
        }
    }

    #[instrument(skip(self, question), fields(session_id = %self.retriever.session_id()))]
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        let sources = self.retriever.retrieve(question).await?;
        let prompt = build_prompt(question, &sources);

        debug!(
            sources = sources.len(),
            prompt_chars = prompt.len(),
            "Prompt assembled"
        );

        let text = tokio::time::timeout(self.generation_timeout, self.llm_client.generate(&prompt))
            .await
            .map_err(|_| AskError::GenerationTimedOut(self.generation_timeout))??;

        Ok(Answer {
            text: text.trim().to_string(),
            sources,
        })
    }
}

pub fn build_prompt(question: &str, sources: &[SearchResult]) -> String {
    let context = sources
        .iter()
        .map(|s| s.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    RAG_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{context}", &context)
}

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("question is empty")]
    EmptyQuestion,
    #[error("retrieval: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
    #[error("generation timed out after {0:?}")]
    GenerationTimedOut(Duration),
}

impl AskError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::SessionNotFound(_) | Self::EmptyQuestion)
    }
}
