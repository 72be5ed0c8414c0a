use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::application::ports::{
    Embedder, EmbedderError, SearchResult, VectorIndex, VectorIndexError, VectorIndexStore,
};
use crate::domain::{Chunk, SessionId};

/// Embeds a session's chunks and persists them as a fresh similarity index.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorIndexStore>,
    top_k: usize,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorIndexStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    #[instrument(skip(self, chunks), fields(session_id = %session_id, chunks = chunks.len()))]
    pub async fn build(
        &self,
        session_id: SessionId,
        chunks: &[Chunk],
    ) -> Result<SessionRetriever, IndexingError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(IndexingError::Mismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let index = match self.store.create(session_id, chunks, &embeddings).await {
            Ok(index) => index,
            Err(VectorIndexError::AlreadyExists(path)) => {
                return Err(IndexingError::Storage(VectorIndexError::AlreadyExists(path)));
            }
            Err(e) => {
                self.discard(session_id).await;
                return Err(IndexingError::Storage(e));
            }
        };

        info!(entries = index.len(), "Session index built");

        Ok(SessionRetriever {
            session_id,
            embedder: Arc::clone(&self.embedder),
            index,
            top_k: self.top_k,
        })
    }

    /// Best-effort removal of a session's persisted index.
    pub async fn discard(&self, session_id: SessionId) {
        if let Err(e) = self.store.remove(session_id).await {
            warn!(session_id = %session_id, error = %e, "Failed to remove session index");
        }
    }
}

/// Session-scoped retriever over a built index.
pub struct SessionRetriever {
    session_id: SessionId,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl SessionRetriever {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Top-k chunks by cosine similarity; equal scores keep document order.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, RetrievalError> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&embedding, self.top_k).await?;
        Ok(results)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexingError {
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("storage: {0}")]
    Storage(#[from] VectorIndexError),
    #[error("embedder returned {embeddings} embeddings for {chunks} chunks")]
    Mismatch { chunks: usize, embeddings: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("index search: {0}")]
    Search(#[from] VectorIndexError),
}
