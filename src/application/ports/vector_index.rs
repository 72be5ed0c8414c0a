use std::sync::Arc;

use async_trait::async_trait;

use super::{SearchResult, VectorIndexError};
use crate::domain::{Chunk, Embedding, SessionId};

/// Creates and removes per-session similarity indexes.
#[async_trait]
pub trait VectorIndexStore: Send + Sync {
    /// Persists a brand-new index for `session_id`. Fails if one already exists.
    async fn create(
        &self,
        session_id: SessionId,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<Arc<dyn VectorIndex>, VectorIndexError>;

    async fn remove(&self, session_id: SessionId) -> Result<(), VectorIndexError>;
}

/// A read-only, session-scoped index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorIndexError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
