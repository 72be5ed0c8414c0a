#[derive(Debug, thiserror::Error)]
pub enum VectorIndexError {
    #[error("index already exists: {0}")]
    AlreadyExists(String),
    #[error("index write failed: {0}")]
    WriteFailed(String),
    #[error("index removal failed: {0}")]
    RemoveFailed(String),
    #[error("chunk/embedding count mismatch: {chunks} chunks, {embeddings} embeddings")]
    LengthMismatch { chunks: usize, embeddings: usize },
    #[error("search failed: {0}")]
    SearchFailed(String),
}
