use async_trait::async_trait;

use crate::domain::{Chunk, SessionId};

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(&self, text: &str, session_id: SessionId)
    -> Result<Vec<Chunk>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
