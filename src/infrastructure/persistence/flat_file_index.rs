use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::ports::{SearchResult, VectorIndex, VectorIndexError, VectorIndexStore};
use crate::domain::{Chunk, ChunkId, Embedding, SessionId, SessionStoragePath};

/// Persists each session's vectors as a single JSON file under its own directory.
pub struct FlatFileIndexStore {
    index_root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    chunk_id: ChunkId,
    text: String,
    offset: usize,
    vector: Embedding,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    session_id: String,
    entries: Vec<IndexEntry>,
}

impl FlatFileIndexStore {
    pub fn new(index_root: impl Into<PathBuf>) -> Self {
        Self {
            index_root: index_root.into(),
        }
    }

    pub fn storage_path(&self, session_id: &SessionId) -> SessionStoragePath {
        SessionStoragePath::new(&self.index_root, session_id)
    }
}

#[async_trait]
impl VectorIndexStore for FlatFileIndexStore {
    #[instrument(skip(self, chunks, embeddings), fields(session_id = %session_id, chunks = chunks.len()))]
    async fn create(
        &self,
        session_id: SessionId,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<Arc<dyn VectorIndex>, VectorIndexError> {
        if chunks.len() != embeddings.len() {
            return Err(VectorIndexError::LengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let path = self.storage_path(&session_id);

        tokio::fs::create_dir_all(&self.index_root)
            .await
            .map_err(|e| VectorIndexError::WriteFailed(format!("index root: {e}")))?;

        tokio::fs::create_dir(path.dir())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => VectorIndexError::AlreadyExists(path.to_string()),
                _ => VectorIndexError::WriteFailed(format!("{path}: {e}")),
            })?;

        let file = IndexFile {
            session_id: session_id.to_string(),
            entries: chunks
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexEntry {
                    chunk_id: chunk.id,
                    text: chunk.text.clone(),
                    offset: chunk.offset,
                    vector: embedding.clone(),
                })
                .collect(),
        };

        let serialized = serde_json::to_vec(&file)
            .map_err(|e| VectorIndexError::WriteFailed(format!("serialize: {e}")))?;

        let index_file = path.index_file();
        tokio::fs::write(&index_file, serialized)
            .await
            .map_err(|e| {
                VectorIndexError::WriteFailed(format!("{}: {e}", index_file.display()))
            })?;

        info!(path = %path, entries = file.entries.len(), "Session index written");

        let entries = file
            .entries
            .into_iter()
            .map(|entry| {
                let chunk = Chunk {
                    id: entry.chunk_id,
                    text: entry.text,
                    session_id,
                    offset: entry.offset,
                };
                (chunk, entry.vector)
            })
            .collect();

        Ok(Arc::new(FlatFileIndex { entries }))
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn remove(&self, session_id: SessionId) -> Result<(), VectorIndexError> {
        let path = self.storage_path(&session_id);
        match tokio::fs::remove_dir_all(path.dir()).await {
            Ok(()) => {
                debug!(path = %path, "Session index removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VectorIndexError::RemoveFailed(format!("{path}: {e}"))),
        }
    }
}

/// In-memory view of a persisted session index; brute-force cosine search.
pub struct FlatFileIndex {
    entries: Vec<(Chunk, Embedding)>,
}

#[async_trait]
impl VectorIndex for FlatFileIndex {
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(chunk, vector)| SearchResult {
                chunk: chunk.clone(),
                score: embedding.cosine_similarity(vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.offset.cmp(&b.chunk.offset))
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
