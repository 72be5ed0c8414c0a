use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Transcribes one page image into markdown.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Checks configuration that would make every transcription fail.
    /// Called once per batch before any page is sent.
    fn ensure_ready(&self) -> Result<(), OcrError>;

    async fn transcribe(&self, image_path: &Path) -> Result<String, OcrError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR api key is not configured")]
    MissingCredentials,
    #[error("OCR transport failure: {0}")]
    TransportFailure(String),
    #[error("image not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("OCR model error: {0}")]
    ModelError(String),
}

impl OcrError {
    /// Whether the caller may reasonably retry the same page.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure(_))
    }
}
