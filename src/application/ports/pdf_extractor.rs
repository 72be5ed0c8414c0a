use std::path::Path;

use async_trait::async_trait;

use crate::domain::ExtractionResult;

/// Classifies a PDF as native-text or scanned and extracts accordingly.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    /// `work_dir` receives any derived artifacts (rasterized pages).
    async fn extract(
        &self,
        pdf_path: &Path,
        work_dir: &Path,
    ) -> Result<ExtractionResult, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("document has {page_count} pages, limit is {limit}")]
    TooManyPages { page_count: usize, limit: usize },
}
