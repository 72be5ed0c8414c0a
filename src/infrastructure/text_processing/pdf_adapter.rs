use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;

use crate::application::ports::{ExtractionError, PdfExtractor};
use crate::domain::ExtractionResult;
use crate::infrastructure::cancellation::{CancellationFlag, spawn_cancellable};

use super::pdf_rasterizer::rasterize_pages;

pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// A page with more extractable characters than this marks the whole
/// document as native-text.
pub const NATIVE_TEXT_THRESHOLD: usize = 100;

/// Text-layer extraction with a rasterization fallback for scanned PDFs.
#[derive(Default)]
pub struct PdfAdapter;

impl PdfAdapter {
    pub fn new() -> Self {
        Self
    }

    fn extract_page_texts(
        path: &Path,
        cancelled: &CancellationFlag,
    ) -> Result<Vec<String>, ExtractionError> {
        let doc = PdfDocument::open(path)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let page_count = doc.page_count().map_err(|e| {
            ExtractionError::ExtractionFailed(format!("failed to read page count: {e}"))
        })?;

        if page_count == 0 {
            return Err(ExtractionError::ExtractionFailed(
                "PDF contains no pages".to_string(),
            ));
        }

        let mut pages = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            if cancelled.is_cancelled() {
                return Err(extraction_cancelled());
            }
            let text = doc.extract_text(page_index).map_err(|e| {
                ExtractionError::ExtractionFailed(format!(
                    "failed to read page {}: {e}",
                    page_index + 1
                ))
            })?;
            pages.push(text.trim().to_string());
        }

        Ok(pages)
    }

    fn extract_blocking(
        pdf_path: &Path,
        work_dir: &Path,
        cancelled: &CancellationFlag,
    ) -> Result<ExtractionResult, ExtractionError> {
        let pages = Self::extract_page_texts(pdf_path, cancelled)?;

        if is_native_text(&pages) {
            tracing::info!(page_count = pages.len(), "Native-text PDF, extracting directly");
            return Ok(ExtractionResult::DirectText {
                text: join_page_texts(&pages),
                page_count: pages.len(),
            });
        }

        tracing::info!(page_count = pages.len(), "Scanned PDF, rasterizing pages");

        let data = std::fs::read(pdf_path)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("failed to read PDF: {e}")))?;
        let images = rasterize_pages(&data, &page_image_dir(pdf_path, work_dir), cancelled)?;

        if images.is_empty() {
            return Err(ExtractionError::ExtractionFailed(
                "rasterizer produced no pages".to_string(),
            ));
        }

        Ok(ExtractionResult::PageImages(images))
    }
}

fn extraction_cancelled() -> ExtractionError {
    ExtractionError::ExtractionFailed("PDF extraction cancelled".to_string())
}

/// A document is native-text when any single page clears the threshold.
pub fn is_native_text(page_texts: &[String]) -> bool {
    page_texts
        .iter()
        .any(|text| text.trim().chars().count() > NATIVE_TEXT_THRESHOLD)
}

pub fn join_page_texts(page_texts: &[String]) -> String {
    page_texts.join("\n")
}

fn page_image_dir(pdf_path: &Path, work_dir: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    work_dir.join(stem)
}

#[async_trait]
impl PdfExtractor for PdfAdapter {
    #[tracing::instrument(skip(self, work_dir), fields(pdf = %pdf_path.display()))]
    async fn extract(
        &self,
        pdf_path: &Path,
        work_dir: &Path,
    ) -> Result<ExtractionResult, ExtractionError> {
        let pdf_path = pdf_path.to_path_buf();
        let work_dir = work_dir.to_path_buf();

        tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            spawn_cancellable(move |cancelled| {
                std::panic::catch_unwind(AssertUnwindSafe(|| {
                    Self::extract_blocking(&pdf_path, &work_dir, cancelled)
                }))
                .unwrap_or_else(|_| {
                    Err(ExtractionError::ExtractionFailed(
                        "panic during PDF extraction".to_string(),
                    ))
                })
            }),
        )
        .await
        .map_err(|_| ExtractionError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| ExtractionError::ExtractionFailed(format!("task join error: {e}")))?
    }
}
