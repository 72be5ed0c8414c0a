use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use super::{IndexBuilder, IndexingError, QaEngine, SessionRegistry, UploadWorkspace};
use crate::application::ports::{
    ExtractionError, LlmClient, OcrEngine, OcrError, PdfExtractor, TextSplitter,
    TextSplitterError,
};
use crate::domain::{
    ContentType, DocumentText, ExtractionResult, PageText, SessionId, UploadedFile,
};

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub staging_root: PathBuf,
    pub ocr_concurrency: usize,
    pub generation_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub session_id: SessionId,
    pub page_count: usize,
    pub chunk_count: usize,
    pub used_ocr: bool,
}

/// How a validated batch gets turned into text.
#[derive(Debug, PartialEq, Eq)]
enum BatchPlan {
    /// Position of the single PDF in the batch.
    Pdf(usize),
    /// Batch positions of the images, ordered by original filename.
    Images(Vec<usize>),
}

/// Turns an upload batch into a registered, queryable session.
pub struct UploadService {
    pdf_extractor: Arc<dyn PdfExtractor>,
    ocr_engine: Arc<dyn OcrEngine>,
    text_splitter: Arc<dyn TextSplitter>,
    index_builder: Arc<IndexBuilder>,
    llm_client: Arc<dyn LlmClient>,
    registry: Arc<SessionRegistry>,
    config: UploadConfig,
}

impl UploadService {
    pub fn new(
        pdf_extractor: Arc<dyn PdfExtractor>,
        ocr_engine: Arc<dyn OcrEngine>,
        text_splitter: Arc<dyn TextSplitter>,
        index_builder: Arc<IndexBuilder>,
        llm_client: Arc<dyn LlmClient>,
        registry: Arc<SessionRegistry>,
        config: UploadConfig,
    ) -> Self {
        Self {
            pdf_extractor,
            ocr_engine,
            text_splitter,
            index_builder,
            llm_client,
            registry,
            config,
        }
    }

    #[instrument(skip(self, batch), fields(files = batch.len()))]
    pub async fn upload(&self, batch: Vec<UploadedFile>) -> Result<UploadOutcome, UploadError> {
        let plan = plan_batch(&batch)?;

        // Dropping the workspace removes every staged file and rendered page.
        let workspace =
            UploadWorkspace::create(&self.config.staging_root).map_err(UploadError::Staging)?;

        let mut staged = Vec::with_capacity(batch.len());
        for (position, file) in batch.iter().enumerate() {
            let path = workspace
                .stage(position, file)
                .await
                .map_err(UploadError::Staging)?;
            staged.push(path);
        }

        debug!(workspace = %workspace.path().display(), "Batch staged");

        let (text, page_count, used_ocr) = match plan {
            BatchPlan::Pdf(position) => {
                match self
                    .pdf_extractor
                    .extract(&staged[position], workspace.path())
                    .await?
                {
                    ExtractionResult::DirectText { text, page_count } => {
                        let text = DocumentText::direct(text).ok_or(UploadError::EmptyDocument)?;
                        (text, page_count, false)
                    }
                    ExtractionResult::PageImages(pages) => {
                        let page_count = pages.len();
                        let paths = pages.into_iter().map(|p| p.path).collect();
                        (self.transcribe_pages(paths).await?, page_count, true)
                    }
                }
            }
            BatchPlan::Images(order) => {
                let page_count = order.len();
                let paths = order.iter().map(|&i| staged[i].clone()).collect();
                (self.transcribe_pages(paths).await?, page_count, true)
            }
        };

        let session_id = SessionId::new();
        let chunks = self.text_splitter.split(text.as_str(), session_id).await?;
        if chunks.is_empty() {
            return Err(UploadError::EmptyDocument);
        }

        let retriever = self.index_builder.build(session_id, &chunks).await?;
        let engine = QaEngine::new(
            retriever,
            Arc::clone(&self.llm_client),
            self.config.generation_timeout,
        );

        if let Some(evicted) = self.registry.register(session_id, Arc::new(engine)).await {
            self.index_builder.discard(evicted).await;
        }

        info!(
            session_id = %session_id,
            page_count,
            chunk_count = chunks.len(),
            used_ocr,
            "Upload processed"
        );

        Ok(UploadOutcome {
            session_id,
            page_count,
            chunk_count: chunks.len(),
            used_ocr,
        })
    }

    /// OCRs `paths` with bounded concurrency; output keeps the input order.
    async fn transcribe_pages(&self, paths: Vec<PathBuf>) -> Result<DocumentText, UploadError> {
        self.ocr_engine.ensure_ready().map_err(UploadError::OcrUnavailable)?;

        let ocr_engine = &self.ocr_engine;
        let concurrency = self.config.ocr_concurrency.max(1);

        info!(pages = paths.len(), concurrency, "Starting OCR");

        let pages: Vec<PageText> = stream::iter(paths.into_iter().enumerate())
            .map(|(page_index, path)| async move {
                ocr_engine
                    .transcribe(&path)
                    .await
                    .map(|markdown| PageText::new(page_index, markdown))
                    .map_err(|source| UploadError::Ocr {
                        page: page_index + 1,
                        source,
                    })
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        DocumentText::from_pages(pages).ok_or(UploadError::EmptyDocument)
    }
}

fn plan_batch(batch: &[UploadedFile]) -> Result<BatchPlan, UploadError> {
    if batch.is_empty() {
        return Err(UploadError::EmptyBatch);
    }

    let mut pdfs = Vec::new();
    let mut images = Vec::new();
    for (position, file) in batch.iter().enumerate() {
        match file.content_type() {
            Some(ContentType::Pdf) => pdfs.push(position),
            Some(_) => images.push(position),
            None => return Err(UploadError::UnsupportedFile(file.filename.clone())),
        }
    }

    match (pdfs.as_slice(), images.is_empty()) {
        ([], _) => {
            images.sort_by(|&a, &b| batch[a].filename.cmp(&batch[b].filename));
            Ok(BatchPlan::Images(images))
        }
        ([pdf], true) => Ok(BatchPlan::Pdf(*pdf)),
        _ => Err(UploadError::MixedBatch),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no files were uploaded")]
    EmptyBatch,
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
    #[error("upload a single PDF or only images, not a mix")]
    MixedBatch,
    #[error("staging: {0}")]
    Staging(#[source] std::io::Error),
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("OCR unavailable: {0}")]
    OcrUnavailable(#[source] OcrError),
    #[error("OCR failed on page {page}: {source}")]
    Ocr {
        page: usize,
        #[source]
        source: OcrError,
    },
    #[error("no text could be extracted from the document")]
    EmptyDocument,
    #[error("splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("indexing: {0}")]
    Indexing(#[from] IndexingError),
}

impl UploadError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyBatch
                | Self::UnsupportedFile(_)
                | Self::MixedBatch
                | Self::EmptyDocument
                | Self::Extraction(ExtractionError::TooManyPages { .. })
        )
    }
}
