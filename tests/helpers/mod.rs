#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;

use docchat::application::ports::{
    Embedder, EmbedderError, ExtractionError, LlmClient, LlmClientError, OcrEngine, OcrError,
    PdfExtractor,
};
use docchat::application::services::{
    IndexBuilder, SessionRegistry, UploadConfig, UploadService,
};
use docchat::domain::{Embedding, ExtractionResult, PageImage, UploadedFile};
use docchat::infrastructure::persistence::FlatFileIndexStore;
use docchat::infrastructure::text_processing::RecursiveCharacterSplitter;

pub const EMBEDDING_DIMENSIONS: usize = 64;
pub const OCR_FAILURE_MARKER: &str = "FAIL";

/// Bag-of-words hashing embedder: texts sharing words score higher.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub embedded_texts: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vectorize(text: &str) -> Embedding {
        let mut values = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2_166_136_261u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16_777_619));
            values[hash as usize % EMBEDDING_DIMENSIONS] += 1.0;
        }
        Embedding::new(values)
    }

    pub fn embedded_count(&self) -> usize {
        self.embedded_texts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }
}

/// Returns one embedding too few, as a misbehaving provider might.
pub struct ShortEmbedder;

#[async_trait::async_trait]
impl Embedder for ShortEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(KeywordEmbedder::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts
            .iter()
            .skip(1)
            .map(|t| KeywordEmbedder::vectorize(t))
            .collect())
    }
}

/// "Transcribes" an image by reading its bytes as UTF-8.
///
/// Files containing [`OCR_FAILURE_MARKER`] fail. Each call sleeps a little,
/// longer for earlier pages, so completions arrive out of order.
pub struct RecordingOcrEngine {
    has_credentials: bool,
    pub calls: AtomicUsize,
    pub transcribed: Mutex<Vec<PathBuf>>,
}

impl RecordingOcrEngine {
    pub fn new() -> Self {
        Self {
            has_credentials: true,
            calls: AtomicUsize::new(0),
            transcribed: Mutex::new(Vec::new()),
        }
    }

    pub fn without_credentials() -> Self {
        Self {
            has_credentials: false,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl OcrEngine for RecordingOcrEngine {
    fn ensure_ready(&self) -> Result<(), OcrError> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(OcrError::MissingCredentials)
        }
    }

    async fn transcribe(&self, image_path: &Path) -> Result<String, OcrError> {
        self.ensure_ready()?;
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let text = tokio::fs::read_to_string(image_path)
            .await
            .map_err(|_| OcrError::FileNotFound(image_path.to_path_buf()))?;

        tokio::time::sleep(Duration::from_millis(30u64.saturating_sub(call as u64 * 10))).await;

        if text.contains(OCR_FAILURE_MARKER) {
            return Err(OcrError::ModelError("unreadable page".to_string()));
        }

        self.transcribed
            .lock()
            .unwrap()
            .push(image_path.to_path_buf());
        Ok(text)
    }
}

/// Stands in for the PDF classifier. Scanned documents get their page
/// images written under `work_dir` the way the real adapter does.
pub enum StubPdfExtractor {
    Native(String),
    Scanned(Vec<String>),
    Failing,
}

#[async_trait::async_trait]
impl PdfExtractor for StubPdfExtractor {
    async fn extract(
        &self,
        pdf_path: &Path,
        work_dir: &Path,
    ) -> Result<ExtractionResult, ExtractionError> {
        assert!(pdf_path.exists(), "PDF must be staged before extraction");

        match self {
            Self::Native(text) => Ok(ExtractionResult::DirectText {
                text: text.clone(),
                page_count: 1,
            }),
            Self::Scanned(pages) => {
                let stem = pdf_path.file_stem().unwrap().to_str().unwrap();
                let dir = work_dir.join(stem);
                std::fs::create_dir_all(&dir).unwrap();
                let images = pages
                    .iter()
                    .enumerate()
                    .map(|(index, text)| {
                        let path = dir.join(format!("page_{}.png", index + 1));
                        std::fs::write(&path, text).unwrap();
                        PageImage::new(index, path)
                    })
                    .collect();
                Ok(ExtractionResult::PageImages(images))
            }
            Self::Failing => Err(ExtractionError::ExtractionFailed(
                "failed to parse PDF".to_string(),
            )),
        }
    }
}

/// Answers with the retrieved context verbatim, so tests can see what was retrieved.
#[derive(Default)]
pub struct ExtractiveLlmClient {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl LlmClient for ExtractiveLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let context = prompt
            .split("Context: ")
            .nth(1)
            .and_then(|rest| rest.split("\nAnswer:").next())
            .unwrap_or_default();
        Ok(format!("  {}  ", context))
    }
}

pub struct FailingLlmClient;

#[async_trait::async_trait]
impl LlmClient for FailingLlmClient {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmClientError> {
        Err(LlmClientError::InferenceFailed("model crashed".to_string()))
    }
}

pub struct SlowLlmClient;

#[async_trait::async_trait]
impl LlmClient for SlowLlmClient {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmClientError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("too late".to_string())
    }
}

/// Token loop on the blocking pool that runs until its caller goes away.
#[derive(Default)]
pub struct BlockingLlmClient {
    abandoned: Arc<AtomicBool>,
}

impl BlockingLlmClient {
    pub fn was_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for BlockingLlmClient {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmClientError> {
        let abandoned = Arc::clone(&self.abandoned);
        docchat::infrastructure::cancellation::spawn_cancellable(move |cancelled| {
            for _ in 0..1_000 {
                if cancelled.is_cancelled() {
                    abandoned.store(true, Ordering::SeqCst);
                    return Err(LlmClientError::InferenceFailed("cancelled".to_string()));
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok("too late".to_string())
        })
        .await
        .map_err(|e| LlmClientError::InferenceFailed(e.to_string()))?
    }
}

pub fn pdf_file(name: &str) -> UploadedFile {
    UploadedFile::new(
        name,
        Some("application/pdf".to_string()),
        Bytes::from_static(b"%PDF-1.4 stub"),
    )
}

pub fn image_file(name: &str, content: &str) -> UploadedFile {
    UploadedFile::new(
        name,
        Some("image/png".to_string()),
        Bytes::from(content.to_string()),
    )
}

pub struct TestHarness {
    pub upload_service: Arc<UploadService>,
    pub registry: Arc<SessionRegistry>,
    pub index_builder: Arc<IndexBuilder>,
    pub ocr: Arc<RecordingOcrEngine>,
    pub embedder: Arc<KeywordEmbedder>,
    pub index_root: PathBuf,
    pub staging_root: PathBuf,
    _base: TempDir,
}

pub struct HarnessOptions {
    pub pdf: StubPdfExtractor,
    pub ocr: RecordingOcrEngine,
    pub llm: Arc<dyn LlmClient>,
    pub max_sessions: usize,
    pub generation_timeout: Duration,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            pdf: StubPdfExtractor::Native(String::new()),
            ocr: RecordingOcrEngine::new(),
            llm: Arc::new(ExtractiveLlmClient::default()),
            max_sessions: 8,
            generation_timeout: Duration::from_secs(5),
        }
    }
}

pub fn harness(options: HarnessOptions) -> TestHarness {
    let base = tempfile::tempdir().unwrap();
    let index_root = base.path().join("vector_store");
    let staging_root = base.path().join("temp_uploads");
    std::fs::create_dir_all(&index_root).unwrap();
    std::fs::create_dir_all(&staging_root).unwrap();

    let embedder = Arc::new(KeywordEmbedder::default());
    let ocr = Arc::new(options.ocr);
    let index_builder = Arc::new(IndexBuilder::new(
        Arc::clone(&embedder) as Arc<dyn Embedder>,
        Arc::new(FlatFileIndexStore::new(index_root.clone())),
        4,
    ));
    let registry = Arc::new(SessionRegistry::new(options.max_sessions));

    let upload_service = Arc::new(UploadService::new(
        Arc::new(options.pdf),
        Arc::clone(&ocr) as Arc<dyn OcrEngine>,
        Arc::new(RecursiveCharacterSplitter::adaptive()),
        Arc::clone(&index_builder),
        options.llm,
        Arc::clone(&registry),
        UploadConfig {
            staging_root: staging_root.clone(),
            ocr_concurrency: 4,
            generation_timeout: options.generation_timeout,
        },
    ));

    TestHarness {
        upload_service,
        registry,
        index_builder,
        ocr,
        embedder,
        index_root,
        staging_root,
        _base: base,
    }
}

pub fn dir_entries(path: &Path) -> usize {
    std::fs::read_dir(path).map(|d| d.count()).unwrap_or(0)
}
