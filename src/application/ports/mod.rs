mod embedder;
mod llm_client;
mod ocr_engine;
mod pdf_extractor;
mod search_result;
mod text_splitter;
mod vector_index;
mod vector_index_error;

pub use embedder::{Embedder, EmbedderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use ocr_engine::{OcrEngine, OcrError};
pub use pdf_extractor::{ExtractionError, PdfExtractor};
pub use search_result::SearchResult;
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use vector_index::{VectorIndex, VectorIndexStore};
pub use vector_index_error::VectorIndexError;
