mod chunk;
mod chunking_policy;
mod document;
mod document_text;
mod embedding;
mod extraction;
mod session_id;
mod storage_path;

pub use chunk::{Chunk, ChunkId};
pub use chunking_policy::ChunkingPolicy;
pub use document::{ContentType, UploadedFile};
pub use document_text::{DocumentText, PAGE_BREAK_MARKER, PageText};
pub use embedding::Embedding;
pub use extraction::{ExtractionResult, PageImage};
pub use session_id::SessionId;
pub use storage_path::SessionStoragePath;
