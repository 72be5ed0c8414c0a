mod index_builder;
mod qa_engine;
mod session_registry;
mod upload_service;
mod upload_workspace;

pub use index_builder::{IndexBuilder, IndexingError, RetrievalError, SessionRetriever};
pub use qa_engine::{AskError, Answer, QaEngine, RAG_PROMPT_TEMPLATE, build_prompt};
pub use session_registry::SessionRegistry;
pub use upload_service::{UploadConfig, UploadError, UploadOutcome, UploadService};
pub use upload_workspace::UploadWorkspace;
