mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    EmbeddingProvider, EmbeddingsSettings, LlmProvider, LlmSettings, OcrSettings,
    RetrievalSettings, ServerSettings, SessionSettings, Settings, StorageSettings,
};
