mod embedder;
mod llm_factory;
mod local_llama_client;
mod openai_client;

pub use embedder::{EmbedderFactory, EmbedderFactoryError, LocalCandleEmbedder, OpenAiEmbedder};
pub use llm_factory::{LlmFactory, LlmFactoryError};
pub use local_llama_client::{GenerationParams, LocalLlamaClient};
pub use openai_client::OpenAiClient;
