use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_llama::ModelWeights;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::infrastructure::cancellation::{CancellationFlag, spawn_cancellable};

const SAMPLING_SEED: u64 = 299_792_458;
const EOS_TOKEN: &str = "</s>";

/// Fixed inference parameters applied to every generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub context_window: usize,
    pub max_tokens: usize,
    pub temperature: f64,
}

/// Quantized GGUF Llama loaded once and shared by every session.
///
/// The weights sit behind a mutex because the KV cache lives inside the
/// model, so concurrent asks queue up here.
pub struct LocalLlamaClient {
    model: Arc<Mutex<ModelWeights>>,
    tokenizer: Arc<Tokenizer>,
    device: Arc<Device>,
    params: GenerationParams,
}

impl LocalLlamaClient {
    pub fn new(
        model_repo: &str,
        model_file: &str,
        tokenizer_repo: &str,
        params: GenerationParams,
    ) -> Result<Self, LlmClientError> {
        let device = Device::new_metal(0).unwrap_or(Device::Cpu);
        let started = Instant::now();

        tracing::info!(
            model_repo,
            model_file,
            device = ?device,
            "Loading local language model"
        );

        let api = Api::new()
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("hf-hub init failed: {e}")))?;

        let model_path = api
            .repo(Repo::new(model_repo.to_string(), RepoType::Model))
            .get(model_file)
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("{model_file}: {e}")))?;
        let tokenizer_path = api
            .repo(Repo::new(tokenizer_repo.to_string(), RepoType::Model))
            .get("tokenizer.json")
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("tokenizer.json: {e}")))?;

        let mut file = std::fs::File::open(&model_path)
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("open weights: {e}")))?;
        let content = gguf_file::Content::read(&mut file)
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("read gguf: {e}")))?;
        let model = ModelWeights::from_gguf(content, &mut file, &device)
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("model init: {e}")))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| LlmClientError::ModelLoadFailed(format!("tokenizer: {e}")))?;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Local language model loaded"
        );

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            tokenizer: Arc::new(tokenizer),
            device: Arc::new(device),
            params,
        })
    }
}

fn run_generation(
    model: &Mutex<ModelWeights>,
    tokenizer: &Tokenizer,
    device: &Device,
    params: GenerationParams,
    prompt: &str,
    cancelled: &CancellationFlag,
) -> Result<String, LlmClientError> {
    let encoding = tokenizer
        .encode(prompt, true)
        .map_err(|e| LlmClientError::InferenceFailed(format!("tokenize: {e}")))?;
    let prompt_tokens: Vec<u32> = encoding.get_ids().to_vec();

    let budget = params.context_window.saturating_sub(params.max_tokens);
    if prompt_tokens.len() > budget {
        return Err(LlmClientError::InferenceFailed(format!(
            "prompt of {} tokens exceeds the {} token budget",
            prompt_tokens.len(),
            budget
        )));
    }

    let eos_token = tokenizer.token_to_id(EOS_TOKEN);
    let mut logits_processor =
        LogitsProcessor::new(SAMPLING_SEED, Some(params.temperature), None);

    let mut model_guard = model.blocking_lock();
    if cancelled.is_cancelled() {
        return Err(generation_cancelled());
    }

    let input = Tensor::new(prompt_tokens.as_slice(), device)
        .and_then(|t| t.unsqueeze(0))
        .map_err(|e| LlmClientError::InferenceFailed(format!("prompt tensor: {e}")))?;
    let mut next_token = model_guard
        .forward(&input, 0)
        .and_then(|l| l.squeeze(0))
        .and_then(|l| logits_processor.sample(&l))
        .map_err(|e| LlmClientError::InferenceFailed(format!("prompt forward: {e}")))?;

    let mut generated: Vec<u32> = Vec::with_capacity(params.max_tokens);

    for index in 0..params.max_tokens {
        if cancelled.is_cancelled() {
            tracing::debug!(generated_tokens = generated.len(), "Generation abandoned by caller");
            return Err(generation_cancelled());
        }
        if Some(next_token) == eos_token {
            break;
        }
        generated.push(next_token);

        if index + 1 == params.max_tokens {
            break;
        }

        let input = Tensor::new(&[next_token], device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| LlmClientError::InferenceFailed(format!("token tensor: {e}")))?;
        next_token = model_guard
            .forward(&input, prompt_tokens.len() + index)
            .and_then(|l| l.squeeze(0))
            .and_then(|l| logits_processor.sample(&l))
            .map_err(|e| LlmClientError::InferenceFailed(format!("forward: {e}")))?;
    }

    drop(model_guard);

    tracing::debug!(
        prompt_tokens = prompt_tokens.len(),
        generated_tokens = generated.len(),
        "Generation finished"
    );

    tokenizer
        .decode(&generated, true)
        .map(|text| text.trim().to_string())
        .map_err(|e| LlmClientError::InferenceFailed(format!("decode: {e}")))
}

fn generation_cancelled() -> LlmClientError {
    LlmClientError::InferenceFailed("generation cancelled".to_string())
}

#[async_trait]
impl LlmClient for LocalLlamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmClientError> {
        let model = Arc::clone(&self.model);
        let tokenizer = Arc::clone(&self.tokenizer);
        let device = Arc::clone(&self.device);
        let params = self.params;
        let prompt = prompt.to_string();

        spawn_cancellable(move |cancelled| {
            run_generation(&model, &tokenizer, &device, params, &prompt, cancelled)
        })
        .await
        .map_err(|e| LlmClientError::InferenceFailed(format!("task join error: {e}")))?
    }
}
