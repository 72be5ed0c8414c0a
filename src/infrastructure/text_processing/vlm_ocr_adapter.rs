use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{OcrEngine, OcrError};
use crate::domain::ContentType;

pub const OCR_PROMPT: &str = "Convert the provided image into Markdown format. \
Ensure that all content from the page is included, such as headers, footers, subtexts, \
images (with alt text if possible), tables, captions, and any other elements.\n\
\n\
Requirements:\n\
- Output Only Markdown: Return only the Markdown content without extra explanations or commentary.\n\
- No Delimiters: Do not use code fences like ```markdown.\n\
- Complete Content: Include all parts of the page (headers, footers, etc.).";

const OCR_MAX_TOKENS: u32 = 4096;

/// OCR through an OpenAI-compatible vision chat endpoint (Together AI by default).
pub struct VlmOcrAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl VlmOcrAdapter {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::TransportFailure(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn api_key(&self) -> Result<&str, OcrError> {
        self.api_key.as_deref().ok_or(OcrError::MissingCredentials)
    }

    async fn encode_image(image_path: &Path) -> Result<String, OcrError> {
        let bytes = tokio::fs::read(image_path).await.map_err(|e| {
            tracing::warn!(error = %e, path = %image_path.display(), "Cannot read OCR input");
            OcrError::FileNotFound(image_path.to_path_buf())
        })?;

        let mime = ContentType::from_extension(image_path)
            .filter(ContentType::is_image)
            .map(|ct| ct.as_mime())
            .unwrap_or("image/png");

        let b64 = general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:{mime};base64,{b64}"))
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl OcrEngine for VlmOcrAdapter {
    fn ensure_ready(&self) -> Result<(), OcrError> {
        self.api_key().map(|_| ())
    }

    #[tracing::instrument(skip(self), fields(image = %image_path.display(), model = %self.model))]
    async fn transcribe(&self, image_path: &Path) -> Result<String, OcrError> {
        let api_key = self.api_key()?;
        let data_uri = Self::encode_image(image_path).await?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": OCR_PROMPT
                        },
                        {
                            "type": "image_url",
                            "image_url": { "url": data_uri }
                        }
                    ]
                }
            ],
            "max_tokens": OCR_MAX_TOKENS,
            "temperature": 0.0,
            "stream": false
        });

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::TransportFailure(format!("request to {url}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OcrError::TransportFailure(format!(
                "OCR endpoint returned {status}: {text}"
            )));
        }

        let raw_bytes = response
            .bytes()
            .await
            .map_err(|e| OcrError::TransportFailure(format!("reading OCR response: {e}")))?;

        let completion: ChatCompletion = serde_json::from_slice(&raw_bytes).map_err(|e| {
            tracing::error!(
                raw_response = %String::from_utf8_lossy(&raw_bytes),
                "Failed to parse OCR response"
            );
            OcrError::ModelError(format!("unparseable OCR response: {e}"))
        })?;

        let markdown = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OcrError::ModelError("response carried no content".to_string()))?;

        tracing::debug!(chars = markdown.chars().count(), "Page transcribed");

        Ok(markdown)
    }
}
