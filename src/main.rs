use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use docchat::application::services::{
    IndexBuilder, SessionRegistry, UploadConfig, UploadService,
};
use docchat::infrastructure::llm::{EmbedderFactory, LlmFactory};
use docchat::infrastructure::observability::{TracingConfig, init_tracing};
use docchat::infrastructure::persistence::FlatFileIndexStore;
use docchat::infrastructure::storage::reset_storage;
use docchat::infrastructure::text_processing::{
    PdfAdapter, RecursiveCharacterSplitter, VlmOcrAdapter,
};
use docchat::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_env(environment));

    reset_storage(&settings.storage.index_root, &settings.storage.staging_root)
        .context("Failed to reset storage roots")?;

    if settings.ocr.api_key.as_deref().is_none_or(str::is_empty) {
        tracing::warn!("No OCR API key configured; scanned documents and images will be rejected");
    }

    let embedder = EmbedderFactory::create(&settings.embeddings)?;
    let llm_client = LlmFactory::create(&settings.llm)?;

    let ocr_engine = Arc::new(VlmOcrAdapter::new(
        &settings.ocr.base_url,
        &settings.ocr.model,
        settings.ocr.api_key.clone(),
        Duration::from_secs(settings.ocr.timeout_secs),
    )?);

    let index_builder = Arc::new(IndexBuilder::new(
        embedder,
        Arc::new(FlatFileIndexStore::new(settings.storage.index_root.clone())),
        settings.retrieval.top_k,
    ));

    let registry = Arc::new(SessionRegistry::new(settings.sessions.max_sessions));

    let upload_service = Arc::new(UploadService::new(
        Arc::new(PdfAdapter::new()),
        ocr_engine,
        Arc::new(RecursiveCharacterSplitter::adaptive()),
        index_builder,
        llm_client,
        Arc::clone(&registry),
        UploadConfig {
            staging_root: settings.storage.staging_root.clone(),
            ocr_concurrency: settings.ocr.concurrency,
            generation_timeout: Duration::from_secs(settings.llm.timeout_secs),
        },
    ));

    let state = AppState {
        upload_service,
        registry,
    };

    let router = create_router(state, &settings.server);

    let host: std::net::IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server.host: {}", settings.server.host))?;
    let addr = SocketAddr::from((host, settings.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
