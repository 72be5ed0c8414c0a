use docchat::presentation::config::{EmbeddingProvider, LlmProvider, Settings};
use docchat::presentation::Environment;

#[test]
fn given_no_configuration_then_defaults_match_documented_values() {
    let settings = Settings::default();

    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.server.max_upload_mb, 50);
    assert!(settings.server.allowed_origins.is_empty());
    assert_eq!(settings.ocr.concurrency, 4);
    assert_eq!(settings.ocr.timeout_secs, 120);
    assert_eq!(settings.retrieval.top_k, 4);
    assert_eq!(settings.sessions.max_sessions, 64);
    assert_eq!(settings.llm.context_window, 2048);
    assert_eq!(settings.llm.max_tokens, 512);
    assert!((settings.llm.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(settings.llm.provider, LlmProvider::Local);
    assert_eq!(settings.embeddings.provider, EmbeddingProvider::Local);
    assert_eq!(
        settings.embeddings.model,
        "sentence-transformers/all-MiniLM-L6-v2"
    );
}

#[test]
fn given_partial_toml_when_deserializing_then_missing_fields_use_defaults() {
    let configuration = config::Config::builder()
        .add_source(config::File::from_str(
            "[server]\nport = 9000\n\n[llm]\nprovider = \"openai\"\nchat_model = \"gpt-4o\"\n",
            config::FileFormat::Toml,
        ))
        .build()
        .unwrap();

    let settings: Settings = configuration.try_deserialize().unwrap();

    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.max_upload_mb, 50);
    assert_eq!(settings.llm.provider, LlmProvider::OpenAi);
    assert_eq!(settings.llm.chat_model, "gpt-4o");
    assert_eq!(settings.llm.max_tokens, 512);
    assert_eq!(settings.retrieval.top_k, 4);
}

#[test]
fn given_environment_names_when_parsing_then_case_insensitive() {
    assert_eq!(
        Environment::try_from("LOCAL".to_string()).unwrap(),
        Environment::Local
    );
    assert_eq!(
        Environment::try_from("production".to_string()).unwrap(),
        Environment::Prod
    );
    assert_eq!(Environment::Test.file_stem(), "test");
    assert!(Environment::try_from("staging".to_string()).is_err());
}
