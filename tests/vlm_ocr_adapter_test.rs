use std::time::Duration;

use docchat::application::ports::{OcrEngine, OcrError};
use docchat::infrastructure::text_processing::{OCR_PROMPT, VlmOcrAdapter};

const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9/v1";
const TEST_MODEL: &str = "test-vision-model";

fn adapter(api_key: Option<&str>) -> VlmOcrAdapter {
    VlmOcrAdapter::new(
        UNREACHABLE_BASE_URL,
        TEST_MODEL,
        api_key.map(str::to_string),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[test]
fn given_no_api_key_when_checking_readiness_then_missing_credentials() {
    assert!(matches!(
        adapter(None).ensure_ready(),
        Err(OcrError::MissingCredentials)
    ));
}

#[test]
fn given_blank_api_key_when_checking_readiness_then_missing_credentials() {
    assert!(matches!(
        adapter(Some("   ")).ensure_ready(),
        Err(OcrError::MissingCredentials)
    ));
    assert!(adapter(Some("key")).ensure_ready().is_ok());
}

#[tokio::test]
async fn given_no_api_key_when_transcribing_then_fails_without_reading_image() {
    let result = adapter(None)
        .transcribe(std::path::Path::new("/definitely/missing.png"))
        .await;

    assert!(matches!(result, Err(OcrError::MissingCredentials)));
}

#[tokio::test]
async fn given_missing_image_when_transcribing_then_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("page_1.png");

    let result = adapter(Some("key")).transcribe(&missing).await;

    match result {
        Err(OcrError::FileNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected FileNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn given_unreachable_endpoint_when_transcribing_then_transport_failure() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("page_1.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let result = adapter(Some("key")).transcribe(&image).await;

    let err = result.unwrap_err();
    assert!(matches!(err, OcrError::TransportFailure(_)));
    assert!(err.is_retryable());
}

#[test]
fn given_ocr_prompt_then_it_asks_for_markdown_without_fences() {
    assert!(OCR_PROMPT.contains("Markdown"));
    assert!(OCR_PROMPT.contains("code fences"));
    assert!(OCR_PROMPT.contains("headers, footers"));
}
