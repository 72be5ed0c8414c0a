mod helpers;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use docchat::presentation::config::ServerSettings;
use docchat::presentation::handlers::SESSION_NOT_FOUND_DETAIL;
use docchat::presentation::{AppState, create_router};
use helpers::{FailingLlmClient, HarnessOptions, StubPdfExtractor, TestHarness, harness};

const BOUNDARY: &str = "docchat-test-boundary";

fn router_for(h: &TestHarness) -> Router {
    let state = AppState {
        upload_service: Arc::clone(&h.upload_service),
        registry: Arc::clone(&h.registry),
    };
    create_router(state, &ServerSettings::default())
}

fn multipart_request(files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, mime, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn ask_request(session_id: &str, question: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "session_id": session_id, "question": question }).to_string(),
        ))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_running_app_when_calling_health_then_healthy() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn given_running_app_when_calling_root_then_banner_message() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["message"],
        "DocChat backend is running"
    );
}

#[tokio::test]
async fn given_native_pdf_when_uploading_and_asking_then_answer_is_returned() {
    let h = harness(HarnessOptions {
        pdf: StubPdfExtractor::Native("The capital of France is Paris.".to_string()),
        ..Default::default()
    });
    let router = router_for(&h);

    let upload = router
        .clone()
        .oneshot(multipart_request(&[("atlas.pdf", "application/pdf", "%PDF-1.4")]))
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::OK);
    let upload_body = json_body(upload).await;
    assert_eq!(upload_body["detail"], "Files processed successfully.");
    let session_id = upload_body["session_id"].as_str().unwrap().to_string();

    let ask = router
        .oneshot(ask_request(&session_id, "What is the capital of France?"))
        .await
        .unwrap();

    assert_eq!(ask.status(), StatusCode::OK);
    assert!(
        json_body(ask).await["answer"]
            .as_str()
            .unwrap()
            .contains("Paris")
    );
}

#[tokio::test]
async fn given_only_plain_form_fields_when_uploading_then_bad_request() {
    let h = harness(HarnessOptions::default());
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router_for(&h).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["detail"].is_string());
}

#[tokio::test]
async fn given_unsupported_file_when_uploading_then_bad_request() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(multipart_request(&[("notes.txt", "text/plain", "hello")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("notes.txt"));
}

#[tokio::test]
async fn given_blank_document_when_uploading_then_bad_request() {
    let h = harness(HarnessOptions {
        pdf: StubPdfExtractor::Native("   ".to_string()),
        ..Default::default()
    });

    let response = router_for(&h)
        .oneshot(multipart_request(&[("blank.pdf", "application/pdf", "%PDF")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_ocr_failure_when_uploading_then_internal_error() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(multipart_request(&[("scan.png", "image/png", "FAIL")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("page 1"));
}

#[tokio::test]
async fn given_unknown_session_when_asking_then_not_found() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(ask_request(
            "00000000-0000-4000-8000-000000000000",
            "Anything?",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["detail"], SESSION_NOT_FOUND_DETAIL);
}

#[tokio::test]
async fn given_malformed_session_id_when_asking_then_not_found() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(ask_request("garbage", "Anything?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_empty_question_when_asking_then_bad_request() {
    let h = harness(HarnessOptions {
        pdf: StubPdfExtractor::Native("Some text.".to_string()),
        ..Default::default()
    });
    let outcome = h
        .upload_service
        .upload(vec![helpers::pdf_file("doc.pdf")])
        .await
        .unwrap();

    let response = router_for(&h)
        .oneshot(ask_request(&outcome.session_id.to_string(), "  "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_generation_failure_when_asking_then_internal_error() {
    let h = harness(HarnessOptions {
        pdf: StubPdfExtractor::Native("Some text.".to_string()),
        llm: Arc::new(FailingLlmClient),
        ..Default::default()
    });
    let outcome = h
        .upload_service
        .upload(vec![helpers::pdf_file("doc.pdf")])
        .await
        .unwrap();

    let response = router_for(&h)
        .oneshot(ask_request(&outcome.session_id.to_string(), "Anything?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body.get("answer").is_none());
}

#[tokio::test]
async fn given_response_when_handled_then_request_id_header_is_set() {
    let h = harness(HarnessOptions::default());

    let response = router_for(&h)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
