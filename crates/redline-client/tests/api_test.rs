use axum::Router;
use axum::extract::{Json, Multipart};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use redline_client::{
    ClientError, DedicatedNer, DetectNer, NerChain, RedactRequest, RedactionClient, Upload,
};
use redline_core::{FileKind, LegacyFormat, PresetPattern, RedactMode, XmlFormat};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn spawn(app: Router) -> RedactionClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    RedactionClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
}

/// Collect the text fields of a multipart body, skipping the file part
async fn text_fields(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let _ = field.bytes().await.unwrap();
            continue;
        }
        fields.push((name, field.text().await.unwrap()));
    }
    fields
}

#[tokio::test]
async fn test_rules_and_patterns() {
    let app = Router::new()
        .route("/text/rules", get(|| async { Json(json!(["rrn", "email"])) }))
        .route(
            "/patterns",
            get(|| async {
                Json(json!({"patterns": [{"name": "rrn", "regex": "\\d{6}-\\d{7}"}]}))
            }),
        );
    let client = spawn(app).await;

    assert_eq!(client.rules().await.unwrap(), vec!["rrn", "email"]);

    let presets = client.patterns().await.unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0].regex(), Some("\\d{6}-\\d{7}"));
}

#[tokio::test]
async fn test_undecodable_patterns_are_empty() {
    let app = Router::new().route("/patterns", get(|| async { "<html>oops</html>" }));
    let client = spawn(app).await;

    assert!(client.patterns().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let app = Router::new().route(
        "/text/extract",
        post(|| async { (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported format: .xyz") }),
    );
    let client = spawn(app).await;
    let upload = Upload::new("a.pdf", FileKind::Pdf, b"%PDF".to_vec());

    let err = client.extract(&upload).await.unwrap_err();
    assert_eq!(err.status(), Some(415));
    assert_eq!(err.to_string(), "HTTP 415: unsupported format: .xyz");
}

#[tokio::test]
async fn test_match_request_body() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let app = Router::new().route(
        "/text/match",
        post({
            let seen = seen.clone();
            move |Json(body): Json<Value>| async move {
                *seen.lock().unwrap() = Some(body);
                Json(json!({
                    "items": [{"rule": "email", "value": "a@b.co", "valid": true, "index": 0, "end": 6, "context": ""}],
                    "counts": {"email": 1}
                }))
            }
        }),
    );
    let client = spawn(app).await;

    let response = client
        .match_text("a@b.co", &["email".to_string()])
        .await
        .unwrap();
    assert_eq!(response.counts["email"], 1);
    assert_eq!(response.items[0].location.map(|l| l.end), Some(6));

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"text": "a@b.co", "rules": ["email"], "normalize": true}));
}

#[tokio::test]
async fn test_pdf_redaction_fields_and_filename() {
    let fields: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
    let app = Router::new().route(
        "/redactions/apply",
        post({
            let fields = fields.clone();
            move |multipart: Multipart| async move {
                let collected = text_fields(multipart).await;
                *fields.lock().unwrap() = collected;
                (
                    [(
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"redacted_1.pdf\"; filename*=UTF-8''%EC%98%88%EC%A0%9C.pdf",
                    )],
                    b"%PDF-redacted".to_vec(),
                )
                    .into_response()
            }
        }),
    );
    let client = spawn(app).await;
    let upload = Upload::new("source.pdf", FileKind::Pdf, b"%PDF".to_vec());
    let request = RedactRequest {
        mode: RedactMode::Strict,
        fill: "white".to_string(),
        patterns: vec![PresetPattern::named("card")],
    };

    let redacted = client.redact(&upload, &request).await.unwrap();
    assert_eq!(redacted.filename, "예제.pdf");
    assert_eq!(redacted.bytes, b"%PDF-redacted");

    let fields = fields.lock().unwrap().clone();
    assert!(fields.contains(&("mode".to_string(), "strict".to_string())));
    assert!(fields.contains(&("fill".to_string(), "white".to_string())));
    let patterns = fields
        .iter()
        .find(|(name, _)| name == "patterns_json")
        .map(|(_, v)| serde_json::from_str::<Value>(v).unwrap())
        .unwrap();
    assert_eq!(patterns["patterns"][0]["name"], "card");
}

#[tokio::test]
async fn test_redaction_routes_by_kind() {
    let app = Router::new()
        .route("/redactions/xml/apply", post(|| async { b"xml".to_vec() }))
        .route("/redact/file", post(|| async { b"legacy".to_vec() }));
    let client = spawn(app).await;

    let hwpx = Upload::new("보고서.hwpx", FileKind::Xml(XmlFormat::Hwpx), b"PK".to_vec());
    let redacted = client.redact(&hwpx, &RedactRequest::default()).await.unwrap();
    assert_eq!(redacted.bytes, b"xml");
    assert_eq!(redacted.filename, "보고서.redacted.hwpx");

    let doc = Upload::new("memo.doc", FileKind::Legacy(LegacyFormat::Doc), vec![0xD0, 0xCF]);
    let redacted = client.redact(&doc, &RedactRequest::default()).await.unwrap();
    assert_eq!(redacted.bytes, b"legacy");
    assert_eq!(redacted.filename, "memo.redacted.doc");
}

#[tokio::test]
async fn test_legacy_file_scan_unsupported() {
    let client = spawn(Router::new()).await;
    let doc = Upload::new("memo.hwp", FileKind::Legacy(LegacyFormat::Hwp), vec![1]);

    let err = client.scan_file(&doc, &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Unsupported(_)));
}

#[tokio::test]
async fn test_ner_prefers_dedicated_endpoint() {
    let app = Router::new()
        .route(
            "/text/ner",
            post(|| async { Json(json!({"items": [{"label": "PS", "text": "홍길동", "start": 0, "end": 3}]})) }),
        )
        .route(
            "/text/detect",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "should not be called") }),
        );
    let client = spawn(app).await;

    let outcome = NerChain::default().run(&client, "홍길동 입니다").await.unwrap();
    assert_eq!(outcome.strategy, Some("ner"));
    assert_eq!(outcome.items.len(), 1);
}

#[tokio::test]
async fn test_ner_falls_back_to_detect() {
    let options: Arc<Mutex<Option<Value>>> = Arc::default();
    let app = Router::new()
        .route(
            "/text/ner",
            post(|| async { (StatusCode::NOT_FOUND, "Not Found") }),
        )
        .route(
            "/text/detect",
            post({
                let options = options.clone();
                move |Json(body): Json<Value>| async move {
                    *options.lock().unwrap() = Some(body["options"].clone());
                    Json(json!({
                        "final_spans": [{"start": 0, "end": 2, "label": "LC", "source": "ner", "score": 0.8}]
                    }))
                }
            }),
        );
    let client = spawn(app).await;

    let outcome = NerChain::default().run(&client, "서울 방문").await.unwrap();
    assert_eq!(outcome.strategy, Some("detect"));
    assert_eq!(outcome.items[0].text, "서울");
    assert_eq!(
        options.lock().unwrap().clone().unwrap(),
        json!({"run_regex": false, "run_ner": true})
    );
}

#[tokio::test]
async fn test_ner_empty_answer_falls_through_to_empty() {
    let app = Router::new()
        .route("/text/ner", post(|| async { Json(json!([])) }))
        .route(
            "/text/detect",
            post(|| async { (StatusCode::BAD_GATEWAY, "model offline") }),
        );
    let client = spawn(app).await;

    let outcome = NerChain::default().run(&client, "text").await.unwrap();
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.strategy, None);
}

#[tokio::test]
async fn test_ner_all_failed_reports_last_error() {
    let app = Router::new()
        .route("/text/ner", post(|| async { (StatusCode::NOT_FOUND, "Not Found") }))
        .route(
            "/text/detect",
            post(|| async { (StatusCode::BAD_GATEWAY, "model offline") }),
        );
    let client = spawn(app).await;

    let chain = NerChain::new(vec![Box::new(DedicatedNer), Box::new(DetectNer)]);
    assert_eq!(chain.strategy_names(), vec!["ner", "detect"]);

    let err = chain.run(&client, "text").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}
