use axum::Router;
use axum::extract::Json;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

async fn redline(dir: &Path, api_base: &str, args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_redline"))
        .current_dir(dir)
        .env_remove("API_BASE")
        .env_remove("HWPX_VIEWER_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--api-base")
        .arg(api_base)
        .args(args)
        .output()
        .await
        .unwrap()
}

fn patterns(router: Router) -> Router {
    router.route(
        "/patterns",
        get(|| async { Json(json!({"patterns": [{"name": "email", "regex": ".+@.+"}]})) }),
    )
}

#[tokio::test]
async fn test_pdf_scan_and_save() {
    let app = patterns(Router::new())
        .route(
            "/redactions/pdf/scan",
            post(|| async {
                Json(json!({
                    "extracted_text": "contact user@example.com",
                    "matches": [{
                        "rule": "email",
                        "value": "user@example.com",
                        "valid": true,
                        "location": {"start": 8, "end": 24},
                        "page": 1
                    }]
                }))
            }),
        )
        .route(
            "/redactions/apply",
            post(|| async {
                (
                    [(
                        header::CONTENT_DISPOSITION,
                        "attachment; filename*=UTF-8''%EC%98%88%EC%A0%9C.pdf",
                    )],
                    b"%PDF-clean".to_vec(),
                )
                    .into_response()
            }),
        );
    let api = spawn(app).await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.7").unwrap();

    let output = redline(
        dir.path(),
        &api,
        &["scan", "report.pdf", "--no-ner", "--save", "-o", "out", "--format", "json"],
    )
    .await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["source"], "file");
    assert_eq!(body["counts"]["email"], 1);
    assert_eq!(body["redacted"]["filename"], "예제.pdf");
    assert!(body["viewer_url"].is_null());

    let saved: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(saved, vec!["예제.pdf"]);
    assert_eq!(
        std::fs::read(dir.path().join("out/예제.pdf")).unwrap(),
        b"%PDF-clean"
    );
}

#[tokio::test]
async fn test_hwpx_save_links_viewer() {
    let app = patterns(Router::new())
        .route(
            "/text/extract",
            post(|| async { Json(json!({"full_text": "nothing"})) }),
        )
        .route("/text/match", post(|| async { Json(json!({"items": []})) }))
        .route("/redactions/xml/apply", post(|| async { b"PK".to_vec() }));
    let api = spawn(app).await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("memo.hwpx"), b"PK").unwrap();

    let output = redline(
        dir.path(),
        &api,
        &[
            "--viewer-url",
            "http://viewer.local/",
            "scan",
            "memo.hwpx",
            "--no-ner",
            "--save",
            "--format",
            "json",
        ],
    )
    .await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["source"], "text");
    let url = body["viewer_url"].as_str().unwrap();
    assert!(url.starts_with("http://viewer.local/?file=file%3A%2F%2F"));
    assert!(url.ends_with("memo.redacted.hwpx"));
    assert!(dir.path().join("memo.redacted.hwpx").exists());
}

#[tokio::test]
async fn test_failed_step_exits_nonzero() {
    let app = patterns(Router::new()).route(
        "/text/extract",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "extractor crashed") }),
    );
    let api = spawn(app).await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("memo.docx"), b"PK").unwrap();

    let output = redline(dir.path(), &api, &["scan", "memo.docx", "--save"]).await;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTP 500"), "{}", stderr);
    assert!(stderr.contains("extractor crashed"), "{}", stderr);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_unsupported_file_rejected_before_network() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let output = redline(dir.path(), "http://127.0.0.1:9", &["scan", "notes.txt"]).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("notes.txt"));
}
