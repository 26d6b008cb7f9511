//! HTTP client for the redaction service

use redline_core::{
    ExtractResponse, FileKind, FileScanResponse, MatchResponse, PatternsResponse, PresetPattern,
    RedactMode, RedactedFile, SelectedFile, resolve_filename,
};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ClientError, Result};

/// File contents plus the metadata needed to upload them
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, kind: FileKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    pub fn from_file(file: &SelectedFile) -> Result<Self> {
        Ok(Self::new(file.name.clone(), file.kind, file.read()?))
    }

    fn part(&self) -> Result<Part> {
        Ok(Part::bytes(self.bytes.clone())
            .file_name(self.name.clone())
            .mime_str(self.kind.mime_type())?)
    }
}

/// Options of `POST /text/detect`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DetectOptions {
    pub run_regex: bool,
    pub run_ner: bool,
}

impl DetectOptions {
    pub fn ner_only() -> Self {
        Self {
            run_regex: false,
            run_ner: true,
        }
    }
}

/// Parameters of a redaction call. Only PDFs use `mode`, `fill` and
/// `patterns`; the XML and legacy endpoints take the bare file.
#[derive(Debug, Clone)]
pub struct RedactRequest {
    pub mode: RedactMode,
    pub fill: String,
    pub patterns: Vec<PresetPattern>,
}

impl Default for RedactRequest {
    fn default() -> Self {
        Self {
            mode: RedactMode::default(),
            fill: "black".to_string(),
            patterns: Vec::new(),
        }
    }
}

/// `{"patterns": [...]}` as the scan and apply endpoints expect it, or
/// `None` to let the server fall back to its own presets.
fn patterns_json(patterns: &[PresetPattern]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }
    Some(json!({ "patterns": patterns }).to_string())
}

#[derive(Clone)]
pub struct RedactionClient {
    http: Client,
    base_url: String,
}

impl RedactionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("redline/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn non-2xx responses into `ClientError::Http` carrying the body text
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        let response = Self::check(response).await?;
        Self::decode(response, path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let response = Self::check(response).await?;
        Self::decode(response, path).await
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Response> {
        debug!("POST {} (multipart)", path);
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::check(response).await
    }

    /// `GET /healthz`
    pub async fn health(&self) -> Result<bool> {
        let body: Value = self.get_json("/healthz").await?;
        Ok(body.get("ok").and_then(Value::as_bool).unwrap_or(false))
    }

    /// `GET /text/rules`
    pub async fn rules(&self) -> Result<Vec<String>> {
        self.get_json("/text/rules").await
    }

    /// `GET /patterns`. A body that does not decode yields no presets.
    pub async fn patterns(&self) -> Result<Vec<PresetPattern>> {
        debug!("GET /patterns");
        let response = self.http.get(self.url("/patterns")).send().await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<PatternsResponse>(&bytes) {
            Ok(body) => Ok(body.patterns),
            Err(e) => {
                warn!("Ignoring undecodable preset list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// `POST /text/extract`
    pub async fn extract(&self, upload: &Upload) -> Result<String> {
        let form = Form::new().part("file", upload.part()?);
        let response = self.post_form("/text/extract", form).await?;
        let body: ExtractResponse = Self::decode(response, "/text/extract").await?;
        Ok(body.full_text)
    }

    /// `POST /text/match`
    pub async fn match_text(&self, text: &str, rules: &[String]) -> Result<MatchResponse> {
        let body = json!({ "text": text, "rules": rules, "normalize": true });
        self.post_json("/text/match", &body).await
    }

    /// `POST /text/ner`, raw payload
    pub async fn ner(&self, text: &str) -> Result<Value> {
        self.post_json("/text/ner", &json!({ "text": text })).await
    }

    /// `POST /text/detect`, raw payload
    pub async fn detect(&self, text: &str, options: DetectOptions) -> Result<Value> {
        self.post_json("/text/detect", &json!({ "text": text, "options": options }))
            .await
    }

    /// `POST /redactions/pdf/scan` or `POST /redactions/xml/scan`
    pub async fn scan_file(
        &self,
        upload: &Upload,
        patterns: &[PresetPattern],
    ) -> Result<FileScanResponse> {
        let (path, form) = match upload.kind {
            FileKind::Pdf => {
                let mut form = Form::new().part("file", upload.part()?);
                if let Some(patterns) = patterns_json(patterns) {
                    form = form.text("patterns_json", patterns);
                }
                ("/redactions/pdf/scan", form)
            }
            FileKind::Xml(_) => (
                "/redactions/xml/scan",
                Form::new().part("file", upload.part()?),
            ),
            FileKind::Legacy(_) => {
                return Err(ClientError::Unsupported(format!(
                    "no file scan endpoint for .{} files",
                    upload.kind
                )));
            }
        };

        let response = self.post_form(path, form).await?;
        Self::decode(response, path).await
    }

    /// Redact the file on the server and fetch the result.
    ///
    /// PDFs go to `/redactions/apply`, XML formats to `/redactions/xml/apply`
    /// and legacy formats to `/redact/file`.
    pub async fn redact(&self, upload: &Upload, request: &RedactRequest) -> Result<RedactedFile> {
        let (path, form) = match upload.kind {
            FileKind::Pdf => {
                let mut form = Form::new()
                    .part("file", upload.part()?)
                    .text("mode", request.mode.as_str())
                    .text("fill", request.fill.clone());
                if let Some(patterns) = patterns_json(&request.patterns) {
                    form = form.text("patterns_json", patterns);
                }
                ("/redactions/apply", form)
            }
            FileKind::Xml(_) => (
                "/redactions/xml/apply",
                Form::new().part("file", upload.part()?),
            ),
            FileKind::Legacy(_) => ("/redact/file", Form::new().part("file", upload.part()?)),
        };

        let response = self.post_form(path, form).await?;
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await?;

        let filename = resolve_filename(disposition.as_deref(), &upload.name);
        debug!("Redacted {} -> {} ({} bytes)", upload.name, filename, bytes.len());
        Ok(RedactedFile::new(filename, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_json_shape() {
        assert_eq!(patterns_json(&[]), None);

        let json = patterns_json(&[PresetPattern::named("email")]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["patterns"][0]["name"], "email");
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = RedactionClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/text/rules"), "http://localhost:8000/text/rules");
    }

    #[test]
    fn test_detect_options_wire_form() {
        let value = serde_json::to_value(DetectOptions::ner_only()).unwrap();
        assert_eq!(value, json!({ "run_regex": false, "run_ner": true }));
    }
}
