use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character offsets of a match inside the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A single regex rule hit reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireMatch")]
pub struct Match {
    pub rule: String,
    pub value: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<f64>,
}

impl Match {
    pub fn new(rule: impl Into<String>, value: impl Into<String>, valid: bool) -> Self {
        Self {
            rule: rule.into(),
            value: value.into(),
            valid,
            context: None,
            location: None,
            page: None,
        }
    }

    pub fn with_location(mut self, start: usize, end: usize) -> Self {
        self.location = Some(Location::new(start, end));
        self
    }

    pub fn with_page(mut self, page: f64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// PDF matches are only usable when they carry a finite page number
    pub fn has_page(&self) -> bool {
        self.page.is_some_and(f64::is_finite)
    }
}

/// Server builds disagree on where offsets live: text matching reports
/// `index`/`end`, file scans nest them in `location` (sometimes with nulls).
#[derive(Debug, Deserialize)]
struct WireMatch {
    #[serde(default)]
    rule: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    location: Option<WireLocation>,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    page: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

impl From<WireMatch> for Match {
    fn from(wire: WireMatch) -> Self {
        let nested = wire
            .location
            .and_then(|loc| Some(Location::new(loc.start?, loc.end?)));
        let flat = wire
            .index
            .or(wire.start)
            .zip(wire.end)
            .map(|(start, end)| Location::new(start, end));

        Self {
            rule: wire.rule,
            value: wire.value.unwrap_or_default(),
            valid: wire.valid.unwrap_or(false),
            context: wire.context,
            location: nested.or(flat),
            page: wire.page,
        }
    }
}

/// Response of `POST /text/match`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub items: Vec<Match>,
    #[serde(default)]
    pub counts: BTreeMap<String, usize>,
}

/// Response of `POST /text/extract`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(default, alias = "text")]
    pub full_text: String,
}

/// Response of `POST /redactions/pdf/scan` and `POST /redactions/xml/scan`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileScanResponse {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub total_matches: Option<usize>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// A named entity recognized in the extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerItem {
    #[serde(alias = "entity")]
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub start: usize,
    pub end: usize,
}

impl NerItem {
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            score: None,
            start,
            end,
        }
    }
}

/// Preset pattern published by `GET /patterns`.
///
/// Only `name` is interpreted; the remaining fields are passed back to the
/// server untouched when building `patterns_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetPattern {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PresetPattern {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Regex source, when the server published one
    pub fn regex(&self) -> Option<&str> {
        self.extra.get("regex").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternsResponse {
    #[serde(default)]
    pub patterns: Vec<PresetPattern>,
}

/// Redacted document returned by the server, ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RedactedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
    }
}
