//! Scan results collected along the pipeline

use redline_core::{Match, MatchSource, NerItem, SelectedFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Extract,
    Match,
    /// Combined extract + match through a file scan endpoint
    Scan,
    Ner,
    Redact,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extract => "extract",
            Self::Match => "match",
            Self::Scan => "scan",
            Self::Ner => "ner",
            Self::Redact => "redact",
        })
    }
}

/// What a successful step produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutput {
    Extracted { chars: usize },
    Matched { matches: usize },
    Scanned { chars: usize, matches: usize },
    Recognized { entities: usize, strategy: Option<&'static str> },
    Redacted { filename: String, bytes: usize },
}

impl fmt::Display for StepOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracted { chars } => write!(f, "extracted {} characters", chars),
            Self::Matched { matches } => write!(f, "{} regex matches", matches),
            Self::Scanned { chars, matches } => {
                write!(f, "scanned {} characters, {} matches", chars, matches)
            }
            Self::Recognized { entities, strategy } => match strategy {
                Some(name) => write!(f, "{} entities (via {})", entities, name),
                None => write!(f, "no entities"),
            },
            Self::Redacted { filename, bytes } => write!(f, "{} ({} bytes)", filename, bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub elapsed_ms: u64,
    pub output: StepOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactionSummary {
    pub filename: String,
    pub size_bytes: usize,
}

/// Everything one pipeline run learned about a file
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub session_id: String,
    pub file: SelectedFile,
    pub source: MatchSource,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub full_text: String,
    pub matches: Vec<Match>,
    pub counts: BTreeMap<String, usize>,
    pub entities: Vec<NerItem>,
    pub ner_strategy: Option<&'static str>,
    pub redacted: Option<RedactionSummary>,
    pub steps: Vec<StepRecord>,
}

impl ScanReport {
    pub fn new(session_id: &str, file: SelectedFile, source: MatchSource) -> Self {
        Self {
            session_id: session_id.to_string(),
            file,
            source,
            started_at: OffsetDateTime::now_utc(),
            full_text: String::new(),
            matches: Vec::new(),
            counts: BTreeMap::new(),
            entities: Vec::new(),
            ner_strategy: None,
            redacted: None,
            steps: Vec::new(),
        }
    }

    pub fn completed(&self, step: Step) -> bool {
        self.steps.iter().any(|r| r.step == step)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.steps.iter().map(|r| r.elapsed_ms).sum()
    }
}

/// Per-rule counts for sources that do not report them
pub fn count_by_rule(matches: &[Match]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for m in matches {
        *counts.entry(m.rule.clone()).or_default() += 1;
    }
    counts
}
