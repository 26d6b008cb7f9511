//! Scan workflow: extract -> match -> ner -> redact.
//!
//! Steps run strictly in order and the first failure aborts the rest. Each
//! success reveals its panels on the session and is reported to the
//! observer, so callers can show progress as it happens.

use redline_client::{ClientError, NerChain, RedactRequest, RedactionClient, Upload};
use redline_core::{
    FileKind, Match, MatchSource, Panel, RedactMode, SelectedFile, Session,
    normalize_matches_text,
};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::report::{RedactionSummary, ScanReport, Step, StepOutput, StepRecord, count_by_rule};
use crate::{EngineError, Result};

/// What a run should do
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Rule names to match; empty means all
    pub rules: Vec<String>,
    pub source: MatchSource,
    pub run_ner: bool,
    pub redact: bool,
    pub mode: RedactMode,
    pub fill: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            source: MatchSource::default(),
            run_ner: true,
            redact: true,
            mode: RedactMode::default(),
            fill: "black".to_string(),
        }
    }
}

/// Progress callbacks. All methods default to doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn step_started(&self, _step: Step) {}

    fn step_finished(&self, _record: &StepRecord, _revealed: &[Panel]) {}

    fn step_failed(&self, _step: Step, _error: &ClientError) {}
}

pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

const MATCH_PANELS: [Panel; 3] = [Panel::Preview, Panel::Raw, Panel::Chips];

/// Keep only matches of the selected rules. An empty selection keeps all.
fn retain_selected(matches: Vec<Match>, rules: &[String]) -> Vec<Match> {
    if rules.is_empty() {
        return matches;
    }
    matches
        .into_iter()
        .filter(|m| rules.iter().any(|r| r == &m.rule))
        .collect()
}

async fn timed<T, F>(step: Step, observer: &dyn PipelineObserver, fut: F) -> Result<(T, u64)>
where
    F: Future<Output = redline_client::Result<T>>,
{
    observer.step_started(step);
    let started = Instant::now();

    match fut.await {
        Ok(value) => Ok((value, started.elapsed().as_millis() as u64)),
        Err(source) => {
            warn!("Step {} failed: {}", step, source);
            observer.step_failed(step, &source);
            Err(EngineError::Step { step, source })
        }
    }
}

fn finish(
    session: &mut Session,
    observer: &dyn PipelineObserver,
    report: &mut ScanReport,
    record: StepRecord,
    panels: &[Panel],
) {
    info!("Step {} done in {}ms: {}", record.step, record.elapsed_ms, record.output);
    for panel in panels {
        session.reveal(*panel);
    }
    observer.step_finished(&record, panels);
    report.steps.push(record);
}

pub struct Pipeline {
    client: RedactionClient,
    ner: NerChain,
    settings: ScanSettings,
}

impl Pipeline {
    pub fn new(client: RedactionClient, settings: ScanSettings) -> Self {
        Self {
            client,
            ner: NerChain::default(),
            settings,
        }
    }

    pub fn with_ner_chain(mut self, ner: NerChain) -> Self {
        self.ner = ner;
        self
    }

    pub fn client(&self) -> &RedactionClient {
        &self.client
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Steps a run will attempt for a file of this kind
    pub fn plan(&self, kind: FileKind) -> Vec<Step> {
        let mut steps = match self.settings.source.resolve(kind) {
            MatchSource::File => vec![Step::Scan],
            _ => vec![Step::Extract, Step::Match],
        };
        if self.settings.run_ner {
            steps.push(Step::Ner);
        }
        if self.settings.redact {
            steps.push(Step::Redact);
        }
        steps
    }

    /// Fetch the preset list once per session. Failures leave the session
    /// without presets so the next run tries again.
    pub async fn load_presets(&self, session: &mut Session) {
        if session.presets().is_some() {
            return;
        }
        match self.client.patterns().await {
            Ok(presets) => {
                debug!("Loaded {} preset patterns", presets.len());
                session.set_presets(presets);
            }
            Err(e) => warn!("Could not load preset patterns: {}", e),
        }
    }

    /// Run every planned step for the session's selected file
    pub async fn run(
        &self,
        session: &mut Session,
        observer: &dyn PipelineObserver,
    ) -> Result<ScanReport> {
        let file = session.begin_scan()?.clone();
        let source = self.settings.source.resolve(file.kind);
        info!("Scanning {} ({}, source: {})", file.name, file.kind, source);

        let mut report = ScanReport::new(session.id(), file.clone(), source);
        match self.drive(session, &file, observer, &mut report).await {
            Ok(()) => Ok(report),
            Err(e) => {
                if let Err(state) = session.fail(e.to_string()) {
                    warn!("Could not record failure on session: {}", state);
                }
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut Session,
        file: &SelectedFile,
        observer: &dyn PipelineObserver,
        report: &mut ScanReport,
    ) -> Result<()> {
        self.load_presets(session).await;
        let rules = &self.settings.rules;
        let patterns = session.selected_presets(rules);
        if !rules.is_empty() && patterns.is_empty() && file.kind.is_pdf() {
            warn!(
                "No preset pattern matches rules [{}]; the server applies its default presets \
                 and only matches of the selected rules are reported",
                rules.join(", ")
            );
        }

        let first = match report.source {
            MatchSource::File => Step::Scan,
            _ => Step::Extract,
        };
        let upload = Upload::from_file(file).map_err(|source| EngineError::Step {
            step: first,
            source,
        })?;

        if report.source == MatchSource::File {
            let (scan, elapsed_ms) = timed(
                Step::Scan,
                observer,
                self.client.scan_file(&upload, &patterns),
            )
            .await?;

            report.full_text = scan.extracted_text.unwrap_or_default();
            let matches = retain_selected(scan.matches, rules);
            report.matches = normalize_matches_text(&report.full_text, &matches);
            report.counts = count_by_rule(&report.matches);

            let output = StepOutput::Scanned {
                chars: report.full_text.chars().count(),
                matches: report.matches.len(),
            };
            let record = StepRecord {
                step: Step::Scan,
                elapsed_ms,
                output,
            };
            let panels = [Panel::Text, Panel::Preview, Panel::Raw, Panel::Chips];
            finish(session, observer, report, record, &panels);
        } else {
            let (text, elapsed_ms) =
                timed(Step::Extract, observer, self.client.extract(&upload)).await?;
            report.full_text = text;
            let record = StepRecord {
                step: Step::Extract,
                elapsed_ms,
                output: StepOutput::Extracted {
                    chars: report.full_text.chars().count(),
                },
            };
            finish(session, observer, report, record, &[Panel::Text]);

            let (matched, elapsed_ms) = timed(
                Step::Match,
                observer,
                self.client.match_text(&report.full_text, rules),
            )
            .await?;
            report.matches = normalize_matches_text(&report.full_text, &matched.items);
            report.counts = if matched.counts.is_empty() {
                count_by_rule(&report.matches)
            } else {
                matched.counts
            };
            let record = StepRecord {
                step: Step::Match,
                elapsed_ms,
                output: StepOutput::Matched {
                    matches: report.matches.len(),
                },
            };
            finish(session, observer, report, record, &MATCH_PANELS);
        }

        if self.settings.run_ner {
            if report.full_text.trim().is_empty() {
                debug!("No extracted text, skipping NER");
            } else {
                let (outcome, elapsed_ms) = timed(
                    Step::Ner,
                    observer,
                    self.ner.run(&self.client, &report.full_text),
                )
                .await?;
                report.entities = outcome.items;
                report.ner_strategy = outcome.strategy;
                let record = StepRecord {
                    step: Step::Ner,
                    elapsed_ms,
                    output: StepOutput::Recognized {
                        entities: report.entities.len(),
                        strategy: outcome.strategy,
                    },
                };
                finish(session, observer, report, record, &[Panel::Ner]);
            }
        }

        session.scan_succeeded()?;
        if !self.settings.redact {
            return Ok(());
        }

        session.begin_redaction()?;
        let request = RedactRequest {
            mode: self.settings.mode,
            fill: self.settings.fill.clone(),
            patterns,
        };
        let (redacted, elapsed_ms) =
            timed(Step::Redact, observer, self.client.redact(&upload, &request)).await?;

        report.redacted = Some(RedactionSummary {
            filename: redacted.filename.clone(),
            size_bytes: redacted.len(),
        });
        let record = StepRecord {
            step: Step::Redact,
            elapsed_ms,
            output: StepOutput::Redacted {
                filename: redacted.filename.clone(),
                bytes: redacted.len(),
            },
        };
        session.redaction_succeeded(redacted)?;
        finish(session, observer, report, record, &[Panel::Save]);

        Ok(())
    }
}
