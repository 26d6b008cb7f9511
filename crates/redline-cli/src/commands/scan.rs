//! Scan command - run the pipeline, render panels, save the result

use anyhow::{Context, Result};
use redline_client::ClientError;
use redline_config::Config;
use redline_core::{NerFilter, Panel, SelectedFile, Session};
use redline_engine::{Pipeline, PipelineObserver, ScanReport, ScanSettings, Step, StepRecord};
use serde::Serialize;
use std::io::IsTerminal;
use tracing::info;

use crate::cli::{OutputFormat, ScanArgs};
use crate::export::{self, SavedFile};
use crate::render::Renderer;

/// Step progress on stderr, so stdout only carries the panels
struct Progress {
    enabled: bool,
}

impl PipelineObserver for Progress {
    fn step_started(&self, step: Step) {
        if self.enabled {
            eprintln!("… {}", step);
        }
    }

    fn step_finished(&self, record: &StepRecord, _revealed: &[Panel]) {
        if self.enabled {
            eprintln!("✓ {}: {} ({} ms)", record.step, record.output, record.elapsed_ms);
        }
    }

    fn step_failed(&self, step: Step, error: &ClientError) {
        if self.enabled {
            eprintln!("✗ {}: {}", step, error);
        }
    }
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    #[serde(flatten)]
    report: &'a ScanReport,
    saved: Option<&'a SavedFile>,
    viewer_url: Option<&'a str>,
}

fn settings(args: &ScanArgs, config: &Config) -> ScanSettings {
    ScanSettings {
        rules: if args.rules.is_empty() {
            config.scan.rules.clone()
        } else {
            args.rules.clone()
        },
        source: args.source.unwrap_or(config.scan.source),
        run_ner: !args.no_ner,
        redact: !args.no_redact,
        mode: args.mode.unwrap_or(config.redact.mode),
        fill: args
            .fill
            .clone()
            .unwrap_or_else(|| config.redact.fill.clone()),
    }
}

fn ner_filter(args: &ScanArgs, config: &Config) -> NerFilter {
    if args.labels.is_empty() {
        NerFilter::new(&config.scan.ner_labels)
    } else {
        NerFilter::new(&args.labels)
    }
}

/// Panels revealed on the session, rendered in display order
fn render_panels(
    session: &Session,
    report: &ScanReport,
    args: &ScanArgs,
    filter: &NerFilter,
    renderer: &Renderer,
) -> String {
    let kind = report.file.kind;
    let mut out = format!(
        "{} ({}, {} characters)\n",
        report.file.name,
        kind,
        report.full_text.chars().count()
    );

    if session.is_revealed(Panel::Preview) {
        out.push_str(&renderer.counts(&report.counts));
        out.push('\n');
        out.push_str(&renderer.preview(&report.full_text, &report.matches, kind));
    }
    if args.raw && session.is_revealed(Panel::Raw) {
        out.push('\n');
        out.push_str(&renderer.raw(&report.full_text, &report.matches, kind));
    }
    if args.chips && session.is_revealed(Panel::Chips) {
        out.push('\n');
        out.push_str(&renderer.chip_lists(&report.full_text, &report.matches, kind));
    }
    if session.is_revealed(Panel::Ner) {
        out.push('\n');
        out.push_str(&renderer.ner_table(&report.entities, filter));
    }
    if let Some(redacted) = &report.redacted {
        out.push_str(&format!(
            "\n✓ Redacted: {} ({} bytes)\n",
            redacted.filename, redacted.size_bytes
        ));
    }
    out
}

pub async fn handle(args: ScanArgs, config: &Config) -> Result<()> {
    let file = SelectedFile::open(&args.file)
        .with_context(|| format!("Cannot scan {}", args.file.display()))?;

    let mut session = Session::new();
    session.select_file(file)?;

    let pipeline = Pipeline::new(super::client(config)?, settings(&args, config));
    let json = args.format == OutputFormat::Json;
    let progress = Progress { enabled: !json };

    let report = pipeline.run(&mut session, &progress).await?;

    let mut saved = None;
    let mut viewer_url = None;
    if args.save {
        let file = export::save(session.redacted()?, &args.output, args.force)?;
        info!("Saved {} ({})", file.path.display(), file.blake3);

        if export::is_hwpx(&file.path) {
            match config.viewer.hwpx_url.as_deref() {
                Some(viewer) => viewer_url = Some(export::viewer_link(viewer, &file.path)?),
                None => info!("No HWPX viewer configured"),
            }
        }
        saved = Some(file);
    }

    if json {
        let output = ScanOutput {
            report: &report,
            saved: saved.as_ref(),
            viewer_url: viewer_url.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let renderer = Renderer::new(!args.no_color && std::io::stdout().is_terminal());
        print!(
            "{}",
            render_panels(&session, &report, &args, &ner_filter(&args, config), &renderer)
        );

        if let Some(file) = &saved {
            println!("✓ Saved {}", file.path.display());
            println!("  blake3: {}", file.blake3);
        }
        if let Some(url) = &viewer_url {
            println!("  Viewer: {}", url);
        }
    }

    if args.open_viewer {
        if let Some(url) = &viewer_url {
            export::open_url(url);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use redline_core::{Match, MatchSource, NerItem, RedactMode, RedactedFile};
    use tempfile::TempDir;

    fn scan_args(extra: &[&str]) -> ScanArgs {
        let mut argv = vec!["redline", "scan", "memo.docx"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Scan(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_settings_fall_back_to_config() {
        let mut config = Config::default();
        config.scan.rules = vec!["email".to_string()];
        config.redact.mode = RedactMode::Strict;

        let s = settings(&scan_args(&[]), &config);
        assert_eq!(s.rules, vec!["email"]);
        assert_eq!(s.source, MatchSource::Auto);
        assert_eq!(s.mode, RedactMode::Strict);
        assert_eq!(s.fill, "black");
        assert!(s.run_ner && s.redact);

        let s = settings(
            &scan_args(&["--rules", "rrn", "--fill", "white", "--no-ner", "--no-redact"]),
            &config,
        );
        assert_eq!(s.rules, vec!["rrn"]);
        assert_eq!(s.fill, "white");
        assert!(!s.run_ner && !s.redact);
    }

    #[test]
    fn test_ner_filter_from_flags() {
        let config = Config::default();
        let filter = ner_filter(&scan_args(&["--labels", "ps,og"]), &config);
        assert!(filter.allows("PS"));
        assert!(!filter.allows("LC"));

        let filter = ner_filter(&scan_args(&[]), &config);
        assert!(filter.allows("LC"));
    }

    #[test]
    fn test_render_only_revealed_panels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.docx");
        std::fs::write(&path, b"PK").unwrap();
        let file = SelectedFile::open(&path).unwrap();

        let mut session = Session::new();
        session.select_file(file.clone()).unwrap();
        session.begin_scan().unwrap();

        let mut report = ScanReport::new(session.id(), file, MatchSource::Text);
        report.full_text = "call 010-1234-5678".to_string();
        report.matches = vec![Match::new("phone_mobile", "010-1234-5678", true)];
        report.counts.insert("phone_mobile".to_string(), 1);
        report.entities = vec![NerItem::new("PS", "call", 0, 4)];

        let args = scan_args(&["--raw"]);
        let renderer = Renderer::new(false);
        let filter = NerFilter::default();

        let out = render_panels(&session, &report, &args, &filter, &renderer);
        assert!(out.starts_with("memo.docx (docx, 18 characters)"));
        assert!(!out.contains("Preview"));

        for panel in [Panel::Preview, Panel::Raw, Panel::Chips] {
            session.reveal(panel);
        }
        let out = render_panels(&session, &report, &args, &filter, &renderer);
        assert!(out.contains("[***-****-****]"));
        assert!(out.contains("Raw matches"));
        assert!(!out.contains("Valid ("));
        assert!(!out.contains("Entities"));

        session.reveal(Panel::Ner);
        session.scan_succeeded().unwrap();
        session.begin_redaction().unwrap();
        session
            .redaction_succeeded(RedactedFile::new("memo.redacted.docx", b"PK".to_vec()))
            .unwrap();
        report.redacted = Some(redline_engine::RedactionSummary {
            filename: "memo.redacted.docx".to_string(),
            size_bytes: 2,
        });
        let out = render_panels(&session, &report, &args, &filter, &renderer);
        assert!(out.contains("Entities"));
        assert!(out.contains("✓ Redacted: memo.redacted.docx (2 bytes)"));
    }
}
