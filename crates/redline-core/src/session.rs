//! Per-file scan session.
//!
//! A session owns everything a scan produces for one selected file: the
//! preset list, the panels revealed so far and the redacted file waiting to
//! be saved. State moves along
//! `Idle -> Scanning -> Previewed -> Redacting -> Ready`, with `Error`
//! reachable from both in-flight states.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::file::SelectedFile;
use crate::model::{PresetPattern, RedactedFile};
use crate::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    Scanning,
    Previewed,
    Redacting,
    Ready,
    Error,
}

impl ScanState {
    pub fn in_flight(&self) -> bool {
        matches!(self, Self::Scanning | Self::Redacting)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Previewed => "previewed",
            Self::Redacting => "redacting",
            Self::Ready => "ready",
            Self::Error => "error",
        })
    }
}

/// Output blocks, revealed as the pipeline makes progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Text,
    Preview,
    Raw,
    Chips,
    Ner,
    Save,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    presets: Option<Vec<PresetPattern>>,
    file: Option<SelectedFile>,
    redacted: Option<RedactedFile>,
    state: ScanState,
    panels: BTreeSet<Panel>,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            presets: None,
            file: None,
            redacted: None,
            state: ScanState::Idle,
            panels: BTreeSet::new(),
            last_error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Presets are fetched once per session and survive file changes
    pub fn presets(&self) -> Option<&[PresetPattern]> {
        self.presets.as_deref()
    }

    pub fn set_presets(&mut self, presets: Vec<PresetPattern>) {
        self.presets = Some(presets);
    }

    /// Presets whose names are in `rules`; every preset when `rules` is empty
    pub fn selected_presets(&self, rules: &[String]) -> Vec<PresetPattern> {
        self.presets
            .iter()
            .flatten()
            .filter(|p| rules.is_empty() || rules.iter().any(|r| r == &p.name))
            .cloned()
            .collect()
    }

    /// Select a new file. Drops everything produced for the previous one.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        if self.state.in_flight() {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to: ScanState::Idle,
            });
        }
        self.file = Some(file);
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.redacted = None;
        self.panels.clear();
        self.last_error = None;
        self.state = ScanState::Idle;
    }

    fn transition(&mut self, allowed: &[ScanState], to: ScanState) -> Result<()> {
        if !allowed.contains(&self.state) {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Start (or restart) a scan of the selected file
    pub fn begin_scan(&mut self) -> Result<&SelectedFile> {
        if self.file.is_none() {
            return Err(CoreError::NoFileSelected);
        }
        self.transition(
            &[
                ScanState::Idle,
                ScanState::Previewed,
                ScanState::Ready,
                ScanState::Error,
            ],
            ScanState::Scanning,
        )?;
        self.redacted = None;
        self.panels.clear();
        self.last_error = None;
        self.file.as_ref().ok_or(CoreError::NoFileSelected)
    }

    pub fn scan_succeeded(&mut self) -> Result<()> {
        self.transition(&[ScanState::Scanning], ScanState::Previewed)
    }

    pub fn begin_redaction(&mut self) -> Result<()> {
        self.transition(&[ScanState::Previewed], ScanState::Redacting)
    }

    pub fn redaction_succeeded(&mut self, redacted: RedactedFile) -> Result<()> {
        self.transition(&[ScanState::Redacting], ScanState::Ready)?;
        self.redacted = Some(redacted);
        self.panels.insert(Panel::Save);
        Ok(())
    }

    /// Record a failed step. Save availability is withdrawn.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(
            &[ScanState::Scanning, ScanState::Redacting],
            ScanState::Error,
        )?;
        self.redacted = None;
        self.panels.remove(&Panel::Save);
        self.last_error = Some(message.into());
        Ok(())
    }

    pub fn reveal(&mut self, panel: Panel) {
        self.panels.insert(panel);
    }

    pub fn is_revealed(&self, panel: Panel) -> bool {
        self.panels.contains(&panel)
    }

    pub fn revealed(&self) -> impl Iterator<Item = Panel> + '_ {
        self.panels.iter().copied()
    }

    pub fn can_save(&self) -> bool {
        self.state == ScanState::Ready && self.redacted.is_some()
    }

    pub fn redacted(&self) -> Result<&RedactedFile> {
        if !self.can_save() {
            return Err(CoreError::NothingToSave);
        }
        self.redacted.as_ref().ok_or(CoreError::NothingToSave)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
