//! Scan and redaction options shared by the client, engine and CLI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::file::FileKind;

/// Where regex matches come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// File scan for PDFs (the only source of page numbers), text matching
    /// for everything else
    #[default]
    Auto,
    /// `/text/extract` followed by `/text/match`
    Text,
    /// `/redactions/pdf/scan` or `/redactions/xml/scan`
    File,
}

impl MatchSource {
    /// Concrete source for a file. Legacy formats can only be text-matched.
    pub fn resolve(self, kind: FileKind) -> Self {
        match self {
            Self::Auto if kind.is_pdf() => Self::File,
            Self::Auto => Self::Text,
            Self::File if !kind.supports_file_scan() => Self::Text,
            other => other,
        }
    }
}

impl FromStr for MatchSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "text" => Ok(Self::Text),
            "file" => Ok(Self::File),
            other => Err(format!(
                "unknown match source: {other} (expected auto, text or file)"
            )),
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Text => "text",
            Self::File => "file",
        })
    }
}

/// Box selection mode of `/redactions/apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactMode {
    Strict,
    #[default]
    AutoAll,
    AutoMerge,
}

impl RedactMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::AutoAll => "auto_all",
            Self::AutoMerge => "auto_merge",
        }
    }
}

impl FromStr for RedactMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(Self::Strict),
            "auto_all" => Ok(Self::AutoAll),
            "auto_merge" => Ok(Self::AutoMerge),
            other => Err(format!(
                "unknown redaction mode: {other} (expected strict, auto_all or auto_merge)"
            )),
        }
    }
}

impl fmt::Display for RedactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
