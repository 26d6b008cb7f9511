//! Core domain models and logic for redline
//!
//! This crate contains:
//! - Scan records (Match, NerItem, PresetPattern) and their wire forms
//! - Normalization, grouping and presentation masking of matches
//! - Filename resolution for redacted downloads
//! - The per-file session state machine

pub mod disposition;
pub mod error;
pub mod file;
pub mod group;
pub mod mask;
pub mod model;
pub mod ner;
pub mod normalize;
pub mod options;
pub mod session;

pub use disposition::{fallback_filename, filename_from_disposition, resolve_filename};
pub use error::{CoreError, Result};
pub use file::{FileKind, LegacyFormat, SelectedFile, XmlFormat};
pub use group::{GroupOptions, RuleGroups, Validity, entry_count, group_by_rule};
pub use mask::mask_preview;
pub use model::{
    ExtractResponse, FileScanResponse, Location, Match, MatchResponse, NerItem, PatternsResponse,
    PresetPattern, RedactedFile,
};
pub use ner::{DEFAULT_NER_LABELS, NerFilter, normalize_entities, parse_entities};
pub use normalize::{keep_meaningful, normalize_matches_text, normalized_value};
pub use options::{MatchSource, RedactMode};
pub use session::{Panel, ScanState, Session};
