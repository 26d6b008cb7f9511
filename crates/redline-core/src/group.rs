//! Grouping of matches by rule for previews and chip lists

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::file::FileKind;
use crate::mask::mask_preview;
use crate::model::Match;
use crate::normalize::{keep_meaningful, normalized_value};

/// Rule name → display values in first-seen order. Iteration is sorted by
/// rule name.
pub type RuleGroups = BTreeMap<String, Vec<String>>;

/// Which matches survive by their server-side validation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Ok,
    Ng,
    #[default]
    All,
}

impl Validity {
    pub fn accepts(&self, valid: bool) -> bool {
        match self {
            Self::Ok => valid,
            Self::Ng => !valid,
            Self::All => true,
        }
    }
}

impl FromStr for Validity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "ng" => Ok(Self::Ng),
            "all" => Ok(Self::All),
            other => Err(format!("unknown validity selector: {other}")),
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Ng => "ng",
            Self::All => "all",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GroupOptions {
    pub file_kind: FileKind,
    pub validity: Validity,
    pub masked: bool,
}

impl GroupOptions {
    pub fn new(file_kind: FileKind) -> Self {
        Self {
            file_kind,
            validity: Validity::All,
            masked: false,
        }
    }

    pub fn validity(mut self, validity: Validity) -> Self {
        self.validity = validity;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }
}

/// Filter, normalize, dedup and group matches.
///
/// PDF matches without a finite page are dropped outright. Dedup runs on
/// `(rule, display value)`, so masked grouping collapses values that only
/// differ under the mask while unmasked grouping keeps them apart.
pub fn group_by_rule(full_text: &str, matches: &[Match], options: GroupOptions) -> RuleGroups {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut groups = RuleGroups::new();

    for m in matches {
        if options.file_kind.is_pdf() && !m.has_page() {
            continue;
        }
        if !options.validity.accepts(m.valid) {
            continue;
        }

        let value = normalized_value(full_text, m);
        if !keep_meaningful(&value) {
            continue;
        }

        let display = if options.masked {
            mask_preview(&value, &m.rule)
        } else {
            value
        };

        if seen.insert((m.rule.clone(), display.clone())) {
            groups.entry(m.rule.clone()).or_default().push(display);
        }
    }

    groups
}

/// Number of display entries across all groups
pub fn entry_count(groups: &RuleGroups) -> usize {
    groups.values().map(Vec::len).sum()
}
