//! Named-entity results: payload decoding, normalization and label filtering

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::model::{Location, NerItem};
use crate::normalize::slice_chars;

/// Person, location, organization
pub const DEFAULT_NER_LABELS: [&str; 3] = ["PS", "LC", "OG"];

/// Keys under which the NER and detect endpoints nest their entity list
const LIST_KEYS: [&str; 4] = ["items", "entities", "final_spans", "spans"];

/// Decode an entity payload: a bare array, or an object that holds the
/// array under one of the known keys. Anything else is an empty result.
pub fn parse_entities(payload: Value) -> Result<Vec<NerItem>, serde_json::Error> {
    let list = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => LIST_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    list.into_iter().map(serde_json::from_value).collect()
}

/// Fill missing entity text from the source text, trim, drop empty and
/// duplicate spans, and order by position.
pub fn normalize_entities(full_text: &str, items: Vec<NerItem>) -> Vec<NerItem> {
    let mut seen = HashSet::new();
    let mut out: Vec<NerItem> = items
        .into_iter()
        .filter_map(|mut item| {
            let text = item.text.trim();
            item.text = if text.is_empty() {
                slice_chars(full_text, Location::new(item.start, item.end))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            } else {
                text.to_string()
            };
            item.label = item.label.trim().to_ascii_uppercase();

            if item.text.is_empty() {
                return None;
            }
            seen.insert((item.label.clone(), item.start, item.end))
                .then_some(item)
        })
        .collect();

    out.sort_by_key(|item| (item.start, item.end));
    out
}

/// Label allow-list for the entity table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NerFilter {
    allowed: BTreeSet<String>,
}

impl NerFilter {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: labels
                .into_iter()
                .map(|l| l.as_ref().trim().to_ascii_uppercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn allows(&self, label: &str) -> bool {
        self.allowed.contains(&label.to_ascii_uppercase())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    pub fn apply<'a>(&self, items: &'a [NerItem]) -> Vec<&'a NerItem> {
        items.iter().filter(|item| self.allows(&item.label)).collect()
    }

    /// Per-label counts of the allowed items. Every allowed label is present,
    /// even with a zero count.
    pub fn counts(&self, items: &[NerItem]) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            self.allowed.iter().map(|l| (l.clone(), 0)).collect();
        for item in self.apply(items) {
            *counts.entry(item.label.to_ascii_uppercase()).or_default() += 1;
        }
        counts
    }
}

impl Default for NerFilter {
    fn default() -> Self {
        Self::new(DEFAULT_NER_LABELS)
    }
}
