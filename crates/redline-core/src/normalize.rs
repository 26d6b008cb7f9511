//! Value normalization for server matches

use crate::model::{Location, Match};

/// Slice `text` by character offsets, clamping `end` to the text length.
/// `None` when the clamped range is empty.
pub fn slice_chars(text: &str, location: Location) -> Option<&str> {
    let len = text.chars().count();
    let end = location.end.min(len);
    if location.start >= end {
        return None;
    }

    let byte_at = |n: usize| {
        text.char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .nth(n)
    };

    let start = byte_at(location.start)?;
    let end = byte_at(end)?;
    Some(&text[start..end])
}

/// Best-effort display value of a match: the trimmed server value, or the
/// trimmed slice of the full text when the server sent a blank value.
pub fn normalized_value(full_text: &str, m: &Match) -> String {
    let value = m.value.trim();
    if !value.is_empty() {
        return value.to_string();
    }

    m.location
        .and_then(|loc| slice_chars(full_text, loc))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn normalize_matches_text(full_text: &str, matches: &[Match]) -> Vec<Match> {
    matches
        .iter()
        .map(|m| Match {
            value: normalized_value(full_text, m),
            ..m.clone()
        })
        .collect()
}

/// Noise filter: at least two alphanumeric characters
pub fn keep_meaningful(value: &str) -> bool {
    value.chars().filter(|c| c.is_alphanumeric()).take(2).count() >= 2
}
