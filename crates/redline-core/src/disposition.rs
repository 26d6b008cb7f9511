//! Filename resolution for redacted downloads

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref EXTENDED_FILENAME: Regex =
        Regex::new(r#"(?i)filename\*\s*=\s*UTF-8''([^;]+)"#).unwrap();
    static ref PLAIN_FILENAME: Regex =
        Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).unwrap();
}

/// Keep only the final path component so a header cannot point outside
/// the output directory.
fn base_name(name: &str) -> Option<String> {
    let name = name.trim().trim_matches('"');
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Parse a `Content-Disposition` header. The RFC 5987 `filename*` form wins
/// over the plain `filename` form.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    if let Some(caps) = EXTENDED_FILENAME.captures(header) {
        let raw = caps[1].trim().trim_matches('"');
        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        if let Some(name) = base_name(&decoded) {
            return Some(name);
        }
    }

    PLAIN_FILENAME
        .captures(header)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|m| base_name(m.as_str()))
}

/// `<stem>.redacted.<ext>` for the original upload name
pub fn fallback_filename(original_name: &str) -> String {
    let path = Path::new(original_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.redacted.{ext}"),
        None => format!("{stem}.redacted"),
    }
}

pub fn resolve_filename(header: Option<&str>, original_name: &str) -> String {
    header
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| fallback_filename(original_name))
}
