//! Saving redacted files and handing them to the HWPX viewer

use anyhow::{Context, Result, bail};
use redline_core::RedactedFile;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub size_bytes: usize,
    pub blake3: String,
}

/// Write the redacted file into `dir` under its resolved name
pub fn save(redacted: &RedactedFile, dir: &Path, force: bool) -> Result<SavedFile> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory {}", dir.display()))?;

    let path = dir.join(&redacted.filename);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(&path, &redacted.bytes)
        .with_context(|| format!("Cannot write {}", path.display()))?;

    Ok(SavedFile {
        path,
        size_bytes: redacted.len(),
        blake3: blake3::hash(&redacted.bytes).to_hex().to_string(),
    })
}

pub fn is_hwpx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("hwpx"))
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("Cannot resolve {}", path.display()))?;
    let display = absolute.to_string_lossy().replace('\\', "/");

    Ok(if display.starts_with('/') {
        format!("file://{}", display)
    } else {
        format!("file:///{}", display)
    })
}

/// Viewer page URL with the saved file passed as the `file` query parameter
pub fn viewer_link(viewer: &str, saved: &Path) -> Result<String> {
    let separator = if viewer.contains('?') { '&' } else { '?' };
    Ok(format!(
        "{}{}file={}",
        viewer,
        separator,
        urlencoding::encode(&file_url(saved)?)
    ))
}

pub fn open_url(url: &str) {
    #[cfg(target_os = "macos")]
    let _ = std::process::Command::new("open").arg(url).spawn();

    #[cfg(target_os = "linux")]
    let _ = std::process::Command::new("xdg-open").arg(url).spawn();

    #[cfg(target_os = "windows")]
    let _ = std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn();
}
