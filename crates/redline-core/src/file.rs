//! Selected input files and the formats the service accepts

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{CoreError, Result};

/// XML-packaged office formats, redacted through the XML endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlFormat {
    Docx,
    Xlsx,
    Pptx,
    Hwpx,
}

/// Binary office formats, only redactable through `/redact/file`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyFormat {
    Doc,
    Hwp,
    Ppt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Xml(XmlFormat),
    Legacy(LegacyFormat),
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Xml(XmlFormat::Docx),
            "xlsx" => Self::Xml(XmlFormat::Xlsx),
            "pptx" => Self::Xml(XmlFormat::Pptx),
            "hwpx" => Self::Xml(XmlFormat::Hwpx),
            "doc" => Self::Legacy(LegacyFormat::Doc),
            "hwp" => Self::Legacy(LegacyFormat::Hwp),
            "ppt" => Self::Legacy(LegacyFormat::Ppt),
            _ => return None,
        };
        Some(kind)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| CoreError::UnsupportedFileType(path.display().to_string()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xml(XmlFormat::Docx) => "docx",
            Self::Xml(XmlFormat::Xlsx) => "xlsx",
            Self::Xml(XmlFormat::Pptx) => "pptx",
            Self::Xml(XmlFormat::Hwpx) => "hwpx",
            Self::Legacy(LegacyFormat::Doc) => "doc",
            Self::Legacy(LegacyFormat::Hwp) => "hwp",
            Self::Legacy(LegacyFormat::Ppt) => "ppt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Xml(XmlFormat::Docx) => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xml(XmlFormat::Xlsx) => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Xml(XmlFormat::Pptx) => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Xml(XmlFormat::Hwpx) => "application/vnd.hancom.hwpx+zip",
            Self::Legacy(LegacyFormat::Doc) => "application/msword",
            Self::Legacy(LegacyFormat::Hwp) => "application/x-hwp",
            Self::Legacy(LegacyFormat::Ppt) => "application/vnd.ms-powerpoint",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }

    /// Legacy formats have no combined scan endpoint
    pub fn supports_file_scan(&self) -> bool {
        !matches!(self, Self::Legacy(_))
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Serialize for FileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.extension())
    }
}

/// A file the user picked for scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: FileKind,
}

impl SelectedFile {
    /// Validate the path before anything is sent over the network
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(CoreError::FileNotFound(path.display().to_string()));
        }

        let kind = FileKind::from_path(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("document.{}", kind.extension()));

        Ok(Self { path, name, kind })
    }

    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}
