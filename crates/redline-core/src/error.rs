use thiserror::Error;

use crate::session::ScanState;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error(
        "Unsupported file type: {0} (expected .pdf, .docx, .xlsx, .pptx, .hwpx, .doc, .hwp or .ppt)"
    )]
    UnsupportedFileType(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: ScanState, to: ScanState },

    #[error("Nothing to save: no redacted file is ready")]
    NothingToSave,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
