//! Errors from running tesseract.

use std::path::PathBuf;

use thiserror::Error;

/// Why an invocation did not produce output.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("No image path set")]
    MissingImage,

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Output directory not found: {}", .0.display())]
    OutputDirNotFound(PathBuf),

    #[error("{0} not found (install tesseract-ocr)")]
    BinaryNotFound(String),

    #[error("Permission denied running {0}")]
    PermissionDenied(String),

    #[error("Failed to launch tesseract: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Interrupted while waiting for tesseract: {0}")]
    WaitInterrupted(#[source] std::io::Error),

    #[error("tesseract exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

impl OcrError {
    /// Map a spawn failure onto the matching variant.
    pub(crate) fn from_spawn(err: std::io::Error, binary: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => OcrError::BinaryNotFound(binary.to_string()),
            std::io::ErrorKind::PermissionDenied => OcrError::PermissionDenied(binary.to_string()),
            _ => OcrError::Launch(err),
        }
    }
}
