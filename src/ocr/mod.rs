//! Tesseract OCR via its command-line tool.
//!
//! - `TesseractOcr`: the arguments for one run, and the blocking run itself
//! - `PageSegmentationMode` / `EngineMode`: `--psm` and `--oem` codes
//! - `OcrError`: why a run failed
//!
//! Recognition itself is done by the installed `tesseract` binary.

mod error;
mod invocation;
mod modes;

pub use error::OcrError;
pub use invocation::{
    output_file_extension, OcrOutput, TesseractOcr, DEFAULT_BINARY, DEFAULT_LANGUAGE,
    STDOUT_OUTPUT,
};
pub use modes::{EngineMode, InvalidModeError, PageSegmentationMode};
