//! tessinvoke - typed invocation of the Tesseract OCR command-line tool.
//!
//! ```no_run
//! use tessinvoke::{PageSegmentationMode, TesseractOcr};
//!
//! let output = TesseractOcr::new("scan.png", "scan")
//!     .with_language("eng+por")
//!     .with_page_segmentation_mode(PageSegmentationMode::SingleBlock)
//!     .run()?;
//! println!("wrote {:?}", output.output_path);
//! # Ok::<(), tessinvoke::OcrError>(())
//! ```

pub mod config;
pub mod ocr;

pub use ocr::{EngineMode, OcrError, OcrOutput, PageSegmentationMode, TesseractOcr};
