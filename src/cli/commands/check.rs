//! Tool availability check.

use tessinvoke::config::Config;
use tessinvoke::TesseractOcr;

use crate::cli::icons::{error, success};

/// Report whether the tesseract executable resolves.
pub fn cmd_check(config: &Config, binary: Option<&str>) -> anyhow::Result<()> {
    let mut ocr = TesseractOcr::default();
    config.apply_to(&mut ocr);
    if let Some(binary) = binary {
        ocr.set_binary(binary);
    }

    if ocr.is_available() {
        println!("{} {}", success(), ocr.availability_hint());
        Ok(())
    } else {
        println!("{} {}", error(), ocr.availability_hint());
        anyhow::bail!("{} is not available", ocr.binary())
    }
}
