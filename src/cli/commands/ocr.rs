//! OCR run command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use tessinvoke::config::Config;
use tessinvoke::{EngineMode, PageSegmentationMode, TesseractOcr};

use crate::cli::icons::{dim_arrow, success};

/// Values given explicitly on the command line.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub language: Option<String>,
    pub psm: Option<PageSegmentationMode>,
    pub oem: Option<EngineMode>,
    pub extension: Option<String>,
    pub binary: Option<String>,
}

/// Assemble the invocation from config defaults and command-line overrides.
pub fn build_invocation(
    config: &Config,
    image: PathBuf,
    output_base: Option<PathBuf>,
    overrides: RunOverrides,
) -> TesseractOcr {
    let output_base = output_base.unwrap_or_else(|| config.output_base_for(&image));
    let mut ocr = TesseractOcr::new(image, output_base);
    config.apply_to(&mut ocr);

    if let Some(language) = overrides.language {
        ocr.set_language(language);
    }
    if let Some(psm) = overrides.psm {
        ocr.set_page_segmentation_mode(psm);
    }
    if let Some(oem) = overrides.oem {
        ocr.set_engine_mode(oem);
    }
    if let Some(extension) = overrides.extension {
        ocr.set_extension(extension);
    }
    if let Some(binary) = overrides.binary {
        ocr.set_binary(binary);
    }
    ocr
}

/// Run tesseract on a single image.
pub async fn cmd_run(
    config: &Config,
    image: PathBuf,
    output_base: Option<PathBuf>,
    overrides: RunOverrides,
    dry_run: bool,
) -> anyhow::Result<()> {
    let ocr = build_invocation(config, image, output_base, overrides);

    if dry_run {
        println!("{}", ocr.display_command());
        return Ok(());
    }

    let image = ocr.image().to_path_buf();
    let result = tokio::task::spawn_blocking(move || ocr.run()).await?;

    let output = result.with_context(|| format!("OCR of {} failed", image.display()))?;

    if let Some(text) = output.text {
        print!("{}", text);
    }
    if let Some(path) = output.output_path {
        eprintln!("{} Recognized {}", success(), image.display());
        eprintln!("  {} Output: {}", dim_arrow(), path.display());
    }
    eprintln!(
        "  {} {}",
        dim_arrow(),
        style(format!("{}ms", output.processing_time_ms)).dim()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            language: Some("por".to_string()),
            psm: Some(PageSegmentationMode::SingleBlock),
            extension: Some("hocr".to_string()),
            ..Default::default()
        };
        let overrides = RunOverrides {
            language: Some("deu".to_string()),
            oem: Some(EngineMode::LstmOnly),
            ..Default::default()
        };

        let ocr = build_invocation(&config, PathBuf::from("/scans/a.png"), None, overrides);
        assert_eq!(ocr.language(), "deu");
        assert_eq!(ocr.page_segmentation_mode(), PageSegmentationMode::SingleBlock);
        assert_eq!(ocr.engine_mode(), EngineMode::LstmOnly);
        assert_eq!(ocr.extension(), "hocr");
        assert_eq!(ocr.output_base(), PathBuf::from("/scans/a").as_path());
    }

    #[test]
    fn test_explicit_output_base_kept() {
        let ocr = build_invocation(
            &Config::default(),
            PathBuf::from("/scans/a.png"),
            Some(PathBuf::from("stdout")),
            RunOverrides::default(),
        );
        assert!(ocr.writes_to_stdout());
    }
}
