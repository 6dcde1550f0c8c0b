//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod modes;
mod ocr;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tessinvoke::config::Config;
use tessinvoke::{EngineMode, PageSegmentationMode};

#[derive(Parser)]
#[command(name = "tessinvoke")]
#[command(about = "Run Tesseract OCR with typed, validated arguments")]
#[command(version)]
pub struct Cli {
    /// Config file (default: auto-discover tessinvoke.{toml,json,yaml})
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run tesseract on an image
    Run {
        /// Image to recognize
        image: PathBuf,
        /// Output path without extension, or "stdout" (default: image path without extension)
        output_base: Option<PathBuf>,
        /// Language pack(s), e.g. eng or eng+por
        #[arg(short, long)]
        language: Option<String>,
        /// Page segmentation mode (0-13)
        #[arg(long)]
        psm: Option<PageSegmentationMode>,
        /// OCR engine mode (0-3)
        #[arg(long)]
        oem: Option<EngineMode>,
        /// Output format: txt, hocr, pdf, tsv, alto, ... (default: txt)
        #[arg(short, long)]
        extension: Option<String>,
        /// Tesseract executable
        #[arg(long, env = "TESSINVOKE_BINARY")]
        binary: Option<String>,
        /// Print the command line without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether tesseract can be found
    Check {
        /// Tesseract executable
        #[arg(long, env = "TESSINVOKE_BINARY")]
        binary: Option<String>,
    },

    /// List page segmentation and engine modes
    Modes,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from_path(path)
                .await
                .map_err(|e| anyhow::anyhow!(e))?
        }
        None => Config::load().await,
    };

    match cli.command {
        Commands::Run {
            image,
            output_base,
            language,
            psm,
            oem,
            extension,
            binary,
            dry_run,
        } => {
            let overrides = ocr::RunOverrides {
                language,
                psm,
                oem,
                extension,
                binary,
            };
            ocr::cmd_run(&config, image, output_base, overrides, dry_run).await
        }
        Commands::Check { binary } => check::cmd_check(&config, binary.as_deref()),
        Commands::Modes => {
            modes::cmd_modes();
            Ok(())
        }
    }
}
