//! Configuration management using the prefer crate.
//!
//! A config file only supplies defaults; anything given on the command line
//! wins. Precedence: CLI flag > environment > config file > built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ocr::{EngineMode, PageSegmentationMode, TesseractOcr};

/// Name used for config file discovery (`tessinvoke.toml`, `tessinvoke.json`, ...).
pub const CONFIG_NAME: &str = "tessinvoke";

/// Environment variable overriding the tesseract executable.
pub const BINARY_ENV: &str = "TESSINVOKE_BINARY";

/// Environment variable overriding the language pack.
pub const LANGUAGE_ENV: &str = "TESSINVOKE_LANG";

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tesseract executable name or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Language pack(s), e.g. "eng+por".
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "lang")]
    pub language: Option<String>,
    /// Page segmentation mode code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psm: Option<PageSegmentationMode>,
    /// Engine mode code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oem: Option<EngineMode>,
    /// Output format (txt, hocr, pdf, tsv, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Directory for derived output bases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    /// Falls back to defaults (plus environment overrides) when no file is found.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default().with_env_overrides()
                        }
                    }
                } else {
                    Self::default().with_env_overrides()
                }
            }
            Err(_) => {
                tracing::debug!("No {} config file found, using defaults", CONFIG_NAME);
                Self::default().with_env_overrides()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;

        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Parse config contents in the given format (`toml`, `yaml`/`yml`, else JSON).
    pub fn parse(contents: &str, format: &str) -> Result<Self, String> {
        match format {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply `TESSINVOKE_BINARY` and `TESSINVOKE_LANG` on top of file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(binary) = lookup(BINARY_ENV).filter(|v| !v.is_empty()) {
            self.binary = Some(binary);
        }
        if let Some(language) = lookup(LANGUAGE_ENV).filter(|v| !v.is_empty()) {
            self.language = Some(language);
        }
        self
    }

    /// Directory relative paths are resolved against: the config file's
    /// directory when there is one, otherwise the current directory.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Output base for an image when none was given: the image path without
    /// its extension, moved into `output_dir` if configured.
    pub fn output_base_for(&self, image: &Path) -> PathBuf {
        let stem = image.with_extension("");
        match self.output_dir {
            Some(ref dir) => {
                let dir = self.resolve_path(dir, &self.base_dir());
                match stem.file_name() {
                    Some(name) => dir.join(name),
                    None => dir,
                }
            }
            None => stem,
        }
    }

    /// Apply configured values to an invocation.
    pub fn apply_to(&self, ocr: &mut TesseractOcr) {
        if let Some(ref binary) = self.binary {
            ocr.set_binary(binary.clone());
        }
        if let Some(ref language) = self.language {
            ocr.set_language(language.clone());
        }
        if let Some(psm) = self.psm {
            ocr.set_page_segmentation_mode(psm);
        }
        if let Some(oem) = self.oem {
            ocr.set_engine_mode(oem);
        }
        if let Some(ref extension) = self.extension {
            ocr.set_extension(extension.clone());
        }
    }
}
