//! Tesseract invocation.
//!
//! `TesseractOcr` holds everything tesseract needs on its command line and
//! runs it as a blocking child process:
//!
//! ```text
//! tesseract <image> <output-base> [<extension>] -l <lang> --psm <n> --oem <n>
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::error::OcrError;
use super::modes::{EngineMode, PageSegmentationMode};

/// Default executable name, resolved through PATH.
pub const DEFAULT_BINARY: &str = "tesseract";

/// Default language pack.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Output base that makes tesseract print recognized text instead of writing a file.
pub const STDOUT_OUTPUT: &str = "stdout";

/// Configuration for one tesseract run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractOcr {
    /// Image to recognize.
    image: PathBuf,
    /// Output path without extension; tesseract appends one.
    output_base: PathBuf,
    /// Output format (`txt`, `hocr`, `pdf`, ...). Empty means plain text.
    extension: String,
    /// Language pack(s), e.g. "eng" or "eng+por".
    language: String,
    psm: PageSegmentationMode,
    oem: EngineMode,
    binary: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            image: PathBuf::new(),
            output_base: PathBuf::new(),
            extension: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            psm: PageSegmentationMode::default(),
            oem: EngineMode::default(),
            binary: DEFAULT_BINARY.to_string(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    /// File tesseract wrote, or `None` when writing to stdout.
    pub output_path: Option<PathBuf>,
    /// Recognized text, captured only when writing to stdout.
    pub text: Option<String>,
    /// Tesseract's diagnostic output.
    pub stderr: String,
    /// Wall-clock time of the child process in milliseconds.
    pub processing_time_ms: u64,
}

impl TesseractOcr {
    /// Create a configuration for `image`, writing to `output_base`.
    ///
    /// Everything else keeps its default: plain text output, `eng`,
    /// `--psm 3` and `--oem 3`.
    pub fn new(image: impl Into<PathBuf>, output_base: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            output_base: output_base.into(),
            ..Default::default()
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_page_segmentation_mode(mut self, psm: PageSegmentationMode) -> Self {
        self.psm = psm;
        self
    }

    pub fn with_engine_mode(mut self, oem: EngineMode) -> Self {
        self.oem = oem;
        self
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn set_image(&mut self, image: impl Into<PathBuf>) {
        self.image = image.into();
    }

    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    pub fn set_output_base(&mut self, output_base: impl Into<PathBuf>) {
        self.output_base = output_base.into();
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn set_extension(&mut self, extension: impl Into<String>) {
        self.extension = extension.into();
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    pub fn page_segmentation_mode(&self) -> PageSegmentationMode {
        self.psm
    }

    pub fn set_page_segmentation_mode(&mut self, psm: PageSegmentationMode) {
        self.psm = psm;
    }

    pub fn engine_mode(&self) -> EngineMode {
        self.oem
    }

    pub fn set_engine_mode(&mut self, oem: EngineMode) {
        self.oem = oem;
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn set_binary(&mut self, binary: impl Into<String>) {
        self.binary = binary.into();
    }

    /// Whether tesseract will print its text rather than write a file.
    pub fn writes_to_stdout(&self) -> bool {
        self.output_base.as_os_str() == STDOUT_OUTPUT
    }

    /// File tesseract will create, or `None` when writing to stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.writes_to_stdout() {
            return None;
        }
        // OSD-only runs use the OSD renderer whatever format was asked for.
        let extension = if self.psm == PageSegmentationMode::OsdOnly {
            "osd"
        } else {
            output_file_extension(&self.extension)
        };
        let mut path = absolutize(&self.output_base).into_os_string();
        path.push(".");
        path.push(extension);
        Some(PathBuf::from(path))
    }

    /// Arguments passed to tesseract, without the executable name.
    pub fn args(&self) -> Vec<OsString> {
        let output_base = if self.writes_to_stdout() {
            OsString::from(STDOUT_OUTPUT)
        } else {
            absolutize(&self.output_base).into_os_string()
        };

        let mut args = vec![absolutize(&self.image).into_os_string(), output_base];
        // An empty extension would be read as a config file named "".
        if !self.extension.is_empty() {
            args.push(OsString::from(&self.extension));
        }
        args.extend([
            OsString::from("-l"),
            OsString::from(&self.language),
            OsString::from("--psm"),
            OsString::from(self.psm.as_arg()),
            OsString::from("--oem"),
            OsString::from(self.oem.as_arg()),
        ]);
        args
    }

    /// Full command line, executable first.
    pub fn command_line(&self) -> Vec<OsString> {
        let mut line = vec![OsString::from(&self.binary)];
        line.extend(self.args());
        line
    }

    /// Command line rendered for a POSIX shell.
    pub fn display_command(&self) -> String {
        self.command_line()
            .iter()
            .map(|arg| shell_quote(&arg.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check preconditions tesseract would otherwise fail on less clearly.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.image.as_os_str().is_empty() {
            return Err(OcrError::MissingImage);
        }
        let image = absolutize(&self.image);
        if !image.is_file() {
            return Err(OcrError::ImageNotFound(image));
        }
        if !self.writes_to_stdout() {
            let output_base = absolutize(&self.output_base);
            if let Some(dir) = output_base.parent() {
                if !dir.is_dir() {
                    return Err(OcrError::OutputDirNotFound(dir.to_path_buf()));
                }
            }
        }
        Ok(())
    }

    /// Run tesseract and block until it exits.
    pub fn run(&self) -> Result<OcrOutput, OcrError> {
        if let Err(e) = self.validate() {
            tracing::warn!("Not running tesseract: {}", e);
            return Err(e);
        }

        tracing::debug!("Running: {}", self.display_command());
        let start = Instant::now();

        let child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let err = OcrError::from_spawn(e, &self.binary);
                tracing::error!("{}", err);
                err
            })?;

        let output = child.wait_with_output().map_err(|e| {
            let err = OcrError::WaitInterrupted(e);
            tracing::error!("{}", err);
            err
        })?;
        let elapsed = start.elapsed();

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            let err = OcrError::NonZeroExit {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            };
            tracing::warn!("{}", err);
            return Err(err);
        }

        let text = self
            .writes_to_stdout()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string());
        let output_path = self.output_path();

        tracing::info!(
            "OCR of {} finished in {}ms",
            self.image.display(),
            elapsed.as_millis()
        );

        Ok(OcrOutput {
            output_path,
            text,
            stderr,
            processing_time_ms: elapsed.as_millis() as u64,
        })
    }

    /// Check if the configured executable resolves.
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Describe what's needed to make tesseract runnable.
    pub fn availability_hint(&self) -> String {
        match which::which(&self.binary) {
            Ok(path) => format!("Tesseract is available at {}", path.display()),
            Err(_) if self.binary == DEFAULT_BINARY => {
                "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
            }
            Err(_) => format!("{} not found", self.binary),
        }
    }
}

/// Extension of the file tesseract writes for a requested output format.
pub fn output_file_extension(format: &str) -> &str {
    match format {
        "" | "txt" => "txt",
        "alto" | "page" => "xml",
        "box" | "lstmbox" | "makebox" | "wordstrbox" => "box",
        other => other,
    }
}

/// Double-quote an argument when a shell would otherwise split or expand it.
fn shell_quote(arg: &str) -> String {
    const SPECIAL: &[char] = &[
        '"', '\'', '\\', '$', '`', '&', '|', ';', '<', '>', '(', ')', '*', '?',
    ];
    if !arg.is_empty() && !arg.contains(char::is_whitespace) && !arg.contains(SPECIAL) {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Resolve a relative path against the current directory.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(ocr: &TesseractOcr) -> Vec<String> {
        ocr.args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_defaults() {
        let ocr = TesseractOcr::new("/tmp/scan.png", "/tmp/scan");
        assert_eq!(ocr.extension(), "");
        assert_eq!(ocr.language(), "eng");
        assert_eq!(ocr.page_segmentation_mode().value(), 3);
        assert_eq!(ocr.engine_mode().value(), 3);
        assert_eq!(ocr.binary(), "tesseract");
    }

    #[test]
    fn test_default_args() {
        let ocr = TesseractOcr::new("/tmp/scan.png", "/tmp/scan");
        assert_eq!(
            args_as_strings(&ocr),
            vec!["/tmp/scan.png", "/tmp/scan", "-l", "eng", "--psm", "3", "--oem", "3"]
        );
    }

    #[test]
    fn test_setters_reflected_in_args() {
        let mut ocr = TesseractOcr::new("/tmp/a.png", "/tmp/a");
        ocr.set_image("/data/page.tif");
        ocr.set_output_base("/out/page");
        ocr.set_extension("hocr");
        ocr.set_language("eng+por");
        ocr.set_page_segmentation_mode(PageSegmentationMode::SingleBlock);
        ocr.set_engine_mode(EngineMode::LstmOnly);
        ocr.set_binary("/opt/tesseract/bin/tesseract");

        assert_eq!(
            args_as_strings(&ocr),
            vec![
                "/data/page.tif",
                "/out/page",
                "hocr",
                "-l",
                "eng+por",
                "--psm",
                "6",
                "--oem",
                "1"
            ]
        );
        assert_eq!(
            ocr.command_line()[0].to_string_lossy(),
            "/opt/tesseract/bin/tesseract"
        );
    }

    #[test]
    fn test_builder_matches_setters() {
        let built = TesseractOcr::new("/in.png", "/out")
            .with_extension("pdf")
            .with_language("deu")
            .with_page_segmentation_mode(PageSegmentationMode::SparseText)
            .with_engine_mode(EngineMode::LegacyOnly);

        let mut set = TesseractOcr::new("/in.png", "/out");
        set.set_extension("pdf");
        set.set_language("deu");
        set.set_page_segmentation_mode(PageSegmentationMode::SparseText);
        set.set_engine_mode(EngineMode::LegacyOnly);

        assert_eq!(built, set);
    }

    #[test]
    fn test_relative_paths_made_absolute() {
        let ocr = TesseractOcr::new("scan.png", "out/scan");
        let args = ocr.args();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(PathBuf::from(&args[0]), cwd.join("scan.png"));
        assert_eq!(PathBuf::from(&args[1]), cwd.join("out/scan"));
    }

    #[test]
    fn test_output_path_uses_format_extension() {
        let mut ocr = TesseractOcr::new("/in.png", "/out/page");
        assert_eq!(ocr.output_path(), Some(PathBuf::from("/out/page.txt")));
        ocr.set_extension("alto");
        assert_eq!(ocr.output_path(), Some(PathBuf::from("/out/page.xml")));
        ocr.set_extension("tsv");
        assert_eq!(ocr.output_path(), Some(PathBuf::from("/out/page.tsv")));
    }

    #[test]
    fn test_osd_only_writes_osd_file() {
        let ocr = TesseractOcr::new("/in.png", "/out/page")
            .with_page_segmentation_mode(PageSegmentationMode::OsdOnly);
        assert_eq!(ocr.output_path(), Some(PathBuf::from("/out/page.osd")));

        let ocr = ocr.with_extension("hocr");
        assert_eq!(ocr.output_path(), Some(PathBuf::from("/out/page.osd")));
    }

    #[test]
    fn test_stdout_output_base_passed_verbatim() {
        let ocr = TesseractOcr::new("/in.png", STDOUT_OUTPUT);
        assert!(ocr.writes_to_stdout());
        assert_eq!(ocr.output_path(), None);
        assert_eq!(args_as_strings(&ocr)[1], "stdout");
    }

    #[test]
    fn test_missing_image_reported() {
        let ocr = TesseractOcr::default();
        assert!(matches!(ocr.run(), Err(OcrError::MissingImage)));

        let ocr = TesseractOcr::new("/definitely/not/here.png", "/tmp/out");
        match ocr.run() {
            Err(OcrError::ImageNotFound(path)) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.png"))
            }
            other => panic!("expected ImageNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_display_command_quotes_spaces() {
        let ocr = TesseractOcr::new("/my scans/a.png", "/out/a");
        let shown = ocr.display_command();
        assert!(shown.starts_with("tesseract \"/my scans/a.png\" /out/a -l eng"));
    }

    #[test]
    fn test_display_command_escapes_quotes() {
        let ocr = TesseractOcr::new(r#"/scans/say "hi".png"#, "/out/$HOME");
        let shown = ocr.display_command();
        assert!(shown.starts_with(r#"tesseract "/scans/say \"hi\".png" "/out/\$HOME" -l"#));
        assert_eq!(shell_quote(""), "\"\"");
        assert_eq!(shell_quote("eng+por"), "eng+por");
    }

    #[test]
    fn test_output_file_extension() {
        assert_eq!(output_file_extension(""), "txt");
        assert_eq!(output_file_extension("hocr"), "hocr");
        assert_eq!(output_file_extension("lstmbox"), "box");
        assert_eq!(output_file_extension("custom"), "custom");
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let ocr: TesseractOcr =
            serde_json::from_str(r#"{"image": "/in.png", "output_base": "/out", "psm": 7}"#)
                .unwrap();
        assert_eq!(ocr.language(), "eng");
        assert_eq!(ocr.page_segmentation_mode(), PageSegmentationMode::SingleLine);
        assert_eq!(ocr.engine_mode(), EngineMode::Default);
    }
}
