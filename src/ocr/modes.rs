//! Tesseract page-segmentation (`--psm`) and engine (`--oem`) modes.
//!
//! Each variant's discriminant is the numeric code tesseract expects on its
//! command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mode code outside the range tesseract documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} code: {value}")]
pub struct InvalidModeError {
    pub kind: &'static str,
    pub value: String,
}

/// How tesseract partitions the page layout before recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum PageSegmentationMode {
    OsdOnly = 0,
    AutoWithOsd = 1,
    AutoOnly = 2,
    #[default]
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PageSegmentationMode {
    pub const ALL: [PageSegmentationMode; 14] = [
        Self::OsdOnly,
        Self::AutoWithOsd,
        Self::AutoOnly,
        Self::Auto,
        Self::SingleColumn,
        Self::SingleBlockVertical,
        Self::SingleBlock,
        Self::SingleLine,
        Self::SingleWord,
        Self::CircleWord,
        Self::SingleChar,
        Self::SparseText,
        Self::SparseTextOsd,
        Self::RawLine,
    ];

    /// Numeric code passed to `--psm`.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Code rendered as a command-line argument.
    pub fn as_arg(self) -> String {
        self.value().to_string()
    }

    /// Tesseract's own description of the mode.
    pub fn description(self) -> &'static str {
        match self {
            Self::OsdOnly => "Orientation and script detection (OSD) only",
            Self::AutoWithOsd => "Automatic page segmentation with OSD",
            Self::AutoOnly => "Automatic page segmentation, but no OSD, or OCR",
            Self::Auto => "Fully automatic page segmentation, but no OSD",
            Self::SingleColumn => "Assume a single column of text of variable sizes",
            Self::SingleBlockVertical => {
                "Assume a single uniform block of vertically aligned text"
            }
            Self::SingleBlock => "Assume a single uniform block of text",
            Self::SingleLine => "Treat the image as a single text line",
            Self::SingleWord => "Treat the image as a single word",
            Self::CircleWord => "Treat the image as a single word in a circle",
            Self::SingleChar => "Treat the image as a single character",
            Self::SparseText => "Sparse text, find as much text as possible in no particular order",
            Self::SparseTextOsd => "Sparse text with OSD",
            Self::RawLine => "Raw line, single text line bypassing tesseract-specific hacks",
        }
    }
}

impl TryFrom<u8> for PageSegmentationMode {
    type Error = InvalidModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == value)
            .ok_or_else(|| InvalidModeError {
                kind: "page segmentation mode",
                value: value.to_string(),
            })
    }
}

impl From<PageSegmentationMode> for u8 {
    fn from(mode: PageSegmentationMode) -> Self {
        mode.value()
    }
}

impl FromStr for PageSegmentationMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| InvalidModeError {
                kind: "page segmentation mode",
                value: s.to_string(),
            })
            .and_then(Self::try_from)
    }
}

impl fmt::Display for PageSegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Which recognition engine tesseract runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum EngineMode {
    LegacyOnly = 0,
    LstmOnly = 1,
    LegacyAndLstm = 2,
    #[default]
    Default = 3,
}

impl EngineMode {
    pub const ALL: [EngineMode; 4] = [
        Self::LegacyOnly,
        Self::LstmOnly,
        Self::LegacyAndLstm,
        Self::Default,
    ];

    /// Numeric code passed to `--oem`.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn as_arg(self) -> String {
        self.value().to_string()
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::LegacyOnly => "Legacy engine only",
            Self::LstmOnly => "Neural nets LSTM engine only",
            Self::LegacyAndLstm => "Legacy + LSTM engines",
            Self::Default => "Default, based on what is available",
        }
    }
}

impl TryFrom<u8> for EngineMode {
    type Error = InvalidModeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == value)
            .ok_or_else(|| InvalidModeError {
                kind: "engine mode",
                value: value.to_string(),
            })
    }
}

impl From<EngineMode> for u8 {
    fn from(mode: EngineMode) -> Self {
        mode.value()
    }
}

impl FromStr for EngineMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| InvalidModeError {
                kind: "engine mode",
                value: s.to_string(),
            })
            .and_then(Self::try_from)
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tesseract() {
        assert_eq!(PageSegmentationMode::default().value(), 3);
        assert_eq!(EngineMode::default().value(), 3);
    }

    #[test]
    fn test_codes_are_contiguous() {
        for (i, mode) in PageSegmentationMode::ALL.iter().enumerate() {
            assert_eq!(mode.value() as usize, i);
        }
        for (i, mode) in EngineMode::ALL.iter().enumerate() {
            assert_eq!(mode.value() as usize, i);
        }
    }

    #[test]
    fn test_parse_mode_codes() {
        assert_eq!(
            "7".parse::<PageSegmentationMode>().unwrap(),
            PageSegmentationMode::SingleLine
        );
        assert_eq!(" 1 ".parse::<EngineMode>().unwrap(), EngineMode::LstmOnly);
        assert_eq!(PageSegmentationMode::RawLine.as_arg(), "13");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(PageSegmentationMode::try_from(14).is_err());
        assert!(EngineMode::try_from(4).is_err());
        let err = "auto".parse::<PageSegmentationMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid page segmentation mode code: auto");
    }

    #[test]
    fn test_serde_uses_numeric_code() {
        let json = serde_json::to_string(&PageSegmentationMode::SingleBlock).unwrap();
        assert_eq!(json, "6");
        let oem: EngineMode = serde_json::from_str("2").unwrap();
        assert_eq!(oem, EngineMode::LegacyAndLstm);
        assert!(serde_json::from_str::<EngineMode>("9").is_err());
    }
}
