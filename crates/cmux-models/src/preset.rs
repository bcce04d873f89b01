//! Output geometry presets and fit modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named output geometry. The catalog is fixed and process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectPreset {
    /// Vertical 1080x1920 for Shorts/Reels
    #[default]
    Shorts,
    /// Landscape 1920x1080
    Landscape,
    /// Square 1080x1080
    Square,
}

impl AspectPreset {
    /// All presets, in display order.
    pub const ALL: &'static [AspectPreset] =
        &[AspectPreset::Shorts, AspectPreset::Landscape, AspectPreset::Square];

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            AspectPreset::Shorts => 1080,
            AspectPreset::Landscape => 1920,
            AspectPreset::Square => 1080,
        }
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            AspectPreset::Shorts => 1920,
            AspectPreset::Landscape => 1080,
            AspectPreset::Square => 1080,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectPreset::Shorts => "shorts",
            AspectPreset::Landscape => "landscape",
            AspectPreset::Square => "square",
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectPreset {
    type Err = PresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shorts" => Ok(AspectPreset::Shorts),
            "landscape" => Ok(AspectPreset::Landscape),
            "square" => Ok(AspectPreset::Square),
            _ => Err(PresetParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect preset: {0}")]
pub struct PresetParseError(String);

/// How a clip is rescaled to the target geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale to fill the target, cropping the excess.
    #[default]
    Cover,
    /// Scale to fit inside the target, padding symmetrically.
    Contain,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMode::Cover => "cover",
            FitMode::Contain => "contain",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = FitModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cover" => Ok(FitMode::Cover),
            "contain" => Ok(FitMode::Contain),
            _ => Err(FitModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown fit mode: {0}")]
pub struct FitModeParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_dimensions() {
        assert_eq!(AspectPreset::Shorts.width(), 1080);
        assert_eq!(AspectPreset::Shorts.height(), 1920);
        assert_eq!(AspectPreset::Landscape.width(), 1920);
        assert_eq!(AspectPreset::Square.width(), AspectPreset::Square.height());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("shorts".parse::<AspectPreset>().unwrap(), AspectPreset::Shorts);
        assert_eq!("LANDSCAPE".parse::<AspectPreset>().unwrap(), AspectPreset::Landscape);
        assert!("portrait".parse::<AspectPreset>().is_err());
    }

    #[test]
    fn test_fit_mode_parse() {
        assert_eq!("cover".parse::<FitMode>().unwrap(), FitMode::Cover);
        assert_eq!("Contain".parse::<FitMode>().unwrap(), FitMode::Contain);
        assert!("stretch".parse::<FitMode>().is_err());
    }
}
