//! Exporter configuration.

use std::path::PathBuf;

use cmux_models::{AspectPreset, FitMode};

use crate::orchestrator::ExportOptions;

/// Seconds cut from a clip's tail when outro removal is enabled and no
/// per-clip override is set.
pub const DEFAULT_OUTRO_SECONDS: f64 = 3.0;

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Target output geometry
    pub preset: AspectPreset,
    /// Fit mode when rescaling
    pub fit: FitMode,
    /// Global default for per-clip outro seconds
    pub default_outro_seconds: f64,
    /// Where the final output is written
    pub output: PathBuf,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            preset: AspectPreset::Shorts,
            fit: FitMode::Cover,
            default_outro_seconds: DEFAULT_OUTRO_SECONDS,
            output: PathBuf::from("export.mp4"),
        }
    }
}

impl ExporterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            preset: std::env::var("CMUX_ASPECT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.preset),
            fit: std::env::var("CMUX_FIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fit),
            default_outro_seconds: std::env::var("CMUX_OUTRO_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_outro_seconds),
            output: std::env::var("CMUX_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
        }
    }

    /// Export options for one run.
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            preset: self.preset,
            fit: self.fit,
            encoding: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::default();
        assert_eq!(config.preset, AspectPreset::Shorts);
        assert_eq!(config.fit, FitMode::Cover);
        assert_eq!(config.output, PathBuf::from("export.mp4"));
    }
}
