//! FFprobe duration probing for raw media bytes.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Probes the container duration of a raw media byte source.
///
/// A probe error is a hard failure (the source could not be inspected at
/// all); a source that inspects cleanly but carries no duration yields
/// `0.0` and is caught later by range validation.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Probe the duration, in seconds, of `media`. `name` is the source's
    /// display name, used for extension hints and diagnostics.
    async fn probe_duration(&self, name: &str, media: &[u8]) -> MediaResult<f64>;
}

/// FFprobe JSON output, reduced to what duration probing needs.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Extract the duration from ffprobe's `-print_format json` output.
fn parse_duration(json: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0))
}

/// [`DurationProbe`] backed by the `ffprobe` binary.
///
/// The byte source is spooled to a temporary file for the duration of the
/// probe; ffprobe sniffs the container from content, the original
/// extension is kept only as a hint.
pub struct FfprobeDuration;

#[async_trait]
impl DurationProbe for FfprobeDuration {
    async fn probe_duration(&self, name: &str, media: &[u8]) -> MediaResult<f64> {
        which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

        let dir = tempfile::Builder::new().prefix("cmux-probe").tempdir()?;
        let ext = extension_hint(name);
        let spool = dir.path().join(format!("source.{ext}"));
        tokio::fs::write(&spool, media).await?;

        let duration = run_ffprobe(&spool).await?;
        debug!(source = %name, duration, "probed media duration");
        Ok(duration)
    }
}

async fn run_ffprobe(path: &Path) -> MediaResult<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "FFprobe exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    parse_duration(&output.stdout)
}

/// Extension of the display name, lowercased, when it looks like a media
/// extension; `mp4` otherwise.
pub fn extension_hint(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 4 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}
