//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from one FFmpeg invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether the invocation reported `progress=end`
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Fraction of the operation done, given the expected output duration
    /// in seconds. Clamped to `[0, 1]`; zero when the duration is unknown.
    pub fn fraction(&self, expected_seconds: f64) -> f64 {
        if self.is_complete {
            return 1.0;
        }
        if expected_seconds <= 0.0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / 1000.0) / expected_seconds).clamp(0.0, 1.0)
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(FfmpegProgress) + Send + Sync + 'static>;

/// Parse one line of FFmpeg's `-progress` key/value output, accumulating
/// into `current`. Returns a snapshot on each `progress=` record boundary.
pub(crate) fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let (key, value) = line.trim().split_once('=')?;

    match key {
        // Microseconds despite the name on modern FFmpeg; out_time_us is
        // the unambiguous spelling.
        "out_time_us" | "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            return Some(current.clone());
        }
        _ => {}
    }

    None
}
