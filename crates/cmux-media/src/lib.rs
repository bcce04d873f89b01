//! FFmpeg CLI boundary for the ClipMux export pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Fit filter expressions for aspect conversion
//! - FFprobe duration probing for raw byte sources
//! - The [`engine::TranscodeEngine`] seam and its ffmpeg-backed
//!   implementation
//! - Ephemeral binary-resource ownership

pub mod command;
pub mod engine;
pub mod error;
pub mod filters;
pub mod probe;
pub mod progress;
pub mod resource;

// Re-export common types
pub use command::{FfmpegCommand, FfmpegRunner};
pub use engine::{FfmpegEngine, TranscodeEngine};
pub use error::{MediaError, MediaResult};
pub use filters::fit_filter;
pub use probe::{extension_hint, DurationProbe, FfprobeDuration};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use resource::{ResourceHandle, ResourceStore};
