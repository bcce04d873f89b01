//! Shared data models for the ClipMux export pipeline.
//!
//! This crate provides the pure types used across the workspace:
//! - Aspect presets and fit modes
//! - Effective export ranges and their validation issues
//! - Encoding configuration
//! - Session limits and filename sanitization

pub mod encoding;
pub mod limits;
pub mod naming;
pub mod preset;
pub mod range;

// Re-export common types
pub use encoding::EncodingConfig;
pub use limits::{MAX_CLIPS_PER_SESSION, WARN_INCLUDED_CLIPS, WARN_TOTAL_MEDIA_BYTES};
pub use naming::sanitize_base_name;
pub use preset::{AspectPreset, FitMode};
pub use range::{EffectiveRange, RangeIssue};
