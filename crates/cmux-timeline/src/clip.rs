//! Clip entities.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use cmux_media::ResourceHandle;

/// Unique, stable identifier for an imported clip. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipId(String);

impl ClipId {
    /// Generate a new random clip ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw media byte source handed to the store for import.
#[derive(Debug, Clone)]
pub struct ClipSource {
    /// Display name (typically the source file name).
    pub name: String,
    /// Raw media bytes.
    pub media: Arc<[u8]>,
}

impl ClipSource {
    pub fn new(name: impl Into<String>, media: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media: media.into(),
        }
    }
}

/// One imported source video and its trim/inclusion state.
///
/// Trim fields may transiently hold invalid combinations while the user
/// edits them; validity is derived on demand by
/// [`effective_range`](crate::range::effective_range), never stored here.
#[derive(Debug)]
pub struct Clip {
    /// Stable identity assigned at import.
    pub id: ClipId,
    /// Display name.
    pub name: String,
    /// Raw media bytes.
    pub media: Arc<[u8]>,
    /// Probed duration in seconds, `0.0` if unreadable.
    pub duration: f64,
    /// Whether the clip participates in the export.
    pub include: bool,
    /// Whether the trim fields apply.
    pub trim_enabled: bool,
    /// Trim start in seconds. Meaningful only when `trim_enabled`.
    pub trim_start: f64,
    /// Trim end in seconds. Meaningful only when `trim_enabled`.
    pub trim_end: f64,
    /// Whether a fixed trailing duration is cut instead of `trim_end`.
    pub remove_outro: bool,
    /// Trailing seconds to cut; seeded from the global default at import.
    pub outro_seconds: f64,
    /// Batch-operation target flag. Orthogonal to `include`.
    pub selected: bool,
    /// Ephemeral preview resource; released on replacement or teardown.
    pub preview: Option<ResourceHandle>,
}

impl Clip {
    /// Create a clip with import-time defaults.
    pub(crate) fn from_source(source: ClipSource, duration: f64, default_outro: f64) -> Self {
        Self {
            id: ClipId::new(),
            name: source.name,
            media: source.media,
            duration,
            include: true,
            trim_enabled: true,
            trim_start: 0.0,
            trim_end: duration,
            remove_outro: false,
            outro_seconds: default_outro,
            selected: false,
            preview: None,
        }
    }

    /// Size of the raw media in bytes.
    pub fn media_len(&self) -> u64 {
        self.media.len() as u64
    }
}
