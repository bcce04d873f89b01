//! Session limits surfaced to callers.

/// Hard cap on clips held in one session. Imports that would exceed this
/// are rejected wholesale.
pub const MAX_CLIPS_PER_SESSION: usize = 30;

/// Included-clip count above which a non-fatal warning is raised.
pub const WARN_INCLUDED_CLIPS: usize = 10;

/// Combined media size above which a non-fatal warning is raised (500 MiB).
pub const WARN_TOTAL_MEDIA_BYTES: u64 = 500 * 1024 * 1024;
