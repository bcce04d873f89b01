//! Filename sanitization for engine artifacts.

use std::path::Path;

/// Maximum length of a sanitized base name.
const MAX_BASE_NAME_LEN: usize = 50;

/// Derive a filesystem-safe base name from a clip's display name.
///
/// Strips the extension and maps every character outside `[A-Za-z0-9_-]`
/// to `_`. May return an empty string (e.g. for an empty display name);
/// callers fall back to a synthetic name in that case.
pub fn sanitize_base_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(MAX_BASE_NAME_LEN)
        .collect()
}
