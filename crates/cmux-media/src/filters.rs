//! FFmpeg video filter expressions for aspect conversion.

use cmux_models::{AspectPreset, FitMode};

/// Scale to fill `w`x`h` preserving aspect ratio, then crop the excess.
pub fn cover_filter(w: u32, h: u32) -> String {
    format!("scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}")
}

/// Scale to fit within `w`x`h` preserving aspect ratio, then pad
/// symmetrically to exactly `w`x`h`.
pub fn contain_filter(w: u32, h: u32) -> String {
    format!("scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2")
}

/// Build the filter chain for a preset and fit mode.
pub fn fit_filter(preset: AspectPreset, fit: FitMode) -> String {
    let (w, h) = (preset.width(), preset.height());
    match fit {
        FitMode::Cover => cover_filter(w, h),
        FitMode::Contain => contain_filter(w, h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_scales_up_then_crops() {
        let filter = fit_filter(AspectPreset::Landscape, FitMode::Cover);
        assert_eq!(
            filter,
            "scale=1920:1080:force_original_aspect_ratio=increase,crop=1920:1080"
        );
    }

    #[test]
    fn test_contain_scales_down_then_pads() {
        let filter = fit_filter(AspectPreset::Shorts, FitMode::Contain);
        assert!(filter.starts_with("scale=1080:1920:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("pad=1080:1920:(ow-iw)/2:(oh-ih)/2"));
    }

    #[test]
    fn test_square_preset() {
        let filter = fit_filter(AspectPreset::Square, FitMode::Cover);
        assert!(filter.contains("crop=1080:1080"));
    }
}
