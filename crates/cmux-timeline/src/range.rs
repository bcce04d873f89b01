//! The range resolver: trim state in, validated export range out.

use cmux_models::{EffectiveRange, RangeIssue};

use crate::clip::Clip;

/// Resolve the effective export range of a clip.
///
/// Pure and idempotent; safe to call on every render. Never writes back to
/// the clip. The four validation checks run in a fixed precedence so the
/// reported issue is deterministic.
pub fn effective_range(clip: &Clip) -> EffectiveRange {
    if !clip.trim_enabled {
        return if clip.duration > 0.0 {
            EffectiveRange::valid(0.0, clip.duration)
        } else {
            EffectiveRange::invalid(0.0, clip.duration, RangeIssue::NoDuration)
        };
    }

    let start = clip.trim_start;
    let end = if clip.remove_outro {
        (clip.duration - clip.outro_seconds).max(0.0)
    } else {
        clip.trim_end
    };

    let issue = if !start.is_finite() || !end.is_finite() {
        Some(RangeIssue::NonFinite)
    } else if start < 0.0 {
        Some(RangeIssue::NegativeStart)
    } else if end > clip.duration {
        Some(RangeIssue::EndPastDuration)
    } else if end <= start {
        Some(RangeIssue::EndNotAfterStart)
    } else {
        None
    };

    match issue {
        None => EffectiveRange::valid(start, end),
        Some(issue) => EffectiveRange::invalid(start, end, issue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipSource;

    fn clip(duration: f64) -> Clip {
        Clip::from_source(ClipSource::new("test.mp4", vec![0u8]), duration, 0.0)
    }

    #[test]
    fn test_trim_disabled_spans_whole_clip() {
        let mut c = clip(20.0);
        c.trim_enabled = false;
        let range = effective_range(&c);
        assert_eq!((range.start, range.end), (0.0, 20.0));
        assert!(range.is_valid());
    }

    #[test]
    fn test_trim_disabled_without_duration() {
        let mut c = clip(0.0);
        c.trim_enabled = false;
        let range = effective_range(&c);
        assert_eq!(range.issue, Some(RangeIssue::NoDuration));
        assert_eq!(range.issue.unwrap().to_string(), "no readable duration");
    }

    #[test]
    fn test_outro_removal() {
        // duration=20, outro=4.55 resolves to [0.0, 15.45]
        let mut c = clip(20.0);
        c.remove_outro = true;
        c.outro_seconds = 4.55;
        let range = effective_range(&c);
        assert!(range.is_valid());
        assert_eq!(range.start, 0.0);
        assert!((range.end - 15.45).abs() < 1e-9);
    }

    #[test]
    fn test_outro_longer_than_clip_clamps_to_zero() {
        let mut c = clip(3.0);
        c.remove_outro = true;
        c.outro_seconds = 10.0;
        let range = effective_range(&c);
        assert_eq!(range.end, 0.0);
        assert_eq!(range.issue, Some(RangeIssue::EndNotAfterStart));
    }

    #[test]
    fn test_end_before_start() {
        let mut c = clip(20.0);
        c.trim_start = 5.0;
        c.trim_end = 3.0;
        let range = effective_range(&c);
        assert_eq!(range.issue, Some(RangeIssue::EndNotAfterStart));
        assert_eq!(range.issue.unwrap().to_string(), "end must be greater than start");
    }

    #[test]
    fn test_check_precedence() {
        // Non-finite wins over everything else
        let mut c = clip(20.0);
        c.trim_start = f64::NAN;
        c.trim_end = -5.0;
        assert_eq!(effective_range(&c).issue, Some(RangeIssue::NonFinite));

        // Negative start wins over end checks
        let mut c = clip(20.0);
        c.trim_start = -1.0;
        c.trim_end = 30.0;
        assert_eq!(effective_range(&c).issue, Some(RangeIssue::NegativeStart));

        // End past duration wins over end-not-after-start
        let mut c = clip(20.0);
        c.trim_start = 25.0;
        c.trim_end = 22.0;
        assert_eq!(effective_range(&c).issue, Some(RangeIssue::EndPastDuration));
    }

    #[test]
    fn test_zero_length_trim_is_invalid() {
        let mut c = clip(20.0);
        c.trim_start = 5.0;
        c.trim_end = 5.0;
        assert_eq!(effective_range(&c).issue, Some(RangeIssue::EndNotAfterStart));
    }

    #[test]
    fn test_resolver_does_not_mutate() {
        let mut c = clip(20.0);
        c.trim_start = 2.0;
        c.trim_end = 8.0;
        let before = (c.trim_start, c.trim_end, c.duration);
        let _ = effective_range(&c);
        let _ = effective_range(&c);
        assert_eq!(before, (c.trim_start, c.trim_end, c.duration));
    }
}
