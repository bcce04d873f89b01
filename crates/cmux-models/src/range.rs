//! Effective export ranges.
//!
//! An [`EffectiveRange`] is always computed fresh from a clip's trim state;
//! it is never stored or cached on the clip itself.

use serde::Serialize;
use std::fmt;

/// Why a resolved range cannot be exported.
///
/// Variants are ordered by validation precedence: the first failing check
/// determines the reported issue, so error messages stay deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeIssue {
    /// The clip's duration could not be read at import time.
    NoDuration,
    /// Start or end is NaN or infinite.
    NonFinite,
    /// Start is before zero.
    NegativeStart,
    /// End lies past the clip's duration.
    EndPastDuration,
    /// End does not come after start.
    EndNotAfterStart,
}

impl RangeIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeIssue::NoDuration => "no readable duration",
            RangeIssue::NonFinite => "start and end must be finite numbers",
            RangeIssue::NegativeStart => "start must not be negative",
            RangeIssue::EndPastDuration => "end exceeds clip duration",
            RangeIssue::EndNotAfterStart => "end must be greater than start",
        }
    }
}

impl fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `[start, end)` interval of a clip actually used in an export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveRange {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
    /// Set when the range cannot be exported as-is.
    pub issue: Option<RangeIssue>,
}

impl EffectiveRange {
    /// A range that passed validation.
    pub fn valid(start: f64, end: f64) -> Self {
        Self { start, end, issue: None }
    }

    /// A range rejected by validation.
    pub fn invalid(start: f64, end: f64, issue: RangeIssue) -> Self {
        Self { start, end, issue: Some(issue) }
    }

    pub fn is_valid(&self) -> bool {
        self.issue.is_none()
    }

    /// Exported duration in seconds. Zero for invalid ranges.
    pub fn seconds(&self) -> f64 {
        if self.is_valid() {
            self.end - self.start
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range_seconds() {
        let range = EffectiveRange::valid(1.5, 10.0);
        assert!(range.is_valid());
        assert!((range.seconds() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_range_has_zero_seconds() {
        let range = EffectiveRange::invalid(5.0, 3.0, RangeIssue::EndNotAfterStart);
        assert!(!range.is_valid());
        assert_eq!(range.seconds(), 0.0);
    }

    #[test]
    fn test_issue_messages_are_distinct() {
        let issues = [
            RangeIssue::NoDuration,
            RangeIssue::NonFinite,
            RangeIssue::NegativeStart,
            RangeIssue::EndPastDuration,
            RangeIssue::EndNotAfterStart,
        ];
        for (i, a) in issues.iter().enumerate() {
            for b in &issues[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
        assert_eq!(RangeIssue::EndNotAfterStart.to_string(), "end must be greater than start");
    }
}
