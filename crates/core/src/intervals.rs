//! Date-interval splitting.
//!
//! The remote service refuses calendar-view finds whose result set exceeds
//! its count limit. The client routes around that by bisecting the offending
//! range and querying each half, recursively. The arithmetic lives here so it
//! can be tested without a gateway.

use calbridge_domain::constants::MAX_RANGE_SPAN_DAYS;
use calbridge_domain::{ClientError, DateRange, Result};
use chrono::Duration;

/// Rejects ranges wider than the widest span a single sweep may cover.
///
/// A decade-scale range is a caller bug, not something bisection should
/// grind through.
pub fn check_span(range: DateRange) -> Result<()> {
    if range.span() > Duration::days(MAX_RANGE_SPAN_DAYS) {
        return Err(ClientError::invalid_argument(format!(
            "range {} .. {} spans more than {MAX_RANGE_SPAN_DAYS} days",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

/// Splits `range` into two contiguous halves at its midpoint.
///
/// The halves abut exactly: the left half ends where the right half starts,
/// so their union covers `range` with no gap and no overlap. Fails with
/// [`ClientError::InvalidArgument`] when the range is too narrow to yield two
/// non-empty halves.
pub fn bisect(range: DateRange) -> Result<(DateRange, DateRange)> {
    let mid = range.start() + range.span() / 2;
    let left = DateRange::new(range.start(), mid).map_err(|_| {
        ClientError::invalid_argument(format!(
            "range {} .. {} is too narrow to bisect",
            range.start(),
            range.end()
        ))
    })?;
    let right = DateRange::new(mid, range.end()).map_err(|_| {
        ClientError::invalid_argument(format!(
            "range {} .. {} is too narrow to bisect",
            range.start(),
            range.end()
        ))
    })?;
    Ok((left, right))
}

/// Clamps `range` so that it spans at most `max_span`.
///
/// Ranges already within the limit come back unchanged; longer ones keep
/// their start and get a truncated end.
pub fn cap_at(range: DateRange, max_span: Duration) -> Result<DateRange> {
    if max_span <= Duration::zero() {
        return Err(ClientError::invalid_argument(format!(
            "maximum span must be positive, got {max_span}"
        )));
    }
    if range.span() <= max_span {
        return Ok(range);
    }
    DateRange::new(range.start(), range.start() + max_span)
}

/// Splits `range` into at least `target` contiguous sub-ranges.
///
/// Works in doubling passes: every pass bisects each current sub-range, so the
/// resulting count is the smallest power of two that is `>= max(2, target)`.
/// The sub-ranges abut and cover `range` exactly.
pub fn multi_split(range: DateRange, target: usize) -> Result<Vec<DateRange>> {
    let mut parts = {
        let (left, right) = bisect(range)?;
        vec![left, right]
    };
    while parts.len() < target {
        let mut next = Vec::with_capacity(parts.len() * 2);
        for part in parts {
            let (left, right) = bisect(part)?;
            next.push(left);
            next.push(right);
        }
        parts = next;
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            start.parse::<DateTime<Utc>>().unwrap(),
            end.parse::<DateTime<Utc>>().unwrap(),
        )
        .unwrap()
    }

    /// Validates `bisect` midpoint placement for a one-day range.
    ///
    /// Assertions:
    /// - The split point is exactly noon
    /// - The halves abut and reproduce the original bounds
    #[test]
    fn bisect_splits_a_day_at_noon() {
        let day = range("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");

        let (left, right) = bisect(day).unwrap();

        assert_eq!(left.start(), day.start());
        assert_eq!(left.end(), "2024-01-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(right.start(), left.end());
        assert_eq!(right.end(), day.end());
    }

    /// Validates `bisect` behavior on uneven spans.
    ///
    /// Assertions:
    /// - Halves still abut exactly (no gap, no overlap)
    /// - The union covers the original range
    #[test]
    fn bisect_preserves_coverage_on_odd_spans() {
        let r = range("2024-03-10T06:15:00Z", "2024-03-13T19:02:03Z");

        let (left, right) = bisect(r).unwrap();

        assert_eq!(left.end(), right.start());
        assert_eq!(left.start(), r.start());
        assert_eq!(right.end(), r.end());
    }

    /// Validates `cap_at` truncation.
    ///
    /// Assertions:
    /// - A range within the limit is untouched
    /// - A longer range keeps its start and loses its tail
    #[test]
    fn cap_at_truncates_long_ranges_only() {
        let short = range("2024-01-01T00:00:00Z", "2024-01-03T00:00:00Z");
        let long = range("2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z");

        let kept = cap_at(short, Duration::days(10)).unwrap();
        let cut = cap_at(long, Duration::days(10)).unwrap();

        assert_eq!(kept, short);
        assert_eq!(cut.start(), long.start());
        assert_eq!(cut.span(), Duration::days(10));
    }

    /// Validates `multi_split` part counts and coverage.
    ///
    /// Assertions:
    /// - The count is the smallest power of two at or above the target
    /// - Consecutive parts abut and the ends match the original range
    #[test]
    fn multi_split_doubles_until_target_reached() {
        let r = range("2024-01-01T00:00:00Z", "2024-05-01T00:00:00Z");

        for (target, expected) in [(1, 2), (2, 2), (3, 4), (5, 8), (8, 8), (9, 16)] {
            let parts = multi_split(r, target).unwrap();
            assert_eq!(parts.len(), expected, "target {target}");
            assert_eq!(parts.first().unwrap().start(), r.start());
            assert_eq!(parts.last().unwrap().end(), r.end());
            for pair in parts.windows(2) {
                assert_eq!(pair[0].end(), pair[1].start());
            }
        }
    }

    /// Validates the span ceiling on sweep ranges.
    ///
    /// Assertions:
    /// - A decade-wide range is rejected with `InvalidArgument`
    /// - An ordinary range passes
    #[test]
    fn check_span_rejects_decade_wide_ranges() {
        let ordinary = range("2024-01-01T00:00:00Z", "2024-12-31T00:00:00Z");
        let start = "2014-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let decade = DateRange::new(start, start + Duration::days(3661)).unwrap();

        assert!(check_span(ordinary).is_ok());
        assert!(matches!(check_span(decade), Err(ClientError::InvalidArgument(_))));
    }

    /// Validates rejection of ranges too narrow to split.
    ///
    /// Assertions:
    /// - Bisecting a one-nanosecond range fails with `InvalidArgument`
    #[test]
    fn bisect_rejects_unsplittable_range() {
        let start = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let r = DateRange::new(start, start + Duration::nanoseconds(1)).unwrap();

        let err = bisect(r).unwrap_err();

        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }
}
