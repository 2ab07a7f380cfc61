use std::ops::Range;

/// Number of segments needed to cover `length_ms` in slices of `duration_ms`.
///
/// Returns zero when either value is zero.
pub fn segment_count(length_ms: u64, duration_ms: u64) -> usize {
    if duration_ms == 0 {
        return 0;
    }

    let mut count = length_ms / duration_ms;
    if length_ms % duration_ms > 0 {
        count += 1;
    }
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// Contiguous millisecond ranges covering `[0, length_ms)`.
///
/// Every range is `duration_ms` long except the last, which stops at
/// `length_ms`.
pub fn segment_ranges(length_ms: u64, duration_ms: u64) -> SegmentRanges {
    SegmentRanges {
        next: 0,
        length_ms,
        duration_ms,
    }
}

/// Iterator returned by [`segment_ranges`].
#[derive(Clone, Debug)]
pub struct SegmentRanges {
    next: u64,
    length_ms: u64,
    duration_ms: u64,
}

impl Iterator for SegmentRanges {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.duration_ms == 0 || self.next >= self.length_ms {
            return None;
        }

        let start = self.next;
        let end = start.saturating_add(self.duration_ms).min(self.length_ms);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = segment_count(
            self.length_ms.saturating_sub(self.next),
            self.duration_ms,
        );
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SegmentRanges {}
