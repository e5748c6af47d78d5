//! Whitespace-aware slicing of section buffers into page-sized ranges.

use std::ops::Range;

use crate::raster::Bitmap;

/// Splits one section's pixel buffer into page-sized row ranges, cutting
/// at blank interline rows where possible.
///
/// Given a buffer of height `H` and a page capacity of `P` rows, the
/// produced ranges are ordered, non-overlapping, and gap-free over
/// `[0, H)`. Every cut lands within `lookback` rows above its ideal
/// position, except the final cut, which always takes all remaining
/// content even when that means cutting mid-glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlicer {
    /// How many rows above the ideal cut to search for a blank row.
    pub lookback: u32,
    /// Minimum channel intensity for a row to count as blank.
    pub threshold: u8,
}

impl PageSlicer {
    pub fn new() -> Self {
        PageSlicer {
            lookback: 80,
            threshold: 230,
        }
    }

    /// Set the lookback window (builder style).
    pub fn with_lookback(mut self, lookback: u32) -> Self {
        self.lookback = lookback;
        self
    }

    /// Slice `bitmap` into ranges of at most `capacity` rows.
    ///
    /// If a cut fails to advance (possible only when the lookback reaches
    /// at or below the slice start on pathological geometry), slicing
    /// stops early and the returned ranges cover less than the full
    /// buffer; callers can observe the truncation from the final range.
    pub fn slice(&self, bitmap: &Bitmap, capacity: u32) -> Vec<Range<u32>> {
        let height = bitmap.height();
        let mut ranges = Vec::new();
        let mut start = 0u32;

        while start < height {
            let ideal_end = start.saturating_add(capacity).min(height);
            let cut = if ideal_end == height {
                // Final slice takes all remaining content, even mid-glyph.
                height
            } else {
                self.find_safe_break_row(bitmap, ideal_end)
            };

            if cut <= start {
                break;
            }

            ranges.push(start..cut);
            start = cut;
        }

        ranges
    }

    /// Nearest blank row at or above `target`, searched downward through
    /// the lookback window. Falls back to `target` itself when no row in
    /// the window qualifies, accepting a cut through content.
    fn find_safe_break_row(&self, bitmap: &Bitmap, target: u32) -> u32 {
        let floor = target.saturating_sub(self.lookback);
        for y in (floor..=target).rev() {
            if bitmap.is_blank_row(y, self.threshold) {
                return y;
            }
        }
        target
    }
}

impl Default for PageSlicer {
    fn default() -> Self {
        Self::new()
    }
}
