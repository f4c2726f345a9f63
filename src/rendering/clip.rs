/// Rectangular clipping for triangles and spans.
/// The rectangle is half-open: pixels with min <= x < max and min <= y < max.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// A clipped span ready for the pixel loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedSpan {
    pub start: i32,
    pub end: i32,
    /// Pixels cut from the left; interpolants slide forward by this many steps.
    pub skipped: i32,
}

impl ClipRect {
    pub const EMPTY: ClipRect = ClipRect {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// True when all three points lie beyond a single side of the rectangle.
    /// Each side is checked independently.
    #[inline]
    pub fn trivially_rejects(&self, xs: [i32; 3], ys: [i32; 3]) -> bool {
        ys.iter().all(|&y| y < self.min_y)
            || ys.iter().all(|&y| y >= self.max_y)
            || xs.iter().all(|&x| x < self.min_x)
            || xs.iter().all(|&x| x >= self.max_x)
    }

    /// Clip `[start, end)` to the horizontal extent. Returns `None` when
    /// nothing of the span is left.
    ///
    /// A zero-width span (`start == end`) still covers its single pixel.
    #[inline]
    pub fn clip_span(&self, start: i32, end: i32) -> Option<ClippedSpan> {
        let end = if end == start { end + 1 } else { end };
        let end = end.min(self.max_x);
        let (start, skipped) = if start < self.min_x {
            (self.min_x, self.min_x - start)
        } else {
            (start, 0)
        };
        if start >= end {
            return None;
        }
        Some(ClippedSpan { start, end, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIP: ClipRect = ClipRect::new(0, 0, 100, 100);

    #[test]
    fn rejects_each_side_independently() {
        assert!(CLIP.trivially_rejects([10, 20, 30], [-5, -1, -30]));
        assert!(CLIP.trivially_rejects([10, 20, 30], [100, 140, 101]));
        assert!(CLIP.trivially_rejects([-1, -20, -3], [10, 20, 30]));
        assert!(CLIP.trivially_rejects([100, 120, 300], [10, 20, 30]));
        assert!(!CLIP.trivially_rejects([-10, 50, 300], [-10, 50, 300]));
    }

    #[test]
    fn clip_span_slides_start_and_clamps_end() {
        assert_eq!(
            CLIP.clip_span(-7, 20),
            Some(ClippedSpan { start: 0, end: 20, skipped: 7 })
        );
        assert_eq!(
            CLIP.clip_span(90, 130),
            Some(ClippedSpan { start: 90, end: 100, skipped: 0 })
        );
        assert_eq!(CLIP.clip_span(-30, -2), None);
        assert_eq!(CLIP.clip_span(100, 120), None);
        assert_eq!(CLIP.clip_span(45, 40), None);
        assert_eq!(
            CLIP.clip_span(40, 40),
            Some(ClippedSpan { start: 40, end: 41, skipped: 0 })
        );
        assert_eq!(CLIP.clip_span(100, 100), None);
    }

    #[test]
    fn contains_is_half_open() {
        assert!(CLIP.contains(0, 0));
        assert!(CLIP.contains(99, 99));
        assert!(!CLIP.contains(100, 50));
        assert!(!CLIP.contains(50, 100));
    }
}
