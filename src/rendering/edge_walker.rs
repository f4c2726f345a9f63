/// Edge walking for scan conversion.
///
/// Every quantity that varies over a triangle rides along in an
/// [`Interpolants`] vector and is advanced by a constant per-scanline delta
/// down each edge. A general triangle is walked in two phases: above the
/// middle vertex one side follows the upper short edge, below it that side
/// is reseeded from the lower short edge. [`EdgeWalker`] makes the phase an
/// explicit state with a single transition.
use std::ops::Index;

use crate::count_call;
use crate::rendering::classify::{ClassifiedTriangle, SetupVertex, TriangleKind};
use crate::rendering::clip::ClipRect;
use crate::rendering::fixed::{self, FIXP16_ROUND_UP, FIXP16_SHIFT};

pub const ATTR_COUNT: usize = 8;

/// Slot layout of [`Interpolants`].
pub mod slot {
    /// Gouraud red, 16.16.
    pub const R: usize = 0;
    /// Gouraud green, 16.16.
    pub const G: usize = 1;
    /// Gouraud blue, 16.16.
    pub const B: usize = 2;
    /// Texture u: 16.16 affine, or u/z with 22 fractional bits.
    pub const U: usize = 3;
    /// Texture v, same scale as `U`.
    pub const V: usize = 4;
    /// 1/z with 28 fractional bits.
    pub const INV_Z: usize = 5;
    /// z, 16.16.
    pub const Z: usize = 6;
    /// 1/z with 28 fractional bits, taken from the triangle's scaled z.
    /// Divides u/z and v/z back into u and v.
    pub const INV_W: usize = 7;
}

/// Fixed-point values interpolated across a triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interpolants(pub [i32; ATTR_COUNT]);

impl Interpolants {
    pub const ZERO: Interpolants = Interpolants([0; ATTR_COUNT]);

    /// Span start bias for affine texturing: every linear slot rounds up,
    /// the 1/z slots start exact.
    pub const AFFINE_BIAS: Interpolants = Interpolants([
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        0,
        FIXP16_ROUND_UP,
        0,
    ]);

    /// Span start bias for perspective texturing: recovered u/v start exact.
    pub const PERSPECTIVE_BIAS: Interpolants = Interpolants([
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        FIXP16_ROUND_UP,
        0,
        0,
        0,
        FIXP16_ROUND_UP,
        0,
    ]);

    /// Per-step deltas from `start` to `end` over `steps` steps, with the
    /// raw-difference fallback for `steps <= 0`.
    #[inline]
    pub fn deltas(start: &Self, end: &Self, steps: i32) -> Self {
        let mut out = Self::ZERO;
        for i in 0..ATTR_COUNT {
            out.0[i] = fixed::span_delta(start.0[i], end.0[i], steps);
        }
        out
    }

    /// `self + delta * steps`, slot by slot.
    #[inline]
    pub fn advanced(&self, delta: &Self, steps: i32) -> Self {
        let mut out = *self;
        for i in 0..ATTR_COUNT {
            out.0[i] = fixed::advance(self.0[i], delta.0[i], steps);
        }
        out
    }

    #[inline]
    pub fn offset(&self, bias: &Self) -> Self {
        let mut out = *self;
        for i in 0..ATTR_COUNT {
            out.0[i] = out.0[i].wrapping_add(bias.0[i]);
        }
        out
    }

    /// Advance one step.
    #[inline(always)]
    pub fn step(&mut self, delta: &Self) {
        for i in 0..ATTR_COUNT {
            self.0[i] = self.0[i].wrapping_add(delta.0[i]);
        }
    }
}

impl Index<usize> for Interpolants {
    type Output = i32;

    #[inline(always)]
    fn index(&self, slot: usize) -> &i32 {
        &self.0[slot]
    }
}

/// One triangle edge positioned on a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Screen x, 16.16.
    pub x: i32,
    pub dxdy: i32,
    pub attrs: Interpolants,
    pub dady: Interpolants,
}

impl Edge {
    /// Edge from `top` down to `bottom`, advanced analytically to scanline `y`.
    /// `bottom.y` must be greater than `top.y`.
    #[inline]
    pub fn new(top: &SetupVertex, bottom: &SetupVertex, y: i32) -> Self {
        let dy = bottom.y - top.y;
        let dxdy = fixed::edge_delta(top.x, bottom.x, dy);
        let dady = Interpolants::deltas(&top.attrs, &bottom.attrs, dy);
        let skip = y - top.y;
        Self {
            x: fixed::advance(top.x << FIXP16_SHIFT, dxdy, skip),
            dxdy,
            attrs: top.attrs.advanced(&dady, skip),
            dady,
        }
    }

    #[inline(always)]
    pub fn step(&mut self) {
        self.x = self.x.wrapping_add(self.dxdy);
        self.attrs.step(&self.dady);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Above the middle vertex. After scanline `restart_y` the edge on
    /// `side` is replaced by the `middle` → `bottom` edge.
    WalkingUpperEdge {
        restart_y: i32,
        side: Side,
        middle: SetupVertex,
        bottom: SetupVertex,
    },
    /// Both edges run to the bottom of the triangle.
    WalkingLowerEdge,
}

/// Walks the left and right edges of a classified triangle one clipped
/// scanline at a time.
#[derive(Debug, Clone)]
pub struct EdgeWalker {
    pub left: Edge,
    pub right: Edge,
    state: WalkState,
    y: i32,
    y_end: i32,
}

impl EdgeWalker {
    pub fn new(tri: &ClassifiedTriangle, clip: &ClipRect) -> Self {
        let [v0, v1, v2] = &tri.vertices;

        match tri.kind {
            TriangleKind::FlatTop => {
                // v0 top-left, v1 top-right
                let y = v0.y.max(clip.min_y);
                Self {
                    left: Edge::new(v0, v2, y),
                    right: Edge::new(v1, v2, y),
                    state: WalkState::WalkingLowerEdge,
                    y,
                    y_end: v2.y.min(clip.max_y),
                }
            }
            TriangleKind::FlatBottom => {
                // v1 bottom-left, v2 bottom-right
                let y = v0.y.max(clip.min_y);
                Self {
                    left: Edge::new(v0, v1, y),
                    right: Edge::new(v0, v2, y),
                    state: WalkState::WalkingLowerEdge,
                    y,
                    y_end: v1.y.min(clip.max_y),
                }
            }
            TriangleKind::General => {
                let y_end = v2.y.min(clip.max_y);

                if v1.y < clip.min_y {
                    // upper half is clipped away entirely
                    let y = clip.min_y;
                    let lower = Edge::new(v1, v2, y);
                    let long = Edge::new(v0, v2, y);
                    let (left, right) = if long.dxdy > lower.dxdy {
                        (long, lower)
                    } else {
                        (lower, long)
                    };
                    return Self {
                        left,
                        right,
                        state: WalkState::WalkingLowerEdge,
                        y,
                        y_end,
                    };
                }

                let y = v0.y.max(clip.min_y);
                let upper = Edge::new(v0, v1, y);
                let long = Edge::new(v0, v2, y);
                let (left, right, side) = if long.dxdy < upper.dxdy {
                    (long, upper, Side::Right)
                } else {
                    (upper, long, Side::Left)
                };
                Self {
                    left,
                    right,
                    state: WalkState::WalkingUpperEdge {
                        restart_y: v1.y,
                        side,
                        middle: *v1,
                        bottom: *v2,
                    },
                    y,
                    y_end,
                }
            }
        }
    }

    /// Current scanline, or `None` once the walk is done.
    #[inline]
    pub fn row(&self) -> Option<i32> {
        (self.y < self.y_end).then_some(self.y)
    }

    #[inline]
    pub fn state(&self) -> &WalkState {
        &self.state
    }

    /// Step both edges down one scanline, switching to the lower edge
    /// right after the middle vertex's scanline.
    #[inline]
    pub fn advance(&mut self) {
        self.left.step();
        self.right.step();
        if let WalkState::WalkingUpperEdge { restart_y, .. } = self.state {
            if self.y == restart_y {
                self.restart();
            }
        }
        self.y += 1;
    }

    fn restart(&mut self) {
        let WalkState::WalkingUpperEdge {
            side,
            middle,
            bottom,
            ..
        } = self.state
        else {
            return;
        };
        count_call!(interpolation_restarts);

        // Seeded at the middle vertex, then stepped once so it lines up
        // with the row the other edge just moved to.
        let mut edge = Edge::new(&middle, &bottom, middle.y);
        edge.step();
        match side {
            Side::Left => self.left = edge,
            Side::Right => self.right = edge,
        }
        self.state = WalkState::WalkingLowerEdge;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::classify::{classify, SetupVertex};

    fn vertex(x: i32, y: i32) -> SetupVertex {
        SetupVertex {
            x,
            y,
            attrs: Interpolants::ZERO,
        }
    }

    fn spans(walker: &mut EdgeWalker) -> Vec<(i32, i32, i32)> {
        let mut out = Vec::new();
        while let Some(y) = walker.row() {
            out.push((y, fixed::to_pixel(walker.left.x), fixed::to_pixel(walker.right.x)));
            walker.advance();
        }
        out
    }

    const CLIP: ClipRect = ClipRect::new(0, 0, 100, 100);

    #[test]
    fn flat_top_walk_covers_rows_top_inclusive_bottom_exclusive() {
        let tri = classify([vertex(30, 10), vertex(10, 10), vertex(20, 30)], &CLIP).unwrap();
        let rows = spans(&mut EdgeWalker::new(&tri, &CLIP));
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0], (10, 10, 30));
        assert_eq!(rows.last().map(|r| r.0), Some(29));
    }

    #[test]
    fn general_triangle_restarts_left_edge_at_middle_vertex() {
        // middle vertex on the left
        let tri = classify([vertex(20, 0), vertex(0, 10), vertex(30, 20)], &CLIP).unwrap();
        let mut walker = EdgeWalker::new(&tri, &CLIP);
        assert!(matches!(
            walker.state(),
            WalkState::WalkingUpperEdge { side: Side::Left, restart_y: 10, .. }
        ));

        let rows = spans(&mut walker);
        assert_eq!(walker.state(), &WalkState::WalkingLowerEdge);
        assert_eq!(rows[10], (10, 0, 25));
        // one row below the middle vertex the left edge follows v1 -> v2
        assert_eq!(rows[11].1, 3);
        assert_eq!(rows.len(), 20);
    }

    #[test]
    fn general_triangle_restarts_right_edge_when_middle_is_on_the_right() {
        let tri = classify([vertex(10, 0), vertex(40, 10), vertex(0, 20)], &CLIP).unwrap();
        let mut walker = EdgeWalker::new(&tri, &CLIP);
        assert!(matches!(
            walker.state(),
            WalkState::WalkingUpperEdge { side: Side::Right, .. }
        ));
        let rows = spans(&mut walker);
        assert_eq!(rows[10].2, 40);
        assert_eq!(rows[12].2, 32);
    }

    #[test]
    fn top_clip_skips_analytically_into_both_phases() {
        let tri = classify([vertex(20, -40), vertex(0, 10), vertex(30, 20)], &CLIP).unwrap();
        let unclipped_clip = ClipRect::new(0, -100, 100, 100);
        let full: Vec<_> = spans(&mut EdgeWalker::new(&tri, &unclipped_clip))
            .into_iter()
            .filter(|r| r.0 >= 0)
            .collect();
        let clipped = spans(&mut EdgeWalker::new(&tri, &CLIP));
        assert_eq!(full, clipped);

        // middle vertex above the clip top: start directly on the lower edge
        let clip = ClipRect::new(0, 15, 100, 100);
        let walker = EdgeWalker::new(&tri, &clip);
        assert_eq!(walker.state(), &WalkState::WalkingLowerEdge);
        let full: Vec<_> = spans(&mut EdgeWalker::new(&tri, &unclipped_clip))
            .into_iter()
            .filter(|r| r.0 >= 15)
            .collect();
        assert_eq!(full, spans(&mut EdgeWalker::new(&tri, &clip)));
    }

    #[test]
    fn bottom_clip_shortens_the_walk() {
        let tri = classify([vertex(20, 0), vertex(0, 10), vertex(30, 90)], &CLIP).unwrap();
        let clip = ClipRect::new(0, 0, 100, 50);
        let rows = spans(&mut EdgeWalker::new(&tri, &clip));
        assert_eq!(rows.last().map(|r| r.0), Some(49));
    }
}
