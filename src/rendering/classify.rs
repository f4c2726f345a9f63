/// Triangle setup: snap vertices to pixel rows, reject what cannot produce
/// pixels, and sort the rest into flat-top, flat-bottom or general form.
/// The same classification feeds every rasterizer variant; only the
/// interpolants riding along with each vertex differ.
use crate::rendering::clip::ClipRect;
use crate::rendering::color::u32_to_rgb;
use crate::rendering::edge_walker::{slot, Interpolants};
use crate::rendering::fixed::{to_fix16, FIXP16_SHIFT, FIXP22_SHIFT, FIXP28_SHIFT, MAX_SCREEN_COORD};
use crate::rendering::triangle::ScreenVertex;

/// Largest z representable in the 16.16 depth slot.
pub const MAX_Z16: f32 = 32_767.0;

/// Power of two that lifts `nearest_z` to at least 1.
///
/// Perspective interpolants are formed from `z * scale` so u/z keeps its 22
/// fractional bits inside an i32 for vertices close to the camera. A power
/// of two leaves the scaled z exact, and the scale cancels when u/z is
/// divided back by 1/z.
pub fn perspective_scale(nearest_z: f32) -> f32 {
    if nearest_z.is_nan() || nearest_z <= 0.0 || nearest_z >= 1.0 {
        return 1.0;
    }
    (1.0 / nearest_z).log2().ceil().exp2()
}

/// A vertex on integer pixel coordinates with its fixed-point interpolants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupVertex {
    pub x: i32,
    pub y: i32,
    pub attrs: Interpolants,
}

impl SetupVertex {
    /// Snap a screen vertex and scale its interpolants.
    ///
    /// With a `perspective` scale, u and v are stored pre-divided by
    /// `z * scale` (22 fractional bits) so they interpolate linearly in
    /// screen space, and `INV_W` carries the matching 1/(z * scale).
    pub fn from_screen(v: &ScreenVertex, perspective: Option<f32>) -> Self {
        debug_assert!(v.z > 0.0, "vertex z must be positive, got {}", v.z);

        let (r, g, b) = u32_to_rgb(v.color);
        let mut attrs = Interpolants::ZERO;
        attrs.0[slot::R] = (r as i32) << FIXP16_SHIFT;
        attrs.0[slot::G] = (g as i32) << FIXP16_SHIFT;
        attrs.0[slot::B] = (b as i32) << FIXP16_SHIFT;

        let w = v.z as f64 * perspective.unwrap_or(1.0) as f64;
        if perspective.is_some() {
            let one = (1u64 << FIXP22_SHIFT) as f64;
            attrs.0[slot::U] = (v.u as f64 * one / w) as i32;
            attrs.0[slot::V] = (v.v as f64 * one / w) as i32;
        } else {
            attrs.0[slot::U] = to_fix16(v.u);
            attrs.0[slot::V] = to_fix16(v.v);
        }
        let one = (1u64 << FIXP28_SHIFT) as f64;
        attrs.0[slot::INV_Z] = (one / v.z as f64) as i32;
        attrs.0[slot::INV_W] = (one / w) as i32;
        attrs.0[slot::Z] = to_fix16(v.z.min(MAX_Z16));

        Self {
            x: snap(v.x),
            y: snap(v.y),
            attrs,
        }
    }
}

/// Round a screen coordinate to the nearest pixel.
#[inline]
pub fn snap(coord: f32) -> i32 {
    (coord + 0.5).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleKind {
    /// v0 and v1 share the top row, v0 on the left.
    FlatTop,
    /// v1 and v2 share the bottom row, v1 on the left.
    FlatBottom,
    /// Three distinct rows; the walk restarts at v1.
    General,
}

/// Why a triangle produced no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The three snapped vertices are collinear, so the triangle has no area.
    Degenerate,
    /// Entirely beyond one side of the clip rectangle.
    Clipped,
    /// A vertex lies beyond `MAX_SCREEN_COORD` on either axis.
    ///
    /// The whole triangle is dropped even when part of it overlaps the clip
    /// rectangle: a one-row edge across the full coordinate range must
    /// still fit its 16.16 slope in an i32. Callers with geometry that far
    /// off screen clip it in homogeneous space first.
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedTriangle {
    pub kind: TriangleKind,
    /// Sorted top to bottom.
    pub vertices: [SetupVertex; 3],
}

/// Cross product of the two edges leaving v0, in i64 so any i32 input fits.
#[inline]
fn twice_signed_area(xs: [i32; 3], ys: [i32; 3]) -> i64 {
    let (x0, y0) = (xs[0] as i64, ys[0] as i64);
    (xs[1] as i64 - x0) * (ys[2] as i64 - y0) - (xs[2] as i64 - x0) * (ys[1] as i64 - y0)
}

pub fn classify(vertices: [SetupVertex; 3], clip: &ClipRect) -> Result<ClassifiedTriangle, Rejection> {
    let xs = vertices.map(|v| v.x);
    let ys = vertices.map(|v| v.y);

    if twice_signed_area(xs, ys) == 0 {
        return Err(Rejection::Degenerate);
    }
    if xs.iter().chain(ys.iter()).any(|c| c.abs() > MAX_SCREEN_COORD) {
        return Err(Rejection::OutOfRange);
    }
    if clip.trivially_rejects(xs, ys) {
        return Err(Rejection::Clipped);
    }

    let [mut v0, mut v1, mut v2] = vertices;
    if v1.y < v0.y {
        std::mem::swap(&mut v0, &mut v1);
    }
    if v2.y < v0.y {
        std::mem::swap(&mut v0, &mut v2);
    }
    if v2.y < v1.y {
        std::mem::swap(&mut v1, &mut v2);
    }

    let kind = if v0.y == v1.y {
        if v1.x < v0.x {
            std::mem::swap(&mut v0, &mut v1);
        }
        TriangleKind::FlatTop
    } else if v1.y == v2.y {
        if v2.x < v1.x {
            std::mem::swap(&mut v1, &mut v2);
        }
        TriangleKind::FlatBottom
    } else {
        TriangleKind::General
    };

    Ok(ClassifiedTriangle {
        kind,
        vertices: [v0, v1, v2],
    })
}
