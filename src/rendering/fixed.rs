/// Fixed-point primitives shared by every rasterizer variant.
///
/// Screen x, colors and affine texture coordinates are carried in 16.16.
/// Perspective texturing carries u/z and v/z with 22 fractional bits and
/// 1/z with 28, which keeps enough precision across the divide that
/// recovers u and v at each span end.

pub const FIXP16_SHIFT: u32 = 16;
pub const FIXP16_ONE: i32 = 1 << FIXP16_SHIFT;
/// Added before the shift that recovers a pixel coordinate, so a sample is
/// included once its center has been crossed.
pub const FIXP16_ROUND_UP: i32 = (1 << 15) - 1;

pub const FIXP22_SHIFT: u32 = 22;
pub const FIXP28_SHIFT: u32 = 28;

/// Largest screen coordinate magnitude that still fits 16.16 with headroom
/// for edge deltas. An edge from -16383 to 16383 across one row has a slope
/// of 32766 << 16, the most an i32 holds. Triangles reaching past this are
/// rejected whole, visible or not.
pub const MAX_SCREEN_COORD: i32 = 16_383;

/// Per-scanline x delta of an edge: `((end - start) << 16) / dy`.
///
/// `dy` must be positive; the classifier guarantees it.
#[inline]
pub fn edge_delta(start: i32, end: i32, dy: i32) -> i32 {
    debug_assert!(dy > 0, "edge height must be positive");
    ((((end as i64) - (start as i64)) << FIXP16_SHIFT) / dy as i64) as i32
}

/// Per-step delta of an already scaled quantity: `(end - start) / steps`.
///
/// When `steps <= 0` the raw difference is returned instead of dividing,
/// which is how a one-pixel span still renders its single sample.
#[inline]
pub fn span_delta(start: i32, end: i32, steps: i32) -> i32 {
    let diff = (end as i64) - (start as i64);
    if steps > 0 {
        (diff / steps as i64) as i32
    } else {
        diff as i32
    }
}

/// Advance `start` by `steps` increments of `delta` in one step.
///
/// Used for the analytic top-clip skip and the left-clip span slide. The
/// product is formed in 64 bits; the result is an in-range interpolant
/// value whenever the skip lands inside the triangle.
#[inline]
pub fn advance(start: i32, delta: i32, steps: i32) -> i32 {
    (start as i64 + delta as i64 * steps as i64) as i32
}

/// Integer pixel coordinate for a 16.16 edge accumulator.
#[inline]
pub fn to_pixel(x: i32) -> i32 {
    x.wrapping_add(FIXP16_ROUND_UP) >> FIXP16_SHIFT
}

/// Float to 16.16, saturating at the i32 range.
#[inline]
pub fn to_fix16(value: f32) -> i32 {
    (value * FIXP16_ONE as f32) as i32
}

/// Recover a 22-bit texture coordinate from `u/z` (22 bits) and `1/z`
/// (28 bits): `((u_over_z << 6) / (inv_z >> 6)) << 16`.
///
/// The shifted numerator overflows 32 bits, so the math runs in 64 bits.
/// A vanishing divisor (z beyond 2^22) returns the input unchanged.
#[inline]
pub fn recover_perspective(u_over_z: i32, inv_z: i32) -> i32 {
    let divisor = (inv_z >> 6) as i64;
    if divisor == 0 {
        return u_over_z;
    }
    let numerator = (u_over_z as i64) << (FIXP28_SHIFT - FIXP22_SHIFT);
    let recovered = (numerator / divisor) << FIXP16_SHIFT;
    recovered.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
