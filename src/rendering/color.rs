/// Packed ARGB8888 color helpers
/// Every pixel the rasterizer writes carries a full 0xFF alpha byte

/// Convert RGB to ARGB u32
#[inline]
pub const fn rgb_to_u32(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Split ARGB u32 into (r, g, b), dropping alpha
#[inline]
pub const fn u32_to_rgb(color: u32) -> (u32, u32, u32) {
    ((color >> 16) & 0xFF, (color >> 8) & 0xFF, color & 0xFF)
}

/// Alpha byte of a packed color
#[inline]
pub const fn alpha_of(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Multiply each channel of `texel` by the matching channel of `light`,
/// scaled back with `>> 8`.
#[inline]
pub fn modulate(texel: u32, light: u32) -> u32 {
    let (lr, lg, lb) = u32_to_rgb(light);
    modulate_channels(texel, lr, lg, lb)
}

/// Same as [`modulate`] with the light already split into channels (0..=255).
#[inline]
pub fn modulate_channels(texel: u32, r: u32, g: u32, b: u32) -> u32 {
    let (tr, tg, tb) = u32_to_rgb(texel);
    0xFF000000 | (((tr * r) >> 8) << 16) | (((tg * g) >> 8) << 8) | ((tb * b) >> 8)
}

/// Straight (non-premultiplied) alpha compositing per channel:
/// `src * alpha / 255 + dst * (255 - alpha) / 255`.
///
/// `alpha == 255` returns the source and `alpha == 0` the destination.
#[inline]
pub fn blend_alpha(src: u32, dst: u32, alpha: u8) -> u32 {
    let a = alpha as u32;
    let inv = 255 - a;
    let (sr, sg, sb) = u32_to_rgb(src);
    let (dr, dg, db) = u32_to_rgb(dst);
    let r = (sr * a + dr * inv) / 255;
    let g = (sg * a + dg * inv) / 255;
    let b = (sb * a + db * inv) / 255;
    0xFF000000 | (r << 16) | (g << 8) | b
}
