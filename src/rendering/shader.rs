/// Per-pixel capabilities the scan converter is generic over.
///
/// A rasterizer instance is the product of one [`SpanShader`], one
/// [`DepthTest`] and one [`BlendMode`]. All three are fixed per call, so the
/// inner pixel loop carries no mode branches.
use crate::rendering::color::{blend_alpha, modulate_channels, u32_to_rgb};
use crate::rendering::edge_walker::{slot, Interpolants};
use crate::rendering::fixed::{recover_perspective, FIXP16_SHIFT, FIXP22_SHIFT};
use crate::rendering::texture::Texture;

/// Computes the source color of a pixel from its interpolants.
pub trait SpanShader {
    /// Added to the span start after the per-pixel deltas are taken.
    const START_BIAS: Interpolants;

    /// Span endpoint values derived from the left and right edge accumulators.
    #[inline(always)]
    fn span_endpoints(&self, left: &Interpolants, right: &Interpolants) -> (Interpolants, Interpolants) {
        (*left, *right)
    }

    fn shade(&self, attrs: &Interpolants) -> u32;
}

#[inline(always)]
fn channel(attrs: &Interpolants, slot: usize) -> u32 {
    (attrs[slot] >> FIXP16_SHIFT).clamp(0, 255) as u32
}

/// One color for every pixel.
#[derive(Debug, Clone, Copy)]
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self {
            color: color | 0xFF000000,
        }
    }
}

impl SpanShader for FlatShader {
    const START_BIAS: Interpolants = Interpolants::AFFINE_BIAS;

    #[inline(always)]
    fn shade(&self, _attrs: &Interpolants) -> u32 {
        self.color
    }
}

/// Interpolated vertex colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GouraudShader;

impl SpanShader for GouraudShader {
    const START_BIAS: Interpolants = Interpolants::AFFINE_BIAS;

    #[inline(always)]
    fn shade(&self, attrs: &Interpolants) -> u32 {
        0xFF000000
            | (channel(attrs, slot::R) << 16)
            | (channel(attrs, slot::G) << 8)
            | channel(attrs, slot::B)
    }
}

/// How a texel is lit before it is written.
pub trait TexelLight {
    fn light(&self, texel: u32, attrs: &Interpolants) -> u32;
}

/// Modulate by the polygon's lit base color.
#[derive(Debug, Clone, Copy)]
pub struct FlatLight {
    r: u32,
    g: u32,
    b: u32,
}

impl FlatLight {
    pub fn new(lit_color: u32) -> Self {
        let (r, g, b) = u32_to_rgb(lit_color);
        Self { r, g, b }
    }
}

impl TexelLight for FlatLight {
    #[inline(always)]
    fn light(&self, texel: u32, _attrs: &Interpolants) -> u32 {
        modulate_channels(texel, self.r, self.g, self.b)
    }
}

/// Modulate by the interpolated vertex color.
#[derive(Debug, Clone, Copy, Default)]
pub struct GouraudLight;

impl TexelLight for GouraudLight {
    #[inline(always)]
    fn light(&self, texel: u32, attrs: &Interpolants) -> u32 {
        modulate_channels(
            texel,
            channel(attrs, slot::R),
            channel(attrs, slot::G),
            channel(attrs, slot::B),
        )
    }
}

/// Texture mapping, affine or piecewise-linear perspective, point or
/// bilinear sampled.
///
/// In perspective mode the edges carry u/z, v/z and 1/z. The true u and v
/// are recovered only at the two span ends and interpolated linearly in
/// between, so accuracy drops on wide spans in exchange for one divide per
/// span end instead of one per pixel.
#[derive(Debug, Clone, Copy)]
pub struct TextureShader<'t, L, const PERSPECTIVE: bool, const BILINEAR: bool> {
    texture: &'t Texture,
    light: L,
}

impl<'t, L: TexelLight, const PERSPECTIVE: bool, const BILINEAR: bool>
    TextureShader<'t, L, PERSPECTIVE, BILINEAR>
{
    const SHIFT: u32 = if PERSPECTIVE { FIXP22_SHIFT } else { FIXP16_SHIFT };

    pub fn new(texture: &'t Texture, light: L) -> Self {
        Self { texture, light }
    }
}

impl<L: TexelLight, const PERSPECTIVE: bool, const BILINEAR: bool> SpanShader
    for TextureShader<'_, L, PERSPECTIVE, BILINEAR>
{
    const START_BIAS: Interpolants = if PERSPECTIVE {
        Interpolants::PERSPECTIVE_BIAS
    } else {
        Interpolants::AFFINE_BIAS
    };

    #[inline(always)]
    fn span_endpoints(&self, left: &Interpolants, right: &Interpolants) -> (Interpolants, Interpolants) {
        if !PERSPECTIVE {
            return (*left, *right);
        }
        let recover = |edge: &Interpolants| {
            let mut out = *edge;
            out.0[slot::U] = recover_perspective(edge[slot::U], edge[slot::INV_W]);
            out.0[slot::V] = recover_perspective(edge[slot::V], edge[slot::INV_W]);
            out
        };
        (recover(left), recover(right))
    }

    #[inline(always)]
    fn shade(&self, attrs: &Interpolants) -> u32 {
        let (u, v) = (attrs[slot::U], attrs[slot::V]);
        let texel = if BILINEAR {
            self.texture.sample_bilinear(u, v, Self::SHIFT)
        } else {
            self.texture.sample(u, v, Self::SHIFT)
        };
        self.light.light(texel, attrs)
    }
}

/// Depth comparison policy.
pub trait DepthTest {
    const ENABLED: bool;

    /// Depth value of the fragment as stored in the buffer.
    fn depth(attrs: &Interpolants) -> u32;

    /// Whether the incoming fragment is nearer than the stored one.
    fn passes(incoming: u32, stored: u32) -> bool;
}

/// No depth buffer; every pixel is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDepth;

impl DepthTest for NoDepth {
    const ENABLED: bool = false;

    #[inline(always)]
    fn depth(_attrs: &Interpolants) -> u32 {
        0
    }

    #[inline(always)]
    fn passes(_incoming: u32, _stored: u32) -> bool {
        true
    }
}

/// Z buffer: smaller z is nearer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZTest;

impl DepthTest for ZTest {
    const ENABLED: bool = true;

    #[inline(always)]
    fn depth(attrs: &Interpolants) -> u32 {
        attrs[slot::Z].max(0) as u32
    }

    #[inline(always)]
    fn passes(incoming: u32, stored: u32) -> bool {
        incoming < stored
    }
}

/// Inverse-z buffer: larger 1/z is nearer.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseZTest;

impl DepthTest for InverseZTest {
    const ENABLED: bool = true;

    #[inline(always)]
    fn depth(attrs: &Interpolants) -> u32 {
        attrs[slot::INV_Z].max(0) as u32
    }

    #[inline(always)]
    fn passes(incoming: u32, stored: u32) -> bool {
        incoming > stored
    }
}

/// How the source color lands in the destination pixel.
pub trait BlendMode {
    fn write(&self, pixel: &mut u32, src: u32);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Opaque;

impl BlendMode for Opaque {
    #[inline(always)]
    fn write(&self, pixel: &mut u32, src: u32) {
        *pixel = src;
    }
}

/// Straight alpha over whatever is already in the buffer.
#[derive(Debug, Clone, Copy)]
pub struct AlphaBlend(pub u8);

impl BlendMode for AlphaBlend {
    #[inline(always)]
    fn write(&self, pixel: &mut u32, src: u32) {
        *pixel = blend_alpha(src, *pixel, self.0);
    }
}
