/// Software triangle rasterizer using fixed-point scanline edge walking
/// One generic scan converter, monomorphized per shading/depth/blend combination
use super::classify::{classify, perspective_scale, ClassifiedTriangle, Rejection, SetupVertex};
use super::clip::ClipRect;
use super::context::{DepthMode, RenderContext, TextureMode};
use super::edge_walker::{Edge, EdgeWalker, Interpolants};
use super::fixed;
use super::framebuffer::PixelTarget;
use super::shader::{
    AlphaBlend, BlendMode, DepthTest, FlatLight, FlatShader, GouraudLight, GouraudShader,
    InverseZTest, NoDepth, Opaque, SpanShader, TexelLight, TextureShader, ZTest,
};
use super::texture::Texture;
use super::triangle::{ScreenTriangle, ShadeMode};
use crate::error::RenderError;
use crate::{count_add, count_call, perf_scope};

/// Per-frame triangle and pixel tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub submitted: u64,
    /// Entirely outside the clip rectangle or the fixed-point range.
    pub rejected: u64,
    pub degenerate: u64,
    pub drawn: u64,
    pub pixels_written: u64,
}

impl RasterStats {
    fn since(&self, earlier: &RasterStats) -> RasterStats {
        RasterStats {
            submitted: self.submitted - earlier.submitted,
            rejected: self.rejected - earlier.rejected,
            degenerate: self.degenerate - earlier.degenerate,
            drawn: self.drawn - earlier.drawn,
            pixels_written: self.pixels_written - earlier.pixels_written,
        }
    }
}

#[derive(Debug, Default)]
pub struct Rasterizer {
    stats: RasterStats,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RasterStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RasterStats::default();
    }

    /// Draw a list of triangles, checking the context against the target
    /// once up front. Returns the tallies for this list alone.
    pub fn draw_list<T: PixelTarget + ?Sized>(
        &mut self,
        target: &mut T,
        ctx: &RenderContext,
        triangles: &[ScreenTriangle<'_>],
    ) -> Result<RasterStats, RenderError> {
        perf_scope!("draw_list");
        ctx.validate(target)?;

        let before = self.stats;
        for tri in triangles {
            self.draw_validated(target, ctx, tri);
        }
        Ok(self.stats.since(&before))
    }

    /// Draw one triangle and return the number of pixels written.
    ///
    /// The context must fit the target (see [`RenderContext::validate`]).
    /// A mismatch is a programming error: it panics in debug builds and
    /// skips the triangle in release builds.
    pub fn draw_triangle<T: PixelTarget + ?Sized>(
        &mut self,
        target: &mut T,
        ctx: &RenderContext,
        tri: &ScreenTriangle<'_>,
    ) -> u64 {
        if let Err(err) = ctx.validate(target) {
            debug_assert!(false, "render context does not fit target: {}", err);
            log::warn!("skipping triangle: {}", err);
            return 0;
        }
        self.draw_validated(target, ctx, tri)
    }

    fn draw_validated<T: PixelTarget + ?Sized>(
        &mut self,
        target: &mut T,
        ctx: &RenderContext,
        tri: &ScreenTriangle<'_>,
    ) -> u64 {
        self.stats.submitted += 1;
        count_call!(triangles_submitted);

        let perspective = tri.texture.is_some()
            && match ctx.texture_mode() {
                TextureMode::Affine => false,
                TextureMode::Perspective => true,
                TextureMode::Hybrid => tri.nearest_z() < ctx.texture_dist,
            };

        let scale = perspective.then(|| perspective_scale(tri.nearest_z()));
        let vertices = tri.vertices.map(|v| SetupVertex::from_screen(&v, scale));
        let classified = match classify(vertices, &ctx.clip) {
            Ok(classified) => classified,
            Err(Rejection::Degenerate) => {
                self.stats.degenerate += 1;
                count_call!(triangles_degenerate);
                return 0;
            }
            Err(Rejection::Clipped) | Err(Rejection::OutOfRange) => {
                self.stats.rejected += 1;
                count_call!(triangles_clip_rejected);
                return 0;
            }
        };

        self.stats.drawn += 1;
        count_call!(triangles_rasterized);

        let call = DrawCall {
            clip: ctx.clip,
            depth: ctx.depth_mode(),
            alpha: ctx.blend_alpha(tri.alpha),
            triangle: &classified,
        };
        let written = match (tri.texture, tri.shade) {
            (None, ShadeMode::Flat) => call.with_depth(target, &FlatShader::new(tri.lit_color)),
            (None, ShadeMode::Gouraud) => call.with_depth(target, &GouraudShader),
            (Some(texture), ShadeMode::Flat) => call.textured(
                target,
                texture,
                FlatLight::new(tri.lit_color),
                perspective,
                ctx.bilinear(),
            ),
            (Some(texture), ShadeMode::Gouraud) => {
                call.textured(target, texture, GouraudLight, perspective, ctx.bilinear())
            }
        };

        self.stats.pixels_written += written;
        count_add!(pixels_written, written);
        written
    }
}

/// Mode selection for one classified triangle. Each step picks a type
/// parameter so the pixel loop itself never branches on the mode.
struct DrawCall<'a> {
    clip: ClipRect,
    depth: DepthMode,
    alpha: Option<u8>,
    triangle: &'a ClassifiedTriangle,
}

impl DrawCall<'_> {
    fn textured<T: PixelTarget + ?Sized, L: TexelLight>(
        &self,
        target: &mut T,
        texture: &Texture,
        light: L,
        perspective: bool,
        bilinear: bool,
    ) -> u64 {
        match (perspective, bilinear) {
            (false, false) => {
                self.with_depth(target, &TextureShader::<L, false, false>::new(texture, light))
            }
            (false, true) => {
                self.with_depth(target, &TextureShader::<L, false, true>::new(texture, light))
            }
            (true, false) => {
                self.with_depth(target, &TextureShader::<L, true, false>::new(texture, light))
            }
            (true, true) => {
                self.with_depth(target, &TextureShader::<L, true, true>::new(texture, light))
            }
        }
    }

    fn with_depth<T: PixelTarget + ?Sized, S: SpanShader>(&self, target: &mut T, shader: &S) -> u64 {
        match self.depth {
            DepthMode::None => self.with_blend::<T, S, NoDepth>(target, shader),
            DepthMode::ZBuffer => self.with_blend::<T, S, ZTest>(target, shader),
            DepthMode::InverseZBuffer => self.with_blend::<T, S, InverseZTest>(target, shader),
        }
    }

    fn with_blend<T: PixelTarget + ?Sized, S: SpanShader, D: DepthTest>(
        &self,
        target: &mut T,
        shader: &S,
    ) -> u64 {
        match self.alpha {
            None => scan_convert::<T, S, D, Opaque>(target, &self.clip, self.triangle, shader, &Opaque),
            Some(alpha) => scan_convert::<T, S, D, AlphaBlend>(
                target,
                &self.clip,
                self.triangle,
                shader,
                &AlphaBlend(alpha),
            ),
        }
    }
}

/// Walk the triangle's edges scanline by scanline and fill each clipped span.
/// Returns the number of pixels written.
pub fn scan_convert<T, S, D, B>(
    target: &mut T,
    clip: &ClipRect,
    triangle: &ClassifiedTriangle,
    shader: &S,
    blend: &B,
) -> u64
where
    T: PixelTarget + ?Sized,
    S: SpanShader,
    D: DepthTest,
    B: BlendMode,
{
    let mut walker = EdgeWalker::new(triangle, clip);
    let mut written = 0;
    while let Some(y) = walker.row() {
        written += fill_span::<T, S, D, B>(target, clip, y, &walker.left, &walker.right, shader, blend);
        walker.advance();
    }
    written
}

#[inline]
fn fill_span<T, S, D, B>(
    target: &mut T,
    clip: &ClipRect,
    y: i32,
    left: &Edge,
    right: &Edge,
    shader: &S,
    blend: &B,
) -> u64
where
    T: PixelTarget + ?Sized,
    S: SpanShader,
    D: DepthTest,
    B: BlendMode,
{
    let x_start = fixed::to_pixel(left.x);
    let x_end = fixed::to_pixel(right.x);
    let Some(span) = clip.clip_span(x_start, x_end) else {
        return 0;
    };
    count_call!(spans_drawn);

    let (start, end) = shader.span_endpoints(&left.attrs, &right.attrs);
    let deltas = Interpolants::deltas(&start, &end, x_end - x_start);
    let mut attrs = start.offset(&S::START_BIAS).advanced(&deltas, span.skipped);

    let (color_row, depth_row) = target.rows_mut(y as usize);
    let pixels = span.start as usize..span.end as usize;
    let mut written = 0;

    if D::ENABLED {
        let Some(depth_row) = depth_row else {
            return 0;
        };
        for x in pixels {
            let z = D::depth(&attrs);
            if D::passes(z, depth_row[x]) {
                count_call!(depth_test_passed);
                blend.write(&mut color_row[x], shader.shade(&attrs));
                depth_row[x] = z;
                written += 1;
            } else {
                count_call!(depth_test_failed);
            }
            attrs.step(&deltas);
        }
    } else {
        for pixel in &mut color_row[pixels] {
            blend.write(pixel, shader.shade(&attrs));
            attrs.step(&deltas);
            written += 1;
        }
    }
    written
}
