/// Per-call render state: which depth test, texture correction, filtering
/// and blending to use, and the clip rectangle to stay inside.
use bitflags::bitflags;

use crate::error::RenderError;
use crate::rendering::clip::ClipRect;
use crate::rendering::framebuffer::PixelTarget;

bitflags! {
    /// Render attribute word selecting the rasterizer variant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderAttr: u32 {
        const NOBUFFER                    = 1 << 0;
        const ZBUFFER                     = 1 << 1;
        const INVZBUFFER                  = 1 << 2;
        const ALPHA                       = 1 << 3;
        const BILERP                      = 1 << 4;
        const TEXTURE_PERSPECTIVE_AFFINE  = 1 << 8;
        const TEXTURE_PERSPECTIVE_CORRECT = 1 << 9;
        const TEXTURE_PERSPECTIVE_HYBRID  = 1 << 10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthMode {
    /// Every pixel is written; draw order decides visibility.
    None,
    /// 16.16 z, nearer is smaller.
    ZBuffer,
    /// 4.28 1/z, nearer is larger.
    InverseZBuffer,
}

impl DepthMode {
    /// Depth buffer value that every real fragment beats.
    pub const fn clear_value(self) -> u32 {
        match self {
            DepthMode::None | DepthMode::ZBuffer => u32::MAX,
            DepthMode::InverseZBuffer => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMode {
    Affine,
    /// Perspective divide at span ends, linear in between.
    Perspective,
    /// Perspective when the triangle's nearest vertex is closer than
    /// `texture_dist`, affine otherwise.
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub attr: RenderAttr,
    pub clip: ClipRect,
    /// Replaces every polygon's own alpha while `ALPHA` is set.
    pub alpha_override: Option<u8>,
    pub texture_dist: f32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            attr: RenderAttr::NOBUFFER | RenderAttr::TEXTURE_PERSPECTIVE_AFFINE,
            clip: ClipRect::EMPTY,
            alpha_override: None,
            texture_dist: 0.0,
        }
    }
}

impl RenderContext {
    /// Context clipping to the whole of a `width` x `height` target.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            clip: ClipRect::new(0, 0, width as i32, height as i32),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, attr: RenderAttr) -> Self {
        self.attr = attr;
        self
    }

    pub fn with_clip(mut self, clip: ClipRect) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_alpha_override(mut self, alpha: u8) -> Self {
        self.alpha_override = Some(alpha);
        self
    }

    pub fn with_texture_dist(mut self, texture_dist: f32) -> Self {
        self.texture_dist = texture_dist;
        self
    }

    /// Inverse-z wins over z when both bits are set.
    pub fn depth_mode(&self) -> DepthMode {
        if self.attr.contains(RenderAttr::INVZBUFFER) {
            DepthMode::InverseZBuffer
        } else if self.attr.contains(RenderAttr::ZBUFFER) {
            DepthMode::ZBuffer
        } else {
            DepthMode::None
        }
    }

    pub fn texture_mode(&self) -> TextureMode {
        if self.attr.contains(RenderAttr::TEXTURE_PERSPECTIVE_HYBRID) {
            TextureMode::Hybrid
        } else if self.attr.contains(RenderAttr::TEXTURE_PERSPECTIVE_CORRECT) {
            TextureMode::Perspective
        } else {
            TextureMode::Affine
        }
    }

    #[inline]
    pub fn bilinear(&self) -> bool {
        self.attr.contains(RenderAttr::BILERP)
    }

    /// Blend alpha for a polygon, or `None` when the write is opaque.
    #[inline]
    pub fn blend_alpha(&self, polygon_alpha: u8) -> Option<u8> {
        if !self.attr.contains(RenderAttr::ALPHA) {
            return None;
        }
        match self.alpha_override.unwrap_or(polygon_alpha) {
            255 => None,
            alpha => Some(alpha),
        }
    }

    /// Check the clip rectangle and depth requirements against a target.
    pub fn validate<T: PixelTarget + ?Sized>(&self, target: &T) -> Result<(), RenderError> {
        let (width, height) = (target.width(), target.height());
        let clip = self.clip;
        if clip.min_x < 0
            || clip.min_y < 0
            || clip.max_x as i64 > width as i64
            || clip.max_y as i64 > height as i64
        {
            return Err(RenderError::ClipOutOfBounds {
                min_x: clip.min_x,
                min_y: clip.min_y,
                max_x: clip.max_x,
                max_y: clip.max_y,
                width,
                height,
            });
        }
        let depth = self.depth_mode();
        if depth != DepthMode::None && !target.has_depth() {
            return Err(RenderError::MissingDepthBuffer(depth));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::framebuffer::{Framebuffer, SurfaceTarget};

    #[test]
    fn depth_mode_prefers_inverse_z() {
        let ctx = RenderContext::new(8, 8).with_attr(RenderAttr::ZBUFFER | RenderAttr::INVZBUFFER);
        assert_eq!(ctx.depth_mode(), DepthMode::InverseZBuffer);
        assert_eq!(RenderContext::new(8, 8).depth_mode(), DepthMode::None);
    }

    #[test]
    fn alpha_override_replaces_polygon_alpha() {
        let ctx = RenderContext::new(8, 8).with_attr(RenderAttr::ALPHA);
        assert_eq!(ctx.blend_alpha(100), Some(100));
        assert_eq!(ctx.blend_alpha(255), None);
        assert_eq!(ctx.with_alpha_override(5).blend_alpha(100), Some(5));

        let opaque = RenderContext::new(8, 8).with_alpha_override(5);
        assert_eq!(opaque.blend_alpha(100), None, "ALPHA bit off means opaque");
    }

    #[test]
    fn validate_rejects_oversized_clip_and_missing_depth() {
        let fb = Framebuffer::new(16, 16);
        let ctx = RenderContext::new(32, 16);
        assert!(matches!(ctx.validate(&fb), Err(RenderError::ClipOutOfBounds { .. })));

        let mut color = vec![0u32; 16 * 16];
        let surface = SurfaceTarget::new(16, 16, &mut color, 16, None).unwrap();
        let ctx = RenderContext::new(16, 16).with_attr(RenderAttr::ZBUFFER);
        assert_eq!(
            ctx.validate(&surface),
            Err(RenderError::MissingDepthBuffer(DepthMode::ZBuffer))
        );
        assert!(RenderContext::new(16, 16).validate(&surface).is_ok());
    }
}
