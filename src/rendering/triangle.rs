/// Screen-space triangle input, produced per frame by the transform stage
/// and consumed by exactly one rasterizer call.
use crate::rendering::texture::Texture;

/// One transformed, lit vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    /// View-space depth, strictly positive.
    ///
    /// The inverse-z depth value is 2^28 / z in an i32, so every z below
    /// 0.125 stores the same saturated depth. Perspective texturing rescales
    /// z per triangle and has no such floor.
    pub z: f32,
    /// Texture coordinates in texels. Perspective texturing holds u and v
    /// with 22 fractional bits, so their magnitude stays below 512.
    pub u: f32,
    pub v: f32,
    /// Packed ARGB vertex color for gouraud shading.
    pub color: u32,
}

impl ScreenVertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 1.0,
            u: 0.0,
            v: 0.0,
            color: 0xFFFFFFFF,
        }
    }

    pub const fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub const fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.u = u;
        self.v = v;
        self
    }

    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadeMode {
    /// One lit color for the whole polygon.
    Flat,
    /// Vertex colors interpolated across the polygon.
    Gouraud,
}

#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle<'t> {
    pub vertices: [ScreenVertex; 3],
    pub shade: ShadeMode,
    /// Lit base color; modulates texels under flat shading.
    pub lit_color: u32,
    /// Polygon alpha, used when the context enables blending.
    pub alpha: u8,
    pub texture: Option<&'t Texture>,
}

impl<'t> ScreenTriangle<'t> {
    pub fn flat(vertices: [ScreenVertex; 3], lit_color: u32) -> Self {
        Self {
            vertices,
            shade: ShadeMode::Flat,
            lit_color,
            alpha: 255,
            texture: None,
        }
    }

    pub fn gouraud(vertices: [ScreenVertex; 3]) -> Self {
        Self {
            vertices,
            shade: ShadeMode::Gouraud,
            lit_color: 0xFFFFFFFF,
            alpha: 255,
            texture: None,
        }
    }

    pub fn textured(vertices: [ScreenVertex; 3], texture: &'t Texture, lit_color: u32) -> Self {
        Self {
            vertices,
            shade: ShadeMode::Flat,
            lit_color,
            alpha: 255,
            texture: Some(texture),
        }
    }

    pub fn with_shade(mut self, shade: ShadeMode) -> Self {
        self.shade = shade;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    /// Smallest vertex z, used to pick perspective or affine texturing in
    /// hybrid mode.
    pub fn nearest_z(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.z)
            .fold(f32::INFINITY, f32::min)
    }
}
