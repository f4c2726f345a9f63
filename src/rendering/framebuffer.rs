/// Color and depth buffers the rasterizer writes into
///
/// Memory layout:
/// - Color is ARGB8888, one u32 per pixel
/// - Depth is one u32 per pixel; its meaning (z or 1/z) depends on the depth mode
/// - Rows are `pitch` entries apart, which may exceed the visible width
use crate::error::RenderError;
use crate::rendering::context::DepthMode;
use crate::count_call;

/// Row-addressable destination for scan conversion.
///
/// The rasterizer asks for one scanline at a time and indexes it with x in
/// `0..width()`. Implementors hand back the color row and, when they have
/// one, the matching depth row.
pub trait PixelTarget {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn has_depth(&self) -> bool;

    /// Color and optional depth rows for scanline `y`.
    fn rows_mut(&mut self, y: usize) -> (&mut [u32], Option<&mut [u32]>);
}

/// Borrowed view over caller-owned buffers, e.g. a locked window surface.
pub struct SurfaceTarget<'a> {
    width: usize,
    height: usize,
    color: &'a mut [u32],
    pitch: usize,
    depth: Option<(&'a mut [u32], usize)>,
}

impl<'a> SurfaceTarget<'a> {
    /// Wrap a color buffer (and optional depth buffer) with row pitches
    /// given in pixels.
    pub fn new(
        width: usize,
        height: usize,
        color: &'a mut [u32],
        pitch: usize,
        depth: Option<(&'a mut [u32], usize)>,
    ) -> Result<Self, RenderError> {
        check_buffer("color", color.len(), width, height, pitch)?;
        if let Some((depth_buffer, depth_pitch)) = &depth {
            check_buffer("depth", depth_buffer.len(), width, height, *depth_pitch)?;
        }
        Ok(Self {
            width,
            height,
            color,
            pitch,
            depth,
        })
    }
}

fn check_buffer(
    buffer: &'static str,
    len: usize,
    width: usize,
    height: usize,
    pitch: usize,
) -> Result<(), RenderError> {
    if pitch < width {
        return Err(RenderError::PitchTooSmall { pitch, width });
    }
    let required = if height == 0 { 0 } else { pitch * (height - 1) + width };
    if len < required {
        return Err(RenderError::BufferTooSmall {
            buffer,
            len,
            required,
            pitch,
            height,
        });
    }
    Ok(())
}

impl PixelTarget for SurfaceTarget<'_> {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    #[inline]
    fn rows_mut(&mut self, y: usize) -> (&mut [u32], Option<&mut [u32]>) {
        let start = y * self.pitch;
        let color = &mut self.color[start..start + self.width];
        let width = self.width;
        let depth = self.depth.as_mut().map(|(buffer, pitch)| {
            let start = y * *pitch;
            &mut buffer[start..start + width]
        });
        (color, depth)
    }
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>, // ARGB format
    pub depth_buffer: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_count = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; pixel_count],
            depth_buffer: vec![u32::MAX; pixel_count],
        }
    }

    /// Clear the color buffer
    pub fn clear(&mut self, clear_color: u32) {
        count_call!(framebuffer_clear_calls);
        self.color_buffer.fill(clear_color);
    }

    /// Reset the depth buffer to "infinitely far" for the given mode.
    /// Z-buffering keeps the smallest z, so it starts at the maximum; the
    /// inverse-z buffer keeps the largest 1/z, so it starts at zero.
    pub fn clear_depth(&mut self, mode: DepthMode) {
        self.depth_buffer.fill(mode.clear_value());
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.color_buffer[y * self.width + x]
    }

    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> u32 {
        self.depth_buffer[y * self.width + x]
    }

    /// Resize to a new target size. The row layout changes with the
    /// width, so both buffers are reset: color to 0, depth to the z-buffer
    /// far value.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let pixel_count = width * height;
        self.color_buffer.clear();
        self.color_buffer.resize(pixel_count, 0);
        self.depth_buffer.clear();
        self.depth_buffer.resize(pixel_count, DepthMode::ZBuffer.clear_value());
    }
}

impl PixelTarget for Framebuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn has_depth(&self) -> bool {
        true
    }

    #[inline]
    fn rows_mut(&mut self, y: usize) -> (&mut [u32], Option<&mut [u32]>) {
        let start = y * self.width;
        let end = start + self.width;
        (
            &mut self.color_buffer[start..end],
            Some(&mut self.depth_buffer[start..end]),
        )
    }
}
