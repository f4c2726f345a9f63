/// Error types for the fallible construction and validation paths.
///
/// The scan-conversion hot path has no error channel: triangles that are
/// degenerate or fully clipped are skipped silently. Errors here cover
/// the setup work done once per frame or once per scene.
use thiserror::Error;

/// Texture construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("texture dimensions {width}x{height} are not powers of two")]
    NotPowerOfTwo { width: usize, height: usize },

    #[error("texture dimensions {width}x{height} exceed the {max}x{max} limit")]
    TooLarge { width: usize, height: usize, max: usize },

    #[error("expected {expected} texels, got {actual}")]
    TexelCountMismatch { expected: usize, actual: usize },
}

/// Render target / render context mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("clip rectangle ({min_x},{min_y})-({max_x},{max_y}) exceeds the {width}x{height} target")]
    ClipOutOfBounds {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        width: usize,
        height: usize,
    },

    #[error("depth mode {0:?} requires a depth buffer but the target has none")]
    MissingDepthBuffer(crate::rendering::DepthMode),

    #[error("{buffer} buffer holds {len} entries, {required} needed for pitch {pitch} and height {height}")]
    BufferTooSmall {
        buffer: &'static str,
        len: usize,
        required: usize,
        pitch: usize,
        height: usize,
    },

    #[error("row pitch {pitch} is smaller than the target width {width}")]
    PitchTooSmall { pitch: usize, width: usize },
}

/// Bounding hierarchy build failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BhvError {
    #[error("bhv needs at least 2 divisions per axis, got {0}")]
    InvalidDivisions(usize),

    #[error("bhv world radius must be positive and finite, got {0}")]
    InvalidWorldRadius(f32),
}
