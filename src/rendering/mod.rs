/// Software rasterization pipeline
/// Fixed-point scanline triangles with flat, gouraud and textured fills
pub mod classify;
pub mod clip;
pub mod color;
pub mod context;
pub mod edge_walker;
pub mod fixed;
pub mod framebuffer;
pub mod rasterizer;
pub mod shader;
pub mod texture;
pub mod triangle;

pub use classify::{ClassifiedTriangle, Rejection, SetupVertex, TriangleKind};
pub use clip::{ClipRect, ClippedSpan};
pub use context::{DepthMode, RenderAttr, RenderContext, TextureMode};
pub use edge_walker::{EdgeWalker, Interpolants, WalkState};
pub use framebuffer::{Framebuffer, PixelTarget, SurfaceTarget};
pub use rasterizer::{RasterStats, Rasterizer};
pub use texture::{Texture, MAX_TEXTURE_SIZE};
pub use triangle::{ScreenTriangle, ScreenVertex, ShadeMode};
