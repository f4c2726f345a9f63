/// soft3d - fixed-point software triangle rasterizer
/// with BHV frustum culling for scene instances
pub mod camera;
pub mod error;
pub mod perf;
pub mod rendering;
pub mod scene;

pub use camera::{Camera, CullPlanes, Frustum};
pub use error::{BhvError, RenderError, TextureError};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use rendering::{
    ClipRect, DepthMode, Framebuffer, PixelTarget, RasterStats, Rasterizer, RenderAttr, RenderContext,
    ScreenTriangle, ScreenVertex, ShadeMode, SurfaceTarget, Texture, TextureMode,
};
pub use scene::{BhvConfig, BhvTree, MeshId, ObjectState, SceneInstance};
