use bitflags::bitflags;
use glam::Vec3;

use crate::camera::{CullPlanes, Frustum};
use crate::rendering::RenderAttr;

/// Index of a mesh in the caller's mesh store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectState: u32 {
        const ACTIVE = 1 << 0;
        const VISIBLE = 1 << 1;
        /// Set by frustum culling; cleared by a BHV reset.
        const CULLED = 1 << 2;
    }
}

impl Default for ObjectState {
    fn default() -> Self {
        ObjectState::ACTIVE | ObjectState::VISIBLE
    }
}

/// One placed copy of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneInstance {
    pub position: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    /// Bounding sphere radius around `position`.
    pub radius: f32,
    pub mesh: MeshId,
    pub state: ObjectState,
    pub attr: RenderAttr,
}

impl SceneInstance {
    pub fn new(mesh: MeshId, position: Vec3, radius: f32) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            radius,
            mesh,
            state: ObjectState::default(),
            attr: RenderAttr::empty(),
        }
    }

    #[inline]
    pub fn is_culled(&self) -> bool {
        self.state.contains(ObjectState::CULLED)
    }

    /// Test the bounding sphere against the selected planes, flag the
    /// instance when it is outside, and return whether it was culled.
    ///
    /// A flag already set by an enclosing BHV node is left in place.
    pub fn cull(&mut self, frustum: &Frustum, planes: CullPlanes) -> bool {
        if !frustum.intersects_sphere(self.position, self.radius, planes) {
            self.state.insert(ObjectState::CULLED);
        }
        self.is_culled()
    }

    /// World-space box enclosing the bounding sphere.
    #[inline]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let extent = Vec3::splat(self.radius);
        (self.position - extent, self.position + extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn new_instance_is_active_and_visible() {
        let instance = SceneInstance::new(MeshId(3), Vec3::ZERO, 1.0);
        assert!(instance.state.contains(ObjectState::ACTIVE | ObjectState::VISIBLE));
        assert!(!instance.is_culled());
    }

    #[test]
    fn cull_flags_instance_behind_camera() {
        let frustum = Camera::new(Vec3::ZERO, 1.0).extract_frustum();

        let mut ahead = SceneInstance::new(MeshId(0), Vec3::new(0.0, 0.0, -20.0), 1.0);
        let mut behind = SceneInstance::new(MeshId(0), Vec3::new(0.0, 0.0, 20.0), 1.0);

        assert!(!ahead.cull(&frustum, CullPlanes::XYZ));
        assert!(behind.cull(&frustum, CullPlanes::XYZ));
        assert!(behind.is_culled());
    }
}
