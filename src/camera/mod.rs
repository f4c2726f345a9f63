/// Viewer camera and the frustum it sees
/// Frustum planes feed BHV and per-object culling
use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3, Vec4};

const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis (radians)
    pub pitch: f32, // Rotation around X axis (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 70.0f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect_ratio,
        }
    }

    pub fn with_clip_distances(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Orient the camera towards a world-space point.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let view_matrix = Mat4::look_at_rh(self.position, target, up);
        let rotation_quat = Quat::from_mat4(&view_matrix.inverse());
        let (yaw, pitch, _roll) = rotation_quat.to_euler(glam::EulerRot::YXZ);
        self.set_orientation(yaw, pitch);
    }

    /// Set yaw and pitch directly. Pitch is clamped short of straight up/down.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn view_matrix(&self) -> Mat4 {
        let rotation = self.rotation_quat();
        let target = self.position + rotation * Vec3::NEG_Z;
        Mat4::look_at_rh(self.position, target, rotation * Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation_quat() * Vec3::NEG_Z
    }

    fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn extract_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }
}

bitflags! {
    /// Which frustum plane pairs a cull test honours.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CullPlanes: u8 {
        /// Left and right.
        const X = 1 << 0;
        /// Bottom and top.
        const Y = 1 << 1;
        /// Near and far.
        const Z = 1 << 2;
        const XYZ = Self::X.bits() | Self::Y.bits() | Self::Z.bits();
    }
}

impl CullPlanes {
    #[inline]
    fn includes_plane(self, index: usize) -> bool {
        match index / 2 {
            0 => self.contains(CullPlanes::X),
            1 => self.contains(CullPlanes::Y),
            _ => self.contains(CullPlanes::Z),
        }
    }
}

/// View frustum represented as 6 planes
/// Planes are stored in Hessian normal form: ax + by + cz + d = 0
/// with (a,b,c) pointing into the frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// 6 planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb-Hartmann extraction from a view-projection matrix
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        Self {
            planes: [
                Self::normalize_plane(row3 + row0),
                Self::normalize_plane(row3 - row0),
                Self::normalize_plane(row3 + row1),
                Self::normalize_plane(row3 - row1),
                Self::normalize_plane(row3 + row2),
                Self::normalize_plane(row3 - row2),
            ],
        }
    }

    #[inline]
    fn normalize_plane(plane: Vec4) -> Vec4 {
        let normal_length = plane.truncate().length();
        if normal_length > 0.0001 {
            plane / normal_length
        } else {
            plane
        }
    }

    fn selected(&self, planes: CullPlanes) -> impl Iterator<Item = &Vec4> {
        self.planes
            .iter()
            .enumerate()
            .filter(move |(i, _)| planes.includes_plane(*i))
            .map(|(_, plane)| plane)
    }

    /// Test if an AABB intersects the frustum
    /// Returns true if the box is at least partially inside
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.intersects_aabb_planes(min, max, CullPlanes::XYZ)
    }

    /// AABB test against the selected plane pairs only.
    pub fn intersects_aabb_planes(&self, min: Vec3, max: Vec3, planes: CullPlanes) -> bool {
        self.selected(planes).all(|plane| {
            // Corner furthest along the plane normal
            let p_vertex = Vec3::new(
                if plane.x > 0.0 { max.x } else { min.x },
                if plane.y > 0.0 { max.y } else { min.y },
                if plane.z > 0.0 { max.z } else { min.z },
            );
            plane.truncate().dot(p_vertex) + plane.w >= 0.0
        })
    }

    /// Bounding sphere test against the selected plane pairs.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32, planes: CullPlanes) -> bool {
        self.selected(planes)
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }
}
