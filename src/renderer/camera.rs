//! Orbit camera and view frustum

use glam::{Mat4, Vec3, Vec4};

/// Camera orbiting a target point, driven by drag and wheel input
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,   // Horizontal rotation (radians)
    pub pitch: f32, // Vertical rotation (radians)
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    pub const MIN_DISTANCE: f32 = 1.0;
    pub const MAX_DISTANCE: f32 = 100.0;
    pub const MAX_PITCH: f32 = 1.5;
    /// Radians per dragged pixel
    pub const ROTATE_SPEED: f32 = 0.005;

    /// Start 5 units in front of the origin, looking at it
    pub fn new(aspect: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Apply a pointer drag of (dx, dy) pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.rotate(-dx * Self::ROTATE_SPEED, dy * Self::ROTATE_SPEED);
    }

    /// Positive `delta` moves closer
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance * (1.0 - delta * 0.1)).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Back to the starting pose, keeping the aspect ratio
    pub fn reset(&mut self) {
        *self = Self::new(self.aspect);
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }
}

/// Six clip planes (xyz = inward normal, w = distance)
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a view-projection matrix with a [0, 1] depth range
    pub fn from_view_projection(m: &Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);

        let normalize = |p: Vec4| {
            let len = p.truncate().length();
            if len > 0.0 { p / len } else { p }
        };

        Self {
            planes: [
                normalize(r3 + r0), // left
                normalize(r3 - r0), // right
                normalize(r3 + r1), // bottom
                normalize(r3 - r1), // top
                normalize(r2),      // near
                normalize(r3 - r2), // far
            ],
        }
    }

    /// True unless the sphere lies entirely outside one plane
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }
}
