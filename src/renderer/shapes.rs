//! Shape generation for 3D primitives
//!
//! All meshes are non-indexed triangle lists in object space.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use super::vertex::{MeshVertex, colors};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Tightest box around `points` (empty input gives a zero box at the origin)
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        iter.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: b.min.min(p),
                max: b.max.max(p),
            },
        )
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the sphere through the box corners
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }
}

/// Triangle-list mesh with precomputed bounds
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub bounds: Bounds,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        let bounds = Bounds::from_points(vertices.iter().map(|v| v.position()));
        Self { vertices, bounds }
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

fn push_triangle(vertices: &mut Vec<MeshVertex>, a: Vec3, b: Vec3, c: Vec3, normal: Vec3) {
    vertices.push(MeshVertex::new(a, normal));
    vertices.push(MeshVertex::new(b, normal));
    vertices.push(MeshVertex::new(c, normal));
}

/// UV sphere centered at the origin
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut vertices = Vec::with_capacity((w * h * 6) as usize);

    let unit = |phi: f32, theta: f32| {
        Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
    };

    for j in 0..h {
        let phi1 = (j as f32 / h as f32) * PI;
        let phi2 = ((j + 1) as f32 / h as f32) * PI;

        for i in 0..w {
            let theta1 = (i as f32 / w as f32) * TAU;
            let theta2 = ((i + 1) as f32 / w as f32) * TAU;

            let n11 = unit(phi1, theta1);
            let n12 = unit(phi1, theta2);
            let n21 = unit(phi2, theta1);
            let n22 = unit(phi2, theta2);

            // Two triangles per quad, smooth normals
            for n in [n11, n21, n12, n12, n21, n22] {
                vertices.push(MeshVertex::new(n * radius, n));
            }
        }
    }

    MeshData::new(vertices)
}

/// Capped cylinder along Y, centered at the origin
pub fn cylinder(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height / 2.0;
    let mut vertices = Vec::with_capacity((segments * 12) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        let n1 = Vec3::new(theta1.cos(), 0.0, theta1.sin());
        let n2 = Vec3::new(theta2.cos(), 0.0, theta2.sin());

        let top1 = n1 * radius + Vec3::Y * half;
        let top2 = n2 * radius + Vec3::Y * half;
        let bot1 = n1 * radius - Vec3::Y * half;
        let bot2 = n2 * radius - Vec3::Y * half;

        // Side
        vertices.push(MeshVertex::new(top1, n1));
        vertices.push(MeshVertex::new(bot1, n1));
        vertices.push(MeshVertex::new(top2, n2));
        vertices.push(MeshVertex::new(top2, n2));
        vertices.push(MeshVertex::new(bot1, n1));
        vertices.push(MeshVertex::new(bot2, n2));

        // Caps
        push_triangle(&mut vertices, Vec3::Y * half, top2, top1, Vec3::Y);
        push_triangle(&mut vertices, -Vec3::Y * half, bot1, bot2, -Vec3::Y);
    }

    MeshData::new(vertices)
}

/// Extrude a closed outline in the XY plane from z=0 to z=`depth`
///
/// The outline must be star-shaped around the origin (every ray from the
/// origin crosses it once) and wound counter-clockwise; caps are fanned from
/// the origin. Outlines with fewer than three points produce an empty mesh.
pub fn extrude(outline: &[Vec2], depth: f32) -> MeshData {
    let n = outline.len();
    if n < 3 {
        return MeshData::new(Vec::new());
    }

    let mut vertices = Vec::with_capacity(n * 12);
    let front_z = Vec3::Z * depth;

    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];

        let a0 = a.extend(0.0);
        let b0 = b.extend(0.0);
        let a1 = a0 + front_z;
        let b1 = b0 + front_z;

        // Caps
        push_triangle(&mut vertices, front_z, a1, b1, Vec3::Z);
        push_triangle(&mut vertices, Vec3::ZERO, b0, a0, -Vec3::Z);

        // Side wall, outward for a CCW outline
        let edge = b - a;
        let normal = Vec2::new(edge.y, -edge.x).normalize_or_zero().extend(0.0);
        push_triangle(&mut vertices, a0, b0, b1, normal);
        push_triangle(&mut vertices, a0, b1, a1, normal);
    }

    MeshData::new(vertices)
}

/// Axes helper: X red, Y green, Z blue, each `length` long from the origin
pub fn axes(length: f32) -> [(Vec3, Vec3, [f32; 4]); 3] {
    [
        (Vec3::ZERO, Vec3::X * length, colors::AXIS_X),
        (Vec3::ZERO, Vec3::Y * length, colors::AXIS_Y),
        (Vec3::ZERO, Vec3::Z * length, colors::AXIS_Z),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::cam_outline;

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 2.0, 3.0)]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.center(), Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(Bounds::from_points(std::iter::empty()), Bounds::EMPTY);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = sphere(0.1, 32, 16);
        assert_eq!(mesh.vertices.len(), 32 * 16 * 6);
        for v in &mesh.vertices {
            assert!((v.position().length() - 0.1).abs() < 1e-5);
            assert!((v.normal().length() - 1.0).abs() < 1e-5);
        }
        assert!((mesh.bounds.max.y - 0.1).abs() < 1e-6);
        assert!((mesh.bounds.min.y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_dimensions() {
        let mesh = cylinder(0.1, 0.25, 32);
        assert_eq!(mesh.triangle_count(), 32 * 4);
        assert!((mesh.bounds.max.y - 0.125).abs() < 1e-6);
        assert!((mesh.bounds.min.y + 0.125).abs() < 1e-6);
        assert!((mesh.bounds.max.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_extrude_cam_outline_is_closed() {
        let outline = cam_outline(100).unwrap();
        let mesh = extrude(&outline, 0.25);
        // Two cap triangles and two wall triangles per edge
        assert_eq!(mesh.triangle_count(), 100 * 4);

        let front = mesh.vertices.iter().filter(|v| v.normal == [0.0, 0.0, 1.0]).count();
        let back = mesh.vertices.iter().filter(|v| v.normal == [0.0, 0.0, -1.0]).count();
        assert_eq!(front, 300);
        assert_eq!(back, 300);

        assert!((mesh.bounds.max.z - 0.25).abs() < 1e-6);
        assert!((mesh.bounds.max.y - 2.5).abs() < 1e-4);
        // y = (1.5 + s)·s bottoms out at s = sinθ = -0.75
        assert!((mesh.bounds.min.y + 0.5625).abs() < 1e-3);
    }

    #[test]
    fn test_extrude_walls_face_outward() {
        let outline = cam_outline(64).unwrap();
        let mesh = extrude(&outline, 0.25);
        for tri in mesh.vertices.chunks(3) {
            let n = tri[0].normal();
            if n.z != 0.0 {
                continue;
            }
            let centroid = (tri[0].position() + tri[1].position() + tri[2].position()) / 3.0;
            assert!(n.truncate().dot(centroid.truncate()) > 0.0);
        }
    }

    #[test]
    fn test_extrude_degenerate_outline() {
        let mesh = extrude(&[Vec2::ZERO, Vec2::X], 1.0);
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn test_axes_lengths() {
        for (a, b, _) in axes(8.0) {
            assert_eq!(a, Vec3::ZERO);
            assert_eq!(b.length(), 8.0);
        }
    }
}
