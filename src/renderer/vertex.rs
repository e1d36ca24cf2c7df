//! Vertex, instance and material types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Mesh vertex with position and normal (object space)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-draw data for one mesh node
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    /// Linear RGB + alpha
    pub color: [f32; 4],
    /// metalness, roughness, clearcoat, emissive
    pub material: [f32; 4],
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub fn new(model: Mat4, material: &Material) -> Self {
        let [r, g, b] = material.base_color;
        Self {
            model: model.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            material: [
                material.metalness,
                material.roughness,
                material.clearcoat,
                material.emissive,
            ],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// World-space line vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Surface description used by the mesh shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGB
    pub base_color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    /// 1.0 = unlit, drawn at full base color
    pub emissive: f32,
}

/// Materials for sculpture parts
pub mod materials {
    use super::Material;

    /// Clear-coated carbon fibre (balls)
    pub const CARBON: Material = Material {
        base_color: [0.04, 0.04, 0.045],
        metalness: 0.0,
        roughness: 0.5,
        clearcoat: 1.0,
        emissive: 0.0,
    };

    /// Polished red metal (cam)
    pub const METAL_RED: Material = Material {
        base_color: [1.0, 0.0, 0.0],
        metalness: 1.0,
        roughness: 0.35,
        clearcoat: 1.0,
        emissive: 0.0,
    };

    /// Gunmetal gray #535654 (wheels)
    pub const METAL_GRAY: Material = Material {
        base_color: [0.087, 0.092, 0.089],
        metalness: 1.0,
        roughness: 0.35,
        clearcoat: 1.0,
        emissive: 0.0,
    };

    /// Unlit white (light bulb)
    pub const LIGHT_BULB: Material = Material {
        base_color: [1.0, 1.0, 1.0],
        metalness: 0.0,
        roughness: 1.0,
        clearcoat: 0.0,
        emissive: 1.0,
    };
}

/// Line colors
pub mod colors {
    pub const STRING: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const AXIS_X: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const AXIS_Y: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const AXIS_Z: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.03, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
        assert_eq!(std::mem::size_of::<LineVertex>(), 28);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
    }

    #[test]
    fn test_instance_packs_material() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let inst = InstanceData::new(model, &materials::METAL_RED);
        assert_eq!(inst.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(inst.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(inst.material, [1.0, 0.35, 1.0, 0.0]);
    }
}
