//! WebGPU render pipelines for meshes and lines
//!
//! Meshes are uploaded once. Every frame the scene graph is flattened into
//! per-instance data (one batch per mesh) and a world-space line list, both
//! written to fresh buffers.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::camera::OrbitCamera;
use super::vertex::{InstanceData, LineVertex, MeshVertex, colors};
use crate::error::{Result, SculptureError};
use crate::scene::{NodeKind, SceneGraph};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4], // offset 0
    camera_pos: [f32; 4],     // offset 64
    light_pos: [f32; 4],      // offset 80
    exposure: f32,            // offset 96
    _pad: [f32; 3],           // pad to 112 bytes
}

/// Per-frame inputs that are not part of the scene graph
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub light_position: Vec3,
    pub exposure: f32,
}

struct GpuMesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Instances of one mesh inside the frame's instance buffer
struct Batch {
    mesh: usize,
    instances: std::ops::Range<u32>,
}

/// Largest axis scale of a world matrix
fn max_scale(m: &Mat4) -> f32 {
    m.x_axis
        .truncate()
        .length()
        .max(m.y_axis.truncate().length())
        .max(m.z_axis.truncate().length())
}

/// CPU-side frame contents, built from the scene graph before any GPU work
#[derive(Default)]
pub struct FrameData {
    pub instances: Vec<InstanceData>,
    pub lines: Vec<LineVertex>,
    batches: Vec<Batch>,
}

impl FrameData {
    /// Collect visible, in-frustum mesh instances and line vertices
    pub fn collect(graph: &SceneGraph, camera: &OrbitCamera) -> Self {
        let world = graph.world_matrices();
        let visible = graph.world_visibility();
        let frustum = camera.frustum();

        let mut per_mesh: Vec<Vec<InstanceData>> = vec![Vec::new(); graph.meshes().len()];
        let mut lines = Vec::new();

        for (id, node) in graph.nodes() {
            let i = id.index();
            if !visible[i] {
                continue;
            }
            let m = &world[i];

            match &node.kind {
                NodeKind::Group => {}
                NodeKind::Mesh { mesh, material } => {
                    let bounds = graph.mesh(*mesh).bounds;
                    let center = m.transform_point3(bounds.center());
                    if frustum.intersects_sphere(center, bounds.radius() * max_scale(m)) {
                        per_mesh[mesh.index()].push(InstanceData::new(*m, material));
                    }
                }
                NodeKind::Line(line) => {
                    let (c, r) = line.bounding_sphere();
                    if frustum.intersects_sphere(m.transform_point3(c), r * max_scale(m)) {
                        for p in line.points() {
                            lines.push(LineVertex::new(m.transform_point3(p), line.color));
                        }
                    }
                }
            }
        }

        let mut instances = Vec::new();
        let mut batches = Vec::new();
        for (mesh, batch) in per_mesh.into_iter().enumerate() {
            if batch.is_empty() {
                continue;
            }
            let start = instances.len() as u32;
            instances.extend(batch);
            batches.push(Batch {
                mesh,
                instances: start..instances.len() as u32,
            });
        }

        Self {
            instances,
            lines,
            batches,
        }
    }

    /// Number of instances drawn for mesh `index`
    pub fn instance_count(&self, index: usize) -> u32 {
        self.batches
            .iter()
            .find(|b| b.mesh == index)
            .map(|b| b.instances.end - b.instances.start)
            .unwrap_or(0)
    }
}

/// Main render state
pub struct MeshRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl MeshRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sculpture-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(SculptureError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[MeshVertex::desc(), InstanceData::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[LineVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let depth_view = Self::create_depth_view(&device, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            line_pipeline,
            globals_buffer,
            bind_group,
            depth_view,
            meshes: Vec::new(),
            size: (width, height),
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.reconfigure();
        }
    }

    /// Reapply the surface configuration (after resize or a lost surface)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, self.config.width, self.config.height);
    }

    /// Upload meshes added to the graph since the last frame
    fn sync_meshes(&mut self, graph: &SceneGraph) {
        for data in &graph.meshes()[self.meshes.len()..] {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_vertices"),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            self.meshes.push(GpuMesh {
                buffer,
                vertex_count: data.vertices.len() as u32,
            });
        }
    }

    /// Draw the scene graph from `camera`
    pub fn render(
        &mut self,
        graph: &SceneGraph,
        camera: &OrbitCamera,
        params: FrameParams,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.sync_meshes(graph);
        let frame = FrameData::collect(graph, camera);

        let globals = Globals {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position().extend(1.0).to_array(),
            light_pos: params.light_position.extend(1.0).to_array(),
            exposure: params.exposure,
            _pad: [0.0; 3],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let instance_buffer = (!frame.instances.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("instances"),
                    contents: bytemuck::cast_slice(&frame.instances),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        let line_buffer = (!frame.lines.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("lines"),
                    contents: bytemuck::cast_slice(&frame.lines),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let [r, g, b, a] = colors::BACKGROUND;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            if let Some(instances) = &instance_buffer {
                render_pass.set_pipeline(&self.mesh_pipeline);
                render_pass.set_vertex_buffer(1, instances.slice(..));
                for batch in &frame.batches {
                    let mesh = &self.meshes[batch.mesh];
                    if mesh.vertex_count == 0 {
                        continue;
                    }
                    render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                    render_pass.draw(0..mesh.vertex_count, batch.instances.clone());
                }
            }

            if let Some(lines) = &line_buffer {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, lines.slice(..));
                render_pass.draw(0..frame.lines.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QualityPreset;
    use crate::scene::{Sculpture, SculptureLayout};

    #[test]
    fn test_globals_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 112);
    }

    #[test]
    fn test_collect_whole_sculpture() {
        let mut graph = SceneGraph::new();
        let sculpture =
            Sculpture::build(&mut graph, &SculptureLayout::default(), QualityPreset::Low, true)
                .unwrap();
        sculpture.animate(&mut graph, 0.0).unwrap();

        // Pulled back far enough to frame everything
        let mut camera = OrbitCamera::new(16.0 / 9.0);
        camera.distance = 12.0;
        let frame = FrameData::collect(&graph, &camera);

        // Mesh 0 balls, 1 wheels, 2 cam
        assert_eq!(frame.instance_count(0), 50);
        assert_eq!(frame.instance_count(1), 10);
        assert_eq!(frame.instance_count(2), 1);
        assert_eq!(frame.instances.len(), 61);
        // 50 strings + 3 axes, two vertices each
        assert_eq!(frame.lines.len(), 106);
    }

    #[test]
    fn test_collect_skips_hidden_axes() {
        let mut graph = SceneGraph::new();
        let sculpture =
            Sculpture::build(&mut graph, &SculptureLayout::default(), QualityPreset::Low, false)
                .unwrap();
        sculpture.animate(&mut graph, 0.0).unwrap();

        let mut camera = OrbitCamera::new(1.0);
        camera.distance = 12.0;
        let frame = FrameData::collect(&graph, &camera);
        assert_eq!(frame.lines.len(), 100);
    }

    #[test]
    fn test_collect_places_string_in_world_space() {
        let mut graph = SceneGraph::new();
        let layout = SculptureLayout {
            rows: 1,
            cols: 1,
            ..Default::default()
        };
        let sculpture = Sculpture::build(&mut graph, &layout, QualityPreset::Low, false).unwrap();
        sculpture.animate(&mut graph, 0.0).unwrap();

        let mut camera = OrbitCamera::new(1.0);
        camera.distance = 12.0;
        let frame = FrameData::collect(&graph, &camera);
        assert_eq!(frame.lines.len(), 2);
        // Ball hangs 2.0 below the elevated root; string runs back up to it
        assert!((frame.lines[0].position[1] - 1.0).abs() < 1e-5);
        assert!((frame.lines[1].position[1] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_collect_culls_everything_behind_camera() {
        let mut graph = SceneGraph::new();
        Sculpture::build(&mut graph, &SculptureLayout::default(), QualityPreset::Low, true)
            .unwrap();
        // Standing well past the sculpture and looking further away
        let mut camera = OrbitCamera::new(1.0);
        camera.target = Vec3::new(0.0, 0.0, 500.0);
        camera.distance = 1.0;
        camera.yaw = std::f32::consts::PI;
        let frame = FrameData::collect(&graph, &camera);
        assert!(frame.instances.is_empty());
        assert!(frame.lines.is_empty());
    }
}
