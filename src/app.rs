//! Application context
//!
//! Owns everything a running viewer needs (scene, camera, clock, settings,
//! renderer) and is driven once per animation frame by the host loop.

use crate::consts::LIGHT_BULB_RADIUS;
use crate::error::Result;
use crate::platform::FrameClock;
use crate::renderer::shapes;
use crate::renderer::{FrameParams, MeshRenderer, OrbitCamera};
use crate::scene::{Animate, Lighting, SceneGraph, Sculpture};
use crate::settings::Settings;

/// Viewer commands bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleAxes,
    ToggleLightOrbit,
    ResetCamera,
}

impl KeyCommand {
    /// Command for a `KeyboardEvent.key`; chords with Ctrl/Cmd/Alt belong to
    /// the browser
    pub fn from_key(key: &str, modified: bool) -> Option<Self> {
        if modified {
            return None;
        }
        match key {
            "a" | "A" => Some(KeyCommand::ToggleAxes),
            "l" | "L" => Some(KeyCommand::ToggleLightOrbit),
            "r" | "R" => Some(KeyCommand::ResetCamera),
            _ => None,
        }
    }
}

/// Running viewer state
pub struct App {
    pub settings: Settings,
    pub graph: SceneGraph,
    pub camera: OrbitCamera,
    sculpture: Sculpture,
    lighting: Lighting,
    clock: FrameClock,
    renderer: Option<MeshRenderer>,
    /// Seconds since the first frame, as of the last good frame
    elapsed: f64,
    skipped_frames: u64,
}

impl App {
    /// Build the scene for `settings`; rendering starts once a renderer is attached
    pub fn new(mut settings: Settings, aspect: f32) -> Result<Self> {
        let layout = settings.layout.sanitized();
        if layout != settings.layout {
            log::warn!("Stored layout out of range, using {:?}", layout);
            settings.layout = layout;
        }

        let mut graph = SceneGraph::new();
        let sculpture = Sculpture::build(
            &mut graph,
            &settings.layout,
            settings.quality,
            settings.show_axes,
        )?;

        let bulb_mesh = graph.add_mesh_data(shapes::sphere(LIGHT_BULB_RADIUS, 8, 8));
        let root = graph.root();
        let lighting = Lighting::new(&mut graph, root, bulb_mesh);

        // Pose for t = 0 so the first frame is valid before the clock runs
        sculpture.animate(&mut graph, 0.0)?;

        log::info!("Scene ready ({} quality)", settings.quality.as_str());

        Ok(Self {
            settings,
            graph,
            camera: OrbitCamera::new(aspect),
            sculpture,
            lighting,
            clock: FrameClock::new(),
            renderer: None,
            elapsed: 0.0,
            skipped_frames: 0,
        })
    }

    pub fn attach_renderer(&mut self, renderer: MeshRenderer) {
        self.renderer = Some(renderer);
    }

    /// Advance to the host timestamp and draw
    pub fn frame(&mut self, now_ms: f64) {
        self.update(now_ms);
        self.render();
    }

    /// Animate the scene for the host timestamp `now_ms`
    ///
    /// A frame whose time cannot be used is skipped; the scene keeps its
    /// previous pose.
    pub fn update(&mut self, now_ms: f64) {
        let t = self.clock.tick(now_ms);

        match self.sculpture.animate(&mut self.graph, t) {
            Ok(()) => {
                self.elapsed = t;
                if self.settings.orbit_light {
                    self.lighting.animate(&mut self.graph, t);
                }
            }
            Err(e) => {
                self.skipped_frames += 1;
                log::warn!("Skipping frame: {}", e);
            }
        }
    }

    pub fn render(&mut self) {
        let params = FrameParams {
            light_position: self.lighting.position(&self.graph),
            exposure: self.settings.effective_exposure(),
        };

        if let Some(renderer) = self.renderer.as_mut() {
            match renderer.render(&self.graph, &self.camera, params) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    /// New drawing-buffer size in physical pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width as f32 / height as f32);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    pub fn toggle_axes(&mut self) {
        self.settings.show_axes = !self.settings.show_axes;
        self.sculpture
            .cam()
            .set_axes_visible(&mut self.graph, self.settings.show_axes);
        log::info!("Axes: {}", self.settings.show_axes);
        self.settings.save();
    }

    pub fn toggle_light_orbit(&mut self) {
        self.settings.orbit_light = !self.settings.orbit_light;
        log::info!("Light orbit: {}", self.settings.orbit_light);
        self.settings.save();
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn handle_key(&mut self, command: KeyCommand) {
        match command {
            KeyCommand::ToggleAxes => self.toggle_axes(),
            KeyCommand::ToggleLightOrbit => self.toggle_light_orbit(),
            KeyCommand::ResetCamera => self.reset_camera(),
        }
    }

    pub fn sculpture(&self) -> &Sculpture {
        &self.sculpture
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }
}
