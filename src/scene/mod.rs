//! Scene module
//!
//! Builds the sculpture into a `SceneGraph` and animates it once per frame.
//! Nothing here touches the GPU or the browser.

pub mod graph;
pub mod lighting;
pub mod models;

pub use graph::{LineSegment, MeshId, Node, NodeId, NodeKind, SceneGraph, Transform};
pub use lighting::{Lighting, light_position_at_time};
pub use models::{Animate, Ball, Cam, PulleyWheel};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::*;
use crate::error::{Result, SculptureError};
use crate::kinematics::cam_outline;
use crate::renderer::shapes;
use crate::settings::QualityPreset;

/// Shape of the ball grid and the cam tessellation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptureLayout {
    /// Balls per wheel
    pub rows: usize,
    /// Number of wheels
    pub cols: usize,
    /// Grid pitch between neighbouring balls
    pub spacing: f32,
    /// Height of the sculpture root above the origin
    pub elevation: f32,
    /// Points on the cam outline
    pub cam_samples: usize,
}

impl Default for SculptureLayout {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            spacing: DEFAULT_SPACING,
            elevation: DEFAULT_ELEVATION,
            cam_samples: CAM_OUTLINE_SAMPLES,
        }
    }
}

impl SculptureLayout {
    /// Starting phase of wheel `col`, evenly spaced around one turn
    pub fn phase_of(&self, col: usize) -> f32 {
        col as f32 * (TAU / self.cols as f32)
    }

    /// Copy with every field forced into a buildable range
    ///
    /// Non-finite or non-positive distances fall back to their defaults and
    /// counts are clamped, so a stale or hand-edited layout still builds a
    /// complete, finite sculpture.
    pub fn sanitized(&self) -> Self {
        let spacing = if self.spacing.is_finite() && self.spacing > 0.0 {
            self.spacing.min(MAX_SPACING)
        } else {
            DEFAULT_SPACING
        };
        let elevation = if self.elevation.is_finite() {
            self.elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION)
        } else {
            DEFAULT_ELEVATION
        };

        Self {
            rows: self.rows.clamp(1, MAX_GRID_SIZE),
            cols: self.cols.clamp(1, MAX_GRID_SIZE),
            spacing,
            elevation,
            cam_samples: self.cam_samples.clamp(MIN_CAM_SAMPLES, MAX_CAM_SAMPLES),
        }
    }

    /// Planar (x, z) offset of a ball, grid centered on the cam axis
    pub fn ball_offset(&self, row: usize, col: usize) -> Vec2 {
        let center_row = (self.rows as f32 - 1.0) / 2.0;
        let center_col = (self.cols as f32 - 1.0) / 2.0;
        Vec2::new(
            (col as f32 - center_col) * self.spacing,
            (row as f32 - center_row) * self.spacing,
        )
    }
}

/// The full mechanism: one cam and a ring of phased wheels
#[derive(Debug, Clone)]
pub struct Sculpture {
    root: NodeId,
    cam: Cam,
    wheels: Vec<PulleyWheel>,
}

impl Sculpture {
    /// Build every part under the graph root
    pub fn build(
        graph: &mut SceneGraph,
        layout: &SculptureLayout,
        quality: QualityPreset,
        show_axes: bool,
    ) -> Result<Self> {
        let (width_segments, height_segments) = quality.sphere_segments();
        let ball_mesh =
            graph.add_mesh_data(shapes::sphere(BALL_RADIUS, width_segments, height_segments));
        let wheel_mesh = graph.add_mesh_data(shapes::cylinder(
            WHEEL_RADIUS,
            WHEEL_THICKNESS,
            quality.wheel_segments(),
        ));
        let outline = cam_outline(layout.cam_samples)?;
        let cam_mesh = graph.add_mesh_data(shapes::extrude(&outline, CAM_DEPTH));

        let scene_root = graph.root();
        let root = graph.add_group(scene_root);
        graph.set_position(root, Vec3::new(0.0, layout.elevation, 0.0));

        let cam = Cam::new(graph, root, cam_mesh, show_axes);

        let wheels = (0..layout.cols)
            .map(|col| {
                PulleyWheel::new(graph, root, wheel_mesh, layout.phase_of(col), |g, parent| {
                    (0..layout.rows)
                        .map(|row| {
                            Ball::new(g, parent, ball_mesh, row, col, layout.ball_offset(row, col))
                        })
                        .collect()
                })
            })
            .collect::<Vec<_>>();

        log::info!(
            "Built sculpture: {} wheels x {} balls, {} scene nodes",
            layout.cols,
            layout.rows,
            graph.len()
        );

        Ok(Self { root, cam, wheels })
    }

    /// Pose the cam and every wheel for `t_sec`
    ///
    /// A non-finite time is rejected before any node is touched.
    pub fn animate(&self, graph: &mut SceneGraph, t_sec: f64) -> Result<()> {
        if !t_sec.is_finite() {
            return Err(SculptureError::NonFiniteTime(t_sec));
        }

        self.cam.animate(graph, t_sec);
        for wheel in &self.wheels {
            wheel.animate(graph, t_sec);
        }
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cam(&self) -> &Cam {
        &self.cam
    }

    pub fn wheels(&self) -> &[PulleyWheel] {
        &self.wheels
    }
}
