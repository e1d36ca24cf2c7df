//! Animated sculpture parts
//!
//! Each part owns handles to its scene nodes plus the state fixed at
//! construction (offsets, phase, ball list) and repositions its nodes from
//! the kinematics on every frame.

use glam::{Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use super::graph::{MeshId, NodeId, SceneGraph};
use crate::consts::{AXES_LENGTH, STRING_CLEARANCE};
use crate::kinematics::{angle_at_time, polar_to_cartesian, radius_at_time};
use crate::renderer::shapes::axes;
use crate::renderer::vertex::{colors, materials};

/// Something that repositions itself for an elapsed time
pub trait Animate {
    fn animate(&self, graph: &mut SceneGraph, t_sec: f64);
}

/// A ball hanging from its wheel on a string
#[derive(Debug, Clone)]
pub struct Ball {
    node: NodeId,
    sphere: NodeId,
    string: NodeId,
    row: usize,
    col: usize,
    /// Planar (x, z) offset inside the wheel group
    offset: Vec2,
}

impl Ball {
    pub fn new(
        graph: &mut SceneGraph,
        parent: NodeId,
        mesh: MeshId,
        row: usize,
        col: usize,
        offset: Vec2,
    ) -> Self {
        let node = graph.add_group(parent);
        graph.set_position(node, Vec3::new(offset.x, 0.0, offset.y));
        let sphere = graph.add_mesh(node, mesh, materials::CARBON);
        let string = graph.add_line(node, Vec3::ZERO, Vec3::ZERO, colors::STRING);

        Self {
            node,
            sphere,
            string,
            row,
            col,
            offset,
        }
    }

    /// Hang the ball `STRING_CLEARANCE + radius` below the wheel and stretch
    /// the string back up to it
    pub fn animate(&self, graph: &mut SceneGraph, radius: f32) {
        let drop = STRING_CLEARANCE + radius;

        let mut position = graph.position(self.node);
        position.y = -drop;
        graph.set_position(self.node, position);

        if let Some(string) = graph.line_mut(self.string) {
            string.set_point(1, Vec3::new(0.0, drop, 0.0));
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn sphere(&self) -> NodeId {
        self.sphere
    }

    pub fn string(&self) -> NodeId {
        self.string
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Current height relative to the wheel group
    pub fn height(&self, graph: &SceneGraph) -> f32 {
        graph.position(self.node).y
    }
}

/// A wheel following the cam at a fixed phase, carrying a column of balls
#[derive(Debug, Clone)]
pub struct PulleyWheel {
    group: NodeId,
    wheel: NodeId,
    starting_phase: f32,
    balls: Vec<Ball>,
}

impl PulleyWheel {
    /// Create the wheel under `parent`; `build_balls` hangs the balls from
    /// the new wheel group and fixes the membership for the wheel's lifetime
    pub fn new<F>(
        graph: &mut SceneGraph,
        parent: NodeId,
        mesh: MeshId,
        starting_phase: f32,
        build_balls: F,
    ) -> Self
    where
        F: FnOnce(&mut SceneGraph, NodeId) -> Vec<Ball>,
    {
        let group = graph.add_group(parent);
        let wheel = graph.add_mesh(group, mesh, materials::METAL_GRAY);
        let balls = build_balls(graph, group);

        Self {
            group,
            wheel,
            starting_phase,
            balls,
        }
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn wheel(&self) -> NodeId {
        self.wheel
    }

    pub fn starting_phase(&self) -> f32 {
        self.starting_phase
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn radius_at(&self, t_sec: f64) -> f32 {
        radius_at_time(self.starting_phase, t_sec)
    }
}

impl Animate for PulleyWheel {
    fn animate(&self, graph: &mut SceneGraph, t_sec: f64) {
        let r = self.radius_at(t_sec);
        let offset = polar_to_cartesian(r, self.starting_phase);

        let mut position = graph.position(self.wheel);
        position.x = -offset.x;
        position.z = offset.y;
        graph.set_position(self.wheel, position);

        for ball in &self.balls {
            ball.animate(graph, r);
        }
    }
}

/// The rotating cam and its axes helper
#[derive(Debug, Clone)]
pub struct Cam {
    node: NodeId,
    body: NodeId,
    axes: NodeId,
}

impl Cam {
    pub fn new(graph: &mut SceneGraph, parent: NodeId, mesh: MeshId, show_axes: bool) -> Self {
        let node = graph.add_group(parent);

        // Outline is cut in XY; lay it flat so it turns about the vertical
        let body = graph.add_mesh(node, mesh, materials::METAL_RED);
        graph.set_rotation(body, Quat::from_rotation_x(FRAC_PI_2));

        let axes_group = graph.add_group(node);
        for (a, b, color) in axes(AXES_LENGTH) {
            graph.add_line(axes_group, a, b, color);
        }
        graph.set_visible(axes_group, show_axes);

        Self {
            node,
            body,
            axes: axes_group,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn axes(&self) -> NodeId {
        self.axes
    }

    pub fn set_axes_visible(&self, graph: &mut SceneGraph, visible: bool) {
        graph.set_visible(self.axes, visible);
    }
}

impl Animate for Cam {
    fn animate(&self, graph: &mut SceneGraph, t_sec: f64) {
        graph.set_rotation(self.node, Quat::from_rotation_y(angle_at_time(t_sec)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::{cylinder, extrude, sphere};
    use std::f32::consts::{PI, TAU};

    fn single_wheel(phase: f32) -> (SceneGraph, PulleyWheel) {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let ball_mesh = graph.add_mesh_data(sphere(0.1, 8, 4));
        let wheel_mesh = graph.add_mesh_data(cylinder(0.1, 0.25, 8));
        let wheel = PulleyWheel::new(&mut graph, root, wheel_mesh, phase, |g, parent| {
            (0..3)
                .map(|row| Ball::new(g, parent, ball_mesh, row, 0, Vec2::new(0.0, row as f32)))
                .collect()
        });
        (graph, wheel)
    }

    #[test]
    fn test_ball_hangs_below_wheel() {
        let (mut graph, wheel) = single_wheel(0.0);
        let ball = &wheel.balls()[1];
        ball.animate(&mut graph, 1.0);

        assert_eq!(ball.height(&graph), -1.5);
        let string = graph.line(ball.string()).unwrap();
        assert_eq!(string.points(), [Vec3::ZERO, Vec3::new(0.0, 1.5, 0.0)]);
        assert_eq!(string.bounds().max.y, 1.5);
        // Planar offset untouched
        assert_eq!(graph.position(ball.node()), Vec3::new(0.0, -1.5, 1.0));
    }

    #[test]
    fn test_ball_string_reaches_wheel_level() {
        let (mut graph, wheel) = single_wheel(0.0);
        let ball = &wheel.balls()[0];
        ball.animate(&mut graph, 2.2);

        let world = graph.world_matrices();
        let end = graph.line(ball.string()).unwrap().points()[1];
        let top = world[ball.string().index()].transform_point3(end);
        assert!(top.y.abs() < 1e-6);
    }

    #[test]
    fn test_wheel_at_zero_phase_and_time() {
        let (mut graph, wheel) = single_wheel(0.0);
        wheel.animate(&mut graph, 0.0);

        let pos = graph.position(wheel.wheel());
        assert!((pos.x + 1.5).abs() < 1e-6);
        assert!(pos.z.abs() < 1e-6);
        for ball in wheel.balls() {
            assert_eq!(ball.height(&graph), -2.0);
        }
    }

    #[test]
    fn test_wheel_offset_follows_phase() {
        let (mut graph, wheel) = single_wheel(PI / 2.0);
        wheel.animate(&mut graph, 0.0);

        // r = 2.5 at phase π/2, so the wheel sits at depth 2.5
        let pos = graph.position(wheel.wheel());
        assert!(pos.x.abs() < 1e-5);
        assert!((pos.z - 2.5).abs() < 1e-5);
        assert!((wheel.balls()[0].height(&graph) + 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_wheel_animate_is_idempotent() {
        let (mut graph, wheel) = single_wheel(TAU / 10.0 * 3.0);
        wheel.animate(&mut graph, 5.3);
        let first = graph.world_matrices();
        wheel.animate(&mut graph, 5.3);
        let second = graph.world_matrices();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cam_rotation_follows_angle() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let outline = crate::kinematics::cam_outline(16).unwrap();
        let mesh = graph.add_mesh_data(extrude(&outline, 0.25));
        let cam = Cam::new(&mut graph, root, mesh, true);

        cam.animate(&mut graph, 4.0);
        let expected = Quat::from_rotation_y(PI);
        assert!(graph.rotation(cam.node()).abs_diff_eq(expected, 1e-6));
        // Body keeps its fixed tilt
        assert!(graph.rotation(cam.body()).abs_diff_eq(Quat::from_rotation_x(FRAC_PI_2), 1e-6));
    }

    #[test]
    fn test_cam_axes_toggle() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mesh = graph.add_mesh_data(extrude(&crate::kinematics::cam_outline(8).unwrap(), 0.25));
        let cam = Cam::new(&mut graph, root, mesh, false);
        assert!(!graph.is_visible(cam.axes()));
        cam.set_axes_visible(&mut graph, true);
        assert!(graph.is_visible(cam.axes()));
    }
}
