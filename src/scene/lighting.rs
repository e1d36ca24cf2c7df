//! Orbiting point light
//!
//! The light sits far outside the sculpture and sweeps a Lissajous path, so
//! highlights drift slowly across the metal parts.

use glam::Vec3;

use super::graph::{MeshId, NodeId, SceneGraph};
use super::models::Animate;
use crate::renderer::vertex::materials;

/// Light position at `t_sec` on its Lissajous orbit
pub fn light_position_at_time(t_sec: f64) -> Vec3 {
    // Whole-number frequencies, so wrapping by full turns leaves the path unchanged
    let timer = ((t_sec * 0.15) % (std::f64::consts::TAU * 1.0e3)) as f32;
    Vec3::new(
        (timer * 7.0).sin() * 300.0,
        (timer * 5.0).cos() * 400.0,
        (timer * 3.0).cos() * 300.0,
    )
}

/// The light and its visible bulb
#[derive(Debug, Clone)]
pub struct Lighting {
    bulb: NodeId,
}

impl Lighting {
    pub fn new(graph: &mut SceneGraph, parent: NodeId, bulb_mesh: MeshId) -> Self {
        let bulb = graph.add_mesh(parent, bulb_mesh, materials::LIGHT_BULB);
        graph.set_position(bulb, light_position_at_time(0.0));
        Self { bulb }
    }

    pub fn bulb(&self) -> NodeId {
        self.bulb
    }

    /// Current light position (the bulb's position under its parent)
    pub fn position(&self, graph: &SceneGraph) -> Vec3 {
        graph.position(self.bulb)
    }
}

impl Animate for Lighting {
    fn animate(&self, graph: &mut SceneGraph, t_sec: f64) {
        graph.set_position(self.bulb, light_position_at_time(t_sec));
    }
}
