//! Kinetic Sculpture - A cam-driven mechanism of pulley wheels and hanging balls
//!
//! Core modules:
//! - `kinematics`: Pure motion law (cam angle, wheel radius, cam outline)
//! - `scene`: Node graph, animated entities and sculpture assembly
//! - `renderer`: WebGPU mesh/line pipelines and orbit camera
//! - `platform`: Frame clock and browser/native differences
//! - `app`: Application context driven once per frame

pub mod app;
pub mod error;
pub mod kinematics;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use app::{App, KeyCommand};
pub use error::{Result, SculptureError};
pub use kinematics::{angle_at_time, linspace, polar_to_cartesian, radius_at_time};
pub use settings::{QualityPreset, Settings, quality_from_query};

/// Sculpture configuration constants
pub mod consts {
    /// Mean wheel radius; the sinusoid swings ±1 around it
    pub const BASE_RADIUS: f32 = 1.5;
    /// Fixed gap between a wheel and the top of its ball's travel
    pub const STRING_CLEARANCE: f32 = 0.5;

    /// Default grid of balls
    pub const DEFAULT_ROWS: usize = 5;
    pub const DEFAULT_COLS: usize = 10;
    pub const DEFAULT_SPACING: f32 = 0.5;
    /// Height of the whole sculpture above the origin
    pub const DEFAULT_ELEVATION: f32 = 3.0;
    /// Points used to rasterize the cam outline
    pub const CAM_OUTLINE_SAMPLES: usize = 100;

    /// Limits applied to a stored layout
    pub const MAX_GRID_SIZE: usize = 64;
    pub const MIN_CAM_SAMPLES: usize = 3;
    pub const MAX_CAM_SAMPLES: usize = 1024;
    pub const MAX_SPACING: f32 = 10.0;
    pub const MAX_ELEVATION: f32 = 100.0;

    /// Part dimensions
    pub const BALL_RADIUS: f32 = 0.1;
    pub const WHEEL_RADIUS: f32 = 0.1;
    pub const WHEEL_THICKNESS: f32 = 0.25;
    pub const CAM_DEPTH: f32 = 0.25;
    pub const AXES_LENGTH: f32 = 8.0;

    /// Light bulb (far away, orbiting)
    pub const LIGHT_BULB_RADIUS: f32 = 4.0;

    /// Default tone mapping exposure
    pub const DEFAULT_EXPOSURE: f32 = 1.25;
}
