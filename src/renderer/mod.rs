//! WebGPU rendering module
//!
//! Procedural meshes are drawn instanced with a single lit shader; strings and
//! axes go through a separate line pipeline.

pub mod camera;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use camera::{Frustum, OrbitCamera};
pub use pipeline::{FrameData, FrameParams, MeshRenderer};
