//! Error types for the sculpture and its renderer

use thiserror::Error;

/// Errors raised while building, animating or rendering the sculpture
#[derive(Error, Debug)]
pub enum SculptureError {
    /// A sampled sequence was asked for zero points
    #[error("Sample count must be at least 1")]
    EmptySampleCount,

    /// The frame clock produced NaN or an infinite time
    #[error("Non-finite frame time: {0}")]
    NonFiniteTime(f64),

    /// No GPU device could be created from the adapter
    #[error("Failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// No usable GPU adapter for the canvas surface
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The surface reports no texture formats
    #[error("Surface has no supported formats")]
    UnsupportedSurface,
}

/// Result type for sculpture operations
pub type Result<T> = std::result::Result<T, SculptureError>;
