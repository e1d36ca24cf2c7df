//! Viewer settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_EXPOSURE;
use crate::scene::SculptureLayout;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ball tessellation (width, height segments)
    pub fn sphere_segments(&self) -> (u32, u32) {
        match self {
            QualityPreset::Low => (12, 6),
            QualityPreset::Medium => (20, 10),
            QualityPreset::High => (32, 16),
        }
    }

    /// Wheel tessellation (radial segments)
    pub fn wheel_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 20,
            QualityPreset::High => 32,
        }
    }
}

/// Quality preset named by a `quality=` pair in a URL query string
pub fn quality_from_query(query: &str) -> Option<QualityPreset> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "quality")
        .and_then(|(_, value)| QualityPreset::from_str(value))
}

/// Viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mesh quality preset
    pub quality: QualityPreset,

    // === Scene ===
    /// Axes helper on the cam
    pub show_axes: bool,
    /// Move the light along its orbit
    pub orbit_light: bool,
    /// Ball grid and cam tessellation (applied at startup)
    pub layout: SculptureLayout,

    // === Rendering ===
    /// Tone mapping exposure
    pub exposure: f32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,

            show_axes: true,
            orbit_light: true,
            layout: SculptureLayout::default(),

            exposure: DEFAULT_EXPOSURE,

            show_fps: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Exposure clamped to a usable range
    pub fn effective_exposure(&self) -> f32 {
        if self.exposure.is_finite() {
            self.exposure.clamp(0.05, 8.0)
        } else {
            DEFAULT_EXPOSURE
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "kinetic_sculpture_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
