//! Platform abstraction layer
//!
//! Frame timing shared by the browser loop and native runs. Timestamps come
//! from the host (`requestAnimationFrame` on the web) in milliseconds.

/// Frames kept for the FPS estimate
const FPS_WINDOW: usize = 60;

/// Converts host timestamps into elapsed seconds and tracks FPS
#[derive(Debug, Clone)]
pub struct FrameClock {
    start_ms: Option<f64>,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    frames_seen: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start_ms: None,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            frames_seen: 0,
            fps: 0,
        }
    }

    /// Record a frame at `now_ms`; returns seconds since the first frame
    ///
    /// A non-finite timestamp is passed through as a non-finite elapsed time
    /// and never becomes the clock's origin.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return now_ms;
        }

        let start = *self.start_ms.get_or_insert(now_ms);

        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        self.frames_seen += 1;

        // Oldest sample is the slot we will overwrite next
        if self.frames_seen >= FPS_WINDOW {
            let oldest = self.frame_times[self.frame_index];
            let span = now_ms - oldest;
            if span > 0.0 {
                self.fps = ((FPS_WINDOW - 1) as f64 * 1000.0 / span).round() as u32;
            }
        }

        (now_ms - start) / 1000.0
    }

    /// Frames per second over the last 60 frames (0 until the window fills)
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn has_started(&self) -> bool {
        self.start_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_time_zero() {
        let mut clock = FrameClock::new();
        assert!(!clock.has_started());
        assert_eq!(clock.tick(12_345.0), 0.0);
        assert!(clock.has_started());
        assert_eq!(clock.tick(14_345.0), 2.0);
    }

    #[test]
    fn test_fps_after_full_window() {
        let mut clock = FrameClock::new();
        let frame_ms = 1000.0 / 60.0;
        for i in 0..59 {
            clock.tick(1000.0 + i as f64 * frame_ms);
        }
        assert_eq!(clock.fps(), 0);
        clock.tick(1000.0 + 59.0 * frame_ms);
        assert_eq!(clock.fps(), 60);

        // Slow down to 30 fps for a full window
        let mut t = 1000.0 + 59.0 * frame_ms;
        for _ in 0..60 {
            t += 1000.0 / 30.0;
            clock.tick(t);
        }
        assert_eq!(clock.fps(), 30);
    }

    #[test]
    fn test_non_finite_timestamp_does_not_set_origin() {
        let mut clock = FrameClock::new();
        assert!(clock.tick(f64::NAN).is_nan());
        assert!(!clock.has_started());
        assert_eq!(clock.tick(500.0), 0.0);
        assert!(clock.tick(f64::INFINITY).is_infinite());
        assert_eq!(clock.tick(1500.0), 1.0);
    }
}
