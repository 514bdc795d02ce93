//! Waveform interaction configuration

use serde::{Deserialize, Serialize};

/// Marker hit-testing and zoom limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// A press closer than this (pixels) to a marker grabs the marker
    #[serde(default = "default_marker_tolerance_px")]
    pub marker_tolerance_px: u32,

    /// Factor applied by one zoom step
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

fn default_marker_tolerance_px() -> u32 {
    14
}

fn default_zoom_step() -> f64 {
    1.5
}

fn default_min_zoom() -> f64 {
    1.0
}

fn default_max_zoom() -> f64 {
    64.0
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            marker_tolerance_px: default_marker_tolerance_px(),
            zoom_step: default_zoom_step(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl WaveformConfig {
    /// Clamp a zoom factor into `[min_zoom, max_zoom]`
    ///
    /// A misconfigured range (min above max, or below 1) falls back to the
    /// defaults instead of panicking in `clamp`.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let (min, max) = if self.min_zoom >= 1.0 && self.min_zoom <= self.max_zoom {
            (self.min_zoom, self.max_zoom)
        } else {
            (default_min_zoom(), default_max_zoom())
        };
        if zoom.is_nan() {
            min
        } else {
            zoom.clamp(min, max)
        }
    }

    /// Zoom step, never below 1.0
    pub fn step(&self) -> f64 {
        if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
            self.zoom_step
        } else {
            default_zoom_step()
        }
    }
}
