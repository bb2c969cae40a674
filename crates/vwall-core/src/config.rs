#![forbid(unsafe_code)]

//! Wall configuration.
//!
//! [`WallConfig`] is built once at grid creation and passed by reference to
//! every controller — there are no process-wide mutable defaults. Durations
//! and thresholds default to the values the gesture tuning was shipped with;
//! lengths given in device-independent pixels are converted through
//! [`Metrics`] at classification time.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mode::WindowMode;

/// Host display metrics for dip → pixel conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Pixels per device-independent pixel.
    pub density: f32,
}

impl Metrics {
    /// Create metrics from a density factor.
    #[must_use]
    pub const fn new(density: f32) -> Self {
        Self { density }
    }

    /// Convert a device-independent length to pixels.
    #[inline]
    #[must_use]
    pub fn dip_to_px(&self, dip: f32) -> f32 {
        dip * self.density
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self { density: 1.0 }
    }
}

/// Configuration for the wall: split mode, pane counts, gesture thresholds,
/// zoom limits, and animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Split mode the grid starts in.
    pub default_mode: WindowMode,
    /// Total allocated panes.
    pub max_pane_count: usize,
    /// Hard ceiling on `max_pane_count`, including later growth.
    pub hard_pane_ceiling: usize,
    /// Horizontal edge proximity (px) that triggers a page flip during drag.
    pub edge_slop_px: f32,
    /// Top edge proximity (px) for the delete/drop affordance.
    pub delete_edge_slop_px: f32,
    /// Total horizontal swipe displacement (px) needed to switch pages.
    pub page_switch_threshold_px: f32,
    /// Movement threshold (dip) before a touch counts as a drag.
    pub touch_slop_dip: f32,
    /// Movement tolerance (px) for the zoom surface's tap detection.
    pub zoom_click_slop_px: f32,
    /// Hold duration promoting a stationary touch to a drag.
    pub long_press: Duration,
    /// Second-tap window for pane double-tap (mode switch).
    pub double_tap_window: Duration,
    /// Second-tap window for the zoom surface's double-tap toggle.
    pub zoom_double_tap_window: Duration,
    /// Minimum spacing between edge-triggered page flips during a drag.
    pub edge_debounce: Duration,
    /// Upper zoom bound; double-tap toggles between 1 and this.
    pub max_zoom_scale: f32,
    /// Scale gained per pixel of pinch spread.
    pub unit_scale_ratio: f32,
    /// Duration of an animated page scroll.
    pub scroll_duration: Duration,
    /// Scale factor applied to a pane while it is dragged.
    pub drag_scale: f32,
    /// Alpha applied to a pane while it is dragged.
    pub drag_alpha: f32,
    /// Duration of the drag enlarge/shrink animation.
    pub drag_anim: Duration,
    /// Preview sizing: landscape panes use the full height. When false
    /// ("live" sizing) a control bar strip is reserved.
    pub preview_sizing: bool,
    /// Portrait pane height as a fraction of pane width.
    pub portrait_aspect: f32,
    /// Height (px) reserved for the control bar in live landscape mode.
    pub control_bar_px: f32,
    /// Host display metrics.
    pub metrics: Metrics,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            default_mode: WindowMode::Four,
            max_pane_count: 16,
            hard_pane_ceiling: 16,
            edge_slop_px: 20.0,
            delete_edge_slop_px: 20.0,
            page_switch_threshold_px: 100.0,
            touch_slop_dip: 40.0,
            zoom_click_slop_px: 30.0,
            long_press: Duration::from_millis(300),
            double_tap_window: Duration::from_millis(200),
            zoom_double_tap_window: Duration::from_millis(300),
            edge_debounce: Duration::from_millis(300),
            max_zoom_scale: 10.0,
            unit_scale_ratio: 0.003,
            scroll_duration: Duration::from_millis(800),
            drag_scale: 1.08,
            drag_alpha: 0.8,
            drag_anim: Duration::from_millis(150),
            preview_sizing: true,
            portrait_aspect: 0.667,
            control_bar_px: 50.0,
            metrics: Metrics::default(),
        }
    }
}

impl WallConfig {
    /// Touch slop in pixels.
    #[inline]
    #[must_use]
    pub fn touch_slop_px(&self) -> f32 {
        self.metrics.dip_to_px(self.touch_slop_dip)
    }

    /// Horizontal slop for swipe promotion — half the drag slop, matching the
    /// lower threshold page swipes have always used.
    #[inline]
    #[must_use]
    pub fn swipe_slop_px(&self) -> f32 {
        self.metrics.dip_to_px(self.touch_slop_dip / 2.0)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pane_count == 0 {
            return Err(ConfigError::ZeroPaneCount);
        }
        if self.max_pane_count > self.hard_pane_ceiling {
            return Err(ConfigError::PaneCountAboveCeiling {
                count: self.max_pane_count,
                ceiling: self.hard_pane_ceiling,
            });
        }
        if self.max_zoom_scale < 1.0 {
            return Err(ConfigError::InvalidMaxZoom {
                scale: self.max_zoom_scale,
            });
        }
        if self.metrics.density <= 0.0 {
            return Err(ConfigError::InvalidDensity {
                density: self.metrics.density,
            });
        }
        Ok(())
    }
}

/// Configuration validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroPaneCount,
    PaneCountAboveCeiling { count: usize, ceiling: usize },
    InvalidMaxZoom { scale: f32 },
    InvalidDensity { density: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPaneCount => write!(f, "max pane count must be at least 1"),
            Self::PaneCountAboveCeiling { count, ceiling } => {
                write!(f, "max pane count {count} exceeds hard ceiling {ceiling}")
            }
            Self::InvalidMaxZoom { scale } => {
                write!(f, "max zoom scale {scale} must be at least 1")
            }
            Self::InvalidDensity { density } => {
                write!(f, "display density {density} must be positive")
            }
        }
    }
}

impl Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
