#![forbid(unsafe_code)]

//! Grid layout: serial → cell mapping and pixel rectangles.
//!
//! Pages are laid out side by side along x, each one container-width wide;
//! the paging scroll offset selects which page shows. A pane's
//! container-space rect therefore includes `screen × width` of horizontal
//! offset, and [`GridLayoutEngine::page_local`] strips it back off for
//! hit-testing against on-page coordinates.
//!
//! # Invariants
//!
//! 1. [`locate`] is a bijection between serials and (row, column, screen)
//!    triples for any fixed mode.
//! 2. Portrait pane height is `pane width × portrait_aspect`; the grid
//!    top-aligns and need not fill the container.
//! 3. Landscape fills the container height, minus the control-bar reserve
//!    when sizing for live view rather than preview.

use vwall_core::config::WallConfig;
use vwall_core::geometry::RectF;
use vwall_core::mode::{Orientation, WindowMode};

use crate::pane::PaneRegistry;

/// Map a serial to its (row, column, screen) cell for `mode`.
#[inline]
#[must_use]
pub fn locate(serial: usize, mode: WindowMode) -> (usize, usize, usize) {
    let per_screen = mode.panes_per_screen();
    let side = mode.side();
    let row = (serial % per_screen) / side;
    let column = serial % side;
    let screen = serial / per_screen;
    (row, column, screen)
}

/// Computes pane rectangles for a container size and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayoutEngine {
    width: f32,
    height: f32,
    orientation: Orientation,
}

impl GridLayoutEngine {
    /// Create an engine for a container of `width × height` pixels.
    #[must_use]
    pub const fn new(width: f32, height: f32, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
        }
    }

    #[inline]
    #[must_use]
    pub const fn container_width(&self) -> f32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Replace the container geometry.
    pub fn set_container(&mut self, width: f32, height: f32, orientation: Orientation) {
        self.width = width;
        self.height = height;
        self.orientation = orientation;
    }

    /// Width and height of one pane in `mode`.
    #[must_use]
    pub fn pane_size(&self, mode: WindowMode, config: &WallConfig) -> (f32, f32) {
        let side = mode.side() as f32;
        let w = self.width / side;
        let h = match self.orientation {
            Orientation::Portrait => w * config.portrait_aspect,
            Orientation::Landscape => {
                let reserved = if config.preview_sizing {
                    0.0
                } else {
                    config.control_bar_px
                };
                (self.height - reserved) / side
            }
        };
        (w, h)
    }

    /// Container-space rect of the cell at (row, column, screen).
    #[must_use]
    pub fn cell_rect(
        &self,
        row: usize,
        column: usize,
        screen: usize,
        mode: WindowMode,
        config: &WallConfig,
    ) -> RectF {
        let (w, h) = self.pane_size(mode, config);
        let left = screen as f32 * self.width + column as f32 * w;
        let top = row as f32 * h;
        RectF::new(left, top, left + w, top + h)
    }

    /// Strip the page offset: the rect as seen on its own page.
    #[inline]
    #[must_use]
    pub fn page_local(&self, rect: RectF, screen: usize) -> RectF {
        rect.translated(-(screen as f32) * self.width, 0.0)
    }

    /// Assign every visible pane its container-space rect.
    pub fn layout_pass(&self, registry: &mut PaneRegistry, mode: WindowMode, config: &WallConfig) {
        let (w, h) = self.pane_size(mode, config);
        for pane in registry.iter_mut() {
            if !pane.is_visible() {
                continue;
            }
            let left = pane.screen_index as f32 * self.width + pane.column as f32 * w;
            let top = pane.row as f32 * h;
            pane.rect = RectF::new(left, top, left + w, top + h);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
