#![forbid(unsafe_code)]

//! Split-mode and orientation enums.

use serde::{Deserialize, Serialize};

/// Grid split configuration: how many panes fit on one screen.
///
/// The discriminant is the side length of the square grid, so `Four` is a
/// 2×2 split holding four panes per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// 1×1 — a single full-screen pane.
    One,
    /// 2×2 — four panes per screen.
    Four,
    /// 3×3 — nine panes per screen.
    Nine,
    /// 4×4 — sixteen panes per screen.
    Sixteen,
}

impl WindowMode {
    /// Side length of the grid (1–4).
    #[inline]
    #[must_use]
    pub const fn side(self) -> usize {
        match self {
            Self::One => 1,
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
        }
    }

    /// Panes on one screen (`side²`).
    #[inline]
    #[must_use]
    pub const fn panes_per_screen(self) -> usize {
        self.side() * self.side()
    }

    /// Screens needed to show `pane_count` panes (ceiling division).
    #[inline]
    #[must_use]
    pub const fn screens_for(self, pane_count: usize) -> usize {
        pane_count.div_ceil(self.panes_per_screen())
    }
}

/// Container orientation; affects how pane rectangles are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}
