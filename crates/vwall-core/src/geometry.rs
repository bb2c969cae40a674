#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Pixel-space rectangles and points for pane layout, hit testing, and the
//! zoom boundary policy. Unlike integer cell grids, pane geometry is
//! fractional: pinch-zoom produces sub-pixel rectangles that are only rounded
//! at the rendering boundary.

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: PointF) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An edge-addressed rectangle in pixel space.
///
/// Stored as edges rather than origin+size because the zoom clamp and the
/// drag translation both manipulate edges directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    /// Create a rectangle from its four edges.
    #[inline]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from origin and size.
    #[inline]
    pub const fn from_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Center point.
    #[inline]
    pub const fn center(&self) -> PointF {
        PointF::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Check if a point is strictly inside the rectangle.
    ///
    /// Edges are exclusive, matching the hit test used for swap targeting:
    /// a pane center sitting exactly on a shared border selects neither pane.
    #[inline]
    pub fn contains(&self, p: PointF) -> bool {
        p.x > self.left && p.x < self.right && p.y > self.top && p.y < self.bottom
    }

    /// Translate by a delta, preserving size.
    #[inline]
    #[must_use]
    pub const fn translated(&self, dx: f32, dy: f32) -> RectF {
        RectF {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Clamp a zoomed/panned rectangle so it keeps covering its original bounds.
///
/// The boundary policy for pinch-zoom: the virtual rect may grow outward, but
/// panning must never expose area outside the original footprint. Each axis is
/// clamped independently, preserving the virtual rect's size:
///
/// - a left edge right of the original's is pulled back to match;
/// - a right edge left of the original's shifts the rect so the right edges
///   coincide (overriding the left correction — for an undersized rect this
///   makes the result deterministic);
/// - top/bottom symmetrically.
///
/// For `virtual_rect` at least as large as `original` (scale ≥ 1) the result
/// satisfies `left ≤ original.left`, `right ≥ original.right`, and the same
/// vertically.
#[must_use]
pub fn clamp_cover(original: RectF, virtual_rect: RectF) -> RectF {
    let w = virtual_rect.width();
    let h = virtual_rect.height();

    let mut left = virtual_rect.left;
    let mut top = virtual_rect.top;

    if left > original.left {
        left = original.left;
    }
    let mut right = left + w;

    if top > original.top {
        top = original.top;
    }
    let mut bottom = top + h;

    if right < original.right {
        right = original.right;
        left = right - w;
    }

    if bottom < original.bottom {
        bottom = original.bottom;
        top = bottom - h;
    }

    RectF {
        left,
        top,
        right,
        bottom,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
