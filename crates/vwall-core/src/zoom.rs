#![forbid(unsafe_code)]

//! Per-pane pinch zoom and pan.
//!
//! [`PinchZoomController`] owns a pane's digital zoom state: the fixed
//! viewport rectangle, a virtual content rectangle scaled and panned against
//! it, and the scale factor relating the two. Touch input drives three
//! phases — idle, one-finger pan, two-finger pinch — plus a double-tap
//! toggle between unit scale and the configured maximum.
//!
//! # Invariants
//!
//! 1. The virtual rectangle always covers the viewport: no edge of the
//!    viewport is ever exposed, at any scale or pan position
//!    ([`clamp_cover`]).
//! 2. The committed scale stays within `1.0..=max_zoom_scale`. Scale-change
//!    notifications report the raw pre-clamp value, so a host can observe a
//!    pinch-in below 1 and close the zoom surface in response.
//! 3. While the controller is inactive it never scales; a two-finger spread
//!    instead requests activation, at most once per touch session.
//!
//! # Usage
//!
//! The grid controller routes a pane's touch events here whenever the pane's
//! surface reports zoom capability. The returned [`ZoomEvent`]s are mapped
//! onto host callbacks; [`virtual_rect`](PinchZoomController::virtual_rect)
//! is what the renderer maps the pane's content into.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::WallConfig;
use crate::event::{TouchEvent, TouchPhase};
use crate::geometry::{PointF, RectF, clamp_cover};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Phase of the zoom touch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ZoomPhase {
    #[default]
    Idle,
    /// One finger down; translates the virtual rectangle when zoomed.
    Pan,
    /// Two fingers down; spread changes the scale.
    Pinch,
}

/// Output of the zoom controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomEvent {
    /// The scale changed. `raw` is pre-clamp and may dip below 1.0; `scale`
    /// is the committed, clamped value.
    ScaleChanged { raw: f32, scale: f32 },
    /// Two-finger spread while inactive: the host should open the zoom
    /// surface. Fired at most once per touch session.
    OpenRequested,
    /// A tap on the zoom surface (movement stayed within the click slop).
    Click { pos: PointF },
}

// ---------------------------------------------------------------------------
// PinchZoomController
// ---------------------------------------------------------------------------

/// Digital zoom state machine for a single pane.
#[derive(Debug)]
pub struct PinchZoomController {
    viewport: RectF,
    virtual_rect: RectF,
    scale: f32,
    max_scale: f32,
    unit_ratio: f32,
    click_slop: f32,
    double_tap_window: Duration,

    active: bool,
    phase: ZoomPhase,
    last_spacing: f32,
    start_spacing: f32,
    /// Pinch anchor and its relative position inside the virtual rect.
    anchor: PointF,
    anchor_ratio: PointF,
    down_pos: PointF,
    last_pos: PointF,
    pinched: bool,
    open_requested: bool,
    last_click: Option<Instant>,
}

impl PinchZoomController {
    /// Create a controller at unit scale over `viewport`.
    #[must_use]
    pub fn new(viewport: RectF, config: &WallConfig) -> Self {
        Self {
            viewport,
            virtual_rect: viewport,
            scale: 1.0,
            max_scale: config.max_zoom_scale,
            unit_ratio: config.unit_scale_ratio,
            click_slop: config.zoom_click_slop_px,
            double_tap_window: config.zoom_double_tap_window,
            active: false,
            phase: ZoomPhase::Idle,
            last_spacing: 0.0,
            start_spacing: 0.0,
            anchor: PointF::new(0.0, 0.0),
            anchor_ratio: PointF::new(0.5, 0.5),
            down_pos: PointF::new(0.0, 0.0),
            last_pos: PointF::new(0.0, 0.0),
            pinched: false,
            open_requested: false,
            last_click: None,
        }
    }

    /// Committed scale factor, in `1.0..=max_zoom_scale`.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The rectangle the pane's content is mapped into.
    #[inline]
    #[must_use]
    pub fn virtual_rect(&self) -> RectF {
        self.virtual_rect
    }

    /// The fixed viewport the content covers.
    #[inline]
    #[must_use]
    pub fn viewport(&self) -> RectF {
        self.viewport
    }

    /// Whether any zoom is applied.
    #[inline]
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }

    /// Whether pinch input scales (as opposed to requesting activation).
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable scaling. Disabling does not reset the zoom.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replace the viewport (pane resized or relaid out) and reset the zoom.
    pub fn set_viewport(&mut self, viewport: RectF) {
        self.viewport = viewport;
        self.clear();
    }

    /// Reset to unit scale with the content flush to the viewport.
    pub fn clear(&mut self) {
        self.scale = 1.0;
        self.virtual_rect = self.viewport;
        self.phase = ZoomPhase::Idle;
        self.pinched = false;
        self.last_click = None;
    }

    /// Process one touch event.
    pub fn process(&mut self, ev: &TouchEvent, now: Instant) -> Vec<ZoomEvent> {
        let mut out = Vec::new();
        match ev.phase {
            TouchPhase::Down => self.on_down(ev),
            TouchPhase::PointerDown => self.on_pointer_down(ev),
            TouchPhase::Move => self.on_move(ev, &mut out),
            TouchPhase::PointerUp => self.on_pointer_up(ev),
            TouchPhase::Up | TouchPhase::Cancel => self.on_up(ev, now, &mut out),
        }
        out
    }

    fn on_down(&mut self, ev: &TouchEvent) {
        let Some(p) = ev.primary() else { return };
        self.phase = ZoomPhase::Pan;
        self.down_pos = p.pos();
        self.last_pos = p.pos();
        self.pinched = false;
        self.open_requested = false;
    }

    fn on_pointer_down(&mut self, ev: &TouchEvent) {
        if ev.pointer_count() < 2 {
            return;
        }
        self.phase = ZoomPhase::Pinch;
        self.pinched = true;
        let spacing = ev.spacing();
        self.last_spacing = spacing;
        self.start_spacing = spacing;
        if let Some(mid) = ev.midpoint() {
            self.anchor = mid;
            let w = self.virtual_rect.width();
            let h = self.virtual_rect.height();
            self.anchor_ratio = PointF::new(
                if w > 0.0 { (mid.x - self.virtual_rect.left) / w } else { 0.5 },
                if h > 0.0 { (mid.y - self.virtual_rect.top) / h } else { 0.5 },
            );
        }
    }

    fn on_move(&mut self, ev: &TouchEvent, out: &mut Vec<ZoomEvent>) {
        match self.phase {
            ZoomPhase::Pinch if ev.pointer_count() >= 2 => {
                let spacing = ev.spacing();
                if !self.active {
                    // Inactive surface: a clear spread asks the host to open
                    // the zoom, once.
                    if !self.open_requested && spacing - self.start_spacing > self.click_slop {
                        self.open_requested = true;
                        out.push(ZoomEvent::OpenRequested);
                    }
                    self.last_spacing = spacing;
                    return;
                }
                let raw = self.scale + (spacing - self.last_spacing) * self.unit_ratio;
                self.last_spacing = spacing;
                self.apply_scale(raw, self.anchor, self.anchor_ratio, out);
            }
            ZoomPhase::Pan => {
                let Some(p) = ev.primary() else { return };
                let dx = p.x - self.last_pos.x;
                let dy = p.y - self.last_pos.y;
                self.last_pos = p.pos();
                if self.active && self.is_zoomed() {
                    self.virtual_rect =
                        clamp_cover(self.viewport, self.virtual_rect.translated(dx, dy));
                }
            }
            _ => {}
        }
    }

    fn on_pointer_up(&mut self, ev: &TouchEvent) {
        // Back to pan with whichever pointer remains.
        if self.phase == ZoomPhase::Pinch && ev.pointer_count() <= 2 {
            self.phase = ZoomPhase::Pan;
            if let Some(p) = ev.primary() {
                self.last_pos = p.pos();
            }
        }
    }

    fn on_up(&mut self, ev: &TouchEvent, now: Instant, out: &mut Vec<ZoomEvent>) {
        let pos = ev.primary().map_or(self.last_pos, |p| p.pos());
        let was_click = !self.pinched && self.down_pos.distance(pos) <= self.click_slop;
        self.phase = ZoomPhase::Idle;
        if !was_click {
            self.last_click = None;
            return;
        }

        if self.active
            && let Some(prev) = self.last_click
            && now.duration_since(prev) <= self.double_tap_window
        {
            self.last_click = None;
            self.toggle(pos, out);
        } else {
            self.last_click = Some(now);
            out.push(ZoomEvent::Click { pos });
        }
    }

    /// Double-tap toggle: zoomed panes snap back to unit scale, unzoomed
    /// panes jump to the maximum, anchored at the tap.
    fn toggle(&mut self, pos: PointF, out: &mut Vec<ZoomEvent>) {
        if self.is_zoomed() {
            debug!(scale = self.scale, "double-tap zoom reset");
            self.scale = 1.0;
            self.virtual_rect = self.viewport;
            out.push(ZoomEvent::ScaleChanged { raw: 1.0, scale: 1.0 });
        } else {
            let ratio = PointF::new(
                if self.viewport.width() > 0.0 {
                    (pos.x - self.viewport.left) / self.viewport.width()
                } else {
                    0.5
                },
                if self.viewport.height() > 0.0 {
                    (pos.y - self.viewport.top) / self.viewport.height()
                } else {
                    0.5
                },
            );
            self.apply_scale(self.max_scale, pos, ratio, out);
        }
    }

    /// Commit `raw` (clamped) and rebuild the virtual rect so `anchor` keeps
    /// its relative position `ratio` inside it. Notification carries the raw
    /// value before clamping.
    fn apply_scale(
        &mut self,
        raw: f32,
        anchor: PointF,
        ratio: PointF,
        out: &mut Vec<ZoomEvent>,
    ) {
        let clamped = raw.clamp(1.0, self.max_scale);
        out.push(ZoomEvent::ScaleChanged { raw, scale: clamped });
        self.scale = clamped;
        let w = self.viewport.width() * clamped;
        let h = self.viewport.height() * clamped;
        let left = anchor.x - ratio.x * w;
        let top = anchor.y - ratio.y * h;
        self.virtual_rect =
            clamp_cover(self.viewport, RectF::new(left, top, left + w, top + h));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
