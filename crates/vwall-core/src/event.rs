#![forbid(unsafe_code)]

//! Canonical touch-event types.
//!
//! A [`TouchEvent`] is the normalized form of one platform pointer event:
//! phase, all active pointers, and timestamps. Hosts translate their native
//! events (Android `MotionEvent`, winit `Touch`, test scripts) into this
//! shape; everything downstream — the gesture classifier, the zoom
//! controller, the grid controller — consumes only this type.
//!
//! # Invariants
//!
//! 1. `points` holds every active pointer, primary first.
//! 2. Multi-finger helpers (`spacing`, `midpoint`) clamp to the first two
//!    pointers; a third finger never changes their result.
//! 3. A `Cancel` is handled identically to `Up` by all consumers.

use std::time::Instant;

use crate::geometry::PointF;

/// Phase of a touch event, mirroring the platform action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Primary pointer went down; starts a gesture session.
    Down,
    /// Any pointer moved.
    Move,
    /// Primary (last) pointer went up; ends the session.
    Up,
    /// Session aborted by the platform. Treated exactly like `Up`.
    Cancel,
    /// A secondary pointer went down.
    PointerDown,
    /// A secondary pointer went up.
    PointerUp,
}

impl TouchPhase {
    /// Whether this phase terminates the gesture session.
    #[inline]
    #[must_use]
    pub const fn ends_session(self) -> bool {
        matches!(self, Self::Up | Self::Cancel)
    }
}

/// One active pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform pointer id, stable for the pointer's lifetime.
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    /// Create a new touch point.
    #[inline]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    /// Position as a point.
    #[inline]
    pub const fn pos(&self) -> PointF {
        PointF::new(self.x, self.y)
    }
}

/// A normalized touch event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Active pointers, primary first. Never empty for `Down`/`Move`.
    pub points: Vec<TouchPoint>,
    /// When the current session's primary pointer went down.
    pub down_time: Instant,
    /// When this event occurred.
    pub time: Instant,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, points: Vec<TouchPoint>, down_time: Instant, time: Instant) -> Self {
        Self {
            phase,
            points,
            down_time,
            time,
        }
    }

    /// Number of active pointers.
    #[inline]
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.points.len()
    }

    /// The primary pointer, if any pointer is down.
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<TouchPoint> {
        self.points.first().copied()
    }

    /// Find a pointer by id.
    #[must_use]
    pub fn pointer(&self, id: u32) -> Option<TouchPoint> {
        self.points.iter().copied().find(|p| p.id == id)
    }

    /// Distance between the first two pointers, or 0.0 with fewer than two.
    ///
    /// Extra pointers beyond the second are ignored.
    #[must_use]
    pub fn spacing(&self) -> f32 {
        match (self.points.first(), self.points.get(1)) {
            (Some(a), Some(b)) => a.pos().distance(b.pos()),
            _ => 0.0,
        }
    }

    /// Midpoint of the first two pointers, or the primary's position.
    #[must_use]
    pub fn midpoint(&self) -> Option<PointF> {
        match (self.points.first(), self.points.get(1)) {
            (Some(a), Some(b)) => Some(PointF::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)),
            (Some(a), None) => Some(a.pos()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
