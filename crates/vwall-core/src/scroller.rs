#![forbid(unsafe_code)]

//! Time-driven scroll offset animator.
//!
//! [`Scroller`] interpolates a one-dimensional offset over a fixed duration.
//! Nothing here blocks: the host's frame ticker calls
//! [`offset_at`](Scroller::offset_at) each frame and redraws with the result.
//! A zero-duration start snaps immediately, which is how non-animated page
//! jumps are expressed.
//!
//! # Invariants
//!
//! 1. `offset_at(now)` is monotonic toward the target for `now` within the
//!    animation window and equals `final_offset()` at or after the deadline.
//! 2. `abort()` freezes the offset at the final value — an aborted scroll
//!    lands on its target rather than mid-flight.
//! 3. Restarting replaces any in-flight animation.

use std::time::{Duration, Instant};

/// Ease-out interpolation: fast start, decelerating finish.
#[inline]
fn ease_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Animates a scroll offset between two values over a duration.
#[derive(Debug, Clone)]
pub struct Scroller {
    start_offset: f32,
    delta: f32,
    start_time: Instant,
    duration: Duration,
    finished: bool,
}

impl Scroller {
    /// Create an idle scroller resting at `offset`.
    #[must_use]
    pub fn new(offset: f32, now: Instant) -> Self {
        Self {
            start_offset: offset,
            delta: 0.0,
            start_time: now,
            duration: Duration::ZERO,
            finished: true,
        }
    }

    /// Begin scrolling from `from` by `delta` over `duration`.
    ///
    /// A zero `duration` completes immediately.
    pub fn start(&mut self, from: f32, delta: f32, duration: Duration, now: Instant) {
        self.start_offset = from;
        self.delta = delta;
        self.start_time = now;
        self.duration = duration;
        self.finished = duration.is_zero();
    }

    /// Stop the animation, jumping to the final offset.
    pub fn abort(&mut self) {
        self.finished = true;
    }

    /// The offset the animation is heading toward.
    #[inline]
    #[must_use]
    pub fn final_offset(&self) -> f32 {
        self.start_offset + self.delta
    }

    /// Whether the animation has completed (or was aborted) as of `now`.
    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        self.finished || now.duration_since(self.start_time) >= self.duration
    }

    /// Current interpolated offset.
    #[must_use]
    pub fn offset_at(&self, now: Instant) -> f32 {
        if self.is_finished(now) {
            return self.final_offset();
        }
        let elapsed = now.duration_since(self.start_time).as_secs_f32();
        let t = elapsed / self.duration.as_secs_f32();
        self.start_offset + self.delta * ease_out(t)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
