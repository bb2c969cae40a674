#![forbid(unsafe_code)]

//! Gesture classification: transforms raw touch events into semantic events.
//!
//! [`GestureClassifier`] is a stateful processor that disambiguates the
//! competing interpretations of a single-pointer touch session — tap,
//! double-tap, long-press drag, page swipe — and reports the winner as
//! [`GestureEvent`]s for the grid controller to act on.
//!
//! # State Machine
//!
//! Each session (pointer down → up/cancel) carries exactly one [`TouchMode`]:
//!
//! - **Normal**: undecided; ends in a tap if released within slop.
//! - **LongPressDrag**: promoted when movement exceeds slop with a dominant
//!   vertical component, or when the pointer is held past the long-press
//!   duration without moving. Promotion happens at most once per session.
//! - **Swipe**: promoted when horizontal movement exceeds the (smaller)
//!   swipe slop before any long-press promotion.
//! - **DoubleTap**: entered when a second tap lands on the same target within
//!   the double-tap window; held until release.
//!
//! # Invariants
//!
//! 1. At most one promotion per session; `LongPressStart` is emitted exactly
//!    once for a drag session.
//! 2. Tap and DoubleTap never both fire for the same pair of touches: the
//!    pending single tap is cancelled when its session becomes a double-tap.
//! 3. A lone tap commits only after the double-tap window elapses
//!    ([`poll`](GestureClassifier::poll)) — single-tap reporting is delayed
//!    by the window duration.
//! 4. `Cancel` is processed identically to `Up`; the mode always returns to
//!    `Normal` when the session ends.
//! 5. Deferred tap commits are tagged with the session generation; a commit
//!    whose generation has been superseded is discarded, never fired late.
//!
//! # Failure Modes
//!
//! - Events with two or more pointers produce no promotions and no moves;
//!   multi-touch is the pinch-zoom controller's business.
//! - Events without pointers (degenerate input) are no-ops.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::WallConfig;
use crate::event::{TouchEvent, TouchPhase};
use crate::geometry::PointF;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Interpretation of the current touch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchMode {
    /// No committed interpretation.
    #[default]
    Normal,
    /// Long-press drag: the pane follows the finger for reordering.
    LongPressDrag,
    /// Horizontal page swipe.
    Swipe,
    /// Second tap of a double-tap; consumed until release.
    DoubleTap,
}

/// Semantic gesture output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// The session was promoted to a long-press drag.
    LongPressStart { pos: PointF },
    /// Incremental drag movement while in [`TouchMode::LongPressDrag`].
    DragMove { dx: f32, dy: f32, pos: PointF },
    /// The drag session ended (pointer up or cancel).
    DragEnd { pos: PointF },
    /// Incremental swipe movement, in scroll-offset terms: positive when the
    /// finger moves left (content scrolls toward higher pages).
    SwipeMove { scroll_dx: f32 },
    /// The swipe ended; `total_dx` is the finger displacement since down
    /// (positive = rightward, i.e. toward the previous page).
    SwipeEnd { total_dx: f32 },
    /// A committed single tap (the double-tap window elapsed).
    Tap { target: u32, pos: PointF },
    /// Two taps on the same target within the double-tap window.
    DoubleTap { target: u32, pos: PointF },
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    target: u32,
    pos: PointF,
    deadline: Instant,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    target: u32,
    down_pos: PointF,
    /// Last observed primary position; drag deltas are incremental.
    last_pos: PointF,
    /// Anchor for swipe total displacement.
    down_x: f32,
}

// ---------------------------------------------------------------------------
// GestureClassifier
// ---------------------------------------------------------------------------

/// Stateful single-pointer gesture disambiguator.
///
/// Feed every touch event through [`process`](Self::process) along with the
/// opaque id of the interactive target under the pointer (pane serial, in the
/// grid's case); call [`poll`](Self::poll) from the frame ticker so delayed
/// single taps commit once their double-tap window closes.
#[derive(Debug)]
pub struct GestureClassifier {
    touch_slop: f32,
    swipe_slop: f32,
    long_press: Duration,
    double_tap_window: Duration,

    mode: TouchMode,
    session: Option<Session>,
    generation: u64,
    pending_tap: Option<PendingTap>,
    /// Target and release time of the most recent tap, for pairing.
    last_tap: Option<(u32, Instant)>,
}

impl GestureClassifier {
    /// Create a classifier with thresholds resolved from `config`.
    #[must_use]
    pub fn new(config: &WallConfig) -> Self {
        Self {
            touch_slop: config.touch_slop_px(),
            swipe_slop: config.swipe_slop_px(),
            long_press: config.long_press,
            double_tap_window: config.double_tap_window,
            mode: TouchMode::Normal,
            session: None,
            generation: 0,
            pending_tap: None,
            last_tap: None,
        }
    }

    /// Current touch mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> TouchMode {
        self.mode
    }

    /// Whether a pointer is currently down.
    #[inline]
    #[must_use]
    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }

    /// Monotonic session counter; advances on every pointer down.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Process one touch event against the target under the pointer.
    ///
    /// `target` identifies the interactive element hit by the primary pointer
    /// at this event; it drives tap/double-tap pairing only.
    pub fn process(&mut self, ev: &TouchEvent, target: u32, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::with_capacity(2);
        match ev.phase {
            TouchPhase::Down => self.on_down(ev, target, now, &mut out),
            TouchPhase::Move => self.on_move(ev, now, &mut out),
            TouchPhase::Up | TouchPhase::Cancel => self.on_up(ev, &mut out),
            // Secondary pointers change the pointer count, which `on_move`
            // reads from the event itself.
            TouchPhase::PointerDown | TouchPhase::PointerUp => {}
        }
        out
    }

    /// Commit a pending single tap whose double-tap window has elapsed.
    ///
    /// Call from the frame ticker. Stale commits from a superseded session
    /// generation are dropped silently.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        let pending = self.pending_tap?;
        if now < pending.deadline {
            return None;
        }
        self.pending_tap = None;
        if pending.generation != self.generation {
            trace!(generation = pending.generation, "discarding stale tap");
            return None;
        }
        Some(GestureEvent::Tap {
            target: pending.target,
            pos: pending.pos,
        })
    }

    /// Drop all session and tap state. The next event starts fresh.
    pub fn reset(&mut self) {
        self.mode = TouchMode::Normal;
        self.session = None;
        self.pending_tap = None;
        self.last_tap = None;
    }

    fn on_down(&mut self, ev: &TouchEvent, target: u32, now: Instant, out: &mut Vec<GestureEvent>) {
        let Some(primary) = ev.primary() else {
            return;
        };
        self.generation = self.generation.wrapping_add(1);
        self.mode = TouchMode::Normal;
        self.session = Some(Session {
            target,
            down_pos: primary.pos(),
            last_pos: primary.pos(),
            down_x: primary.x,
        });

        // Second tap on the same target within the window: double-tap,
        // consuming the pending single tap.
        let paired = self
            .last_tap
            .is_some_and(|(t, at)| t == target && now.duration_since(at) <= self.double_tap_window);
        if paired {
            self.pending_tap = None;
            self.last_tap = None;
            self.mode = TouchMode::DoubleTap;
            out.push(GestureEvent::DoubleTap {
                target,
                pos: primary.pos(),
            });
        } else {
            // Any unrelated pending tap belongs to a superseded generation
            // now; poll() will discard it.
            self.last_tap = None;
        }
    }

    fn on_move(&mut self, ev: &TouchEvent, now: Instant, out: &mut Vec<GestureEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(primary) = ev.primary() else {
            return;
        };
        let multi_touch = ev.pointer_count() >= 2;
        let pos = primary.pos();

        match self.mode {
            TouchMode::Normal if !multi_touch => {
                let total_dx = pos.x - session.down_pos.x;
                let total_dy = pos.y - session.down_pos.y;
                let beyond_slop =
                    total_dx.abs() > self.touch_slop || total_dy.abs() > self.touch_slop;
                let vertical_dominant = total_dx.abs() < total_dy.abs();
                let held_long = now.duration_since(ev.down_time) >= self.long_press;

                if (beyond_slop && vertical_dominant) || (!beyond_slop && held_long) {
                    self.mode = TouchMode::LongPressDrag;
                    session.last_pos = pos;
                    trace!(?pos, "promoted to long-press drag");
                    out.push(GestureEvent::LongPressStart { pos });
                } else if total_dx.abs() > self.swipe_slop {
                    self.mode = TouchMode::Swipe;
                    session.last_pos = pos;
                    out.push(GestureEvent::SwipeMove {
                        scroll_dx: session.down_pos.x - pos.x,
                    });
                }
            }
            TouchMode::LongPressDrag => {
                let dx = pos.x - session.last_pos.x;
                let dy = pos.y - session.last_pos.y;
                session.last_pos = pos;
                out.push(GestureEvent::DragMove { dx, dy, pos });
            }
            TouchMode::Swipe if !multi_touch => {
                let scroll_dx = session.last_pos.x - pos.x;
                session.last_pos = pos;
                out.push(GestureEvent::SwipeMove { scroll_dx });
            }
            _ => {}
        }
    }

    fn on_up(&mut self, ev: &TouchEvent, out: &mut Vec<GestureEvent>) {
        let Some(session) = self.session.take() else {
            self.mode = TouchMode::Normal;
            return;
        };
        let pos = ev.primary().map_or(session.last_pos, |p| p.pos());

        match self.mode {
            TouchMode::LongPressDrag => {
                out.push(GestureEvent::DragEnd { pos });
            }
            TouchMode::Swipe => {
                out.push(GestureEvent::SwipeEnd {
                    total_dx: pos.x - session.down_x,
                });
            }
            TouchMode::DoubleTap => {}
            TouchMode::Normal => {
                let dx = pos.x - session.down_pos.x;
                let dy = pos.y - session.down_pos.y;
                let within_slop = dx.abs() <= self.touch_slop && dy.abs() <= self.touch_slop;
                if within_slop && ev.pointer_count() <= 1 {
                    self.pending_tap = Some(PendingTap {
                        target: session.target,
                        pos,
                        deadline: ev.time + self.double_tap_window,
                        generation: self.generation,
                    });
                    self.last_tap = Some((session.target, ev.time));
                }
            }
        }
        self.mode = TouchMode::Normal;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TouchPoint;

    const MS_50: Duration = Duration::from_millis(50);
    const MS_100: Duration = Duration::from_millis(100);
    const MS_250: Duration = Duration::from_millis(250);
    const MS_350: Duration = Duration::from_millis(350);

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(&WallConfig::default())
    }

    fn touch(phase: TouchPhase, x: f32, y: f32, down: Instant, at: Instant) -> TouchEvent {
        TouchEvent::new(phase, vec![TouchPoint::new(0, x, y)], down, at)
    }

    fn two_finger_move(x: f32, y: f32, down: Instant, at: Instant) -> TouchEvent {
        TouchEvent::new(
            TouchPhase::Move,
            vec![TouchPoint::new(0, x, y), TouchPoint::new(1, x + 60.0, y)],
            down,
            at,
        )
    }

    #[test]
    fn lone_tap_commits_after_window() {
        let mut gc = classifier();
        let t = Instant::now();

        assert!(
            gc.process(&touch(TouchPhase::Down, 50.0, 50.0, t, t), 3, t)
                .is_empty()
        );
        assert!(
            gc.process(&touch(TouchPhase::Up, 52.0, 51.0, t, t + MS_50), 3, t + MS_50)
                .is_empty()
        );

        // Window still open: nothing yet.
        assert_eq!(gc.poll(t + MS_100), None);
        // Window elapsed: tap commits.
        assert!(matches!(
            gc.poll(t + MS_350),
            Some(GestureEvent::Tap { target: 3, .. })
        ));
        assert_eq!(gc.poll(t + MS_350), None);
    }

    #[test]
    fn double_tap_fires_on_second_down() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 50.0, 50.0, t, t), 7, t);
        gc.process(&touch(TouchPhase::Up, 50.0, 50.0, t, t + MS_50), 7, t + MS_50);

        let down2 = t + MS_100;
        let events = gc.process(&touch(TouchPhase::Down, 51.0, 50.0, down2, down2), 7, down2);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::DoubleTap { target: 7, .. }]
        ));
        assert_eq!(gc.mode(), TouchMode::DoubleTap);

        // The pending single tap was consumed.
        assert_eq!(gc.poll(t + MS_350), None);

        // Release resets the mode.
        gc.process(&touch(TouchPhase::Up, 51.0, 50.0, down2, down2 + MS_50), 7, down2 + MS_50);
        assert_eq!(gc.mode(), TouchMode::Normal);
    }

    #[test]
    fn taps_on_different_targets_do_not_pair() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 50.0, 50.0, t, t), 1, t);
        gc.process(&touch(TouchPhase::Up, 50.0, 50.0, t, t + MS_50), 1, t + MS_50);

        let down2 = t + MS_100;
        let events = gc.process(&touch(TouchPhase::Down, 200.0, 50.0, down2, down2), 2, down2);
        assert!(events.is_empty());

        // First tap's deferred commit is stale (generation advanced).
        gc.process(&touch(TouchPhase::Up, 200.0, 50.0, down2, down2 + MS_50), 2, down2 + MS_50);
        let committed: Vec<_> = [gc.poll(down2 + MS_350), gc.poll(down2 + MS_350 + MS_50)]
            .into_iter()
            .flatten()
            .collect();
        assert!(matches!(
            committed.as_slice(),
            [GestureEvent::Tap { target: 2, .. }]
        ));
    }

    #[test]
    fn vertical_move_promotes_to_drag_once() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 100.0, 100.0, t, t), 0, t);
        let events = gc.process(&touch(TouchPhase::Move, 105.0, 160.0, t, t + MS_50), 0, t + MS_50);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::LongPressStart { .. }]
        ));
        assert_eq!(gc.mode(), TouchMode::LongPressDrag);

        // Subsequent moves are incremental drags, no second promotion.
        let events = gc.process(&touch(TouchPhase::Move, 110.0, 170.0, t, t + MS_100), 0, t + MS_100);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::DragMove { dx, dy, .. }] if *dx == 5.0 && *dy == 10.0
        ));

        let events = gc.process(&touch(TouchPhase::Up, 110.0, 170.0, t, t + MS_250), 0, t + MS_250);
        assert!(matches!(events.as_slice(), [GestureEvent::DragEnd { .. }]));
        assert_eq!(gc.mode(), TouchMode::Normal);
    }

    #[test]
    fn stationary_hold_promotes_after_long_press() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 100.0, 100.0, t, t), 0, t);
        // Small jitter below slop, before the long-press duration: nothing.
        let events = gc.process(&touch(TouchPhase::Move, 102.0, 101.0, t, t + MS_100), 0, t + MS_100);
        assert!(events.is_empty());

        // Still below slop, past 300ms: promoted.
        let events = gc.process(&touch(TouchPhase::Move, 103.0, 102.0, t, t + MS_350), 0, t + MS_350);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::LongPressStart { .. }]
        ));
    }

    #[test]
    fn horizontal_move_promotes_to_swipe() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 200.0, 100.0, t, t), 0, t);
        let events = gc.process(&touch(TouchPhase::Move, 175.0, 102.0, t, t + MS_50), 0, t + MS_50);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::SwipeMove { scroll_dx }] if *scroll_dx == 25.0
        ));
        assert_eq!(gc.mode(), TouchMode::Swipe);

        let events = gc.process(&touch(TouchPhase::Move, 80.0, 102.0, t, t + MS_100), 0, t + MS_100);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::SwipeMove { scroll_dx }] if *scroll_dx == 95.0
        ));

        let events = gc.process(&touch(TouchPhase::Up, 80.0, 102.0, t, t + MS_250), 0, t + MS_250);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::SwipeEnd { total_dx }] if *total_dx == -120.0
        ));
    }

    #[test]
    fn drag_beats_swipe_on_dominant_vertical() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 100.0, 100.0, t, t), 0, t);
        // Diagonal past full slop with |dx| < |dy|.
        let events = gc.process(&touch(TouchPhase::Move, 145.0, 155.0, t, t + MS_50), 0, t + MS_50);
        assert!(matches!(
            events.as_slice(),
            [GestureEvent::LongPressStart { .. }]
        ));
    }

    #[test]
    fn cancel_behaves_like_release() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 100.0, 100.0, t, t), 0, t);
        gc.process(&touch(TouchPhase::Move, 105.0, 160.0, t, t + MS_50), 0, t + MS_50);
        assert_eq!(gc.mode(), TouchMode::LongPressDrag);

        let events = gc.process(&touch(TouchPhase::Cancel, 105.0, 160.0, t, t + MS_100), 0, t + MS_100);
        assert!(matches!(events.as_slice(), [GestureEvent::DragEnd { .. }]));
        assert_eq!(gc.mode(), TouchMode::Normal);
    }

    #[test]
    fn multi_touch_blocks_promotion() {
        let mut gc = classifier();
        let t = Instant::now();

        gc.process(&touch(TouchPhase::Down, 100.0, 100.0, t, t), 0, t);
        let events = gc.process(&two_finger_move(100.0, 180.0, t, t + MS_50), 0, t + MS_50);
        assert!(events.is_empty());
        assert_eq!(gc.mode(), TouchMode::Normal);
    }

    #[test]
    fn empty_event_is_a_noop() {
        let mut gc = classifier();
        let t = Instant::now();
        let ev = TouchEvent::new(TouchPhase::Down, Vec::new(), t, t);
        assert!(gc.process(&ev, 0, t).is_empty());
        assert!(!gc.in_session());
    }
}
