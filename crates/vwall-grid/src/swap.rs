#![forbid(unsafe_code)]

//! Drag-to-reorder: pane swapping during a long-press drag.
//!
//! While a drag is live the dragged pane's rect follows the finger,
//! unclamped — it may hang off the container. Its center is hit-tested
//! against the other panes of the *same screen* (cross-page swaps are
//! deliberately not a thing; edge navigation changes pages instead) and the
//! hit becomes the replace candidate. Releasing over a candidate performs a
//! full position swap.
//!
//! # Invariants
//!
//! 1. At most one pane carries the replace-candidate flag, and only while a
//!    drag session is live.
//! 2. The candidate is always on the dragged pane's screen.
//! 3. Candidate-change notifications fire only on actual changes, including
//!    the change to "none".

use tracing::debug;
use vwall_core::geometry::PointF;

use crate::events::WallCallbacks;
use crate::pane::{PaneFlags, PaneRegistry, Serial};

/// Tracks the dragged pane and its drop target.
#[derive(Debug, Default)]
pub struct PaneSwapEngine {
    dragged: Option<Serial>,
    candidate: Option<Serial>,
    enabled: bool,
}

impl PaneSwapEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dragged: None,
            candidate: None,
            enabled: true,
        }
    }

    /// Allow or forbid swapping. Disabling mid-drag drops the current
    /// candidate; the pane still follows the finger.
    pub fn set_enabled(&mut self, enabled: bool, registry: &mut PaneRegistry) {
        self.enabled = enabled;
        if !enabled {
            self.clear_candidate(registry);
        }
    }

    #[inline]
    #[must_use]
    pub fn dragged(&self) -> Option<Serial> {
        self.dragged
    }

    #[inline]
    #[must_use]
    pub fn candidate(&self) -> Option<Serial> {
        self.candidate
    }

    /// Start a drag session for `serial`.
    pub fn begin(&mut self, serial: Serial) {
        self.dragged = Some(serial);
        self.candidate = None;
    }

    /// Move the dragged pane by the finger delta and retarget the candidate.
    pub fn drag_move(
        &mut self,
        dx: f32,
        dy: f32,
        page: usize,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        let Some(dragged) = self.dragged else { return };
        let Some(pane) = registry.pane_mut(dragged) else {
            debug_assert!(false, "drag of absent pane {dragged}");
            return;
        };
        pane.rect = pane.rect.translated(dx, dy);
        let center = pane.rect.center();
        let screen = pane.screen_index;

        if !self.enabled {
            return;
        }
        let hit = Self::hit_test(registry, dragged, screen, center);
        if hit != self.candidate {
            for p in registry.iter_mut() {
                p.flags
                    .set(PaneFlags::REPLACE_CANDIDATE, Some(p.serial) == hit);
            }
            self.candidate = hit;
            WallCallbacks::emit(
                &mut callbacks.replace_candidate_changed,
                (page, dragged, hit),
            );
        }
    }

    /// Release the drag. Performs the swap when a candidate is under the
    /// finger; returns whether a swap happened. The caller relays out either
    /// way, since the dragged rect is off its cell.
    pub fn release(
        &mut self,
        page: usize,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) -> bool {
        let Some(dragged) = self.dragged.take() else {
            return false;
        };
        let candidate = self.candidate;
        self.clear_candidate(registry);
        let swapped = match candidate {
            Some(target) => {
                debug!(%dragged, %target, "swap on release");
                registry.swap_positions(dragged, target)
            }
            None => false,
        };
        WallCallbacks::emit(
            &mut callbacks.long_press_ended,
            (page, dragged, candidate),
        );
        swapped
    }

    /// Abort without swapping (gesture cancelled externally).
    pub fn cancel(&mut self, registry: &mut PaneRegistry) {
        self.dragged = None;
        self.clear_candidate(registry);
    }

    fn clear_candidate(&mut self, registry: &mut PaneRegistry) {
        if self.candidate.take().is_some() {
            for p in registry.iter_mut() {
                p.flags.remove(PaneFlags::REPLACE_CANDIDATE);
            }
        }
    }

    fn hit_test(
        registry: &PaneRegistry,
        dragged: Serial,
        screen: usize,
        center: PointF,
    ) -> Option<Serial> {
        registry
            .visible_panes()
            .filter(|p| p.serial != dragged && p.screen_index == screen)
            .find(|p| p.rect.contains(center))
            .map(|p| p.serial)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayoutEngine;
    use std::cell::RefCell;
    use std::rc::Rc;
    use vwall_core::config::WallConfig;
    use vwall_core::mode::{Orientation, WindowMode};

    fn fixture() -> (PaneSwapEngine, PaneRegistry, WallCallbacks) {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        let eng = GridLayoutEngine::new(1000.0, 800.0, Orientation::Landscape);
        eng.layout_pass(&mut reg, WindowMode::Four, &WallConfig::default());
        (PaneSwapEngine::new(), reg, WallCallbacks::new())
    }

    #[test]
    fn drag_into_neighbor_marks_candidate() {
        let (mut swap, mut reg, mut cbs) = fixture();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        cbs.on_replace_candidate_changed(move |args| sink.borrow_mut().push(args));

        // Pane 0 rests at (0,0)-(500,400); drag its center into pane 1.
        swap.begin(Serial(0));
        swap.drag_move(500.0, 0.0, 0, &mut reg, &mut cbs);
        assert_eq!(swap.candidate(), Some(Serial(1)));
        assert!(
            reg.pane(Serial(1))
                .unwrap()
                .flags
                .contains(PaneFlags::REPLACE_CANDIDATE)
        );

        // Moving within the same cell fires nothing new.
        swap.drag_move(10.0, 0.0, 0, &mut reg, &mut cbs);
        // Back out of every neighbor: candidate clears.
        swap.drag_move(-510.0, 0.0, 0, &mut reg, &mut cbs);
        assert_eq!(swap.candidate(), None);

        assert_eq!(
            *changes.borrow(),
            vec![(0, Serial(0), Some(Serial(1))), (0, Serial(0), None)]
        );
    }

    #[test]
    fn release_over_candidate_swaps() {
        let (mut swap, mut reg, mut cbs) = fixture();
        let ends = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&ends);
        cbs.on_long_press_ended(move |args| sink.borrow_mut().push(args));

        reg.select(Serial(0));
        swap.begin(Serial(0));
        swap.drag_move(500.0, 0.0, 0, &mut reg, &mut cbs);
        assert!(swap.release(0, &mut reg, &mut cbs));

        // Selection travelled to the drop cell.
        assert_eq!(reg.selected(), Some(Serial(1)));
        assert_eq!(*ends.borrow(), vec![(0, Serial(0), Some(Serial(1)))]);
        assert_eq!(swap.dragged(), None);
        assert!(reg.iter().all(|p| !p.flags.contains(PaneFlags::REPLACE_CANDIDATE)));
    }

    #[test]
    fn release_without_candidate_swaps_nothing() {
        let (mut swap, mut reg, mut cbs) = fixture();
        reg.select(Serial(0));
        swap.begin(Serial(0));
        swap.drag_move(20.0, 15.0, 0, &mut reg, &mut cbs);
        swap.release(0, &mut reg, &mut cbs);
        assert_eq!(reg.selected(), Some(Serial(0)));
    }

    #[test]
    fn cross_screen_panes_are_never_candidates() {
        let (mut swap, mut reg, mut cbs) = fixture();
        swap.begin(Serial(3));
        // Drag pane 3 far right, over screen 1's territory.
        swap.drag_move(800.0, 0.0, 0, &mut reg, &mut cbs);
        assert_eq!(swap.candidate(), None);
    }

    #[test]
    fn disabled_engine_tracks_no_candidates() {
        let (mut swap, mut reg, mut cbs) = fixture();
        swap.set_enabled(false, &mut reg);
        swap.begin(Serial(0));
        swap.drag_move(500.0, 0.0, 0, &mut reg, &mut cbs);
        assert_eq!(swap.candidate(), None);
        // The pane still followed the finger.
        assert_eq!(reg.pane(Serial(0)).unwrap().rect.left, 500.0);
    }

    #[test]
    fn disabling_mid_drag_drops_candidate() {
        let (mut swap, mut reg, mut cbs) = fixture();
        swap.begin(Serial(0));
        swap.drag_move(500.0, 0.0, 0, &mut reg, &mut cbs);
        assert_eq!(swap.candidate(), Some(Serial(1)));

        swap.set_enabled(false, &mut reg);
        assert_eq!(swap.candidate(), None);
        assert!(reg.iter().all(|p| !p.flags.contains(PaneFlags::REPLACE_CANDIDATE)));
    }
}
