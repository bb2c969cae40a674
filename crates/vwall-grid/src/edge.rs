#![forbid(unsafe_code)]

//! Edge-swipe navigation during a long-press drag.
//!
//! Dragging a pane against the container's left or right edge flips to the
//! adjacent page (debounced, so holding at the edge pages at a steady rate)
//! and shifts the dragged pane one container width so it stays under the
//! finger. Separately, the dragged pane's page-local center reports
//! edge-contact transitions to the host: left, right, and top (the top edge
//! is the delete/drop affordance and uses its own slop).
//!
//! # Invariants
//!
//! 1. A flip never fires inside the debounce window of the previous one.
//! 2. No flip past the outer pages; at a boundary the edge hold is inert.
//! 3. Each edge callback fires only on a contact transition: `Some(pane)` on
//!    entering the edge zone, `None` on leaving it.

use std::time::Instant;

use tracing::debug;
use vwall_core::config::WallConfig;
use vwall_core::geometry::PointF;

use crate::events::WallCallbacks;
use crate::pane::{PaneRegistry, Serial};
use crate::paging::PagingController;

/// Edge tracking state for one drag session.
#[derive(Debug)]
pub struct EdgeSwipeNavigator {
    edge_slop: f32,
    delete_slop: f32,
    debounce: std::time::Duration,
    last_flip: Option<Instant>,
    at_left: bool,
    at_right: bool,
    at_top: bool,
}

impl EdgeSwipeNavigator {
    #[must_use]
    pub fn new(config: &WallConfig) -> Self {
        Self {
            edge_slop: config.edge_slop_px,
            delete_slop: config.delete_edge_slop_px,
            debounce: config.edge_debounce,
            last_flip: None,
            at_left: false,
            at_right: false,
            at_top: false,
        }
    }

    /// Reset per-session state at drag start. No callbacks fire.
    pub fn begin(&mut self) {
        self.last_flip = None;
        self.at_left = false;
        self.at_right = false;
        self.at_top = false;
    }

    /// Process one drag movement.
    ///
    /// `pointer_x` is the finger's on-screen x; `center` is the dragged
    /// pane's page-local center.
    pub fn drag_move(
        &mut self,
        pointer_x: f32,
        center: PointF,
        pane: Serial,
        now: Instant,
        width: f32,
        paging: &mut PagingController,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        self.track_edges(center, pane, width, callbacks);
        self.maybe_flip(pointer_x, pane, now, width, paging, registry, callbacks);
    }

    /// Drag released while still in long-press mode: report completion and
    /// reset contact state.
    pub fn finish(&mut self, pane: Serial, callbacks: &mut WallCallbacks) {
        WallCallbacks::emit(&mut callbacks.edge_finished, pane);
        self.begin();
    }

    fn track_edges(
        &mut self,
        center: PointF,
        pane: Serial,
        width: f32,
        callbacks: &mut WallCallbacks,
    ) {
        let left = center.x <= self.edge_slop;
        if left != self.at_left {
            self.at_left = left;
            WallCallbacks::emit(&mut callbacks.edge_left, left.then_some(pane));
        }
        let right = center.x >= width - self.edge_slop;
        if right != self.at_right {
            self.at_right = right;
            WallCallbacks::emit(&mut callbacks.edge_right, right.then_some(pane));
        }
        let top = center.y <= self.delete_slop;
        if top != self.at_top {
            self.at_top = top;
            WallCallbacks::emit(&mut callbacks.edge_top, top.then_some(pane));
        }
    }

    fn maybe_flip(
        &mut self,
        pointer_x: f32,
        pane: Serial,
        now: Instant,
        width: f32,
        paging: &mut PagingController,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        if self
            .last_flip
            .is_some_and(|at| now.duration_since(at) < self.debounce)
        {
            return;
        }
        let page = paging.current_page();
        let (target, shift) = if pointer_x <= self.edge_slop && page > 0 {
            (page - 1, -width)
        } else if pointer_x >= width - self.edge_slop && page + 1 < paging.screen_count() {
            (page + 1, width)
        } else {
            return;
        };

        debug!(page, target, "edge flip");
        self.last_flip = Some(now);
        paging.snap_to_screen(target, true, now, registry, callbacks);
        // Keep the dragged pane under the finger on the new page.
        if let Some(p) = registry.pane_mut(pane) {
            p.rect = p.rect.translated(shift, 0.0);
        }
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
    use std::time::Duration;
    use vwall_core::mode::{Orientation, WindowMode};

    const MS_100: Duration = Duration::from_millis(100);
    const MS_400: Duration = Duration::from_millis(400);

    fn fixture() -> (
        EdgeSwipeNavigator,
        PagingController,
        PaneRegistry,
        WallCallbacks,
        Instant,
    ) {
        let now = Instant::now();
        let cfg = WallConfig::default();
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        let eng = GridLayoutEngine::new(1000.0, 800.0, Orientation::Landscape);
        eng.layout_pass(&mut reg, WindowMode::Four, &cfg);
        let paging = PagingController::new(
            WindowMode::Four,
            16,
            1000.0,
            cfg.page_switch_threshold_px,
            cfg.scroll_duration,
            now,
        );
        (
            EdgeSwipeNavigator::new(&cfg),
            paging,
            reg,
            WallCallbacks::new(),
            now,
        )
    }

    fn mid() -> PointF {
        PointF::new(500.0, 400.0)
    }

    #[test]
    fn right_edge_hold_flips_pages_debounced() {
        let (mut edge, mut paging, mut reg, mut cbs, now) = fixture();
        edge.begin();

        edge.drag_move(995.0, mid(), Serial(0), now, 1000.0, &mut paging, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 1);
        // Pane shifted a full page right to stay under the finger.
        assert_eq!(reg.pane(Serial(0)).unwrap().rect.left, 1000.0);

        // Inside the debounce window: no second flip.
        edge.drag_move(995.0, mid(), Serial(0), now + MS_100, 1000.0, &mut paging, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 1);

        // Past the window: flips again.
        edge.drag_move(995.0, mid(), Serial(0), now + MS_400, 1000.0, &mut paging, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 2);
    }

    #[test]
    fn left_edge_at_first_page_is_inert() {
        let (mut edge, mut paging, mut reg, mut cbs, now) = fixture();
        edge.begin();
        edge.drag_move(5.0, mid(), Serial(0), now, 1000.0, &mut paging, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 0);
        assert_eq!(reg.pane(Serial(0)).unwrap().rect.left, 0.0);
    }

    #[test]
    fn edge_contact_callbacks_fire_on_transitions() {
        let (mut edge, mut paging, mut reg, mut cbs, now) = fixture();
        let lefts = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lefts);
        cbs.on_edge_left(move |p| sink.borrow_mut().push(p));
        let tops = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&tops);
        cbs.on_edge_top(move |p| sink.borrow_mut().push(p));

        edge.begin();
        // Center enters the left zone.
        edge.drag_move(400.0, PointF::new(10.0, 400.0), Serial(0), now, 1000.0, &mut paging, &mut reg, &mut cbs);
        // Stays in it: no repeat.
        edge.drag_move(400.0, PointF::new(8.0, 400.0), Serial(0), now, 1000.0, &mut paging, &mut reg, &mut cbs);
        // Leaves it, enters the top zone.
        edge.drag_move(400.0, PointF::new(300.0, 10.0), Serial(0), now, 1000.0, &mut paging, &mut reg, &mut cbs);

        assert_eq!(*lefts.borrow(), vec![Some(Serial(0)), None]);
        assert_eq!(*tops.borrow(), vec![Some(Serial(0))]);
    }

    #[test]
    fn finish_reports_the_dragged_pane() {
        let (mut edge, _, _, mut cbs, _) = fixture();
        let done = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&done);
        cbs.on_edge_finished(move |p| *sink.borrow_mut() = Some(p));

        edge.begin();
        edge.finish(Serial(5), &mut cbs);
        assert_eq!(*done.borrow(), Some(Serial(5)));
    }
}
