#![forbid(unsafe_code)]

//! Host callback surface.
//!
//! One explicit slot per event. Hosts register only what they care about;
//! unregistered slots cost a branch. All callbacks run synchronously on the
//! thread driving the controller, so re-entrancy is the host's concern: do
//! not call back into the controller from inside a callback.

use vwall_core::geometry::RectF;
use vwall_core::mode::WindowMode;

use crate::pane::Serial;

/// Parameters of the drag enlarge/shrink animation the host should run on a
/// pane when a long-press drag starts or ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnimation {
    pub pane: Serial,
    /// Target scale factor (1.0 restores the resting size).
    pub scale: f32,
    /// Target alpha (1.0 restores full opacity).
    pub alpha: f32,
    pub duration: std::time::Duration,
}

type Slot<A> = Option<Box<dyn FnMut(A)>>;

/// Registered host callbacks.
///
/// Field order mirrors the lifecycle: paging, selection, drag, zoom.
#[derive(Default)]
pub struct WallCallbacks {
    /// `(page, mode, screen_count)` after any page change.
    pub(crate) page_changed: Slot<(usize, WindowMode, usize)>,
    /// `(last_page, new_page, last_mode, new_mode)` after a mode switch.
    pub(crate) mode_changed: Slot<(usize, usize, WindowMode, WindowMode)>,
    /// `(page, pane)` when the selected pane changes.
    pub(crate) selected: Slot<(usize, Serial)>,
    /// `(page, pane)` when a single tap is confirmed (after the double-tap
    /// window closes without a second tap).
    pub(crate) tapped: Slot<(usize, Serial)>,
    /// `(page, pane)` when a long-press drag starts.
    pub(crate) long_pressed: Slot<(usize, Serial)>,
    /// `(page, pane, candidate)` when the drop target under a drag changes.
    pub(crate) replace_candidate_changed: Slot<(usize, Serial, Option<Serial>)>,
    /// `(page, pane, candidate)` when a drag releases.
    pub(crate) long_press_ended: Slot<(usize, Serial, Option<Serial>)>,
    /// `(page, pane, from_mode, to_mode)` on a pane double-tap.
    pub(crate) double_tapped: Slot<(usize, Serial, WindowMode, WindowMode)>,
    /// `(old_page, new_page, pane, mode, screen_count)` after a swipe lands.
    pub(crate) swipe_completed: Slot<(usize, usize, Serial, WindowMode, usize)>,
    /// Dragged pane touching the left edge, or `None` once it leaves it.
    pub(crate) edge_left: Slot<Option<Serial>>,
    /// Dragged pane touching the right edge, or `None` once it leaves it.
    pub(crate) edge_right: Slot<Option<Serial>>,
    /// Dragged pane touching the top edge, or `None` once it leaves it.
    pub(crate) edge_top: Slot<Option<Serial>>,
    /// Drag released after edge tracking; carries the dragged pane.
    pub(crate) edge_finished: Slot<Serial>,
    /// `(pane, last_page, new_page, last_mode, new_mode)` after the shown
    /// pane count changes.
    pub(crate) max_count_changed: Slot<(Serial, usize, usize, WindowMode, WindowMode)>,
    /// `(pane, raw, clamped)` on every zoom scale change. `raw` may dip
    /// below 1.0; `clamped` is the committed scale.
    pub(crate) zoom_scale_changed: Slot<(Serial, f32, f32)>,
    /// `(pane, virtual_rect)` whenever zoom pan or scale moves the content.
    pub(crate) zoom_rect_changed: Slot<(Serial, RectF)>,
    /// Two-finger spread on a pane whose zoom surface is not yet open.
    pub(crate) zoom_requested: Slot<Serial>,
    /// Drag enlarge/shrink animation request.
    pub(crate) drag_animation: Slot<DragAnimation>,
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident, $slot:ident, $arg:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, f: impl FnMut($arg) + 'static) {
            self.$slot = Some(Box::new(f));
        }
    };
}

impl WallCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    setter!(
        /// Register the page-change callback.
        on_page_changed, page_changed, (usize, WindowMode, usize)
    );
    setter!(
        /// Register the mode-change callback.
        on_mode_changed, mode_changed, (usize, usize, WindowMode, WindowMode)
    );
    setter!(
        /// Register the selection callback.
        on_selected, selected, (usize, Serial)
    );
    setter!(
        /// Register the confirmed single-tap callback.
        on_tapped, tapped, (usize, Serial)
    );
    setter!(
        /// Register the long-press-start callback.
        on_long_pressed, long_pressed, (usize, Serial)
    );
    setter!(
        /// Register the replace-candidate callback.
        on_replace_candidate_changed, replace_candidate_changed,
        (usize, Serial, Option<Serial>)
    );
    setter!(
        /// Register the long-press-end callback.
        on_long_press_ended, long_press_ended, (usize, Serial, Option<Serial>)
    );
    setter!(
        /// Register the double-tap callback.
        on_double_tapped, double_tapped, (usize, Serial, WindowMode, WindowMode)
    );
    setter!(
        /// Register the swipe-completion callback.
        on_swipe_completed, swipe_completed, (usize, usize, Serial, WindowMode, usize)
    );
    setter!(
        /// Register the left-edge callback.
        on_edge_left, edge_left, Option<Serial>
    );
    setter!(
        /// Register the right-edge callback.
        on_edge_right, edge_right, Option<Serial>
    );
    setter!(
        /// Register the top-edge callback.
        on_edge_top, edge_top, Option<Serial>
    );
    setter!(
        /// Register the edge-finished callback.
        on_edge_finished, edge_finished, Serial
    );
    setter!(
        /// Register the shown-count-change callback.
        on_max_count_changed, max_count_changed,
        (Serial, usize, usize, WindowMode, WindowMode)
    );
    setter!(
        /// Register the zoom scale callback.
        on_zoom_scale_changed, zoom_scale_changed, (Serial, f32, f32)
    );
    setter!(
        /// Register the zoom rect callback.
        on_zoom_rect_changed, zoom_rect_changed, (Serial, RectF)
    );
    setter!(
        /// Register the zoom-requested callback.
        on_zoom_requested, zoom_requested, Serial
    );
    setter!(
        /// Register the drag-animation callback.
        on_drag_animation, drag_animation, DragAnimation
    );

    pub(crate) fn emit<A>(slot: &mut Slot<A>, arg: A) {
        if let Some(f) = slot.as_mut() {
            f(arg);
        }
    }
}

impl std::fmt::Debug for WallCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WallCallbacks")
            .field("page_changed", &self.page_changed.is_some())
            .field("mode_changed", &self.mode_changed.is_some())
            .field("selected", &self.selected.is_some())
            .field("long_pressed", &self.long_pressed.is_some())
            .field("double_tapped", &self.double_tapped.is_some())
            .field("swipe_completed", &self.swipe_completed.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unregistered_slot_is_silent() {
        let mut cbs = WallCallbacks::new();
        WallCallbacks::emit(&mut cbs.page_changed, (0, WindowMode::Four, 4));
    }

    #[test]
    fn registered_slot_receives_args() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut cbs = WallCallbacks::new();
        let sink = Rc::clone(&seen);
        cbs.on_page_changed(move |(page, _, count)| sink.borrow_mut().push((page, count)));

        WallCallbacks::emit(&mut cbs.page_changed, (2, WindowMode::Four, 4));
        WallCallbacks::emit(&mut cbs.page_changed, (3, WindowMode::Four, 4));
        assert_eq!(*seen.borrow(), vec![(2, 4), (3, 4)]);
    }

    #[test]
    fn re_registration_replaces_the_slot() {
        let seen = Rc::new(RefCell::new(0));
        let mut cbs = WallCallbacks::new();
        let a = Rc::clone(&seen);
        cbs.on_edge_finished(move |_| *a.borrow_mut() += 1);
        let b = Rc::clone(&seen);
        cbs.on_edge_finished(move |_| *b.borrow_mut() += 10);

        WallCallbacks::emit(&mut cbs.edge_finished, Serial(0));
        assert_eq!(*seen.borrow(), 10);
    }
}
