#![forbid(unsafe_code)]

//! Paging: which screen shows, and how the wall gets there.
//!
//! The wall lays all pages out side by side; paging is a horizontal scroll
//! offset of `page × container_width`. [`PagingController`] owns that offset
//! (live-dragged during a swipe, animated by a [`Scroller`] otherwise), the
//! current/last page indices, and the screen count derived from the shown
//! pane count.
//!
//! # Invariants
//!
//! 1. `current_page < screen_count`, and `screen_count ≥ 1` even for an
//!    empty wall.
//! 2. The scroll offset never leaves `[0, (screen_count − 1) × width]`,
//!    including during a live drag.
//! 3. Page-change notifications fire only on real changes; snapping to the
//!    page already at its resting offset is a no-op.
//! 4. After any page change, exactly the destination page's panes carry the
//!    user-visible hint.

use std::time::{Duration, Instant};

use tracing::debug;
use vwall_core::mode::WindowMode;
use vwall_core::scroller::Scroller;

use crate::events::WallCallbacks;
use crate::pane::{PaneRegistry, Serial};

/// Scroll-offset and page bookkeeping for the wall.
#[derive(Debug)]
pub struct PagingController {
    mode: WindowMode,
    width: f32,
    screen_count: usize,
    current_page: usize,
    last_page: usize,
    /// Optional cap on the number of pages shown.
    max_pages: Option<usize>,
    scroller: Scroller,
    threshold: f32,
    scroll_duration: Duration,
}

impl PagingController {
    /// Create a controller resting on page 0.
    #[must_use]
    pub fn new(
        mode: WindowMode,
        shown_panes: usize,
        width: f32,
        threshold: f32,
        scroll_duration: Duration,
        now: Instant,
    ) -> Self {
        Self {
            mode,
            width,
            screen_count: mode.screens_for(shown_panes).max(1),
            current_page: 0,
            last_page: 0,
            max_pages: None,
            scroller: Scroller::new(0.0, now),
            threshold,
            scroll_duration,
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[inline]
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.last_page
    }

    #[inline]
    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.screen_count
    }

    /// Current horizontal scroll offset.
    #[must_use]
    pub fn offset(&self, now: Instant) -> f32 {
        self.scroller.offset_at(now)
    }

    /// Whether an animated page transition is still in flight.
    #[must_use]
    pub fn is_scrolling(&self, now: Instant) -> bool {
        !self.scroller.is_finished(now)
    }

    /// Serial of the first pane on `page`.
    #[inline]
    #[must_use]
    pub fn first_pane_of(&self, page: usize) -> Serial {
        Serial(page * self.mode.panes_per_screen())
    }

    /// Resize the container, rescaling the resting offset to the new width.
    pub fn set_container_width(&mut self, width: f32, now: Instant) {
        self.width = width;
        self.scroller
            .start(self.current_page as f32 * width, 0.0, Duration::ZERO, now);
    }

    /// Scroll to `index` (clamped). Returns false when the wall is already
    /// resting there.
    pub fn snap_to_screen(
        &mut self,
        index: usize,
        animated: bool,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) -> bool {
        let index = index.min(self.screen_count.saturating_sub(1));
        let target = index as f32 * self.width;
        let from = self.scroller.offset_at(now);
        if index == self.current_page && from == target {
            return false;
        }
        debug!(from = self.current_page, to = index, animated, "page snap");
        let duration = if animated {
            self.scroll_duration
        } else {
            Duration::ZERO
        };
        self.scroller.start(from, target - from, duration, now);
        if index != self.current_page {
            self.last_page = self.current_page;
            self.current_page = index;
            registry.mark_user_visible(index);
            WallCallbacks::emit(
                &mut callbacks.page_changed,
                (index, self.mode, self.screen_count),
            );
        }
        true
    }

    /// Switch the split mode, keeping the selected pane on screen. Returns
    /// false when the mode is unchanged.
    pub fn switch_mode(
        &mut self,
        new_mode: WindowMode,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) -> bool {
        if new_mode == self.mode {
            return false;
        }
        let last_mode = self.mode;
        self.mode = new_mode;
        registry.reposition(new_mode);
        self.recompute_screen_count(registry);

        let new_page = registry
            .selected()
            .and_then(|s| registry.pane(s))
            .map_or(0, |p| p.screen_index)
            .min(self.screen_count - 1);
        let last_page = self.current_page;
        self.last_page = last_page;
        self.current_page = new_page;
        self.scroller
            .start(new_page as f32 * self.width, 0.0, Duration::ZERO, now);
        registry.mark_user_visible(new_page);
        debug!(?last_mode, ?new_mode, last_page, new_page, "mode switch");
        WallCallbacks::emit(
            &mut callbacks.mode_changed,
            (last_page, new_page, last_mode, new_mode),
        );
        true
    }

    /// Accumulate a live swipe delta into the offset, clamped to the outer
    /// page boundaries.
    pub fn drag_by(&mut self, scroll_dx: f32, now: Instant) {
        let max = (self.screen_count - 1) as f32 * self.width;
        let offset = (self.scroller.offset_at(now) + scroll_dx).clamp(0.0, max);
        self.scroller.start(offset, 0.0, Duration::ZERO, now);
    }

    /// Finish a swipe. Displacement beyond the threshold pages over; anything
    /// less snaps back to the current page. Either way, whenever the release
    /// moved the offset the destination page's first pane becomes selected
    /// and the swipe-completion callback fires (with `old == new` for a
    /// snap-back).
    ///
    /// `total_dx` is finger displacement since down: positive = rightward =
    /// previous page.
    pub fn release_swipe(
        &mut self,
        total_dx: f32,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        let old_page = self.current_page;
        let target = if total_dx > self.threshold && old_page > 0 {
            old_page - 1
        } else if total_dx < -self.threshold && old_page + 1 < self.screen_count {
            old_page + 1
        } else {
            old_page
        };
        if self.snap_to_screen(target, true, now, registry, callbacks) {
            let first = self.first_pane_of(target);
            if registry.select(first) {
                WallCallbacks::emit(&mut callbacks.selected, (target, first));
            }
            WallCallbacks::emit(
                &mut callbacks.swipe_completed,
                (old_page, target, first, self.mode, self.screen_count),
            );
        }
    }

    /// Jump to `page`, stepping down while out of range. Fires page-change
    /// only on a real change; a clamped jump selects the landing page's
    /// first pane.
    pub fn set_current_page(
        &mut self,
        page: usize,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        let mut target = page;
        let mut clamped = false;
        while target >= self.screen_count && target > 0 {
            target -= 1;
            clamped = true;
        }
        if clamped {
            let first = self.first_pane_of(target);
            if registry.select(first) {
                WallCallbacks::emit(&mut callbacks.selected, (target, first));
            }
        }
        if target != self.current_page {
            self.snap_to_screen(target, false, now, registry, callbacks);
        }
    }

    /// Limit the shown panes to `count`, clamping the page into the smaller
    /// wall.
    pub fn set_show_window_max_count(
        &mut self,
        count: usize,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        let count = count.clamp(1, registry.len());
        if count == registry.show_max() {
            return;
        }
        let last_page = self.current_page;
        registry.set_show_max(count);
        self.recompute_screen_count(registry);
        self.set_current_page(self.current_page, now, registry, callbacks);
        let pane = registry.selected().unwrap_or(Serial(0));
        WallCallbacks::emit(
            &mut callbacks.max_count_changed,
            (pane, last_page, self.current_page, self.mode, self.mode),
        );
    }

    /// Cap the number of pages shown (`None` lifts the cap).
    pub fn set_show_screen_max_page(
        &mut self,
        cap: Option<usize>,
        now: Instant,
        registry: &mut PaneRegistry,
        callbacks: &mut WallCallbacks,
    ) {
        self.max_pages = cap.map(|c| c.max(1));
        self.recompute_screen_count(registry);
        self.set_current_page(self.current_page, now, registry, callbacks);
    }

    /// Recompute the screen count after a registry change. The page is not
    /// clamped here; follow with [`set_current_page`](Self::set_current_page)
    /// so the clamp also moves the offset and fires notifications.
    pub fn recompute_screen_count(&mut self, registry: &PaneRegistry) {
        let mut count = self.mode.screens_for(registry.show_max()).max(1);
        if let Some(cap) = self.max_pages {
            count = count.min(cap);
        }
        self.screen_count = count;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneFlags;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS_400: Duration = Duration::from_millis(400);
    const MS_800: Duration = Duration::from_millis(800);

    fn fixture() -> (PagingController, PaneRegistry, WallCallbacks, Instant) {
        let now = Instant::now();
        let reg = PaneRegistry::new(16, WindowMode::Four);
        let paging = PagingController::new(
            WindowMode::Four,
            16,
            1000.0,
            100.0,
            MS_800,
            now,
        );
        (paging, reg, WallCallbacks::new(), now)
    }

    #[test]
    fn four_screens_for_sixteen_panes() {
        let (paging, ..) = fixture();
        assert_eq!(paging.screen_count(), 4);
        assert_eq!(paging.current_page(), 0);
    }

    #[test]
    fn animated_snap_moves_offset_over_time() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        assert!(paging.snap_to_screen(1, true, now, &mut reg, &mut cbs));
        assert_eq!(paging.current_page(), 1);

        let mid = paging.offset(now + MS_400);
        assert!(mid > 0.0 && mid < 1000.0);
        assert_eq!(paging.offset(now + MS_800), 1000.0);
    }

    #[test]
    fn snap_to_resting_page_is_a_noop() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        let fired = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&fired);
        cbs.on_page_changed(move |_| *sink.borrow_mut() += 1);

        assert!(!paging.snap_to_screen(0, true, now, &mut reg, &mut cbs));
        assert_eq!(*fired.borrow(), 0);

        assert!(paging.snap_to_screen(3, false, now, &mut reg, &mut cbs));
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(paging.offset(now), 3000.0);
    }

    #[test]
    fn snap_clamps_out_of_range_index() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        paging.snap_to_screen(99, false, now, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 3);
    }

    #[test]
    fn snap_propagates_user_visibility() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        paging.snap_to_screen(2, false, now, &mut reg, &mut cbs);
        let hinted: Vec<_> = reg
            .iter()
            .filter(|p| p.flags.contains(PaneFlags::USER_VISIBLE))
            .map(|p| p.serial.0)
            .collect();
        assert_eq!(hinted, vec![8, 9, 10, 11]);
    }

    #[test]
    fn drag_clamps_at_outer_boundaries() {
        let (mut paging, _, _, now) = fixture();
        paging.drag_by(-250.0, now);
        assert_eq!(paging.offset(now), 0.0);

        paging.drag_by(10_000.0, now);
        assert_eq!(paging.offset(now), 3000.0);
    }

    #[test]
    fn swipe_past_threshold_pages_and_selects() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        let completions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&completions);
        cbs.on_swipe_completed(move |args| sink.borrow_mut().push(args));

        // Finger moved 150px left: next page.
        paging.drag_by(150.0, now);
        paging.release_swipe(-150.0, now, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 1);
        assert_eq!(reg.selected(), Some(Serial(4)));
        assert_eq!(
            *completions.borrow(),
            vec![(0, 1, Serial(4), WindowMode::Four, 4)]
        );
    }

    #[test]
    fn short_swipe_snaps_back_and_reselects_first_pane() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        let completions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&completions);
        cbs.on_swipe_completed(move |args| sink.borrow_mut().push(args));

        reg.select(Serial(2));
        paging.drag_by(60.0, now);
        paging.release_swipe(-60.0, now, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 0);
        assert_eq!(paging.offset(now + MS_800), 0.0);
        // The snap-back still lands on the page's first pane and completes.
        assert_eq!(reg.selected(), Some(Serial(0)));
        assert_eq!(
            *completions.borrow(),
            vec![(0, 0, Serial(0), WindowMode::Four, 4)]
        );
    }

    #[test]
    fn swipe_at_boundary_stays_put() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        let completions = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&completions);
        cbs.on_swipe_completed(move |_| *sink.borrow_mut() += 1);

        // Rightward swipe on page 0 without any drag: nowhere to go, the
        // offset never moved, nothing fires.
        paging.release_swipe(400.0, now, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 0);
        assert_eq!(*completions.borrow(), 0);
    }

    #[test]
    fn set_current_page_steps_down_and_selects() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        reg.select(Serial(9));
        paging.set_current_page(7, now, &mut reg, &mut cbs);
        assert_eq!(paging.current_page(), 3);
        assert_eq!(reg.selected(), Some(Serial(12)));
    }

    #[test]
    fn switch_mode_follows_selection() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        let modes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&modes);
        cbs.on_mode_changed(move |args| sink.borrow_mut().push(args));

        reg.select(Serial(10));
        assert!(paging.switch_mode(WindowMode::Nine, now, &mut reg, &mut cbs));
        // 16 panes in 3x3: two screens; serial 10 is on screen 1.
        assert_eq!(paging.screen_count(), 2);
        assert_eq!(paging.current_page(), 1);
        assert_eq!(paging.offset(now), 1000.0);
        assert_eq!(
            *modes.borrow(),
            vec![(0, 1, WindowMode::Four, WindowMode::Nine)]
        );

        assert!(!paging.switch_mode(WindowMode::Nine, now, &mut reg, &mut cbs));
    }

    #[test]
    fn show_max_count_shrinks_the_wall() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        paging.snap_to_screen(3, false, now, &mut reg, &mut cbs);

        paging.set_show_window_max_count(6, now, &mut reg, &mut cbs);
        // 6 panes in 2x2: two screens; page 3 clamps down to 1.
        assert_eq!(paging.screen_count(), 2);
        assert_eq!(paging.current_page(), 1);
        assert_eq!(reg.visible_panes().count(), 6);
    }

    #[test]
    fn page_cap_limits_screen_count() {
        let (mut paging, mut reg, mut cbs, now) = fixture();
        paging.set_show_screen_max_page(Some(2), now, &mut reg, &mut cbs);
        assert_eq!(paging.screen_count(), 2);

        paging.set_show_screen_max_page(None, now, &mut reg, &mut cbs);
        assert_eq!(paging.screen_count(), 4);
    }
}
