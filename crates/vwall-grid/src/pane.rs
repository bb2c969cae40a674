#![forbid(unsafe_code)]

//! Pane registry: the grid's model of its panes.
//!
//! A [`Pane`] is one cell's worth of state: a stable [`Serial`], the grid
//! coordinates derived from it, the last laid-out rectangle, and status
//! flags. [`PaneRegistry`] owns all panes in position order and enforces the
//! structural invariants the rest of the grid relies on.
//!
//! # Invariants
//!
//! 1. At most one pane carries [`PaneFlags::SELECTED`] at any time.
//! 2. Serials are dense: after construction, resize, or
//!    [`renumber`](PaneRegistry::renumber), the arena's serials are exactly
//!    `0..len` in order.
//! 3. [`PaneFlags::VISIBLE`] is set iff `serial < show_max`.
//! 4. A position swap exchanges the panes' travelling state (flags) while
//!    the cell geometry (serial, coordinates, rect) stays with the cell.

use bitflags::bitflags;
use tracing::debug;
use vwall_core::geometry::RectF;
use vwall_core::mode::WindowMode;

use crate::layout::locate;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Stable pane identity: its ordinal position in the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Serial(pub usize);

impl std::fmt::Display for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Per-pane status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PaneFlags: u8 {
        /// Shown at all (serial below the show-max cutoff).
        const VISIBLE = 1 << 0;
        /// The single selected pane.
        const SELECTED = 1 << 1;
        /// Current drop target of an in-flight drag.
        const REPLACE_CANDIDATE = 1 << 2;
        /// On the page the user is looking at.
        const USER_VISIBLE = 1 << 3;
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pane {
    pub serial: Serial,
    pub row: usize,
    pub column: usize,
    pub screen_index: usize,
    /// Container-space rectangle from the last layout pass.
    pub rect: RectF,
    pub flags: PaneFlags,
}

impl Pane {
    fn at(serial: usize, mode: WindowMode) -> Self {
        let (row, column, screen_index) = locate(serial, mode);
        Self {
            serial: Serial(serial),
            row,
            column,
            screen_index,
            rect: RectF::new(0.0, 0.0, 0.0, 0.0),
            flags: PaneFlags::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(PaneFlags::VISIBLE)
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(PaneFlags::SELECTED)
    }
}

// ---------------------------------------------------------------------------
// PaneRegistry
// ---------------------------------------------------------------------------

/// Owns every pane, in position order.
#[derive(Debug, Clone)]
pub struct PaneRegistry {
    panes: Vec<Pane>,
    show_max: usize,
}

impl PaneRegistry {
    /// Create `count` panes positioned for `mode`, with the first pane
    /// selected and all panes shown.
    #[must_use]
    pub fn new(count: usize, mode: WindowMode) -> Self {
        let mut reg = Self {
            panes: (0..count).map(|s| Pane::at(s, mode)).collect(),
            show_max: count,
        };
        reg.apply_visibility();
        if count > 0 {
            reg.select(Serial(0));
        }
        reg
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.panes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    /// Number of panes actually shown; panes at or past this serial are
    /// hidden.
    #[inline]
    #[must_use]
    pub fn show_max(&self) -> usize {
        self.show_max
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Pane> {
        self.panes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pane> {
        self.panes.iter_mut()
    }

    /// Panes currently shown.
    #[must_use]
    pub fn visible_panes(&self) -> impl Iterator<Item = &Pane> {
        self.panes.iter().filter(|p| p.is_visible())
    }

    #[must_use]
    pub fn pane(&self, serial: Serial) -> Option<&Pane> {
        self.panes.iter().find(|p| p.serial == serial)
    }

    pub fn pane_mut(&mut self, serial: Serial) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.serial == serial)
    }

    /// The selected pane's serial, if any.
    #[must_use]
    pub fn selected(&self) -> Option<Serial> {
        self.panes.iter().find(|p| p.is_selected()).map(|p| p.serial)
    }

    /// Select `serial`, clearing any previous selection. Returns whether the
    /// selection changed; unknown serials change nothing.
    pub fn select(&mut self, serial: Serial) -> bool {
        if self.pane(serial).is_none() {
            debug_assert!(false, "select of absent pane {serial}");
            return false;
        }
        if self.selected() == Some(serial) {
            return false;
        }
        for p in &mut self.panes {
            p.flags.set(PaneFlags::SELECTED, p.serial == serial);
        }
        true
    }

    /// Resize to `count` panes, creating or destroying at the tail.
    ///
    /// A removed selection falls back to the first pane. `show_max` follows
    /// the new count when it pointed past it (or tracked the old count).
    pub fn resize(&mut self, count: usize, mode: WindowMode) {
        let old = self.panes.len();
        if count == old {
            return;
        }
        debug!(old, new = count, "registry resize");
        if count < old {
            self.panes.truncate(count);
            if self.selected().is_none() && count > 0 {
                self.select(Serial(0));
            }
        } else {
            self.panes.extend((old..count).map(|s| Pane::at(s, mode)));
        }
        if self.show_max == old || self.show_max > count {
            self.show_max = count;
        }
        self.apply_visibility();
    }

    /// Limit the shown panes to the first `count` serials.
    pub fn set_show_max(&mut self, count: usize) {
        self.show_max = count.min(self.panes.len());
        self.apply_visibility();
    }

    /// Exchange the travelling state of two cells: the panes trade places in
    /// the arena while serial, coordinates, and rect stay with the cell.
    /// Returns false (and changes nothing) when either serial is absent.
    pub fn swap_positions(&mut self, a: Serial, b: Serial) -> bool {
        if a == b {
            return false;
        }
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            debug_assert!(false, "swap of absent pane {a} / {b}");
            return false;
        };
        self.panes.swap(ia, ib);
        {
            // Hand the cell geometry back: only flags travel.
            let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
            let (left, right) = self.panes.split_at_mut(hi);
            let (pa, pb) = (&mut left[lo], &mut right[0]);
            std::mem::swap(&mut pa.serial, &mut pb.serial);
            std::mem::swap(&mut pa.row, &mut pb.row);
            std::mem::swap(&mut pa.column, &mut pb.column);
            std::mem::swap(&mut pa.screen_index, &mut pb.screen_index);
            std::mem::swap(&mut pa.rect, &mut pb.rect);
        }
        self.apply_visibility();
        true
    }

    /// Re-densify serials to `0..len` in arena order and re-derive grid
    /// coordinates for `mode`.
    pub fn renumber(&mut self, mode: WindowMode) {
        for (i, pane) in self.panes.iter_mut().enumerate() {
            pane.serial = Serial(i);
            let (row, column, screen) = locate(i, mode);
            pane.row = row;
            pane.column = column;
            pane.screen_index = screen;
        }
        self.show_max = self.show_max.min(self.panes.len());
        self.apply_visibility();
    }

    /// Re-derive every pane's grid coordinates from its serial (mode switch).
    pub fn reposition(&mut self, mode: WindowMode) {
        for pane in &mut self.panes {
            let (row, column, screen) = locate(pane.serial.0, mode);
            pane.row = row;
            pane.column = column;
            pane.screen_index = screen;
        }
    }

    /// Drop whole pages with no panes in use, keeping at least one page's
    /// worth of panes, then renumber and select the first pane.
    ///
    /// `per_screen_in_use[s]` is the number of panes on screen `s` the host
    /// still considers occupied.
    pub fn delete_unused_screens(&mut self, per_screen_in_use: &[usize], mode: WindowMode) {
        let dropped: Vec<usize> = per_screen_in_use
            .iter()
            .enumerate()
            .filter(|&(_, &used)| used == 0)
            .map(|(s, _)| s)
            .collect();
        if dropped.is_empty() {
            return;
        }
        let per_screen = mode.panes_per_screen();
        self.panes.retain(|p| !dropped.contains(&p.screen_index));
        if self.panes.len() < per_screen {
            // Floor: one page's worth survives even a fully-unused wall.
            let have = self.panes.len();
            self.panes.extend((have..per_screen).map(|s| Pane::at(s, mode)));
        }
        debug!(dropped = dropped.len(), remaining = self.panes.len(), "dropped unused screens");
        self.renumber(mode);
        self.select(Serial(0));
    }

    /// Set [`PaneFlags::USER_VISIBLE`] on exactly the panes of `page`.
    pub fn mark_user_visible(&mut self, page: usize) {
        for pane in &mut self.panes {
            pane.flags.set(PaneFlags::USER_VISIBLE, pane.screen_index == page);
        }
    }

    fn index_of(&self, serial: Serial) -> Option<usize> {
        self.panes.iter().position(|p| p.serial == serial)
    }

    fn apply_visibility(&mut self) {
        for pane in &mut self.panes {
            pane.flags.set(PaneFlags::VISIBLE, pane.serial.0 < self.show_max);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_selects_first_pane() {
        let reg = PaneRegistry::new(16, WindowMode::Four);
        assert_eq!(reg.len(), 16);
        assert_eq!(reg.selected(), Some(Serial(0)));
        assert_eq!(reg.visible_panes().count(), 16);
    }

    #[test]
    fn selection_is_exclusive() {
        let mut reg = PaneRegistry::new(4, WindowMode::Four);
        assert!(reg.select(Serial(2)));
        assert_eq!(reg.selected(), Some(Serial(2)));
        assert_eq!(reg.iter().filter(|p| p.is_selected()).count(), 1);

        // Re-selecting is a no-op.
        assert!(!reg.select(Serial(2)));
    }

    #[test]
    fn select_absent_pane_is_a_noop() {
        let mut reg = PaneRegistry::new(4, WindowMode::Four);
        reg.select(Serial(2));
        // Release-mode behavior: the call changes nothing.
        let snapshot = reg.clone();
        if !cfg!(debug_assertions) {
            reg.select(Serial(99));
            assert_eq!(reg.selected(), snapshot.selected());
        }
    }

    #[test]
    fn shrink_reselects_first_pane() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        reg.select(Serial(12));
        reg.resize(8, WindowMode::Four);
        assert_eq!(reg.len(), 8);
        assert_eq!(reg.selected(), Some(Serial(0)));
        assert_eq!(reg.show_max(), 8);
    }

    #[test]
    fn grow_appends_dense_serials() {
        let mut reg = PaneRegistry::new(4, WindowMode::Four);
        reg.resize(9, WindowMode::Nine);
        assert_eq!(reg.len(), 9);
        let serials: Vec<_> = reg.iter().map(|p| p.serial.0).collect();
        assert_eq!(serials, (0..9).collect::<Vec<_>>());
        // show_max tracked the old full count.
        assert_eq!(reg.show_max(), 9);
    }

    #[test]
    fn show_max_hides_tail_serials() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        reg.set_show_max(6);
        assert_eq!(reg.visible_panes().count(), 6);
        assert!(reg.pane(Serial(5)).unwrap().is_visible());
        assert!(!reg.pane(Serial(6)).unwrap().is_visible());
    }

    #[test]
    fn swap_moves_flags_but_not_geometry() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        reg.select(Serial(1));
        let rect1 = reg.pane(Serial(1)).unwrap().rect;
        let rect3 = reg.pane(Serial(3)).unwrap().rect;

        assert!(reg.swap_positions(Serial(1), Serial(3)));

        // Selection travelled to cell 3; cell geometry stayed put.
        assert_eq!(reg.selected(), Some(Serial(3)));
        let p1 = reg.pane(Serial(1)).unwrap();
        let p3 = reg.pane(Serial(3)).unwrap();
        assert_eq!(p1.rect, rect1);
        assert_eq!(p3.rect, rect3);
        assert_eq!((p1.row, p1.column), (0, 1));
        assert_eq!((p3.row, p3.column), (1, 1));
    }

    #[test]
    fn swap_with_self_or_absent_fails() {
        let mut reg = PaneRegistry::new(4, WindowMode::Four);
        assert!(!reg.swap_positions(Serial(1), Serial(1)));
        if !cfg!(debug_assertions) {
            assert!(!reg.swap_positions(Serial(1), Serial(9)));
        }
    }

    #[test]
    fn delete_unused_screens_renumbers_densely() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        // Screens 1 and 3 unused.
        reg.delete_unused_screens(&[2, 0, 1, 0], WindowMode::Four);
        assert_eq!(reg.len(), 8);
        let serials: Vec<_> = reg.iter().map(|p| p.serial.0).collect();
        assert_eq!(serials, (0..8).collect::<Vec<_>>());
        assert_eq!(reg.selected(), Some(Serial(0)));
        // Former screen 2 is now screen 1.
        assert_eq!(reg.pane(Serial(4)).unwrap().screen_index, 1);
    }

    #[test]
    fn delete_unused_screens_keeps_one_page() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        reg.delete_unused_screens(&[0, 0, 0, 0], WindowMode::Four);
        assert_eq!(reg.len(), WindowMode::Four.panes_per_screen());
        assert_eq!(reg.selected(), Some(Serial(0)));
    }

    mod properties {
        use super::*;
        use crate::layout::GridLayoutEngine;
        use proptest::prelude::*;
        use vwall_core::config::WallConfig;
        use vwall_core::mode::Orientation;

        proptest! {
            // Swapping the same pair twice restores every pane exactly:
            // serial, coordinates, rect, and flags.
            #[test]
            fn double_swap_is_identity(a in 0usize..16, b in 0usize..16) {
                let mut reg = PaneRegistry::new(16, WindowMode::Four);
                GridLayoutEngine::new(1000.0, 800.0, Orientation::Landscape)
                    .layout_pass(&mut reg, WindowMode::Four, &WallConfig::default());
                reg.select(Serial(a));
                let before: Vec<Pane> = reg.iter().copied().collect();

                if reg.swap_positions(Serial(a), Serial(b)) {
                    reg.swap_positions(Serial(b), Serial(a));
                }

                let after: Vec<Pane> = reg.iter().copied().collect();
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn user_visibility_follows_page() {
        let mut reg = PaneRegistry::new(16, WindowMode::Four);
        reg.mark_user_visible(2);
        let on_page: Vec<_> = reg
            .iter()
            .filter(|p| p.flags.contains(PaneFlags::USER_VISIBLE))
            .map(|p| p.serial.0)
            .collect();
        assert_eq!(on_page, vec![8, 9, 10, 11]);
    }
}
