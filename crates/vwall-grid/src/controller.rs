#![forbid(unsafe_code)]

//! The top-level grid controller.
//!
//! [`WindowGridController`] composes everything: the pane registry, layout
//! engine, gesture classifier, paging, swap and edge engines, and the
//! per-pane zoom controllers. Hosts feed it normalized touch events plus a
//! frame tick and react through [`WallCallbacks`].
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Instant;
//! use vwall_core::{Orientation, WallConfig};
//! use vwall_grid::controller::WindowGridController;
//!
//! let config = WallConfig::default();
//! let mut grid = WindowGridController::new(
//!     config, 1920.0, 1080.0, Orientation::Landscape, Instant::now(),
//! ).unwrap();
//! grid.callbacks_mut().on_page_changed(|(page, _, _)| {
//!     println!("now on page {page}");
//! });
//! // loop: grid.handle_event(&event, Instant::now());
//! //       grid.on_tick(Instant::now());
//! ```
//!
//! # Invariants
//!
//! 1. All processing is synchronous on the caller's thread; no callback is
//!    invoked after `handle_event`/`on_tick` returns.
//! 2. A pane-count change arriving mid-gesture is deferred: the in-flight
//!    gesture completes against pre-change geometry, then the resize and
//!    relayout apply on session end.
//! 3. Feature switches disable their action without disturbing the gesture
//!    state machine.
//! 4. When the touched pane's surface reports an active zoom or an alternate
//!    gesture, the grid does not interpret the session at all; events flow
//!    to the pane's zoom controller only.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};
use vwall_core::config::{ConfigError, WallConfig};
use vwall_core::event::{TouchEvent, TouchPhase};
use vwall_core::geometry::PointF;
use vwall_core::gesture::{GestureClassifier, GestureEvent, TouchMode};
use vwall_core::mode::{Orientation, WindowMode};
use vwall_core::zoom::{PinchZoomController, ZoomEvent};

use crate::events::{DragAnimation, WallCallbacks};
use crate::layout::GridLayoutEngine;
use crate::pane::{PaneRegistry, Serial};
use crate::paging::PagingController;
use crate::swap::PaneSwapEngine;
use crate::edge::EdgeSwipeNavigator;

/// Sentinel classifier target for touches that hit no pane.
const NO_TARGET: u32 = u32::MAX;

/// Host-implemented view into pane surfaces.
///
/// The grid queries this before interpreting a touch session; panes running
/// their own interaction (digital zoom, PTZ-style gestures) keep the events
/// to themselves.
pub trait PaneSurface {
    /// The pane is digitally zoomed in; the grid must not intercept.
    fn is_zoomed(&self, _pane: Serial) -> bool {
        false
    }
    /// The pane runs its own gesture interaction right now.
    fn is_alternate_gesture_active(&self, _pane: Serial) -> bool {
        false
    }
    /// The pane's surface supports pinch zoom.
    fn is_zoom_capable(&self, _pane: Serial) -> bool {
        false
    }
    /// Per-pane double-tap permission.
    fn double_tap_enabled(&self, _pane: Serial) -> bool {
        true
    }
    /// Per-pane permission for the drag enlarge animation.
    fn animator_scale_enabled(&self, _pane: Serial) -> bool {
        true
    }
}

/// Surface with every default: no zoom, no deferral.
#[derive(Debug, Default)]
struct InertSurface;

impl PaneSurface for InertSurface {}

/// Gesture-driven paged pane grid.
pub struct WindowGridController {
    config: WallConfig,
    registry: PaneRegistry,
    layout: GridLayoutEngine,
    classifier: GestureClassifier,
    paging: PagingController,
    swap: PaneSwapEngine,
    edge: EdgeSwipeNavigator,
    zoom: HashMap<Serial, PinchZoomController>,
    callbacks: WallCallbacks,
    surface: Box<dyn PaneSurface>,

    touch_enabled: bool,
    scroll_enabled: bool,
    drag_enabled: bool,
    double_tap_enabled: bool,

    /// Mode to restore when a double-tap leaves single-pane view.
    last_multi_mode: Option<WindowMode>,
    /// A touch session is live (primary pointer down), whether the grid or
    /// the pane's own surface interprets it.
    session_active: bool,
    /// Pane the current touch session started on.
    session_pane: Option<Serial>,
    /// Session is owned by the pane's own interaction, not the grid.
    deferred_session: bool,
    /// Events are being forwarded to the session pane's zoom controller.
    zoom_session: bool,
    /// Drag actually started (long-press acted on, switches permitting).
    drag_active: bool,
    /// Pane-count change waiting for the session to end.
    pending_pane_count: Option<usize>,
}

impl WindowGridController {
    /// Build a grid for a container of `width × height` pixels.
    pub fn new(
        config: WallConfig,
        width: f32,
        height: f32,
        orientation: Orientation,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = config.default_mode;
        let mut registry = PaneRegistry::new(config.max_pane_count, mode);
        let layout = GridLayoutEngine::new(width, height, orientation);
        layout.layout_pass(&mut registry, mode, &config);
        registry.mark_user_visible(0);
        let paging = PagingController::new(
            mode,
            registry.show_max(),
            width,
            config.page_switch_threshold_px,
            config.scroll_duration,
            now,
        );
        Ok(Self {
            classifier: GestureClassifier::new(&config),
            edge: EdgeSwipeNavigator::new(&config),
            swap: PaneSwapEngine::new(),
            zoom: HashMap::new(),
            callbacks: WallCallbacks::new(),
            surface: Box::new(InertSurface),
            config,
            registry,
            layout,
            paging,
            touch_enabled: true,
            scroll_enabled: true,
            drag_enabled: true,
            double_tap_enabled: true,
            last_multi_mode: None,
            session_active: false,
            session_pane: None,
            deferred_session: false,
            zoom_session: false,
            drag_active: false,
            pending_pane_count: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn registry(&self) -> &PaneRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> WindowMode {
        self.paging.mode()
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.paging.current_page()
    }

    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.paging.screen_count()
    }

    /// Horizontal scroll offset the renderer should apply.
    #[must_use]
    pub fn scroll_offset(&self, now: Instant) -> f32 {
        self.paging.offset(now)
    }

    #[must_use]
    pub fn selected(&self) -> Option<Serial> {
        self.registry.selected()
    }

    #[must_use]
    pub fn touch_mode(&self) -> TouchMode {
        self.classifier.mode()
    }

    pub fn callbacks_mut(&mut self) -> &mut WallCallbacks {
        &mut self.callbacks
    }

    /// Install the host's pane-surface view.
    pub fn set_surface(&mut self, surface: Box<dyn PaneSurface>) {
        self.surface = surface;
    }

    /// A pane's zoom controller, if one has been created for it.
    #[must_use]
    pub fn pane_zoom(&self, pane: Serial) -> Option<&PinchZoomController> {
        self.zoom.get(&pane)
    }

    // -- switches -----------------------------------------------------------

    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.touch_enabled = enabled;
    }

    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_enabled = enabled;
    }

    pub fn set_swap_enabled(&mut self, enabled: bool) {
        self.swap.set_enabled(enabled, &mut self.registry);
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    pub fn set_double_tap_enabled(&mut self, enabled: bool) {
        self.double_tap_enabled = enabled;
    }

    // -- host operations ----------------------------------------------------

    /// Switch the split mode, keeping the selected pane on screen.
    pub fn set_window_mode(&mut self, mode: WindowMode, now: Instant) {
        let from = self.paging.mode();
        if self
            .paging
            .switch_mode(mode, now, &mut self.registry, &mut self.callbacks)
        {
            if from != WindowMode::One {
                self.last_multi_mode = Some(from);
            }
            self.relayout();
        }
    }

    /// Jump to `page` instantly and select its first pane.
    pub fn snap_to_screen(&mut self, page: usize, now: Instant) {
        self.paging
            .snap_to_screen(page, false, now, &mut self.registry, &mut self.callbacks);
        self.select_first_on_page();
    }

    /// Select the first pane of the current page.
    pub fn select_first_on_page(&mut self) {
        let first = self.paging.first_pane_of(self.paging.current_page());
        if self.registry.select(first) {
            WallCallbacks::emit(
                &mut self.callbacks.selected,
                (self.paging.current_page(), first),
            );
        }
    }

    /// Resize the wall to `count` panes.
    ///
    /// Mid-gesture the change is deferred until the session ends; the count
    /// is clamped to `1..=hard_pane_ceiling`.
    pub fn set_pane_count(&mut self, count: usize, now: Instant) {
        let count = count.clamp(1, self.config.hard_pane_ceiling);
        if self.session_active {
            debug!(count, "pane count change deferred until session end");
            self.pending_pane_count = Some(count);
            return;
        }
        self.apply_pane_count(count, now);
    }

    /// Limit the shown panes to the first `count`.
    pub fn set_show_window_max_count(&mut self, count: usize, now: Instant) {
        self.paging
            .set_show_window_max_count(count, now, &mut self.registry, &mut self.callbacks);
        self.relayout();
    }

    /// Cap the number of pages shown (`None` lifts the cap).
    pub fn set_show_screen_max_page(&mut self, cap: Option<usize>, now: Instant) {
        self.paging
            .set_show_screen_max_page(cap, now, &mut self.registry, &mut self.callbacks);
        self.relayout();
    }

    /// Drop pages with no panes in use (`per_screen_in_use[s]` = occupied
    /// panes on screen `s`), then renumber and relayout.
    pub fn delete_unused_screens(&mut self, per_screen_in_use: &[usize], now: Instant) {
        self.registry
            .delete_unused_screens(per_screen_in_use, self.paging.mode());
        self.paging.recompute_screen_count(&self.registry);
        self.paging.set_current_page(
            self.paging.current_page(),
            now,
            &mut self.registry,
            &mut self.callbacks,
        );
        self.relayout();
    }

    /// Replace the container geometry (rotation, window resize).
    pub fn set_container(
        &mut self,
        width: f32,
        height: f32,
        orientation: Orientation,
        now: Instant,
    ) {
        self.layout.set_container(width, height, orientation);
        self.paging.set_container_width(width, now);
        self.relayout();
    }

    // -- event pump ---------------------------------------------------------

    /// Process one touch event.
    pub fn handle_event(&mut self, ev: &TouchEvent, now: Instant) {
        if !self.touch_enabled {
            return;
        }
        if ev.phase == TouchPhase::Down {
            self.begin_session(ev);
        }
        if ev.phase == TouchPhase::PointerDown
            && !self.zoom_session
            && matches!(self.classifier.mode(), TouchMode::Normal | TouchMode::Swipe)
            && let Some(pane) = self.session_pane
            && self.surface.is_zoom_capable(pane)
        {
            self.zoom_session = true;
        }

        if self.zoom_session && let Some(pane) = self.session_pane {
            self.forward_to_zoom(pane, ev, now);
        }

        if !self.deferred_session {
            let target = self.session_pane.map_or(NO_TARGET, |s| s.0 as u32);
            for gesture in self.classifier.process(ev, target, now) {
                self.apply_gesture(gesture, now);
            }
        }

        if ev.phase.ends_session() {
            self.end_session(now);
        }
    }

    /// Frame tick: commits deferred taps and reports whether a page scroll
    /// is still animating (the host should keep redrawing while it is).
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if let Some(gesture) = self.classifier.poll(now) {
            self.apply_gesture(gesture, now);
        }
        self.paging.is_scrolling(now)
    }

    // -- internals ----------------------------------------------------------

    fn begin_session(&mut self, ev: &TouchEvent) {
        let Some(primary) = ev.primary() else { return };
        let pane = self.hit_test(primary.pos());
        self.session_active = true;
        self.session_pane = pane;
        self.drag_active = false;
        self.zoom_session = false;
        self.deferred_session = pane.is_some_and(|p| {
            self.surface.is_zoomed(p) || self.surface.is_alternate_gesture_active(p)
        });
        if self.deferred_session {
            trace!(?pane, "session deferred to pane surface");
            self.zoom_session = pane.is_some_and(|p| self.surface.is_zoom_capable(p));
            return;
        }
        if let Some(pane) = pane
            && self.registry.select(pane)
        {
            WallCallbacks::emit(
                &mut self.callbacks.selected,
                (self.paging.current_page(), pane),
            );
        }
    }

    fn end_session(&mut self, now: Instant) {
        self.session_active = false;
        self.session_pane = None;
        self.deferred_session = false;
        self.zoom_session = false;
        if let Some(count) = self.pending_pane_count.take() {
            self.apply_pane_count(count, now);
        }
    }

    fn apply_gesture(&mut self, gesture: GestureEvent, now: Instant) {
        match gesture {
            GestureEvent::LongPressStart { .. } => self.on_long_press_start(),
            GestureEvent::DragMove { dx, dy, pos } => self.on_drag_move(dx, dy, pos, now),
            GestureEvent::DragEnd { .. } => self.on_drag_end(),
            GestureEvent::SwipeMove { scroll_dx } => {
                if self.scroll_enabled {
                    self.paging.drag_by(scroll_dx, now);
                }
            }
            GestureEvent::SwipeEnd { total_dx } => {
                if self.scroll_enabled {
                    self.paging.release_swipe(
                        total_dx,
                        now,
                        &mut self.registry,
                        &mut self.callbacks,
                    );
                }
            }
            GestureEvent::Tap { target, .. } => {
                let pane = Serial(target as usize);
                if self.registry.pane(pane).is_some() {
                    WallCallbacks::emit(
                        &mut self.callbacks.tapped,
                        (self.paging.current_page(), pane),
                    );
                }
            }
            GestureEvent::DoubleTap { target, .. } => self.on_double_tap(Serial(target as usize), now),
        }
    }

    fn on_long_press_start(&mut self) {
        if !self.drag_enabled {
            return;
        }
        let Some(pane) = self.session_pane else { return };
        self.drag_active = true;
        self.swap.begin(pane);
        self.edge.begin();
        let page = self.paging.current_page();
        debug!(%pane, page, "long-press drag start");
        WallCallbacks::emit(&mut self.callbacks.long_pressed, (page, pane));
        if self.surface.animator_scale_enabled(pane) {
            WallCallbacks::emit(
                &mut self.callbacks.drag_animation,
                DragAnimation {
                    pane,
                    scale: self.config.drag_scale,
                    alpha: self.config.drag_alpha,
                    duration: self.config.drag_anim,
                },
            );
        }
    }

    fn on_drag_move(&mut self, dx: f32, dy: f32, pos: PointF, now: Instant) {
        if !self.drag_active {
            return;
        }
        let page = self.paging.current_page();
        self.swap
            .drag_move(dx, dy, page, &mut self.registry, &mut self.callbacks);
        let Some(pane) = self.swap.dragged() else { return };
        let Some(rect) = self.registry.pane(pane).map(|p| p.rect) else {
            return;
        };
        let center = self.layout.page_local(rect, page).center();
        self.edge.drag_move(
            pos.x,
            center,
            pane,
            now,
            self.layout.container_width(),
            &mut self.paging,
            &mut self.registry,
            &mut self.callbacks,
        );
    }

    fn on_drag_end(&mut self) {
        if !self.drag_active {
            return;
        }
        self.drag_active = false;
        let page = self.paging.current_page();
        let dragged = self.swap.dragged();
        self.swap
            .release(page, &mut self.registry, &mut self.callbacks);
        if let Some(pane) = dragged {
            self.edge.finish(pane, &mut self.callbacks);
            if self.surface.animator_scale_enabled(pane) {
                WallCallbacks::emit(
                    &mut self.callbacks.drag_animation,
                    DragAnimation {
                        pane,
                        scale: 1.0,
                        alpha: 1.0,
                        duration: self.config.drag_anim,
                    },
                );
            }
        }
        self.relayout();
    }

    /// Double-tap mode toggle: any multi-pane mode collapses onto the tapped
    /// pane; single-pane view restores the previous multi mode.
    fn on_double_tap(&mut self, pane: Serial, now: Instant) {
        if !self.double_tap_enabled || !self.surface.double_tap_enabled(pane) {
            return;
        }
        if self.registry.pane(pane).is_none() {
            return;
        }
        let from = self.paging.mode();
        let to = if from == WindowMode::One {
            self.last_multi_mode.unwrap_or(WindowMode::Four)
        } else {
            WindowMode::One
        };
        // Selection happened on the first tap's down, so the mode switch
        // lands on the tapped pane's screen.
        self.registry.select(pane);
        self.set_window_mode(to, now);
        WallCallbacks::emit(
            &mut self.callbacks.double_tapped,
            (self.paging.current_page(), pane, from, to),
        );
    }

    fn forward_to_zoom(&mut self, pane: Serial, ev: &TouchEvent, now: Instant) {
        let Some(rect) = self.registry.pane(pane).map(|p| p.rect) else {
            return;
        };
        let viewport = self.layout.page_local(rect, self.paging.current_page());
        let zoom = self.zoom.entry(pane).or_insert_with(|| {
            let mut z = PinchZoomController::new(viewport, &self.config);
            z.set_active(self.surface.is_zoomed(pane));
            z
        });
        let before = zoom.virtual_rect();
        for event in zoom.process(ev, now) {
            match event {
                ZoomEvent::ScaleChanged { raw, scale } => WallCallbacks::emit(
                    &mut self.callbacks.zoom_scale_changed,
                    (pane, raw, scale),
                ),
                ZoomEvent::OpenRequested => {
                    WallCallbacks::emit(&mut self.callbacks.zoom_requested, pane);
                }
                ZoomEvent::Click { .. } => {}
            }
        }
        let after = self.zoom.get(&pane).map(|z| z.virtual_rect());
        if let Some(after) = after
            && after != before
        {
            WallCallbacks::emit(&mut self.callbacks.zoom_rect_changed, (pane, after));
        }
    }

    /// Activate or reset a pane's zoom surface. Hosts call this in response
    /// to the zoom-requested callback (activate) and on zoom-mode exit
    /// (deactivate, which clears the zoom).
    pub fn set_pane_zoom_active(&mut self, pane: Serial, active: bool) {
        let Some(rect) = self.registry.pane(pane).map(|p| p.rect) else {
            debug_assert!(false, "zoom toggle on absent pane {pane}");
            return;
        };
        let viewport = self.layout.page_local(rect, self.paging.current_page());
        let zoom = self
            .zoom
            .entry(pane)
            .or_insert_with(|| PinchZoomController::new(viewport, &self.config));
        zoom.set_active(active);
        if !active {
            zoom.clear();
        }
    }

    fn apply_pane_count(&mut self, count: usize, now: Instant) {
        self.registry.resize(count, self.paging.mode());
        self.paging.recompute_screen_count(&self.registry);
        self.paging.set_current_page(
            self.paging.current_page(),
            now,
            &mut self.registry,
            &mut self.callbacks,
        );
        self.relayout();
    }

    /// Reassign every visible pane's rect and refresh zoom viewports.
    fn relayout(&mut self) {
        let mode = self.paging.mode();
        self.layout.layout_pass(&mut self.registry, mode, &self.config);
        let page = self.paging.current_page();
        for (pane, zoom) in &mut self.zoom {
            let Some(rect) = self.registry.pane(*pane).map(|p| p.rect) else {
                continue;
            };
            let local = self.layout.page_local(rect, page);
            // An unchanged cell preserves the zoom; a moved or resized cell
            // resets it.
            if zoom.viewport() != local {
                zoom.set_viewport(local);
            }
        }
    }

    /// Pane under an on-screen point, honoring the current page offset.
    fn hit_test(&self, pos: PointF) -> Option<Serial> {
        let page = self.paging.current_page();
        let container = PointF::new(pos.x + page as f32 * self.layout.container_width(), pos.y);
        self.registry
            .visible_panes()
            .filter(|p| p.screen_index == page)
            .find(|p| p.rect.contains(container))
            .map(|p| p.serial)
    }
}

impl std::fmt::Debug for WindowGridController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowGridController")
            .field("mode", &self.paging.mode())
            .field("page", &self.paging.current_page())
            .field("screens", &self.paging.screen_count())
            .field("panes", &self.registry.len())
            .field("touch_mode", &self.classifier.mode())
            .finish_non_exhaustive()
    }
}
