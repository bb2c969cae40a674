#![forbid(unsafe_code)]

//! Grid: paged multi-pane layout with gesture-driven control.
//!
//! # Role in the wall
//! `vwall-grid` turns the primitives of `vwall-core` into a working video
//! wall: a registry of panes split 1/4/9/16 per screen, horizontal paging
//! with swipe and snap, drag-to-reorder with edge page navigation, and
//! per-pane pinch zoom, all reported to the host through an explicit
//! callback surface.
//!
//! # Primary responsibilities
//! - **PaneRegistry**: pane identities, selection, visibility, swaps.
//! - **GridLayoutEngine**: serial → cell mapping and pixel rectangles.
//! - **PagingController**: scroll offset, page snapping, mode switching.
//! - **PaneSwapEngine / EdgeSwipeNavigator**: long-press drag behavior.
//! - **WindowGridController**: the composition hosts actually drive.
//!
//! # How it fits in the system
//! Hosts normalize their input into `vwall_core::TouchEvent`, feed it to
//! [`WindowGridController::handle_event`](controller::WindowGridController::handle_event)
//! plus a frame tick, and render panes at the rects and scroll offset the
//! controller reports.

pub mod controller;
pub mod edge;
pub mod events;
pub mod layout;
pub mod pane;
pub mod paging;
pub mod swap;

pub use controller::{PaneSurface, WindowGridController};
pub use events::{DragAnimation, WallCallbacks};
pub use layout::{GridLayoutEngine, locate};
pub use pane::{Pane, PaneFlags, PaneRegistry, Serial};
pub use paging::PagingController;
