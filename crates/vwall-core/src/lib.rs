#![forbid(unsafe_code)]

//! Core: touch events, gesture classification, scroll animation, and zoom.
//!
//! # Role in the wall
//! `vwall-core` is the input layer. It owns the normalized touch event
//! types, the gesture state machine that turns raw pointer traffic into
//! semantic events, and the two pieces of continuous motion the grid needs:
//! the page [`Scroller`](scroller::Scroller) and the per-pane
//! [`PinchZoomController`](zoom::PinchZoomController).
//!
//! # Primary responsibilities
//! - **TouchEvent**: canonical multi-pointer input events.
//! - **GestureClassifier**: tap / double-tap / long-press drag / swipe
//!   disambiguation with injected time.
//! - **Scroller**: ease-out offset animation for page transitions.
//! - **PinchZoomController**: per-pane scale and pan with cover clamping.
//! - **WallConfig**: thresholds, durations, and display metrics.
//!
//! # How it fits in the system
//! The grid layer (`vwall-grid`) consumes these types to drive pane layout,
//! paging, and reordering. Nothing in this crate knows about panes or
//! screens; it deals only in pointers, offsets, and rectangles.

pub mod config;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod mode;
pub mod scroller;
pub mod zoom;

pub use config::{ConfigError, Metrics, WallConfig};
pub use event::{TouchEvent, TouchPhase, TouchPoint};
pub use geometry::{PointF, RectF, clamp_cover};
pub use gesture::{GestureClassifier, GestureEvent, TouchMode};
pub use mode::{Orientation, WindowMode};
pub use scroller::Scroller;
pub use zoom::{PinchZoomController, ZoomEvent};
