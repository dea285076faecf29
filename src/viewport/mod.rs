//! # Viewports
//!
//! Splitting the window into viewports, routing the pointer to the active
//! one, and compositing their offscreen targets back into the window.
//!
//! - [`layout`] - Grid rectangles and per-viewport camera specs
//! - [`registry`] - Owner of every viewport's GPU target
//! - [`input`] - Pointer state, active-viewport selection and remapping
//! - [`compositor`] - Flipped blits of targets into the window

pub mod compositor;
pub mod input;
pub mod layout;
pub mod registry;

pub use compositor::Compositor;
pub use input::{select_active, PointerState, PointerTransform, RemapGuard};
pub use layout::{Rect, ViewportLayout, ViewportSpec};
pub use registry::{Viewport, ViewportRegistry};
