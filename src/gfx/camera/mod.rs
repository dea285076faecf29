//! Per-viewport cameras
//!
//! Each viewport owns one fixed [`ViewCamera`] looking at the shared object.
//! The camera also provides the screen/world conversions the gizmo needs.

pub mod view_camera;

pub use view_camera::{Projection, ViewCamera, OPENGL_TO_WGPU_MATRIX, TARGET_FLIP_Y_MATRIX};
