//! # Gizmo System
//!
//! Interactive manipulation widgets drawn into a viewport's offscreen target.
//!
//! ## Key Components
//!
//! - [`Manipulator`] - Per-viewport update/draw interface
//! - [`TransformGizmo`] - Translate and axis-scale handles for the shared transform
//! - [`GizmoView`] - Camera and pixel size of the target being drawn into
//!
//! ## Usage
//!
//! ```no_run
//! use quadview::gfx::gizmos::{GizmoMode, GizmoView, Manipulator, TransformGizmo};
//! use quadview::gfx::camera::ViewCamera;
//! use quadview::gfx::scene::Transform;
//! use quadview::viewport::input::PointerState;
//! use cgmath::Vector3;
//!
//! let mut gizmo = TransformGizmo::new(4.0);
//! let mut transform = Transform::IDENTITY;
//! let pointer = PointerState::new();
//! let view = GizmoView::new(ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0)), (480, 270));
//! let handles = gizmo.draw(GizmoMode::Translate, &mut transform, &pointer, &view);
//! ```

pub mod traits;
pub mod transform_gizmo;

pub use traits::{GizmoDrawData, GizmoMode, GizmoView, Manipulator};
pub use transform_gizmo::{GizmoAxis, GizmoHandle, TransformGizmo};
