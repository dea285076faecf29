//! # Gizmo Traits
//!
//! The seam between the frame loop and a manipulation widget. A
//! [`Manipulator`] reads the (already remapped) pointer, may edit the shared
//! [`Transform`], and produces handle geometry for the viewport it was called
//! for.

use crate::gfx::camera::ViewCamera;
use crate::gfx::scene::{GizmoVertex, Transform};
use crate::viewport::input::PointerState;

/// Operation a gizmo applies while dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoMode {
    /// Move along world axes or in the view plane
    Translate,
    /// Stretch along the object's local axes
    Scale,
}

/// Camera and pixel size of the target the gizmo is drawn into.
///
/// Pointer positions handed to a [`Manipulator`] are in the same pixel space.
#[derive(Debug, Clone, Copy)]
pub struct GizmoView {
    pub camera: ViewCamera,
    pub target_size: (f32, f32),
}

impl GizmoView {
    pub fn new(camera: ViewCamera, target_size: (u32, u32)) -> Self {
        Self {
            camera,
            target_size: (target_size.0 as f32, target_size.1 as f32),
        }
    }
}

/// Handle triangles ready for upload
#[derive(Debug, Clone, Default)]
pub struct GizmoDrawData {
    pub vertices: Vec<GizmoVertex>,
    pub indices: Vec<u32>,
}

impl GizmoDrawData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

pub trait Manipulator {
    /// Processes pointer input for one viewport. Returns `true` when
    /// `transform` was modified.
    fn update(
        &mut self,
        mode: GizmoMode,
        transform: &mut Transform,
        pointer: &PointerState,
        view: &GizmoView,
    ) -> bool;

    /// Handle geometry for the current hover/drag state
    fn geometry(&self, mode: GizmoMode, transform: &Transform, view: &GizmoView) -> GizmoDrawData;

    /// Update followed by geometry, in one call per active viewport
    fn draw(
        &mut self,
        mode: GizmoMode,
        transform: &mut Transform,
        pointer: &PointerState,
        view: &GizmoView,
    ) -> GizmoDrawData {
        self.update(mode, transform, pointer, view);
        self.geometry(mode, transform, view)
    }

    fn is_dragging(&self) -> bool;

    /// Global handle size multiplier
    fn set_size(&mut self, size: f32);
}
