//! # Transform Gizmo
//!
//! Three axis handles (plus a centre handle in translate mode) anchored at
//! the object's translation. Handles are hit-tested in target pixels and
//! dragged with ray/axis math in world space, so a drag that starts in one
//! viewport keeps working when the pointer crosses into another.

use cgmath::{InnerSpace, Vector2, Vector3};

use super::traits::{GizmoDrawData, GizmoMode, GizmoView, Manipulator};
use crate::gfx::picking::{closest_axis_parameter, distance_to_segment, Ray};
use crate::gfx::scene::{GizmoVertex, Transform};
use crate::viewport::input::PointerState;

/// Handle length per unit of size, as a fraction of the view height
const HANDLE_SCALE: f32 = 0.05;
/// Pointer distance (target pixels) within which an axis handle is hovered
const AXIS_HIT_RADIUS: f32 = 8.0;
const CENTER_HIT_RADIUS: f32 = 10.0;
const SHAFT_THICKNESS: f32 = 0.025;
const TIP_SIZE: f32 = 0.08;
const CENTER_SIZE: f32 = 0.07;
const MIN_SCALE: f32 = 0.01;

const HIGHLIGHT: [f32; 4] = [1.0, 0.85, 0.1, 1.0];
const CENTER_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn index(self) -> usize {
        match self {
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }

    fn unit(self) -> Vector3<f32> {
        match self {
            GizmoAxis::X => Vector3::unit_x(),
            GizmoAxis::Y => Vector3::unit_y(),
            GizmoAxis::Z => Vector3::unit_z(),
        }
    }

    fn color(self) -> [f32; 4] {
        match self {
            GizmoAxis::X => [0.9, 0.16, 0.2, 1.0],
            GizmoAxis::Y => [0.3, 0.85, 0.2, 1.0],
            GizmoAxis::Z => [0.2, 0.4, 0.95, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoHandle {
    Axis(GizmoAxis),
    /// Free movement in the view plane
    Center,
}

#[derive(Debug, Clone, Copy)]
enum DragKind {
    Axis {
        axis: GizmoAxis,
        direction: Vector3<f32>,
        start_param: f32,
    },
    Plane {
        normal: Vector3<f32>,
        start_hit: Vector3<f32>,
    },
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    mode: GizmoMode,
    kind: DragKind,
    start: Transform,
    handle_length: f32,
}

impl DragState {
    fn handle(&self) -> GizmoHandle {
        match self.kind {
            DragKind::Axis { axis, .. } => GizmoHandle::Axis(axis),
            DragKind::Plane { .. } => GizmoHandle::Center,
        }
    }
}

/// Translate/scale manipulator for the shared object transform
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    size: f32,
    hovered: Option<GizmoHandle>,
    drag: Option<DragState>,
}

impl TransformGizmo {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            hovered: None,
            drag: None,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn hovered(&self) -> Option<GizmoHandle> {
        self.hovered
    }

    /// Handle being dragged, if any
    pub fn active_handle(&self) -> Option<GizmoHandle> {
        self.drag.map(|drag| drag.handle())
    }

    /// World-space handle length that keeps the gizmo a constant size on screen
    pub fn handle_length(&self, origin: Vector3<f32>, view: &GizmoView) -> f32 {
        self.size * HANDLE_SCALE * view.camera.world_height_at(origin)
    }

    fn axis_direction(mode: GizmoMode, axis: GizmoAxis, transform: &Transform) -> Vector3<f32> {
        match mode {
            GizmoMode::Translate => axis.unit(),
            GizmoMode::Scale => (transform.rotation * axis.unit()).normalize(),
        }
    }

    fn hit_test(
        &self,
        mode: GizmoMode,
        transform: &Transform,
        pointer: Vector2<f32>,
        view: &GizmoView,
    ) -> Option<GizmoHandle> {
        let origin = transform.translation;
        let screen_origin = view.camera.world_to_screen(origin, view.target_size)?;

        if mode == GizmoMode::Translate && (pointer - screen_origin).magnitude() <= CENTER_HIT_RADIUS {
            return Some(GizmoHandle::Center);
        }

        let length = self.handle_length(origin, view);
        GizmoAxis::ALL
            .iter()
            .filter_map(|&axis| {
                let tip = origin + Self::axis_direction(mode, axis, transform) * length;
                let screen_tip = view.camera.world_to_screen(tip, view.target_size)?;
                let distance = distance_to_segment(pointer, screen_origin, screen_tip);
                (distance <= AXIS_HIT_RADIUS).then_some((axis, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| GizmoHandle::Axis(axis))
    }

    fn begin_drag(
        &self,
        mode: GizmoMode,
        handle: GizmoHandle,
        transform: &Transform,
        ray: &Ray,
        view: &GizmoView,
    ) -> Option<DragState> {
        let origin = transform.translation;
        let kind = match handle {
            GizmoHandle::Axis(axis) => {
                let direction = Self::axis_direction(mode, axis, transform);
                let start_param = closest_axis_parameter(ray, origin, direction)?;
                DragKind::Axis {
                    axis,
                    direction,
                    start_param,
                }
            }
            GizmoHandle::Center => {
                let normal = (view.camera.target - view.camera.position).normalize();
                let t = ray.intersect_plane(origin, normal)?;
                DragKind::Plane {
                    normal,
                    start_hit: ray.point_at(t),
                }
            }
        };

        Some(DragState {
            mode,
            kind,
            start: *transform,
            handle_length: self.handle_length(origin, view),
        })
    }

    fn apply_drag(drag: &DragState, ray: &Ray, transform: &mut Transform) -> bool {
        let origin = drag.start.translation;
        let updated = match (drag.mode, drag.kind) {
            (
                GizmoMode::Translate,
                DragKind::Axis {
                    direction,
                    start_param,
                    ..
                },
            ) => {
                let Some(param) = closest_axis_parameter(ray, origin, direction) else {
                    return false;
                };
                Transform {
                    translation: origin + direction * (param - start_param),
                    ..drag.start
                }
            }
            (
                GizmoMode::Scale,
                DragKind::Axis {
                    axis,
                    direction,
                    start_param,
                },
            ) => {
                let Some(param) = closest_axis_parameter(ray, origin, direction) else {
                    return false;
                };
                let factor = 1.0 + (param - start_param) / drag.handle_length;
                let mut scale = drag.start.scale;
                scale[axis.index()] = (drag.start.scale[axis.index()] * factor).max(MIN_SCALE);
                Transform {
                    scale,
                    ..drag.start
                }
            }
            (_, DragKind::Plane { normal, start_hit }) => {
                let Some(t) = ray.intersect_plane(start_hit, normal) else {
                    return false;
                };
                Transform {
                    translation: origin + (ray.point_at(t) - start_hit),
                    ..drag.start
                }
            }
        };

        let changed = updated != *transform;
        *transform = updated;
        changed
    }

    fn handle_color(&self, handle: GizmoHandle, base: [f32; 4]) -> [f32; 4] {
        let highlighted = match self.drag {
            Some(drag) => drag.handle() == handle,
            None => self.hovered == Some(handle),
        };
        if highlighted {
            HIGHLIGHT
        } else {
            base
        }
    }
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Manipulator for TransformGizmo {
    fn update(
        &mut self,
        mode: GizmoMode,
        transform: &mut Transform,
        pointer: &PointerState,
        view: &GizmoView,
    ) -> bool {
        let Some(position) = pointer.position() else {
            self.hovered = None;
            return false;
        };
        let ray = view.camera.screen_to_ray(position, view.target_size);

        if let Some(drag) = self.drag {
            if pointer.is_down() {
                return Self::apply_drag(&drag, &ray, transform);
            }
            log::debug!("gizmo drag on {:?} ended", drag.handle());
            self.drag = None;
        }

        self.hovered = self.hit_test(mode, transform, position, view);
        if pointer.was_pressed() {
            if let Some(handle) = self.hovered {
                self.drag = self.begin_drag(mode, handle, transform, &ray, view);
                if self.drag.is_some() {
                    log::debug!("gizmo drag on {:?} started ({:?})", handle, mode);
                }
            }
        }
        false
    }

    fn geometry(&self, mode: GizmoMode, transform: &Transform, view: &GizmoView) -> GizmoDrawData {
        let mut data = GizmoDrawData::default();
        let origin = transform.translation;
        let length = self.handle_length(origin, view);

        for axis in GizmoAxis::ALL {
            let direction = Self::axis_direction(mode, axis, transform);
            let color = self.handle_color(GizmoHandle::Axis(axis), axis.color());
            let (side, up) = perpendicular_basis(direction);

            let shaft_half = length * SHAFT_THICKNESS * 0.5;
            push_box(
                &mut data,
                origin + direction * (length * 0.5),
                [direction * (length * 0.5), side * shaft_half, up * shaft_half],
                color,
            );

            let tip_half = length * TIP_SIZE * 0.5;
            push_box(
                &mut data,
                origin + direction * length,
                [direction * tip_half, side * tip_half, up * tip_half],
                color,
            );
        }

        if mode == GizmoMode::Translate {
            let half = length * CENTER_SIZE * 0.5;
            push_box(
                &mut data,
                origin,
                [
                    Vector3::unit_x() * half,
                    Vector3::unit_y() * half,
                    Vector3::unit_z() * half,
                ],
                self.handle_color(GizmoHandle::Center, CENTER_COLOR),
            );
        }

        data
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn set_size(&mut self, size: f32) {
        self.size = size;
    }
}

/// Two unit vectors completing `direction` to an orthonormal basis
fn perpendicular_basis(direction: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if direction.y.abs() < 0.9 {
        Vector3::unit_y()
    } else {
        Vector3::unit_x()
    };
    let side = direction.cross(helper).normalize();
    let up = side.cross(direction).normalize();
    (side, up)
}

/// Appends a box centred at `center` whose half-extents are the three
/// (possibly non-axis-aligned) vectors of `half_axes`
fn push_box(data: &mut GizmoDrawData, center: Vector3<f32>, half_axes: [Vector3<f32>; 3], color: [f32; 4]) {
    let base = data.vertices.len() as u32;
    let [a, b, c] = half_axes;

    for i in 0..8 {
        let sa = if i & 1 == 0 { -1.0 } else { 1.0 };
        let sb = if i & 2 == 0 { -1.0 } else { 1.0 };
        let sc = if i & 4 == 0 { -1.0 } else { 1.0 };
        let p = center + a * sa + b * sb + c * sc;
        data.vertices.push(GizmoVertex {
            position: [p.x, p.y, p.z],
            color,
        });
    }

    #[rustfmt::skip]
    const FACES: [u32; 36] = [
        0, 2, 1, 1, 2, 3, // -a
        4, 5, 6, 5, 7, 6, // +a
        0, 1, 4, 1, 5, 4, // -b
        2, 6, 3, 3, 6, 7, // +b
        0, 4, 2, 2, 4, 6, // -c
        1, 3, 5, 3, 7, 5, // +c
    ];
    data.indices.extend(FACES.iter().map(|i| base + i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::ViewCamera;

    const TARGET: (u32, u32) = (480, 270);

    /// Camera on +Z looking at the origin: +X is screen-right, +Y screen-up
    fn front_view() -> GizmoView {
        let mut camera = ViewCamera::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0));
        camera.resize_projection(TARGET.0, TARGET.1);
        GizmoView::new(camera, TARGET)
    }

    fn press_at(pointer: &mut PointerState, x: f32, y: f32) {
        pointer.cursor_moved(x, y);
        pointer.set_primary_button(true);
    }

    #[test]
    fn test_dragging_x_handle_moves_only_x() {
        let view = front_view();
        let mut gizmo = TransformGizmo::new(4.0);
        let mut transform = Transform::IDENTITY;
        let mut pointer = PointerState::new();

        // Screen centre is (240, 135); the X handle runs to the right
        press_at(&mut pointer, 270.0, 135.0);
        assert!(!gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert_eq!(gizmo.active_handle(), Some(GizmoHandle::Axis(GizmoAxis::X)));
        pointer.end_frame();

        pointer.cursor_moved(300.0, 150.0);
        assert!(gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert!(transform.translation.x > 0.5);
        assert_eq!(transform.translation.y, 0.0);
        assert_eq!(transform.translation.z, 0.0);
        assert_eq!(transform.scale, Transform::IDENTITY.scale);
        pointer.end_frame();

        // Release ends the drag; later motion is ignored
        pointer.set_primary_button(false);
        let moved = transform;
        gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view);
        assert!(!gizmo.is_dragging());
        pointer.end_frame();

        pointer.cursor_moved(400.0, 135.0);
        assert!(!gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert_eq!(transform, moved);
    }

    #[test]
    fn test_pointer_away_from_handles_does_nothing() {
        let view = front_view();
        let mut gizmo = TransformGizmo::new(4.0);
        let mut transform = Transform::IDENTITY;
        let mut pointer = PointerState::new();

        press_at(&mut pointer, 50.0, 50.0);
        assert!(!gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert_eq!(gizmo.hovered(), None);
        assert!(!gizmo.is_dragging());

        pointer.end_frame();
        pointer.cursor_moved(300.0, 135.0);
        assert!(!gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert!(transform.is_identity());
    }

    #[test]
    fn test_hover_highlights_without_pressing() {
        let view = front_view();
        let mut gizmo = TransformGizmo::new(4.0);
        let mut transform = Transform::IDENTITY;
        let mut pointer = PointerState::new();

        // The Y handle runs up the screen
        pointer.cursor_moved(240.0, 110.0);
        gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view);
        assert_eq!(gizmo.hovered(), Some(GizmoHandle::Axis(GizmoAxis::Y)));
        assert!(!gizmo.is_dragging());

        let data = gizmo.geometry(GizmoMode::Translate, &transform, &view);
        assert!(data.vertices.iter().any(|v| v.color == HIGHLIGHT));
    }

    #[test]
    fn test_center_handle_moves_in_view_plane() {
        let view = front_view();
        let mut gizmo = TransformGizmo::new(4.0);
        let mut transform = Transform::IDENTITY;
        let mut pointer = PointerState::new();

        press_at(&mut pointer, 240.0, 135.0);
        gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view);
        assert_eq!(gizmo.active_handle(), Some(GizmoHandle::Center));
        pointer.end_frame();

        pointer.cursor_moved(200.0, 100.0);
        assert!(gizmo.update(GizmoMode::Translate, &mut transform, &pointer, &view));
        assert!(transform.translation.x < 0.0);
        assert!(transform.translation.y > 0.0);
        assert!(transform.translation.z.abs() < 1e-4);
    }

    #[test]
    fn test_scale_mode_stretches_one_axis() {
        let view = front_view();
        let mut gizmo = TransformGizmo::new(4.0);
        let mut transform = Transform::IDENTITY;
        let mut pointer = PointerState::new();

        press_at(&mut pointer, 270.0, 135.0);
        gizmo.update(GizmoMode::Scale, &mut transform, &pointer, &view);
        pointer.end_frame();

        pointer.cursor_moved(300.0, 135.0);
        assert!(gizmo.update(GizmoMode::Scale, &mut transform, &pointer, &view));
        assert!(transform.scale.x > 1.0);
        assert_eq!(transform.scale.y, 1.0);
        assert_eq!(transform.scale.z, 1.0);
        assert_eq!(transform.translation, Transform::IDENTITY.translation);
    }

    #[test]
    fn test_geometry_has_center_only_in_translate_mode() {
        let view = front_view();
        let gizmo = TransformGizmo::new(4.0);
        let transform = Transform::IDENTITY;

        let translate = gizmo.geometry(GizmoMode::Translate, &transform, &view);
        let scale = gizmo.geometry(GizmoMode::Scale, &transform, &view);
        // Shaft + tip per axis, 36 indices per box
        assert_eq!(scale.indices.len(), 3 * 2 * 36);
        assert_eq!(translate.indices.len(), scale.indices.len() + 36);
        assert!(translate
            .indices
            .iter()
            .all(|&i| (i as usize) < translate.vertices.len()));
    }

    #[test]
    fn test_set_size_scales_handles() {
        let view = front_view();
        let mut gizmo = TransformGizmo::default();
        let small = gizmo.handle_length(Vector3::new(0.0, 0.0, 0.0), &view);
        gizmo.set_size(4.0);
        let large = gizmo.handle_length(Vector3::new(0.0, 0.0, 0.0), &view);
        assert!((large / small - 4.0).abs() < 1e-4);
    }
}
