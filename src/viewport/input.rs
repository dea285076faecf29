//! Pointer tracking and per-viewport coordinate remapping
//!
//! The window delivers cursor positions in window pixels, but the gizmo of a
//! viewport works in the pixel space of that viewport's offscreen target.
//! [`PointerState::remap`] installs the conversion for the duration of one
//! gizmo call and hands back a [`RemapGuard`] that removes it again.

use std::ops::Deref;

use cgmath::Vector2;

use super::layout::Rect;

/// Affine pointer override: `apply(p) = (p + offset) * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTransform {
    pub offset: Vector2<f32>,
    pub scale: Vector2<f32>,
}

impl PointerTransform {
    pub const IDENTITY: PointerTransform = PointerTransform {
        offset: Vector2::new(0.0, 0.0),
        scale: Vector2::new(1.0, 1.0),
    };

    /// Window space to the local pixel space of a `target_size` texture
    /// covering `rect`
    pub fn for_viewport(rect: &Rect, target_size: (u32, u32)) -> Self {
        Self {
            offset: -rect.origin(),
            scale: Vector2::new(
                target_size.0 as f32 / rect.width,
                target_size.1 as f32 / rect.height,
            ),
        }
    }

    pub fn apply(&self, p: Vector2<f32>) -> Vector2<f32> {
        let shifted = p + self.offset;
        Vector2::new(shifted.x * self.scale.x, shifted.y * self.scale.y)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for PointerTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Index of the first rectangle containing `pointer`, if any.
///
/// `None` pointer means the cursor is outside the window.
pub fn select_active(rects: &[Rect], pointer: Option<Vector2<f32>>) -> Option<usize> {
    let pointer = pointer?;
    rects.iter().position(|rect| rect.contains(pointer))
}

/// Primary-button pointer state fed from window events
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    window_position: Option<Vector2<f32>>,
    down: bool,
    pressed: bool,
    released: bool,
    transform: PointerTransform,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        self.window_position = Some(Vector2::new(x, y));
    }

    pub fn cursor_left(&mut self) {
        self.window_position = None;
    }

    pub fn set_primary_button(&mut self, down: bool) {
        if down && !self.down {
            self.pressed = true;
        }
        if !down && self.down {
            self.released = true;
        }
        self.down = down;
    }

    /// Clears the per-frame press/release edges
    pub fn end_frame(&mut self) {
        self.pressed = false;
        self.released = false;
    }

    /// Position in window pixels, ignoring any remap
    pub fn window_position(&self) -> Option<Vector2<f32>> {
        self.window_position
    }

    /// Position as seen through the installed remap
    pub fn position(&self) -> Option<Vector2<f32>> {
        self.window_position.map(|p| self.transform.apply(p))
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Primary button went down this frame
    pub fn was_pressed(&self) -> bool {
        self.pressed
    }

    /// Primary button went up this frame
    pub fn was_released(&self) -> bool {
        self.released
    }

    pub fn transform(&self) -> PointerTransform {
        self.transform
    }

    /// Installs the window-to-target remap for `rect` until the guard drops
    pub fn remap(&mut self, rect: &Rect, target_size: (u32, u32)) -> RemapGuard<'_> {
        self.transform = PointerTransform::for_viewport(rect, target_size);
        RemapGuard { state: self }
    }
}

/// Scoped pointer remap; restores the identity transform on drop
pub struct RemapGuard<'a> {
    state: &'a mut PointerState,
}

impl Deref for RemapGuard<'_> {
    type Target = PointerState;

    fn deref(&self) -> &PointerState {
        self.state
    }
}

impl Drop for RemapGuard<'_> {
    fn drop(&mut self) {
        self.state.transform = PointerTransform::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::layout::ViewportLayout;
    use rand::Rng;

    fn quadrants() -> Vec<Rect> {
        ViewportLayout::grid((960, 540), 4, 2).unwrap()
    }

    #[test]
    fn test_pointer_in_bottom_right_maps_to_local() {
        let rects = quadrants();
        let mut pointer = PointerState::new();
        pointer.cursor_moved(500.0, 300.0);

        let active = select_active(&rects, pointer.window_position());
        assert_eq!(active, Some(3));

        let guard = pointer.remap(&rects[3], (480, 270));
        assert_eq!(guard.position(), Some(Vector2::new(20.0, 30.0)));
    }

    #[test]
    fn test_remap_scales_to_larger_target() {
        let rects = quadrants();
        let mut pointer = PointerState::new();
        pointer.cursor_moved(500.0, 300.0);

        let guard = pointer.remap(&rects[3], rects[3].target_size(2.0));
        assert_eq!(guard.position(), Some(Vector2::new(40.0, 60.0)));
    }

    #[test]
    fn test_guard_restores_identity() {
        let rects = quadrants();
        let mut pointer = PointerState::new();
        pointer.cursor_moved(100.0, 100.0);
        {
            let guard = pointer.remap(&rects[0], (480, 270));
            assert_eq!(guard.position(), Some(Vector2::new(100.0, 100.0)));
        }
        assert!(pointer.transform().is_identity());

        {
            let _guard = pointer.remap(&rects[3], (480, 270));
        }
        assert_eq!(pointer.position(), Some(Vector2::new(100.0, 100.0)));
    }

    #[test]
    fn test_guard_restores_identity_on_panic() {
        let rects = quadrants();
        let mut pointer = PointerState::new();
        pointer.cursor_moved(700.0, 400.0);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = pointer.remap(&rects[3], (480, 270));
            panic!("gizmo failed mid-call");
        }));
        assert!(result.is_err());
        assert!(pointer.transform().is_identity());
    }

    #[test]
    fn test_no_remap_leaks_between_viewports() {
        let rects = quadrants();
        let mut rng = rand::rng();
        let mut pointer = PointerState::new();

        for _ in 0..500 {
            pointer.cursor_moved(rng.random_range(0.0..960.0), rng.random_range(0.0..540.0));
            let active = select_active(&rects, pointer.window_position());

            for (i, rect) in rects.iter().enumerate() {
                // Each viewport starts from the identity
                assert!(pointer.transform().is_identity());
                if active == Some(i) {
                    let guard = pointer.remap(rect, (480, 270));
                    let local = guard.position().unwrap();
                    assert!(local.x >= 0.0 && local.x < 480.0);
                    assert!(local.y >= 0.0 && local.y < 270.0);
                }
            }
            assert!(pointer.transform().is_identity());
        }
    }

    #[test]
    fn test_at_most_one_viewport_is_active() {
        let rects = quadrants();
        let mut rng = rand::rng();

        for _ in 0..1000 {
            let p = Vector2::new(rng.random_range(-100.0..1060.0), rng.random_range(-100.0..640.0));
            let containing = rects.iter().filter(|r| r.contains(p)).count();
            let inside = p.x >= 0.0 && p.x < 960.0 && p.y >= 0.0 && p.y < 540.0;

            assert!(containing <= 1);
            assert_eq!(select_active(&rects, Some(p)).is_some(), inside);
        }
        assert_eq!(select_active(&rects, None), None);
    }

    #[test]
    fn test_overlapping_rects_resolve_to_first() {
        let rects = [
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(50.0, 50.0, 100.0, 100.0),
        ];
        assert_eq!(select_active(&rects, Some(Vector2::new(75.0, 75.0))), Some(0));
        assert_eq!(select_active(&rects, Some(Vector2::new(120.0, 120.0))), Some(1));
    }

    #[test]
    fn test_button_edges_last_one_frame() {
        let mut pointer = PointerState::new();
        pointer.set_primary_button(true);
        assert!(pointer.was_pressed() && pointer.is_down());
        pointer.end_frame();
        assert!(!pointer.was_pressed() && pointer.is_down());

        pointer.set_primary_button(false);
        assert!(pointer.was_released() && !pointer.is_down());
        pointer.end_frame();
        assert!(!pointer.was_released());
    }

    #[test]
    fn test_cursor_left_clears_position() {
        let mut pointer = PointerState::new();
        pointer.cursor_moved(10.0, 10.0);
        pointer.cursor_left();
        assert_eq!(pointer.position(), None);
    }
}
