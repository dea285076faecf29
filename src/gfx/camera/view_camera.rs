use cgmath::*;

use crate::gfx::picking::Ray;

/// Remaps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`. Arguments are
/// column-major: `z' = 0.5 * z + 0.5 * w`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Clip-space Y flip used while drawing into offscreen targets, whose rows
/// are stored bottom-up. The compositor flips them back.
#[rustfmt::skip]
pub const TARGET_FLIP_Y_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0,  0.0, 0.0, 0.0,
    0.0, -1.0, 0.0, 0.0,
    0.0,  0.0, 1.0, 0.0,
    0.0,  0.0, 0.0, 1.0,
);

/// Projection kind of a [`ViewCamera`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    /// `fovy` is read as the visible height in world units
    Orthographic,
}

/// Fixed look-at camera owned by one viewport.
///
/// Unlike an orbit camera it has no controller: position, target and
/// projection are set once when the viewport registry is built.
#[derive(Debug, Clone, Copy)]
pub struct ViewCamera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub projection: Projection,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl ViewCamera {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
            fovy: Deg(45.0),
            projection: Projection::Perspective,
            aspect: 1.0,
            znear: 0.01,
            zfar: 1000.0,
        }
    }

    pub fn with_fovy(mut self, fovy: Deg<f32>) -> Self {
        self.fovy = fovy;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let proj = match self.projection {
            Projection::Perspective => perspective(self.fovy, self.aspect, self.znear, self.zfar),
            Projection::Orthographic => {
                let top = self.fovy.0 * 0.5;
                let right = top * self.aspect;
                ortho(-right, right, -top, top, self.znear, self.zfar)
            }
        };
        OPENGL_TO_WGPU_MATRIX * proj
    }

    /// View-projection used while rendering into a bottom-up offscreen target
    pub fn target_view_projection_matrix(&self) -> Matrix4<f32> {
        TARGET_FLIP_Y_MATRIX * self.build_view_projection_matrix()
    }

    pub fn distance_to(&self, point: Vector3<f32>) -> f32 {
        (point - self.position).magnitude()
    }

    /// World-space height covered by one unit of screen height at `point`.
    ///
    /// Used to keep gizmo handles at a constant on-screen size.
    pub fn world_height_at(&self, point: Vector3<f32>) -> f32 {
        match self.projection {
            Projection::Perspective => {
                let half_fovy: Rad<f32> = (self.fovy * 0.5).into();
                2.0 * self.distance_to(point) * half_fovy.0.tan()
            }
            Projection::Orthographic => self.fovy.0,
        }
    }

    /// Projects a world point into pixel coordinates of a `size` surface
    /// (top-left origin, +y down). `None` if the point is behind the camera.
    pub fn world_to_screen(&self, point: Vector3<f32>, size: (f32, f32)) -> Option<Vector2<f32>> {
        let clip = self.build_view_projection_matrix() * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Vector2::new(
            (ndc_x + 1.0) * 0.5 * size.0,
            (1.0 - ndc_y) * 0.5 * size.1,
        ))
    }

    /// Builds a world-space ray through a pixel of a `size` surface
    pub fn screen_to_ray(&self, screen_pos: Vector2<f32>, size: (f32, f32)) -> Ray {
        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * screen_pos.x) / size.0 - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_pos.y) / size.1; // Flip Y axis

        let inv_view_proj = self
            .build_view_projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);

        // wgpu clip space: near plane at z = 0, far plane at z = 1
        let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, 0.0, 1.0);
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_3d = world_near.truncate() / world_near.w;
        let far_3d = world_far.truncate() / world_far.w;

        Ray::new(near_3d, far_3d - near_3d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_target_projects_to_center() {
        let mut camera = ViewCamera::new(Vector3::new(-5.5, 5.5, 2.0), Vector3::zero());
        camera.resize_projection(480, 270);

        let screen = camera
            .world_to_screen(Vector3::zero(), (480.0, 270.0))
            .expect("origin is in front of the camera");
        assert!(approx(screen.x, 240.0));
        assert!(approx(screen.y, 135.0));
    }

    #[test]
    fn test_frustum_edges_land_on_target_border() {
        let mut camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero());
        camera.resize_projection(480, 270);
        let size = (480.0, 270.0);
        let px = |a: f32, b: f32| (a - b).abs() < 1e-2;

        // 5 units ahead, the frustum is 2 * 5 * tan(fovy / 2) tall
        let half_height = 5.0 * Rad::from(Deg(22.5f32)).0.tan();
        let half_width = half_height * camera.aspect;

        let top = camera.world_to_screen(Vector3::new(0.0, half_height, 0.0), size).unwrap();
        assert!(px(top.x, 240.0) && px(top.y, 0.0));

        let bottom = camera.world_to_screen(Vector3::new(0.0, -half_height, 0.0), size).unwrap();
        assert!(px(bottom.y, 270.0));

        let left = camera.world_to_screen(Vector3::new(-half_width, 0.0, 0.0), size).unwrap();
        assert!(px(left.x, 0.0) && px(left.y, 135.0));

        let right = camera.world_to_screen(Vector3::new(half_width, 0.0, 0.0), size).unwrap();
        assert!(px(right.x, 480.0));
    }

    #[test]
    fn test_clip_w_is_view_distance() {
        let camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero());
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(clip.w, 5.0));
    }

    #[test]
    fn test_depth_stays_in_unit_range_and_grows_with_distance() {
        let camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero());
        let vp = camera.build_view_projection_matrix();
        let depth = |z: f32| {
            let clip = vp * Vector4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };

        let near = depth(4.0);
        let target = depth(0.0);
        let far = depth(-50.0);
        for d in [near, target, far] {
            assert!((0.0..=1.0).contains(&d), "depth {} outside [0, 1]", d);
        }
        assert!(near < target && target < far);
    }

    #[test]
    fn test_point_behind_camera_is_not_projected() {
        let camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero());
        assert!(camera
            .world_to_screen(Vector3::new(0.0, 0.0, 10.0), (100.0, 100.0))
            .is_none());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = ViewCamera::new(Vector3::new(2.5, 2.5, 2.0), Vector3::zero());
        camera.resize_projection(480, 270);

        let ray = camera.screen_to_ray(Vector2::new(240.0, 135.0), (480.0, 270.0));
        let expected = (Vector3::zero() - camera.position).normalize();
        assert!(approx(ray.direction.dot(expected), 1.0));
    }

    #[test]
    fn test_screen_ray_round_trips_projection() {
        let mut camera = ViewCamera::new(Vector3::new(-2.5, 2.5, 2.0), Vector3::zero());
        camera.resize_projection(480, 270);

        let point = Vector3::new(0.7, -0.3, 0.4);
        let screen = camera.world_to_screen(point, (480.0, 270.0)).unwrap();
        let ray = camera.screen_to_ray(screen, (480.0, 270.0));
        let to_point = (point - ray.origin).normalize();
        assert!(approx(ray.direction.dot(to_point), 1.0));
    }

    #[test]
    fn test_target_matrix_flips_only_y() {
        let camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero());
        let p = Vector3::new(0.5, 0.5, 0.0).extend(1.0);
        let normal = camera.build_view_projection_matrix() * p;
        let flipped = camera.target_view_projection_matrix() * p;
        assert!(approx(normal.x, flipped.x));
        assert!(approx(normal.y, -flipped.y));
        assert!(approx(normal.z, flipped.z));
    }

    #[test]
    fn test_orthographic_world_height_is_fovy() {
        let camera = ViewCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero())
            .with_projection(Projection::Orthographic)
            .with_fovy(Deg(10.0));
        assert!(approx(camera.world_height_at(Vector3::zero()), 10.0));
    }
}
