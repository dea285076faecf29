//! # Ray Picking Math
//!
//! Geometry helpers for turning a pointer position into world-space motion:
//!
//! 1. **Pointer to Ray**: [`ViewCamera::screen_to_ray`](crate::gfx::camera::ViewCamera::screen_to_ray)
//!    builds a [`Ray`] through a target pixel
//! 2. **Ray vs. Axis**: [`closest_axis_parameter`] finds where the ray passes
//!    nearest to a gizmo axis, which drives axis drags
//! 3. **Ray vs. Plane**: [`Ray::intersect_plane`] drives free (view-plane) drags
//! 4. **Screen-space hit tests**: [`distance_to_segment`] measures how far the
//!    pointer is from a projected handle

use cgmath::{InnerSpace, Vector2, Vector3};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a plane, or `None` when the ray is parallel
    /// to it or the plane lies behind the origin
    pub fn intersect_plane(&self, plane_point: Vector3<f32>, plane_normal: Vector3<f32>) -> Option<f32> {
        let denom = self.direction.dot(plane_normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (plane_point - self.origin).dot(plane_normal) / denom;
        (t >= 0.0).then_some(t)
    }
}

/// Parameter `s` of the point `origin + axis * s` closest to `ray`.
///
/// `axis` must be normalized. Returns `None` when the ray runs (nearly)
/// parallel to the axis, where the closest point is undefined and a drag
/// would jump.
pub fn closest_axis_parameter(ray: &Ray, origin: Vector3<f32>, axis: Vector3<f32>) -> Option<f32> {
    let w = origin - ray.origin;
    let b = axis.dot(ray.direction);
    let denom = 1.0 - b * b;
    if denom < 1e-4 {
        return None;
    }
    let d = axis.dot(w);
    let e = ray.direction.dot(w);
    Some((b * e - d) / denom)
}

/// Distance from point `p` to the 2D segment `a..b`
pub fn distance_to_segment(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.magnitude2();
    if len2 <= f32::EPSILON {
        return (p - a).magnitude();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).magnitude()
}
