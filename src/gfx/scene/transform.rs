//! Shared object transform
//!
//! One [`Transform`] is shared by all viewports: every camera looks at the same
//! object, and the gizmo of whichever viewport is active edits it in place.

use cgmath::{Matrix4, Quaternion, Vector3};

/// Translation / rotation / scale of a 3D object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vector3::new(0.0, 0.0, 0.0),
        rotation: Quaternion {
            v: Vector3::new(0.0, 0.0, 0.0),
            s: 1.0,
        },
        scale: Vector3::new(1.0, 1.0, 1.0),
    };

    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// World matrix, composed as T * R * S (scale first, then rotate, then translate)
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translation);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
