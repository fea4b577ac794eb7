// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Pinhole camera looking down its local -Z axis.
pub struct PerspectiveCamera {
    to_world: Transform,
    fov_y_degrees: Float,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    pub fn new(to_world: Transform, fov_y_degrees: Float, aspect: Float) -> Self {
        Self {
            to_world,
            fov_y_degrees,
            tan_half_fov_y: (0.5 * fov_y_degrees.to_radians()).tan(),
            aspect,
            near_clip: 0.0,
            far_clip: Float::MAX,
        }
    }

    pub fn look_at(origin: Vector3f, target: Vector3f, up: Vector3f, fov_y_degrees: Float, aspect: Float) -> Self {
        Self::new(Transform::look_at(&origin, &target, &up), fov_y_degrees, aspect)
    }

    pub fn with_clip(mut self, near_clip: Float, far_clip: Float) -> Self {
        self.near_clip = near_clip.max(0.0);
        self.far_clip = far_clip.max(self.near_clip);
        self
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, -1.0).normalize();
        let origin = self.to_world.apply_point(Vector3f::zeros());
        let dir = self.to_world.apply_vector(d_camera).normalize();

        // Clip distances are measured along the optical axis.
        let inv_z = 1.0 / d_camera.z.abs();
        let near_t = self.near_clip * inv_z;
        let far_t = if self.far_clip == Float::MAX { Float::MAX } else { self.far_clip * inv_z };
        Ray3f::new(origin, dir, Some(near_t), Some(far_t))
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera [fov_y={} deg, aspect={}]", self.fov_y_degrees, self.aspect)
    }
}
