// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Parallel projection of a `2 * half_height * aspect` by `2 * half_height`
/// window, looking down the local -Z axis.
pub struct OrthographicCamera {
    to_world: Transform,
    half_height: Float,
    aspect: Float,
}

impl OrthographicCamera {
    pub fn new(to_world: Transform, half_height: Float, aspect: Float) -> Self {
        Self { to_world, half_height, aspect }
    }
}

impl Sensor for OrthographicCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let local = Vector3f::new((2.0 * u.x - 1.0) * self.half_height * self.aspect,
                                  (1.0 - 2.0 * u.y) * self.half_height,
                                  0.0);
        let origin = self.to_world.apply_point(local);
        let dir = self.to_world.apply_vector(Vector3f::new(0.0, 0.0, -1.0));
        Ray3f::new(origin, dir, None, None)
    }

    fn describe(&self) -> String {
        format!("OrthographicCamera [half_height={}, aspect={}]", self.half_height, self.aspect)
    }
}
