// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

/// Maps a film position in `[0, 1)^2` (origin at the top-left corner) to a
/// primary ray in world space.
pub trait Sensor: Send + Sync {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
