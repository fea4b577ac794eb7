// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, RAY_OFFSET};

#[derive(Debug, Clone, Copy)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX)}
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/// Moves a hit point off its surface, along the geometric normal, onto the side
/// the new ray leaves towards.
pub fn offset_ray_origin(p: &Vector3f, face_normal: &Vector3f, dir: &Vector3f) -> Vector3f {
    let side = if face_normal.dot(dir) >= 0.0 { 1.0 } else { -1.0 };
    let scale = RAY_OFFSET * (1.0 + p.amax());
    p + face_normal * (side * scale)
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::{offset_ray_origin, Ray3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let mut ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(v1[1].abs() < 1e-6);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let status1 = ray.update(100.0);
        let status2 = ray.update(105.0);
        assert_eq!(status1, true);
        assert_eq!(status2, false);
    }

    #[test]
    fn test_offset_follows_ray_side() {
        let p = Vector3f::zeros();
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let up = offset_ray_origin(&p, &n, &Vector3f::new(0.3, 0.0, 1.0));
        let down = offset_ray_origin(&p, &n, &Vector3f::new(0.0, 0.2, -1.0));
        assert!(up.z > 0.0);
        assert!(down.z < 0.0);
    }
}
