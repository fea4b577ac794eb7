// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

/// Hit distance and barycentric coordinates `(b0, b1, b2)` with
/// `p = b0 * p0 + b1 * p1 + b2 * p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: Float,
    pub barycentric: Vector3f,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        Triangle { p0, p1, p2 }
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(&[self.p0, self.p1, self.p2])
    }

    /// Unnormalized normal `(p1 - p0) x (p2 - p0)`; its length is twice the area.
    fn raw_normal(&self) -> Vector3f {
        (self.p1 - self.p0).cross(&(self.p2 - self.p0))
    }

    /// Geometric normal following the counter-clockwise winding. Zero for
    /// degenerate triangles.
    pub fn geometric_normal(&self) -> Vector3f {
        let n = self.raw_normal();
        let len = n.norm();
        if len > 0.0 { n / len } else { Vector3f::zeros() }
    }

    pub fn surface_area(&self) -> Float {
        0.5 * self.raw_normal().norm()
    }

    pub fn point_at(&self, barycentric: &Vector3f) -> Vector3f {
        self.p0 * barycentric.x + self.p1 * barycentric.y + self.p2 * barycentric.z
    }

    /// Uniform point on the triangle. Returns the point and its barycentrics.
    pub fn sample(&self, u: &Vector2f) -> (Vector3f, Vector3f) {
        let bary = square_to_triangle(u);
        (self.point_at(&bary), bary)
    }

    /// Two-sided Möller–Trumbore test against `[ray.min_t, ray.max_t]`.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<TriangleHit> {
        let edge1 = self.p1 - self.p0;
        let edge2 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&edge2);
        let det = edge1.dot(&pvec);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }

        Some(TriangleHit { t, barycentric: Vector3f::new(1.0 - b1 - b2, b1, b2) })
    }

    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box1() {
        let p0 = Vector3f::new(1.0, 1.0, 1.0);
        let p1 = Vector3f::new(1.5, 4.0, -1.0);
        let p2 = Vector3f::new(-1.0, 2.0, 2.5);

        let triangle = Triangle::new(p0, p1, p2);
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_ray_intersection_both_sides() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                                     Vector3f::new(2.0, 2.0, 0.0),
                                     Vector3f::new(2.0, 1.0, 0.0));

        let down = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let up = Ray3f::new(Vector3f::new(1.5, 1.1, -2.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let away = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let outside = Ray3f::new(Vector3f::new(1.5, 2.0, 3.0), Vector3f::new(0.0, 0.0, -1.0), None, None);

        let hit = triangle.ray_intersection(&down).expect("front hit");
        assert!((hit.t - 3.0).abs() < 1e-5);
        let p = triangle.point_at(&hit.barycentric);
        assert!((p - Vector3f::new(1.5, 1.1, 0.0)).norm() < 1e-5);

        assert!(triangle.ray_intersection_t(&up));
        assert!(!triangle.ray_intersection_t(&away));
        assert!(!triangle.ray_intersection_t(&outside));
    }

    #[test]
    fn test_segment_limits() {
        let triangle = Triangle::new(Vector3f::new(-1.0, -1.0, 0.0),
                                     Vector3f::new(1.0, -1.0, 0.0),
                                     Vector3f::new(0.0, 1.0, 0.0));
        let short = Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), None, Some(1.5));
        assert!(triangle.ray_intersection(&short).is_none());
    }

    #[test]
    fn test_area_normal_and_samples() {
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(2.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 2.0, 0.0));
        assert!((triangle.surface_area() - 2.0).abs() < 1e-6);
        assert_eq!(triangle.geometric_normal(), Vector3f::new(0.0, 0.0, 1.0));

        let (p, bary) = triangle.sample(&Vector2f::new(0.3, 0.6));
        assert!((triangle.point_at(&bary) - p).norm() < 1e-6);
        assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 2.0 + 1e-5);

        let degenerate = Triangle::new(Vector3f::zeros(), Vector3f::x(), Vector3f::x() * 2.0);
        assert_eq!(degenerate.surface_area(), 0.0);
        assert_eq!(degenerate.geometric_normal(), Vector3f::zeros());
    }
}
