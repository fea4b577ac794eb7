// Copyright @yucwang 2026

use super::triangle_mesh::TriangleMesh;

use crate::math::constants::Vector3f;
use crate::math::transform::Transform;

/// The `[-1, 1]^2` square in the local `z = 0` plane, facing `+z`, as two
/// counter-clockwise triangles placed by `to_world`.
pub fn rectangle_mesh(to_world: &Transform) -> TriangleMesh {
    let corners = [
        Vector3f::new(-1.0, -1.0, 0.0),
        Vector3f::new( 1.0, -1.0, 0.0),
        Vector3f::new( 1.0,  1.0, 0.0),
        Vector3f::new(-1.0,  1.0, 0.0),
    ];
    let mut mesh = TriangleMesh::new(corners.to_vec(), Vec::new(), vec![[0, 1, 2], [0, 2, 3]]);
    mesh.apply_transform(to_world);
    mesh
}

#[cfg(test)]
mod tests {
    use super::rectangle_mesh;
    use crate::math::constants::Vector3f;
    use crate::math::transform::Transform;

    #[test]
    fn test_rectangle_area_and_orientation() {
        let mesh = rectangle_mesh(&Transform::scale(&Vector3f::new(2.0, 0.5, 1.0)));
        assert_eq!(mesh.triangle_count(), 2);
        let area: f32 = (0..2).map(|f| mesh.triangle(f).surface_area()).sum();
        assert!((area - 4.0).abs() < 1e-5);
        for f in 0..2 {
            assert!((mesh.triangle(f).geometric_normal() - Vector3f::z()).norm() < 1e-6);
        }
    }

    #[test]
    fn test_rotated_rectangle_faces_down() {
        let flip = Transform::rotate(&Vector3f::x(), 180.0);
        let mesh = rectangle_mesh(&flip);
        assert!((mesh.triangle(0).geometric_normal() + Vector3f::z()).norm() < 1e-5);
    }
}
