// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, Vector4f, Matrix4f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    /// Singular matrices fall back to an identity inverse.
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity()) }
    }

    pub fn translate(offset: &Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(offset))
    }

    pub fn scale(factors: &Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(factors))
    }

    /// Rotation by `angle_deg` degrees around `axis`.
    pub fn rotate(axis: &Vector3f, angle_deg: Float) -> Self {
        let norm = axis.norm();
        if norm <= 0.0 {
            return Self::default();
        }
        let axis_angle = axis / norm * angle_deg.to_radians();
        Self::new(Matrix4f::new_rotation(axis_angle))
    }

    /// Camera-to-world transform for a camera at `origin` looking at `target`.
    /// The camera looks down its local -Z axis with +Y up.
    pub fn look_at(origin: &Vector3f, target: &Vector3f, up: &Vector3f) -> Self {
        let back = (origin - target).normalize();
        let mut right = up.cross(&back);
        if right.norm_squared() <= 1e-12 {
            // `up` is parallel to the view direction; pick any perpendicular.
            let helper = if back.x.abs() < 0.9 { Vector3f::x() } else { Vector3f::y() };
            right = helper.cross(&back);
        }
        let right = right.normalize();
        let true_up = back.cross(&right);

        let mut matrix = Matrix4f::identity();
        for row in 0..3 {
            matrix[(row, 0)] = right[row];
            matrix[(row, 1)] = true_up[row];
            matrix[(row, 2)] = back[row];
            matrix[(row, 3)] = origin[row];
        }
        Self::new(matrix)
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    /// `self` applied after `first`.
    pub fn compose(&self, first: &Transform) -> Self {
        Self { matrix: self.matrix * first.matrix,
               inv_matrix: first.inv_matrix * self.inv_matrix }
    }

    pub fn inverse(&self) -> Self {
        Self { matrix: self.inv_matrix, inv_matrix: self.matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.matrix * Vector4f::new(p.x, p.y, p.z, 1.0);
        let w = if h.w != 0.0 { h.w } else { 1.0 };
        Vector3f::new(h.x / w, h.y / w, h.z / w)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    // Normal transformation is different from point transformation.
    // Before transformation, we have n^Tx = 0
    // After transformation, we have (Sn)^T(Mx) = 0
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0).transpose() * n
    }
}
