// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::io::obj_utils;
use crate::io::obj_utils::ObjLoadError;
use crate::math::aabb::AABB;
use crate::math::constants::Vector3f;
use crate::math::transform::Transform;

use std::path::Path;
use std::vec::Vec;

/// Indexed triangle mesh. `normals` is either empty or parallel to
/// `positions`; a zero normal means "use the face normal".
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    positions: Vec<Vector3f>,
    normals:   Vec<Vector3f>,
    faces:     Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vector3f>, normals: Vec<Vector3f>, faces: Vec<[u32; 3]>) -> Self {
        Self { positions, normals, faces }
    }

    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut positions = Vec::with_capacity(triangles.len() * 3);
        let mut faces = Vec::with_capacity(triangles.len());
        for (idx, tri) in triangles.iter().enumerate() {
            let (p0, p1, p2) = tri.vertices();
            positions.extend_from_slice(&[p0, p1, p2]);
            let base = (idx * 3) as u32;
            faces.push([base, base + 1, base + 2]);
        }
        Self { positions, normals: Vec::new(), faces }
    }

    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, ObjLoadError> {
        let soup = obj_utils::load_obj_triangles(path)?;
        Ok(Self::from_soup(soup))
    }

    pub fn from_obj_str(input: &str) -> Result<Self, ObjLoadError> {
        let obj_set = obj_utils::load_obj_from_str(input)?;
        Ok(Self::from_soup(obj_utils::flatten_triangles(&obj_set)))
    }

    fn from_soup(soup: obj_utils::ObjTriangles) -> Self {
        let faces = (0..soup.triangle_count() as u32)
            .map(|f| [3 * f, 3 * f + 1, 3 * f + 2])
            .collect();
        Self { positions: soup.positions, normals: soup.normals, faces }
    }

    pub fn positions(&self) -> &[Vector3f] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector3f] {
        &self.normals
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn triangle(&self, face: usize) -> Triangle {
        let [a, b, c] = self.faces[face];
        Triangle::new(self.positions[a as usize],
                      self.positions[b as usize],
                      self.positions[c as usize])
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(&self.positions)
    }

    pub fn apply_transform(&mut self, transform: &Transform) {
        for p in &mut self.positions {
            *p = transform.apply_point(*p);
        }
        for n in &mut self.normals {
            if n.norm_squared() > 0.0 {
                *n = transform.apply_normal(*n).normalize();
            }
        }
    }
}
