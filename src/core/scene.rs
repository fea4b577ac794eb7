// Copyright @yucwang 2026

use crate::core::bvh::BVH;
use crate::core::interaction::{SurfaceHit, SurfaceRecord};
use crate::core::material::Material;
use crate::emitters::area::AreaLights;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::TriangleMesh;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    MaterialOutOfRange { material: u32, table_size: usize },
    VertexOutOfRange { face: usize, vertex: u32, vertex_count: usize },
    EmptyMaterialTable,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::MaterialOutOfRange { material, table_size } =>
                write!(f, "material index {} out of range (table has {} entries)", material, table_size),
            SceneError::VertexOutOfRange { face, vertex, vertex_count } =>
                write!(f, "face {} references vertex {} but the mesh has {} vertices", face, vertex, vertex_count),
            SceneError::EmptyMaterialTable =>
                write!(f, "scene has geometry but no materials"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Accumulates meshes and materials into an immutable [`Scene`].
#[derive(Default)]
pub struct SceneBuilder {
    positions: Vec<Vector3f>,
    normals: Vec<Vector3f>,
    faces: Vec<[u32; 3]>,
    face_materials: Vec<u32>,
    materials: Vec<Material>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    /// Appends every face of `mesh` with the given material.
    pub fn add_mesh(&mut self, mesh: &TriangleMesh, material: u32) -> Result<(), SceneError> {
        if self.materials.is_empty() {
            return Err(SceneError::EmptyMaterialTable);
        }
        if material as usize >= self.materials.len() {
            return Err(SceneError::MaterialOutOfRange { material, table_size: self.materials.len() });
        }
        let vertex_count = mesh.positions().len();
        for (face, indices) in mesh.faces().iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|v| **v as usize >= vertex_count) {
                return Err(SceneError::VertexOutOfRange { face, vertex, vertex_count });
            }
        }

        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(mesh.positions());
        if mesh.normals().len() == vertex_count {
            self.normals.extend_from_slice(mesh.normals());
        } else {
            self.normals.extend(std::iter::repeat(Vector3f::zeros()).take(vertex_count));
        }
        self.faces.extend(mesh.faces().iter().map(|f| [f[0] + base, f[1] + base, f[2] + base]));
        self.face_materials.extend(std::iter::repeat(material).take(mesh.faces().len()));
        Ok(())
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        if self.materials.is_empty() && !self.faces.is_empty() {
            return Err(SceneError::EmptyMaterialTable);
        }

        let triangles: Vec<Triangle> = self.faces.iter()
            .map(|[a, b, c]| Triangle::new(self.positions[*a as usize],
                                           self.positions[*b as usize],
                                           self.positions[*c as usize]))
            .collect();

        let mut lights = AreaLights::new();
        for (face, tri) in triangles.iter().enumerate() {
            let material = self.face_materials[face];
            if self.materials[material as usize].is_emissive() {
                lights.push(face as u32, material, *tri);
            }
        }

        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        let bvh = BVH::new(prim_bounds, prim_centroids);
        let bounds = bvh.bounds();

        log::info!("Scene built: {} vertices, {} triangles, {} materials, {} emissive triangles",
                   self.positions.len(), self.faces.len(), self.materials.len(), lights.count());

        Ok(Scene {
            positions: self.positions,
            normals: self.normals,
            faces: self.faces,
            face_materials: self.face_materials,
            materials: self.materials,
            triangles,
            lights,
            bvh,
            bounds,
        })
    }
}

/// Read-only geometry, material and light snapshot.
pub struct Scene {
    positions: Vec<Vector3f>,
    normals: Vec<Vector3f>,
    faces: Vec<[u32; 3]>,
    face_materials: Vec<u32>,
    materials: Vec<Material>,
    triangles: Vec<Triangle>,
    lights: AreaLights,
    bvh: BVH,
    bounds: AABB,
}

impl Scene {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, index: u32) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    pub fn face_material(&self, face: u32) -> Option<u32> {
        self.face_materials.get(face as usize).copied()
    }

    pub fn triangle(&self, face: u32) -> Option<&Triangle> {
        self.triangles.get(face as usize)
    }

    pub fn lights(&self) -> &AreaLights {
        &self.lights
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Nearest hit along `ray` within its segment.
    pub fn trace(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let (face, hit) = self.bvh.ray_intersection(ray, |prim_idx, r| {
            self.triangles[prim_idx].ray_intersection(r).map(|h| (h, h.t))
        })?;
        let face_normal = self.triangles[face].geometric_normal();
        let side = if face_normal.dot(&ray.dir()) <= 0.0 { 1.0 } else { -1.0 };
        Some(SurfaceHit {
            face_indices: self.faces[face],
            face_index: face as u32,
            barycoord: hit.barycentric,
            side,
            face_normal,
            dist: hit.t,
        })
    }

    /// Whether anything blocks `ray` within its segment.
    pub fn occluded(&self, ray: &Ray3f) -> bool {
        self.bvh.ray_intersection_t(ray, |prim_idx, r| self.triangles[prim_idx].ray_intersection_t(r))
    }

    /// Re-resolves a stored hit. `None` when the hit does not belong to this
    /// scene.
    pub fn surface_record(&self, hit: &SurfaceHit) -> Option<SurfaceRecord<'_>> {
        let material_index = self.face_material(hit.face_index)?;
        let material = self.material(material_index)?;
        let [a, b, c] = hit.face_indices;
        let p0 = self.positions.get(a as usize)?;
        let p1 = self.positions.get(b as usize)?;
        let p2 = self.positions.get(c as usize)?;
        let bary = hit.barycoord;
        let p = p0 * bary.x + p1 * bary.y + p2 * bary.z;

        let face_normal = hit.face_normal * hit.side.signum();
        let shading_normal = self.interpolated_normal(&hit.face_indices, &bary)
            .map(|n| if n.dot(&face_normal) < 0.0 { -n } else { n })
            .unwrap_or(face_normal);

        let emission = if hit.is_front_face() { material.emission() } else { RGBSpectrum::default() };

        Some(SurfaceRecord {
            p,
            face_normal,
            shading_normal,
            frame: Frame::from_normal(&shading_normal),
            material_index,
            material,
            emission,
        })
    }

    fn interpolated_normal(&self, indices: &[u32; 3], bary: &Vector3f) -> Option<Vector3f> {
        let mut n = Vector3f::zeros();
        for (k, idx) in indices.iter().enumerate() {
            let vn = self.normals.get(*idx as usize)?;
            if vn.norm_squared() == 0.0 {
                return None;
            }
            n += vn * bary[k];
        }
        let len = n.norm();
        if len > 1e-8 { Some(n / len) } else { None }
    }

    /// Area of the given face when it is an emitter, used to evaluate the light
    /// sampling density of points reached by other strategies.
    pub fn emitter_area(&self, face: u32) -> Option<Float> {
        let material = self.material(self.face_material(face)?)?;
        if !material.is_emissive() {
            return None;
        }
        let area = self.triangle(face)?.surface_area();
        if area > 0.0 { Some(area) } else { None }
    }
}
