// Copyright @yucwang 2023

use crate::core::material::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

/// Nearest-hit record of one ray, compact enough to be stored per pixel and
/// re-resolved later against the same scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub face_indices: [u32; 3],
    pub face_index: u32,
    /// `(b0, b1, b2)` weights of the three vertices.
    pub barycoord: Vector3f,
    /// `+1` when the ray arrived on the side the face normal points to.
    pub side: Float,
    /// Unoriented geometric normal of the face.
    pub face_normal: Vector3f,
    pub dist: Float,
}

impl Default for SurfaceHit {
    fn default() -> Self {
        Self {
            face_indices: [0; 3],
            face_index: 0,
            barycoord: Vector3f::zeros(),
            side: 1.0,
            face_normal: Vector3f::zeros(),
            dist: 0.0,
        }
    }
}

impl SurfaceHit {
    pub fn is_front_face(&self) -> bool {
        self.side > 0.0
    }
}

/// Shading view of a [`SurfaceHit`]. Normals are oriented toward the side the
/// surface was seen from.
pub struct SurfaceRecord<'a> {
    pub p: Vector3f,
    pub face_normal: Vector3f,
    pub shading_normal: Vector3f,
    pub frame: Frame,
    pub material_index: u32,
    pub material: &'a Material,
    /// Emission toward the viewer; black when the back face was hit.
    pub emission: RGBSpectrum,
}

impl<'a> SurfaceRecord<'a> {
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_world(v)
    }
}
