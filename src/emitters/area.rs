// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::shapes::triangle::Triangle;

/// One triangle of an emissive material.
#[derive(Debug, Clone, Copy)]
pub struct EmissiveTriangle {
    pub face: u32,
    pub material: u32,
    pub triangle: Triangle,
    pub normal: Vector3f,
    pub area: Float,
}

/// Point drawn on an emissive triangle. `pdf_area` accounts for the uniform
/// triangle selection.
#[derive(Debug, Clone, Copy)]
pub struct AreaLightSample {
    pub point: Vector3f,
    pub normal: Vector3f,
    pub face: u32,
    pub material: u32,
    pub pdf_area: Float,
}

/// All emissive triangles of a scene. A triangle is picked uniformly, then a
/// point uniformly on its surface.
#[derive(Debug, Clone, Default)]
pub struct AreaLights {
    triangles: Vec<EmissiveTriangle>,
}

impl AreaLights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a triangle. Degenerate triangles cannot be sampled and are
    /// skipped; returns whether the triangle was added.
    pub fn push(&mut self, face: u32, material: u32, triangle: Triangle) -> bool {
        let area = triangle.surface_area();
        if !(area > 0.0) || !area.is_finite() {
            log::warn!("Skipping zero-area emissive triangle {}", face);
            return false;
        }
        self.triangles.push(EmissiveTriangle {
            face,
            material,
            normal: triangle.geometric_normal(),
            triangle,
            area,
        });
        true
    }

    pub fn count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[EmissiveTriangle] {
        &self.triangles
    }

    pub fn sample(&self, u_select: Float, u: &Vector2f) -> Option<AreaLightSample> {
        if self.triangles.is_empty() {
            return None;
        }
        let count = self.triangles.len();
        let idx = ((u_select * count as Float) as usize).min(count - 1);
        let light = &self.triangles[idx];
        let (point, _) = light.triangle.sample(u);
        Some(AreaLightSample {
            point,
            normal: light.normal,
            face: light.face,
            material: light.material,
            pdf_area: self.pdf_area(light.area),
        })
    }

    /// Area density of a point on an emissive triangle of the given area.
    pub fn pdf_area(&self, area: Float) -> Float {
        if self.triangles.is_empty() || !(area > 0.0) {
            return 0.0;
        }
        1.0 / (self.triangles.len() as Float * area)
    }
}

/// Converts an area density at `light_point` into a solid-angle density seen
/// from `ref_point`. Zero when the light faces away or the points coincide.
pub fn area_to_solid_angle_pdf(pdf_area: Float,
                               ref_point: &Vector3f,
                               light_point: &Vector3f,
                               light_normal: &Vector3f) -> Float {
    let to_light = light_point - ref_point;
    let dist2 = to_light.norm_squared();
    if !(dist2 > 0.0) || !(pdf_area > 0.0) {
        return 0.0;
    }
    let cos_light = -light_normal.dot(&(to_light / dist2.sqrt()));
    if !(cos_light > 0.0) {
        return 0.0;
    }
    let pdf = pdf_area * dist2 / cos_light;
    if pdf.is_finite() { pdf } else { 0.0 }
}
