// Copyright @yucwang 2026

//! Small scenes shared by the estimator and renderer tests.

use crate::core::material::Material;
use crate::core::scene::{Scene, SceneBuilder};
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::null::NullBSDF;
use crate::materials::roughconductor::RoughConductorBSDF;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::shapes::rectangle::rectangle_mesh;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::TriangleMesh;

use std::sync::Arc;

pub const OCCLUDED_LIGHT_MATERIAL: u32 = 2;

/// Emitter of the lit floor scene; wound so that it faces `-z`.
pub fn light_triangle() -> Triangle {
    Triangle::new(Vector3f::new(-0.5, -0.5, 1.0),
                  Vector3f::new(-0.5, 0.5, 1.0),
                  Vector3f::new(0.5, -0.5, 1.0))
}

fn diffuse(name: &str, albedo: Float) -> Material {
    Material::new(name, Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(albedo))))
}

fn floor() -> TriangleMesh {
    rectangle_mesh(&Transform::scale(&Vector3f::new(10.0, 10.0, 1.0)))
}

/// Diffuse floor at `z = 0` under a single emissive triangle at `z = 1`.
pub fn lit_floor_scene(albedo: Float, radiance: Float) -> Scene {
    let mut builder = SceneBuilder::new();
    let floor_material = builder.add_material(diffuse("floor", albedo));
    let light_material = builder.add_material(diffuse("light", 0.0).with_emission(RGBSpectrum::splat(radiance)));
    builder.add_mesh(&floor(), floor_material).expect("floor");
    builder.add_mesh(&TriangleMesh::from_triangles(&[light_triangle()]), light_material).expect("light");
    builder.build().expect("scene")
}

/// Same layout as [`lit_floor_scene`] with a white GGX conductor as floor.
pub fn glossy_floor_scene(alpha: Float, radiance: Float) -> Scene {
    let mut builder = SceneBuilder::new();
    let metal = Material::new("metal", Arc::new(RoughConductorBSDF::new(alpha, RGBSpectrum::splat(1.0))));
    let floor_material = builder.add_material(metal);
    let light_material = builder.add_material(diffuse("light", 0.0).with_emission(RGBSpectrum::splat(radiance)));
    builder.add_mesh(&floor(), floor_material).expect("floor");
    builder.add_mesh(&TriangleMesh::from_triangles(&[light_triangle()]), light_material).expect("light");
    builder.build().expect("scene")
}

pub fn dark_floor_scene() -> Scene {
    let mut builder = SceneBuilder::new();
    let m = builder.add_material(diffuse("floor", 0.5));
    builder.add_mesh(&floor(), m).expect("floor");
    builder.build().expect("scene")
}

pub fn null_floor_scene() -> Scene {
    let mut builder = SceneBuilder::new();
    let floor_material = builder.add_material(Material::new("glass", Arc::new(NullBSDF::new())));
    let light_material = builder.add_material(diffuse("light", 0.0).with_emission(RGBSpectrum::splat(1.0)));
    builder.add_mesh(&floor(), floor_material).expect("floor");
    builder.add_mesh(&TriangleMesh::from_triangles(&[light_triangle()]), light_material).expect("light");
    builder.build().expect("scene")
}

/// Emissive floor, an opaque plate at `z = 1` and a light at `z = 2`.
pub fn occluded_emissive_floor_scene() -> Scene {
    let mut builder = SceneBuilder::new();
    let floor_material = builder.add_material(diffuse("floor", 0.5).with_emission(RGBSpectrum::splat(0.5)));
    let plate_material = builder.add_material(diffuse("plate", 0.5));
    let light_material = builder.add_material(diffuse("light", 0.0).with_emission(RGBSpectrum::splat(10.0)));
    debug_assert_eq!(light_material, OCCLUDED_LIGHT_MATERIAL);
    builder.add_mesh(&floor(), floor_material).expect("floor");
    let plate = Transform::translate(&Vector3f::new(0.0, 0.0, 1.0))
        .compose(&Transform::scale(&Vector3f::new(3.0, 3.0, 1.0)));
    builder.add_mesh(&rectangle_mesh(&plate), plate_material).expect("plate");
    let light = Transform::translate(&Vector3f::new(0.0, 0.0, 2.0))
        .compose(&Transform::rotate(&Vector3f::x(), 180.0));
    builder.add_mesh(&rectangle_mesh(&light), light_material).expect("light");
    builder.build().expect("scene")
}

/// Outgoing radiance at `x` on a Lambertian receiver with normal `+z` lit by
/// a uniform polygonal emitter (Lambert's polygon formula).
pub fn lambert_polygon_radiance(albedo: Float, radiance: Float, x: &Vector3f, polygon: &[Vector3f]) -> f64 {
    let n = [0.0f64, 0.0, 1.0];
    let dirs: Vec<[f64; 3]> = polygon.iter()
        .map(|p| {
            let d = [(p.x - x.x) as f64, (p.y - x.y) as f64, (p.z - x.z) as f64];
            let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
            [d[0] / len, d[1] / len, d[2] / len]
        })
        .collect();
    let mut sum = 0.0f64;
    for i in 0..dirs.len() {
        let a = dirs[i];
        let b = dirs[(i + 1) % dirs.len()];
        let theta = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]).clamp(-1.0, 1.0).acos();
        let c = [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]];
        let c_len = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
        if c_len > 0.0 {
            sum += theta * (c[0] * n[0] + c[1] * n[1] + c[2] * n[2]) / c_len;
        }
    }
    let irradiance = radiance as f64 * 0.5 * sum.abs();
    albedo as f64 / PI as f64 * irradiance
}
