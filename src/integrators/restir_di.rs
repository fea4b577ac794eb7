// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFSampleRecord};
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceRecord;
use crate::core::pixel_buffers::{GenSampleRecord, SampleStatus};
use crate::core::reservoir::Reservoir;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::emitters::area::{area_to_solid_angle_pdf, AreaLightSample};
use crate::math::constants::{Float, Vector3f, SHADOW_EPSILON};
use crate::math::ray::{offset_ray_origin, Ray3f};
use crate::math::spectrum::RGBSpectrum;

/// Resampled candidate: camera origin, primary hit and light point, plus the
/// material of the emitter the light point lies on.
#[derive(Debug, Clone, Copy)]
pub struct LightCandidate {
    pub path: [Vector3f; 3],
    pub light_material: u32,
}

impl LightCandidate {
    pub fn light_point(&self) -> Vector3f {
        self.path[2]
    }
}

// Unshadowed evaluation of a light point seen from the receiver.
struct CandidateEval {
    phat: Float,
    bsdf_pdf: Float,
    light_pdf: Float,
}

/// Direct lighting through resampled importance sampling over light-area and
/// BSDF candidates, combined with balance-heuristic MIS weights.
pub struct RestirDiIntegrator {
    m_area: u32,
    m_bsdf: u32,
    background: RGBSpectrum,
}

impl RestirDiIntegrator {
    pub fn new(m_area: u32, m_bsdf: u32) -> Self {
        Self { m_area, m_bsdf, background: RGBSpectrum::default() }
    }

    pub fn with_background(mut self, background: RGBSpectrum) -> Self {
        self.background = background;
        self
    }

    fn balance_denominator(&self, light_pdf: Float, bsdf_pdf: Float) -> Float {
        self.m_area as Float * light_pdf + self.m_bsdf as Float * bsdf_pdf
    }

    fn bsdf_eval(record: &SurfaceRecord, wi_local: &Vector3f, wo_local: &Vector3f) -> BSDFEvalResult {
        record.material.bsdf().eval(BSDFSampleRecord::new(*wi_local, *wo_local, 0.0))
    }

    /// Evaluates the target density toward `light_point`. `None` when the
    /// point cannot contribute: back-facing emitter, direction below the
    /// receiver, or a black BSDF.
    fn evaluate_candidate(&self,
                          scene: &Scene,
                          record: &SurfaceRecord,
                          wi_local: &Vector3f,
                          light_point: &Vector3f,
                          light_normal: &Vector3f,
                          light_material: u32,
                          light_pdf_area: Float) -> Option<CandidateEval> {
        let to_light = light_point - record.p;
        let dist2 = to_light.norm_squared();
        if !(dist2 > 0.0) {
            return None;
        }
        let dir = to_light / dist2.sqrt();
        if light_normal.dot(&dir) >= 0.0 || record.face_normal.dot(&dir) <= 0.0 {
            return None;
        }
        let wo_local = record.to_local(&dir);
        if wo_local.z <= 0.0 {
            return None;
        }

        let eval = Self::bsdf_eval(record, wi_local, &wo_local);
        let f_cos = eval.value * wo_local.z;
        let emission = scene.material(light_material)?.emission();
        let phat = f_cos.luminance() * emission.luminance() / dist2;
        let light_pdf = area_to_solid_angle_pdf(light_pdf_area, &record.p, light_point, light_normal);
        if !(phat > 0.0) || !phat.is_finite() {
            return None;
        }
        Some(CandidateEval { phat, bsdf_pdf: eval.pdf, light_pdf })
    }

    fn light_candidate(&self,
                       scene: &Scene,
                       record: &SurfaceRecord,
                       wi_local: &Vector3f,
                       sample: &AreaLightSample) -> Option<(Float, Float)> {
        let eval = self.evaluate_candidate(scene, record, wi_local, &sample.point, &sample.normal,
                                           sample.material, sample.pdf_area)?;
        if !(eval.light_pdf > 0.0) {
            return None;
        }
        let mis = eval.light_pdf / self.balance_denominator(eval.light_pdf, eval.bsdf_pdf);
        Some((mis * eval.phat / eval.light_pdf, eval.phat))
    }

    fn bsdf_candidate(&self,
                      scene: &Scene,
                      record: &SurfaceRecord,
                      wi_local: &Vector3f,
                      rng: &mut LcgRng) -> Option<(Vector3f, u32, Float, Float)> {
        let u1 = rng.next_vec2();
        let u2 = rng.next_vec2();
        let sampled = record.material.bsdf().sample(u1, u2, *wi_local);
        if !(sampled.pdf > 0.0) || sampled.wo.z <= 0.0 {
            return None;
        }
        let dir = record.to_world(&sampled.wo).normalize();
        if record.face_normal.dot(&dir) <= 0.0 {
            return None;
        }

        let origin = offset_ray_origin(&record.p, &record.face_normal, &dir);
        let hit = scene.trace(&Ray3f::new(origin, dir, None, None))?;
        if !hit.is_front_face() {
            return None;
        }
        let area = scene.emitter_area(hit.face_index)?;
        let light_material = scene.face_material(hit.face_index)?;
        let light_point = scene.triangle(hit.face_index)?.point_at(&hit.barycoord);

        let eval = self.evaluate_candidate(scene, record, wi_local, &light_point, &hit.face_normal,
                                           light_material, scene.lights().pdf_area(area))?;
        if !(eval.bsdf_pdf > 0.0) {
            return None;
        }
        let mis = eval.bsdf_pdf / self.balance_denominator(eval.light_pdf, eval.bsdf_pdf);
        Some((light_point, light_material, mis * eval.phat / eval.bsdf_pdf, eval.phat))
    }
}

impl Integrator for RestirDiIntegrator {
    fn generate_sample(&self, scene: &Scene, ray: &Ray3f, rng: &mut LcgRng) -> GenSampleRecord {
        let hit = match scene.trace(ray) {
            Some(hit) => hit,
            None => return GenSampleRecord::miss(),
        };
        let record = match scene.surface_record(&hit) {
            Some(record) => record,
            None => return GenSampleRecord::no_sample(hit),
        };
        if record.material.bsdf().is_null() {
            return GenSampleRecord::no_sample(hit);
        }
        let wi_local = record.to_local(&-ray.dir());
        if wi_local.z <= 0.0 {
            return GenSampleRecord::no_sample(hit);
        }

        let mut reservoir: Reservoir<LightCandidate> = Reservoir::new();
        let candidate = |light_point: Vector3f, light_material: u32| LightCandidate {
            path: [ray.origin(), record.p, light_point],
            light_material,
        };

        for _ in 0..self.m_area {
            let u_select = rng.next_f32();
            let u_point = rng.next_vec2();
            let u_resample = rng.next_f32();
            let light = match scene.lights().sample(u_select, &u_point) {
                Some(light) => light,
                None => continue,
            };
            if let Some((weight, phat)) = self.light_candidate(scene, &record, &wi_local, &light) {
                reservoir.update(candidate(light.point, light.material), weight, phat, u_resample);
            }
        }

        for _ in 0..self.m_bsdf {
            let sampled = self.bsdf_candidate(scene, &record, &wi_local, rng);
            let u_resample = rng.next_f32();
            if let Some((light_point, light_material, weight, phat)) = sampled {
                reservoir.update(candidate(light_point, light_material), weight, phat, u_resample);
            }
        }

        let weight = reservoir.contribution_weight();
        match reservoir.into_sample() {
            Some(chosen) if weight > 0.0 =>
                GenSampleRecord::valid(hit, chosen.light_point(), chosen.light_material, weight),
            _ => GenSampleRecord::no_sample(hit),
        }
    }

    fn shade_pixel(&self, scene: &Scene, ray: &Ray3f, record: &GenSampleRecord) -> RGBSpectrum {
        if record.status == SampleStatus::Miss {
            return self.background;
        }
        let surface = match scene.surface_record(&record.hit) {
            Some(surface) => surface,
            None => return RGBSpectrum::default(),
        };
        let emission = surface.emission;
        if record.status != SampleStatus::Valid {
            return emission;
        }

        let to_light = record.light_point - surface.p;
        let dist = to_light.norm();
        if !(dist > 0.0) {
            return emission;
        }
        let dir = to_light / dist;
        if surface.face_normal.dot(&dir) <= 0.0 {
            return emission;
        }
        let wo_local = surface.to_local(&dir);
        if wo_local.z <= 0.0 {
            return emission;
        }

        let origin = offset_ray_origin(&surface.p, &surface.face_normal, &dir);
        let shadow_dist = (record.light_point - origin).norm();
        let shadow_ray = Ray3f::new(origin, dir, Some(0.0), Some(shadow_dist * (1.0 - SHADOW_EPSILON)));
        if scene.occluded(&shadow_ray) {
            return emission;
        }

        let light_emission = match scene.material(record.light_material) {
            Some(material) => material.emission(),
            None => return emission,
        };
        let wi_local = surface.to_local(&-ray.dir());
        let eval = Self::bsdf_eval(&surface, &wi_local, &wo_local);
        emission + eval.value * wo_local.z * light_emission * record.weight
    }

    fn set_candidate_counts(&mut self, m_area: u32, m_bsdf: u32) {
        self.m_area = m_area;
        self.m_bsdf = m_bsdf;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::SurfaceHit;
    use crate::integrators::fixtures;

    fn straight_down(x: Float, y: Float) -> Ray3f {
        Ray3f::new(Vector3f::new(x, y, 0.5), Vector3f::new(0.0, 0.0, -1.0), None, None)
    }

    #[test]
    fn test_miss_writes_miss_status() {
        let scene = fixtures::lit_floor_scene(0.5, 1.0);
        let integrator = RestirDiIntegrator::new(4, 1).with_background(RGBSpectrum::splat(0.25));
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.5), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let mut rng = LcgRng::new(1);
        let record = integrator.generate_sample(&scene, &ray, &mut rng);
        assert_eq!(record.status, SampleStatus::Miss);
        assert_eq!(integrator.shade_pixel(&scene, &ray, &record), RGBSpectrum::splat(0.25));
    }

    #[test]
    fn test_valid_sample_has_finite_positive_weight() {
        let scene = fixtures::lit_floor_scene(0.5, 1.0);
        let integrator = RestirDiIntegrator::new(4, 1);
        let ray = straight_down(0.0, 0.0);
        let mut rng = LcgRng::new(2);
        let record = integrator.generate_sample(&scene, &ray, &mut rng);
        assert_eq!(record.status, SampleStatus::Valid);
        assert!(record.weight.is_finite() && record.weight > 0.0);
        assert!((record.light_point.z - 1.0).abs() < 1e-5);
        assert!(record.hit.dist > 0.49 && record.hit.dist < 0.51);
        let radiance = integrator.shade_pixel(&scene, &ray, &record);
        assert!(radiance.is_finite() && radiance.max_component() > 0.0);
    }

    #[test]
    fn test_zero_candidates_never_sample() {
        let scene = fixtures::lit_floor_scene(0.5, 1.0);
        let integrator = RestirDiIntegrator::new(0, 0);
        let mut rng = LcgRng::new(3);
        let record = integrator.generate_sample(&scene, &straight_down(0.1, 0.1), &mut rng);
        assert_eq!(record.status, SampleStatus::NoSample);
        assert_eq!(integrator.shade_pixel(&scene, &straight_down(0.1, 0.1), &record), RGBSpectrum::default());
    }

    #[test]
    fn test_scene_without_lights_has_no_sample() {
        let scene = fixtures::dark_floor_scene();
        let integrator = RestirDiIntegrator::new(4, 4);
        let mut rng = LcgRng::new(4);
        let record = integrator.generate_sample(&scene, &straight_down(0.0, 0.0), &mut rng);
        assert_eq!(record.status, SampleStatus::NoSample);
    }

    #[test]
    fn test_null_surface_is_skipped() {
        let scene = fixtures::null_floor_scene();
        let integrator = RestirDiIntegrator::new(4, 1);
        let mut rng = LcgRng::new(5);
        let record = integrator.generate_sample(&scene, &straight_down(0.0, 0.0), &mut rng);
        assert_eq!(record.status, SampleStatus::NoSample);
    }

    #[test]
    fn test_light_above_back_facing_receiver_is_rejected() {
        // Seen from below, the floor's lit side faces away from the camera,
        // and the light is behind the receiver.
        let scene = fixtures::lit_floor_scene(0.5, 1.0);
        let integrator = RestirDiIntegrator::new(8, 0);
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -1.0), Vector3f::z(), None, None);
        let mut rng = LcgRng::new(6);
        let record = integrator.generate_sample(&scene, &ray, &mut rng);
        assert_eq!(record.status, SampleStatus::NoSample);
        assert_eq!(record.hit.side, -1.0);
    }

    #[test]
    fn test_back_face_of_emitter_is_not_a_light() {
        // Camera above the light looks down at its unlit back.
        let scene = fixtures::lit_floor_scene(0.5, 1.0);
        let integrator = RestirDiIntegrator::new(2, 2);
        let ray = Ray3f::new(Vector3f::new(-0.3, -0.3, 3.0), -Vector3f::z(), None, None);
        let mut rng = LcgRng::new(7);
        let record = integrator.generate_sample(&scene, &ray, &mut rng);
        assert_eq!(record.hit.side, -1.0);
        assert_eq!(integrator.shade_pixel(&scene, &ray, &record), RGBSpectrum::default());
    }

    #[test]
    fn test_occluded_endpoint_returns_emission_only() {
        let scene = fixtures::occluded_emissive_floor_scene();
        let integrator = RestirDiIntegrator::new(1, 0);
        let ray = straight_down(0.0, 0.0);
        let hit: SurfaceHit = scene.trace(&ray).expect("floor hit");
        let floor_emission = scene.surface_record(&hit).expect("record").emission;
        assert_eq!(floor_emission, RGBSpectrum::splat(0.5));

        let light_material = fixtures::OCCLUDED_LIGHT_MATERIAL;
        for weight in [1.0, 1e6] {
            let record = GenSampleRecord::valid(hit, Vector3f::new(0.0, 0.0, 2.0), light_material, weight);
            assert_eq!(integrator.shade_pixel(&scene, &ray, &record), floor_emission);
        }
    }

    #[test]
    fn test_unoccluded_shading_formula() {
        let scene = fixtures::lit_floor_scene(0.5, 2.0);
        let integrator = RestirDiIntegrator::new(1, 0);
        let ray = straight_down(0.0, 0.0);
        let hit = scene.trace(&ray).expect("floor hit");
        let light_point = Vector3f::new(0.0, 0.0, 1.0);
        let light_material = scene.face_material(scene.lights().triangles()[0].face).expect("light");
        let record = GenSampleRecord::valid(hit, light_point, light_material, 3.0);
        // albedo / pi * cos(0) * emission * weight
        let expected = 0.5 / crate::math::constants::PI * 2.0 * 3.0;
        let radiance = integrator.shade_pixel(&scene, &ray, &record);
        assert!((radiance[0] - expected).abs() < 1e-4, "{} vs {}", radiance[0], expected);
    }
}
