// Copyright @yucwang 2026

use crate::core::pixel_buffers::GenSampleRecord;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Two-pass per-pixel estimator. Both passes of one sample receive the same
/// camera ray; they communicate only through the returned record.
pub trait Integrator: Send + Sync {
    /// Candidate pass: traces the primary ray and selects one light endpoint.
    fn generate_sample(&self, scene: &Scene, ray: &Ray3f, rng: &mut LcgRng) -> GenSampleRecord;

    /// Shading pass: resolves the stored record into one radiance sample.
    fn shade_pixel(&self, scene: &Scene, ray: &Ray3f, record: &GenSampleRecord) -> RGBSpectrum;

    fn set_candidate_counts(&mut self, _m_area: u32, _m_bsdf: u32) {}
}
