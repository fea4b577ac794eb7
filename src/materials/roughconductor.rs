// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFEvalResult, BSDF};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::materials::microfacet::{fresnel_schlick, ggx_d, ggx_g, pdf_ggx_vndf, sample_ggx_vndf, reflect};

/// GGX microfacet conductor with a Schlick Fresnel term.
pub struct RoughConductorBSDF {
    alpha: Float,
    specular_reflectance: RGBSpectrum,
}

impl RoughConductorBSDF {
    pub fn new(alpha: Float, specular_reflectance: RGBSpectrum) -> Self {
        Self { alpha, specular_reflectance }
    }

    fn reflection_pdf(&self, wi: &Vector3f, wo: &Vector3f, m: &Vector3f) -> Float {
        let denom = 4.0 * wo.dot(m).abs();
        if denom <= 1e-6 {
            return 0.0;
        }
        pdf_ggx_vndf(wi, m, self.alpha) / denom
    }
}

impl BSDF for RoughConductorBSDF {
    fn eval(&self, sample_record: BSDFSampleRecord) -> BSDFEvalResult {
        let mut eval_result = BSDFEvalResult::default();
        let wi = sample_record.wi;
        let wo = sample_record.wo;
        let (cos_i, cos_o) = (wi.z, wo.z);
        if cos_i <= 1e-6 || cos_o <= 1e-6 {
            return eval_result;
        }

        let m = (wi + wo).normalize();
        let cos_i_m = wi.dot(&m);
        if m.z <= 0.0 || cos_i_m <= 0.0 || wo.dot(&m) <= 0.0 {
            return eval_result;
        }

        let d = ggx_d(m.z, self.alpha);
        let g = ggx_g(cos_i, cos_o, self.alpha);
        let f = fresnel_schlick(self.specular_reflectance, cos_i_m);
        eval_result.value = f * (d * g / (4.0 * cos_i * cos_o));
        eval_result.pdf = self.reflection_pdf(&wi, &wo, &m);
        eval_result
    }

    fn sample(&self, u1: Vector2f, _u2: Vector2f, wi: Vector3f) -> BSDFSampleRecord {
        let mut sampling_record = BSDFSampleRecord::default();
        sampling_record.wi = wi;
        if wi.z <= 0.0 {
            return sampling_record;
        }

        let m = sample_ggx_vndf(&wi, &u1, self.alpha);
        if wi.dot(&m) <= 0.0 {
            return sampling_record;
        }
        let wo = reflect(&wi, &m);
        if wo.z <= 0.0 {
            return sampling_record;
        }

        sampling_record.wo = wo;
        sampling_record.pdf = self.reflection_pdf(&wi, &wo, &m);
        sampling_record
    }
}
