// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, BSDFEvalResult, BSDF};
use crate::math::constants::{ INV_PI, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, sample_record: BSDFSampleRecord) -> BSDFEvalResult {
        let mut eval_result = BSDFEvalResult::default();
        if sample_record.wi.z <= 0.0 || sample_record.wo.z <= 0.0 {
            return eval_result;
        }
        eval_result.value = self.color * INV_PI;
        eval_result.pdf = sample_cosine_hemisphere_pdf(sample_record.wo.z);

        eval_result
    }

    fn sample(&self,
              u1: Vector2f,
              _u2: Vector2f,
              wi: Vector3f) -> BSDFSampleRecord {
        let mut sampling_record = BSDFSampleRecord::default();
        sampling_record.wi = wi;
        if wi.z <= 0.0 {
            return sampling_record;
        }
        sampling_record.wo = sample_cosine_hemisphere(&u1);
        sampling_record.pdf = sample_cosine_hemisphere_pdf(sampling_record.wo.z);

        sampling_record
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum) -> Self {
        Self {
            color: rgb,
        }
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::LambertianDiffuseBSDF;
    use crate::core::bsdf::{BSDF, BSDFSampleRecord};
    use crate::math::constants::{INV_PI, Vector2f, Vector3f};
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_eval_and_sample_agree() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::new(0.5, 0.25, 1.0));
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let rec = bsdf.sample(Vector2f::new(0.3, 0.8), Vector2f::new(0.0, 0.0), wi);
        assert!(rec.pdf > 0.0);
        assert!((rec.pdf - rec.wo.z * INV_PI).abs() < 1e-6);

        let eval = bsdf.eval(rec);
        assert!((eval.pdf - rec.pdf).abs() < 1e-6);
        assert!((eval.value[0] - 0.5 * INV_PI).abs() < 1e-6);
        assert!((eval.value[2] - INV_PI).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_hemispheres_are_black() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(1.0));
        let below = BSDFSampleRecord::new(Vector3f::z(), -Vector3f::z(), 0.0);
        assert!(bsdf.eval(below).value.is_black());
        let back_view = bsdf.sample(Vector2f::new(0.5, 0.5), Vector2f::new(0.5, 0.5), -Vector3f::z());
        assert_eq!(back_view.pdf, 0.0);
    }
}
