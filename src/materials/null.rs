// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFEvalResult, BSDF};
use crate::math::constants::{Vector2f, Vector3f};

/// Pass-through surface. It never reflects light, so direct lighting only
/// sees its emission.
#[derive(Default)]
pub struct NullBSDF;

impl NullBSDF {
    pub fn new() -> Self {
        Self
    }
}

impl BSDF for NullBSDF {
    fn is_null(&self) -> bool {
        true
    }

    fn eval(&self, _sample_record: BSDFSampleRecord) -> BSDFEvalResult {
        BSDFEvalResult::default()
    }

    // The continuation is a delta along -wi; it carries no pdf in the
    // non-delta measure.
    fn sample(&self, _u1: Vector2f, _u2: Vector2f, wi: Vector3f) -> BSDFSampleRecord {
        BSDFSampleRecord::new(wi, -wi, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::NullBSDF;
    use crate::core::bsdf::{BSDF, BSDFSampleRecord};
    use crate::math::constants::{Vector2f, Vector3f};

    #[test]
    fn test_null_is_skipped_and_black() {
        let bsdf = NullBSDF::new();
        assert!(bsdf.is_null());
        let wi = Vector3f::new(0.1, -0.2, 0.97).normalize();
        let sample = bsdf.sample(Vector2f::new(0.3, 0.7), Vector2f::new(0.1, 0.9), wi);
        assert!((sample.wo + wi).norm() < 1e-6);
        assert_eq!(sample.pdf, 0.0);
        let eval = bsdf.eval(BSDFSampleRecord::new(wi, -wi, 1.0));
        assert!(eval.value.is_black());
    }
}
