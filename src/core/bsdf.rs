// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes. Directions are in the local shading frame,
// `wi` points toward the viewer and `wo` toward the light.
pub type BSDFValue = RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub pdf: Float,
}

/// `value` excludes the cosine at the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFEvalResult {
    pub value: BSDFValue,
    pub pdf: Float,
}

pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    /// Pass-through surfaces that direct lighting skips.
    fn is_null(&self) -> bool {
        false
    }
    fn eval(&self, sample_record: BSDFSampleRecord) -> BSDFEvalResult;
    /// Draws `wo` for the given `wi`. A zero pdf marks a failed sample.
    fn sample(&self, u1: Vector2f,
                     u2: Vector2f,
                     wi: Vector3f) -> BSDFSampleRecord;
}

impl Default for BSDFSampleRecord {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            wo: Vector3f::zeros(),
            pdf: 0.0,
        }
    }
}

impl BSDFSampleRecord {
    pub fn new(wi: Vector3f, wo: Vector3f, pdf: Float) -> Self {
        Self { wi, wo, pdf }
    }
}

impl Default for BSDFEvalResult {
    fn default() -> Self {
        Self {
            value: RGBSpectrum::default(),
            pdf: 0.0,
        }
    }
}
