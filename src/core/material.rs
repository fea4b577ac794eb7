// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::math::spectrum::RGBSpectrum;

use std::fmt;
use std::sync::Arc;

/// Entry of the scene's material table: a BSDF plus the one-sided emitted
/// radiance of the front face.
#[derive(Clone)]
pub struct Material {
    bsdf: Arc<dyn BSDF>,
    emission: RGBSpectrum,
    name: String,
}

impl Material {
    pub fn new(name: &str, bsdf: Arc<dyn BSDF>) -> Self {
        Self { bsdf, emission: RGBSpectrum::default(), name: name.to_string() }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }

    pub fn bsdf(&self) -> &dyn BSDF {
        self.bsdf.as_ref()
    }

    pub fn emission(&self) -> RGBSpectrum {
        self.emission
    }

    pub fn is_emissive(&self) -> bool {
        !self.emission.is_black()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("bsdf", &self.bsdf.name())
            .field("emission", &self.emission)
            .finish()
    }
}
