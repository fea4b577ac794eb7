// Copyright @yucwang 2026

use crate::math::spectrum::RGBSpectrum;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSize { width: usize, height: usize },
    NegativeCandidateCount { name: &'static str, value: i64 },
    InvalidBlockSize(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSize { width, height } =>
                write!(f, "render target must be non-empty, got {}x{}", width, height),
            ConfigError::NegativeCandidateCount { name, value } =>
                write!(f, "{} must be non-negative, got {}", name, value),
            ConfigError::InvalidBlockSize(size) =>
                write!(f, "block size must be positive, got {}", size),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validates a user-supplied candidate count.
pub fn candidate_count(name: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeCandidateCount { name, value });
    }
    Ok(value.min(u32::MAX as i64) as u32)
}

pub fn validate_size(width: usize, height: usize) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidSize { width, height });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Light-area candidates per pixel and sample.
    pub m_area: u32,
    /// BSDF-direction candidates per pixel and sample.
    pub m_bsdf: u32,
    pub width: usize,
    pub height: usize,
    /// Sample budget for batch rendering.
    pub samples: u32,
    pub seed: u64,
    /// Restart the seed counter on every reset.
    pub stable_noise: bool,
    /// Radiance of primary misses.
    pub background: RGBSpectrum,
    pub block_size: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            m_area: 4,
            m_bsdf: 1,
            width: 512,
            height: 512,
            samples: 1,
            seed: 0,
            stable_noise: false,
            background: RGBSpectrum::default(),
            block_size: 32,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_size(self.width, self.height)?;
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_candidates(mut self, m_area: u32, m_bsdf: u32) -> Self {
        self.m_area = m_area;
        self.m_bsdf = m_bsdf;
        self
    }
}
