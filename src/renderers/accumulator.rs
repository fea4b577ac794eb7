// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;

/// Running mean of per-sample images.
pub struct Accumulator {
    mean: Bitmap,
    sample_count: u32,
    dropped_texels: u64,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self { mean: Bitmap::new(width, height), sample_count: 0, dropped_texels: 0 }
    }

    /// Blends one sample into the mean. Non-finite channels are replaced by
    /// zero first; returns how many pixels needed that.
    pub fn accumulate(&mut self, sample: &Bitmap) -> usize {
        debug_assert_eq!((sample.width(), sample.height()), (self.mean.width(), self.mean.height()));
        let n = self.sample_count as f32;
        let inv = 1.0 / (n + 1.0);
        let mut dropped = 0usize;
        for (mean, value) in self.mean.pixels_mut().iter_mut().zip(sample.pixels()) {
            let (value, dirty) = value.sanitized();
            if dirty {
                dropped += 1;
            }
            *mean = if self.sample_count == 0 {
                value
            } else {
                (*mean * n + value) * inv
            };
        }
        self.sample_count += 1;
        self.dropped_texels += dropped as u64;
        dropped
    }

    pub fn clear(&mut self) {
        self.mean.fill(Default::default());
        self.sample_count = 0;
    }

    /// Reallocates the mean image. The sample count is left for `clear`.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.mean.resize(width, height);
    }

    pub fn image(&self) -> &Bitmap {
        &self.mean
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Non-finite pixels replaced since construction.
    pub fn dropped_texels(&self) -> u64 {
        self.dropped_texels
    }
}

#[cfg(test)]
mod tests {
    use super::Accumulator;
    use crate::math::bitmap::Bitmap;
    use crate::math::spectrum::RGBSpectrum;

    fn constant(value: f32) -> Bitmap {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.fill(RGBSpectrum::splat(value));
        bitmap
    }

    #[test]
    fn test_running_mean_is_exact() {
        let mut acc = Accumulator::new(2, 2);
        let values = [1.0f32, 4.0, 2.5, 0.5, 7.0];
        for (i, v) in values.iter().enumerate() {
            acc.accumulate(&constant(*v));
            let expected: f32 = values[..=i].iter().sum::<f32>() / (i + 1) as f32;
            assert!((acc.image()[(1, 1)][0] - expected).abs() < 1e-5);
            assert_eq!(acc.sample_count(), i as u32 + 1);
        }
    }

    #[test]
    fn test_first_sample_is_copied() {
        let mut acc = Accumulator::new(2, 2);
        let sample = constant(0.3);
        acc.accumulate(&sample);
        assert_eq!(acc.image(), &sample);
    }

    #[test]
    fn test_non_finite_samples_are_zeroed() {
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&constant(2.0));
        let mut bad = constant(2.0);
        bad[(0, 0)] = RGBSpectrum::new(f32::NAN, 2.0, f32::INFINITY);
        assert_eq!(acc.accumulate(&bad), 1);
        assert_eq!(acc.dropped_texels(), 1);
        assert!(acc.image().pixels().iter().all(|p| p.is_finite()));
        assert_eq!(acc.image()[(0, 0)], RGBSpectrum::new(1.0, 2.0, 1.0));

        acc.clear();
        assert_eq!(acc.sample_count(), 0);
        assert_eq!(acc.image(), &Bitmap::new(2, 2));
    }

    #[test]
    fn test_resize_keeps_count_until_clear() {
        let mut acc = Accumulator::new(2, 2);
        acc.accumulate(&constant(1.0));
        acc.accumulate(&constant(3.0));
        acc.resize(3, 1);
        assert_eq!(acc.sample_count(), 2);
        assert_eq!(acc.image(), &Bitmap::new(3, 1));
        acc.clear();
        assert_eq!(acc.sample_count(), 0);
    }
}
