// Copyright 2020 @TwoCookingMice

use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

/// Row-major RGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<RGBSpectrum>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = RGBSpectrum;

    fn index(&self, index: (usize, usize)) -> &RGBSpectrum {
        debug_assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut RGBSpectrum {
        debug_assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![RGBSpectrum::default(); width * height],
               width,
               height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[RGBSpectrum] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [RGBSpectrum] {
        &mut self.data
    }

    pub fn fill(&mut self, value: RGBSpectrum) {
        self.data.iter_mut().for_each(|p| *p = value);
    }

    /// Reallocates to the new size. Contents are reset to black.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.data = vec![RGBSpectrum::default(); width * height];
        self.width = width;
        self.height = height;
    }

    /// Copies a `block_w` x `block_h` tile into the image at `(x0, y0)`.
    pub fn write_block(&mut self, x0: usize, y0: usize, block_w: usize, block_h: usize, block: &[RGBSpectrum]) {
        for by in 0..block_h {
            let row = (y0 + by) * self.width + x0;
            self.data[row..row + block_w].copy_from_slice(&block[by * block_w..(by + 1) * block_w]);
        }
    }

    pub fn mean(&self) -> RGBSpectrum {
        if self.data.is_empty() {
            return RGBSpectrum::default();
        }
        let mut sum = RGBSpectrum::default();
        for p in &self.data {
            sum += *p;
        }
        sum / self.data.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmap;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 128usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 128);

        bitmap[(5, 6)] = RGBSpectrum::new(1.0, 0.5, 0.6);
        assert_eq!(bitmap[(5, 6)][0], 1.0);
        assert_eq!(bitmap[(2, 6)][0], 0.0);
        assert_eq!(bitmap.pixels()[6 * 256 + 5], RGBSpectrum::new(1.0, 0.5, 0.6));
    }

    #[test]
    fn test_write_block_and_resize() {
        let mut bitmap = Bitmap::new(4, 4);
        let block = vec![RGBSpectrum::splat(2.0); 4];
        bitmap.write_block(2, 1, 2, 2, &block);
        assert_eq!(bitmap[(2, 1)], RGBSpectrum::splat(2.0));
        assert_eq!(bitmap[(3, 2)], RGBSpectrum::splat(2.0));
        assert_eq!(bitmap[(1, 1)], RGBSpectrum::default());
        assert!((bitmap.mean()[0] - 0.5).abs() < 1e-6);

        bitmap.resize(3, 2);
        assert_eq!(bitmap.pixels().len(), 6);
        assert_eq!(bitmap.mean(), RGBSpectrum::default());
    }
}
