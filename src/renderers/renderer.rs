// Copyright @yucwang 2021

use crate::math::bitmap::Bitmap;

pub trait Renderer {
    /// Renders one more sample per pixel and folds it into the image.
    fn advance_sample(&mut self);
    fn sample_count(&self) -> u32;
    fn image(&self) -> &Bitmap;

    fn render(&mut self, samples: u32) -> &Bitmap {
        for _ in 0..samples {
            self.advance_sample();
        }
        self.image()
    }
}
