// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };

pub struct LcgRng {
    state: u64,
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed for one pixel of one sample. Distinct pixels and distinct samples get
/// decorrelated streams.
pub fn pixel_seed(sample_index: u64, x: u32, y: u32) -> u64 {
    let coords = ((y as u64) << 32) | x as u64;
    splitmix64(splitmix64(sample_index) ^ coords)
}

/// Per-pixel rotation used to decorrelate the shared Halton jitter sequence.
pub fn pixel_rotation(x: u32, y: u32) -> Vector2f {
    let h = splitmix64(((y as u64) << 32) | x as u64);
    let to_unit = |bits: u64| (bits >> 40) as Float * (1.0 / (1u64 << 24) as Float);
    Vector2f::new(to_unit(h), to_unit(h << 24))
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: splitmix64(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> Float {
        (self.next_u32() >> 8) as Float * (1.0 / (1u32 << 24) as Float)
    }

    pub fn next_vec2(&mut self) -> Vector2f {
        let u = self.next_f32();
        Vector2f::new(u, self.next_f32())
    }

    /// Uniform index in `0..count`. `count` must be positive.
    pub fn next_index(&mut self, count: usize) -> usize {
        let idx = (self.next_f32() * count as Float) as usize;
        idx.min(count.saturating_sub(1))
    }
}
