// Copyright @yucwang 2026

//! Per-pixel state handed from the candidate pass to the shading pass.
//!
//! The state is a fixed five-channel RGBA32F image:
//!
//! | channel            | x        | y        | z        | w                     |
//! |--------------------|----------|----------|----------|-----------------------|
//! | `FACE_INDICES`     | vertex a | vertex b | vertex c | face index            |
//! | `BARYCOORD_SIDE`   | b0       | b1       | b2       | side                  |
//! | `FACE_NORMAL_DIST` | n.x      | n.y      | n.z      | distance              |
//! | `LIGHT_ENDPOINT`   | x        | y        | z        | light material index  |
//! | `SAMPLE_INFO`      | status   | weight   | 0        | 0                     |
//!
//! Index lanes hold the 32-bit index bit-cast into the float.

use crate::core::interaction::SurfaceHit;
use crate::math::constants::{Float, Vector3f};

pub const FACE_INDICES: usize = 0;
pub const BARYCOORD_SIDE: usize = 1;
pub const FACE_NORMAL_DIST: usize = 2;
pub const LIGHT_ENDPOINT: usize = 3;
pub const SAMPLE_INFO: usize = 4;
pub const CHANNEL_COUNT: usize = 5;

pub type Texel = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    /// The primary ray left the scene.
    Miss,
    /// Surface hit without a usable light sample.
    NoSample,
    Valid,
}

impl SampleStatus {
    pub fn to_float(self) -> Float {
        match self {
            SampleStatus::Miss => -1.0,
            SampleStatus::NoSample => 0.0,
            SampleStatus::Valid => 1.0,
        }
    }

    pub fn from_float(value: Float) -> Self {
        if value < -0.5 {
            SampleStatus::Miss
        } else if value > 0.5 {
            SampleStatus::Valid
        } else {
            SampleStatus::NoSample
        }
    }
}

/// Output of the candidate pass for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenSampleRecord {
    pub status: SampleStatus,
    pub hit: SurfaceHit,
    pub light_point: Vector3f,
    pub light_material: u32,
    /// `weight_sum / phat(chosen)` of the pixel's reservoir.
    pub weight: Float,
}

impl GenSampleRecord {
    pub fn miss() -> Self {
        Self {
            status: SampleStatus::Miss,
            hit: SurfaceHit::default(),
            light_point: Vector3f::zeros(),
            light_material: 0,
            weight: 0.0,
        }
    }

    pub fn no_sample(hit: SurfaceHit) -> Self {
        Self { status: SampleStatus::NoSample, hit, ..Self::miss() }
    }

    pub fn valid(hit: SurfaceHit, light_point: Vector3f, light_material: u32, weight: Float) -> Self {
        Self { status: SampleStatus::Valid, hit, light_point, light_material, weight }
    }

    pub fn to_texels(&self) -> [Texel; CHANNEL_COUNT] {
        let h = &self.hit;
        let bits = f32::from_bits;
        let mut texels = [[0.0f32; 4]; CHANNEL_COUNT];
        texels[FACE_INDICES] = [bits(h.face_indices[0]), bits(h.face_indices[1]),
                                bits(h.face_indices[2]), bits(h.face_index)];
        texels[BARYCOORD_SIDE] = [h.barycoord.x, h.barycoord.y, h.barycoord.z, h.side];
        texels[FACE_NORMAL_DIST] = [h.face_normal.x, h.face_normal.y, h.face_normal.z, h.dist];
        texels[LIGHT_ENDPOINT] = [self.light_point.x, self.light_point.y, self.light_point.z,
                                  bits(self.light_material)];
        texels[SAMPLE_INFO] = [self.status.to_float(), self.weight, 0.0, 0.0];
        texels
    }

    pub fn from_texels(texels: &[Texel; CHANNEL_COUNT]) -> Self {
        let idx = |v: f32| v.to_bits();
        let [fa, fb, fc, face] = texels[FACE_INDICES];
        let [b0, b1, b2, side] = texels[BARYCOORD_SIDE];
        let [nx, ny, nz, dist] = texels[FACE_NORMAL_DIST];
        let [lx, ly, lz, light_material] = texels[LIGHT_ENDPOINT];
        let [status, weight, _, _] = texels[SAMPLE_INFO];
        Self {
            status: SampleStatus::from_float(status),
            hit: SurfaceHit {
                face_indices: [idx(fa), idx(fb), idx(fc)],
                face_index: idx(face),
                barycoord: Vector3f::new(b0, b1, b2),
                side,
                face_normal: Vector3f::new(nx, ny, nz),
                dist,
            },
            light_point: Vector3f::new(lx, ly, lz),
            light_material: idx(light_material),
            weight,
        }
    }
}

/// The five-channel intermediate image.
#[derive(Debug, Clone)]
pub struct IntermediateBuffers {
    width: usize,
    height: usize,
    channels: [Vec<Texel>; CHANNEL_COUNT],
}

impl IntermediateBuffers {
    pub fn new(width: usize, height: usize) -> Self {
        let channel = || vec![[0.0f32; 4]; width * height];
        Self { width, height, channels: [channel(), channel(), channel(), channel(), channel()] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel(&self, channel: usize) -> &[Texel] {
        &self.channels[channel]
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.iter_mut().for_each(|t| *t = [0.0; 4]);
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn write(&mut self, x: usize, y: usize, record: &GenSampleRecord) {
        let offset = y * self.width + x;
        for (channel, texel) in self.channels.iter_mut().zip(record.to_texels()) {
            channel[offset] = texel;
        }
    }

    pub fn read(&self, x: usize, y: usize) -> GenSampleRecord {
        let offset = y * self.width + x;
        let mut texels = [[0.0f32; 4]; CHANNEL_COUNT];
        for (texel, channel) in texels.iter_mut().zip(&self.channels) {
            *texel = channel[offset];
        }
        GenSampleRecord::from_texels(&texels)
    }

    /// Writes a finished `block_w` x `block_h` tile at `(x0, y0)`.
    pub fn write_block(&mut self, x0: usize, y0: usize, block_w: usize, records: &[GenSampleRecord]) {
        for (i, record) in records.iter().enumerate() {
            self.write(x0 + i % block_w, y0 + i / block_w, record);
        }
    }
}
