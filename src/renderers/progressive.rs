// Copyright @yucwang 2026

use crate::core::config::{candidate_count, validate_size, ConfigError, RenderSettings};
use crate::core::integrator::Integrator;
use crate::core::pixel_buffers::{GenSampleRecord, IntermediateBuffers};
use crate::core::rng::{pixel_rotation, pixel_seed, LcgRng};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::integrators::restir_di::RestirDiIntegrator;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::ray::Ray3f;
use crate::math::warp::halton_2d;
use crate::renderers::accumulator::Accumulator;
use crate::renderers::reset::{Invalidation, ResetState};

pub use super::renderer::Renderer;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

/// The two passes of one sample. `ShadePixel` only runs after `GenSample` has
/// written every pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    GenSample,
    ShadePixel,
}

/// Progressive two-pass renderer. Each `advance_sample` runs the candidate
/// pass and the shading pass over the whole image and folds the result into
/// the running mean.
pub struct ProgressiveRenderer<I: Integrator = RestirDiIntegrator> {
    integrator: I,
    scene: Arc<Scene>,
    sensor: Arc<dyn Sensor>,
    settings: RenderSettings,
    intermediate: IntermediateBuffers,
    sample_target: Bitmap,
    accumulator: Accumulator,
    reset: ResetState,
    seed_counter: u64,
    last_pass: Option<Pass>,
}

impl ProgressiveRenderer<RestirDiIntegrator> {
    pub fn new(scene: Arc<Scene>, sensor: Arc<dyn Sensor>, settings: RenderSettings) -> Result<Self, ConfigError> {
        let integrator = RestirDiIntegrator::new(settings.m_area, settings.m_bsdf)
            .with_background(settings.background);
        Self::with_integrator(integrator, scene, sensor, settings)
    }
}

impl<I: Integrator> ProgressiveRenderer<I> {
    pub fn with_integrator(integrator: I,
                           scene: Arc<Scene>,
                           sensor: Arc<dyn Sensor>,
                           settings: RenderSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let (width, height) = (settings.width, settings.height);
        log::info!("Progressive renderer {}x{} with {} (m_area={}, m_bsdf={})",
                   width, height, sensor.describe(), settings.m_area, settings.m_bsdf);
        Ok(Self {
            integrator,
            scene,
            sensor,
            intermediate: IntermediateBuffers::new(width, height),
            sample_target: Bitmap::new(width, height),
            accumulator: Accumulator::new(width, height),
            settings,
            reset: ResetState::Clean,
            seed_counter: 0,
            last_pass: None,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    pub fn set_scene(&mut self, scene: Arc<Scene>) {
        self.scene = scene;
        self.reset.invalidate(Invalidation::Scene);
    }

    pub fn set_camera(&mut self, sensor: Arc<dyn Sensor>) {
        self.sensor = sensor;
        self.reset.invalidate(Invalidation::Camera);
    }

    /// Reallocates every per-pixel buffer and marks a reset; the mean and the
    /// sample count are cleared at the next sample. Resizing to the current
    /// size is a no-op and keeps the accumulated image.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        validate_size(width, height)?;
        if (width, height) == (self.settings.width, self.settings.height) {
            return Ok(());
        }
        self.settings.width = width;
        self.settings.height = height;
        self.intermediate.resize(width, height);
        self.sample_target.resize(width, height);
        self.accumulator.resize(width, height);
        self.reset.invalidate(Invalidation::Resize);
        Ok(())
    }

    /// Changes the MIS configuration. Every configuration estimates the same
    /// image, so the accumulated mean is kept.
    pub fn set_candidate_counts(&mut self, m_area: i64, m_bsdf: i64) -> Result<(), ConfigError> {
        let m_area = candidate_count("m_area", m_area)?;
        let m_bsdf = candidate_count("m_bsdf", m_bsdf)?;
        self.settings.m_area = m_area;
        self.settings.m_bsdf = m_bsdf;
        self.integrator.set_candidate_counts(m_area, m_bsdf);
        Ok(())
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset.is_pending()
    }

    /// Radiance of the most recent sample alone.
    pub fn last_sample(&self) -> &Bitmap {
        &self.sample_target
    }

    pub fn intermediate(&self) -> &IntermediateBuffers {
        &self.intermediate
    }

    pub fn pixel_record(&self, x: usize, y: usize) -> Option<GenSampleRecord> {
        if x < self.intermediate.width() && y < self.intermediate.height() {
            Some(self.intermediate.read(x, y))
        } else {
            None
        }
    }

    pub fn last_pass(&self) -> Option<Pass> {
        self.last_pass
    }

    /// Runs both passes for one pixel of sample `sample_index` with the seeds
    /// a full `advance_sample` would use.
    pub fn trace_pixel(&self, x: usize, y: usize, sample_index: u64) -> (GenSampleRecord, RGBSpectrum) {
        let (width, height) = (self.settings.width, self.settings.height);
        let ray = camera_ray(self.sensor.as_ref(), width, height, &halton_2d(sample_index), x, y);
        let mut rng = pixel_rng(self.settings.seed, sample_index, x, y);
        let record = self.integrator.generate_sample(&self.scene, &ray, &mut rng);
        let radiance = self.integrator.shade_pixel(&self.scene, &ray, &record);
        (record, radiance)
    }

    fn clear(&mut self, reason: Invalidation) {
        log::debug!("Resetting accumulation ({:?}) after {} samples", reason, self.accumulator.sample_count());
        self.intermediate.clear();
        self.sample_target.fill(Default::default());
        self.accumulator.clear();
        if self.settings.stable_noise {
            self.seed_counter = 0;
        }
    }

    fn run_pass(&mut self, pass: Pass, sample_index: u64) {
        let start = Instant::now();
        let Self { integrator, scene, sensor, settings, intermediate, sample_target, .. } = self;
        let (width, height, block_size) = (settings.width, settings.height, settings.block_size);
        let seed = settings.seed;
        let integrator: &I = integrator;
        let scene: &Scene = scene.as_ref();
        let sensor: &dyn Sensor = sensor.as_ref();
        let jitter = halton_2d(sample_index);

        match pass {
            Pass::GenSample => {
                let work = |x: usize, y: usize| {
                    let ray = camera_ray(sensor, width, height, &jitter, x, y);
                    let mut rng = pixel_rng(seed, sample_index, x, y);
                    integrator.generate_sample(scene, &ray, &mut rng)
                };
                run_blocks(width, height, block_size, work, |x0, y0, block_w, block| {
                    intermediate.write_block(x0, y0, block_w, &block);
                });
            }
            Pass::ShadePixel => {
                let records: &IntermediateBuffers = intermediate;
                let work = |x: usize, y: usize| {
                    let ray = camera_ray(sensor, width, height, &jitter, x, y);
                    integrator.shade_pixel(scene, &ray, &records.read(x, y))
                };
                run_blocks(width, height, block_size, work, |x0, y0, block_w, block| {
                    let block_h = block.len() / block_w;
                    sample_target.write_block(x0, y0, block_w, block_h, &block);
                });
            }
        }
        self.last_pass = Some(pass);
        log::debug!("{:?} pass for sample {} took {:.2?}", pass, sample_index, start.elapsed());
    }
}

impl<I: Integrator> Renderer for ProgressiveRenderer<I> {
    fn advance_sample(&mut self) {
        if let Some(reason) = self.reset.take_pending() {
            self.clear(reason);
        }
        self.seed_counter += 1;
        let sample_index = self.seed_counter;

        self.run_pass(Pass::GenSample, sample_index);
        self.run_pass(Pass::ShadePixel, sample_index);

        let dropped = self.accumulator.accumulate(&self.sample_target);
        if dropped > 0 {
            log::warn!("Sample {}: replaced {} non-finite pixels by zero", sample_index, dropped);
        }
    }

    fn sample_count(&self) -> u32 {
        self.accumulator.sample_count()
    }

    fn image(&self) -> &Bitmap {
        self.accumulator.image()
    }
}

fn pixel_rng(seed: u64, sample_index: u64, x: usize, y: usize) -> LcgRng {
    LcgRng::new(pixel_seed(sample_index ^ seed.rotate_left(32), x as u32, y as u32))
}

/// Camera ray of pixel `(x, y)`. The sub-pixel offset is the sample's shared
/// Halton point rotated per pixel, so every pass of a sample sees the same ray.
fn camera_ray(sensor: &dyn Sensor, width: usize, height: usize, jitter: &Vector2f, x: usize, y: usize) -> Ray3f {
    let rotation = pixel_rotation(x as u32, y as u32);
    let jx = (jitter.x + rotation.x).fract();
    let jy = (jitter.y + rotation.y).fract();
    let u = Vector2f::new((x as Float + jx) / width as Float, (y as Float + jy) / height as Float);
    sensor.sample_ray(&u)
}

/// Evaluates `work` for every pixel on a scoped worker pool, one square block
/// at a time. Finished blocks are handed to `sink` on the calling thread as
/// `(x0, y0, block_width, pixels)` in row-major order.
fn run_blocks<T, W, S>(width: usize, height: usize, block_size: usize, work: W, mut sink: S)
where
    T: Send,
    W: Fn(usize, usize) -> T + Sync,
    S: FnMut(usize, usize, usize, Vec<T>),
{
    let block_size = block_size.max(1);
    let blocks_x = (width + block_size - 1) / block_size;
    let blocks_y = (height + block_size - 1) / block_size;
    let total_blocks = blocks_x * blocks_y;
    if total_blocks == 0 {
        return;
    }

    let next_block = AtomicUsize::new(0);
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total_blocks);
    let (tx, rx) = mpsc::channel::<(usize, usize, usize, Vec<T>)>();

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let tx = tx.clone();
            let next_block = &next_block;
            let work = &work;
            scope.spawn(move || {
                loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }

                    let x0 = (block_index % blocks_x) * block_size;
                    let y0 = (block_index / blocks_x) * block_size;
                    let x1 = (x0 + block_size).min(width);
                    let y1 = (y0 + block_size).min(height);

                    let mut block = Vec::with_capacity((x1 - x0) * (y1 - y0));
                    for y in y0..y1 {
                        for x in x0..x1 {
                            block.push(work(x, y));
                        }
                    }
                    if tx.send((x0, y0, x1 - x0, block)).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for (x0, y0, block_w, block) in rx {
            sink(x0, y0, block_w, block);
        }
    });
}
