// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod config;
pub mod integrator;
pub mod interaction;
pub mod material;
pub mod pixel_buffers;
pub mod reservoir;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
