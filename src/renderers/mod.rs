// Copyright @yucwang 2026

pub mod accumulator;
pub mod progressive;
pub mod renderer;
pub mod reset;
