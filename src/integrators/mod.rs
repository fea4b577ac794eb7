// Copyright @yucwang 2026

pub mod restir_di;

#[cfg(test)]
pub(crate) mod fixtures;
