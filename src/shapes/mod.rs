// Copyright 2020 @TwoCookingMice

pub mod rectangle;
pub mod triangle;
pub mod triangle_mesh;
