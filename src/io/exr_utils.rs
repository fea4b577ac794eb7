/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;
use crate::math::spectrum::RGBSpectrum;

use exr::prelude::*;

// Write a bitmap to an RGB OpenEXR file
pub fn write_exr_to_file(image: &Bitmap, file_path: &str) -> exr::error::UnitResult {
    log::info!("Writing {}x{} OpenEXR image to {}.", image.width(), image.height(), file_path);

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let pixel = &image[(x, y)];
        (pixel[0], pixel[1], pixel[2])
    })
}

// Read the first RGB(A) layer of an OpenEXR file, alpha is dropped
pub fn read_exr_to_bitmap(file_path: &str) -> exr::error::Result<Bitmap> {
    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap: &mut Bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = RGBSpectrum::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded from {}, width = {}, height = {}.", file_path, bitmap.width(), bitmap.height());
    Ok(bitmap)
}
