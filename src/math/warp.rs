// Copyright @yucwang 2023

use super::constants::{ INV_PI, PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    cos_theta * INV_PI
}

/// Uniform barycentric coordinates `(b0, b1, b2)` over a triangle.
pub fn square_to_triangle(u: &Vector2f) -> Vector3f {
    let su0 = u.x.max(0.0).sqrt();
    let b1 = 1.0 - su0;
    let b2 = u.y * su0;
    Vector3f::new((1.0 - b1 - b2).max(0.0), b1, b2)
}

/// Van der Corput radical inverse of `index` in the given prime base.
pub fn radical_inverse(base: u32, mut index: u64) -> Float {
    let base64 = base as u64;
    let inv_base = 1.0 / base as f64;
    let mut inv_digits = 1.0_f64;
    let mut reversed: u64 = 0;
    while index > 0 {
        let next = index / base64;
        let digit = index - next * base64;
        reversed = reversed * base64 + digit;
        inv_digits *= inv_base;
        index = next;
    }
    let value = reversed as f64 * inv_digits;
    (value as Float).min(1.0 - Float::EPSILON)
}

/// Two-dimensional Halton point (bases 2 and 3).
pub fn halton_2d(index: u64) -> Vector2f {
    Vector2f::new(radical_inverse(2, index), radical_inverse(3, index))
}
