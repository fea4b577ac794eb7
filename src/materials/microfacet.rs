// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;

const MIN_ALPHA: Float = 1e-4;

/// GGX normal distribution for a microfacet at `cos_theta` from the normal.
pub fn ggx_d(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let a2 = alpha.max(MIN_ALPHA).powi(2);
    let cos2 = cos_theta * cos_theta;
    let denom = cos2 * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Smith masking for one direction.
pub fn ggx_g1(cos_theta: Float, alpha: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let cos2 = cos_theta * cos_theta;
    let tan2 = (1.0 - cos2).max(0.0) / cos2.max(1e-12);
    2.0 / (1.0 + (1.0 + alpha.max(MIN_ALPHA).powi(2) * tan2).sqrt())
}

pub fn ggx_g(cos_i: Float, cos_o: Float, alpha: Float) -> Float {
    ggx_g1(cos_i.abs(), alpha) * ggx_g1(cos_o.abs(), alpha)
}

/// Density of the visible normal `m` seen from `wi`.
pub fn pdf_ggx_vndf(wi: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    if wi.z <= 1e-6 || m.z <= 0.0 {
        return 0.0;
    }
    ggx_d(m.z, alpha) * ggx_g1(wi.z, alpha) * wi.dot(m).max(0.0) / wi.z
}

/// Heitz 2018 visible normal sampling.
pub fn sample_ggx_vndf(wi: &Vector3f, u: &Vector2f, alpha: Float) -> Vector3f {
    let a = alpha.max(MIN_ALPHA);
    let vh = Vector3f::new(a * wi.x, a * wi.y, wi.z).normalize();

    let lensq = vh.x * vh.x + vh.y * vh.y;
    let t1 = if lensq > 0.0 {
        Vector3f::new(-vh.y, vh.x, 0.0) / lensq.sqrt()
    } else {
        Vector3f::x()
    };
    let t2 = vh.cross(&t1);

    let r = u.x.clamp(0.0, 1.0).sqrt();
    let phi = 2.0 * PI * u.y.clamp(0.0, 1.0);
    let p1 = r * phi.cos();
    let s = 0.5 * (1.0 + vh.z);
    let p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * r * phi.sin();

    let nh = t1 * p1 + t2 * p2 + vh * (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
    Vector3f::new(a * nh.x, a * nh.y, nh.z.max(1e-6)).normalize()
}

pub fn reflect(wi: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wi.dot(m) * m - wi
}

pub fn fresnel_schlick(f0: RGBSpectrum, cos_theta: Float) -> RGBSpectrum {
    let one_minus = (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5);
    f0 + (RGBSpectrum::splat(1.0) - f0) * one_minus
}
