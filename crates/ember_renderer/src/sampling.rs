//! Random sampling helpers.
//!
//! Every helper draws from an explicitly passed generator so a render is
//! reproducible from its seed.

use ember_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Uniform f32 in [min, max).
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Uniformly distributed unit vector.
///
/// Rejection sampling inside the unit ball, then normalization. Points too
/// close to the origin are rejected as well, since normalizing them would
/// blow up to infinity.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        let len_sq = p.length_squared();
        if 1e-30 < len_sq && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Random point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Random offset in the square [-0.5, 0.5) x [-0.5, 0.5).
///
/// The two axes are drawn independently.
pub fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    let x = gen_f32(rng) - 0.5;
    let y = gen_f32(rng) - 0.5;
    Vec3::new(x, y, 0.0)
}
